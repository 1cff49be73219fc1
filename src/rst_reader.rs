//! Module containing the [`RstReader`] type used for parsing reStructuredText

use std::convert::Infallible;
use std::iter;

pub use targets::{Resolved, Targets};
use temp_block::TempBlock;

use crate::ast::{Block, Document};
use crate::traits::DocReader;

pub mod inline_parser;
mod iters;
mod targets;
mod temp_block;

/// Struct used for parsing reStructuredText into the [`Document`] tree
pub struct RstReader;

impl DocReader for RstReader {
    type ReadError = Infallible;

    fn read(self, source: &str) -> Result<Document, Self::ReadError> {
        let mut current = TempBlock::default();
        let mut finished = Vec::new();
        let mut ctx = Context::default();
        for line in source.lines() {
            current.next_line(line.strip_suffix('\r').unwrap_or(line), &mut finished, &mut ctx);
        }
        current.close(&mut ctx);
        let mut blocks: Vec<_> = finished
            .into_iter()
            .chain(iter::once(current))
            .filter_map(|t| t.finish(&ctx.targets))
            .collect();
        promote_sections(&mut blocks);
        Ok(Document::new(blocks))
    }
}

/// Shared state threaded through block parsing
#[derive(Debug, Default)]
pub struct Context {
    pub targets: Targets,
    pub styles: SectionStyles,
}

/// Section adornment styles in order of first appearance, which decides the
/// nesting levels
#[derive(Debug, Default)]
pub struct SectionStyles(Vec<(char, bool)>);

impl SectionStyles {
    /// Gets the level of an adornment style, registering it if new
    pub fn level(&mut self, ch: char, overline: bool) -> usize {
        match self.0.iter().position(|&s| s == (ch, overline)) {
            Some(i) => i + 1,
            None => {
                self.0.push((ch, overline));
                self.0.len()
            },
        }
    }
}

/// Reproduces document title promotion: levels stay as parsed only when a
/// single top-level section leads the document, otherwise every section gets
/// one level deeper
fn promote_sections(blocks: &mut [Block]) {
    let top_level = blocks.iter().filter(|b| matches!(b, Block::Header(1, ..))).count();
    let leading = blocks
        .iter()
        .find(|b| !matches!(b, Block::Target(_)))
        .is_some_and(|b| matches!(b, Block::Header(1, ..)));
    if top_level == 1 && leading {
        return;
    }
    for block in blocks {
        if let Block::Header(level, ..) = block {
            *level += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Inline::{self, Emph, LineBreak, Literal, Str, Strong};
    use crate::ast::{RefTarget, Table, TargetKind};

    fn parse(source: &str) -> Vec<Block> { RstReader.read(source).unwrap().blocks }

    fn header(level: i32, text: &str) -> Block {
        Block::Header(level, String::new(), vec![Str(text.into())])
    }

    fn para(text: &str) -> Block { Block::Para(vec![Str(text.into())]) }

    #[test]
    fn test_paragraphs() {
        assert_eq!(parse("one\n\ntwo lines\njoined"), vec![para("one"), para("two lines\njoined")]);
        assert_eq!(parse(""), vec![]);
        assert_eq!(parse("\n\n"), vec![]);
    }

    #[test]
    fn test_inline_markup() {
        assert_eq!(
            parse("a *b* **c** ``d``"),
            vec![Block::Para(vec![
                Str("a ".into()),
                Emph(vec![Str("b".into())]),
                Str(" ".into()),
                Strong(vec![Str("c".into())]),
                Str(" ".into()),
                Literal("d".into()),
            ])]
        );
    }

    #[test]
    fn test_sections() {
        // a single leading top section keeps its level, docutils promotes it
        // to the document title
        assert_eq!(
            parse("Title\n=====\n\ntext\n\nSub\n---\n\nmore"),
            vec![header(1, "Title"), para("text"), header(2, "Sub"), para("more")]
        );
        // two top sections are both one level down
        assert_eq!(
            parse("One\n===\n\nTwo\n===\n\ntext"),
            vec![header(2, "One"), header(2, "Two"), para("text")]
        );
    }

    #[test]
    fn test_overline_section() {
        assert_eq!(
            parse("=====\nTitle\n=====\n\ntext"),
            vec![header(1, "Title"), para("text")]
        );
        // overline and underline styles are distinct levels
        assert_eq!(
            parse("=====\nTitle\n=====\n\nPlain\n=====\n\ntext"),
            vec![header(1, "Title"), header(2, "Plain"), para("text")]
        );
    }

    #[test]
    fn test_transition() {
        assert_eq!(parse("before\n\n----\n\nafter"), vec![
            para("before"),
            Block::Transition,
            para("after")
        ]);
        // too short for a transition
        assert_eq!(parse("before\n\n---\n\nafter"), vec![
            para("before"),
            para("---"),
            para("after")
        ]);
    }

    #[test]
    fn test_literal_block() {
        assert_eq!(parse("code::\n\n    x = 1\n    y = 2\n\nafter"), vec![
            para("code:"),
            Block::CodeBlock(String::new(), "x = 1\ny = 2".into()),
            para("after"),
        ]);
        assert_eq!(parse("quoted ::\n\n    literal"), vec![
            para("quoted"),
            Block::CodeBlock(String::new(), "literal".into()),
        ]);
    }

    #[test]
    fn test_block_quote() {
        assert_eq!(parse("text\n\n    quoted\n\nafter"), vec![
            para("text"),
            Block::BlockQuote(vec![para("quoted")]),
            para("after"),
        ]);
    }

    #[test]
    fn test_bullet_list() {
        assert_eq!(parse("- one\n- two"), vec![Block::BulletList(vec![
            vec![para("one")],
            vec![para("two")],
        ])]);
        assert_eq!(parse("- one\n\n  - nested\n\n- two"), vec![Block::BulletList(vec![
            vec![para("one"), Block::BulletList(vec![vec![para("nested")]])],
            vec![para("two")],
        ])]);
    }

    #[test]
    fn test_enumerated_list() {
        assert_eq!(parse("1. one\n2. two\n#. three"), vec![Block::OrderedList(1, vec![
            vec![para("one")],
            vec![para("two")],
            vec![para("three")],
        ])]);
        assert_eq!(parse("3) three\n4) four"), vec![Block::OrderedList(3, vec![
            vec![para("three")],
            vec![para("four")],
        ])]);
        assert_eq!(parse("(1) one"), vec![Block::OrderedList(1, vec![vec![para("one")]])]);
        assert_eq!(parse("1924 was a year"), vec![para("1924 was a year")]);
    }

    #[test]
    fn test_definition_list() {
        assert_eq!(parse("term\n    definition"), vec![Block::DefinitionList(vec![(
            vec![Str("term".into())],
            vec![para("definition")],
        )])]);
        assert_eq!(parse("one\n    first\ntwo\n    second"), vec![Block::DefinitionList(vec![
            (vec![Str("one".into())], vec![para("first")]),
            (vec![Str("two".into())], vec![para("second")]),
        ])]);
        // the line after the list is a plain paragraph
        assert_eq!(parse("term\n    definition\nafter\nmore"), vec![
            Block::DefinitionList(vec![(vec![Str("term".into())], vec![para("definition")])]),
            para("after\nmore"),
        ]);
    }

    #[test]
    fn test_comment() {
        assert_eq!(parse(".. a comment\n   with a body\n\ntext"), vec![para("text")]);
        assert_eq!(parse("..\n   still a comment\n\ntext"), vec![para("text")]);
    }

    #[test]
    fn test_targets() {
        assert_eq!(parse(".. _docs: https://example.org\n\nsee docs_"), vec![
            Block::Target(TargetKind::External("docs".into(), "https://example.org".into())),
            Block::Para(vec![
                Str("see ".into()),
                Inline::Reference(
                    vec![Str("docs".into())],
                    RefTarget::Uri("https://example.org".into())
                ),
            ]),
        ]);
        assert_eq!(parse(".. _mark:\n\ntext"), vec![
            Block::Target(TargetKind::Internal("mark".into())),
            para("text"),
        ]);
    }

    #[test]
    fn test_section_reference() {
        let blocks = parse("Usage\n=====\n\nsee `Usage`_\n\nOther\n=====\n\ntext");
        assert_eq!(blocks[1], Block::Para(vec![
            Str("see ".into()),
            Inline::Reference(vec![Str("Usage".into())], RefTarget::Internal("usage".into())),
        ]));
    }

    #[test]
    fn test_code_directive() {
        assert_eq!(parse(".. code-block:: rust\n\n   fn main() {}\n\nafter"), vec![
            Block::CodeBlock("rust".into(), "fn main() {}".into()),
            para("after"),
        ]);
    }

    #[test]
    fn test_image_directives() {
        assert_eq!(parse(".. image:: pic.png\n   :alt: a picture"), vec![Block::Image(
            "pic.png".into(),
            "a picture".into()
        )]);
        assert_eq!(parse(".. figure:: pic.png\n\n   The caption"), vec![Block::Container(vec![
            Block::Image("pic.png".into(), String::new()),
            para("The caption"),
        ])]);
    }

    #[test]
    fn test_admonition_directive() {
        assert_eq!(parse(".. note::\n\n   Be careful.\n\nafter"), vec![
            Block::Container(vec![para("Be careful.")]),
            para("after"),
        ]);
        assert_eq!(parse(".. unknown-thing:: x\n\n   dropped\n\nafter"), vec![para("after")]);
    }

    #[test]
    fn test_csv_table_directive() {
        assert_eq!(
            parse(".. csv-table:: Stats\n   :header: \"Name\", \"Value\"\n\n   \"a\", 1\n   \"b\", 2"),
            vec![Block::Table(Table {
                header: Some(vec![vec![Str("Name".into())], vec![Str("Value".into())]]),
                rows: vec![
                    vec![vec![Str("a".into())], vec![Str("1".into())]],
                    vec![vec![Str("b".into())], vec![Str("2".into())]],
                ],
                caption: Some("Stats".into()),
            })]
        );
    }

    #[test]
    fn test_list_item_with_blocks() {
        assert_eq!(parse("- first\n\n  second::\n\n      code"), vec![Block::BulletList(vec![
            vec![
                para("first"),
                para("second:"),
                Block::CodeBlock(String::new(), "code".into()),
            ],
        ])]);
    }

    #[test]
    fn test_grid_table_multiline_cell() {
        let blocks = parse("+-----+------+\n| a   | line |\n|     | two  |\n+-----+------+");
        assert_eq!(blocks, vec![Block::Table(Table {
            header: None,
            rows: vec![vec![
                vec![Str("a".into())],
                vec![Str("line".into()), LineBreak, Str("two".into())],
            ]],
            caption: None,
        })]);
    }
}
