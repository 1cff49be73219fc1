//! Module containing the [`GfmWriter`] type rendering the document tree as
//! GitHub Flavored Markdown

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use crate::ast::{Block, Document, Inline, RefTarget, Table, TargetKind};
use crate::traits::DocWriter;

/// Struct used for writing a [`Document`] as GitHub Flavored Markdown
#[derive(Default)]
pub struct GfmWriter {
    list_depth: usize,
    /// External target definitions seen while walking, by stripped name
    refs_map: HashMap<String, String>,
    /// Reference style links waiting for a definition at the end of the
    /// document
    pending_refs: Vec<String>,
}

impl GfmWriter {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    fn render_blocks(&mut self, blocks: &[Block]) -> Vec<String> {
        blocks.iter().filter_map(|b| self.render_block(b)).collect()
    }

    fn render_block(&mut self, block: &Block) -> Option<String> {
        match block {
            Block::Para(inlines) => Some(self.render_inlines(inlines)),
            Block::Header(level, _, inlines) => Some(format!(
                "{} {}",
                "#".repeat((*level).max(1) as usize),
                self.render_inlines(inlines)
            )),
            Block::CodeBlock(language, code) => Some(format!("```{language}\n{code}\n```")),
            Block::BulletList(items) => Some(self.render_list(items, false)),
            Block::OrderedList(_, items) => Some(self.render_list(items, true)),
            Block::DefinitionList(items) => Some(self.render_definitions(items)),
            Block::BlockQuote(blocks) => {
                let inner = self.render_blocks(blocks).join("\n\n");
                Some(
                    inner
                        .lines()
                        .map(|l| if l.is_empty() { ">".to_owned() } else { format!("> {l}") })
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
            },
            Block::Table(table) => Some(self.render_table(table)),
            Block::Image(uri, alt) => Some(format!("![{alt}]({uri})")),
            Block::Target(TargetKind::Internal(id)) => {
                Some(format!("<a id=\"{}\"></a>", make_anchor(id)))
            },
            Block::Target(TargetKind::External(name, uri)) => {
                self.refs_map.insert(name.clone(), uri.clone());
                None
            },
            Block::Container(blocks) => {
                let parts = self.render_blocks(blocks);
                (!parts.is_empty()).then(|| parts.join("\n\n"))
            },
            Block::Raw(text) => Some(text.clone()),
            Block::Transition => Some("---".to_owned()),
        }
    }

    fn render_inlines(&mut self, inlines: &[Inline]) -> String {
        let mut result = String::new();
        for inline in inlines {
            match inline {
                Inline::Str(s) => result.push_str(s),
                Inline::Emph(content) => {
                    result.push('*');
                    result.push_str(&self.render_inlines(content));
                    result.push('*');
                },
                Inline::Strong(content) => {
                    result.push_str("**");
                    result.push_str(&self.render_inlines(content));
                    result.push_str("**");
                },
                Inline::Literal(text) => {
                    result.push('`');
                    result.push_str(text);
                    result.push('`');
                },
                Inline::Reference(content, target) => {
                    let text = self.render_inlines(content);
                    match target {
                        RefTarget::Uri(uri) => result.push_str(&format!("[{text}]({uri})")),
                        RefTarget::Internal(id) => {
                            result.push_str(&format!("[{text}](#{})", make_anchor(id)));
                        },
                        RefTarget::Named(name) => {
                            let id = normalize_refname(name);
                            result.push_str(&format!("[{text}][{id}]"));
                            self.pending_refs.push(name.clone());
                        },
                    }
                },
                Inline::LineBreak => result.push_str("<br>"),
            }
        }
        result
    }

    fn render_list(&mut self, items: &[Vec<Block>], ordered: bool) -> String {
        let unit = if ordered { "   " } else { "  " };
        let marker = if ordered { "1. " } else { "- " };
        let indent = unit.repeat(self.list_depth);
        let continuation = format!("{}{}", indent, " ".repeat(marker.len()));
        self.list_depth += 1;
        let mut lines = Vec::new();
        for item in items {
            let mut first = true;
            for block in item {
                let sublist = matches!(block, Block::BulletList(_) | Block::OrderedList(..));
                let Some(rendered) = self.render_block(block) else { continue };
                if first && !sublist {
                    lines.push(format!(
                        "{indent}{marker}{}",
                        rendered.replace('\n', &format!("\n{continuation}"))
                    ));
                    first = false;
                } else if sublist {
                    if first {
                        lines.push(format!("{indent}{}", marker.trim_end()));
                        first = false;
                    }
                    lines.push(rendered);
                } else {
                    lines.push(prefix_lines(&rendered, &continuation));
                }
            }
            if first {
                lines.push(format!("{indent}{}", marker.trim_end()));
            }
        }
        self.list_depth -= 1;
        lines.join("\n")
    }

    fn render_definitions(&mut self, items: &[(Vec<Inline>, Vec<Block>)]) -> String {
        let mut parts = Vec::new();
        for (term, definition) in items {
            let term = self.render_inlines(term);
            let body = self.render_blocks(definition).join("\n").replace('\n', "\n  ");
            parts.push(format!("**{term}**\n: {body}"));
        }
        parts.join("\n")
    }

    fn render_row(&mut self, row: &[Vec<Inline>]) -> Vec<String> {
        row.iter().map(|cell| self.render_inlines(cell).replace('\n', "<br>")).collect()
    }

    fn render_table(&mut self, table: &Table) -> String {
        let header = table.header.as_ref().map(|row| self.render_row(row));
        let rows: Vec<Vec<String>> =
            table.rows.iter().map(|row| self.render_row(row)).collect();
        let col_count = rows
            .iter()
            .map(Vec::len)
            .chain(header.as_ref().map(Vec::len))
            .max()
            .unwrap_or(0);
        let mut table_md = Vec::new();
        let format_row = |mut row: Vec<String>| {
            row.resize(col_count, String::new());
            format!("| {} |", row.join(" | "))
        };
        match header {
            Some(row) => table_md.push(format_row(row)),
            // headerless tables get an html comment header row
            None => table_md.push(format_row(vec!["<!-- -->".to_owned(); col_count])),
        }
        table_md.push(format!("| {} |", vec!["---"; col_count].join(" | ")));
        for row in rows {
            table_md.push(format_row(row));
        }
        let mut result = table_md.join("\n");
        if let Some(caption) = &table.caption {
            result.push_str(&format!("\n\n*Table: {caption}*"));
        }
        result
    }
}

impl DocWriter for GfmWriter {
    type WriteError = Infallible;

    fn write(mut self, doc: Document) -> Result<String, Self::WriteError> {
        let mut parts = self.render_blocks(&doc.blocks);
        let mut definitions = Vec::new();
        let mut seen = HashSet::new();
        for name in &self.pending_refs {
            if let Some(uri) = self.refs_map.get(name) {
                if seen.insert(name) {
                    definitions.push(format!("[{}]: {uri}", normalize_refname(name)));
                }
            }
        }
        if !definitions.is_empty() {
            parts.push(definitions.join("\n"));
        }
        let mut result = parts.join("\n\n");
        result.push('\n');
        Ok(result)
    }
}

/// Converts an id to a GitHub compatible anchor: lowercased, spaces become
/// hyphens, everything outside word chars and hyphens is removed
fn make_anchor(id: &str) -> String {
    id.to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|&c| c.is_alphanumeric() || c == '_' || c == '-')
        .collect()
}

/// Normalizes a reference name for use in reference style links
fn normalize_refname(name: &str) -> String { name.to_lowercase().replace(' ', "-") }

fn prefix_lines(text: &str, prefix: &str) -> String {
    text.lines().map(|l| format!("{prefix}{l}")).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::rst_reader::RstReader;
    use crate::traits::DocReader;

    fn convert(source: &str) -> String {
        GfmWriter::new().write(RstReader.read(source).unwrap()).unwrap()
    }

    #[test]
    fn test_headings() {
        assert_eq!(
            convert("Title\n=====\n\ntext\n\nSub\n---\n\nmore"),
            "# Title\n\ntext\n\n## Sub\n\nmore\n"
        );
        assert_eq!(convert("One\n===\n\nTwo\n==="), "## One\n\n## Two\n");
    }

    #[test]
    fn test_inline() {
        assert_eq!(
            convert("*em* and **strong** and ``lit``"),
            "*em* and **strong** and `lit`\n"
        );
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            convert(".. code-block:: python\n\n   print(\"hi\")"),
            "```python\nprint(\"hi\")\n```\n"
        );
        assert_eq!(convert("intro::\n\n    code"), "intro:\n\n```\ncode\n```\n");
    }

    #[test]
    fn test_lists() {
        assert_eq!(convert("- one\n- two"), "- one\n- two\n");
        assert_eq!(
            convert("- one\n\n  - nested\n\n- two"),
            "- one\n  - nested\n- two\n"
        );
        assert_eq!(convert("1. one\n2. two"), "1. one\n1. two\n");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            convert("`Docs <https://example.org>`_"),
            "[Docs](https://example.org)\n"
        );
        assert_eq!(
            convert(".. _docs: https://example.org\n\nsee docs_"),
            "see [docs](https://example.org)\n"
        );
        assert_eq!(convert("see https://example.org."), "see [https://example.org](https://example.org).\n");
    }

    #[test]
    fn test_internal_link() {
        assert_eq!(
            convert("Usage\n=====\n\nsee `Usage`_\n\nOther\n=====\n\nx"),
            "## Usage\n\nsee [Usage](#usage)\n\n## Other\n\nx\n"
        );
        assert_eq!(
            convert(".. _mark:\n\ntext"),
            "<a id=\"mark\"></a>\n\ntext\n"
        );
    }

    #[test]
    fn test_duplicate_targets_render_reference_style() {
        assert_eq!(
            convert(
                ".. _name: https://one.example\n\n.. _name: https://two.example\n\nsee name_"
            ),
            "see [name][name]\n\n[name]: https://two.example\n"
        );
    }

    #[test]
    fn test_dangling_reference() {
        assert_eq!(convert("see missing_"), "see [missing][missing]\n");
    }

    #[test]
    fn test_table() {
        assert_eq!(
            convert("=====  =====\none    two\n=====  =====\na      b\n=====  ====="),
            "| one | two |\n| --- | --- |\n| a | b |\n"
        );
        assert_eq!(
            convert("===  ===\na    b\n===  ==="),
            "| <!-- --> | <!-- --> |\n| --- | --- |\n| a | b |\n"
        );
    }

    #[test]
    fn test_table_caption() {
        assert_eq!(
            convert(".. csv-table:: Stats\n   :header: \"A\", \"B\"\n\n   1, 2"),
            "| A | B |\n| --- | --- |\n| 1 | 2 |\n\n*Table: Stats*\n"
        );
    }

    #[test]
    fn test_block_quote() {
        assert_eq!(
            convert("text\n\n    quoted one\n\n    quoted two"),
            "text\n\n> quoted one\n>\n> quoted two\n"
        );
    }

    #[test]
    fn test_transition_and_image() {
        assert_eq!(
            convert("a\n\n----\n\n.. image:: pic.png\n   :alt: alt text"),
            "a\n\n---\n\n![alt text](pic.png)\n"
        );
    }

    #[test]
    fn test_definition_list() {
        assert_eq!(
            convert("term\n    definition"),
            "**term**\n: definition\n"
        );
    }

    #[test]
    fn test_admonition() {
        assert_eq!(convert(".. note::\n\n   Careful."), "Careful.\n");
    }
}
