use log::warn;

use crate::ast::Block;
use crate::rst_reader::inline_parser::InlineParser;
use crate::rst_reader::iters::SkipIndent;
use crate::rst_reader::targets::Targets;
use crate::rst_reader::temp_block::adornment::adornment_run;
use crate::rst_reader::temp_block::definition_list::DefinitionList;
use crate::rst_reader::temp_block::literal_block::LiteralBlock;
use crate::rst_reader::temp_block::{LineResult, TempBlock, ToLineResult};
use crate::rst_reader::Context;

/// Struct representing an unfinished paragraph
#[derive(Debug)]
pub struct Paragraph {
    /// Content of the paragraph, lines joined with `'\n'`
    content: String,
    /// Set once a blank line followed content ending in `::`, the next
    /// indented block is a literal block
    expects_literal: bool,
    /// Level and generated id once an underline made this paragraph a section
    /// title
    section: Option<(usize, String)>,
}

impl Paragraph {
    /// Creates a new paragraph starting with a given non-blank line
    pub fn new(line: &SkipIndent) -> Self {
        Self::with_content(line.line.trim_end().to_owned())
    }

    /// Creates a new paragraph from already assembled content
    pub fn with_content(content: String) -> Self {
        Self { content, expects_literal: false, section: None }
    }

    /// Parses a non-blank line of the document
    pub fn next(&mut self, line: SkipIndent, ctx: &mut Context) -> LineResult {
        if self.expects_literal {
            return if line.indent > 0 {
                LiteralBlock::new(&line).done_self_and_new()
            } else {
                warn!("literal block expected, none found");
                TempBlock::check_block(line, ctx).into_line_result_done_self()
            };
        }
        if line.indent > 0 {
            if self.content.ends_with("::") {
                warn!("blank line missing before literal block");
                return LiteralBlock::new(&line).done_self_and_new();
            }
            if self.content.contains('\n') {
                warn!("unexpected indentation, treated as paragraph continuation");
                self.push(&line);
                return LineResult::None;
            }
            // a single text line directly followed by an indented one is a
            // definition list term
            let term = std::mem::take(&mut self.content);
            return DefinitionList::new(term, line, ctx).new();
        }
        match adornment_run(&line) {
            Some((ch, width)) => self.check_underline(ch, width, line, ctx),
            None => {
                self.push(&line);
                LineResult::None
            },
        }
    }

    /// Parses a blank line, keeping the paragraph open when a literal block
    /// was announced
    pub fn next_blank(&mut self) -> LineResult {
        if self.content.ends_with("::") {
            self.expects_literal = true;
            LineResult::None
        } else {
            LineResult::DoneSelf
        }
    }

    /// Handles a line consisting of one repeated punctuation char, which
    /// makes a single-line paragraph a section title
    fn check_underline(
        &mut self, ch: char, width: usize, line: SkipIndent, ctx: &mut Context,
    ) -> LineResult {
        if self.content.contains('\n') {
            warn!("unexpected section title underline");
            self.push(&line);
            return LineResult::None;
        }
        let title_len = self.content.chars().count();
        if width < title_len && width < 4 {
            self.push(&line);
            return LineResult::None;
        }
        if width < title_len {
            warn!("section title underline too short: {:?}", self.content);
        }
        let level = ctx.styles.level(ch, false);
        let id = ctx.targets.add_internal(&self.content);
        self.section = Some((level, id));
        LineResult::DoneSelf
    }

    /// Finishes the paragraph into a [`Block`], stripping a trailing literal
    /// block marker. An emptied paragraph returns [`None`].
    pub fn finish(self, targets: &Targets) -> Option<Block> {
        let mut content = self.content;
        if self.section.is_none() && content.ends_with("::") {
            content.truncate(content.len() - 2);
            if content.ends_with([' ', '\t']) || content.is_empty() {
                content.truncate(content.trim_end().len());
            } else {
                content.push(':');
            }
        }
        if content.is_empty() {
            return None;
        }
        let parsed = InlineParser::parse(&content, targets);
        Some(match self.section {
            Some((level, id)) => Block::new_header(level, id, parsed),
            None => Block::Para(parsed),
        })
    }

    /// Pushes a line without any checks
    fn push(&mut self, line: &SkipIndent) {
        self.content.push('\n');
        self.content.push_str(line.line.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Inline;
    use crate::rst_reader::iters::SkipIndentResult;

    fn feed<'a, I>(lines: I) -> (Paragraph, Context)
    where I: IntoIterator<Item = &'a str> {
        let mut ctx = Context::default();
        let mut iter = lines.into_iter();
        let mut paragraph = Paragraph::new(&SkipIndent::skip(iter.next().unwrap(), 0).into_line());
        for line in iter {
            let result = match SkipIndent::skip(line, 0) {
                SkipIndentResult::Line(line) => paragraph.next(line, &mut ctx),
                SkipIndentResult::Blank(_) => paragraph.next_blank(),
            };
            assert!(matches!(result, LineResult::None | LineResult::DoneSelf));
        }
        (paragraph, ctx)
    }

    #[test]
    fn test_title() {
        let (p, ctx) = feed(["Title", "====="]);
        assert_eq!(
            p.finish(&ctx.targets),
            Some(Block::Header(1, String::new(), vec![Inline::Str("Title".into())]))
        );
    }

    #[test]
    fn test_short_underline_is_text() {
        let (p, ctx) = feed(["A long title", "=="]);
        assert_eq!(
            p.finish(&ctx.targets),
            Some(Block::Para(vec![Inline::Str("A long title\n==".into())]))
        );
    }

    #[test]
    fn test_literal_marker() {
        let (p, ctx) = feed(["Some code::", ""]);
        assert_eq!(
            p.finish(&ctx.targets),
            Some(Block::Para(vec![Inline::Str("Some code:".into())]))
        );
        let (p, ctx) = feed(["Some code ::", ""]);
        assert_eq!(
            p.finish(&ctx.targets),
            Some(Block::Para(vec![Inline::Str("Some code".into())]))
        );
        let (p, ctx) = feed(["::", ""]);
        assert_eq!(p.finish(&ctx.targets), None);
    }
}
