use std::iter;

use crate::ast::Block;
use crate::rst_reader::inline_parser::InlineParser;
use crate::rst_reader::iters::SkipIndent;
use crate::rst_reader::targets::Targets;
use crate::rst_reader::temp_block::paragraph::Paragraph;
use crate::rst_reader::temp_block::{CheckResult, LineResult, Nested, TempBlock, ToLineResult};
use crate::rst_reader::Context;

/// A definition list: single-line terms each directly followed by an indented
/// definition body. A later unindented text line is held pending until the
/// line after it decides whether it is a new term or a paragraph after the
/// list.
#[derive(Debug)]
pub struct DefinitionList {
    items: Vec<(String, Nested)>,
    term: String,
    body: Nested,
    def_indent: usize,
    pending: Option<String>,
}

impl DefinitionList {
    pub fn new(term: String, mut line: SkipIndent, ctx: &mut Context) -> Self {
        let def_indent = line.indent;
        line.move_indent(def_indent);
        Self {
            items: Vec::new(),
            term,
            body: Nested::starting_with(line, ctx),
            def_indent,
            pending: None,
        }
    }

    pub fn next(&mut self, mut line: SkipIndent, ctx: &mut Context) -> LineResult {
        if let Some(pending) = self.pending.take() {
            if line.indent > 0 {
                self.finish_item(ctx);
                self.term = pending;
                self.def_indent = line.indent;
                line.move_indent(line.indent);
                self.body = Nested::starting_with(line, ctx);
                return LineResult::None;
            }
            // the pending line turned out to be a paragraph after the list
            let mut paragraph = Paragraph::with_content(pending);
            return match paragraph.next(line, ctx) {
                LineResult::None => paragraph.done_self_and_new(),
                LineResult::DoneSelf => paragraph.done_self_and_other(),
                // a one line paragraph and an unindented line produce nothing else
                _ => unreachable!(),
            };
        }
        if line.indent == 0 {
            return match TempBlock::check_block(line, ctx) {
                CheckResult::Text(line) => {
                    self.pending = Some(line.line.trim_end().to_owned());
                    LineResult::None
                },
                checked => checked.into_line_result_done_self(),
            };
        }
        line.move_indent_capped(self.def_indent);
        self.body.next_line(line, ctx);
        LineResult::None
    }

    pub fn next_blank(&mut self, ctx: &mut Context) -> LineResult {
        match self.pending.take() {
            // a term must be directly followed by its definition
            Some(pending) => Paragraph::with_content(pending).done_self_and_other(),
            None => {
                self.body.next_blank(ctx);
                LineResult::None
            },
        }
    }

    pub fn close(&mut self, ctx: &mut Context) { self.body.close(ctx); }

    fn finish_item(&mut self, ctx: &mut Context) {
        self.body.close(ctx);
        self.items
            .push((std::mem::take(&mut self.term), std::mem::take(&mut self.body)));
    }

    pub fn finish(self, targets: &Targets) -> Option<Block> {
        let items = self
            .items
            .into_iter()
            .chain(iter::once((self.term, self.body)))
            .map(|(term, body)| (InlineParser::parse(&term, targets), body.finish(targets)))
            .collect();
        let list = Block::DefinitionList(items);
        match self.pending {
            Some(pending) => Some(Block::Container(vec![
                list,
                Block::Para(InlineParser::parse(&pending, targets)),
            ])),
            None => Some(list),
        }
    }
}
