use std::iter;

use crate::ast::Block;
use crate::rst_reader::iters::{SkipIndent, SkipIndentResult};
use crate::rst_reader::targets::Targets;
use crate::rst_reader::temp_block::{CheckResult, LineResult, Nested, TempBlock};
use crate::rst_reader::Context;

/// A bullet list, each item a nested block machine
#[derive(Debug)]
pub struct BulletList {
    marker: char,
    content_indent: Option<usize>,
    current: Nested,
    items: Vec<Nested>,
}

impl BulletList {
    /// Checks if the line opens a bullet list: the marker char followed by
    /// whitespace and content, or a bare marker for an empty item
    pub fn check<'a>(line: SkipIndent<'a>, ctx: &mut Context) -> CheckResult<'a> {
        match line.skip_indent_rest() {
            SkipIndentResult::Line(mut content) => {
                if content.indent == 0 {
                    return CheckResult::Text(line);
                }
                let content_indent = 1 + content.indent;
                content.move_indent(content.indent);
                CheckResult::New(
                    Self {
                        marker: line.first,
                        content_indent: Some(content_indent),
                        current: Nested::starting_with(content, ctx),
                        items: Vec::new(),
                    }
                    .into(),
                )
            },
            SkipIndentResult::Blank(_) => CheckResult::New(
                Self {
                    marker: line.first,
                    content_indent: None,
                    current: Nested::default(),
                    items: Vec::new(),
                }
                .into(),
            ),
        }
    }

    pub fn next(&mut self, mut line: SkipIndent, ctx: &mut Context) -> LineResult {
        if line.indent == 0 {
            if line.first == self.marker {
                match line.skip_indent_rest() {
                    SkipIndentResult::Line(mut content) if content.indent > 0 => {
                        self.finish_item(ctx);
                        self.content_indent = Some(1 + content.indent);
                        content.move_indent(content.indent);
                        self.current = Nested::starting_with(content, ctx);
                        return LineResult::None;
                    },
                    SkipIndentResult::Blank(_) => {
                        self.finish_item(ctx);
                        self.content_indent = None;
                        self.current = Nested::default();
                        return LineResult::None;
                    },
                    SkipIndentResult::Line(_) => {},
                }
            }
            return TempBlock::check_block(line, ctx).into_line_result_done_self();
        }
        match self.content_indent {
            Some(indent) => line.move_indent_capped(indent),
            None => {
                self.content_indent = Some(line.indent);
                line.move_indent(line.indent);
            },
        }
        self.current.next_line(line, ctx);
        LineResult::None
    }

    pub fn next_blank(&mut self, ctx: &mut Context) -> LineResult {
        self.current.next_blank(ctx);
        LineResult::None
    }

    pub fn close(&mut self, ctx: &mut Context) { self.current.close(ctx); }

    fn finish_item(&mut self, ctx: &mut Context) {
        self.current.close(ctx);
        self.items.push(std::mem::take(&mut self.current));
    }

    pub fn finish(self, targets: &Targets) -> Block {
        Block::BulletList(
            self.items
                .into_iter()
                .chain(iter::once(self.current))
                .map(|item| item.finish(targets))
                .collect(),
        )
    }
}
