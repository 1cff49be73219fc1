use std::iter;

use crate::ast::Block;
use crate::rst_reader::iters::{SkipIndent, SkipIndentResult};
use crate::rst_reader::targets::Targets;
use crate::rst_reader::temp_block::{CheckResult, LineResult, Nested, TempBlock};
use crate::rst_reader::Context;

/// An enumerated list with `1.`, `1)`, `(1)` or auto-enumerated `#.` markers
#[derive(Debug)]
pub struct EnumeratedList {
    start: usize,
    content_indent: Option<usize>,
    current: Nested,
    items: Vec<Nested>,
}

impl EnumeratedList {
    /// Checks if a line starting with a digit, `#` or `(` opens an
    /// enumerated list
    pub fn check<'a>(line: SkipIndent<'a>, ctx: &mut Context) -> CheckResult<'a> {
        let Some((start, width, content)) = parse_marker(&line) else {
            return CheckResult::Text(line);
        };
        match content {
            SkipIndentResult::Line(mut content) => {
                let content_indent = width + content.indent;
                content.move_indent(content.indent);
                CheckResult::New(
                    Self {
                        start,
                        content_indent: Some(content_indent),
                        current: Nested::starting_with(content, ctx),
                        items: Vec::new(),
                    }
                    .into(),
                )
            },
            SkipIndentResult::Blank(_) => CheckResult::New(
                Self { start, content_indent: None, current: Nested::default(), items: Vec::new() }
                    .into(),
            ),
        }
    }

    pub fn next(&mut self, mut line: SkipIndent, ctx: &mut Context) -> LineResult {
        if line.indent == 0 {
            if let Some((_, width, content)) = parse_marker(&line) {
                match content {
                    SkipIndentResult::Line(mut content) => {
                        self.finish_item(ctx);
                        self.content_indent = Some(width + content.indent);
                        content.move_indent(content.indent);
                        self.current = Nested::starting_with(content, ctx);
                    },
                    SkipIndentResult::Blank(_) => {
                        self.finish_item(ctx);
                        self.content_indent = None;
                        self.current = Nested::default();
                    },
                }
                return LineResult::None;
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
        Block::new_ordered_list(
            self.start,
            self.items
                .into_iter()
                .chain(iter::once(self.current))
                .map(|item| item.finish(targets))
                .collect(),
        )
    }
}

/// Parses an enumerated list marker, returning the start number, the marker
/// width and the rest of the line. `#` markers enumerate from 1.
fn parse_marker<'a>(line: &SkipIndent<'a>) -> Option<(usize, usize, SkipIndentResult<'a>)> {
    let mut iter = line.iter_rest();
    let (start, width) = match line.first {
        c @ '0'..='9' => {
            let (number, length) = iter.get_number(c)?;
            if !(iter.next_if_eq('.') || iter.next_if_eq(')')) {
                return None;
            }
            (number, length + 1)
        },
        '#' => {
            if !(iter.next_if_eq('.') || iter.next_if_eq(')')) {
                return None;
            }
            (1, 2)
        },
        '(' => {
            let first = iter.next().filter(char::is_ascii_digit)?;
            let (number, length) = iter.get_number(first)?;
            if !iter.next_if_eq(')') {
                return None;
            }
            (number, length + 2)
        },
        _ => return None,
    };
    match SkipIndent::skip(iter.get_str(), 0) {
        SkipIndentResult::Line(content) if content.indent == 0 => None,
        content => Some((start, width, content)),
    }
}
