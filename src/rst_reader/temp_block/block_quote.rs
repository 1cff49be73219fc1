use crate::ast::Block;
use crate::rst_reader::iters::SkipIndent;
use crate::rst_reader::targets::Targets;
use crate::rst_reader::temp_block::{LineResult, Nested, TempBlock};
use crate::rst_reader::Context;

/// An indented region claimed by no other construct, containing blocks of
/// its own
#[derive(Debug)]
pub struct BlockQuote {
    indent: usize,
    inner: Nested,
}

impl BlockQuote {
    pub fn new(mut line: SkipIndent, ctx: &mut Context) -> Self {
        let indent = line.indent;
        line.move_indent(indent);
        Self { indent, inner: Nested::starting_with(line, ctx) }
    }

    pub fn next(&mut self, mut line: SkipIndent, ctx: &mut Context) -> LineResult {
        if line.indent >= self.indent {
            line.move_indent(self.indent);
            self.inner.next_line(line, ctx);
            LineResult::None
        } else {
            TempBlock::check_block(line, ctx).into_line_result_done_self()
        }
    }

    pub fn next_blank(&mut self, ctx: &mut Context) -> LineResult {
        self.inner.next_blank(ctx);
        LineResult::None
    }

    pub fn close(&mut self, ctx: &mut Context) { self.inner.close(ctx); }

    pub fn finish(self, targets: &Targets) -> Block {
        Block::BlockQuote(self.inner.finish(targets))
    }
}
