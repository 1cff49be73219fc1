use crate::rst_reader::iters::SkipIndent;
use crate::rst_reader::temp_block::{LineResult, TempBlock};
use crate::rst_reader::Context;

/// A comment, swallowing its indented body
#[derive(Debug)]
pub struct Comment;

impl Comment {
    pub fn next(&mut self, line: SkipIndent, ctx: &mut Context) -> LineResult {
        if line.indent > 0 {
            LineResult::None
        } else {
            TempBlock::check_block(line, ctx).into_line_result_done_self()
        }
    }

    pub const fn next_blank(&self) -> LineResult { LineResult::None }
}
