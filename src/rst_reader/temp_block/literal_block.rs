use crate::ast::Block;
use crate::rst_reader::iters::SkipIndent;
use crate::rst_reader::temp_block::{LineResult, TempBlock};
use crate::rst_reader::Context;

/// An indented literal block following a paragraph ending in `::`
#[derive(Debug)]
pub struct LiteralBlock {
    min_indent: usize,
    lines: Vec<String>,
}

impl LiteralBlock {
    pub fn new(line: &SkipIndent) -> Self {
        Self { min_indent: line.indent, lines: vec![line.get_full()] }
    }

    pub fn next(&mut self, line: SkipIndent, ctx: &mut Context) -> LineResult {
        if line.indent == 0 {
            TempBlock::check_block(line, ctx).into_line_result_done_self()
        } else {
            self.min_indent = self.min_indent.min(line.indent);
            self.lines.push(line.get_full());
            LineResult::None
        }
    }

    pub fn next_blank(&mut self) -> LineResult {
        self.lines.push(String::new());
        LineResult::None
    }

    /// Finishes the block, trimming trailing blank lines and stripping the
    /// common indent
    pub fn finish(mut self) -> Block {
        while self.lines.last().is_some_and(|l| l.chars().all(char::is_whitespace)) {
            self.lines.pop();
        }
        let mut content = String::new();
        for line in &self.lines {
            if line.len() > self.min_indent {
                content.push_str(&line[self.min_indent..]);
            }
            content.push('\n');
        }
        content.pop();
        Block::CodeBlock(String::new(), content)
    }
}
