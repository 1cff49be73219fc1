use log::warn;

use crate::ast::{Block, Table};
use crate::rst_reader::iters::SkipIndent;
use crate::rst_reader::targets::Targets;
use crate::rst_reader::temp_block::simple_table::{finish_row, merge_rows};
use crate::rst_reader::temp_block::{CheckResult, LineResult, TempBlock};
use crate::rst_reader::Context;

/// A grid table drawn with `+`, `-`, `=` and `|`. Uniform grids only, cell
/// spans are not recognized.
#[derive(Debug)]
pub struct GridTable {
    ncols: usize,
    rows: Vec<Vec<Vec<String>>>,
    current: Vec<Vec<String>>,
    header_end: Option<usize>,
    closed: bool,
}

impl GridTable {
    /// Checks if a line is a grid table top border such as `+---+---+`
    pub fn check(line: SkipIndent) -> CheckResult {
        let l = line.line.trim_end();
        if l.len() < 3
            || !l.ends_with('+')
            || !l.contains('-')
            || !l.chars().all(|c| c == '+' || c == '-')
        {
            return CheckResult::Text(line);
        }
        let ncols = l.chars().filter(|&c| c == '+').count() - 1;
        CheckResult::New(
            Self {
                ncols,
                rows: Vec::new(),
                current: vec![Vec::new(); ncols],
                header_end: None,
                closed: true,
            }
            .into(),
        )
    }

    pub fn next(&mut self, line: SkipIndent, ctx: &mut Context) -> LineResult {
        let full = line.get_full();
        let trimmed = full.trim_end();
        if trimmed.starts_with('+') && trimmed.chars().all(|c| matches!(c, '+' | '-' | '=')) {
            self.commit_row();
            self.closed = true;
            if trimmed.contains('=') {
                self.header_end = Some(self.rows.len());
            }
            return LineResult::None;
        }
        if trimmed.starts_with('|') {
            self.closed = false;
            self.add_row_line(trimmed);
            return LineResult::None;
        }
        if !self.closed {
            warn!("malformed grid table");
        }
        TempBlock::check_block(line, ctx).into_line_result_done_self()
    }

    pub fn next_blank(&mut self) -> LineResult {
        if !self.closed {
            warn!("grid table without closing border");
            self.commit_row();
        }
        LineResult::DoneSelf
    }

    fn add_row_line(&mut self, line: &str) {
        let inner = line.strip_prefix('|').unwrap_or(line);
        let inner = inner.strip_suffix('|').unwrap_or(inner);
        for (i, part) in inner.split('|').enumerate() {
            match self.current.get_mut(i) {
                Some(cell) => cell.push(part.trim().to_owned()),
                // extra separators are folded into the last cell
                None =>
                    if let Some(cell) = self.current.last_mut() {
                        if let Some(last) = cell.last_mut() {
                            last.push('|');
                            last.push_str(part.trim());
                        }
                    },
            }
        }
    }

    fn commit_row(&mut self) {
        if self.current.iter().all(|cell| cell.iter().all(|l| l.is_empty())) {
            for cell in &mut self.current {
                cell.clear();
            }
            return;
        }
        let row = std::mem::replace(&mut self.current, vec![Vec::new(); self.ncols])
            .into_iter()
            .map(|mut lines| {
                while lines.last().is_some_and(String::is_empty) {
                    lines.pop();
                }
                while lines.first().is_some_and(String::is_empty) {
                    lines.remove(0);
                }
                lines
            })
            .collect();
        self.rows.push(row);
    }

    pub fn finish(mut self, targets: &Targets) -> Option<Block> {
        self.commit_row();
        if self.rows.is_empty() {
            return None;
        }
        let header_end = self.header_end.unwrap_or(0);
        let mut rows = self.rows;
        let body = rows.split_off(header_end.min(rows.len()));
        let header = merge_rows(rows, targets);
        Some(Block::Table(Table {
            header,
            rows: body.into_iter().map(|row| finish_row(row, targets)).collect(),
            caption: None,
        }))
    }
}
