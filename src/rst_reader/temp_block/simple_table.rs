use log::warn;

use crate::ast::{Block, Row, Table};
use crate::rst_reader::inline_parser::InlineParser;
use crate::rst_reader::iters::SkipIndent;
use crate::rst_reader::targets::Targets;
use crate::rst_reader::temp_block::{CheckResult, LineResult};
use crate::rst_reader::Context;

/// A simple table, bounded by `=` border lines with column gaps
#[derive(Debug)]
pub struct SimpleTable {
    columns: Vec<(usize, usize)>,
    rows: Vec<Vec<Vec<String>>>,
    header_end: Option<usize>,
    pending_border: bool,
    separated: bool,
}

impl SimpleTable {
    /// Checks if a line is a top border: at least two runs of `=` separated
    /// by spaces
    pub fn check(line: SkipIndent) -> CheckResult {
        let mut columns = Vec::new();
        let mut start = None;
        let mut pos = 0;
        for c in line.line.chars() {
            match c {
                '=' => {
                    if start.is_none() {
                        start = Some(pos);
                    }
                },
                ' ' | '\t' => {
                    if let Some(s) = start.take() {
                        columns.push((s, pos));
                    }
                },
                _ => return CheckResult::Text(line),
            }
            pos += 1;
        }
        if let Some(s) = start {
            columns.push((s, pos));
        }
        if columns.len() < 2 {
            return CheckResult::Text(line);
        }
        if let Some(last) = columns.last_mut() {
            last.1 = usize::MAX;
        }
        CheckResult::New(
            Self {
                columns,
                rows: Vec::new(),
                header_end: None,
                pending_border: false,
                separated: true,
            }
            .into(),
        )
    }

    pub fn next(&mut self, line: SkipIndent, _ctx: &mut Context) -> LineResult {
        let full = line.get_full();
        if is_border(&full, '=') {
            if self.pending_border || self.header_end.is_some() {
                // second border with no rows after it, or the border after
                // the body: the table is done
                self.pending_border = true;
                return LineResult::DoneSelf;
            }
            self.pending_border = true;
            self.separated = true;
            return LineResult::None;
        }
        if is_border(&full, '-') {
            self.separated = true;
            return LineResult::None;
        }
        if self.pending_border {
            // rows continue, so the border was the header separator
            self.pending_border = false;
            self.header_end = Some(self.rows.len());
        }
        self.push_row(&full);
        LineResult::None
    }

    pub fn next_blank(&mut self) -> LineResult {
        if !self.pending_border {
            warn!("simple table without bottom border");
        }
        LineResult::DoneSelf
    }

    fn push_row(&mut self, full: &str) {
        let cells = self.split_row(full);
        let continuation = !self.separated && cells.first().is_some_and(String::is_empty);
        if continuation {
            if let Some(last) = self.rows.last_mut() {
                for (cell, line) in last.iter_mut().zip(cells) {
                    if !line.is_empty() {
                        cell.push(line);
                    }
                }
                return;
            }
        }
        self.separated = false;
        self.rows.push(cells.into_iter().map(|c| if c.is_empty() { vec![] } else { vec![c] }).collect());
    }

    fn split_row(&self, full: &str) -> Vec<String> {
        let chars: Vec<char> = full.chars().collect();
        self.columns
            .iter()
            .map(|&(start, end)| {
                let start = start.min(chars.len());
                let end = end.min(chars.len());
                chars[start..end].iter().collect::<String>().trim().to_owned()
            })
            .collect()
    }

    pub fn finish(self, targets: &Targets) -> Option<Block> {
        if !self.pending_border {
            warn!("simple table without bottom border");
        }
        if self.rows.is_empty() {
            return None;
        }
        let header_end = self.header_end.unwrap_or(0);
        let mut rows = self.rows;
        let body = rows.split_off(header_end);
        let header = merge_rows(rows, targets);
        Some(Block::Table(Table {
            header,
            rows: body.into_iter().map(|row| finish_row(row, targets)).collect(),
            caption: None,
        }))
    }
}

fn is_border(line: &str, ch: char) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == ch || c == ' ' || c == '\t')
        && trimmed.starts_with(ch)
}

/// Joins the header rows of a table into a single row
pub(super) fn merge_rows(rows: Vec<Vec<Vec<String>>>, targets: &Targets) -> Option<Row> {
    let mut iter = rows.into_iter();
    let mut merged = iter.next()?;
    for row in iter {
        for (cell, lines) in merged.iter_mut().zip(row) {
            cell.extend(lines);
        }
    }
    Some(finish_row(merged, targets))
}

/// Parses the accumulated cell lines of a row into inlines
pub(super) fn finish_row(row: Vec<Vec<String>>, targets: &Targets) -> Row {
    row.into_iter().map(|lines| InlineParser::parse_cell(&lines, targets)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Inline;
    use crate::rst_reader::temp_block::TempBlock;

    fn parse(lines: &[&str]) -> Option<Block> {
        let mut ctx = Context::default();
        let mut table = match SimpleTable::check(SkipIndent::skip(lines[0], 0).into_line()) {
            CheckResult::New(TempBlock::SimpleTable(t)) => t,
            _ => panic!("not a table border"),
        };
        for line in &lines[1..] {
            match table.next(SkipIndent::skip(line, 0).into_line(), &mut ctx) {
                LineResult::None => {},
                LineResult::DoneSelf => break,
                _ => panic!(),
            }
        }
        table.finish(&ctx.targets)
    }

    fn cell(text: &str) -> Vec<Inline> { vec![Inline::Str(text.into())] }

    #[test]
    fn test_with_header() {
        let result = parse(&["=====  =====", "one    two", "=====  =====", "a      b", "=====  ====="]);
        assert_eq!(
            result,
            Some(Block::Table(Table {
                header: Some(vec![cell("one"), cell("two")]),
                rows: vec![vec![cell("a"), cell("b")]],
                caption: None,
            }))
        );
    }

    #[test]
    fn test_without_header() {
        let result = parse(&["===  ===", "a    b", "c    d", "===  ==="]);
        assert_eq!(
            result,
            Some(Block::Table(Table {
                header: None,
                rows: vec![vec![cell("a"), cell("b")], vec![cell("c"), cell("d")]],
                caption: None,
            }))
        );
    }

    #[test]
    fn test_continuation_line() {
        let result = parse(&["===  ===", "a    b", "     more", "===  ==="]);
        assert_eq!(
            result,
            Some(Block::Table(Table {
                header: None,
                rows: vec![vec![
                    cell("a"),
                    vec![Inline::Str("b".into()), Inline::LineBreak, Inline::Str("more".into())]
                ]],
                caption: None,
            }))
        );
    }

    #[test]
    fn test_not_a_table() {
        assert!(matches!(
            SimpleTable::check(SkipIndent::skip("=====", 0).into_line()),
            CheckResult::Text(_)
        ));
    }
}
