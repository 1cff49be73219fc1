use std::collections::HashSet;

use lazy_static::lazy_static;
use log::{debug, warn};

use crate::ast::{Block, Inline, Table};
use crate::rst_reader::inline_parser::InlineParser;
use crate::rst_reader::iters::{SkipIndent, SkipIndentResult};
use crate::rst_reader::targets::Targets;
use crate::rst_reader::temp_block::{LineResult, Nested, TempBlock};
use crate::rst_reader::Context;

lazy_static! {
    /// Admonition directives are rendered as their transparent body
    static ref ADMONITIONS: HashSet<&'static str> = [
        "admonition",
        "attention",
        "caution",
        "danger",
        "error",
        "hint",
        "important",
        "note",
        "tip",
        "warning",
    ]
    .into_iter()
    .collect();
    /// Directives with no possible rendering in Markdown, skipped quietly
    static ref SKIPPED: HashSet<&'static str> = [
        "contents",
        "footer",
        "header",
        "highlight",
        "include",
        "index",
        "meta",
        "sectnum",
        "toctree",
    ]
    .into_iter()
    .collect();
}

/// A directive with its argument, options and indented body
#[derive(Debug)]
pub struct Directive {
    name: String,
    arg: String,
    options: Vec<(String, String)>,
    body: Vec<String>,
    min_indent: usize,
    in_options: bool,
    parsed: Option<Nested>,
}

impl Directive {
    /// Checks if the text after `.. ` is a directive marker: a name followed
    /// by `::`
    pub fn check(rest: &str) -> Option<Self> {
        let pos = rest.find("::")?;
        let name = &rest[..pos];
        if name.is_empty()
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return None;
        }
        let after = &rest[pos + 2..];
        let arg = match after.strip_prefix(' ') {
            Some(arg) => arg,
            None if after.is_empty() => "",
            None => return None,
        };
        Some(Self {
            name: name.to_ascii_lowercase(),
            arg: arg.trim().to_owned(),
            options: Vec::new(),
            body: Vec::new(),
            min_indent: usize::MAX,
            in_options: true,
            parsed: None,
        })
    }

    pub fn next(&mut self, line: SkipIndent, ctx: &mut Context) -> LineResult {
        if line.indent == 0 {
            return TempBlock::check_block(line, ctx).into_line_result_done_self();
        }
        if self.in_options {
            if let Some(option) = parse_field(line.line) {
                self.options.push(option);
                return LineResult::None;
            }
            self.in_options = false;
        }
        self.min_indent = self.min_indent.min(line.indent);
        self.body.push(line.get_full());
        LineResult::None
    }

    pub fn next_blank(&mut self) -> LineResult {
        if self.in_options {
            self.in_options = false;
        } else {
            self.body.push(String::new());
        }
        LineResult::None
    }

    /// Parses the body as nested blocks for directives that contain them
    pub fn close(&mut self, ctx: &mut Context) {
        let admonition = ADMONITIONS.contains(self.name.as_str());
        if !(admonition || matches!(self.name.as_str(), "figure" | "table")) {
            return;
        }
        let mut nested = Nested::default();
        // for admonitions other than the generic one the argument is the
        // first line of the body
        if admonition && self.name != "admonition" && !self.arg.is_empty() {
            if let SkipIndentResult::Line(line) = SkipIndent::skip(&self.arg, 0) {
                nested.next_line(line, ctx);
            }
            nested.next_blank(ctx);
        }
        for line in self.body_lines() {
            match SkipIndent::skip(line, 0) {
                SkipIndentResult::Line(line) => nested.next_line(line, ctx),
                SkipIndentResult::Blank(_) => nested.next_blank(ctx),
            }
        }
        nested.close(ctx);
        self.parsed = Some(nested);
    }

    pub fn finish(self, targets: &Targets) -> Option<Block> {
        match self.name.as_str() {
            "code" | "code-block" | "sourcecode" => {
                let language = self.arg.split_whitespace().next().unwrap_or("").to_owned();
                Some(Block::CodeBlock(language, self.body_text()))
            },
            "raw" => Some(Block::Raw(self.body_text())),
            "image" => Some(self.image()),
            "figure" => {
                let image = self.image();
                let mut blocks = vec![image];
                if let Some(parsed) = self.parsed {
                    blocks.extend(parsed.finish(targets));
                }
                Some(Block::Container(blocks))
            },
            "csv-table" => self.csv_table(targets),
            "table" => {
                let caption = (!self.arg.is_empty()).then(|| self.arg.clone());
                let blocks = self.parsed.map(|p| p.finish(targets)).unwrap_or_default();
                match <[Block; 1]>::try_from(blocks) {
                    Ok([Block::Table(mut table)]) => {
                        table.caption = caption;
                        Some(Block::Table(table))
                    },
                    Ok([other]) => Some(other),
                    Err(blocks) => Some(Block::Container(blocks)),
                }
            },
            name if ADMONITIONS.contains(name) => {
                let mut blocks = Vec::new();
                if name == "admonition" && !self.arg.is_empty() {
                    blocks.push(Block::Para(vec![Inline::Strong(vec![Inline::Str(
                        self.arg.clone(),
                    )])]));
                }
                if let Some(parsed) = self.parsed {
                    blocks.extend(parsed.finish(targets));
                }
                Some(Block::Container(blocks))
            },
            name if SKIPPED.contains(name) => {
                debug!("directive {name:?} skipped");
                None
            },
            name => {
                warn!("unknown directive {name:?} dropped");
                None
            },
        }
    }

    fn image(&self) -> Block {
        let mut uri = self.arg.clone();
        for line in self.body_lines() {
            uri.push_str(line.trim());
        }
        let alt = self.option("alt").unwrap_or("").to_owned();
        Block::Image(uri, alt)
    }

    fn csv_table(&self, targets: &Targets) -> Option<Block> {
        let mut rows: Vec<Vec<String>> =
            self.body_lines().filter(|l| !l.trim().is_empty()).map(|l| parse_csv_row(l)).collect();
        let mut header = self.option("header").map(parse_csv_row);
        if header.is_none() {
            if let Some(count) = self.option("header-rows").and_then(|n| n.parse::<usize>().ok()) {
                if count > 0 && !rows.is_empty() {
                    header = Some(rows.remove(0));
                }
            }
        }
        let to_row = |cells: Vec<String>| {
            cells.into_iter().map(|cell| InlineParser::parse(&cell, targets)).collect()
        };
        Some(Block::Table(Table {
            header: header.map(|cells| to_row(cells)),
            rows: rows.into_iter().map(|cells| to_row(cells)).collect(),
            caption: (!self.arg.is_empty()).then(|| self.arg.clone()),
        }))
    }

    fn option(&self, key: &str) -> Option<&str> {
        self.options.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Body lines with the common indent stripped and trailing blanks removed
    fn body_lines(&self) -> impl Iterator<Item = &str> {
        let trailing =
            self.body.iter().rev().take_while(|l| l.trim().is_empty()).count();
        self.body[..self.body.len() - trailing].iter().map(|line| {
            if line.len() > self.min_indent { &line[self.min_indent..] } else { "" }
        })
    }

    fn body_text(&self) -> String {
        let mut result = String::new();
        for line in self.body_lines() {
            result.push_str(line);
            result.push('\n');
        }
        result.pop();
        result
    }
}

/// Parses a `:name: value` field marker line
pub fn parse_field(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix(':')?;
    let mut iter = rest.char_indices();
    let colon = loop {
        match iter.next()? {
            (_, '\\') => {
                iter.next();
            },
            (i, ':') => break i,
            (_, '\n') => return None,
            _ => {},
        }
    };
    if colon == 0 {
        return None;
    }
    let value = &rest[colon + 1..];
    if !(value.is_empty() || value.starts_with(' ')) {
        return None;
    }
    Some((rest[..colon].to_owned(), value.trim().to_owned()))
}

/// Splits one csv line into cells, honoring double quotes
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    quoted = false;
                }
            },
            '"' if current.trim().is_empty() => {
                current.clear();
                quoted = true;
            },
            ',' if !quoted => cells.push(std::mem::take(&mut current).trim().to_owned()),
            c => current.push(c),
        }
    }
    cells.push(current.trim().to_owned());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field(":alt: some text"), Some(("alt".into(), "some text".into())));
        assert_eq!(parse_field(":empty:"), Some(("empty".into(), String::new())));
        assert_eq!(parse_field("::"), None);
        assert_eq!(parse_field(":code:`x`"), None);
        assert_eq!(parse_field("plain"), None);
    }

    #[test]
    fn test_parse_csv_row() {
        assert_eq!(parse_csv_row("a, b, c"), vec!["a", "b", "c"]);
        assert_eq!(parse_csv_row("\"a, b\", c"), vec!["a, b", "c"]);
        assert_eq!(parse_csv_row("\"say \"\"hi\"\"\", x"), vec!["say \"hi\"", "x"]);
        assert_eq!(parse_csv_row("one"), vec!["one"]);
    }

    #[test]
    fn test_check() {
        assert!(Directive::check("code:: rust").is_some());
        assert!(Directive::check("code-block::").is_some());
        assert!(Directive::check("not a directive").is_none());
        assert!(Directive::check("spaced name:: x").is_none());
        assert!(Directive::check("::").is_none());
    }
}
