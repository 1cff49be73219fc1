use std::iter::Peekable;
use std::str::CharIndices;

/// Represents the result after skipping indent
#[derive(Debug)]
pub enum SkipIndentResult<'a> {
    /// A non blank line result
    Line(SkipIndent<'a>),
    /// A blank line with indent count
    Blank(usize),
}

impl<'a> SkipIndentResult<'a> {
    /// Moves into the [`Self::Line`] variant (for testing)
    /// # Panics
    /// If is not in [`Self::Line`] variant
    #[cfg(test)]
    pub const fn into_line(self) -> SkipIndent<'a> {
        match self {
            SkipIndentResult::Line(s) => s,
            SkipIndentResult::Blank(_) => panic!(),
        }
    }
}

/// Represents a result of skipping indent in a non-blank line
#[derive(Debug, Clone)]
pub struct SkipIndent<'a> {
    /// First found char of the line
    pub first: char,
    /// Indent skipped
    pub indent: usize,
    /// Total indent (for keeping track of tab-stops)
    total: usize,
    /// Line with trimmed indent from the start
    pub line: &'a str,
}

impl<'a> SkipIndent<'a> {
    /// Skips indent of a line with a given total indent for tracking tab-stops
    pub fn skip(line: &'a str, total_indent: usize) -> SkipIndentResult<'a> {
        let mut total = total_indent;
        for (i, c) in line.char_indices() {
            match c {
                ' ' => total += 1,
                '\t' => total = total + (4 - (total % 4)),
                c => {
                    return SkipIndentResult::Line(Self {
                        first: c,
                        indent: total - total_indent,
                        total,
                        // Safety: using index from CharIndices
                        line: unsafe { line.get_unchecked(i..) },
                    });
                },
            }
        }
        SkipIndentResult::Blank(total - total_indent)
    }

    /// Moves indent unchecked
    pub fn move_indent(&mut self, indent: usize) { self.indent -= indent; }

    /// Moves indent checking for overflow
    pub fn move_indent_capped(&mut self, indent: usize) {
        self.indent = self.indent.saturating_sub(indent);
    }

    /// Gets line without the first char
    pub fn get_rest(&self) -> &'a str {
        // Safety: using utf8 length of first char as index
        unsafe { self.line.get_unchecked(self.first.len_utf8()..) }
    }

    /// Iterates with [`Iter`] over the line without the first char
    pub fn iter_rest(&self) -> Iter<'a> { Iter::new(self.get_rest()) }

    /// Skips indent again from the line without the first char
    pub fn skip_indent_rest(&self) -> SkipIndentResult<'a> {
        Self::skip(self.get_rest(), self.total + 1)
    }

    /// Gets full line as owned string, the skipped indent restored as spaces
    pub fn get_full(&self) -> String {
        match self.indent {
            0 => self.line.to_owned(),
            c => " ".repeat(c) + self.line,
        }
    }
}

/// Custom iterator over a string with useful functions
pub struct Iter<'a> {
    source: &'a str,
    iter: Peekable<CharIndices<'a>>,
}

impl<'a> Iter<'a> {
    /// Creates a new iterator over a given string slice
    pub fn new(source: &'a str) -> Self { Self { source, iter: source.char_indices().peekable() } }

    /// Gets next char
    pub fn next(&mut self) -> Option<char> { self.iter.next().map(|x| x.1) }

    /// Skips if next char is equal to a given char and returns if it skipped
    pub fn next_if_eq(&mut self, c: char) -> bool {
        match self.iter.peek() {
            Some(&(_, current)) if current == c => {
                self.iter.next();
                true
            },
            Some(_) | None => false,
        }
    }

    /// Skips over all the occurrences of a char and returns the amount skipped
    pub fn skip_while_eq(&mut self, c: char) -> usize {
        let mut result = 0;
        loop {
            match self.iter.peek() {
                Some(&(_, current)) if current == c => {
                    self.iter.next();
                    result += 1;
                },
                Some(_) | None => return result,
            }
        }
    }

    /// Skips over whitespace (spaces and tabs)
    pub fn skip_whitespace(&mut self) {
        loop {
            match self.iter.peek() {
                Some((_, ' ' | '\t')) => {
                    self.iter.next();
                },
                Some(_) | None => return,
            }
        }
    }

    /// Returns if the iterator reached the end of the string
    pub fn ended(&mut self) -> bool { self.iter.peek().is_none() }

    /// Gets the number given the first char, returns the number and its digit count
    pub fn get_number(&mut self, first: char) -> Option<(usize, usize)> {
        let mut result = first as usize - '0' as usize;
        let mut length = 1;
        loop {
            match self.iter.peek() {
                Some(&(_, c @ '0'..='9')) => {
                    length += 1;
                    if length > 9 {
                        return None;
                    }
                    result = 10 * result + (c as usize - '0' as usize);
                    self.iter.next();
                },
                Some(_) | None => return Some((result, length)),
            }
        }
    }

    /// Gets the rest of the slice
    pub fn get_str(&mut self) -> &'a str {
        match self.iter.peek() {
            // Safety: index from CharIndices
            Some(&(i, _)) => unsafe { self.source.get_unchecked(i..) },
            None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_indent(line: &str, total: usize, expected_indent: usize) {
        match SkipIndent::skip(line, total) {
            SkipIndentResult::Line(SkipIndent { indent, .. }) => assert_eq!(indent, expected_indent),
            SkipIndentResult::Blank(_) => panic!(),
        }
    }

    #[test]
    fn test_skip() {
        check_indent("line", 0, 0);
        check_indent("  line", 0, 2);
        check_indent("\tline", 0, 4);
        check_indent(" \tline", 0, 4);
        check_indent("   \tline", 0, 4);
        check_indent("    \tline", 0, 8);
        check_indent("  \t line", 0, 5);
        assert!(matches!(SkipIndent::skip("   ", 0), SkipIndentResult::Blank(3)));
        assert!(matches!(SkipIndent::skip("", 0), SkipIndentResult::Blank(0)));
    }

    #[test]
    fn test_move_indent() {
        let mut line = SkipIndent::skip("    text", 0).into_line();
        line.move_indent(4);
        assert_eq!(line.indent, 0);
        assert_eq!(line.get_full(), "text");
        let mut line = SkipIndent::skip("      text", 0).into_line();
        line.move_indent(4);
        assert_eq!(line.get_full(), "  text");
        line.move_indent_capped(4);
        assert_eq!(line.indent, 0);
    }
}
