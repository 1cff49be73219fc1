//! Parsing of inline markup inside block content. reStructuredText inline
//! markup does not nest, so span contents are plain text with escapes.

use log::warn;

use crate::ast::{Inline, RefTarget};
use crate::rst_reader::targets::{Resolved, Targets};

/// Structure containing methods for parsing inline markup, the main entry
/// point being [`InlineParser::parse`]
pub struct InlineParser;

impl InlineParser {
    /// Parses the inline markup of one block of content. Line breaks inside
    /// the content are kept in the text.
    pub fn parse(source: &str, targets: &Targets) -> Vec<Inline> {
        Parser::new(source, targets).run()
    }

    /// Parses the content of a table cell given as lines, joining the parsed
    /// lines with [`Inline::LineBreak`]
    pub fn parse_cell(lines: &[String], targets: &Targets) -> Vec<Inline> {
        let mut result = Vec::new();
        let last = lines.len().saturating_sub(1);
        for (i, line) in lines.iter().enumerate() {
            result.extend(Self::parse(line, targets));
            if i != last {
                result.push(Inline::LineBreak);
            }
        }
        result
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    text: String,
    result: Vec<Inline>,
    targets: &'a Targets,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, targets: &'a Targets) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
            text: String::new(),
            result: Vec::new(),
            targets,
        }
    }

    fn run(mut self) -> Vec<Inline> {
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos].1;
            match c {
                '\\' => self.escape(),
                '*' => self.emphasis(),
                '`' => self.backtick(),
                '_' => self.trailing_reference(),
                '|' => self.substitution(),
                'h' => self.maybe_uri(),
                c => {
                    self.text.push(c);
                    self.pos += 1;
                },
            }
        }
        self.flush();
        self.result
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.result.push(Inline::Str(std::mem::take(&mut self.text)));
        }
    }

    fn push(&mut self, inline: Inline) {
        self.flush();
        self.result.push(inline);
    }

    /// An escaped whitespace char vanishes, any other escaped char is literal
    fn escape(&mut self) {
        match self.chars.get(self.pos + 1) {
            Some(&(_, c)) => {
                if !c.is_whitespace() {
                    self.text.push(c);
                }
                self.pos += 2;
            },
            None => self.pos += 1,
        }
    }

    fn char_at(&self, pos: usize) -> Option<char> { self.chars.get(pos).map(|x| x.1) }

    fn slice(&self, from: usize, to: usize) -> &'a str {
        let start = self.chars[from].0;
        let end = match self.chars.get(to) {
            Some(&(i, _)) => i,
            None => self.source.len(),
        };
        &self.source[start..end]
    }

    /// Checks if a start-string may open at the current position: start of
    /// input, after whitespace or after an opening punctuation char
    fn opener_boundary(&self) -> bool {
        match self.pos.checked_sub(1).and_then(|p| self.char_at(p)) {
            None => true,
            Some(c) => c.is_whitespace() || matches!(c, '\'' | '"' | '(' | '[' | '{' | '<' | '-' | '/' | ':' | '_'),
        }
    }

    /// Checks if an end-string may close right before the given position:
    /// end of input, whitespace or a closing punctuation char
    fn closer_boundary(&self, pos: usize) -> bool {
        match self.char_at(pos) {
            None => true,
            Some(c) => c.is_whitespace() || c.is_ascii_punctuation(),
        }
    }

    /// Finds the end-string of an emphasis span: `count` marker chars neither
    /// escaped nor preceded by whitespace, followed by a valid boundary
    fn find_emphasis_end(&self, from: usize, count: usize) -> Option<usize> {
        let mut i = from;
        while i < self.chars.len() {
            match self.chars[i].1 {
                '\\' => i += 2,
                '*' if i > from
                    && !self.chars[i - 1].1.is_whitespace()
                    && (count == 1 || self.char_at(i + 1) == Some('*'))
                    && self.closer_boundary(i + count) =>
                    return Some(i),
                _ => i += 1,
            }
        }
        None
    }

    fn emphasis(&mut self) {
        let strong = self.char_at(self.pos + 1) == Some('*');
        let count = if strong { 2 } else { 1 };
        let start = self.pos + count;
        if self.opener_boundary()
            && self.char_at(start).is_some_and(|c| !c.is_whitespace() && c != '*')
        {
            if let Some(end) = self.find_emphasis_end(start, count) {
                let content = vec![Inline::Str(unescape(self.slice(start, end)))];
                self.push(if strong { Inline::Strong(content) } else { Inline::Emph(content) });
                self.pos = end + count;
                return;
            }
        }
        self.text.push('*');
        self.pos += 1;
    }

    /// Finds an unescaped char starting the search at `from`
    fn find_char(&self, from: usize, c: char) -> Option<usize> {
        let mut i = from;
        while i < self.chars.len() {
            match self.chars[i].1 {
                '\\' => i += 2,
                current if current == c => return Some(i),
                _ => i += 1,
            }
        }
        None
    }

    fn backtick(&mut self) {
        if self.char_at(self.pos + 1) == Some('`') {
            // inline literal, no markup or escapes inside
            let start = self.pos + 2;
            let mut i = start;
            while i < self.chars.len() {
                if self.chars[i].1 == '`' && self.char_at(i + 1) == Some('`') && i > start {
                    self.push(Inline::Literal(self.slice(start, i).to_owned()));
                    self.pos = i + 2;
                    return;
                }
                i += 1;
            }
            self.text.push_str("``");
            self.pos += 2;
            return;
        }
        let start = self.pos + 1;
        match self.find_char(start, '`') {
            Some(end) if end > start => {
                let content = self.slice(start, end);
                if self.char_at(end + 1) == Some('_') {
                    let anonymous = self.char_at(end + 2) == Some('_');
                    self.phrase_reference(content);
                    self.pos = end + if anonymous { 3 } else { 2 };
                } else {
                    self.interpreted(content);
                    self.pos = end + 1;
                }
            },
            _ => {
                self.text.push('`');
                self.pos += 1;
            },
        }
    }

    /// A phrase reference, either with an embedded uri (`` `text <uri>`_ ``)
    /// or resolved by name
    fn phrase_reference(&mut self, content: &str) {
        let content = content.trim();
        if let Some(stripped) = content.strip_suffix('>') {
            if let Some(pos) = stripped.rfind('<') {
                if pos == 0 || stripped[..pos].ends_with(char::is_whitespace) {
                    let uri = stripped[pos + 1..].to_owned();
                    let text = stripped[..pos].trim_end();
                    let text = if text.is_empty() { uri.clone() } else { unescape(text) };
                    self.push(Inline::Reference(vec![Inline::Str(text)], RefTarget::Uri(uri)));
                    return;
                }
            }
        }
        self.reference(&unescape(content));
    }

    /// A reference with no embedded uri, resolved against the targets
    fn reference(&mut self, name: &str) {
        let target = match self.targets.resolve(name) {
            Resolved::Uri(uri) => RefTarget::Uri(uri),
            Resolved::Internal(id) => RefTarget::Internal(id),
            Resolved::Unknown => RefTarget::Named(Targets::strip(name)),
        };
        self.push(Inline::Reference(vec![Inline::Str(name.to_owned())], target));
    }

    /// Interpreted text: the role decides the inline, roles other than the
    /// literal ones pass their content through as plain text
    fn interpreted(&mut self, content: &str) {
        match self.take_role().as_deref() {
            Some("code" | "literal") => self.push(Inline::Literal(content.to_owned())),
            Some(_) | None => self.text.push_str(&unescape(content)),
        }
    }

    /// Takes a `:role:` suffix off the accumulated text if one directly
    /// precedes the interpreted text
    fn take_role(&mut self) -> Option<String> {
        let stripped = self.text.strip_suffix(':')?;
        let start = stripped.rfind(|c: char| !c.is_alphanumeric() && c != '-' && c != '_')?;
        if !stripped[start..].starts_with(':') || start + 1 == stripped.len() {
            return None;
        }
        let role = stripped[start + 1..].to_owned();
        self.text.truncate(start);
        Some(role)
    }

    /// A trailing `name_` reference: the name is taken back out of the
    /// accumulated text
    fn trailing_reference(&mut self) {
        let anonymous = self.char_at(self.pos + 1) == Some('_');
        let after = self.pos + if anonymous { 2 } else { 1 };
        if self.closer_boundary(after) {
            if let Some(name) = take_simple_name(&mut self.text) {
                self.reference(&name);
                self.pos = after;
                return;
            }
        }
        self.text.push('_');
        self.pos += 1;
    }

    /// A substitution reference. Definitions are not expanded, the reference
    /// is dropped.
    fn substitution(&mut self) {
        if self.opener_boundary() {
            if let Some(end) = self.find_char(self.pos + 1, '|') {
                let content = self.slice(self.pos + 1, end);
                if !content.is_empty() && !content.contains('\n') {
                    warn!("substitution reference |{content}| dropped");
                    self.pos = end + 1;
                    return;
                }
            }
        }
        self.text.push('|');
        self.pos += 1;
    }

    /// A standalone `http://` or `https://` uri becomes a link of its own
    fn maybe_uri(&mut self) {
        let rest = &self.source[self.chars[self.pos].0..];
        if (!rest.starts_with("http://") && !rest.starts_with("https://"))
            || !(self.text.is_empty() || self.text.ends_with([' ', '\t', '\n', '(', '<', '[']))
        {
            self.text.push('h');
            self.pos += 1;
            return;
        }
        let mut end = self.pos;
        while end < self.chars.len() && !self.chars[end].1.is_whitespace() && self.chars[end].1 != '>' {
            end += 1;
        }
        let mut uri = self.slice(self.pos, end);
        while uri.ends_with(['.', ',', ';', ':', '!', '?', ')', '"', '\'']) {
            uri = &uri[..uri.len() - 1];
        }
        let uri = uri.to_owned();
        self.pos += uri.chars().count();
        self.push(Inline::Reference(vec![Inline::Str(uri.clone())], RefTarget::Uri(uri)));
    }
}

/// Removes escaping backslashes, dropping escaped whitespace entirely
fn unescape(source: &str) -> String {
    let mut result = String::new();
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(c) if c.is_whitespace() => {},
                Some(c) => result.push(c),
                None => {},
            },
            c => result.push(c),
        }
    }
    result
}

/// Takes a trailing reference name (alphanumerics with internal `-`, `_`,
/// `.`, `+`) off the end of a string
fn take_simple_name(text: &mut String) -> Option<String> {
    let trailing = text
        .chars()
        .rev()
        .take_while(|&c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '+'))
        .count();
    if trailing == 0 {
        return None;
    }
    let start = text.len() - text.chars().rev().take(trailing).map(char::len_utf8).sum::<usize>();
    if !text[start..].starts_with(char::is_alphanumeric) {
        return None;
    }
    let name = text[start..].to_owned();
    text.truncate(start);
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Inline::{Emph, Literal, Reference, Str, Strong};

    fn parse(source: &str) -> Vec<Inline> { InlineParser::parse(source, &Targets::new()) }

    #[test]
    fn test_plain() {
        assert_eq!(parse("just text"), vec![Str("just text".into())]);
        assert_eq!(parse(""), vec![]);
        assert_eq!(parse("two\nlines"), vec![Str("two\nlines".into())]);
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(parse("*em*"), vec![Emph(vec![Str("em".into())])]);
        assert_eq!(parse("**strong**"), vec![Strong(vec![Str("strong".into())])]);
        assert_eq!(
            parse("a *b* c"),
            vec![Str("a ".into()), Emph(vec![Str("b".into())]), Str(" c".into())]
        );
        assert_eq!(parse("2 * 3 * 4"), vec![Str("2 * 3 * 4".into())]);
        assert_eq!(parse("un*frequent*ly"), vec![Str("un*frequent*ly".into())]);
        assert_eq!(parse(r"\*not\*"), vec![Str("*not*".into())]);
        assert_eq!(parse("*"), vec![Str("*".into())]);
        assert_eq!(parse("**"), vec![Str("**".into())]);
    }

    #[test]
    fn test_literal() {
        assert_eq!(parse("``code``"), vec![Literal("code".into())]);
        assert_eq!(parse("``a * b``"), vec![Literal("a * b".into())]);
        assert_eq!(parse(r"``\n``"), vec![Literal(r"\n".into())]);
        assert_eq!(parse("``broken"), vec![Str("``broken".into())]);
    }

    #[test]
    fn test_roles() {
        assert_eq!(parse(":code:`x = 1`"), vec![Literal("x = 1".into())]);
        assert_eq!(parse(":literal:`raw`"), vec![Literal("raw".into())]);
        assert_eq!(parse(":math:`a + b`"), vec![Str("a + b".into())]);
        assert_eq!(parse("`default role`"), vec![Str("default role".into())]);
    }

    #[test]
    fn test_embedded_uri() {
        assert_eq!(
            parse("`Docs <https://example.org>`_"),
            vec![Reference(
                vec![Str("Docs".into())],
                RefTarget::Uri("https://example.org".into())
            )]
        );
        assert_eq!(
            parse("`anon <https://example.org>`__"),
            vec![Reference(
                vec![Str("anon".into())],
                RefTarget::Uri("https://example.org".into())
            )]
        );
        assert_eq!(
            parse("`<https://example.org>`_"),
            vec![Reference(
                vec![Str("https://example.org".into())],
                RefTarget::Uri("https://example.org".into())
            )]
        );
    }

    #[test]
    fn test_named_references() {
        let mut targets = Targets::new();
        targets.add_external("docs", "https://example.org");
        targets.add_internal("Usage");
        assert_eq!(
            InlineParser::parse("see docs_", &targets),
            vec![
                Str("see ".into()),
                Reference(vec![Str("docs".into())], RefTarget::Uri("https://example.org".into()))
            ]
        );
        assert_eq!(
            InlineParser::parse("see `Usage`_.", &targets),
            vec![
                Str("see ".into()),
                Reference(vec![Str("Usage".into())], RefTarget::Internal("usage".into())),
                Str(".".into())
            ]
        );
        assert_eq!(
            InlineParser::parse("dangling_", &targets),
            vec![Reference(vec![Str("dangling".into())], RefTarget::Named("dangling".into()))]
        );
        assert_eq!(InlineParser::parse("snake_case", &targets), vec![Str("snake_case".into())]);
    }

    #[test]
    fn test_standalone_uri() {
        assert_eq!(
            parse("see https://example.org."),
            vec![
                Str("see ".into()),
                Reference(
                    vec![Str("https://example.org".into())],
                    RefTarget::Uri("https://example.org".into())
                ),
                Str(".".into())
            ]
        );
        assert_eq!(parse("shttps://not.a.link"), vec![Str("shttps://not.a.link".into())]);
    }

    #[test]
    fn test_substitution() {
        assert_eq!(parse("a |sub| b"), vec![Str("a  b".into())]);
        assert_eq!(parse("a | b"), vec![Str("a | b".into())]);
    }
}
