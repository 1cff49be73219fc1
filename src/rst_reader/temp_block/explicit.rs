use log::{debug, warn};

use crate::ast::{Block, TargetKind};
use crate::rst_reader::iters::SkipIndent;
use crate::rst_reader::targets::Targets;
use crate::rst_reader::temp_block::adornment::Adornment;
use crate::rst_reader::temp_block::comment::Comment;
use crate::rst_reader::temp_block::directive::{parse_field, Directive};
use crate::rst_reader::temp_block::{CheckResult, LineResult, TempBlock};
use crate::rst_reader::Context;

/// Dispatch for explicit markup starting with `..`: comments, hyperlink
/// targets, substitution definitions and directives
pub struct Explicit;

impl Explicit {
    pub fn check(line: SkipIndent) -> CheckResult {
        if line.line.trim_end() == ".." {
            return CheckResult::New(Comment.into());
        }
        let Some(rest) = line.line.strip_prefix(".. ") else {
            return Adornment::check(line);
        };
        let rest = rest.trim();
        if let Some(target) = rest.strip_prefix('_') {
            return match ExplicitTarget::parse(target) {
                Some(target) => CheckResult::New(target.into()),
                None => {
                    warn!("malformed hyperlink target: {rest:?}");
                    CheckResult::New(Comment.into())
                },
            };
        }
        if rest.starts_with('|') {
            warn!("substitution definition dropped: {rest:?}");
            return CheckResult::New(Comment.into());
        }
        match Directive::check(rest) {
            Some(directive) => CheckResult::New(directive.into()),
            None => CheckResult::New(Comment.into()),
        }
    }

    /// A field list, visible at the top level only as docinfo, is dropped
    pub fn check_field(line: SkipIndent) -> CheckResult {
        match parse_field(line.line) {
            Some((name, _)) => {
                warn!("field list dropped: {name:?}");
                CheckResult::New(Comment.into())
            },
            None => CheckResult::Text(line),
        }
    }
}

/// A hyperlink target: internal (`.. _name:`) registering an anchor, or
/// external (`.. _name: uri`), the uri possibly continued on indented lines
#[derive(Debug)]
pub struct ExplicitTarget {
    name: String,
    uri: String,
    id: Option<String>,
}

impl ExplicitTarget {
    /// Parses the part after `.. _`
    fn parse(rest: &str) -> Option<Self> {
        let (name, uri) = if let Some(quoted) = rest.strip_prefix('`') {
            let end = quoted.find('`')?;
            let after = quoted[end + 1..].strip_prefix(':')?;
            (&quoted[..end], after)
        } else {
            let mut iter = rest.char_indices();
            let colon = loop {
                match iter.next()? {
                    (_, '\\') => {
                        iter.next();
                    },
                    (i, ':') => break i,
                    _ => {},
                }
            };
            (&rest[..colon], &rest[colon + 1..])
        };
        let name = name.trim();
        if name.is_empty() || name == "_" {
            debug!("anonymous target dropped");
            return None;
        }
        Some(Self { name: name.to_owned(), uri: uri.trim().to_owned(), id: None })
    }

    pub fn next(&mut self, line: SkipIndent, ctx: &mut Context) -> LineResult {
        if line.indent > 0 {
            self.uri.push_str(line.line.trim());
            LineResult::None
        } else {
            TempBlock::check_block(line, ctx).into_line_result_done_self()
        }
    }

    pub const fn next_blank(&self) -> LineResult { LineResult::DoneSelf }

    /// Registers the target once the block is done
    pub fn register(&mut self, ctx: &mut Context) {
        if self.uri.is_empty() {
            self.id = Some(ctx.targets.add_internal(&self.name));
        } else {
            ctx.targets.add_external(&self.name, &self.uri);
        }
    }

    pub fn finish(self) -> Option<Block> {
        Some(Block::Target(match self.id {
            Some(id) => TargetKind::Internal(id),
            None => TargetKind::External(Targets::strip(&self.name), self.uri),
        }))
    }
}
