use std::iter;

use adornment::Adornment;
use block_quote::BlockQuote;
use bullet_list::BulletList;
use comment::Comment;
use definition_list::DefinitionList;
use derive_more::From;
use directive::Directive;
use enumerated_list::EnumeratedList;
use explicit::{Explicit, ExplicitTarget};
use grid_table::GridTable;
use literal_block::LiteralBlock;
use paragraph::Paragraph;
use simple_table::SimpleTable;

use crate::ast::Block;
use crate::rst_reader::iters::{SkipIndent, SkipIndentResult};
use crate::rst_reader::targets::Targets;
use crate::rst_reader::Context;

mod adornment;
mod block_quote;
mod bullet_list;
mod comment;
mod definition_list;
mod directive;
mod enumerated_list;
mod explicit;
mod grid_table;
mod literal_block;
mod paragraph;
mod simple_table;

/// A block while it is being parsed line by line
#[derive(From, Debug)]
pub enum TempBlock {
    Empty,
    Paragraph(Paragraph),
    Adornment(Adornment),
    LiteralBlock(LiteralBlock),
    BlockQuote(BlockQuote),
    BulletList(BulletList),
    EnumeratedList(EnumeratedList),
    DefinitionList(DefinitionList),
    Comment(Comment),
    ExplicitTarget(ExplicitTarget),
    Directive(Directive),
    SimpleTable(SimpleTable),
    GridTable(GridTable),
}

impl TempBlock {
    /// Parses the next line of the document
    pub fn next_line(&mut self, line: &str, finished: &mut Vec<Self>, ctx: &mut Context) {
        let result = match SkipIndent::skip(line, 0) {
            SkipIndentResult::Line(line) => self.next_non_blank(line, ctx),
            SkipIndentResult::Blank(_) => self.next_blank(ctx),
        };
        self.apply_result(result, finished, ctx);
    }

    fn next_non_blank(&mut self, line: SkipIndent, ctx: &mut Context) -> LineResult {
        match self {
            Self::Empty => Self::check_block(line, ctx).into_line_result(),
            Self::Paragraph(p) => p.next(line, ctx),
            Self::Adornment(a) => a.next(line, ctx),
            Self::LiteralBlock(l) => l.next(line, ctx),
            Self::BlockQuote(b) => b.next(line, ctx),
            Self::BulletList(l) => l.next(line, ctx),
            Self::EnumeratedList(l) => l.next(line, ctx),
            Self::DefinitionList(d) => d.next(line, ctx),
            Self::Comment(c) => c.next(line, ctx),
            Self::ExplicitTarget(t) => t.next(line, ctx),
            Self::Directive(d) => d.next(line, ctx),
            Self::SimpleTable(t) => t.next(line, ctx),
            Self::GridTable(t) => t.next(line, ctx),
        }
    }

    fn next_blank(&mut self, ctx: &mut Context) -> LineResult {
        match self {
            Self::Empty => LineResult::None,
            Self::Paragraph(p) => p.next_blank(),
            Self::Adornment(a) => a.next_blank(),
            Self::LiteralBlock(l) => l.next_blank(),
            Self::BlockQuote(b) => b.next_blank(ctx),
            Self::BulletList(l) => l.next_blank(ctx),
            Self::EnumeratedList(l) => l.next_blank(ctx),
            Self::DefinitionList(d) => d.next_blank(ctx),
            Self::Comment(c) => c.next_blank(),
            Self::ExplicitTarget(t) => t.next_blank(),
            Self::Directive(d) => d.next_blank(),
            Self::SimpleTable(t) => t.next_blank(),
            Self::GridTable(t) => t.next_blank(),
        }
    }

    /// Checks which block a line opens in a context where no block is in
    /// progress
    pub fn check_block<'a>(line: SkipIndent<'a>, ctx: &mut Context) -> CheckResult<'a> {
        if line.indent > 0 {
            return CheckResult::New(BlockQuote::new(line, ctx).into());
        }
        match line.first {
            '.' => Explicit::check(line),
            '-' | '*' => BulletList::check(line, ctx).or_else(|l| Adornment::check(l)),
            '+' => GridTable::check(line)
                .or_else(|l| BulletList::check(l, ctx))
                .or_else(|l| Adornment::check(l)),
            '#' => EnumeratedList::check(line, ctx).or_else(|l| Adornment::check(l)),
            '0'..='9' => EnumeratedList::check(line, ctx),
            '(' => EnumeratedList::check(line, ctx),
            '=' => SimpleTable::check(line).or_else(|l| Adornment::check(l)),
            ':' => Explicit::check_field(line).or_else(|l| Adornment::check(l)),
            c if c.is_ascii_punctuation() => Adornment::check(line),
            _ => CheckResult::Text(line),
        }
    }

    fn apply_result(&mut self, result: LineResult, finished: &mut Vec<Self>, ctx: &mut Context) {
        match result {
            LineResult::None => {},
            LineResult::New(new) => *self = new,
            LineResult::DoneSelf => {
                self.close(ctx);
                finished.push(self.take());
            },
            LineResult::DoneSelfAndNew(block) => {
                self.close(ctx);
                finished.push(self.replace(block));
            },
            LineResult::DoneSelfAndOther(mut block) => {
                self.close(ctx);
                finished.push(self.take());
                block.close(ctx);
                finished.push(block);
            },
        }
    }

    /// Runs the side effects of a block ending: containers close their inner
    /// machinery, targets register themselves
    pub fn close(&mut self, ctx: &mut Context) {
        match self {
            Self::ExplicitTarget(t) => t.register(ctx),
            Self::BlockQuote(b) => b.close(ctx),
            Self::BulletList(l) => l.close(ctx),
            Self::EnumeratedList(l) => l.close(ctx),
            Self::DefinitionList(d) => d.close(ctx),
            Self::Directive(d) => d.close(ctx),
            Self::Empty
            | Self::Paragraph(_)
            | Self::Adornment(_)
            | Self::LiteralBlock(_)
            | Self::Comment(_)
            | Self::SimpleTable(_)
            | Self::GridTable(_) => {},
        }
    }

    /// Finishes the block into an ast [`Block`] resolving references against
    /// the collected targets
    pub fn finish(self, targets: &Targets) -> Option<Block> {
        match self {
            Self::Empty | Self::Comment(_) => None,
            Self::Paragraph(p) => p.finish(targets),
            Self::Adornment(a) => a.finish(targets),
            Self::LiteralBlock(l) => Some(l.finish()),
            Self::BlockQuote(b) => Some(b.finish(targets)),
            Self::BulletList(l) => Some(l.finish(targets)),
            Self::EnumeratedList(l) => Some(l.finish(targets)),
            Self::DefinitionList(d) => d.finish(targets),
            Self::ExplicitTarget(t) => t.finish(),
            Self::Directive(d) => d.finish(targets),
            Self::SimpleTable(t) => t.finish(targets),
            Self::GridTable(t) => t.finish(targets),
        }
    }

    fn take(&mut self) -> Self { std::mem::take(self) }

    fn replace(&mut self, new: Self) -> Self { std::mem::replace(self, new) }
}

impl Default for TempBlock {
    fn default() -> Self { Self::Empty }
}

/// What parsing a line did to the current block
pub enum LineResult {
    None,
    DoneSelf,
    New(TempBlock),
    DoneSelfAndNew(TempBlock),
    DoneSelfAndOther(TempBlock),
}

/// Result of checking whether a line opens a given block
pub enum CheckResult<'a> {
    New(TempBlock),
    Text(SkipIndent<'a>),
}

impl<'a> CheckResult<'a> {
    /// Chains another check to run if this one did not match
    pub fn or_else<F>(self, f: F) -> Self
    where F: FnOnce(SkipIndent<'a>) -> Self {
        match self {
            Self::Text(line) => f(line),
            other => other,
        }
    }

    /// Turns the check into a line result, text becoming a new paragraph
    pub fn into_line_result(self) -> LineResult {
        match self {
            Self::New(b) => LineResult::New(b),
            Self::Text(line) => LineResult::New(Paragraph::new(&line).into()),
        }
    }

    /// Turns the check into a line result finishing the current block first,
    /// text becoming a new paragraph
    pub fn into_line_result_done_self(self) -> LineResult {
        match self {
            Self::New(b) => LineResult::DoneSelfAndNew(b),
            Self::Text(line) => LineResult::DoneSelfAndNew(Paragraph::new(&line).into()),
        }
    }
}

pub trait ToLineResult {
    fn new(self) -> LineResult;

    fn done_self_and_new(self) -> LineResult;

    fn done_self_and_other(self) -> LineResult;
}

impl<T> ToLineResult for T
where T: Into<TempBlock>
{
    fn new(self) -> LineResult { LineResult::New(self.into()) }

    fn done_self_and_new(self) -> LineResult { LineResult::DoneSelfAndNew(self.into()) }

    fn done_self_and_other(self) -> LineResult { LineResult::DoneSelfAndOther(self.into()) }
}

/// A nested block machine used by every construct that contains blocks of its
/// own
#[derive(Debug, Default)]
pub struct Nested {
    current: Box<TempBlock>,
    finished: Vec<TempBlock>,
}

impl Nested {
    /// Creates a nested machine from its first, already indent-stripped line
    pub fn starting_with(line: SkipIndent, ctx: &mut Context) -> Self {
        let mut result = Self::default();
        result.next_line(line, ctx);
        result
    }

    /// Parses an indent-stripped non-blank line
    pub fn next_line(&mut self, line: SkipIndent, ctx: &mut Context) {
        let result = self.current.next_non_blank(line, ctx);
        self.current.apply_result(result, &mut self.finished, ctx);
    }

    /// Parses a blank line
    pub fn next_blank(&mut self, ctx: &mut Context) {
        let result = self.current.next_blank(ctx);
        self.current.apply_result(result, &mut self.finished, ctx);
    }

    /// Closes the block still in progress
    pub fn close(&mut self, ctx: &mut Context) { self.current.close(ctx); }

    /// Finishes all blocks into ast blocks
    pub fn finish(self, targets: &Targets) -> Vec<Block> {
        self.finished
            .into_iter()
            .chain(iter::once(*self.current))
            .filter_map(|t| t.finish(targets))
            .collect()
    }
}
