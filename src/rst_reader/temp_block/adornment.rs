use log::warn;

use crate::ast::{Block, Inline};
use crate::rst_reader::inline_parser::InlineParser;
use crate::rst_reader::iters::SkipIndent;
use crate::rst_reader::targets::Targets;
use crate::rst_reader::temp_block::paragraph::Paragraph;
use crate::rst_reader::temp_block::{CheckResult, LineResult, ToLineResult};
use crate::rst_reader::Context;

/// Checks if a line is a run of one repeated punctuation char, allowing
/// trailing whitespace. Runs of a single char are left as text.
pub fn adornment_run(line: &SkipIndent) -> Option<(char, usize)> {
    if !line.first.is_ascii_punctuation() {
        return None;
    }
    let mut iter = line.iter_rest();
    let count = 1 + iter.skip_while_eq(line.first);
    iter.skip_whitespace();
    (iter.ended() && count >= 2).then_some((line.first, count))
}

/// A line of repeated punctuation: a transition, or the overline of a section
/// title
#[derive(Debug)]
pub struct Adornment {
    ch: char,
    width: usize,
    title: Option<String>,
    section: Option<(usize, String)>,
}

impl Adornment {
    /// Checks if the line is an adornment line
    pub fn check(line: SkipIndent) -> CheckResult {
        match adornment_run(&line) {
            Some((ch, width)) => {
                CheckResult::New(Self { ch, width, title: None, section: None }.into())
            },
            None => CheckResult::Text(line),
        }
    }

    pub fn next(&mut self, line: SkipIndent, ctx: &mut Context) -> LineResult {
        let Some(title) = &self.title else {
            // overlined titles may be indented
            self.title = Some(line.line.trim_end().to_owned());
            return LineResult::None;
        };
        match adornment_run(&line) {
            Some((ch, _)) if ch == self.ch => {
                let level = ctx.styles.level(ch, true);
                let id = ctx.targets.add_internal(title);
                self.section = Some((level, id));
                LineResult::DoneSelf
            },
            _ => {
                warn!("section title overline without matching underline");
                let content =
                    format!("{}\n{}\n{}", self.run(), title, line.get_full().trim_end());
                Paragraph::with_content(content).new()
            },
        }
    }

    pub fn next_blank(&mut self) -> LineResult {
        if self.title.is_some() {
            warn!("incomplete section title");
        }
        LineResult::DoneSelf
    }

    /// Finishes into a header, a transition, or degrades to text
    pub fn finish(self, targets: &Targets) -> Option<Block> {
        let run = self.run();
        match (self.section, self.title) {
            (Some((level, id)), Some(title)) => {
                Some(Block::new_header(level, id, InlineParser::parse(&title, targets)))
            },
            (None, Some(title)) => Some(Block::Para(vec![Inline::Str(format!("{run}\n{title}"))])),
            (_, None) =>
                if self.width >= 4 {
                    Some(Block::Transition)
                } else {
                    Some(Block::Para(vec![Inline::Str(run)]))
                },
        }
    }

    fn run(&self) -> String { self.ch.to_string().repeat(self.width) }
}
