use derivative::Derivative;
use serde::{Deserialize, Serialize};

type Int = i32;
type Text = String;

/// A parsed document, the root of the tree. Built once by a reader, consumed
/// once by a writer.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    #[must_use]
    pub const fn new(blocks: Vec<Block>) -> Self { Self { blocks } }
}

#[derive(Serialize, Deserialize, Debug, Derivative)]
#[serde(tag = "t", content = "c")]
#[derivative(PartialEq)]
pub enum Block {
    Para(Vec<Inline>),
    Header(Int, #[derivative(PartialEq = "ignore")] Text, Vec<Inline>),
    CodeBlock(Text, Text),
    BulletList(Vec<Vec<Block>>),
    OrderedList(Int, Vec<Vec<Block>>),
    DefinitionList(Vec<(Vec<Inline>, Vec<Block>)>),
    BlockQuote(Vec<Block>),
    Table(Table),
    Image(Text, Text),
    Target(TargetKind),
    Container(Vec<Block>),
    Raw(Text),
    Transition,
}

impl Block {
    /// Creates a header with a generated id from a level and content
    #[must_use]
    pub fn new_header(level: usize, id: Text, content: Vec<Inline>) -> Self {
        Self::Header(level as Int, id, content)
    }

    /// Creates an ordered list from a start number and items
    #[must_use]
    pub fn new_ordered_list(start: usize, items: Vec<Vec<Block>>) -> Self {
        Self::OrderedList(start as Int, items)
    }
}

/// A hyperlink target kept in the tree: an internal anchor or an external
/// link definition
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "t", content = "c")]
pub enum TargetKind {
    Internal(Text),
    External(Text, Text),
}

/// A table with an optional header row and caption. Alignments don't exist,
/// reStructuredText tables carry none.
#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Table {
    pub header: Option<Row>,
    pub rows: Vec<Row>,
    pub caption: Option<Text>,
}

pub type Row = Vec<Cell>;
pub type Cell = Vec<Inline>;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(tag = "t", content = "c")]
pub enum Inline {
    Str(Text),
    Emph(Vec<Inline>),
    Strong(Vec<Inline>),
    Literal(Text),
    Reference(Vec<Inline>, RefTarget),
    LineBreak,
}

impl Inline {
    #[must_use]
    pub fn str(s: &str) -> Self { Self::Str(s.to_owned()) }
}

/// What a reference points at after resolution
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(tag = "t", content = "c")]
pub enum RefTarget {
    Uri(Text),
    Internal(Text),
    Named(Text),
}
