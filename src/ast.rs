/// A programme is a sequence of elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Programme {
    pub elements: Vec<Element>,
}

/// An element of a programme: a single operation or a parenthesised group.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Op(Op),
    /// `(<elements>)[<count>]` - a group, optionally repeated
    Group(Group),
}

/// A parenthesised sub-sequence with an optional repeat count.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub elements: Vec<Element>,
    /// Repeat count as written; `None` means the group appears once.
    pub count: Option<usize>,
}

/// An operation in the take-skip language.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// `t<n>` - take n bits
    Take(usize),
    /// `s<n>` - skip n bits
    Skip(usize),
    /// `r<n>` - take n bits in reverse order
    Reverse(usize),
    /// `i<n>` - take n bits inverted
    Invert(usize),
    /// `ri<n>` - take n bits reversed then inverted
    ReverseInvert(usize),
    /// `b<n>` - move the cursor back n bits
    Backup(usize),
    /// `z<n>` - emit n zero bits
    ZeroPad(usize),
    /// `n<n>` - emit n one bits
    OnePad(usize),
    /// `d<binary>` - emit a literal bit pattern
    LiteralPad(Vec<u8>),
    /// `p<list>` - gather bits by 1-based index
    Permute(IndexList),
}

/// A comma-separated list of 1-based indices and ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexList {
    pub items: Vec<IndexItem>,
}

/// A single item in an index list.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexItem {
    /// A single 1-based index
    Index(usize),
    /// An inclusive 1-based range; descending when `start > end`
    Range { start: usize, end: usize },
}
