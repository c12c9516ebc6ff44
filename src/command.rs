//! The command model: one variant per take-skip operation.
//!
//! A [`Command`] is immutable once built. Its emitted and consumed lengths
//! are known without running it; [`Command::apply`] performs the operation
//! against every row of a buffer at a shared cursor.

use std::fmt;

use serde::Serialize;

use crate::buffer::BitBuffer;
use crate::error::{Error, Result};
use crate::operators::{self, Read};

/// A single resolved take-skip operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Command {
    /// Emit the next n bits unchanged.
    Take(usize),
    /// Advance past the next n bits.
    Skip(usize),
    /// Emit the next n bits in reverse order.
    Reverse(usize),
    /// Emit the next n bits with each bit flipped.
    Invert(usize),
    /// Emit the next n bits reversed, then flipped.
    ReverseInvert(usize),
    /// Move the cursor back n bits.
    Backup(usize),
    /// Emit n zero bits.
    ZeroPad(usize),
    /// Emit n one bits.
    OnePad(usize),
    /// Emit a literal bit pattern.
    LiteralPad(Vec<u8>),
    /// Emit the bits at these zero-based positions, counted from the row start.
    Permute(Vec<IndexRange>),
}

/// An inclusive run of zero-based row positions, descending when
/// `start > end`. A single index is a range with `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A range written with 1-based positions, as in `p3-1`.
    pub fn one_based(start: usize, end: usize) -> Result<Self> {
        if start == 0 || end == 0 {
            return Err(Error::invalid_argument(
                "p: index 0 is out of range; permute indices are 1-based",
            ));
        }
        Ok(Self::new(start - 1, end - 1))
    }

    /// Number of positions covered; never zero.
    pub fn count(&self) -> usize {
        self.start.abs_diff(self.end).saturating_add(1)
    }

    /// The highest position covered.
    pub fn max(&self) -> usize {
        self.start.max(self.end)
    }

    /// The positions in order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + use<> {
        let Self { start, end } = *self;
        (0..self.count()).map(move |k| if start <= end { start + k } else { start - k })
    }
}

impl fmt::Display for IndexRange {
    /// 1-based, as written in command strings.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = (self.start as u128 + 1, self.end as u128 + 1);
        if start == end {
            write!(f, "{}", start)
        } else {
            write!(f, "{}-{}", start, end)
        }
    }
}

impl Command {
    /// Number of bits this command contributes to each output row.
    ///
    /// Reading commands may emit fewer when they run off the end of the input.
    pub fn emitted_length(&self) -> usize {
        match self {
            Command::Take(n)
            | Command::Reverse(n)
            | Command::Invert(n)
            | Command::ReverseInvert(n)
            | Command::ZeroPad(n)
            | Command::OnePad(n) => *n,
            Command::Skip(_) | Command::Backup(_) => 0,
            Command::LiteralPad(bits) => bits.len(),
            Command::Permute(ranges) => ranges
                .iter()
                .fold(0usize, |acc, r| acc.saturating_add(r.count())),
        }
    }

    /// Signed cursor movement; negative for [`Command::Backup`].
    ///
    /// Saturates at `isize::MAX` in either direction.
    pub fn consumed_length(&self) -> isize {
        let signed = |n: usize| isize::try_from(n).unwrap_or(isize::MAX);
        match self {
            Command::Take(n)
            | Command::Skip(n)
            | Command::Reverse(n)
            | Command::Invert(n)
            | Command::ReverseInvert(n) => signed(*n),
            Command::Backup(n) => -signed(*n),
            Command::ZeroPad(_) | Command::OnePad(_) | Command::LiteralPad(_) => 0,
            Command::Permute(ranges) => ranges
                .iter()
                .map(IndexRange::max)
                .max()
                .map_or(0, |max| signed(max.saturating_add(1))),
        }
    }

    /// Run the command at `cursor`, returning the emitted bits for every row
    /// and the new cursor.
    pub fn apply(&self, input: &BitBuffer, cursor: usize) -> Result<(BitBuffer, usize)> {
        match self {
            Command::Take(n) => operators::read(input, cursor, *n, Read::Plain),
            Command::Reverse(n) => operators::read(input, cursor, *n, Read::Reversed),
            Command::Invert(n) => operators::read(input, cursor, *n, Read::Inverted),
            Command::ReverseInvert(n) => operators::read(input, cursor, *n, Read::ReversedInverted),
            Command::Skip(n) => operators::skip(input, cursor, *n),
            Command::Backup(n) => operators::backup(input, cursor, *n),
            Command::ZeroPad(n) => Ok((operators::fill(input, 0, *n)?, cursor)),
            Command::OnePad(n) => Ok((operators::fill(input, 1, *n)?, cursor)),
            Command::LiteralPad(bits) => Ok((operators::literal(input, bits)?, cursor)),
            Command::Permute(ranges) => operators::permute(input, cursor, ranges),
        }
    }

    /// The operation letter used in command strings.
    pub fn letter(&self) -> &'static str {
        match self {
            Command::Take(_) => "t",
            Command::Skip(_) => "s",
            Command::Reverse(_) => "r",
            Command::Invert(_) => "i",
            Command::ReverseInvert(_) => "ri",
            Command::Backup(_) => "b",
            Command::ZeroPad(_) => "z",
            Command::OnePad(_) => "n",
            Command::LiteralPad(_) => "d",
            Command::Permute(_) => "p",
        }
    }
}

/// Renders the command in command-string syntax, with permute positions
/// written 1-based. Parsing the output yields the same command whenever the
/// command has a non-empty parameter; an empty literal or permute list has
/// no command-string form and renders as the bare letter.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())?;
        match self {
            Command::Take(n)
            | Command::Skip(n)
            | Command::Reverse(n)
            | Command::Invert(n)
            | Command::ReverseInvert(n)
            | Command::Backup(n)
            | Command::ZeroPad(n)
            | Command::OnePad(n) => write!(f, "{}", n),
            Command::LiteralPad(bits) => bits.iter().try_for_each(|b| write!(f, "{}", b)),
            Command::Permute(ranges) => {
                let mut first = true;
                for range in ranges {
                    if !first {
                        write!(f, ",")?;
                    }
                    first = false;
                    write!(f, "{}", range)?;
                }
                Ok(())
            }
        }
    }
}
