use crate::buffer::BitBuffer;
use crate::error::Result;

/// How a reading command transforms the bits it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Read {
    Plain,
    Reversed,
    Inverted,
    ReversedInverted,
}

/// Read up to `n` bits from `cursor`.
///
/// A read that runs off the end is truncated to the bits that remain and
/// the cursor stops at the end of the row.
pub fn read(input: &BitBuffer, cursor: usize, n: usize, mode: Read) -> Result<(BitBuffer, usize)> {
    let len = input.len();
    let start = cursor.min(len);
    let end = cursor.saturating_add(n).min(len).max(start);

    let out = BitBuffer::build_like(input, end - start, |row, out| {
        let bits = &row[start..end];
        match mode {
            Read::Plain => out.extend_from_slice(bits),
            Read::Reversed => out.extend(bits.iter().rev()),
            Read::Inverted => out.extend(bits.iter().map(|b| b ^ 1)),
            Read::ReversedInverted => out.extend(bits.iter().rev().map(|b| b ^ 1)),
        }
    })?;

    Ok((out, cursor.max(end)))
}
