use crate::buffer::BitBuffer;
use crate::command::IndexRange;
use crate::error::{Error, Result};

/// Gather bits at zero-based positions, always counted from the start of the
/// row regardless of the cursor.
///
/// Ranges are checked against the row length before any of them is expanded.
/// The cursor then advances by the highest position plus one.
pub fn permute(input: &BitBuffer, cursor: usize, ranges: &[IndexRange]) -> Result<(BitBuffer, usize)> {
    let len = input.len();
    let Some(max) = ranges.iter().map(IndexRange::max).max() else {
        return Ok((BitBuffer::build_like(input, 0, |_, _| {})?, cursor));
    };
    if max >= len {
        return Err(Error::exceeds_length(format!(
            "p: permute index {} exceeds array length {}",
            max.saturating_add(1),
            len
        )));
    }

    let count = ranges
        .iter()
        .try_fold(0usize, |acc, r| acc.checked_add(r.count()))
        .ok_or_else(|| Error::invalid_argument("p: permute list is too long"))?;
    let out = BitBuffer::build_like(input, count, |row, out| {
        out.extend(ranges.iter().flat_map(IndexRange::iter).map(|i| row[i]))
    })?;
    Ok((out, cursor.saturating_add(max + 1)))
}
