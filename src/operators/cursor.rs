use crate::buffer::BitBuffer;
use crate::error::{Error, Result};

/// Advance the cursor by `n` without emitting anything.
///
/// Skipping past the end of the row is an error.
pub fn skip(input: &BitBuffer, cursor: usize, n: usize) -> Result<(BitBuffer, usize)> {
    let len = input.len();
    match cursor.checked_add(n) {
        Some(end) if end <= len => Ok((empty_like(input)?, end)),
        _ => Err(Error::exceeds_length(format!(
            "s{}: skip from position {} exceeds array length {}",
            n, cursor, len
        ))),
    }
}

/// Move the cursor back by `n` without emitting anything.
pub fn backup(input: &BitBuffer, cursor: usize, n: usize) -> Result<(BitBuffer, usize)> {
    match cursor.checked_sub(n) {
        Some(start) => Ok((empty_like(input)?, start)),
        None => Err(Error::negative_pointer(format!(
            "b{}: backup from position {} would move the pointer to {}; pointer cannot be negative",
            n,
            cursor,
            cursor as isize - n as isize
        ))),
    }
}

fn empty_like(input: &BitBuffer) -> Result<BitBuffer> {
    BitBuffer::build_like(input, 0, |_, _| {})
}
