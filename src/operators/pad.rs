use crate::buffer::BitBuffer;
use crate::error::{Error, Result};

/// Emit `n` copies of `bit` in every row.
pub fn fill(input: &BitBuffer, bit: u8, n: usize) -> Result<BitBuffer> {
    BitBuffer::build_like(input, n, |_, out| out.resize(out.len() + n, bit))
}

/// Emit the literal `bits` in every row.
pub fn literal(input: &BitBuffer, bits: &[u8]) -> Result<BitBuffer> {
    if let Some(bad) = bits.iter().find(|&&b| b > 1) {
        return Err(Error::invalid_argument(format!(
            "literal pad value {} is not a bit",
            bad
        )));
    }
    BitBuffer::build_like(input, bits.len(), |_, out| out.extend_from_slice(bits))
}
