//! Operation kernels for the take-skip language.
//!
//! Each kernel runs one operation against every row of a buffer at a shared
//! cursor and returns the emitted bits. Rows never branch: they all see the
//! same cursor trajectory.

mod cursor;
mod pad;
mod permute;
mod read;

pub use cursor::{backup, skip};
pub use pad::{fill, literal};
pub use permute::permute;
pub use read::{Read, read};
