//! Take-skip: a compact command language for slicing and rearranging bits.
//!
//! A command string such as `"s4t4b8t4"` is parsed into a flat list of
//! [`Command`]s which is then run along the last axis of a [`BitBuffer`].
//!
//! | Code         | Operation                                        |
//! |--------------|--------------------------------------------------|
//! | `t<n>`       | take n bits                                      |
//! | `s<n>`       | skip n bits                                      |
//! | `r<n>`       | take n bits reversed                             |
//! | `i<n>`       | take n bits inverted                             |
//! | `ri<n>`      | take n bits reversed, then inverted              |
//! | `b<n>`       | move the cursor back n bits                      |
//! | `z<n>`       | insert n zeros                                   |
//! | `n<n>`       | insert n ones                                    |
//! | `d<bits>`    | insert literal bits, e.g. `d101`                 |
//! | `p<list>`    | gather bits by 1-based index or range, `p1-4,8`  |
//! | `(...)<n>`   | repeat a group n times                           |
//!
//! Letters are case-insensitive and whitespace is ignored.
//!
//! ```
//! use takeskip::{BitBuffer, takeskip};
//!
//! let bits = BitBuffer::from_bits(vec![1, 1, 1, 1, 0, 0, 0, 0]).unwrap();
//! let swapped = takeskip("s4t4b8t4", &bits, "remove").unwrap();
//! assert_eq!(swapped.as_slice(), &[0, 0, 0, 0, 1, 1, 1, 1]);
//! ```

pub mod ast;
pub mod buffer;
pub mod command;
pub mod error;
pub mod interpreter;
pub mod operators;
pub mod parser;

pub use buffer::{BitBuffer, InputFormat};
pub use command::{Command, IndexRange};
pub use error::{Error, ErrorKind, Result};
pub use interpreter::{Remnant, execute, one_based_range_to_indices};

/// Parse a command string into a flat list of commands.
pub fn parse_command(command: &str) -> Result<Vec<Command>> {
    let programme = parser::parse_programme(command)?;
    interpreter::compile(&programme)
}

/// Run a command string over `buffer`.
///
/// `remnant` is one of `"remove"`, `"keep"` or `"pad"`; anything else is an
/// [`ErrorKind::InvalidArgument`] error.
pub fn takeskip(command: &str, buffer: &BitBuffer, remnant: &str) -> Result<BitBuffer> {
    let remnant: Remnant = remnant.parse()?;
    takeskip_with(command, buffer, remnant)
}

/// Run a command string over `buffer` with a typed remnant policy.
pub fn takeskip_with(command: &str, buffer: &BitBuffer, remnant: Remnant) -> Result<BitBuffer> {
    let commands = parse_command(command)?;
    execute(&commands, buffer, remnant)
}
