//! Interpreter for the take-skip language.
//!
//! A programme is first compiled from its syntax tree into a flat list of
//! [`Command`]s, with groups expanded and 1-based indices resolved. The list
//! is then run against a buffer by a [`Context`], which owns the cursor and
//! the emitted segments for the duration of one execution.

use std::fmt;
use std::str::FromStr;

use crate::ast::{self, Element, IndexItem};
use crate::buffer::BitBuffer;
use crate::command::{Command, IndexRange};
use crate::error::{Error, Result};
use crate::operators::{self, Read};

/// What to do with input bits left after the last command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Remnant {
    /// Drop them.
    #[default]
    Remove,
    /// Append them unchanged.
    Keep,
    /// Append one zero for each of them.
    Pad,
}

impl FromStr for Remnant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "remove" => Ok(Remnant::Remove),
            "keep" => Ok(Remnant::Keep),
            "pad" => Ok(Remnant::Pad),
            _ => Err(Error::invalid_argument(
                "invalid remnant argument; must be 'remove', 'keep', or 'pad'",
            )),
        }
    }
}

impl fmt::Display for Remnant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Remnant::Remove => "remove",
            Remnant::Keep => "keep",
            Remnant::Pad => "pad",
        })
    }
}

/// The effect of one executed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub cursor_before: usize,
    pub cursor_after: usize,
    /// Bits emitted into each row.
    pub emitted: usize,
}

/// Execution context for the interpreter.
///
/// Borrows the input buffer read-only and collects emitted segments in
/// order. One context serves one execution.
pub struct Context<'a> {
    input: &'a BitBuffer,
    cursor: usize,
    segments: Vec<BitBuffer>,
}

impl<'a> Context<'a> {
    /// Create a new context reading from `input`, cursor at 0.
    pub fn new(input: &'a BitBuffer) -> Self {
        Self {
            input,
            cursor: 0,
            segments: Vec::new(),
        }
    }

    /// Get the current cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Execute one command at the current cursor.
    pub fn execute(&mut self, command: &Command) -> Result<Step> {
        let (segment, next) = command.apply(self.input, self.cursor)?;
        let step = Step {
            cursor_before: self.cursor,
            cursor_after: next,
            emitted: segment.len(),
        };
        self.segments.push(segment);
        self.cursor = next;
        Ok(step)
    }

    /// Apply the remnant policy and concatenate everything emitted.
    pub fn finish(mut self, remnant: Remnant) -> Result<BitBuffer> {
        let remaining = self.input.len().saturating_sub(self.cursor);
        match remnant {
            Remnant::Remove => {}
            Remnant::Keep => {
                let (rest, _) = operators::read(self.input, self.cursor, remaining, Read::Plain)?;
                self.segments.push(rest);
            }
            Remnant::Pad => {
                if remaining > 0 {
                    self.segments.push(operators::fill(self.input, 0, remaining)?);
                }
            }
        }
        BitBuffer::concat(self.input.batch_shape(), &self.segments)
    }
}

/// Run a programme (sequence of commands) on a context.
///
/// Stops at the first failing command; the error records its index.
pub fn run(commands: &[Command], ctx: &mut Context<'_>) -> Result<()> {
    for (i, command) in commands.iter().enumerate() {
        ctx.execute(command).map_err(|e| e.with_command(i))?;
    }
    Ok(())
}

/// Run `commands` over `input` and apply the remnant policy.
pub fn execute(commands: &[Command], input: &BitBuffer, remnant: Remnant) -> Result<BitBuffer> {
    let mut ctx = Context::new(input);
    run(commands, &mut ctx)?;
    ctx.finish(remnant)
}

/// Compile an AST programme into a flat sequence of commands.
///
/// Groups are expanded in place, repeated by literal duplication.
pub fn compile(programme: &ast::Programme) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    compile_elements(&programme.elements, &mut commands)?;
    Ok(commands)
}

fn compile_elements(elements: &[Element], out: &mut Vec<Command>) -> Result<()> {
    for element in elements {
        match element {
            Element::Op(op) => out.push(compile_op(op)?),
            Element::Group(group) => {
                let count = group.count.unwrap_or(1);
                if count == 0 {
                    return Err(Error::invalid_argument(
                        "repeat count must be a positive integer, got 0",
                    ));
                }
                let mut body = Vec::new();
                compile_elements(&group.elements, &mut body)?;
                for _ in 0..count {
                    out.extend(body.iter().cloned());
                }
            }
        }
    }
    Ok(())
}

/// Compile a single AST operation into a command.
fn compile_op(op: &ast::Op) -> Result<Command> {
    Ok(match op {
        ast::Op::Take(n) => Command::Take(*n),
        ast::Op::Skip(n) => Command::Skip(*n),
        ast::Op::Reverse(n) => Command::Reverse(*n),
        ast::Op::Invert(n) => Command::Invert(*n),
        ast::Op::ReverseInvert(n) => Command::ReverseInvert(*n),
        ast::Op::Backup(n) => Command::Backup(*n),
        ast::Op::ZeroPad(n) => Command::ZeroPad(*n),
        ast::Op::OnePad(n) => Command::OnePad(*n),
        ast::Op::LiteralPad(bits) => Command::LiteralPad(bits.clone()),
        ast::Op::Permute(list) => Command::Permute(
            list.items
                .iter()
                .map(|item| match *item {
                    IndexItem::Index(k) => IndexRange::one_based(k, k),
                    IndexItem::Range { start, end } => IndexRange::one_based(start, end),
                })
                .collect::<Result<_>>()?,
        ),
    })
}

/// Convert an inclusive 1-based range to zero-based indices.
///
/// Descends when `start > end`; `(5, 5)` is the single index `[4]`.
pub fn one_based_range_to_indices(start: usize, end: usize) -> Result<Vec<usize>> {
    let range = IndexRange::one_based(start, end)?;
    let mut indices = Vec::new();
    indices.try_reserve_exact(range.count()).map_err(|_| {
        Error::invalid_argument(format!("p: range {} is too large to expand", range))
    })?;
    indices.extend(range.iter());
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::parse_programme;

    fn commands(s: &str) -> Vec<Command> {
        compile(&parse_programme(s).unwrap()).unwrap()
    }

    fn bits(b: &[u8]) -> BitBuffer {
        BitBuffer::from_bits(b.to_vec()).unwrap()
    }

    #[test]
    fn compile_simple_programmes() {
        let cases: Vec<(&str, Vec<Command>)> = vec![
            ("s8", vec![Command::Skip(8)]),
            ("i8", vec![Command::Invert(8)]),
            ("t4", vec![Command::Take(4)]),
            ("r8", vec![Command::Reverse(8)]),
            ("n8", vec![Command::OnePad(8)]),
            ("z8", vec![Command::ZeroPad(8)]),
            (
                "s1 t8 s1",
                vec![Command::Skip(1), Command::Take(8), Command::Skip(1)],
            ),
            ("p1-4", vec![Command::Permute(vec![IndexRange::new(0, 3)])]),
            ("p4-1", vec![Command::Permute(vec![IndexRange::new(3, 0)])]),
            (
                "t4 b4 i4",
                vec![Command::Take(4), Command::Backup(4), Command::Invert(4)],
            ),
        ];
        for (source, expected) in cases {
            assert_eq!(commands(source), expected, "compiling {:?}", source);
        }
    }

    #[test]
    fn compile_repeat_duplicates_body() {
        assert_eq!(
            commands("(t2s2)3"),
            vec![
                Command::Take(2),
                Command::Skip(2),
                Command::Take(2),
                Command::Skip(2),
                Command::Take(2),
                Command::Skip(2),
            ]
        );
    }

    #[test]
    fn compile_nested_groups() {
        assert_eq!(
            commands("((t1)2s1)2"),
            vec![
                Command::Take(1),
                Command::Take(1),
                Command::Skip(1),
                Command::Take(1),
                Command::Take(1),
                Command::Skip(1),
            ]
        );
    }

    #[test]
    fn compile_permute_list_keeps_order_and_duplicates() {
        assert_eq!(
            commands("p1-3,8,6-5,1,1"),
            vec![Command::Permute(vec![
                IndexRange::new(0, 2),
                IndexRange::new(7, 7),
                IndexRange::new(5, 4),
                IndexRange::new(0, 0),
                IndexRange::new(0, 0),
            ])]
        );
    }

    #[test]
    fn compile_huge_range_stays_unexpanded() {
        let cmds = commands("p1-18446744073709551615");
        assert_eq!(cmds, vec![Command::Permute(vec![IndexRange::new(0, usize::MAX - 1)])]);
        let err = execute(&cmds, &bits(&[1, 0]), Remnant::Remove).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExceedsLength);
        assert_eq!(err.position.command, Some(0));
    }

    #[test]
    fn huge_pad_is_an_error() {
        let input = BitBuffer::from_rows(vec![vec![1, 0], vec![0, 1]]).unwrap();
        for source in ["z18446744073709551615", "n9223372036854775808", "t1z18446744073709551615"] {
            let err = execute(&commands(source), &input, Remnant::Remove).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArgument, "running {:?}", source);
        }
    }

    #[test]
    fn compile_zero_repeat() {
        let err = compile(&parse_programme("(t4)0").unwrap()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn compile_zero_index() {
        let err = compile(&parse_programme("p0").unwrap()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn ranges() {
        assert_eq!(one_based_range_to_indices(1, 4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(one_based_range_to_indices(4, 1).unwrap(), vec![3, 2, 1, 0]);
        assert_eq!(one_based_range_to_indices(5, 5).unwrap(), vec![4]);
        assert!(one_based_range_to_indices(0, 3).is_err());
        let err = one_based_range_to_indices(1, usize::MAX).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn context_tracks_cursor() {
        let input = bits(&[1, 0, 1, 1, 0, 0, 1, 0]);
        let mut ctx = Context::new(&input);
        assert_eq!(ctx.cursor(), 0);

        let step = ctx.execute(&Command::Take(4)).unwrap();
        assert_eq!(
            step,
            Step {
                cursor_before: 0,
                cursor_after: 4,
                emitted: 4
            }
        );

        ctx.execute(&Command::Backup(2)).unwrap();
        assert_eq!(ctx.cursor(), 2);

        ctx.execute(&Command::OnePad(3)).unwrap();
        assert_eq!(ctx.cursor(), 2);
    }

    #[test]
    fn run_empty_programme() {
        let input = bits(&[1, 0, 1]);
        assert_eq!(execute(&[], &input, Remnant::Remove).unwrap().len(), 0);
        assert_eq!(execute(&[], &input, Remnant::Keep).unwrap(), input);
    }

    #[test]
    fn run_reports_failing_command() {
        let input = bits(&[1, 0, 1, 1, 0, 0]);
        let err = execute(&commands("t2b4t3"), &input, Remnant::Remove).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NegativePointer);
        assert_eq!(err.position.command, Some(1));
    }

    #[test]
    fn remnant_policies() {
        let input = bits(&[1, 0, 1, 1, 0, 0, 1, 0]);
        let take = [Command::Take(4)];
        assert_eq!(
            execute(&take, &input, Remnant::Remove).unwrap().as_slice(),
            &[1, 0, 1, 1]
        );
        assert_eq!(
            execute(&take, &input, Remnant::Keep).unwrap().as_slice(),
            &[1, 0, 1, 1, 0, 0, 1, 0]
        );
        assert_eq!(
            execute(&take, &input, Remnant::Pad).unwrap().as_slice(),
            &[1, 0, 1, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn remnant_after_permute_past_end() {
        let input = bits(&[1, 0, 1, 1]);
        let cmds = commands("t2p4");
        assert_eq!(
            execute(&cmds, &input, Remnant::Keep).unwrap().as_slice(),
            &[1, 0, 1]
        );
        assert_eq!(
            execute(&cmds, &input, Remnant::Pad).unwrap().as_slice(),
            &[1, 0, 1]
        );
    }

    #[test]
    fn remnant_from_str() {
        assert_eq!("keep".parse::<Remnant>().unwrap(), Remnant::Keep);
        assert_eq!(Remnant::default(), Remnant::Remove);
        assert_eq!(Remnant::Pad.to_string(), "pad");
        let err = "invalid".parse::<Remnant>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
