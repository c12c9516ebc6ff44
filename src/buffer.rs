//! Bit buffers for the take-skip language.
//!
//! A `BitBuffer` is a row-major block of single-bit values shaped
//! `batch dims × length`. Commands run along the last axis; every leading
//! dimension is a batch of rows processed identically.

use std::fmt;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde::ser::{SerializeSeq, Serializer};

use crate::error::{Error, Result};

/// A batch of equal-length bit rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer {
    shape: Vec<usize>,
    data: Vec<u8>,
}

impl BitBuffer {
    /// Create a buffer from a shape and row-major data.
    ///
    /// The shape needs at least one dimension, its product must match the
    /// data length, and every value must be 0 or 1.
    pub fn new(shape: Vec<usize>, data: Vec<u8>) -> Result<Self> {
        if shape.is_empty() {
            return Err(Error::invalid_argument(
                "buffer shape must have at least one dimension",
            ));
        }
        let Some(expected) = shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)) else {
            return Err(Error::invalid_argument(format!(
                "buffer shape {:?} is too large",
                shape
            )));
        };
        if expected != data.len() {
            return Err(Error::invalid_argument(format!(
                "buffer shape {:?} needs {} values, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        if let Some(pos) = data.iter().position(|&b| b > 1) {
            return Err(Error::invalid_argument(format!(
                "buffer value {} at offset {} is not a bit",
                data[pos], pos
            )));
        }
        Ok(Self { shape, data })
    }

    /// Create a one-dimensional buffer.
    pub fn from_bits(bits: Vec<u8>) -> Result<Self> {
        Self::new(vec![bits.len()], bits)
    }

    /// Create a two-dimensional buffer from equal-length rows.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self> {
        let len = rows.first().map_or(0, Vec::len);
        if let Some(i) = rows.iter().position(|r| r.len() != len) {
            return Err(Error::invalid_argument(format!(
                "row {} has length {}, expected {}",
                i,
                rows[i].len(),
                len
            )));
        }
        let shape = vec![rows.len(), len];
        Self::new(shape, rows.concat())
    }

    /// Build a buffer shaped like `template` but `len` bits long, filling each
    /// row from the matching template row.
    pub(crate) fn build_like<F>(template: &BitBuffer, len: usize, mut fill: F) -> Result<Self>
    where
        F: FnMut(&[u8], &mut Vec<u8>),
    {
        let mut data = allocate(template.row_count(), len)?;
        for row in template.rows() {
            let before = data.len();
            fill(row, &mut data);
            debug_assert_eq!(data.len() - before, len);
        }
        Ok(Self {
            shape: Self::shape_with_len(template.batch_shape(), len),
            data,
        })
    }

    /// Concatenate `segments` row by row along the length axis.
    ///
    /// All segments must share `batch_shape`.
    pub(crate) fn concat(batch_shape: &[usize], segments: &[BitBuffer]) -> Result<Self> {
        let rows: usize = batch_shape.iter().product();
        let len = segments
            .iter()
            .try_fold(0usize, |acc, s| acc.checked_add(s.len()))
            .ok_or_else(|| Error::invalid_argument("output rows are too long"))?;
        let mut data = allocate(rows, len)?;
        for r in 0..rows {
            for segment in segments {
                data.extend_from_slice(segment.row(r));
            }
        }
        Ok(Self {
            shape: Self::shape_with_len(batch_shape, len),
            data,
        })
    }

    fn shape_with_len(batch_shape: &[usize], len: usize) -> Vec<usize> {
        let mut shape = batch_shape.to_vec();
        shape.push(len);
        shape
    }

    /// The full shape, length axis last.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The leading (row) dimensions.
    pub fn batch_shape(&self) -> &[usize] {
        &self.shape[..self.shape.len() - 1]
    }

    /// Number of bits in each row.
    pub fn len(&self) -> usize {
        self.shape[self.shape.len() - 1]
    }

    /// Returns true if rows have no bits.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rows across all batch dimensions.
    pub fn row_count(&self) -> usize {
        self.batch_shape().iter().product()
    }

    /// A single row by flat index.
    pub fn row(&self, index: usize) -> &[u8] {
        let len = self.len();
        &self.data[index * len..(index + 1) * len]
    }

    /// Returns an iterator over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.row_count()).map(move |r| self.row(r))
    }

    /// The raw row-major data.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Copy the rows out as vectors.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.rows().map(<[u8]>::to_vec).collect()
    }

    /// Load input from stdin.
    pub fn from_stdin(format: InputFormat) -> io::Result<Self> {
        let stdin = io::stdin();
        Self::from_reader(stdin.lock(), format)
    }

    /// Load input from files; rows from all files are concatenated.
    pub fn from_files(paths: &[impl AsRef<Path>], format: InputFormat) -> io::Result<Self> {
        let mut rows = Vec::new();
        for path in paths {
            let reader = BufReader::new(fs::File::open(path)?);
            rows.extend(read_rows(reader, format)?);
        }
        Self::from_loaded_rows(rows)
    }

    /// Load from a reader.
    ///
    /// A single row loads as a one-dimensional buffer, several rows as a
    /// two-dimensional one.
    pub fn from_reader<R: BufRead>(reader: R, format: InputFormat) -> io::Result<Self> {
        Self::from_loaded_rows(read_rows(reader, format)?)
    }

    fn from_loaded_rows(mut rows: Vec<Vec<u8>>) -> io::Result<Self> {
        let buffer = if rows.len() <= 1 {
            Self::from_bits(rows.pop().unwrap_or_default())
        } else {
            Self::from_rows(rows)
        };
        buffer.map_err(invalid_data)
    }
}

/// How input rows are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// One row per line of `0`/`1` characters; whitespace is ignored.
    #[default]
    Text,
    /// One row per CSV record of `0`/`1` fields.
    Csv,
}

impl FromStr for InputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(InputFormat::Text),
            "csv" => Ok(InputFormat::Csv),
            other => Err(Error::invalid_argument(format!(
                "invalid input format '{}'; must be 'text' or 'csv'",
                other
            ))),
        }
    }
}

/// Reserve room for `rows` rows of `len` bits.
fn allocate(rows: usize, len: usize) -> Result<Vec<u8>> {
    let too_large = || {
        Error::invalid_argument(format!(
            "cannot emit {} bits into each of {} rows",
            len, rows
        ))
    };
    let total = rows.checked_mul(len).ok_or_else(too_large)?;
    let mut data = Vec::new();
    data.try_reserve_exact(total).map_err(|_| too_large())?;
    Ok(data)
}

fn invalid_data(err: Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

fn parse_bit(c: char, line: usize) -> io::Result<u8> {
    match c {
        '0' => Ok(0),
        '1' => Ok(1),
        other => Err(invalid_data(Error::invalid_argument(format!(
            "line {}: '{}' is not a bit",
            line, other
        )))),
    }
}

fn read_rows<R: BufRead>(reader: R, format: InputFormat) -> io::Result<Vec<Vec<u8>>> {
    let mut rows = Vec::new();
    match format {
        InputFormat::Text => {
            for (i, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let row = line
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| parse_bit(c, i + 1))
                    .collect::<io::Result<Vec<u8>>>()?;
                rows.push(row);
            }
        }
        InputFormat::Csv => {
            let mut csv = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .trim(csv::Trim::All)
                .from_reader(reader);
            for (i, record) in csv.records().enumerate() {
                let record = record.map_err(io::Error::other)?;
                let row = record
                    .iter()
                    .map(|field| {
                        let mut chars = field.chars();
                        match (chars.next(), chars.next()) {
                            (Some(c), None) => parse_bit(c, i + 1),
                            _ => Err(invalid_data(Error::invalid_argument(format!(
                                "line {}: '{}' is not a bit",
                                i + 1,
                                field
                            )))),
                        }
                    })
                    .collect::<io::Result<Vec<u8>>>()?;
                rows.push(row);
            }
        }
    }
    Ok(rows)
}

impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for row in self.rows() {
            if !first {
                writeln!(f)?;
            }
            first = false;
            for bit in row {
                write!(f, "{}", bit)?;
            }
        }
        Ok(())
    }
}

impl Serialize for BitBuffer {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Nested {
            shape: &self.shape,
            data: &self.data,
        }
        .serialize(serializer)
    }
}

/// One level of a buffer's nesting, serialized as a sequence.
struct Nested<'a> {
    shape: &'a [usize],
    data: &'a [u8],
}

impl Serialize for Nested<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let Some((outer, inner)) = self.shape.split_first() else {
            return serializer.serialize_seq(Some(0))?.end();
        };
        let mut seq = serializer.serialize_seq(Some(*outer))?;
        if inner.is_empty() {
            for bit in self.data {
                seq.serialize_element(bit)?;
            }
        } else {
            let stride: usize = inner.iter().product();
            for i in 0..*outer {
                seq.serialize_element(&Nested {
                    shape: inner,
                    data: &self.data[i * stride..(i + 1) * stride],
                })?;
            }
        }
        seq.end()
    }
}
