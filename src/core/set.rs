//! Purpose: Fixed-width bitset over row ordinals used to express predicates and partitions.
//! Exports: `RowSet`.
//! Role: Set algebra layer between the query engine and callers composing predicates.
//! Invariants: Storage is exactly `ceil(len / 8)` bytes; bits at or beyond `len` stay zero.
//! Invariants: Binary operations require equal `len` and fail with `SizeMismatch` otherwise.
//! Notes: Hex text prints the highest-indexed byte first (little-endian storage, big-endian text).
use std::fmt;
use std::str::FromStr;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RowSet {
    len: usize,
    bits: Vec<u8>,
}

impl RowSet {
    pub fn empty(len: usize) -> Self {
        Self {
            len,
            bits: vec![0u8; byte_len(len)],
        }
    }

    pub fn universe(len: usize) -> Self {
        let mut set = Self {
            len,
            bits: vec![0xffu8; byte_len(len)],
        };
        set.clear_padding();
        set
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|byte| *byte == 0)
    }

    pub fn count(&self) -> usize {
        self.bits.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    pub fn add(&mut self, member: usize) -> Result<(), Error> {
        self.check_member(member)?;
        self.bits[member / 8] |= 1 << (member % 8);
        Ok(())
    }

    pub fn remove(&mut self, member: usize) -> Result<(), Error> {
        self.check_member(member)?;
        self.bits[member / 8] &= !(1 << (member % 8));
        Ok(())
    }

    pub fn contains(&self, member: usize) -> bool {
        member < self.len && self.bits[member / 8] & (1 << (member % 8)) != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|member| self.contains(*member))
    }

    pub fn difference_with(&mut self, other: &RowSet) -> Result<(), Error> {
        self.zip_with(other, |dst, src| dst & !src)
    }

    pub fn union_with(&mut self, other: &RowSet) -> Result<(), Error> {
        self.zip_with(other, |dst, src| dst | src)
    }

    pub fn intersect_with(&mut self, other: &RowSet) -> Result<(), Error> {
        self.zip_with(other, |dst, src| dst & src)
    }

    pub fn complement_in_place(&mut self) {
        for byte in &mut self.bits {
            *byte = !*byte;
        }
        self.clear_padding();
    }

    pub fn difference(mut self, other: RowSet) -> Result<RowSet, Error> {
        self.difference_with(&other)?;
        Ok(self)
    }

    pub fn union(mut self, other: RowSet) -> Result<RowSet, Error> {
        self.union_with(&other)?;
        Ok(self)
    }

    pub fn intersection(mut self, other: RowSet) -> Result<RowSet, Error> {
        self.intersect_with(&other)?;
        Ok(self)
    }

    pub fn complement(mut self) -> RowSet {
        self.complement_in_place();
        self
    }

    pub fn to_hex(&self) -> String {
        self.bits
            .iter()
            .rev()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    /// Reads hex text into a set sized to the whole bytes the text carries.
    pub fn from_hex(text: &str) -> Result<RowSet, Error> {
        let bits = decode_hex(text)?;
        Ok(Self {
            len: bits.len() * 8,
            bits,
        })
    }

    /// Reads hex text into a set of exactly `len` members.
    ///
    /// The text must encode `ceil(len / 8)` bytes with no member at or beyond `len`.
    pub fn from_hex_with_len(text: &str, len: usize) -> Result<RowSet, Error> {
        let bits = decode_hex(text)?;
        if bits.len() != byte_len(len) {
            return Err(Error::new(ErrorKind::SizeMismatch).with_message(format!(
                "hex set encodes {} bytes, expected {} for {len} members",
                bits.len(),
                byte_len(len)
            )));
        }
        let mut set = Self { len, bits };
        let decoded = set.bits.clone();
        set.clear_padding();
        if set.bits != decoded {
            return Err(Error::new(ErrorKind::OutOfRange)
                .with_message(format!("hex set has members at or beyond {len}")));
        }
        Ok(set)
    }

    fn check_member(&self, member: usize) -> Result<(), Error> {
        if member >= self.len {
            return Err(Error::new(ErrorKind::OutOfRange)
                .with_message(format!("member {member} outside set of size {}", self.len)));
        }
        Ok(())
    }

    fn zip_with(&mut self, other: &RowSet, op: impl Fn(u8, u8) -> u8) -> Result<(), Error> {
        if self.len != other.len {
            return Err(Error::new(ErrorKind::SizeMismatch).with_message(format!(
                "set sizes differ ({} vs {})",
                self.len, other.len
            )));
        }
        for (dst, src) in self.bits.iter_mut().zip(&other.bits) {
            *dst = op(*dst, *src);
        }
        Ok(())
    }

    fn clear_padding(&mut self) {
        let used = self.len % 8;
        if used != 0 {
            if let Some(last) = self.bits.last_mut() {
                *last &= (1u8 << used) - 1;
            }
        }
    }
}

impl fmt::Display for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for RowSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

fn byte_len(len: usize) -> usize {
    len.div_ceil(8)
}

fn decode_hex(text: &str) -> Result<Vec<u8>, Error> {
    let digits = text.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(Error::new(ErrorKind::Parse)
            .with_message("hex set must have an even number of digits"));
    }
    let mut bits = Vec::with_capacity(digits.len() / 2);
    for pair in digits.chunks_exact(2).rev() {
        let hi = hex_value(pair[0])?;
        let lo = hex_value(pair[1])?;
        bits.push(hi << 4 | lo);
    }
    Ok(bits)
}

fn hex_value(digit: u8) -> Result<u8, Error> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(Error::new(ErrorKind::Parse)
            .with_message(format!("invalid hex digit `{}`", digit.escape_ascii()))),
    }
}
