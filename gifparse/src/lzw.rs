// lzw.rs
//
// Copyright (c) 2020-2024  Douglas Lau
//
//! Lempel-Ziv-Welch decompression for GIF
use crate::error::{Error, Result};
use std::ops::AddAssign;

/// Code Bits
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bits(u8);

impl From<u8> for Bits {
    fn from(bits: u8) -> Self {
        Bits(bits.min(Self::MAX.0))
    }
}

impl From<Bits> for u8 {
    fn from(bits: Bits) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for Bits {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl Bits {
    /// Maximum code bits allowed for GIF
    const MAX: Self = Bits(12);

    /// Get the number of entries
    fn entries(self) -> usize {
        1 << self.0
    }

    /// Get the bit mask
    fn mask(self) -> u32 {
        (1 << u32::from(self.0)) - 1
    }
}

/// Code type
type Code = u16;

/// Code table entry
#[derive(Clone, Copy, Debug)]
struct Entry {
    /// Code of the expansion without its final byte
    prefix: Option<Code>,
    /// Final byte of the expansion
    byte: u8,
    /// First byte of the expansion
    first: u8,
}

/// LZW Data Decompressor
#[derive(Debug)]
pub(crate) struct Decompressor {
    /// Code table, indexed by code
    table: Vec<Entry>,
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
    /// Last code
    last: Option<Code>,
    /// Pending input bits
    code: u32,
    /// Number of pending input bits
    n_bits: u8,
}

impl Decompressor {
    /// Create a new decompressor
    pub fn new(min_code_bits: u8) -> Result<Self> {
        if !(2..=8).contains(&min_code_bits) {
            return Err(Error::InvalidCodeSize(min_code_bits));
        }
        let mut dec = Decompressor {
            table: Vec::with_capacity(Bits::MAX.entries()),
            min_code_bits,
            code_bits: Bits::from(min_code_bits + 1),
            last: None,
            code: 0,
            n_bits: 0,
        };
        dec.reset();
        Ok(dec)
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Get the next code to be assigned
    fn next_code(&self) -> Code {
        self.table.len() as Code
    }

    /// Reset the table to literal codes only
    fn reset(&mut self) {
        self.table.clear();
        for byte in 0..self.clear_code() {
            let byte = byte as u8;
            self.table.push(Entry {
                prefix: None,
                byte,
                first: byte,
            });
        }
        // clear and end codes have no expansion
        let blank = Entry {
            prefix: None,
            byte: 0,
            first: 0,
        };
        self.table.push(blank);
        self.table.push(blank);
        self.code_bits = Bits::from(self.min_code_bits + 1);
        self.last = None;
    }

    /// Unpack one code (least significant bit first)
    fn unpack<I: Iterator<Item = u8>>(&mut self, bytes: &mut I) -> Option<Code> {
        let bits = u8::from(self.code_bits);
        while self.n_bits < bits {
            let byte = bytes.next()?;
            self.code |= u32::from(byte) << self.n_bits;
            self.n_bits += 8;
        }
        let code = (self.code & self.code_bits.mask()) as Code;
        self.code >>= bits;
        self.n_bits -= bits;
        Some(code)
    }

    /// Decompress a byte buffer.
    ///
    /// Returns `true` once the end code has been read; bytes after it are
    /// not consumed.  Decompression stops early once `limit` bytes are in
    /// the buffer.
    pub fn decompress(
        &mut self,
        bytes: &[u8],
        buffer: &mut Vec<u8>,
        limit: usize,
    ) -> Result<bool> {
        let mut bytes = bytes.iter().copied();
        while buffer.len() < limit {
            let code = match self.unpack(&mut bytes) {
                Some(code) => code,
                None => return Ok(false),
            };
            if code == self.clear_code() {
                self.reset();
            } else if code == self.end_code() {
                let rem = bytes.count();
                if rem > 0 {
                    debug!("{} bytes after end code", rem);
                }
                return Ok(true);
            } else {
                self.decompress_code(code, buffer)?;
            }
        }
        Ok(false)
    }

    /// Decompress one code
    fn decompress_code(&mut self, code: Code, buffer: &mut Vec<u8>) -> Result<()> {
        let next_code = self.next_code();
        match self.last {
            None => {
                if code >= self.clear_code() {
                    return Err(Error::InvalidLzwData);
                }
                buffer.push(code as u8);
            }
            Some(last) if code < next_code => {
                self.expand(code, buffer);
                let first = self.table[usize::from(code)].first;
                self.push_entry(last, first);
            }
            Some(last) if code == next_code => {
                let first = self.table[usize::from(last)].first;
                self.push_entry(last, first);
                self.expand(code, buffer);
            }
            Some(_) => return Err(Error::InvalidLzwData),
        }
        self.last = Some(code);
        Ok(())
    }

    /// Push the expansion of `prefix` plus one byte into the table
    fn push_entry(&mut self, prefix: Code, byte: u8) {
        let len = self.table.len();
        if len >= Bits::MAX.entries() {
            return;
        }
        let first = self.table[usize::from(prefix)].first;
        self.table.push(Entry {
            prefix: Some(prefix),
            byte,
            first,
        });
        if len + 1 == self.code_bits.entries() {
            self.code_bits += 1;
        }
    }

    /// Append the expansion of a code to a buffer
    fn expand(&self, code: Code, buffer: &mut Vec<u8>) {
        debug_assert!(code < self.next_code());
        let start = buffer.len();
        let mut entry = self.table[usize::from(code)];
        buffer.push(entry.byte);
        while let Some(prefix) = entry.prefix {
            entry = self.table[usize::from(prefix)];
            buffer.push(entry.byte);
        }
        buffer[start..].reverse();
    }
}

/// Decompress GIF image data into a palette index stream.
///
/// A stream which ends without an end code is not an error: the codes
/// decoded so far are returned.  The result is at most `limit` bytes.
pub(crate) fn decompress(
    min_code_size: u8,
    bytes: &[u8],
    limit: usize,
) -> Result<Vec<u8>> {
    let mut dec = Decompressor::new(min_code_size)?;
    let mut buffer = Vec::with_capacity(limit);
    if !dec.decompress(bytes, &mut buffer, limit)? && buffer.len() < limit {
        warn!("LZW data ended without end code");
    }
    buffer.truncate(limit);
    Ok(buffer)
}
