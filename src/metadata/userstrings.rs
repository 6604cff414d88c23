//! User String Heap (`#US`) access.
//!
//! The `#US` heap stores user-defined string literals in UTF-16, each entry
//! prefixed with a compressed length (ECMA-335 II.24.2.4). The disassembler
//! consumes [`UserStrings::raw`] and applies its own deliberately lossy
//! narrowing for output parity with classic listing tools; [`UserStrings::get`]
//! is the lossless view for callers that want correct transcoding.

use crate::{Error::OutOfBounds, Result};

use widestring::U16Str;

/// Accessor over the raw bytes of the `#US` heap.
///
/// Indexes come from the low 24 bits of `ldstr` string tokens and point at
/// the compressed length prefix of an entry.
pub struct UserStrings<'a> {
    data: &'a [u8],
}

impl<'a> UserStrings<'a> {
    /// Create a `UserStrings` object from the heap's bytes.
    ///
    /// The heap always starts with a single zero byte (the empty entry).
    ///
    /// # Errors
    /// Returns an error if the heap data is empty or the leading entry is
    /// not the mandatory zero byte.
    pub fn from(data: &'a [u8]) -> Result<UserStrings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(OutOfBounds);
        }

        Ok(UserStrings { data })
    }

    /// Raw length-prefixed blob starting at `index`, running to the end of
    /// the heap.
    ///
    /// The caller decodes the compressed length prefix itself; this is the
    /// shape the disassembler's string operand decoder expects.
    ///
    /// # Errors
    /// Returns an error if `index` lies outside the heap.
    pub fn raw(&self, index: usize) -> Result<&'a [u8]> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[index..])
    }

    /// Lossless UTF-16 view of the string at `index`.
    ///
    /// # Errors
    /// Returns an error if the index is out of bounds or the declared entry
    /// length runs past the end of the heap.
    pub fn get(&self, index: usize) -> Result<String> {
        let blob = self.raw(index)?;

        let mut parser = crate::Parser::new(blob);
        let length = parser.read_compressed_uint()? as usize;
        let start = parser.pos();

        if start + length > blob.len() {
            return Err(OutOfBounds);
        }

        // Entry lengths include a trailing flag byte, leaving an odd count
        let utf16_bytes = &blob[start..start + (length & !1)];
        let units: Vec<u16> = utf16_bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Ok(U16Str::from_slice(&units).to_string_lossy())
    }
}
