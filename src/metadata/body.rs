//! Representation and parsing of CIL method bodies.
//!
//! A [`MethodBody`] is the input the disassembler walks: an immutable code
//! buffer plus the ordered list of exception clauses attached to it. This
//! module also decodes the tiny/fat method headers and trailing exception
//! data sections defined by ECMA-335 II.25.4, so a body can be built straight
//! from the raw bytes a metadata loader hands out.
//!
//! # References
//! - ECMA-335 6th Edition, Partition II, Section 25.4 - Method Header Format

use bitflags::bitflags;
use strum::Display;

use crate::{
    file::io::{read_le, read_le_at},
    Result,
};

bitflags! {
    /// Flags from the first bytes of a method header (ECMA-335 II.25.4.1/4).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodBodyFlags: u16 {
        /// The method has a tiny header (code size in the upper 6 bits).
        const TINY_FORMAT = 0x0002;
        /// The method has a fat header (12 bytes, full fields).
        const FAT_FORMAT = 0x0003;
        /// Extra data sections (exception tables) follow the code.
        const MORE_SECTS = 0x0008;
        /// Call the default constructor on all local variables.
        const INIT_LOCALS = 0x0010;
    }
}

bitflags! {
    /// Flags of a method data section header (ECMA-335 II.25.4.5).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SectionFlags: u8 {
        /// The section contains an exception handling table.
        const EHTABLE = 0x01;
        /// Reserved OptILTable section kind.
        const OPT_ILTABLE = 0x02;
        /// The section uses the fat (24 bytes per clause) layout.
        const FAT_FORMAT = 0x40;
        /// Another data section follows this one.
        const MORE_SECTS = 0x80;
    }
}

/// The kind of an exception handling clause.
///
/// Numeric values follow the clause kind encoding of the method data section:
/// 0 = catch, 1 = filter, 2 = finally, 3 = fault. The `Display` form is the
/// lowercase keyword used in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ClauseKind {
    /// A typed exception handler; `token_or_filter` holds the class token.
    Catch,
    /// A filtered handler; `token_or_filter` holds the filter code offset.
    /// The filter predicate is the handler body itself, so no class name
    /// renders for it.
    Filter,
    /// A finally handler, run on both normal and exceptional exit.
    Finally,
    /// A fault handler, run on exceptional exit only.
    Fault,
}

impl ClauseKind {
    /// Decode a raw clause kind value, `None` for anything outside 0-3.
    #[must_use]
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(ClauseKind::Catch),
            1 => Some(ClauseKind::Filter),
            2 => Some(ClauseKind::Finally),
            3 => Some(ClauseKind::Fault),
            _ => None,
        }
    }

    /// Whether a `.try {` marker is emitted at this clause's try offset.
    ///
    /// Catch and finally clauses carry the `.try` bracket; filter and fault
    /// clauses attached to the same protected region share it.
    #[must_use]
    pub fn opens_try(self) -> bool {
        matches!(self, ClauseKind::Catch | ClauseKind::Finally)
    }
}

/// One declared exception handling region of a method body.
///
/// Offsets and lengths are byte positions within the code buffer. Clauses may
/// be declared in any order and may nest arbitrarily; nothing here is sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionClause {
    /// The clause kind (catch, filter, finally, fault).
    pub kind: ClauseKind,
    /// Offset in bytes of the try block from the start of the code.
    pub try_offset: u32,
    /// Length in bytes of the try block.
    pub try_length: u32,
    /// Offset in bytes of the handler block.
    pub handler_offset: u32,
    /// Length in bytes of the handler block.
    pub handler_length: u32,
    /// Class token for catch clauses, filter code offset for filter clauses.
    pub token_or_filter: u32,
}

impl ExceptionClause {
    /// End offset of the try region (`try_offset + try_length`).
    #[must_use]
    pub fn try_end(&self) -> Option<u32> {
        self.try_offset.checked_add(self.try_length)
    }

    /// End offset of the handler region (`handler_offset + handler_length`).
    #[must_use]
    pub fn handler_end(&self) -> Option<u32> {
        self.handler_offset.checked_add(self.handler_length)
    }

    /// Check that both regions lie inside a code buffer of `code_size` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedExceptionClause`] naming the clause
    /// `index` when a region overflows or runs past the end of the code. The
    /// disassembler treats this as non-fatal and skips the clause's brackets.
    pub fn validate(&self, index: usize, code_size: usize) -> Result<()> {
        let clause_error = |message: String| crate::Error::MalformedExceptionClause {
            index,
            message,
        };

        let try_end = self
            .try_end()
            .ok_or_else(|| clause_error(format!("try region overflows: {}+{}", self.try_offset, self.try_length)))?;
        let handler_end = self.handler_end().ok_or_else(|| {
            clause_error(format!(
                "handler region overflows: {}+{}",
                self.handler_offset, self.handler_length
            ))
        })?;

        if try_end as usize > code_size {
            return Err(clause_error(format!(
                "try region [{}, {}) outside code of {} bytes",
                self.try_offset, try_end, code_size
            )));
        }
        if handler_end as usize > code_size {
            return Err(clause_error(format!(
                "handler region [{}, {}) outside code of {} bytes",
                self.handler_offset, handler_end, code_size
            )));
        }

        Ok(())
    }
}

/// A parsed CIL method body: the code buffer and its exception clauses.
///
/// The body is a read-only input; disassembling it creates no persistent
/// state, so independent bodies can be processed concurrently.
pub struct MethodBody<'a> {
    /// The raw CIL instruction stream.
    pub code: &'a [u8],
    /// Exception handling clauses, in declaration order.
    pub exception_clauses: Vec<ExceptionClause>,
    /// Maximum number of items on the operand stack (fat headers only).
    pub max_stack: usize,
    /// Token of the local variable signature, 0 when there are no locals.
    pub local_var_sig_token: u32,
    /// Whether the body used a fat header.
    pub is_fat: bool,
    /// Whether locals are zero-initialized.
    pub is_init_local: bool,
}

impl<'a> MethodBody<'a> {
    /// Build a body directly from a code buffer and clause list.
    ///
    /// This is the entry point for callers that already parsed the header
    /// themselves (or synthesized a stream, as the tests do).
    #[must_use]
    pub fn new(code: &'a [u8], exception_clauses: Vec<ExceptionClause>) -> Self {
        MethodBody {
            code,
            exception_clauses,
            max_stack: 0,
            local_var_sig_token: 0,
            is_fat: false,
            is_init_local: false,
        }
    }

    /// Size of the instruction stream in bytes.
    #[must_use]
    pub fn code_size(&self) -> usize {
        self.code.len()
    }

    /// Parse a method body from its raw header bytes.
    ///
    /// Handles both tiny headers (single byte, code size in the upper six
    /// bits) and fat headers (12 bytes) including the trailing exception
    /// handling data sections, in both their small and fat clause layouts.
    /// The returned body borrows its code from `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the header is neither tiny nor
    /// fat or declares a clause kind outside 0-3, and
    /// [`crate::Error::OutOfBounds`] if the declared sizes exceed `data`.
    pub fn from_bytes(data: &'a [u8]) -> Result<MethodBody<'a>> {
        if data.is_empty() {
            return Err(malformed_error!("Provided data for body parsing is empty"));
        }

        let first_byte = read_le::<u8>(data)?;
        let format = MethodBodyFlags::from_bits_truncate(u16::from(first_byte & 0b0000_0011));
        if format == MethodBodyFlags::TINY_FORMAT {
            let size_code = (first_byte >> 2) as usize;
            if size_code + 1 > data.len() {
                return Err(out_of_bounds_error!());
            }

            Ok(MethodBody {
                code: &data[1..1 + size_code],
                exception_clauses: Vec::new(),
                max_stack: 0,
                local_var_sig_token: 0,
                is_fat: false,
                is_init_local: false,
            })
        } else if format == MethodBodyFlags::FAT_FORMAT {
            if data.len() < 12 {
                return Err(out_of_bounds_error!());
            }

            let first_duo = read_le::<u16>(data)?;

            let size_header = ((first_duo >> 12) * 4) as usize;
            let size_code = read_le::<u32>(&data[4..])? as usize;
            if data.len() < size_code + size_header {
                return Err(out_of_bounds_error!());
            }

            let max_stack = read_le::<u16>(&data[2..])? as usize;
            let local_var_sig_token = read_le::<u32>(&data[8..])?;
            let flags_header = MethodBodyFlags::from_bits_truncate(first_duo & 0x0FFF);

            let mut exception_clauses = Vec::new();
            if flags_header.contains(MethodBodyFlags::MORE_SECTS) {
                // Data sections start at the next 4-byte boundary after the code
                let mut cursor = (size_header + size_code + 3) & !3;
                exception_clauses = Self::read_eh_sections(data, &mut cursor)?;
            }

            Ok(MethodBody {
                code: &data[size_header..size_header + size_code],
                exception_clauses,
                max_stack,
                local_var_sig_token,
                is_fat: true,
                is_init_local: flags_header.contains(MethodBodyFlags::INIT_LOCALS),
            })
        } else {
            Err(malformed_error!(
                "MethodHeader is neither FAT nor TINY - {}",
                first_byte
            ))
        }
    }

    /// Walk the method data sections at `cursor`, collecting exception
    /// clauses (ECMA-335 II.25.4.5/6).
    fn read_eh_sections(data: &[u8], cursor: &mut usize) -> Result<Vec<ExceptionClause>> {
        let mut clauses = Vec::new();

        while data.len() > *cursor + 4 {
            let section_flags = SectionFlags::from_bits_truncate(read_le::<u8>(&data[*cursor..])?);
            if !section_flags.contains(SectionFlags::EHTABLE) {
                break;
            }

            if section_flags.contains(SectionFlags::FAT_FORMAT) {
                let section_size = read_le::<u32>(&data[*cursor + 1..])? & 0x00FF_FFFF;
                if section_size < 4 || data.len() < *cursor + section_size as usize {
                    break;
                }

                *cursor += 4;
                for _ in 0..(section_size - 4) / 24 {
                    let raw_kind = read_le_at::<u32>(data, cursor)?;
                    clauses.push(ExceptionClause {
                        kind: ClauseKind::from_raw(raw_kind).ok_or_else(|| {
                            malformed_error!("Invalid exception clause kind - {}", raw_kind)
                        })?,
                        try_offset: read_le_at::<u32>(data, cursor)?,
                        try_length: read_le_at::<u32>(data, cursor)?,
                        handler_offset: read_le_at::<u32>(data, cursor)?,
                        handler_length: read_le_at::<u32>(data, cursor)?,
                        token_or_filter: read_le_at::<u32>(data, cursor)?,
                    });
                }
            } else {
                let section_size = u32::from(read_le::<u8>(&data[*cursor + 1..])?);
                if section_size < 4 || data.len() < *cursor + section_size as usize {
                    break;
                }

                *cursor += 4;
                for _ in 0..(section_size - 4) / 12 {
                    let raw_kind = u32::from(read_le_at::<u16>(data, cursor)?);
                    clauses.push(ExceptionClause {
                        kind: ClauseKind::from_raw(raw_kind).ok_or_else(|| {
                            malformed_error!("Invalid exception clause kind - {}", raw_kind)
                        })?,
                        try_offset: u32::from(read_le_at::<u16>(data, cursor)?),
                        try_length: u32::from(read_le_at::<u8>(data, cursor)?),
                        handler_offset: u32::from(read_le_at::<u16>(data, cursor)?),
                        handler_length: u32::from(read_le_at::<u8>(data, cursor)?),
                        token_or_filter: read_le_at::<u32>(data, cursor)?,
                    });
                }
            }

            if !section_flags.contains(SectionFlags::MORE_SECTS) {
                break;
            }
        }

        Ok(clauses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_kind_keywords() {
        assert_eq!(ClauseKind::Catch.to_string(), "catch");
        assert_eq!(ClauseKind::Filter.to_string(), "filter");
        assert_eq!(ClauseKind::Finally.to_string(), "finally");
        assert_eq!(ClauseKind::Fault.to_string(), "fault");
    }

    #[test]
    fn clause_kind_raw_roundtrip() {
        assert_eq!(ClauseKind::from_raw(0), Some(ClauseKind::Catch));
        assert_eq!(ClauseKind::from_raw(3), Some(ClauseKind::Fault));
        assert_eq!(ClauseKind::from_raw(4), None);
    }

    #[test]
    fn opens_try_for_catch_and_finally_only() {
        assert!(ClauseKind::Catch.opens_try());
        assert!(ClauseKind::Finally.opens_try());
        assert!(!ClauseKind::Filter.opens_try());
        assert!(!ClauseKind::Fault.opens_try());
    }

    #[test]
    fn tiny_header() {
        // Tiny header: flags 0x2 in low bits, code size 2 in upper six bits
        let data = [0x0A, 0x00, 0x2A]; // nop, ret
        let body = MethodBody::from_bytes(&data).unwrap();

        assert!(!body.is_fat);
        assert_eq!(body.code, &[0x00, 0x2A]);
        assert_eq!(body.code_size(), 2);
        assert!(body.exception_clauses.is_empty());
    }

    #[test]
    fn tiny_header_truncated() {
        // Declares 10 bytes of code, provides 1
        let data = [0x2A, 0x00];
        assert!(MethodBody::from_bytes(&data).is_err());
    }

    #[test]
    fn fat_header() {
        let mut data = vec![
            0x13, 0x30, // fat format + init locals, header size 3 dwords
            0x08, 0x00, // max stack 8
            0x02, 0x00, 0x00, 0x00, // code size 2
            0x07, 0x00, 0x00, 0x11, // local var sig token
        ];
        data.extend_from_slice(&[0x00, 0x2A]); // nop, ret

        let body = MethodBody::from_bytes(&data).unwrap();

        assert!(body.is_fat);
        assert!(body.is_init_local);
        assert_eq!(body.max_stack, 8);
        assert_eq!(body.local_var_sig_token, 0x1100_0007);
        assert_eq!(body.code, &[0x00, 0x2A]);
        assert!(body.exception_clauses.is_empty());
    }

    #[test]
    fn fat_header_with_small_eh_section() {
        let mut data = vec![
            0x1B, 0x30, // fat format + more sects, header size 3 dwords
            0x02, 0x00, // max stack 2
            0x08, 0x00, 0x00, 0x00, // code size 8
            0x00, 0x00, 0x00, 0x00, // no locals
        ];
        data.extend_from_slice(&[0x00; 8]); // 8 nops
        // code ends at offset 20, already 4-byte aligned
        data.extend_from_slice(&[
            0x01, 0x10, 0x00, 0x00, // EH section, small, size 16
            0x00, 0x00, // kind 0 (catch)
            0x00, 0x00, // try offset 0
            0x04, // try length 4
            0x04, 0x00, // handler offset 4
            0x04, // handler length 4
            0x01, 0x00, 0x00, 0x01, // class token 0x01000001
        ]);

        let body = MethodBody::from_bytes(&data).unwrap();
        assert_eq!(body.exception_clauses.len(), 1);

        let clause = &body.exception_clauses[0];
        assert_eq!(clause.kind, ClauseKind::Catch);
        assert_eq!(clause.try_offset, 0);
        assert_eq!(clause.try_length, 4);
        assert_eq!(clause.handler_offset, 4);
        assert_eq!(clause.handler_length, 4);
        assert_eq!(clause.token_or_filter, 0x0100_0001);
        clause.validate(0, body.code_size()).unwrap();
    }

    #[test]
    fn fat_header_with_fat_eh_section() {
        let mut data = vec![
            0x1B, 0x30, // fat format + more sects
            0x02, 0x00, //
            0x08, 0x00, 0x00, 0x00, // code size 8
            0x00, 0x00, 0x00, 0x00, //
        ];
        data.extend_from_slice(&[0x00; 8]);
        data.extend_from_slice(&[
            0x41, 0x1C, 0x00, 0x00, // EH section, fat, size 28
            0x02, 0x00, 0x00, 0x00, // kind 2 (finally)
            0x00, 0x00, 0x00, 0x00, // try offset 0
            0x04, 0x00, 0x00, 0x00, // try length 4
            0x04, 0x00, 0x00, 0x00, // handler offset 4
            0x04, 0x00, 0x00, 0x00, // handler length 4
            0x00, 0x00, 0x00, 0x00, // unused token
        ]);

        let body = MethodBody::from_bytes(&data).unwrap();
        assert_eq!(body.exception_clauses.len(), 1);
        assert_eq!(body.exception_clauses[0].kind, ClauseKind::Finally);
        assert_eq!(body.exception_clauses[0].try_length, 4);
    }

    #[test]
    fn invalid_header_kind() {
        let data = [0x00, 0x00];
        assert!(MethodBody::from_bytes(&data).is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_regions() {
        let clause = ExceptionClause {
            kind: ClauseKind::Catch,
            try_offset: 0,
            try_length: 4,
            handler_offset: 4,
            handler_length: 100,
            token_or_filter: 0,
        };

        let err = clause.validate(2, 8).unwrap_err();
        match err {
            crate::Error::MalformedExceptionClause { index, .. } => assert_eq!(index, 2),
            _ => panic!("Expected MalformedExceptionClause"),
        }

        let overflowing = ExceptionClause {
            try_offset: u32::MAX,
            try_length: 1,
            ..clause
        };
        assert!(overflowing.validate(0, 8).is_err());
    }
}
