//! The instruction walker, driving a single pass over a method body.
//!
//! Each iteration emits any exception-region open markers for the current
//! offset, decodes one instruction, writes its line, then emits any close
//! markers for the offset the cursor landed on. The listing therefore comes
//! out in a single forward pass with no target pre-scan.

use std::io::Write;

use crate::{
    disassembler::{
        opcodes::{lookup, TWO_BYTE_PREFIX},
        operand::decode_operand,
        regions::RegionTracker,
    },
    metadata::{MethodBody, TokenResolver},
    Error, Parser, Result,
};

/// Write a textual listing of `body` to `out`, resolving metadata tokens
/// through `resolver`.
///
/// Every instruction renders as one line of the form
/// `\t<indent>IL_xxxx: <mnemonic> <operand>`, interleaved with exception
/// region brackets. Unresolvable tokens degrade to an inline
/// `<unresolved:0x%08x>` placeholder; a clause with out-of-range boundaries
/// loses its brackets but nothing else.
///
/// # Errors
/// Returns [`Error::TruncatedInstruction`] when the code buffer ends in the
/// middle of an instruction, [`Error::Malformed`] for a reserved or unknown
/// opcode or pathological region nesting, and I/O errors from `out`.
///
/// # Examples
///
/// ```rust,ignore
/// let body = MethodBody::from_bytes(&raw)?;
/// let mut listing = Vec::new();
/// disassemble(&body, &resolver, &mut listing)?;
/// ```
pub fn disassemble<R: TokenResolver, W: Write>(
    body: &MethodBody<'_>,
    resolver: &R,
    out: &mut W,
) -> Result<()> {
    let mut parser = Parser::new(body.code);
    let mut regions = RegionTracker::new(&body.exception_clauses, body.code_size());

    while parser.has_more_data() {
        regions.open_at(parser.pos(), resolver, out)?;

        let start = parser.pos();
        let truncated = |error| match error {
            Error::OutOfBounds => Error::TruncatedInstruction { offset: start },
            other => other,
        };

        let mut index = usize::from(parser.read_le::<u8>().map_err(truncated)?);
        if index == usize::from(TWO_BYTE_PREFIX) {
            index = 256 + usize::from(parser.read_le::<u8>().map_err(truncated)?);
        }

        let opcode = lookup(index)
            .filter(|op| !op.mnemonic.is_empty())
            .ok_or_else(|| malformed_error!("Unknown opcode 0x{:04x} at IL_{:04x}", index, start))?;

        write!(out, "\t{}IL_{:04x}: {} ", regions.indent(), start, opcode.mnemonic)?;
        decode_operand(&mut parser, opcode.operand, resolver, regions.indent(), out)
            .map_err(truncated)?;
        writeln!(out)?;

        regions.close_at(parser.pos(), out)?;
    }

    Ok(())
}
