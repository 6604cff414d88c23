//! Operand decoding and rendering.
//!
//! One function, one match over [`OperandKind`]: consumes exactly the
//! operand's bytes from the parser and writes the rendered text to the sink.
//! All multi-byte values are little-endian. Branch targets are relative to
//! the byte following the operand; switch targets are relative to the byte
//! following the entire switch operand.

use std::io::Write;

use crate::{
    disassembler::opcodes::OperandKind,
    metadata::{resolver::unresolved, Token, TokenResolver},
    Parser, Result,
};

/// Render a branch target as a 32-bit wrapped `IL_%04x` label.
fn label(base: usize, relative: i64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let target = (base as i64 + relative) as u32;
    format!("IL_{target:04x}")
}

/// Resolve a token through `resolve`, degrading to the unresolved
/// placeholder instead of failing the listing.
fn resolve_or_placeholder<F>(token: Token, resolve: F) -> String
where
    F: FnOnce(Token) -> Result<String>,
{
    resolve(token).unwrap_or_else(|_| unresolved(token))
}

/// Decode the operand of kind `kind` at the parser's position and write its
/// rendered text to `out`.
///
/// `indent` is the instruction line's indentation prefix; the switch target
/// list renders one level deeper for its duration only.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] when the operand would read past
/// the end of the code buffer (the walker maps this to
/// [`crate::Error::TruncatedInstruction`]), and sink errors from `out`.
pub(crate) fn decode_operand<R: TokenResolver, W: Write>(
    parser: &mut Parser,
    kind: OperandKind,
    resolver: &R,
    indent: &str,
    out: &mut W,
) -> Result<()> {
    match kind {
        OperandKind::None => {}
        OperandKind::BrTarget => {
            let value = parser.read_le::<i32>()?;
            write!(out, "{}", label(parser.pos(), i64::from(value)))?;
        }
        OperandKind::ShortBrTarget => {
            let value = parser.read_le::<i8>()?;
            write!(out, "{}", label(parser.pos(), i64::from(value)))?;
        }
        OperandKind::Field => {
            let token = Token::new(parser.read_le::<u32>()?);
            write!(out, "{}", resolve_or_placeholder(token, |t| resolver.field(t)))?;
        }
        OperandKind::Method => {
            let token = Token::new(parser.read_le::<u32>()?);
            write!(out, "{}", resolve_or_placeholder(token, |t| resolver.method(t)))?;
        }
        OperandKind::Token => {
            let token = Token::new(parser.read_le::<u32>()?);
            write!(out, "{}", resolve_or_placeholder(token, |t| resolver.token(t)))?;
        }
        OperandKind::Type => {
            let token = Token::new(parser.read_le::<u32>()?);
            write!(
                out,
                "{}",
                resolve_or_placeholder(token, |t| resolver.type_name(t))
            )?;
        }
        OperandKind::Signature => {
            let token = parser.read_le::<u32>()?;
            write!(out, "signature-0x{token:08x}")?;
        }
        OperandKind::I32 => {
            let value = parser.read_le::<i32>()?;
            write!(out, "{value}")?;
        }
        OperandKind::ShortI => {
            let value = parser.read_le::<i8>()?;
            write!(out, "0x{:02x}", value as u8)?;
        }
        OperandKind::I64 => {
            let value = parser.read_le::<i64>()?;
            write!(out, "0x{value:x}")?;
        }
        OperandKind::R64 => {
            let value = parser.read_le::<f64>()?;
            write!(out, "{value}")?;
        }
        OperandKind::ShortR => {
            let value = parser.read_le::<f32>()?;
            write!(out, "{}", f64::from(value))?;
        }
        OperandKind::Var => {
            let index = parser.read_le::<i16>()?;
            write!(out, "variable-{index}")?;
        }
        OperandKind::ShortVar => {
            let index = parser.read_le::<i8>()?;
            write!(out, "{index}")?;
        }
        OperandKind::String => {
            let token = Token::new(parser.read_le::<u32>()?);
            write!(out, "\"")?;
            out.write_all(&decode_user_string(token, resolver))?;
            write!(out, "\"")?;
        }
        OperandKind::Switch => {
            let count = parser.read_le::<u32>()?;
            let end_of_operand = parser.pos() + count as usize * 4;
            let deeper = format!("{indent}  ");

            writeln!(out, "(")?;
            for case in 0..count {
                let value = parser.read_le::<i32>()?;
                write!(out, "\t{deeper}{}", label(end_of_operand, i64::from(value)))?;
                if case + 1 < count {
                    writeln!(out, ",")?;
                } else {
                    write!(out, ")")?;
                }
            }
        }
    }

    Ok(())
}

/// Fetch and narrow the user string behind an `ldstr` token.
///
/// The low 24 bits of the token index the `#US` heap; the blob's length
/// prefix is decoded, then every even-positioned byte (the low byte of each
/// UTF-16 code unit) is copied and the high byte discarded. This narrowing
/// is intentionally lossy for non-ASCII text, preserving the output of
/// classic listing tools; [`crate::UserStrings::get`] offers the correct
/// transcoding. Any lookup or length failure degrades to the unresolved
/// placeholder.
fn decode_user_string<R: TokenResolver>(token: Token, resolver: &R) -> Vec<u8> {
    let narrowed = resolver.user_string(token.row()).and_then(|blob| {
        let mut parser = Parser::new(blob);
        // The low bit of the blob length covers the trailing flag byte
        let length = parser.read_compressed_uint()? as usize & !1;
        let start = parser.pos();

        if start + length > blob.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(blob[start..start + length].iter().step_by(2).copied().collect())
    });

    narrowed.unwrap_or_else(|_| unresolved(token).into_bytes())
}
