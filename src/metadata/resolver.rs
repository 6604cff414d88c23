//! The token resolution seam between the disassembler and a metadata image.
//!
//! The instruction walker never inspects metadata tables itself; it hands
//! every decoded token to a [`TokenResolver`] and prints whatever comes back.
//! A resolver failure is not fatal; the walker renders the
//! `<unresolved:0x%08x>` placeholder and keeps going, so a damaged image
//! still yields a useful listing.

use crate::{metadata::token::Token, Result};

/// Resolves metadata tokens to display text against a loaded metadata image.
///
/// All methods are read-only with respect to the image; a single resolver may
/// serve concurrent disassembly calls. Implementations should return an error
/// (any error) for tokens they cannot resolve and let the caller degrade.
pub trait TokenResolver {
    /// Display text for a field token (member signature string).
    fn field(&self, token: Token) -> Result<String>;

    /// Display text for a method token (member signature string).
    fn method(&self, token: Token) -> Result<String>;

    /// Display text for an arbitrary token, dispatching on its table kind.
    fn token(&self, token: Token) -> Result<String>;

    /// Display text for a type token (type name).
    fn type_name(&self, token: Token) -> Result<String>;

    /// Raw length-prefixed blob of the user string at `index` (the low 24
    /// bits of an `ldstr` token), running to the end of the `#US` heap.
    fn user_string(&self, index: u32) -> Result<&[u8]>;
}

/// Placeholder rendered when a token lookup fails.
pub(crate) fn unresolved(token: Token) -> String {
    format!("<unresolved:0x{:08x}>", token.value())
}
