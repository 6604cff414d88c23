#![warn(missing_docs)]
#![deny(unsafe_code)]
//! # cildasm - CIL Method Body Disassembly for Rust
//!
//! A library for decoding and printing the instruction stream of .NET CIL
//! method bodies (ECMA-335 partition III). Given a method body's raw bytes,
//! `cildasm` parses the tiny or fat header, the code, and any exception
//! handling sections, then renders a textual listing in the classic
//! `IL_xxxx: mnemonic operand` shape with `.try`/handler brackets
//! interleaved at the right offsets.
//!
//! Token resolution is delegated to the caller through the
//! [`metadata::TokenResolver`] trait, so the disassembler works the same
//! whether names come from a full metadata reader, a symbol cache, or a
//! test fixture. Resolution failures never abort a listing; they degrade
//! to an inline `<unresolved:0x%08x>` placeholder.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cildasm::{disassemble, MethodBody, Result, Token, TokenResolver};
//!
//! struct Names;
//!
//! impl TokenResolver for Names {
//!     fn field(&self, token: Token) -> Result<String> { Ok(token.to_string()) }
//!     fn method(&self, token: Token) -> Result<String> { Ok(token.to_string()) }
//!     fn token(&self, token: Token) -> Result<String> { Ok(token.to_string()) }
//!     fn type_name(&self, token: Token) -> Result<String> { Ok(token.to_string()) }
//!     fn user_string(&self, _index: u32) -> Result<&[u8]> {
//!         Err(cildasm::Error::OutOfBounds)
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let raw = std::fs::read("method_body.bin")?;
//!     let body = MethodBody::from_bytes(&raw)?;
//!
//!     let mut listing = Vec::new();
//!     disassemble(&body, &Names, &mut listing)?;
//!     print!("{}", String::from_utf8_lossy(&listing));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`file`] - bounds-checked little-endian reads and the cursor
//!   [`Parser`] every decoder is built on
//! - [`metadata`] - method body headers, exception clauses, metadata
//!   tokens, the `#US` heap, and the [`metadata::TokenResolver`] seam
//! - [`disassembler`] - the static opcode tables, operand rendering,
//!   exception-region tracking, and the [`disassemble`] walker
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`](Result) with the crate-wide
//! [`Error`] enum. A truncated instruction stream aborts only the method
//! being listed; a malformed exception clause costs that clause its
//! brackets and nothing more.

#[macro_use]
mod error;

pub mod disassembler;
pub mod file;
pub mod metadata;

pub use crate::{
    disassembler::disassemble,
    error::Error,
    file::parser::Parser,
    metadata::{ClauseKind, ExceptionClause, MethodBody, Token, TokenResolver, UserStrings},
};

/// Convenience alias for all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
