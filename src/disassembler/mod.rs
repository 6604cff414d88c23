//! CIL instruction stream disassembly.
//!
//! The entry point is [`disassemble`], a single forward pass that decodes
//! variable-length instructions from a method body and writes a textual
//! listing. [`opcodes`] holds the static instruction tables for the one-byte
//! and `0xFE`-prefixed two-byte encodings, [`operand`] renders each operand
//! kind, and [`regions`] tracks exception-region brackets and indentation.

pub mod opcodes;
pub(crate) mod operand;
pub(crate) mod regions;
mod walker;

pub use opcodes::{lookup, OpCode, OperandKind, OPCODES, OPCODES_FE, TWO_BYTE_PREFIX};
pub use regions::MAX_NESTING;
pub use walker::disassemble;
