//! Low-level binary access: bounds-checked primitive reads and the cursor
//! [`parser::Parser`] the disassembler walks a method body with.

pub(crate) mod io;
pub mod parser;
