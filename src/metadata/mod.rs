//! Metadata-facing types: tokens, method bodies with their exception
//! clauses, the `#US` heap, and the [`resolver::TokenResolver`] seam the
//! disassembler resolves display text through.

pub mod body;
pub mod resolver;
pub mod token;
pub mod userstrings;

pub use body::{ClauseKind, ExceptionClause, MethodBody, MethodBodyFlags, SectionFlags};
pub use resolver::TokenResolver;
pub use token::Token;
pub use userstrings::UserStrings;
