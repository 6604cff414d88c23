//! Exception-region tracking for the instruction walker.
//!
//! The tracker is a bracket-matching automaton keyed on byte offset equality:
//! before each instruction it scans the clause list for regions starting at
//! the cursor and emits open markers, after each instruction it scans for
//! regions ending at the new cursor and emits close markers. Clause counts
//! are method-local and small, so the repeated linear scan is the intended
//! design rather than an interval structure.

use std::io::Write;

use crate::{
    metadata::{resolver::unresolved, ClauseKind, ExceptionClause, Token, TokenResolver},
    Result,
};

/// Maximum bracket nesting depth accepted before the input is treated as
/// malformed.
pub const MAX_NESTING: usize = 512;

/// Tracks which `.try`/handler regions are active as the cursor advances,
/// owning the indentation state of the listing.
///
/// Clauses are never mutated or removed; every boundary check re-tests the
/// full list. Clauses that fail validation against the code size have their
/// brackets skipped entirely.
pub(crate) struct RegionTracker<'a> {
    clauses: &'a [ExceptionClause],
    /// Per-clause result of the up-front bounds check.
    usable: Vec<bool>,
    /// Two spaces per open region; grows and shrinks with the brackets.
    indent: String,
}

impl<'a> RegionTracker<'a> {
    pub(crate) fn new(clauses: &'a [ExceptionClause], code_size: usize) -> Self {
        let usable = clauses
            .iter()
            .enumerate()
            .map(|(index, clause)| clause.validate(index, code_size).is_ok())
            .collect();

        RegionTracker {
            clauses,
            usable,
            indent: String::new(),
        }
    }

    /// Current indentation prefix.
    pub(crate) fn indent(&self) -> &str {
        &self.indent
    }

    /// Current nesting depth.
    pub(crate) fn depth(&self) -> usize {
        self.indent.len() / 2
    }

    fn push_indent(&mut self) -> Result<()> {
        if self.depth() >= MAX_NESTING {
            return Err(malformed_error!(
                "Exception region nesting exceeds {} levels",
                MAX_NESTING
            ));
        }
        self.indent.push_str("  ");
        Ok(())
    }

    fn pop_indent(&mut self) {
        // A close without a matching open is a tracker or input-integrity
        // bug, not ordinary malformed input
        assert!(
            self.indent.len() >= 2,
            "indentation underflow while closing an exception region"
        );
        self.indent.truncate(self.indent.len() - 2);
    }

    /// Emit open markers for every region starting at `offset`.
    ///
    /// The scan runs in reverse declaration order: CIL declares inner clauses
    /// before the outer ones enclosing them, so reversing opens outer
    /// brackets first and keeps the nesting strict.
    pub(crate) fn open_at<R: TokenResolver, W: Write>(
        &mut self,
        offset: usize,
        resolver: &R,
        out: &mut W,
    ) -> Result<()> {
        for index in (0..self.clauses.len()).rev() {
            if !self.usable[index] {
                continue;
            }
            let clause = &self.clauses[index];

            if clause.kind.opens_try() && offset == clause.try_offset as usize {
                writeln!(out, "\t{}.try {{ // {}", self.indent, index)?;
                self.push_indent()?;
            }
            if offset == clause.handler_offset as usize {
                let class_name = match clause.kind {
                    ClauseKind::Catch => {
                        let token = Token::new(clause.token_or_filter);
                        resolver.token(token).unwrap_or_else(|_| unresolved(token))
                    }
                    _ => String::new(),
                };
                writeln!(
                    out,
                    "\t{}{} {} {{ // {}",
                    self.indent, clause.kind, class_name, index
                )?;
                self.push_indent()?;
            }
        }

        Ok(())
    }

    /// Emit close markers for every region ending at `offset`.
    ///
    /// Forward declaration order mirrors the reverse open scan, closing
    /// inner brackets before outer ones.
    pub(crate) fn close_at<W: Write>(&mut self, offset: usize, out: &mut W) -> Result<()> {
        for (index, clause) in self.clauses.iter().enumerate() {
            if !self.usable[index] {
                continue;
            }

            if clause.kind.opens_try() && clause.try_end().map(|end| end as usize) == Some(offset) {
                self.pop_indent();
                writeln!(out, "\t{}}} // end .try {}", self.indent, index)?;
            }
            if clause.handler_end().map(|end| end as usize) == Some(offset) {
                self.pop_indent();
                writeln!(out, "\t{}}} // end handler {}", self.indent, index)?;
            }
        }

        Ok(())
    }
}
