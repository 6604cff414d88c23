use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, covering every failure this library can return.
///
/// Failures fall into two groups: hard decode errors that abort the
/// disassembly of the current method body (truncation, malformed structures),
/// and sink errors from the output writer. Token resolution failures are not
/// errors at this level; the disassembler degrades to a placeholder and
/// keeps going, since a best-effort listing is still useful.
#[derive(Error, Debug)]
pub enum Error {
    /// An out of bound access was attempted while parsing the data.
    ///
    /// This error occurs when trying to read data beyond the end of the
    /// buffer. It's a safety check to prevent buffer overruns during parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The data is damaged and could not be parsed.
    ///
    /// This error indicates that the input structure is corrupted or doesn't
    /// conform to the ECMA-335 format. The error includes the source location
    /// where the malformation was detected for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An opcode or operand read would have run past the end of the method
    /// body's code buffer.
    ///
    /// Carries the byte offset of the instruction whose decode failed.
    /// Aborts the disassembly of that method body only; the caller may
    /// continue with the next method.
    #[error("Truncated instruction stream at IL_{offset:04x}")]
    TruncatedInstruction {
        /// Byte offset of the instruction being decoded when the stream ended
        offset: usize,
    },

    /// An exception clause declares a try or handler region that does not fit
    /// inside the method body.
    ///
    /// Non-fatal to the rest of the method: the clause's brackets are
    /// skipped, all other clauses and instructions still render.
    #[error("Malformed exception clause {index}: {message}")]
    MalformedExceptionClause {
        /// Index of the clause within the method's clause list
        index: usize,
        /// Description of the boundary violation
        message: String,
    },

    /// Writing a line to the output sink failed.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
