//! Parse errors and input positions.

use thiserror::Error;

/// A location in the character stream, tracked by the cursor as characters
/// are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Number of characters consumed so far.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors produced while parsing a JSON document.
///
/// All variants are `Clone` because a failure is recorded in the failing
/// node's completion state *and* propagated to the caller, and any number of
/// observers may be awaiting the same completion.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    /// The grammar required more characters than the source will ever
    /// provide.
    #[error("unexpected end of input at {at}")]
    UnexpectedEndOfInput {
        /// Where the cursor was when the source ended.
        at: Position,
    },

    /// A character inconsistent with the grammar at the current position.
    #[error("unexpected character {found:?} at {at}")]
    UnexpectedToken {
        /// The offending character.
        found: char,
        /// Where it was encountered.
        at: Position,
    },

    /// A string escape introduced by `\` used an unrecognized escape
    /// character, or a unicode escape did not denote a scalar value.
    #[error("invalid escape sequence {found:?} at {at}")]
    InvalidEscapeSequence {
        /// The character that made the escape invalid.
        found: char,
        /// Where it was encountered.
        at: Position,
    },

    /// Misuse of the partial-node update protocol, e.g. updating a node whose
    /// completion has already fired. This indicates a bug in a builder, not
    /// bad input data.
    #[error("invalid partial value update: {reason}")]
    InvalidUpdate {
        /// What the offending update attempted.
        reason: &'static str,
    },
}

impl ParseError {
    pub(crate) fn invalid_update(reason: &'static str) -> Self {
        ParseError::InvalidUpdate { reason }
    }
}
