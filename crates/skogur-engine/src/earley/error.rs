//! Parse errors.

use thiserror::Error;

/// Why a parse produced no forest. The parser never panics on bad input;
/// every failure is reported here, together with the token offset the C
/// ABI surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no tokens to parse")]
    EmptyInput,
    #[error("start symbol {0} is not a known nonterminal")]
    InvalidStart(i32),
    #[error("parse stalled at token {0}")]
    Stalled(u32),
    #[error("no derivation of the start symbol spans all {0} tokens")]
    NoParse(u32),
}

impl ParseError {
    /// Offset reported through the C ABI: 0 for argument errors, the
    /// stalled column index, or the token count when no spanning
    /// derivation exists.
    pub fn error_token(&self) -> u32 {
        match *self {
            Self::EmptyInput | Self::InvalidStart(_) => 0,
            Self::Stalled(index) => index,
            Self::NoParse(n_tokens) => n_tokens,
        }
    }
}
