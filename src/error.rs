use alloc::collections::TryReserveError;
use core::fmt::{Display, Formatter};

/// Errors returned by the fallible bitset constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitSetError {
    /// A bit string contained something other than `'0'` or `'1'`.
    InvalidChar {
        /// Position of the offending character, counted in characters.
        index: usize,
        /// The offending character.
        found: char,
    },
    /// The backing words could not be allocated.
    Alloc(TryReserveError),
}

impl From<TryReserveError> for BitSetError {
    fn from(err: TryReserveError) -> Self {
        BitSetError::Alloc(err)
    }
}

impl Display for BitSetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            BitSetError::InvalidChar { index, found } => {
                write!(f, "expected 0 or 1 in bit string, not {found:?} at {index}")
            }
            BitSetError::Alloc(err) => write!(f, "bitset allocation failed: {err}"),
        }
    }
}

impl core::error::Error for BitSetError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            BitSetError::Alloc(err) => Some(err),
            BitSetError::InvalidChar { .. } => None,
        }
    }
}
