//! Definition of errors.

use std::collections::TryReserveError;

use thiserror::Error;

/// A specialized Result type for paged sets.
pub type Result<T, E = PagesError> = std::result::Result<T, E>;

/// Ways a call into [`Pages`](crate::Pages) or a view of it can be rejected.
///
/// A rejected mutation leaves the container exactly as it was before the call.
#[derive(Debug, Error)]
pub enum PagesError {
    /// An outer index outside of `0 .. n`.
    #[error("index {index} out of range for {len} slots")]
    IndexOutOfRange { index: usize, len: usize },

    /// An extras slice whose length is not the container's `k`.
    #[error("expected {expected} extra values, found {found}")]
    ExtraLength { expected: usize, found: usize },

    /// A request for an extra value at or beyond `k`.
    #[error("extra {index} out of range for {extras} extra values")]
    ExtraOutOfRange { index: usize, extras: usize },

    /// The index was already assigned or opened for appends.
    #[error("index {index} has already been written")]
    AlreadyFinalized { index: usize },

    /// Indices must be opened in strictly increasing order.
    #[error("index {index} opened after index {last}")]
    OutOfOrder { index: usize, last: usize },

    /// An append to an index that is not the one currently open.
    #[error("index {index} is not open for appends")]
    NotOpen { index: usize },

    /// A set length or a backing store offset does not fit in a `u32`.
    #[error("backing store exceeds u32 addressing")]
    Overflow,

    /// The backing store could not grow.
    #[error(transparent)]
    Alloc(#[from] TryReserveError),

    /// Byte slices that do not describe a valid container.
    #[error("decode error: {0}")]
    Decode(String),
}

impl PagesError {
    pub(crate) fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }
}
