use thiserror::Error;

/// Errors that can occur when accessing or growing a [`PlacementVec`][crate::PlacementVec].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A checked access referred to an index outside the live elements.
    #[error("index {index} is out of range for a sequence of length {len}")]
    IndexOutOfRange {
        /// The index the caller asked for.
        index: usize,

        /// The number of live elements at the time of the access.
        len: usize,
    },

    /// The requested number of elements cannot be described by any memory layout.
    ///
    /// If the request itself could not be calculated without overflowing, `requested`
    /// is `usize::MAX`.
    #[error("requested capacity of {requested} elements exceeds the maximum of {max}")]
    CapacityOverflow {
        /// The element count that was requested.
        requested: usize,

        /// The largest element count the container can hold.
        max: usize,
    },

    /// The allocator was unable to provide a block of the requested size.
    #[error("allocator could not provide a block of {bytes} bytes")]
    OutOfMemory {
        /// Size of the refused block, in bytes.
        bytes: usize,
    },
}

/// A specialized `Result` type for container operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
