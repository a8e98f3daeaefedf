//! Error types surfaced at the crate boundary.
//!
//! Errors are strongly typed, returned by value, and never recovered
//! internally. Wire-level errors mean the buffer is rejected; policy errors
//! mean the input parsed but exceeded a configured ceiling.

use leanpack_buffers::{BufferError, SinkError};
use thiserror::Error;

/// Errors produced while decoding a buffer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended inside a value.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// An unassigned kind code, invalid inline data, or otherwise malformed
    /// tag.
    #[error("invalid tag byte")]
    InvalidTag,
    /// A `container_end` marker appeared outside any container.
    #[error("container end marker outside any container")]
    UnexpectedContainerEnd,
    /// Nesting exceeded the configured `max_depth`.
    #[error("maximum nesting depth exceeded")]
    MaxDepthExceeded,
    /// A byte-string length exceeded the configured `max_bytes_length`.
    #[error("byte string longer than the configured limit")]
    BytesTooLong,
    /// An array grew past the configured `max_array_length`.
    #[error("array longer than the configured limit")]
    ArrayTooLarge,
    /// An object grew past the configured `max_object_size`.
    #[error("object larger than the configured limit")]
    ObjectTooLarge,
    /// A buffer validated as a single value had bytes left over.
    #[error("trailing bytes after value")]
    TrailingBytes,
}

impl From<BufferError> for DecodeError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer => DecodeError::UnexpectedEof,
        }
    }
}

/// Errors produced by [`apply_updates`](crate::patch::apply_updates).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PatchError {
    /// The source root is not a container and the updates address into it.
    #[error("source root is not a container")]
    InvalidRoot,
    /// An update path failed to parse.
    #[error("malformed update path")]
    MalformedPath,
    /// An update path disagrees with the structure of the source buffer.
    #[error("update path does not match document structure")]
    PathTypeMismatch,
    /// A leaf update and a child update address the same position.
    #[error("conflicting updates for the same path")]
    ConflictingUpdates,
    /// An update index is out of range for a typed array.
    #[error("index out of range")]
    IndexOutOfRange,
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Errors produced by the JSON projection.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum JsonError {
    /// A byte payload is not valid UTF-8 and cannot become a JSON string.
    #[error("byte string is not valid utf-8")]
    InvalidUtf8,
    /// A float is NaN or infinite and has no JSON number form.
    #[error("non-finite float has no json representation")]
    NonFiniteFloat,
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
