//! Byte-buffer plumbing shared by the leanpack codec.
//!
//! Three pieces live here: a bounds-checked cursor [`Reader`] over a borrowed
//! byte slice, an auto-growing [`Writer`], and the [`Sink`] abstraction the
//! codec writes through. None of them know anything about the wire format.

use thiserror::Error;

mod reader;
mod sink;
mod writer;

pub use reader::Reader;
pub use sink::{Sink, SinkError, SliceSink};
pub use writer::Writer;

/// Errors reported by the cursor [`Reader`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A read would run past the end of the buffer.
    #[error("end of buffer")]
    EndOfBuffer,
}
