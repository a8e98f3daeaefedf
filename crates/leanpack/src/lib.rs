//! leanpack — a compact, schemaless, self-describing binary encoding for
//! JSON-like documents (objects, arrays, scalars, byte strings) together
//! with its read/query/patch engine.
//!
//! The format is built around a one-byte tag (five-bit kind, three-bit
//! inline data), little-endian minimal-length varints, open-ended
//! containers with a terminator marker, and packed typed arrays. The
//! [`Reader`] decodes in a single forward pass with zero-copy byte slices
//! and optional parse limits; the [`Writer`] emits canonical narrowest-kind
//! encodings into any [`Sink`]; [`apply_updates`] re-encodes a buffer with
//! a batch of path-addressed updates applied without ever materializing
//! the document.
//!
//! # Example
//!
//! ```
//! use leanpack::{apply_updates, Reader, Update, Value, Writer};
//!
//! let mut buf: Vec<u8> = Vec::new();
//! {
//!     let mut w = Writer::new(&mut buf);
//!     w.start_object().unwrap();
//!     w.write_str("count").unwrap();
//!     w.write_uint(1).unwrap();
//!     w.end_container().unwrap();
//! }
//!
//! let mut updates = [Update::new("count", &2u64)];
//! let mut patched: Vec<u8> = Vec::new();
//! apply_updates(&buf, &mut updates, &mut patched).unwrap();
//!
//! let mut reader = Reader::new(&patched);
//! assert_eq!(reader.read_path("count"), Ok(Some(Value::Uint(2))));
//! ```

pub mod constants;
pub mod error;
pub mod json;
pub mod patch;
pub mod path;
pub mod reader;
pub mod tag;
pub mod value;
pub mod writer;

pub use error::{DecodeError, JsonError, PatchError};
pub use json::JsonConverter;
pub use patch::{apply_updates, Update};
pub use reader::{gen_path_reader, validate, PathQuery, PathReader, Reader, ReaderOptions};
pub use value::{ElemKind, Kind, TypedArrayRef, Value};
pub use writer::{TypedElem, WriteLean, Writer};

pub use half::f16;
pub use leanpack_buffers::{Sink, SinkError, SliceSink};
