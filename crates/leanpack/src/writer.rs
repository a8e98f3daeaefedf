//! Writer primitives and the canonical encoding choice.
//!
//! The writer appends tagged values to a caller-owned [`Sink`]. The
//! canonical entry point [`Writer::write_any`] always chooses the narrowest
//! kind for a value; the fixed-width kinds are produced only by the explicit
//! per-kind calls.

use half::f16;
use leanpack_buffers::{Sink, SinkError};

use crate::constants::*;
use crate::tag::{encode_tag, uint_byte_len};
use crate::value::{ElemKind, Value};

/// Emits tagged values into a byte sink.
pub struct Writer<'w> {
    sink: &'w mut dyn Sink,
}

impl<'w> Writer<'w> {
    pub fn new(sink: &'w mut dyn Sink) -> Self {
        Self { sink }
    }

    #[inline]
    fn tag(&mut self, kind: u8, data: u8) -> Result<(), SinkError> {
        self.sink.write_byte(encode_tag(kind, data))
    }

    pub fn write_null(&mut self) -> Result<(), SinkError> {
        self.tag(KIND_NULL, 0)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), SinkError> {
        self.tag(KIND_BOOL, value as u8)
    }

    pub fn start_object(&mut self) -> Result<(), SinkError> {
        self.tag(KIND_OBJECT, 0)
    }

    pub fn start_array(&mut self) -> Result<(), SinkError> {
        self.tag(KIND_ARRAY, 0)
    }

    pub fn end_container(&mut self) -> Result<(), SinkError> {
        self.tag(KIND_CONTAINER_END, 0)
    }

    /// Fixed-width `u8` kind.
    pub fn write_u8(&mut self, value: u8) -> Result<(), SinkError> {
        self.tag(KIND_U8, 0)?;
        self.sink.write_byte(value)
    }

    /// Fixed-width `u16` kind (little-endian).
    pub fn write_u16(&mut self, value: u16) -> Result<(), SinkError> {
        self.tag(KIND_U16, 0)?;
        self.sink.write_all(&value.to_le_bytes())
    }

    /// Fixed-width `u32` kind (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<(), SinkError> {
        self.tag(KIND_U32, 0)?;
        self.sink.write_all(&value.to_le_bytes())
    }

    /// Fixed-width `u64` kind (little-endian).
    pub fn write_u64(&mut self, value: u64) -> Result<(), SinkError> {
        self.tag(KIND_U64, 0)?;
        self.sink.write_all(&value.to_le_bytes())
    }

    /// Fixed-width `i8` kind.
    pub fn write_i8(&mut self, value: i8) -> Result<(), SinkError> {
        self.tag(KIND_I8, 0)?;
        self.sink.write_byte(value as u8)
    }

    /// Fixed-width `i16` kind (little-endian).
    pub fn write_i16(&mut self, value: i16) -> Result<(), SinkError> {
        self.tag(KIND_I16, 0)?;
        self.sink.write_all(&value.to_le_bytes())
    }

    /// Fixed-width `i32` kind (little-endian).
    pub fn write_i32(&mut self, value: i32) -> Result<(), SinkError> {
        self.tag(KIND_I32, 0)?;
        self.sink.write_all(&value.to_le_bytes())
    }

    /// Fixed-width `i64` kind (little-endian).
    pub fn write_i64(&mut self, value: i64) -> Result<(), SinkError> {
        self.tag(KIND_I64, 0)?;
        self.sink.write_all(&value.to_le_bytes())
    }

    pub fn write_f16(&mut self, value: f16) -> Result<(), SinkError> {
        self.tag(KIND_F16, 0)?;
        self.sink.write_all(&value.to_bits().to_le_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), SinkError> {
        self.tag(KIND_F32, 0)?;
        self.sink.write_all(&value.to_bits().to_le_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<(), SinkError> {
        self.tag(KIND_F64, 0)?;
        self.sink.write_all(&value.to_bits().to_le_bytes())
    }

    /// Canonical unsigned integer: inline small form for 0..=7, otherwise
    /// the minimal varint.
    pub fn write_uint(&mut self, value: u64) -> Result<(), SinkError> {
        if value <= SMALL_MAX {
            return self.tag(KIND_SMALL_UINT, value as u8);
        }
        let len = uint_byte_len(value);
        self.tag(KIND_VAR_INT_UNSIGNED, (len - 1) as u8)?;
        self.sink.write_all(&value.to_le_bytes()[..len])
    }

    /// Canonical signed integer.
    ///
    /// Zero uses the unsigned inline form (positive zero has exactly one
    /// encoding); magnitudes 1..=7 use the signed inline forms; everything
    /// else is a signed varint with the sign carried by the kind.
    pub fn write_int(&mut self, value: i64) -> Result<(), SinkError> {
        if value == 0 {
            return self.tag(KIND_SMALL_UINT, 0);
        }
        let magnitude = value.unsigned_abs();
        if magnitude <= SMALL_MAX {
            let kind = if value > 0 {
                KIND_SMALL_INT_POSITIVE
            } else {
                KIND_SMALL_INT_NEGATIVE
            };
            return self.tag(kind, magnitude as u8);
        }
        let kind = if value > 0 {
            KIND_VAR_INT_SIGNED_POSITIVE
        } else {
            KIND_VAR_INT_SIGNED_NEGATIVE
        };
        let len = uint_byte_len(magnitude);
        self.tag(kind, (len - 1) as u8)?;
        self.sink.write_all(&magnitude.to_le_bytes()[..len])
    }

    /// Canonical byte string: inline length for 0..=7 bytes, otherwise a
    /// varint length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        let len = bytes.len() as u64;
        if len <= SMALL_MAX {
            self.tag(KIND_SMALL_BYTES, len as u8)?;
        } else {
            let len_len = uint_byte_len(len);
            self.tag(KIND_VAR_INT_BYTES, (len_len - 1) as u8)?;
            self.sink.write_all(&len.to_le_bytes()[..len_len])?;
        }
        self.sink.write_all(bytes)
    }

    /// The explicit `bytes` kind with a fixed 8-byte length field.
    pub fn write_bytes_long(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.tag(KIND_BYTES, 0)?;
        self.sink.write_all(&(bytes.len() as u64).to_le_bytes())?;
        self.sink.write_all(bytes)
    }

    /// Canonical byte string from UTF-8 text.
    pub fn write_str(&mut self, text: &str) -> Result<(), SinkError> {
        self.write_bytes(text.as_bytes())
    }

    /// A packed typed array of one numeric element type.
    pub fn write_typed_array<T: TypedElem>(&mut self, items: &[T]) -> Result<(), SinkError> {
        self.tag(KIND_TYPED_ARRAY, 0)?;
        self.sink.write_byte(T::ELEM as u8)?;
        self.write_uint(items.len() as u64)?;
        for item in items {
            item.put_le(&mut *self.sink)?;
        }
        Ok(())
    }

    /// Re-emits a decoded value, canonical kinds for scalars and byte
    /// strings, markers for container variants.
    pub fn write_value(&mut self, value: &Value<'_>) -> Result<(), SinkError> {
        match value {
            Value::Null => self.write_null(),
            Value::Bool(b) => self.write_bool(*b),
            Value::Uint(u) => self.write_uint(*u),
            Value::Int(i) => self.write_int(*i),
            Value::F16(h) => self.write_f16(*h),
            Value::F32(f) => self.write_f32(*f),
            Value::F64(f) => self.write_f64(*f),
            Value::Bytes(b) => self.write_bytes(b),
            Value::Object => self.start_object(),
            Value::Array => self.start_array(),
            Value::ContainerEnd => self.end_container(),
            Value::TypedArray(ta) => {
                self.tag(KIND_TYPED_ARRAY, 0)?;
                self.sink.write_byte(ta.elem() as u8)?;
                self.write_uint(ta.len() as u64)?;
                // The payload is already packed little-endian.
                self.sink.write_all(ta.payload())
            }
        }
    }

    /// Polymorphic canonical write; see [`WriteLean`].
    pub fn write_any<T: WriteLean + ?Sized>(&mut self, value: &T) -> Result<(), SinkError> {
        value.write_lean(self)
    }
}

/// A numeric type that can be an element of a typed array.
pub trait TypedElem {
    /// The on-wire element-type code.
    const ELEM: ElemKind;

    /// Appends the element's little-endian bytes.
    fn put_le(&self, sink: &mut dyn Sink) -> Result<(), SinkError>;
}

macro_rules! typed_elem {
    ($typ:ty, $elem:expr) => {
        impl TypedElem for $typ {
            const ELEM: ElemKind = $elem;

            #[inline]
            fn put_le(&self, sink: &mut dyn Sink) -> Result<(), SinkError> {
                sink.write_all(&self.to_le_bytes())
            }
        }
    };
}

typed_elem!(u8, ElemKind::U8);
typed_elem!(i8, ElemKind::I8);
typed_elem!(u16, ElemKind::U16);
typed_elem!(i16, ElemKind::I16);
typed_elem!(u32, ElemKind::U32);
typed_elem!(i32, ElemKind::I32);
typed_elem!(u64, ElemKind::U64);
typed_elem!(i64, ElemKind::I64);
typed_elem!(f32, ElemKind::F32);
typed_elem!(f64, ElemKind::F64);

impl TypedElem for f16 {
    const ELEM: ElemKind = ElemKind::F16;

    #[inline]
    fn put_le(&self, sink: &mut dyn Sink) -> Result<(), SinkError> {
        sink.write_all(&self.to_bits().to_le_bytes())
    }
}

/// Values that [`Writer::write_any`] can encode with the canonical
/// narrowest-kind rule.
///
/// Unsigned integers take the unsigned forms, signed integers the signed
/// forms, floats their exact width, text and byte slices the byte-string
/// forms. `Option<T>` encodes `None` as null.
pub trait WriteLean {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError>;
}

macro_rules! write_lean_uint {
    ($($typ:ty),*) => {
        $(impl WriteLean for $typ {
            fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
                writer.write_uint(*self as u64)
            }
        })*
    };
}

macro_rules! write_lean_int {
    ($($typ:ty),*) => {
        $(impl WriteLean for $typ {
            fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
                writer.write_int(*self as i64)
            }
        })*
    };
}

write_lean_uint!(u8, u16, u32, u64, usize);
write_lean_int!(i8, i16, i32, i64, isize);

impl WriteLean for bool {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        writer.write_bool(*self)
    }
}

impl WriteLean for () {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        writer.write_null()
    }
}

impl WriteLean for f16 {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        writer.write_f16(*self)
    }
}

impl WriteLean for f32 {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        writer.write_f32(*self)
    }
}

impl WriteLean for f64 {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        writer.write_f64(*self)
    }
}

impl WriteLean for str {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        writer.write_str(self)
    }
}

impl WriteLean for String {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        writer.write_str(self)
    }
}

impl WriteLean for [u8] {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        writer.write_bytes(self)
    }
}

impl WriteLean for Vec<u8> {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        writer.write_bytes(self)
    }
}

impl<T: WriteLean> WriteLean for Option<T> {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        match self {
            None => writer.write_null(),
            Some(value) => value.write_lean(writer),
        }
    }
}

impl<T: WriteLean + ?Sized> WriteLean for &T {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        (**self).write_lean(writer)
    }
}

impl WriteLean for Value<'_> {
    fn write_lean(&self, writer: &mut Writer<'_>) -> Result<(), SinkError> {
        writer.write_value(self)
    }
}
