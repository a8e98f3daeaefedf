//! The wire value model: kinds, decoded values, typed-array views.

use half::f16;

use crate::constants::*;

/// Every kind of value that can appear on the wire, identified by the tag
/// byte's five-bit kind code.
///
/// The numeric values are part of the wire format and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Kind {
    Object = KIND_OBJECT,
    Array = KIND_ARRAY,
    ContainerEnd = KIND_CONTAINER_END,
    Null = KIND_NULL,
    Bool = KIND_BOOL,
    U8 = KIND_U8,
    U16 = KIND_U16,
    U32 = KIND_U32,
    U64 = KIND_U64,
    I8 = KIND_I8,
    I16 = KIND_I16,
    I32 = KIND_I32,
    I64 = KIND_I64,
    F16 = KIND_F16,
    F32 = KIND_F32,
    F64 = KIND_F64,
    SmallUint = KIND_SMALL_UINT,
    SmallIntPositive = KIND_SMALL_INT_POSITIVE,
    SmallIntNegative = KIND_SMALL_INT_NEGATIVE,
    VarIntUnsigned = KIND_VAR_INT_UNSIGNED,
    VarIntSignedPositive = KIND_VAR_INT_SIGNED_POSITIVE,
    VarIntSignedNegative = KIND_VAR_INT_SIGNED_NEGATIVE,
    Bytes = KIND_BYTES,
    VarIntBytes = KIND_VAR_INT_BYTES,
    SmallBytes = KIND_SMALL_BYTES,
    TypedArray = KIND_TYPED_ARRAY,
}

impl Kind {
    /// Maps a five-bit kind code to a [`Kind`]. Unassigned codes yield
    /// `None`.
    pub fn from_code(code: u8) -> Option<Kind> {
        Some(match code {
            KIND_OBJECT => Kind::Object,
            KIND_ARRAY => Kind::Array,
            KIND_CONTAINER_END => Kind::ContainerEnd,
            KIND_NULL => Kind::Null,
            KIND_BOOL => Kind::Bool,
            KIND_U8 => Kind::U8,
            KIND_U16 => Kind::U16,
            KIND_U32 => Kind::U32,
            KIND_U64 => Kind::U64,
            KIND_I8 => Kind::I8,
            KIND_I16 => Kind::I16,
            KIND_I32 => Kind::I32,
            KIND_I64 => Kind::I64,
            KIND_F16 => Kind::F16,
            KIND_F32 => Kind::F32,
            KIND_F64 => Kind::F64,
            KIND_SMALL_UINT => Kind::SmallUint,
            KIND_SMALL_INT_POSITIVE => Kind::SmallIntPositive,
            KIND_SMALL_INT_NEGATIVE => Kind::SmallIntNegative,
            KIND_VAR_INT_UNSIGNED => Kind::VarIntUnsigned,
            KIND_VAR_INT_SIGNED_POSITIVE => Kind::VarIntSignedPositive,
            KIND_VAR_INT_SIGNED_NEGATIVE => Kind::VarIntSignedNegative,
            KIND_BYTES => Kind::Bytes,
            KIND_VAR_INT_BYTES => Kind::VarIntBytes,
            KIND_SMALL_BYTES => Kind::SmallBytes,
            KIND_TYPED_ARRAY => Kind::TypedArray,
            _ => return None,
        })
    }
}

/// Typed-array element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElemKind {
    U8 = ELEM_U8,
    I8 = ELEM_I8,
    U16 = ELEM_U16,
    I16 = ELEM_I16,
    U32 = ELEM_U32,
    I32 = ELEM_I32,
    U64 = ELEM_U64,
    I64 = ELEM_I64,
    F16 = ELEM_F16,
    F32 = ELEM_F32,
    F64 = ELEM_F64,
}

impl ElemKind {
    /// Maps an element-type code to an [`ElemKind`].
    pub fn from_code(code: u8) -> Option<ElemKind> {
        Some(match code {
            ELEM_U8 => ElemKind::U8,
            ELEM_I8 => ElemKind::I8,
            ELEM_U16 => ElemKind::U16,
            ELEM_I16 => ElemKind::I16,
            ELEM_U32 => ElemKind::U32,
            ELEM_I32 => ElemKind::I32,
            ELEM_U64 => ElemKind::U64,
            ELEM_I64 => ElemKind::I64,
            ELEM_F16 => ElemKind::F16,
            ELEM_F32 => ElemKind::F32,
            ELEM_F64 => ElemKind::F64,
            _ => return None,
        })
    }

    /// Size of one element in bytes.
    #[inline]
    pub fn size(self) -> usize {
        match self {
            ElemKind::U8 | ElemKind::I8 => 1,
            ElemKind::U16 | ElemKind::I16 | ElemKind::F16 => 2,
            ElemKind::U32 | ElemKind::I32 | ElemKind::F32 => 4,
            ElemKind::U64 | ElemKind::I64 | ElemKind::F64 => 8,
        }
    }

    /// Whether this is one of the float element types.
    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, ElemKind::F16 | ElemKind::F32 | ElemKind::F64)
    }
}

/// A zero-copy view of a typed array's packed little-endian payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedArrayRef<'a> {
    elem: ElemKind,
    payload: &'a [u8],
}

impl<'a> TypedArrayRef<'a> {
    pub(crate) fn new(elem: ElemKind, payload: &'a [u8]) -> Self {
        debug_assert_eq!(payload.len() % elem.size(), 0);
        Self { elem, payload }
    }

    /// The element type.
    pub fn elem(&self) -> ElemKind {
        self.elem
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.payload.len() / self.elem.size()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The raw packed little-endian payload.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Decodes the element at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Value<'a>> {
        if index >= self.len() {
            return None;
        }
        let size = self.elem.size();
        let raw = &self.payload[index * size..(index + 1) * size];
        let word = crate::tag::uint_from_le(raw);
        Some(match self.elem {
            ElemKind::U8 | ElemKind::U16 | ElemKind::U32 | ElemKind::U64 => Value::Uint(word),
            ElemKind::I8 => Value::Int(word as u8 as i8 as i64),
            ElemKind::I16 => Value::Int(word as u16 as i16 as i64),
            ElemKind::I32 => Value::Int(word as u32 as i32 as i64),
            ElemKind::I64 => Value::Int(word as i64),
            ElemKind::F16 => Value::F16(f16::from_bits(word as u16)),
            ElemKind::F32 => Value::F32(f32::from_bits(word as u32)),
            ElemKind::F64 => Value::F64(f64::from_bits(word)),
        })
    }

    /// Iterates over the decoded elements.
    pub fn iter(&self) -> impl Iterator<Item = Value<'a>> + '_ {
        (0..self.len()).map(move |i| self.get(i).unwrap_or(Value::Null))
    }
}

/// A decoded value.
///
/// Byte payloads borrow from the source buffer for its lifetime; no copy is
/// made. Container variants are open markers only — the container's contents
/// follow on the wire until the matching [`Value::ContainerEnd`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    /// Any unsigned integer kind (fixed-width, small, or varint).
    Uint(u64),
    /// Any signed integer kind (fixed-width, small, or signed varint).
    Int(i64),
    F16(f16),
    F32(f32),
    F64(f64),
    /// Any byte-string kind; a slice into the source buffer.
    Bytes(&'a [u8]),
    /// Object open marker.
    Object,
    /// Array open marker.
    Array,
    /// Container terminator.
    ContainerEnd,
    TypedArray(TypedArrayRef<'a>),
}

impl<'a> Value<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(u) => Some(*u),
            Value::Int(i) if *i >= 0 => Some(*i as u64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Uint(u) if *u <= i64::MAX as u64 => Some(*u as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F16(h) => Some(f64::from(f32::from(*h))),
            Value::F32(f) => Some(f64::from(*f)),
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Whether this is an `object` or `array` open marker.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Object | Value::Array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_stable() {
        assert_eq!(Kind::Object as u8, 0);
        assert_eq!(Kind::ContainerEnd as u8, 2);
        assert_eq!(Kind::SmallUint as u8, 16);
        assert_eq!(Kind::TypedArray as u8, 25);
        for code in 0..=25u8 {
            assert_eq!(Kind::from_code(code).map(|k| k as u8), Some(code));
        }
        for code in 26..=31u8 {
            assert_eq!(Kind::from_code(code), None);
        }
    }

    #[test]
    fn test_typed_array_get() {
        // [1i16, -2, 300] packed little-endian
        let payload = [0x01, 0x00, 0xfe, 0xff, 0x2c, 0x01];
        let ta = TypedArrayRef::new(ElemKind::I16, &payload);
        assert_eq!(ta.len(), 3);
        assert_eq!(ta.get(0), Some(Value::Int(1)));
        assert_eq!(ta.get(1), Some(Value::Int(-2)));
        assert_eq!(ta.get(2), Some(Value::Int(300)));
        assert_eq!(ta.get(3), None);
    }

    #[test]
    fn test_typed_array_floats() {
        let payload = 1.5f32.to_bits().to_le_bytes();
        let ta = TypedArrayRef::new(ElemKind::F32, &payload);
        assert_eq!(ta.get(0), Some(Value::F32(1.5)));
    }

    #[test]
    fn test_value_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Uint(7).as_i64(), Some(7));
        assert_eq!(Value::Int(-1).as_u64(), None);
        assert_eq!(Value::Uint(u64::MAX).as_i64(), None);
        assert_eq!(Value::Bytes(b"hi").as_bytes(), Some(&b"hi"[..]));
        assert!(Value::Object.is_container());
        assert!(!Value::ContainerEnd.is_container());
    }
}
