//! Wire-format constants: tag layout, kind codes, element-type codes.
//!
//! Every encoded value starts with a single tag byte: bits 0..4 carry the
//! kind code, bits 5..7 carry kind-specific inline data. Kind codes are
//! assigned once and never reused.

/// Low five bits of the tag byte: the kind code.
pub const MASK_KIND: u8 = 0b0001_1111;
/// Number of bits the inline data field is shifted by.
pub const DATA_SHIFT: u32 = 5;
/// Largest value representable in the tag's inline data field.
pub const DATA_MAX: u8 = 0b0000_0111;

/// Largest magnitude that fits the inline small forms.
pub const SMALL_MAX: u64 = 7;
/// Maximum payload bytes of a varint magnitude.
pub const VARINT_MAX_BYTES: usize = 8;

pub const KIND_OBJECT: u8 = 0;
pub const KIND_ARRAY: u8 = 1;
pub const KIND_CONTAINER_END: u8 = 2;
pub const KIND_NULL: u8 = 3;
pub const KIND_BOOL: u8 = 4;
pub const KIND_U8: u8 = 5;
pub const KIND_U16: u8 = 6;
pub const KIND_U32: u8 = 7;
pub const KIND_U64: u8 = 8;
pub const KIND_I8: u8 = 9;
pub const KIND_I16: u8 = 10;
pub const KIND_I32: u8 = 11;
pub const KIND_I64: u8 = 12;
pub const KIND_F16: u8 = 13;
pub const KIND_F32: u8 = 14;
pub const KIND_F64: u8 = 15;
pub const KIND_SMALL_UINT: u8 = 16;
pub const KIND_SMALL_INT_POSITIVE: u8 = 17;
pub const KIND_SMALL_INT_NEGATIVE: u8 = 18;
pub const KIND_VAR_INT_UNSIGNED: u8 = 19;
pub const KIND_VAR_INT_SIGNED_POSITIVE: u8 = 20;
pub const KIND_VAR_INT_SIGNED_NEGATIVE: u8 = 21;
pub const KIND_BYTES: u8 = 22;
pub const KIND_VAR_INT_BYTES: u8 = 23;
pub const KIND_SMALL_BYTES: u8 = 24;
pub const KIND_TYPED_ARRAY: u8 = 25;

/// Typed-array element-type codes, stored in the byte after the tag.
pub const ELEM_U8: u8 = 0;
pub const ELEM_I8: u8 = 1;
pub const ELEM_U16: u8 = 2;
pub const ELEM_I16: u8 = 3;
pub const ELEM_U32: u8 = 4;
pub const ELEM_I32: u8 = 5;
pub const ELEM_U64: u8 = 6;
pub const ELEM_I64: u8 = 7;
pub const ELEM_F16: u8 = 8;
pub const ELEM_F32: u8 = 9;
pub const ELEM_F64: u8 = 10;
