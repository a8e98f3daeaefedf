use leanpack::constants::*;
use leanpack::tag::encode_tag;
use leanpack::{f16, DecodeError, Reader, Value, Writer};

fn encode(build: impl FnOnce(&mut Writer<'_>)) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    {
        let mut writer = Writer::new(&mut out);
        build(&mut writer);
    }
    out
}

fn read_one(data: &[u8]) -> Result<Value<'_>, DecodeError> {
    Reader::new(data).read()
}

#[test]
fn canonical_integer_wire_matrix() {
    // Inline small forms take a single byte.
    assert_eq!(
        encode(|w| w.write_uint(0).unwrap()),
        vec![encode_tag(KIND_SMALL_UINT, 0)]
    );
    assert_eq!(
        encode(|w| w.write_uint(7).unwrap()),
        vec![encode_tag(KIND_SMALL_UINT, 7)]
    );
    assert_eq!(
        encode(|w| w.write_int(1).unwrap()),
        vec![encode_tag(KIND_SMALL_INT_POSITIVE, 1)]
    );
    assert_eq!(
        encode(|w| w.write_int(-1).unwrap()),
        vec![encode_tag(KIND_SMALL_INT_NEGATIVE, 1)]
    );

    // 8 becomes a one-byte varint.
    assert_eq!(
        encode(|w| w.write_uint(8).unwrap()),
        vec![encode_tag(KIND_VAR_INT_UNSIGNED, 0), 8]
    );

    // Varint of 512: two little-endian payload bytes, tag data 1.
    assert_eq!(
        encode(|w| w.write_uint(512).unwrap()),
        vec![encode_tag(KIND_VAR_INT_UNSIGNED, 1), 0x00, 0x02]
    );

    // Eight-byte magnitudes.
    let bytes = encode(|w| w.write_uint(u64::MAX).unwrap());
    assert_eq!(bytes[0], encode_tag(KIND_VAR_INT_UNSIGNED, 7));
    assert_eq!(bytes.len(), 9);
}

#[test]
fn signed_magnitude_edges() {
    // i64::MAX: positive kind, magnitude 2^63 - 1.
    let bytes = encode(|w| w.write_int(i64::MAX).unwrap());
    assert_eq!(bytes[0], encode_tag(KIND_VAR_INT_SIGNED_POSITIVE, 7));
    assert_eq!(read_one(&bytes), Ok(Value::Int(i64::MAX)));

    // i64::MIN: negative kind, magnitude 2^63.
    let bytes = encode(|w| w.write_int(i64::MIN).unwrap());
    assert_eq!(bytes[0], encode_tag(KIND_VAR_INT_SIGNED_NEGATIVE, 7));
    assert_eq!(&bytes[1..], &(1u64 << 63).to_le_bytes());
    assert_eq!(read_one(&bytes), Ok(Value::Int(i64::MIN)));

    // Positive magnitude 2^63 is unrepresentable.
    let mut bytes = vec![encode_tag(KIND_VAR_INT_SIGNED_POSITIVE, 7)];
    bytes.extend_from_slice(&(1u64 << 63).to_le_bytes());
    assert_eq!(read_one(&bytes), Err(DecodeError::InvalidTag));

    // Negative magnitude 2^63 + 1 overflows.
    let mut bytes = vec![encode_tag(KIND_VAR_INT_SIGNED_NEGATIVE, 7)];
    bytes.extend_from_slice(&((1u64 << 63) + 1).to_le_bytes());
    assert_eq!(read_one(&bytes), Err(DecodeError::InvalidTag));

    // Negative zero does not exist.
    let bytes = [encode_tag(KIND_VAR_INT_SIGNED_NEGATIVE, 0), 0];
    assert_eq!(read_one(&bytes), Err(DecodeError::InvalidTag));
    let bytes = [encode_tag(KIND_SMALL_INT_NEGATIVE, 0)];
    assert_eq!(read_one(&bytes), Err(DecodeError::InvalidTag));
    // Inline data 0 on the positive small form aliases small_uint zero.
    let bytes = [encode_tag(KIND_SMALL_INT_POSITIVE, 0)];
    assert_eq!(read_one(&bytes), Err(DecodeError::InvalidTag));
}

#[test]
fn non_minimal_varints_decode() {
    // A wastefully wide encoding of 5 still reads back as 5; only the
    // writer guarantees minimal form.
    let bytes = [encode_tag(KIND_VAR_INT_UNSIGNED, 3), 5, 0, 0, 0];
    assert_eq!(read_one(&bytes), Ok(Value::Uint(5)));
}

#[test]
fn fixed_width_kinds_roundtrip() {
    assert_eq!(
        read_one(&encode(|w| w.write_u8(200).unwrap())),
        Ok(Value::Uint(200))
    );
    assert_eq!(
        read_one(&encode(|w| w.write_u16(0xabcd).unwrap())),
        Ok(Value::Uint(0xabcd))
    );
    assert_eq!(
        read_one(&encode(|w| w.write_u32(0xdead_beef).unwrap())),
        Ok(Value::Uint(0xdead_beef))
    );
    assert_eq!(
        read_one(&encode(|w| w.write_u64(u64::MAX).unwrap())),
        Ok(Value::Uint(u64::MAX))
    );
    assert_eq!(
        read_one(&encode(|w| w.write_i8(-100).unwrap())),
        Ok(Value::Int(-100))
    );
    assert_eq!(
        read_one(&encode(|w| w.write_i16(-30000).unwrap())),
        Ok(Value::Int(-30000))
    );
    assert_eq!(
        read_one(&encode(|w| w.write_i32(i32::MIN).unwrap())),
        Ok(Value::Int(i32::MIN as i64))
    );
    assert_eq!(
        read_one(&encode(|w| w.write_i64(i64::MIN).unwrap())),
        Ok(Value::Int(i64::MIN))
    );
}

#[test]
fn float_kinds_roundtrip() {
    let h = f16::from_f32(1.5);
    assert_eq!(read_one(&encode(|w| w.write_f16(h).unwrap())), Ok(Value::F16(h)));
    assert_eq!(
        read_one(&encode(|w| w.write_f32(-0.25).unwrap())),
        Ok(Value::F32(-0.25))
    );
    assert_eq!(
        read_one(&encode(|w| w.write_f64(std::f64::consts::PI).unwrap())),
        Ok(Value::F64(std::f64::consts::PI))
    );
    // Bit patterns survive exactly, including NaN.
    let bytes = encode(|w| w.write_f64(f64::NAN).unwrap());
    match read_one(&bytes) {
        Ok(Value::F64(f)) => assert!(f.is_nan()),
        other => panic!("expected NaN, got {:?}", other),
    }
}

#[test]
fn bytes_kinds_roundtrip() {
    assert_eq!(
        read_one(&encode(|w| w.write_bytes(b"").unwrap())),
        Ok(Value::Bytes(b""))
    );
    assert_eq!(
        read_one(&encode(|w| w.write_bytes(b"seven77").unwrap())),
        Ok(Value::Bytes(b"seven77"))
    );
    let long = vec![0x5au8; 300];
    assert_eq!(
        read_one(&encode(|w| w.write_bytes(&long).unwrap())),
        Ok(Value::Bytes(long.as_slice()))
    );
    // The explicit 8-byte-length form decodes to the same value.
    assert_eq!(
        read_one(&encode(|w| w.write_bytes_long(b"abc").unwrap())),
        Ok(Value::Bytes(b"abc"))
    );
}

#[test]
fn typed_array_roundtrip() {
    let bytes = encode(|w| w.write_typed_array(&[1u16, 513, 65535]).unwrap());
    match read_one(&bytes) {
        Ok(Value::TypedArray(ta)) => {
            assert_eq!(ta.len(), 3);
            assert_eq!(ta.get(0), Some(Value::Uint(1)));
            assert_eq!(ta.get(1), Some(Value::Uint(513)));
            assert_eq!(ta.get(2), Some(Value::Uint(65535)));
            // count * sizeof(elem) exactly
            assert_eq!(ta.payload().len(), 6);
        }
        other => panic!("expected typed array, got {:?}", other),
    }

    let bytes = encode(|w| w.write_typed_array(&[-1.0f64, 2.5]).unwrap());
    match read_one(&bytes) {
        Ok(Value::TypedArray(ta)) => {
            assert_eq!(ta.get(0), Some(Value::F64(-1.0)));
            assert_eq!(ta.get(1), Some(Value::F64(2.5)));
        }
        other => panic!("expected typed array, got {:?}", other),
    }
}

#[test]
fn typed_array_truncated_payload() {
    let mut bytes = encode(|w| w.write_typed_array(&[1u32, 2]).unwrap());
    bytes.truncate(bytes.len() - 1);
    assert_eq!(read_one(&bytes), Err(DecodeError::UnexpectedEof));
}

#[test]
fn typed_array_unknown_elem_code() {
    let bytes = [encode_tag(KIND_TYPED_ARRAY, 0), 11, encode_tag(KIND_SMALL_UINT, 0)];
    assert_eq!(read_one(&bytes), Err(DecodeError::InvalidTag));
}

#[test]
fn write_any_roundtrip_law() {
    // read(write_any(v)) == v under the canonical-kind mapping.
    for v in [0u64, 1, 7, 8, 255, 256, 512, u64::MAX] {
        let bytes = encode(|w| w.write_any(&v).unwrap());
        assert_eq!(read_one(&bytes), Ok(Value::Uint(v)));
    }
    for v in [1i64, 7, 8, -1, -7, -8, -300, i64::MAX, i64::MIN] {
        let bytes = encode(|w| w.write_any(&v).unwrap());
        assert_eq!(read_one(&bytes), Ok(Value::Int(v)));
    }
    let bytes = encode(|w| w.write_any("hello").unwrap());
    assert_eq!(read_one(&bytes), Ok(Value::Bytes(b"hello")));
}

#[test]
fn canonical_reencode_is_byte_identical() {
    // Walking a canonical buffer token by token and re-emitting every
    // token reproduces it exactly.
    let original = encode(|w| {
        w.start_object().unwrap();
        w.write_str("nums").unwrap();
        w.start_array().unwrap();
        w.write_uint(3).unwrap();
        w.write_int(-300).unwrap();
        w.write_null().unwrap();
        w.end_container().unwrap();
        w.write_str("flag").unwrap();
        w.write_bool(false).unwrap();
        w.write_str("packed").unwrap();
        w.write_typed_array(&[9u8, 8, 7]).unwrap();
        w.end_container().unwrap();
    });
    let mut reader = Reader::new(&original);
    let mut reencoded: Vec<u8> = Vec::new();
    {
        let mut writer = Writer::new(&mut reencoded);
        loop {
            let value = reader.read().unwrap();
            writer.write_value(&value).unwrap();
            if reader.remaining() == 0 && reader.depth() == 0 {
                break;
            }
        }
    }
    assert_eq!(reencoded, original);
}

#[test]
fn unused_data_bits_must_be_zero() {
    for kind in [
        KIND_OBJECT,
        KIND_ARRAY,
        KIND_CONTAINER_END,
        KIND_NULL,
        KIND_U8,
        KIND_F64,
        KIND_BYTES,
        KIND_TYPED_ARRAY,
    ] {
        let bytes = [encode_tag(kind, 5), 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            Reader::new(&bytes).read(),
            Err(DecodeError::InvalidTag),
            "kind {} accepted nonzero data bits",
            kind
        );
    }
    // Bool carries its value in bit 5 but rejects 2..=7.
    assert_eq!(read_one(&[encode_tag(KIND_BOOL, 2)]), Err(DecodeError::InvalidTag));
}
