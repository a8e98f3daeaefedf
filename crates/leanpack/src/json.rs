//! Direct wire-to-JSON-text projection.
//!
//! Converts an encoded buffer to a JSON string in one pass over the wire
//! format, without building intermediate values. Byte strings must be valid
//! UTF-8 and floats must be finite; everything else in the format has a
//! natural JSON form.

use crate::error::{DecodeError, JsonError};
use crate::reader::{Reader, ReaderOptions};
use crate::value::Value;

/// Converts encoded buffers to JSON text.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonConverter {
    options: ReaderOptions,
}

impl JsonConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A converter whose reader enforces the given parse limits.
    pub fn with_options(options: ReaderOptions) -> Self {
        Self { options }
    }

    /// Converts one encoded value to a JSON string.
    pub fn convert(&self, data: &[u8]) -> Result<String, JsonError> {
        let mut reader = Reader::with_options(data, self.options);
        let mut out = String::new();
        let value = reader.read()?;
        self.val(&mut reader, value, &mut out)?;
        Ok(out)
    }

    fn val(
        &self,
        reader: &mut Reader<'_>,
        value: Value<'_>,
        out: &mut String,
    ) -> Result<(), JsonError> {
        match value {
            Value::Null => out.push_str("null"),
            Value::Bool(true) => out.push_str("true"),
            Value::Bool(false) => out.push_str("false"),
            Value::Uint(u) => out.push_str(&u.to_string()),
            Value::Int(i) => out.push_str(&i.to_string()),
            Value::F16(h) => push_float(f64::from(f32::from(h)), out)?,
            Value::F32(f) => {
                if !f.is_finite() {
                    return Err(JsonError::NonFiniteFloat);
                }
                out.push_str(&f.to_string());
            }
            Value::F64(f) => push_float(f, out)?,
            Value::Bytes(bytes) => push_string(bytes, out)?,
            Value::Object => {
                out.push('{');
                let mut first = true;
                while let Some((key, entry)) = reader.iterate_object()? {
                    if !first {
                        out.push(',');
                    }
                    first = false;
                    push_string(key, out)?;
                    out.push(':');
                    self.val(reader, entry, out)?;
                }
                out.push('}');
            }
            Value::Array => {
                out.push('[');
                let mut first = true;
                while let Some(element) = reader.iterate_array()? {
                    if !first {
                        out.push(',');
                    }
                    first = false;
                    self.val(reader, element, out)?;
                }
                out.push(']');
            }
            Value::TypedArray(ta) => {
                out.push('[');
                for i in 0..ta.len() {
                    if i > 0 {
                        out.push(',');
                    }
                    match ta.get(i) {
                        Some(element) => self.val(reader, element, out)?,
                        None => out.push_str("null"),
                    }
                }
                out.push(']');
            }
            // Unreachable through the iteration above; a bare terminator is
            // a wire-level error.
            Value::ContainerEnd => {
                return Err(JsonError::Decode(DecodeError::UnexpectedContainerEnd))
            }
        }
        Ok(())
    }
}

fn push_float(f: f64, out: &mut String) -> Result<(), JsonError> {
    if !f.is_finite() {
        return Err(JsonError::NonFiniteFloat);
    }
    out.push_str(&f.to_string());
    Ok(())
}

/// Validates UTF-8 and appends a JSON string literal.
fn push_string(bytes: &[u8], out: &mut String) -> Result<(), JsonError> {
    let text = std::str::from_utf8(bytes).map_err(|_| JsonError::InvalidUtf8)?;
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{000c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(())
}
