//! Streaming reader: a forward cursor over an encoded buffer.
//!
//! The reader decodes one value per [`Reader::read`] call and never builds an
//! intermediate tree. Containers yield their open marker only; the caller
//! iterates or skips to the matching terminator. All byte payloads are
//! zero-copy slices into the source buffer.

use leanpack_buffers as buffers;

use half::f16;

use crate::constants::KIND_CONTAINER_END;
use crate::error::DecodeError;
use crate::path::{self, Seg, Segment};
use crate::tag::split_tag;
use crate::value::{ElemKind, Kind, TypedArrayRef, Value};

/// Parse limits guarding untrusted input.
///
/// All limits default to disabled. They are fixed at reader construction;
/// when `max_array_length` and `max_object_size` are both disabled the
/// reader carries no per-depth counter stack at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderOptions {
    /// Maximum container nesting depth. Checked when a container opens.
    pub max_depth: Option<usize>,
    /// Maximum length of any single byte string.
    pub max_bytes_length: Option<usize>,
    /// Maximum element count of any single array or typed array.
    pub max_array_length: Option<usize>,
    /// Maximum entry count of any single object.
    pub max_object_size: Option<usize>,
}

impl ReaderOptions {
    fn counting(&self) -> bool {
        self.max_array_length.is_some() || self.max_object_size.is_some()
    }
}

/// One query slot for [`Reader::read_paths`].
#[derive(Debug, Clone, Copy)]
pub struct PathQuery<'p, 'a> {
    /// The path to resolve.
    pub path: &'p str,
    /// The resolved value, or `None` when the path misses (or is
    /// malformed).
    pub result: Option<Value<'a>>,
}

impl<'p, 'a> PathQuery<'p, 'a> {
    pub fn new(path: &'p str) -> Self {
        Self { path, result: None }
    }
}

/// A reusable resolver for one fixed path, usable against any reader.
pub type PathReader = Box<dyn for<'a> Fn(&mut Reader<'a>) -> Result<Option<Value<'a>>, DecodeError>>;

/// Builds a reusable resolver closure for a fixed path.
///
/// The path is validated once up front; `None` means it is malformed.
pub fn gen_path_reader(path: &str) -> Option<PathReader> {
    if !path::validate(path) {
        return None;
    }
    let path = path.to_string();
    Some(Box::new(move |reader: &mut Reader<'_>| reader.read_path(&path)))
}

/// Checks that `data` holds exactly one complete value and nothing else.
pub fn validate(data: &[u8], options: ReaderOptions) -> Result<(), DecodeError> {
    let mut reader = Reader::with_options(data, options);
    reader.skip_value()?;
    if reader.remaining() != 0 {
        return Err(DecodeError::TrailingBytes);
    }
    Ok(())
}

/// Forward cursor over an encoded buffer.
pub struct Reader<'a> {
    inner: buffers::Reader<'a>,
    opts: ReaderOptions,
    depth: usize,
    /// Per-depth iteration counters; empty unless a counting limit is set.
    counters: Vec<usize>,
}

impl<'a> Reader<'a> {
    /// Creates a reader with all limits disabled.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, ReaderOptions::default())
    }

    /// Creates a reader with the given limits.
    pub fn with_options(data: &'a [u8], opts: ReaderOptions) -> Self {
        let counters = if opts.counting() {
            Vec::with_capacity(opts.max_depth.unwrap_or(16))
        } else {
            Vec::new()
        };
        Self {
            inner: buffers::Reader::new(data),
            opts,
            depth: 0,
            counters,
        }
    }

    /// Current byte offset into the buffer.
    #[inline]
    pub fn pos(&self) -> usize {
        self.inner.pos()
    }

    /// Current container nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Unread bytes left in the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }

    /// The whole source buffer.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.inner.data()
    }

    /// Peeks at the kind of the next value without advancing.
    pub fn peek_kind(&self) -> Result<Kind, DecodeError> {
        let (code, _) = split_tag(self.inner.try_peek()?);
        Kind::from_code(code).ok_or(DecodeError::InvalidTag)
    }

    /// Whether the next tag is a `container_end` marker.
    pub(crate) fn at_container_end(&self) -> Result<bool, DecodeError> {
        let (code, _) = split_tag(self.inner.try_peek()?);
        Ok(code == KIND_CONTAINER_END)
    }

    fn enter(&mut self) -> Result<(), DecodeError> {
        if let Some(max) = self.opts.max_depth {
            if self.depth + 1 > max {
                return Err(DecodeError::MaxDepthExceeded);
            }
        }
        self.depth += 1;
        if self.opts.counting() {
            self.counters.push(0);
        }
        Ok(())
    }

    /// Counts one more element (array) or entry (object) at the current
    /// depth.
    fn bump(&mut self, is_object: bool) -> Result<(), DecodeError> {
        let limit = if is_object {
            self.opts.max_object_size
        } else {
            self.opts.max_array_length
        };
        if self.opts.counting() {
            if let Some(counter) = self.counters.last_mut() {
                *counter += 1;
                if let Some(max) = limit {
                    if *counter > max {
                        return Err(if is_object {
                            DecodeError::ObjectTooLarge
                        } else {
                            DecodeError::ArrayTooLarge
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn read_bytes_payload(&mut self, len: u64) -> Result<Value<'a>, DecodeError> {
        if let Some(max) = self.opts.max_bytes_length {
            if len > max as u64 {
                return Err(DecodeError::BytesTooLong);
            }
        }
        if len > self.inner.remaining() as u64 {
            return Err(DecodeError::UnexpectedEof);
        }
        Ok(Value::Bytes(self.inner.try_buf(len as usize)?))
    }

    /// Reads the count of a typed array: a canonical unsigned integer
    /// value.
    fn read_count(&mut self) -> Result<u64, DecodeError> {
        let (code, data) = split_tag(self.inner.try_u8()?);
        match Kind::from_code(code) {
            Some(Kind::SmallUint) => Ok(data as u64),
            Some(Kind::VarIntUnsigned) => Ok(self.inner.try_uint_le(data as usize + 1)?),
            _ => Err(DecodeError::InvalidTag),
        }
    }

    fn read_typed_array(&mut self) -> Result<Value<'a>, DecodeError> {
        let elem =
            ElemKind::from_code(self.inner.try_u8()?).ok_or(DecodeError::InvalidTag)?;
        let count = self.read_count()?;
        if let Some(max) = self.opts.max_array_length {
            if count > max as u64 {
                return Err(DecodeError::ArrayTooLarge);
            }
        }
        let payload_len = count
            .checked_mul(elem.size() as u64)
            .ok_or(DecodeError::UnexpectedEof)?;
        if payload_len > self.inner.remaining() as u64 {
            return Err(DecodeError::UnexpectedEof);
        }
        let payload = self.inner.try_buf(payload_len as usize)?;
        Ok(Value::TypedArray(TypedArrayRef::new(elem, payload)))
    }

    /// Advances past one tag and its payload, returning the decoded value.
    ///
    /// Containers consume the open marker only. A `container_end` at depth
    /// zero is [`DecodeError::UnexpectedContainerEnd`]; at any other depth
    /// it is returned as [`Value::ContainerEnd`].
    pub fn read(&mut self) -> Result<Value<'a>, DecodeError> {
        let (code, data) = split_tag(self.inner.try_u8()?);
        let kind = Kind::from_code(code).ok_or(DecodeError::InvalidTag)?;
        // Kinds with no inline field require zeroed data bits.
        let zero = |d: u8| if d == 0 { Ok(()) } else { Err(DecodeError::InvalidTag) };
        match kind {
            Kind::Object | Kind::Array => {
                zero(data)?;
                self.enter()?;
                Ok(if kind == Kind::Object {
                    Value::Object
                } else {
                    Value::Array
                })
            }
            Kind::ContainerEnd => {
                zero(data)?;
                if self.depth == 0 {
                    return Err(DecodeError::UnexpectedContainerEnd);
                }
                self.depth -= 1;
                if self.opts.counting() {
                    self.counters.pop();
                }
                Ok(Value::ContainerEnd)
            }
            Kind::Null => {
                zero(data)?;
                Ok(Value::Null)
            }
            Kind::Bool => match data {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                _ => Err(DecodeError::InvalidTag),
            },
            Kind::U8 => {
                zero(data)?;
                Ok(Value::Uint(self.inner.try_u8()? as u64))
            }
            Kind::U16 => {
                zero(data)?;
                Ok(Value::Uint(self.inner.try_uint_le(2)?))
            }
            Kind::U32 => {
                zero(data)?;
                Ok(Value::Uint(self.inner.try_uint_le(4)?))
            }
            Kind::U64 => {
                zero(data)?;
                Ok(Value::Uint(self.inner.try_uint_le(8)?))
            }
            Kind::I8 => {
                zero(data)?;
                Ok(Value::Int(self.inner.try_u8()? as i8 as i64))
            }
            Kind::I16 => {
                zero(data)?;
                Ok(Value::Int(self.inner.try_uint_le(2)? as u16 as i16 as i64))
            }
            Kind::I32 => {
                zero(data)?;
                Ok(Value::Int(self.inner.try_uint_le(4)? as u32 as i32 as i64))
            }
            Kind::I64 => {
                zero(data)?;
                Ok(Value::Int(self.inner.try_uint_le(8)? as i64))
            }
            Kind::F16 => {
                zero(data)?;
                Ok(Value::F16(f16::from_bits(self.inner.try_uint_le(2)? as u16)))
            }
            Kind::F32 => {
                zero(data)?;
                Ok(Value::F32(f32::from_bits(self.inner.try_uint_le(4)? as u32)))
            }
            Kind::F64 => {
                zero(data)?;
                Ok(Value::F64(f64::from_bits(self.inner.try_uint_le(8)?)))
            }
            Kind::SmallUint => Ok(Value::Uint(data as u64)),
            Kind::SmallIntPositive => {
                // Data 0 would alias small_uint zero.
                if data == 0 {
                    return Err(DecodeError::InvalidTag);
                }
                Ok(Value::Int(data as i64))
            }
            Kind::SmallIntNegative => {
                // No negative zero.
                if data == 0 {
                    return Err(DecodeError::InvalidTag);
                }
                Ok(Value::Int(-(data as i64)))
            }
            Kind::VarIntUnsigned => {
                Ok(Value::Uint(self.inner.try_uint_le(data as usize + 1)?))
            }
            Kind::VarIntSignedPositive => {
                let magnitude = self.inner.try_uint_le(data as usize + 1)?;
                if magnitude > i64::MAX as u64 {
                    return Err(DecodeError::InvalidTag);
                }
                Ok(Value::Int(magnitude as i64))
            }
            Kind::VarIntSignedNegative => {
                let magnitude = self.inner.try_uint_le(data as usize + 1)?;
                if magnitude == 0 || magnitude > 1 << 63 {
                    return Err(DecodeError::InvalidTag);
                }
                Ok(Value::Int(if magnitude == 1 << 63 {
                    i64::MIN
                } else {
                    -(magnitude as i64)
                }))
            }
            Kind::Bytes => {
                zero(data)?;
                let len = self.inner.try_uint_le(8)?;
                self.read_bytes_payload(len)
            }
            Kind::VarIntBytes => {
                let len = self.inner.try_uint_le(data as usize + 1)?;
                self.read_bytes_payload(len)
            }
            Kind::SmallBytes => self.read_bytes_payload(data as u64),
            Kind::TypedArray => {
                zero(data)?;
                self.read_typed_array()
            }
        }
    }

    /// Advances past exactly one value, containers included.
    ///
    /// Containers are crossed with an iterative nesting counter; this never
    /// allocates and never recurses.
    pub fn skip_value(&mut self) -> Result<(), DecodeError> {
        let start_depth = self.depth;
        match self.read()? {
            Value::Object | Value::Array => {
                while self.depth > start_depth {
                    self.read()?;
                }
                Ok(())
            }
            Value::ContainerEnd => Err(DecodeError::UnexpectedContainerEnd),
            _ => Ok(()),
        }
    }

    /// Advances past the remainder of the currently open container,
    /// consuming its terminator.
    pub(crate) fn skip_to_container_end(&mut self) -> Result<(), DecodeError> {
        let target = self
            .depth
            .checked_sub(1)
            .ok_or(DecodeError::UnexpectedContainerEnd)?;
        while self.depth > target {
            self.read()?;
        }
        Ok(())
    }

    /// Yields the next `(key, value)` entry of the open object, or `None`
    /// at its terminator.
    ///
    /// Keys are any bytes-family value. A container-valued entry yields its
    /// open marker; the caller must iterate or skip it before the next
    /// call.
    pub fn iterate_object(&mut self) -> Result<Option<(&'a [u8], Value<'a>)>, DecodeError> {
        if self.at_container_end()? {
            self.read()?;
            return Ok(None);
        }
        self.bump(true)?;
        let key = match self.read()? {
            Value::Bytes(key) => key,
            _ => return Err(DecodeError::InvalidTag),
        };
        let value = self.read()?;
        Ok(Some((key, value)))
    }

    /// Yields the next element of the open array, or `None` at its
    /// terminator.
    pub fn iterate_array(&mut self) -> Result<Option<Value<'a>>, DecodeError> {
        if self.at_container_end()? {
            self.read()?;
            return Ok(None);
        }
        self.bump(false)?;
        Ok(Some(self.read()?))
    }

    /// Resolves a single path against the value at the cursor.
    ///
    /// The cursor and depth bookkeeping are restored before returning.
    /// Misses and malformed paths resolve to `None`.
    pub fn read_path(&mut self, path: &str) -> Result<Option<Value<'a>>, DecodeError> {
        if !path::validate(path) {
            return Ok(None);
        }
        let saved = self.save();
        let result = self.resolve_path(path);
        self.restore(saved);
        result
    }

    /// Resolves many paths in a single forward pass.
    ///
    /// Each query keeps its original slot; the cursor is restored on
    /// return. Queries with malformed paths resolve to `None`.
    pub fn read_paths(&mut self, queries: &mut [PathQuery<'_, 'a>]) -> Result<(), DecodeError> {
        for query in queries.iter_mut() {
            query.result = None;
        }
        let mut order: Vec<usize> = (0..queries.len())
            .filter(|&i| path::validate(queries[i].path))
            .collect();
        if order.is_empty() {
            return Ok(());
        }
        order.sort_unstable_by(|&x, &y| path::compare(queries[x].path, queries[y].path));
        let saved = self.save();
        let result = self.resolve_group(queries, &order, 0);
        self.restore(saved);
        result
    }

    fn save(&self) -> (usize, usize, usize, Option<usize>) {
        (
            self.inner.pos(),
            self.depth,
            self.counters.len(),
            self.counters.last().copied(),
        )
    }

    fn restore(&mut self, saved: (usize, usize, usize, Option<usize>)) {
        let (pos, depth, len, last) = saved;
        self.inner.seek(pos);
        self.depth = depth;
        self.counters.truncate(len);
        while self.counters.len() < len {
            self.counters.push(0);
        }
        if let (Some(last), Some(slot)) = (last, self.counters.last_mut()) {
            *slot = last;
        }
    }

    fn resolve_path(&mut self, path: &str) -> Result<Option<Value<'a>>, DecodeError> {
        let mut value = self.read()?;
        if path.is_empty() {
            return Ok(Some(value));
        }
        let mut rest = path;
        loop {
            let Segment { seg, rest: next } = match path::parse_segment(rest) {
                Some(segment) => segment,
                None => return Ok(None),
            };
            let last = next.is_empty();
            match (value, seg) {
                (Value::Object, Seg::Key(key)) => {
                    match self.scan_object_key(key.as_bytes())? {
                        Some(found) => value = found,
                        None => return Ok(None),
                    }
                }
                (Value::Array, Seg::Index(index)) => match self.scan_array_index(index)? {
                    Some(found) => value = found,
                    None => return Ok(None),
                },
                (Value::TypedArray(ta), Seg::Index(index)) if last => {
                    return Ok(ta.get(index as usize));
                }
                _ => return Ok(None),
            }
            if last {
                return Ok(Some(value));
            }
            rest = next;
        }
    }

    /// Scans the open object for the first entry whose key equals `key`.
    fn scan_object_key(&mut self, key: &[u8]) -> Result<Option<Value<'a>>, DecodeError> {
        loop {
            match self.iterate_object()? {
                None => return Ok(None),
                Some((entry_key, value)) => {
                    if entry_key == key {
                        return Ok(Some(value));
                    }
                    self.finish_value(value)?;
                }
            }
        }
    }

    fn scan_array_index(&mut self, index: u64) -> Result<Option<Value<'a>>, DecodeError> {
        let mut current: u64 = 0;
        loop {
            match self.iterate_array()? {
                None => return Ok(None),
                Some(value) => {
                    if current == index {
                        return Ok(Some(value));
                    }
                    self.finish_value(value)?;
                    current += 1;
                }
            }
        }
    }

    /// Moves past the payload of an already-read value (containers only;
    /// scalars are fully consumed by `read`).
    fn finish_value(&mut self, value: Value<'a>) -> Result<(), DecodeError> {
        if value.is_container() {
            self.skip_to_container_end()?;
        }
        Ok(())
    }

    /// Resolves a sorted group of queries that all address into the value
    /// at the cursor, consuming the value entirely.
    fn resolve_group<'p>(
        &mut self,
        queries: &mut [PathQuery<'p, 'a>],
        order: &[usize],
        depth: usize,
    ) -> Result<(), DecodeError> {
        let value = self.read()?;
        // Paths that end at this depth resolve to the value itself; the
        // sort puts them before any path that extends into it.
        let mut child_start = 0;
        for &qi in order {
            if path::segment_at_depth(queries[qi].path, depth).is_none() {
                queries[qi].result = Some(value);
                child_start += 1;
            } else {
                break;
            }
        }
        let children = &order[child_start..];
        if children.is_empty() {
            return self.finish_value(value);
        }
        match value {
            Value::Object => {
                let groups = self.child_groups(queries, children, depth);
                let mut done = vec![false; groups.len()];
                loop {
                    if self.at_container_end()? {
                        self.read()?;
                        return Ok(());
                    }
                    self.bump(true)?;
                    let key = match self.read()? {
                        Value::Bytes(key) => key,
                        _ => return Err(DecodeError::InvalidTag),
                    };
                    let hit = groups.iter().position(|&(_, _, seg)| {
                        matches!(seg, Seg::Key(k) if k.as_bytes() == key)
                    });
                    match hit {
                        Some(g) if !done[g] => {
                            done[g] = true;
                            let (start, end, _) = groups[g];
                            self.resolve_group(queries, &children[start..end], depth + 1)?;
                        }
                        _ => self.skip_value()?,
                    }
                }
            }
            Value::Array => {
                let groups = self.child_groups(queries, children, depth);
                let mut next_group = 0;
                let mut index: u64 = 0;
                loop {
                    if self.at_container_end()? {
                        self.read()?;
                        return Ok(());
                    }
                    self.bump(false)?;
                    if next_group < groups.len() && groups[next_group].2 == Seg::Index(index) {
                        let (start, end, _) = groups[next_group];
                        self.resolve_group(queries, &children[start..end], depth + 1)?;
                        next_group += 1;
                    } else {
                        self.skip_value()?;
                    }
                    index += 1;
                }
            }
            Value::TypedArray(ta) => {
                for &qi in children {
                    if let Some(segment) = path::segment_at_depth(queries[qi].path, depth) {
                        if let Seg::Index(index) = segment.seg {
                            if segment.is_leaf() {
                                queries[qi].result = ta.get(index as usize);
                            }
                        }
                    }
                }
                Ok(())
            }
            // Scalars with child paths: every query in the group misses.
            _ => Ok(()),
        }
    }

    /// Splits a sorted child list into contiguous runs sharing the same
    /// segment at `depth`.
    fn child_groups<'p>(
        &self,
        queries: &[PathQuery<'p, 'a>],
        children: &[usize],
        depth: usize,
    ) -> Vec<(usize, usize, Seg<'p>)> {
        let mut groups = Vec::new();
        let mut i = 0;
        while i < children.len() {
            let seg = match path::segment_at_depth(queries[children[i]].path, depth) {
                Some(segment) => segment.seg,
                None => {
                    i += 1;
                    continue;
                }
            };
            let mut j = i + 1;
            while j < children.len()
                && path::segment_at_depth(queries[children[j]].path, depth).map(|s| s.seg)
                    == Some(seg)
            {
                j += 1;
            }
            groups.push((i, j, seg));
            i = j;
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::encode_tag;
    use crate::writer::Writer;
    use leanpack_buffers::Sink;

    fn encode(build: impl FnOnce(&mut Writer<'_>)) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        {
            let mut writer = Writer::new(&mut out);
            build(&mut writer);
        }
        out
    }

    #[test]
    fn test_read_scalars() {
        let data = encode(|w| {
            w.write_uint(5).unwrap();
        });
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read(), Ok(Value::Uint(5)));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_empty_buffer() {
        let mut reader = Reader::new(&[]);
        assert_eq!(reader.read(), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn test_unknown_kind_code() {
        for code in 26..=31u8 {
            let data = [encode_tag(code, 0)];
            let mut reader = Reader::new(&data);
            assert_eq!(reader.read(), Err(DecodeError::InvalidTag));
        }
    }

    #[test]
    fn test_nonzero_data_on_null() {
        let data = [encode_tag(crate::constants::KIND_NULL, 3)];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read(), Err(DecodeError::InvalidTag));
    }

    #[test]
    fn test_container_end_at_depth_zero() {
        let data = [encode_tag(KIND_CONTAINER_END, 0)];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read(), Err(DecodeError::UnexpectedContainerEnd));
    }

    #[test]
    fn test_truncated_bytes_payload() {
        // small_bytes of length 5 with only two payload bytes present
        let data = [encode_tag(crate::constants::KIND_SMALL_BYTES, 5), 1, 2];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read(), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn test_small_int_negative_zero_invalid() {
        let data = [encode_tag(crate::constants::KIND_SMALL_INT_NEGATIVE, 0)];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read(), Err(DecodeError::InvalidTag));
    }

    #[test]
    fn test_i64_min_roundtrip() {
        let data = encode(|w| {
            w.write_int(i64::MIN).unwrap();
        });
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read(), Ok(Value::Int(i64::MIN)));
    }

    #[test]
    fn test_iterate_object() {
        let data = encode(|w| {
            w.start_object().unwrap();
            w.write_bytes(b"a").unwrap();
            w.write_uint(1).unwrap();
            w.write_bytes(b"b").unwrap();
            w.write_bool(true).unwrap();
            w.end_container().unwrap();
        });
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read(), Ok(Value::Object));
        assert_eq!(
            reader.iterate_object(),
            Ok(Some((&b"a"[..], Value::Uint(1))))
        );
        assert_eq!(
            reader.iterate_object(),
            Ok(Some((&b"b"[..], Value::Bool(true))))
        );
        assert_eq!(reader.iterate_object(), Ok(None));
        assert_eq!(reader.depth(), 0);
    }

    #[test]
    fn test_skip_value_nested() {
        let data = encode(|w| {
            w.start_object().unwrap();
            w.write_bytes(b"a").unwrap();
            w.start_array().unwrap();
            w.write_uint(1).unwrap();
            w.start_array().unwrap();
            w.end_container().unwrap();
            w.end_container().unwrap();
            w.end_container().unwrap();
            w.write_uint(9).unwrap();
        });
        let mut reader = Reader::new(&data);
        reader.skip_value().unwrap();
        assert_eq!(reader.read(), Ok(Value::Uint(9)));
    }

    #[test]
    fn test_read_path_restores_cursor() {
        let data = encode(|w| {
            w.start_object().unwrap();
            w.write_bytes(b"a").unwrap();
            w.write_uint(1).unwrap();
            w.end_container().unwrap();
        });
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_path("a"), Ok(Some(Value::Uint(1))));
        assert_eq!(reader.pos(), 0);
        // A second resolution sees the same buffer state.
        assert_eq!(reader.read_path("a"), Ok(Some(Value::Uint(1))));
        assert_eq!(reader.read_path("missing"), Ok(None));
    }

    #[test]
    fn test_read_path_malformed_is_miss() {
        let data = encode(|w| {
            w.write_uint(1).unwrap();
        });
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_path("a["), Ok(None));
    }

    #[test]
    fn test_read_path_typed_array_element() {
        let data = encode(|w| {
            w.start_object().unwrap();
            w.write_bytes(b"t").unwrap();
            w.write_typed_array(&[10u16, 20, 30]).unwrap();
            w.end_container().unwrap();
        });
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_path("t[2]"), Ok(Some(Value::Uint(30))));
        assert_eq!(reader.read_path("t[3]"), Ok(None));
        // A child path into a typed-array element can never resolve.
        assert_eq!(reader.read_path("t[0].x"), Ok(None));
    }

    #[test]
    fn test_validate_trailing_bytes() {
        let mut data = encode(|w| {
            w.write_uint(1).unwrap();
        });
        assert_eq!(validate(&data, ReaderOptions::default()), Ok(()));
        data.write_byte(0).unwrap();
        assert_eq!(
            validate(&data, ReaderOptions::default()),
            Err(DecodeError::TrailingBytes)
        );
    }

    #[test]
    fn test_gen_path_reader() {
        let data = encode(|w| {
            w.start_object().unwrap();
            w.write_bytes(b"k").unwrap();
            w.write_int(-3).unwrap();
            w.end_container().unwrap();
        });
        let resolve = gen_path_reader("k").unwrap();
        let mut reader = Reader::new(&data);
        assert_eq!(resolve(&mut reader), Ok(Some(Value::Int(-3))));
        assert!(gen_path_reader("k[").is_none());
    }
}
