//! Streaming patch engine: re-encode a buffer with a batch of
//! path-addressed updates applied, in a single pass and without
//! materializing the document.
//!
//! Updates whose paths exist in the source replace the addressed value;
//! updates whose paths do not exist are upserted when the enclosing
//! container closes, creating intermediate containers on the fly. Subtrees
//! untouched by any update are copied to the sink byte for byte.

use leanpack_buffers::{Sink, SinkError, SliceSink};

use crate::constants::{KIND_ARRAY, KIND_CONTAINER_END, KIND_OBJECT};
use crate::error::{DecodeError, PatchError};
use crate::path::{self, Seg};
use crate::reader::Reader;
use crate::tag::encode_tag;
use crate::value::{ElemKind, TypedArrayRef, Value};
use crate::writer::{WriteLean, Writer};

type WriteFn<'u> = Box<dyn Fn(&mut Writer<'_>) -> Result<(), SinkError> + 'u>;

/// One path-addressed update.
///
/// The value is a late-bound write closure invoked against the output
/// writer when the update's position is reached; the engine never inspects
/// the value itself.
pub struct Update<'u> {
    path: &'u str,
    write: WriteFn<'u>,
    applied: bool,
}

impl<'u> Update<'u> {
    /// An update that writes `value` with the canonical narrowest-kind
    /// rule.
    pub fn new<T: WriteLean + ?Sized>(path: &'u str, value: &'u T) -> Self {
        Self {
            path,
            write: Box::new(move |writer| writer.write_any(value)),
            applied: false,
        }
    }

    /// An update with a caller-provided write closure.
    ///
    /// The closure must emit exactly one value.
    pub fn with_write_fn(
        path: &'u str,
        write: impl Fn(&mut Writer<'_>) -> Result<(), SinkError> + 'u,
    ) -> Self {
        Self {
            path,
            write: Box::new(write),
            applied: false,
        }
    }

    pub fn path(&self) -> &'u str {
        self.path
    }

    /// Whether the engine consumed this update.
    pub fn applied(&self) -> bool {
        self.applied
    }
}

impl std::fmt::Debug for Update<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Update")
            .field("path", &self.path)
            .field("applied", &self.applied)
            .finish()
    }
}

/// What a group-lookup matches a segment against.
enum Target<'k> {
    Key(&'k [u8]),
    Index(u64),
}

fn seg_matches(seg: &Seg<'_>, target: &Target<'_>) -> bool {
    match (seg, target) {
        (Seg::Key(key), Target::Key(bytes)) => key.as_bytes() == *bytes,
        (Seg::Index(i), Target::Index(n)) => i == n,
        _ => false,
    }
}

/// Finds the contiguous run of updates whose segment at `depth` matches
/// `target`, provided the run still holds at least one unapplied update.
fn find_group(updates: &[Update<'_>], depth: usize, target: &Target<'_>) -> Option<(usize, usize)> {
    let mut start = None;
    let mut end = updates.len();
    for (i, update) in updates.iter().enumerate() {
        let matched = path::segment_at_depth(update.path, depth)
            .map(|s| seg_matches(&s.seg, target))
            .unwrap_or(false);
        if matched && start.is_none() {
            start = Some(i);
        } else if !matched && start.is_some() {
            end = i;
            break;
        }
    }
    let start = start?;
    if updates[start..end].iter().any(|u| !u.applied) {
        Some((start, end))
    } else {
        None
    }
}

/// `(has_leaf, has_child)` over the unapplied updates of a group.
fn classify(updates: &[Update<'_>], depth: usize) -> (bool, bool) {
    let mut leaf = false;
    let mut child = false;
    for update in updates {
        if update.applied {
            continue;
        }
        if let Some(seg) = path::segment_at_depth(update.path, depth) {
            if seg.is_leaf() {
                leaf = true;
            } else {
                child = true;
            }
        }
    }
    (leaf, child)
}

/// Applies a batch of updates to an encoded buffer, writing the updated
/// re-encoding to `sink`.
///
/// The update slice is re-sorted in place by segment-wise path order, which
/// makes the output independent of the caller's ordering. On success every
/// consumed update reports [`Update::applied`]. The source buffer and the
/// sink must be distinct.
pub fn apply_updates(
    src: &[u8],
    updates: &mut [Update<'_>],
    sink: &mut dyn Sink,
) -> Result<(), PatchError> {
    for update in updates.iter_mut() {
        update.applied = false;
        if !path::validate(update.path) {
            return Err(PatchError::MalformedPath);
        }
    }
    if updates.is_empty() {
        sink.write_all(src)?;
        return Ok(());
    }
    updates.sort_unstable_by(|a, b| path::compare(a.path, b.path));

    let mut engine = Engine {
        reader: Reader::new(src),
        src,
        sink,
    };

    // Root replacement: the whole document is swapped out.
    if updates[0].path.is_empty() {
        if updates.len() > 1 {
            return Err(PatchError::ConflictingUpdates);
        }
        engine.reader.skip_value()?;
        engine.emit_update(&updates[0])?;
        updates[0].applied = true;
        return Ok(());
    }

    match engine.reader.read()? {
        Value::Object => {
            engine.sink.write_byte(encode_tag(KIND_OBJECT, 0))?;
            engine.patch_object(updates, 0)
        }
        Value::Array => {
            engine.sink.write_byte(encode_tag(KIND_ARRAY, 0))?;
            engine.patch_array(updates, 0)
        }
        _ => Err(PatchError::InvalidRoot),
    }
}

struct Engine<'a, 's> {
    reader: Reader<'a>,
    src: &'a [u8],
    sink: &'s mut dyn Sink,
}

impl<'a> Engine<'a, '_> {
    /// Copies a source byte range to the sink verbatim.
    fn copy(&mut self, start: usize, end: usize) -> Result<(), PatchError> {
        self.sink.write_all(&self.src[start..end])?;
        Ok(())
    }

    fn emit_update(&mut self, update: &Update<'_>) -> Result<(), PatchError> {
        let mut writer = Writer::new(&mut *self.sink);
        (update.write)(&mut writer)?;
        Ok(())
    }

    /// Marks every unapplied update of a leaf group applied and emits the
    /// last one; earlier duplicates at the same path are discarded.
    fn emit_leaf(&mut self, group: &mut [Update<'_>]) -> Result<(), PatchError> {
        let mut last = None;
        for (i, update) in group.iter_mut().enumerate() {
            if !update.applied {
                update.applied = true;
                last = Some(i);
            }
        }
        if let Some(i) = last {
            self.emit_update(&group[i])?;
        }
        Ok(())
    }

    /// Walks the open source object at segment index `depth`.
    fn patch_object(&mut self, updates: &mut [Update<'_>], depth: usize) -> Result<(), PatchError> {
        loop {
            if self.reader.at_container_end()? {
                self.upsert_object(updates, depth)?;
                self.reader.read()?;
                self.sink.write_byte(encode_tag(KIND_CONTAINER_END, 0))?;
                return Ok(());
            }
            let entry_start = self.reader.pos();
            let key = match self.reader.read()? {
                Value::Bytes(key) => key,
                _ => return Err(DecodeError::InvalidTag.into()),
            };
            let value_start = self.reader.pos();
            match find_group(updates, depth, &Target::Key(key)) {
                None => {
                    // Untouched entry: key and value verbatim.
                    self.reader.skip_value()?;
                    let end = self.reader.pos();
                    self.copy(entry_start, end)?;
                }
                Some((lo, hi)) => {
                    self.copy(entry_start, value_start)?;
                    self.apply_group(&mut updates[lo..hi], depth)?;
                }
            }
        }
    }

    /// Walks the open source array at segment index `depth`.
    fn patch_array(&mut self, updates: &mut [Update<'_>], depth: usize) -> Result<(), PatchError> {
        let mut index: u64 = 0;
        loop {
            if self.reader.at_container_end()? {
                self.upsert_array(updates, depth, index)?;
                self.reader.read()?;
                self.sink.write_byte(encode_tag(KIND_CONTAINER_END, 0))?;
                return Ok(());
            }
            let elem_start = self.reader.pos();
            match find_group(updates, depth, &Target::Index(index)) {
                None => {
                    self.reader.skip_value()?;
                    let end = self.reader.pos();
                    self.copy(elem_start, end)?;
                }
                Some((lo, hi)) => self.apply_group(&mut updates[lo..hi], depth)?,
            }
            index += 1;
        }
    }

    /// Handles one matched group at the source value under the cursor:
    /// replace it, or descend into it.
    fn apply_group(&mut self, group: &mut [Update<'_>], depth: usize) -> Result<(), PatchError> {
        let (has_leaf, has_child) = classify(group, depth);
        if has_leaf && has_child {
            return Err(PatchError::ConflictingUpdates);
        }
        if has_leaf {
            self.reader.skip_value()?;
            return self.emit_leaf(group);
        }
        // Child updates require a container to descend into.
        let value_start = self.reader.pos();
        match self.reader.read()? {
            Value::Object => {
                self.sink.write_byte(encode_tag(KIND_OBJECT, 0))?;
                self.patch_object(group, depth + 1)
            }
            Value::Array => {
                self.sink.write_byte(encode_tag(KIND_ARRAY, 0))?;
                self.patch_array(group, depth + 1)
            }
            Value::TypedArray(ta) => self.patch_typed_array(ta, group, depth + 1, value_start),
            _ => Err(PatchError::PathTypeMismatch),
        }
    }

    /// Emits the still-unapplied updates of an object once its source
    /// entries are exhausted, grouped by key in sorted order.
    fn upsert_object(&mut self, updates: &mut [Update<'_>], depth: usize) -> Result<(), PatchError> {
        let mut i = 0;
        while i < updates.len() {
            if updates[i].applied {
                i += 1;
                continue;
            }
            let seg = match path::segment_at_depth(updates[i].path, depth) {
                Some(seg) => seg,
                None => {
                    i += 1;
                    continue;
                }
            };
            let key = match seg.seg {
                Seg::Key(key) => key,
                Seg::Index(_) => return Err(PatchError::PathTypeMismatch),
            };
            let mut j = i + 1;
            while j < updates.len()
                && path::segment_at_depth(updates[j].path, depth).map(|s| s.seg) == Some(seg.seg)
            {
                j += 1;
            }
            let (has_leaf, has_child) = classify(&updates[i..j], depth);
            if has_leaf && has_child {
                return Err(PatchError::ConflictingUpdates);
            }
            {
                let mut writer = Writer::new(&mut *self.sink);
                writer.write_bytes(key.as_bytes())?;
            }
            if has_leaf {
                self.emit_leaf(&mut updates[i..j])?;
            } else {
                self.emit_container_from_updates(&mut updates[i..j], depth + 1)?;
            }
            i = j;
        }
        Ok(())
    }

    /// Extends an array from `from_index` through the highest updated
    /// index, filling gaps with null.
    fn upsert_array(
        &mut self,
        updates: &mut [Update<'_>],
        depth: usize,
        from_index: u64,
    ) -> Result<(), PatchError> {
        let mut max_index = None;
        for update in updates.iter() {
            if update.applied {
                continue;
            }
            if let Some(seg) = path::segment_at_depth(update.path, depth) {
                match seg.seg {
                    Seg::Index(i) => max_index = Some(max_index.map_or(i, |m: u64| m.max(i))),
                    Seg::Key(_) => return Err(PatchError::PathTypeMismatch),
                }
            }
        }
        let max_index = match max_index {
            Some(max_index) => max_index,
            None => return Ok(()),
        };
        for index in from_index..=max_index {
            match find_group(updates, depth, &Target::Index(index)) {
                None => {
                    let mut writer = Writer::new(&mut *self.sink);
                    writer.write_null()?;
                }
                Some((lo, hi)) => {
                    let (has_leaf, has_child) = classify(&updates[lo..hi], depth);
                    if has_leaf && has_child {
                        return Err(PatchError::ConflictingUpdates);
                    }
                    if has_leaf {
                        self.emit_leaf(&mut updates[lo..hi])?;
                    } else {
                        self.emit_container_from_updates(&mut updates[lo..hi], depth + 1)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Builds a brand-new container purely from updates, inferring its
    /// kind from the first segment of the first update.
    fn emit_container_from_updates(
        &mut self,
        updates: &mut [Update<'_>],
        depth: usize,
    ) -> Result<(), PatchError> {
        let first = updates
            .iter()
            .find(|u| !u.applied)
            .ok_or(PatchError::PathTypeMismatch)?;
        let seg = path::segment_at_depth(first.path, depth).ok_or(PatchError::PathTypeMismatch)?;
        match seg.seg {
            Seg::Key(_) => {
                self.sink.write_byte(encode_tag(KIND_OBJECT, 0))?;
                self.upsert_object(updates, depth)?;
            }
            Seg::Index(_) => {
                self.sink.write_byte(encode_tag(KIND_ARRAY, 0))?;
                self.upsert_array(updates, depth, 0)?;
            }
        }
        self.sink.write_byte(encode_tag(KIND_CONTAINER_END, 0))?;
        Ok(())
    }

    /// Patches elements inside a typed array's packed payload.
    ///
    /// The header (tag, element type, count) is reused verbatim; untouched
    /// payload ranges are copied as-is.
    fn patch_typed_array(
        &mut self,
        ta: TypedArrayRef<'a>,
        updates: &mut [Update<'_>],
        depth: usize,
        value_start: usize,
    ) -> Result<(), PatchError> {
        let payload = ta.payload();
        let payload_start = self.reader.pos() - payload.len();
        self.copy(value_start, payload_start)?;

        let size = ta.elem().size();
        let mut cursor = 0usize;
        let mut i = 0;
        while i < updates.len() {
            if updates[i].applied {
                i += 1;
                continue;
            }
            let seg = path::segment_at_depth(updates[i].path, depth)
                .ok_or(PatchError::PathTypeMismatch)?;
            let index = match seg.seg {
                Seg::Index(index) => index,
                Seg::Key(_) => return Err(PatchError::PathTypeMismatch),
            };
            if index as usize >= ta.len() {
                return Err(PatchError::IndexOutOfRange);
            }
            let mut j = i + 1;
            while j < updates.len()
                && path::segment_at_depth(updates[j].path, depth).map(|s| s.seg) == Some(seg.seg)
            {
                j += 1;
            }
            let mut last = None;
            for k in i..j {
                let s = path::segment_at_depth(updates[k].path, depth)
                    .ok_or(PatchError::PathTypeMismatch)?;
                // A path into a packed element has nothing to address.
                if !s.is_leaf() {
                    return Err(PatchError::PathTypeMismatch);
                }
                if !updates[k].applied {
                    updates[k].applied = true;
                    last = Some(k);
                }
            }
            let offset = index as usize * size;
            self.sink.write_all(&payload[cursor..offset])?;
            if let Some(k) = last {
                let element = self.scalar_update_bytes(&updates[k], ta.elem())?;
                self.sink.write_all(&element[..size])?;
            }
            cursor = offset + size;
            i = j;
        }
        self.sink.write_all(&payload[cursor..])?;
        Ok(())
    }

    /// Runs an update's write closure into a stack scratch buffer and
    /// reinterprets the emitted scalar as a typed-array element.
    ///
    /// Integer values narrow to any integer element type; float values
    /// must match the element's float kind exactly.
    fn scalar_update_bytes(
        &mut self,
        update: &Update<'_>,
        elem: ElemKind,
    ) -> Result<[u8; 8], PatchError> {
        let mut scratch = [0u8; 16];
        let mut sink = SliceSink::new(&mut scratch);
        {
            let mut writer = Writer::new(&mut sink);
            (update.write)(&mut writer).map_err(|_| PatchError::PathTypeMismatch)?;
        }
        let mut probe = Reader::new(sink.as_slice());
        let value = probe
            .read()
            .map_err(|_| PatchError::PathTypeMismatch)?;
        if probe.remaining() != 0 {
            return Err(PatchError::PathTypeMismatch);
        }
        let mut out = [0u8; 8];
        match elem {
            ElemKind::U8
            | ElemKind::U16
            | ElemKind::U32
            | ElemKind::U64
            | ElemKind::I8
            | ElemKind::I16
            | ElemKind::I32
            | ElemKind::I64 => {
                let word = match value {
                    Value::Uint(u) => u,
                    Value::Int(i) => i as u64,
                    _ => return Err(PatchError::PathTypeMismatch),
                };
                out = word.to_le_bytes();
            }
            ElemKind::F16 => match value {
                Value::F16(h) => out[..2].copy_from_slice(&h.to_bits().to_le_bytes()),
                _ => return Err(PatchError::PathTypeMismatch),
            },
            ElemKind::F32 => match value {
                Value::F32(f) => out[..4].copy_from_slice(&f.to_bits().to_le_bytes()),
                _ => return Err(PatchError::PathTypeMismatch),
            },
            ElemKind::F64 => match value {
                Value::F64(f) => out = f.to_bits().to_le_bytes(),
                _ => return Err(PatchError::PathTypeMismatch),
            },
        }
        Ok(out)
    }
}
