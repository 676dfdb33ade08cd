//! Structural read/write of a nested value tree by [`FieldPath`].
//!
//! Knows nothing about the filter schema. `write` materializes missing
//! intermediate containers on demand, choosing a sequence or a record from
//! the shape of the following segment.

use serde_json::Value;

use super::path::{container_kind_for, FieldPath, Segment};
use crate::error::PathError;


/// Read the value at `path`, or `None` when nothing is there.
///
/// The root path returns `root`. The walk stops with `None` as soon as it
/// would step through an absent or `null` node; a `null` leaf is returned
/// as `Some(&Value::Null)`.
pub fn read<'v>(root: &'v Value, path: &FieldPath) -> Option<&'v Value> {
    let mut node = root;
    for seg in path.segments() {
        if node.is_null() {
            return None;
        }
        node = match (node, seg) {
            (Value::Object(map), seg) => map.get(seg.as_key())?,
            (Value::Array(items), Segment::Index { index, .. }) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Assign `value` at `path` inside `root`, returning `root`.
///
/// Mutates in place: callers that need isolation pass a private copy.
/// Absent or `null` intermediate slots become an empty sequence when the
/// next segment is an index and an empty record otherwise; sequence
/// indices past the end pad with `null`.
///
/// Conflicts are only ever found on pre-existing nodes, before the first
/// container is materialized, so a failed write leaves `root` untouched.
pub fn write<'v>(
    root: &'v mut Value,
    path: &FieldPath,
    value: Value,
) -> Result<&'v mut Value, PathError> {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return Err(PathError::EmptyPath);
    };

    {
        let mut node = &mut *root;
        for (depth, seg) in parents.iter().enumerate() {
            let next = &segments[depth + 1];
            let slot = slot_mut(node, seg, path, depth)?;
            if slot.is_null() {
                *slot = container_kind_for(next).empty();
            }
            node = slot;
        }
        *slot_mut(node, last, path, parents.len())? = value;
    }

    Ok(root)
}

/// Whether `path` could be written into `root` without a conflict.
pub fn is_writable(root: &Value, path: &FieldPath) -> bool {
    if path.is_root() {
        return false;
    }
    let mut node = root;
    for seg in path.segments() {
        let child = match (node, seg) {
            (Value::Object(map), seg) => map.get(seg.as_key()),
            (Value::Array(items), Segment::Index { index, .. }) => items.get(*index),
            _ => return false,
        };
        match child {
            // everything below a missing slot is fresh
            None | Some(Value::Null) => return true,
            Some(next) => node = next,
        }
    }
    true
}

/// Slot for `seg` inside `node`, inserting a `null` placeholder when the
/// slot does not exist yet.
fn slot_mut<'v>(
    node: &'v mut Value,
    seg: &Segment,
    path: &FieldPath,
    depth: usize,
) -> Result<&'v mut Value, PathError> {
    match (node, seg) {
        (Value::Object(map), seg) => Ok(map.entry(seg.as_key()).or_insert(Value::Null)),
        (Value::Array(items), Segment::Index { index, .. }) => {
            if items.len() <= *index {
                items.resize(*index + 1, Value::Null);
            }
            Ok(&mut items[*index])
        }
        (other, seg) => Err(PathError::Conflict {
            at: path.prefix(depth).to_dotted(),
            segment: seg.to_string(),
            found: describe(other),
        }),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a record",
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
