//! Draft diff computation: compare the committed filters with a draft and
//! list the fields that would change on commit.
//!
//! Records are compared key by key; any other pair of values (sequences,
//! primitives, a record replaced by something else) is compared as a single
//! leaf. A multi-select list therefore shows up as one change.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// FieldChange
// ---------------------------------------------------------------------------

/// A change to a single field. `None` means the field is absent on that side.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldChange {
    pub path: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

impl FieldChange {
    pub fn is_addition(&self) -> bool {
        self.old.is_none()
    }

    pub fn is_removal(&self) -> bool {
        self.new.is_none()
    }
}

// ---------------------------------------------------------------------------
// DraftDiff
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct DraftDiff {
    /// Sorted by path.
    pub changes: Vec<FieldChange>,
}

impl DraftDiff {
    /// Compute the field changes turning `old` into `new`.
    pub fn compute(old: &Value, new: &Value) -> Self {
        let mut changes = Vec::new();
        diff_values("", Some(old), Some(new), &mut changes);
        changes.sort_by(|a, b| a.path.cmp(&b.path));
        DraftDiff { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    /// Whether the field at `path` changed.
    pub fn touches(&self, path: &str) -> bool {
        self.changes.iter().any(|c| c.path == path)
    }

    /// Produce a human-readable summary of the diff.
    pub fn summary(&self) -> String {
        if self.changes.is_empty() {
            return "no changes".to_string();
        }
        let added = self.changes.iter().filter(|c| c.is_addition()).count();
        let removed = self.changes.iter().filter(|c| c.is_removal()).count();
        let changed = self.changes.len() - added - removed;

        let mut parts = Vec::new();
        if changed > 0 {
            parts.push(format!("{} field(s) changed", changed));
        }
        if added > 0 {
            parts.push(format!("{} field(s) added", added));
        }
        if removed > 0 {
            parts.push(format!("{} field(s) removed", removed));
        }
        parts.join(", ")
    }
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

fn diff_values(
    path: &str,
    old: Option<&Value>,
    new: Option<&Value>,
    out: &mut Vec<FieldChange>,
) {
    match (old, new) {
        (Some(Value::Object(a)), Some(Value::Object(b))) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                diff_values(&child, a.get(key), b.get(key), out);
            }
        }
        (a, b) if a == b => {}
        (a, b) => out.push(FieldChange {
            path: path.to_string(),
            old: a.cloned(),
            new: b.cloned(),
        }),
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
