//! Dotted field paths.
//!
//! Parses paths like `income.types`, `allocation.location.0` or
//! `dateRange.start` into tagged segments. A segment made only of ASCII
//! digits can address a sequence index; anything else is a record key.
//! Record lookups always use the segment text as written.

use std::fmt;

use serde_json::{Map, Value};


/// A single segment within a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Record key, e.g. `income`
    Key(String),
    /// Digit segment, e.g. `0` or `007`. `index` is the position inside a
    /// sequence; `text` is the field name inside a record.
    Index { index: usize, text: String },
}

impl Segment {
    /// Classify one segment of path text.
    ///
    /// Only a non-empty run of ASCII digits that fits in `usize` is an
    /// index. `-1`, `+1`, `1.5` and the empty string are keys.
    pub fn parse(text: &str) -> Segment {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = text.parse::<usize>() {
                return Segment::Index {
                    index,
                    text: text.to_string(),
                };
            }
        }
        Segment::Key(text.to_string())
    }

    /// An index segment written in plain decimal.
    pub fn index(index: usize) -> Segment {
        Segment::Index {
            index,
            text: index.to_string(),
        }
    }

    /// The text used when this segment looks up a record field.
    pub fn as_key(&self) -> &str {
        match self {
            Segment::Key(k) => k,
            Segment::Index { text, .. } => text,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl From<&str> for Segment {
    fn from(text: &str) -> Self {
        Segment::parse(text)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::index(index)
    }
}


/// Which empty container a missing intermediate slot is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Sequence,
    Record,
}

impl ContainerKind {
    /// A fresh, empty container of this kind.
    pub fn empty(self) -> Value {
        match self {
            ContainerKind::Sequence => Value::Array(Vec::new()),
            ContainerKind::Record => Value::Object(Map::new()),
        }
    }
}

/// Container policy for a slot that is about to be descended into: an index
/// as the *next* segment needs a sequence, a key needs a record.
pub fn container_kind_for(next: &Segment) -> ContainerKind {
    match next {
        Segment::Index { .. } => ContainerKind::Sequence,
        Segment::Key(_) => ContainerKind::Record,
    }
}


/// A parsed dotted path. The empty path addresses the root itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parse a dotted string. Never fails.
    ///
    /// `""` is the root path. Otherwise one leading `.` is ignored and the
    /// rest is split on `.`, so `"a..b"` has an empty key in the middle.
    pub fn parse(input: &str) -> Self {
        if input.is_empty() {
            return FieldPath::root();
        }
        let body = input.strip_prefix('.').unwrap_or(input);
        FieldPath {
            segments: body.split('.').map(Segment::parse).collect(),
        }
    }

    pub fn root() -> Self {
        FieldPath { segments: Vec::new() }
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        FieldPath { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        FieldPath { segments }
    }

    /// The first `len` segments as a path.
    pub fn prefix(&self, len: usize) -> Self {
        FieldPath {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }

    /// Format back to a dotted string.
    pub fn to_dotted(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

impl From<&str> for FieldPath {
    fn from(input: &str) -> Self {
        FieldPath::parse(input)
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
