//! Draft state model: dotted-path addressing over `serde_json::Value`,
//! an isolated draft that accumulates edits, and commit/discard transitions.

pub mod accessor;
pub mod diff;
pub mod path;
pub mod store;

pub use accessor::{read, write};
pub use diff::{DraftDiff, FieldChange};
pub use path::{container_kind_for, ContainerKind, FieldPath, Segment};
pub use store::{AppState, DraftPhase, FilterStore, SubscriptionId};
