//! Filter draft core: the state model behind the filter form.
//!
//! # Modules
//!
//! - [`draft`]: path accessor, draft store, draft diff
//! - [`types`]: the typed filter criteria record
//! - [`command`]: text commands applied to a store
//! - [`config`]: YAML form configuration
//! - [`error`]: error types

pub mod command;
pub mod config;
pub mod draft;
pub mod error;
pub mod types;

pub use draft::{AppState, FieldPath, FilterStore};
pub use error::{CommandError, ConfigError, PathError};
pub use types::criteria::FilterCriteria;
