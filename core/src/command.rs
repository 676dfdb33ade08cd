//! Text commands against a [`FilterStore`].
//!
//! ```text
//! set name Gifts
//! set income.types ["1","2"]
//! save
//! clear
//! ```
//!
//! `set` takes the rest of the line as its value: JSON when it parses as
//! JSON, otherwise the raw text as a string.

use serde_json::Value;

use crate::draft::{FieldPath, FilterStore};
use crate::error::{CommandError, PathError};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCommand {
    Update { path: FieldPath, value: Value },
    Save,
    Clear,
}

impl FilterCommand {
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let text = text.trim();
        let (verb, rest) = match text.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim_start()),
            None => (text, ""),
        };

        match verb {
            "" => Err(CommandError::Empty),
            "set" => parse_set(rest),
            "save" | "commit" => Ok(FilterCommand::Save),
            "clear" | "discard" => Ok(FilterCommand::Clear),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    pub fn apply(&self, store: &mut FilterStore) -> Result<(), PathError> {
        match self {
            FilterCommand::Update { path, value } => store.update_filter_at(path, value.clone()),
            FilterCommand::Save => {
                store.save_filters();
                Ok(())
            }
            FilterCommand::Clear => {
                store.clear_draft();
                Ok(())
            }
        }
    }
}

/// `set <path> <value>`
fn parse_set(rest: &str) -> Result<FilterCommand, CommandError> {
    const USAGE: &str = "set <path> <value>";
    let (path, value) = match rest.split_once(char::is_whitespace) {
        Some((path, value)) => (path, value.trim()),
        None => (rest, ""),
    };
    if path.is_empty() {
        return Err(CommandError::Usage(USAGE));
    }
    Ok(FilterCommand::Update {
        path: FieldPath::parse(path),
        value: parse_value(value),
    })
}

/// JSON if it parses, else the text itself as a string.
pub fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
