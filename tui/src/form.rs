//! The filter form: which widgets exist, which path each one edits, and how
//! a widget gesture turns into the `(path, value)` pair handed to the store.
//!
//! Widgets never write state themselves. Each gesture method takes the
//! effective filters (draft or committed) and returns the new value for the
//! field, or `None` when the gesture changes nothing.

use serde_json::Value;

use filter_draft_core::config::{ChoiceOption, FormConfig};
use filter_draft_core::draft::{read, FieldPath};
use filter_draft_core::types::criteria::{DateRangePreset, ExcludeRecurring};


#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text { placeholder: String },
    /// Exactly one option is always chosen.
    Radio { options: Vec<ChoiceOption> },
    Select {
        options: Vec<ChoiceOption>,
        multiple: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: String,
    pub path: FieldPath,
    pub kind: FieldKind,
    /// Shown only while the field at this path holds this string.
    pub visible_when: Option<(FieldPath, String)>,
    pub help: Option<String>,
}

impl FormField {
    fn new(label: &str, path: &str, kind: FieldKind) -> Self {
        FormField {
            label: label.to_string(),
            path: FieldPath::parse(path),
            kind,
            visible_when: None,
            help: None,
        }
    }

    pub fn is_visible(&self, filters: &Value) -> bool {
        match &self.visible_when {
            Some((path, expected)) => {
                read(filters, path).and_then(Value::as_str) == Some(expected.as_str())
            }
            None => true,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, FieldKind::Text { .. })
    }

    pub fn is_multi(&self) -> bool {
        matches!(self.kind, FieldKind::Select { multiple: true, .. })
    }

    pub fn options(&self) -> &[ChoiceOption] {
        match &self.kind {
            FieldKind::Text { .. } => &[],
            FieldKind::Radio { options } | FieldKind::Select { options, .. } => options.as_slice(),
        }
    }

    /// The field's value as text, for prefilling an editor.
    pub fn text_value(&self, filters: &Value) -> String {
        match read(filters, &self.path) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Selected option values of a multi-select. Anything that is not a
    /// list of strings counts as no selection.
    pub fn selected(&self, filters: &Value) -> Vec<String> {
        match read(filters, &self.path) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Index of the chosen option of a radio group or single select.
    pub fn chosen_index(&self, filters: &Value) -> Option<usize> {
        let current = read(filters, &self.path).and_then(Value::as_str)?;
        self.options().iter().position(|o| o.value == current)
    }

    /// Human-readable value for the form row.
    pub fn display(&self, filters: &Value) -> String {
        match &self.kind {
            FieldKind::Text { placeholder } => {
                let text = self.text_value(filters);
                if text.is_empty() {
                    format!("<{}>", placeholder)
                } else {
                    text
                }
            }
            FieldKind::Radio { options } => options
                .iter()
                .enumerate()
                .map(|(i, o)| {
                    let mark = if Some(i) == self.chosen_index(filters) { "(*)" } else { "( )" };
                    format!("{} {}", mark, o.label)
                })
                .collect::<Vec<_>>()
                .join("  "),
            FieldKind::Select { multiple: false, .. } => match self.chosen_index(filters) {
                Some(i) => format!("< {} >", self.options()[i].label),
                None => format!("< {} >", self.text_value(filters)),
            },
            FieldKind::Select { multiple: true, options } => {
                let selected = self.selected(filters);
                if selected.is_empty() {
                    return "none".to_string();
                }
                selected
                    .iter()
                    .map(|v| {
                        options
                            .iter()
                            .find(|o| &o.value == v)
                            .map(|o| o.label.clone())
                            .unwrap_or_else(|| v.clone())
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }
    }

    // -------------------------------------------------------------------
    // Gestures
    // -------------------------------------------------------------------

    /// Step a radio group or single select to the next/previous option,
    /// wrapping around. An unknown current value starts from the ends.
    pub fn cycle(&self, filters: &Value, forward: bool) -> Option<Value> {
        let options = match &self.kind {
            FieldKind::Radio { options } | FieldKind::Select { options, multiple: false } => options,
            _ => return None,
        };
        if options.is_empty() {
            return None;
        }
        let next = match (self.chosen_index(filters), forward) {
            (Some(i), true) => (i + 1) % options.len(),
            (Some(i), false) => (i + options.len() - 1) % options.len(),
            (None, true) => 0,
            (None, false) => options.len() - 1,
        };
        Some(Value::String(options[next].value.clone()))
    }

    /// Toggle one option of a multi-select. The result lists known options
    /// in option order, followed by any unknown values already stored.
    pub fn toggle(&self, filters: &Value, option: usize) -> Option<Value> {
        let FieldKind::Select { options, multiple: true } = &self.kind else {
            return None;
        };
        let target = options.get(option)?;
        let mut selected = self.selected(filters);
        if let Some(pos) = selected.iter().position(|v| v == &target.value) {
            selected.remove(pos);
        } else {
            selected.push(target.value.clone());
        }

        let mut ordered: Vec<Value> = options
            .iter()
            .filter(|o| selected.contains(&o.value))
            .map(|o| Value::String(o.value.clone()))
            .collect();
        ordered.extend(
            selected
                .iter()
                .filter(|v| !options.iter().any(|o| &o.value == *v))
                .map(|v| Value::String(v.clone())),
        );
        Some(Value::Array(ordered))
    }
}


/// The ordered set of widgets making up the filter form.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterForm {
    fields: Vec<FormField>,
}

impl FilterForm {
    pub fn from_config(config: &FormConfig) -> Self {
        let presets = DateRangePreset::ALL
            .iter()
            .map(|p| ChoiceOption::new(p.as_str(), p.label()))
            .collect();
        let custom = (
            FieldPath::parse("dateRange.preset"),
            DateRangePreset::Custom.as_str().to_string(),
        );

        let mut start = FormField::new(
            "Start",
            "dateRange.start",
            FieldKind::Text { placeholder: "Select start date".into() },
        );
        start.visible_when = Some(custom.clone());
        let mut end = FormField::new(
            "End",
            "dateRange.end",
            FieldKind::Text { placeholder: "Select end date".into() },
        );
        end.visible_when = Some(custom);

        let mut exclude = FormField::new(
            "Exclude Recurring Regular Income",
            "income.exclude",
            FieldKind::Radio {
                options: vec![
                    ChoiceOption::new(ExcludeRecurring::Yes.as_str(), "Yes"),
                    ChoiceOption::new(ExcludeRecurring::No.as_str(), "No"),
                ],
            },
        );
        exclude.help = Some("Leave out income that arrives on a regular schedule.".into());

        let multi = |options: &[ChoiceOption]| FieldKind::Select {
            options: options.to_vec(),
            multiple: true,
        };

        FilterForm {
            fields: vec![
                FormField::new("Name", "name", FieldKind::Text { placeholder: "Criteria name".into() }),
                FormField::new(
                    "Date Range",
                    "dateRange.preset",
                    FieldKind::Select { options: presets, multiple: false },
                ),
                start,
                end,
                exclude,
                FormField::new("Income Type", "income.types", multi(&config.income_types)),
                FormField::new("Donation Item", "allocation.donationItem", multi(&config.donation_items)),
                FormField::new("Location", "allocation.location", multi(&config.locations)),
            ],
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FormField> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Indices of the fields currently shown.
    pub fn visible(&self, filters: &Value) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_visible(filters))
            .map(|(i, _)| i)
            .collect()
    }

    /// Next shown field after `from` (or before it when `forward` is false),
    /// staying put at either end.
    pub fn step(&self, filters: &Value, from: usize, forward: bool) -> usize {
        let visible = self.visible(filters);
        let next = if forward {
            visible.iter().copied().find(|&i| i > from)
        } else {
            visible.iter().rev().copied().find(|&i| i < from)
        };
        next.unwrap_or(from)
    }

    /// `index` if that field is shown, else the nearest shown field before it.
    pub fn settle(&self, filters: &Value, index: usize) -> usize {
        let visible = self.visible(filters);
        if visible.contains(&index) {
            return index;
        }
        visible
            .iter()
            .rev()
            .copied()
            .find(|&i| i < index)
            .or_else(|| visible.first().copied())
            .unwrap_or(0)
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
