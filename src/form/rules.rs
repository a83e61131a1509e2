//! Synchronous field rules and the messages shown next to a field.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMessage {
    Required,
    NameTaken,
}

impl fmt::Display for FieldMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldMessage::Required => write!(f, "Name is required"),
            FieldMessage::NameTaken => write!(f, "Name is already in use"),
        }
    }
}

pub type Rule = fn(&str) -> Option<FieldMessage>;

/// Rejects empty and whitespace-only values.
pub fn required(value: &str) -> Option<FieldMessage> {
    value.trim().is_empty().then_some(FieldMessage::Required)
}

pub const NAME_RULES: &[Rule] = &[required];

pub fn apply(rules: &[Rule], value: &str) -> Vec<FieldMessage> {
    rules.iter().filter_map(|rule| rule(value)).collect()
}
