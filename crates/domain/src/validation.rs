//! Validation primitives shared by every entity.
//!
//! These are pure checks over primitive values. They never touch storage and
//! report the offending field through [`DomainError::Validation`].
//!
//! Lengths are measured in bytes of the UTF-8 encoding.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use crate::error::DomainError;
use crate::ids::CharacterId;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 4000;
pub const MAX_ALIAS_COUNT: usize = 10;
pub const MAX_ALIAS_LENGTH: usize = 50;
pub const MAX_VISIBLE_TO_COUNT: usize = 100;
pub const MAX_LOCK_DATA_KEYS: usize = 20;

pub const MIN_CHARACTER_NAME_LENGTH: usize = 2;
pub const MAX_CHARACTER_NAME_LENGTH: usize = 32;

/// Decodes raw bytes for `field`, rejecting invalid UTF-8.
///
/// `&str` inputs are already guaranteed UTF-8; this is the boundary check for
/// text arriving as bytes.
pub fn require_utf8<'a>(field: &str, bytes: &'a [u8]) -> Result<&'a str, DomainError> {
    std::str::from_utf8(bytes).map_err(|_| DomainError::validation(field, "must be valid UTF-8"))
}

pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::validation("name", "cannot be empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(DomainError::validation(
            "name",
            format!("exceeds maximum length of {}", MAX_NAME_LENGTH),
        ));
    }
    if has_control_chars(name) {
        return Err(DomainError::validation(
            "name",
            "cannot contain control characters",
        ));
    }
    Ok(())
}

/// Descriptions may be empty and may contain newline, carriage return and tab.
pub fn validate_description(description: &str) -> Result<(), DomainError> {
    if description.is_empty() {
        return Ok(());
    }
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(DomainError::validation(
            "description",
            format!("exceeds maximum length of {}", MAX_DESCRIPTION_LENGTH),
        ));
    }
    if description
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        return Err(DomainError::validation(
            "description",
            "cannot contain control characters (except newline/tab)",
        ));
    }
    Ok(())
}

pub fn validate_aliases(aliases: &[String]) -> Result<(), DomainError> {
    if aliases.len() > MAX_ALIAS_COUNT {
        return Err(DomainError::validation(
            "aliases",
            format!("exceeds maximum count of {}", MAX_ALIAS_COUNT),
        ));
    }
    for (i, alias) in aliases.iter().enumerate() {
        if alias.is_empty() {
            return Err(DomainError::validation(
                "aliases",
                format!("alias {} cannot be empty", i),
            ));
        }
        if alias.len() > MAX_ALIAS_LENGTH {
            return Err(DomainError::validation(
                "aliases",
                format!("alias {} exceeds maximum length of {}", i, MAX_ALIAS_LENGTH),
            ));
        }
        if has_control_chars(alias) {
            return Err(DomainError::validation(
                "aliases",
                format!("alias {} cannot contain control characters", i),
            ));
        }
    }
    Ok(())
}

pub fn validate_visible_to(visible_to: &[CharacterId]) -> Result<(), DomainError> {
    validate_id_list("visible_to", visible_to)
}

/// Bounded, duplicate-free ID list check used by exits and properties.
pub(crate) fn validate_id_list(field: &str, ids: &[CharacterId]) -> Result<(), DomainError> {
    if ids.len() > MAX_VISIBLE_TO_COUNT {
        return Err(DomainError::validation(
            field,
            format!("exceeds maximum count of {}", MAX_VISIBLE_TO_COUNT),
        ));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            return Err(DomainError::validation(field, format!("duplicate ID: {}", id)));
        }
    }
    Ok(())
}

pub fn validate_lock_data(lock_data: &BTreeMap<String, Value>) -> Result<(), DomainError> {
    if lock_data.len() > MAX_LOCK_DATA_KEYS {
        return Err(DomainError::validation(
            "lock_data",
            format!("exceeds maximum key count of {}", MAX_LOCK_DATA_KEYS),
        ));
    }
    for key in lock_data.keys() {
        if key.is_empty() {
            return Err(DomainError::validation("lock_data", "key cannot be empty"));
        }
        if !is_identifier(key) {
            return Err(DomainError::validation(
                "lock_data",
                format!("key {:?} is not a valid identifier", key),
            ));
        }
    }
    Ok(())
}

/// Character names: letters separated by single spaces, 2 to 32 bytes.
pub fn validate_character_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::validation("name", "cannot be empty"));
    }
    if name != name.trim() {
        return Err(DomainError::validation(
            "name",
            "cannot have leading or trailing spaces",
        ));
    }
    if name.contains("  ") {
        return Err(DomainError::validation("name", "cannot have consecutive spaces"));
    }
    if name.len() < MIN_CHARACTER_NAME_LENGTH {
        return Err(DomainError::validation(
            "name",
            format!("must be at least {} characters", MIN_CHARACTER_NAME_LENGTH),
        ));
    }
    if name.len() > MAX_CHARACTER_NAME_LENGTH {
        return Err(DomainError::validation(
            "name",
            format!("must be at most {} characters", MAX_CHARACTER_NAME_LENGTH),
        ));
    }
    if !name
        .split(' ')
        .all(|word| !word.is_empty() && word.chars().all(char::is_alphabetic))
    {
        return Err(DomainError::validation(
            "name",
            "must contain letters and spaces only",
        ));
    }
    Ok(())
}

/// Title-cases each whitespace-separated word and joins with single spaces.
pub fn normalize_character_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_control_chars(s: &str) -> bool {
    s.chars().any(char::is_control)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
