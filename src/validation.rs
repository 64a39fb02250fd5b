//! Input validation for grouping and scheduling.
//!
//! Checks structural integrity of work items and affinity groups before
//! they reach the engines. Detects:
//! - Duplicate or empty item IDs
//! - Negative or non-finite effort values
//! - Group members that reference unknown items
//! - Duplicate group keys
//!
//! All issues are collected rather than stopping at the first one.

use crate::models::{AffinityGroup, WorkItem};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two items share the same ID.
    DuplicateId,
    /// An item has a blank ID.
    EmptyId,
    /// Effort is negative, NaN or infinite.
    InvalidEffort,
    /// A group member does not match any item.
    UnknownMember,
    /// Two groups share the same key.
    DuplicateKey,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a work item snapshot.
///
/// Checks:
/// 1. No blank IDs
/// 2. No duplicate IDs
/// 3. Every effort is finite and non-negative
pub fn validate_items(items: &[WorkItem]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for item in items {
        if item.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Item with blank ID",
            ));
        } else if !ids.insert(item.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate item ID: {}", item.id),
            ));
        }

        if !item.has_valid_effort() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidEffort,
                format!("Item '{}' has invalid effort {}", item.id, item.effort),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates groups against the item snapshot they refer to.
///
/// Checks:
/// 1. No duplicate group keys
/// 2. Every member ID names an item in `items`
pub fn validate_groups(groups: &[AffinityGroup], items: &[WorkItem]) -> ValidationResult {
    let mut errors = Vec::new();
    let item_ids: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
    let mut keys = HashSet::new();

    for group in groups {
        if !keys.insert(group.key.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateKey,
                format!("Duplicate group key: {}", group.key),
            ));
        }
        for member in &group.members {
            if !item_ids.contains(member.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownMember,
                    format!("Group '{}' references unknown item '{}'", group.key, member),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
