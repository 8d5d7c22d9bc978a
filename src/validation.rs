//! Contact schema validation.
//!
//! Turns a [`RawRow`] into a [`ContactRecord`] or a [`ValidationFailure`]
//! listing every field that broke a rule.

use crate::models::{ContactRecord, RawRow, SubscriptionStatus};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Local part, `@`, then dot-separated domain labels ending in a TLD
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    )
    .expect("email pattern is valid")
});

/// Contact fields that carry validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Email,
    FirstName,
    LastName,
    IsSubscribed,
}

impl ContactField {
    pub fn name(&self) -> &'static str {
        match self {
            ContactField::Email => "email",
            ContactField::FirstName => "firstName",
            ContactField::LastName => "lastName",
            ContactField::IsSubscribed => "isSubscribed",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rule a field broke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Missing,
    InvalidEmail { value: String },
    NotAllowed {
        value: String,
        allowed: &'static [&'static str],
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Missing => f.write_str("is required"),
            Violation::InvalidEmail { value } => {
                write!(f, "must be a valid email address (got {:?})", value)
            }
            Violation::NotAllowed { value, allowed } => {
                write!(f, "must be one of {:?} (got {:?})", allowed, value)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: ContactField,
    pub violation: Violation,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {}", self.field, self.violation)
    }
}

/// Every rule a row broke, in column order. Never empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_violations(.violations))]
pub struct ValidationFailure {
    pub violations: Vec<FieldViolation>,
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationFailure {
    /// Whether the failure mentions `field`
    pub fn involves(&self, field: ContactField) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    pub fn fields(&self) -> Vec<ContactField> {
        self.violations.iter().map(|v| v.field).collect()
    }
}

/// Check a row against the contact schema.
///
/// `unsubscribedDate` is free text and only optional; an empty value is
/// treated as absent.
pub fn validate(row: &RawRow) -> Result<ContactRecord, ValidationFailure> {
    let mut violations = Vec::new();

    let email = match present(&row.email) {
        Some(value) if EMAIL_REGEX.is_match(value) => Some(value),
        Some(value) => {
            violations.push(FieldViolation {
                field: ContactField::Email,
                violation: Violation::InvalidEmail {
                    value: value.to_string(),
                },
            });
            None
        }
        None => {
            violations.push(missing(ContactField::Email));
            None
        }
    };

    let first_name = required(&row.first_name, ContactField::FirstName, &mut violations);
    let last_name = required(&row.last_name, ContactField::LastName, &mut violations);

    let is_subscribed = match present(&row.is_subscribed) {
        Some(value) => match SubscriptionStatus::parse(value) {
            Some(status) => Some(status),
            None => {
                violations.push(FieldViolation {
                    field: ContactField::IsSubscribed,
                    violation: Violation::NotAllowed {
                        value: value.to_string(),
                        allowed: &SubscriptionStatus::ALLOWED,
                    },
                });
                None
            }
        },
        None => {
            violations.push(missing(ContactField::IsSubscribed));
            None
        }
    };

    match (email, first_name, last_name, is_subscribed) {
        (Some(email), Some(first_name), Some(last_name), Some(is_subscribed))
            if violations.is_empty() =>
        {
            Ok(ContactRecord::new(
                email.to_string(),
                first_name.to_string(),
                last_name.to_string(),
                is_subscribed,
                present(&row.unsubscribed_date).map(str::to_string),
            ))
        }
        _ => Err(ValidationFailure { violations }),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn missing(field: ContactField) -> FieldViolation {
    FieldViolation {
        field,
        violation: Violation::Missing,
    }
}

fn required<'a>(
    value: &'a Option<String>,
    field: ContactField,
    violations: &mut Vec<FieldViolation>,
) -> Option<&'a str> {
    let value = present(value);
    if value.is_none() {
        violations.push(missing(field));
    }
    value
}
