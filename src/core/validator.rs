//! Field-level validation of record payloads
//!
//! Each rule is a pure predicate keyed by field name. Only fields present in
//! the payload are checked, so the same validator serves full creates and
//! partial updates. Rules run in a fixed order and the first failure wins.

use crate::types::record::parse_date;
use crate::types::{Faculty, Gender, RecordError, RecordPayload, StudentStatus};
use once_cell::sync::Lazy;
use regex::Regex;

/// Format check for one raw field value; `Err` carries the reason
pub type FieldRule = fn(&str) -> Result<(), String>;

/// Minimum number of digits in a phone number
pub const MIN_PHONE_DIGITS: usize = 10;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9._%+-]+@[a-z0-9-]+(\.[a-z0-9-]+)*\.[a-z]{2,}$")
        .expect("email pattern is valid")
});

static STANDARD: Lazy<RecordValidator> = Lazy::new(RecordValidator::standard);

/// The validator with the standard rule set
pub fn validator() -> &'static RecordValidator {
    &STANDARD
}

/// Ordered mapping from field name to format rule
#[derive(Debug, Clone)]
pub struct RecordValidator {
    rules: Vec<(&'static str, FieldRule)>,
}

impl RecordValidator {
    /// A validator with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn standard() -> Self {
        Self::empty()
            .with_rule("id", check_not_blank)
            .with_rule("full_name", check_not_blank)
            .with_rule("email", check_email)
            .with_rule("phone", check_phone)
            .with_rule("faculty", check_faculty)
            .with_rule("status", check_status)
            .with_rule("gender", check_gender)
            .with_rule("date_of_birth", check_date_of_birth)
            .with_rule("course", check_not_blank)
            .with_rule("program", check_not_blank)
    }

    /// Add a rule, replacing any existing rule for the same field
    pub fn with_rule(mut self, field: &'static str, rule: FieldRule) -> Self {
        match self.rules.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = rule,
            None => self.rules.push((field, rule)),
        }
        self
    }

    /// Names of the fields that have a rule, in check order
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(name, _)| *name)
    }

    /// Check every field present in `payload`
    ///
    /// # Errors
    ///
    /// `Format` naming the first failing field.
    pub fn validate(&self, payload: &RecordPayload) -> Result<(), RecordError> {
        for (field, rule) in &self.rules {
            if let Some(value) = payload.get(field) {
                rule(value).map_err(|reason| RecordError::format(field, reason))?;
            }
        }
        Ok(())
    }
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::standard()
    }
}

fn check_not_blank(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    Ok(())
}

fn check_email(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if !EMAIL_PATTERN.is_match(value) {
        return Err(format!("'{}' is not a valid email address", value));
    }
    Ok(())
}

fn check_phone(value: &str) -> Result<(), String> {
    let value = value.trim();
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("'{}' must contain digits only", value));
    }
    if value.len() < MIN_PHONE_DIGITS {
        return Err(format!(
            "'{}' must have at least {} digits",
            value, MIN_PHONE_DIGITS
        ));
    }
    Ok(())
}

/// Reason from a closed-set parse, without the field prefix
fn reason_of(error: RecordError) -> String {
    match error {
        RecordError::Format { reason, .. } => reason,
        other => other.to_string(),
    }
}

fn check_faculty(value: &str) -> Result<(), String> {
    value.parse::<Faculty>().map(drop).map_err(reason_of)
}

fn check_status(value: &str) -> Result<(), String> {
    value.parse::<StudentStatus>().map(drop).map_err(reason_of)
}

fn check_gender(value: &str) -> Result<(), String> {
    value.parse::<Gender>().map(drop).map_err(reason_of)
}

fn check_date_of_birth(value: &str) -> Result<(), String> {
    parse_date(value).map(drop).map_err(reason_of)
}
