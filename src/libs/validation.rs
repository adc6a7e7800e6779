//! Form validation results and field patterns.
//!
//! Validators accumulate one [`Message`] per violated rule instead of
//! stopping at the first, so a form can show every problem at once.

use crate::libs::error::{WorkshopError, WorkshopResult};
use crate::libs::messages::Message;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static TIME_PATTERN: OnceLock<Regex> = OnceLock::new();
static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Outcome of validating one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    /// Violated rules, in the order they were checked.
    pub errors: Vec<Message>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Records `message` unless `ok` holds.
    pub fn check(&mut self, ok: bool, message: Message) {
        if !ok {
            self.errors.push(message);
        }
    }

    pub fn push(&mut self, message: Message) {
        self.errors.push(message);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, message: &Message) -> bool {
        self.errors.contains(message)
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Converts a failed result into [`WorkshopError::Validation`].
    pub fn into_result(self) -> WorkshopResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(WorkshopError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// 24-hour `HH:MM`; a single-digit hour such as `9:05` is accepted.
pub fn is_valid_time(value: &str) -> bool {
    TIME_PATTERN
        .get_or_init(|| Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern compiles"))
        .is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN
        .get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$")
                .expect("email pattern compiles")
        })
        .is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_format() {
        assert!(is_valid_time("14:30"));
        assert!(is_valid_time("00:00"));
        assert!(is_valid_time("9:05"));
        assert!(is_valid_time("23:59"));
        assert!(!is_valid_time("24:00"));
        assert!(!is_valid_time("12:60"));
        assert!(!is_valid_time("1230"));
        assert!(!is_valid_time(""));
        assert!(!is_valid_time(" 12:30"));
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("siti.rahma+lab@smk1.sch.id"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
    }

    #[test]
    fn accumulates_in_order() {
        let mut result = ValidationResult::new();
        result.check(true, Message::StudentNameEmpty);
        result.check(false, Message::StudentIdEmpty);
        result.check(false, Message::StudentClassEmpty);

        assert!(!result.is_valid());
        assert_eq!(result.errors, vec![Message::StudentIdEmpty, Message::StudentClassEmpty]);
        assert!(matches!(result.into_result(), Err(WorkshopError::Validation(_))));
    }
}
