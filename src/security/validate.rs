// Form validation — required fields, email shape and length limits.
//
// Errors accumulate in a fixed order so the joined message the user sees
// (and the golden tests) stay stable:
//   name-required, email-required, message-required, email-format,
//   name-length, subject-length, message-length

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Longest accepted name, in characters.
pub const MAX_NAME_CHARS: usize = 100;
/// Longest accepted subject, in characters.
pub const MAX_SUBJECT_CHARS: usize = 200;
/// Longest accepted message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// `local@domain.tld` shape. Deliberately loose; not RFC 5322.
///
/// regex-lite's `\s` is ASCII-only; `is_valid_email` rejects the rest of
/// Unicode whitespace separately.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// The contact form's four fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Outcome of a single `validate_form_data` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Join the errors into one message for display.
    pub fn joined(&self, separator: &str) -> String {
        self.errors.join(separator)
    }
}

/// True if `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    !email.chars().any(is_email_whitespace) && EMAIL_RE.is_match(email)
}

/// Unicode whitespace plus the BOM, which browsers also treat as `\s`.
fn is_email_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Check a submitted record. Pure; never fails.
pub fn validate_form_data(record: &FormRecord) -> ValidationResult {
    let mut errors = Vec::new();

    if record.name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }
    if record.email.trim().is_empty() {
        errors.push("Email is required".to_string());
    }
    if record.message.trim().is_empty() {
        errors.push("Message is required".to_string());
    }

    if !record.email.is_empty() && !is_valid_email(&record.email) {
        errors.push("Please enter a valid email address".to_string());
    }

    // Length limits apply whether or not the field is required.
    if record.name.chars().count() > MAX_NAME_CHARS {
        errors.push(format!(
            "Name must be less than {MAX_NAME_CHARS} characters"
        ));
    }
    if record.subject.chars().count() > MAX_SUBJECT_CHARS {
        errors.push(format!(
            "Subject must be less than {MAX_SUBJECT_CHARS} characters"
        ));
    }
    if record.message.chars().count() > MAX_MESSAGE_CHARS {
        errors.push(format!(
            "Message must be less than {MAX_MESSAGE_CHARS} characters"
        ));
    }

    ValidationResult::from_errors(errors)
}
