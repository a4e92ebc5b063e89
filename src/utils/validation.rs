// Input validation utilities
//
// Contact form rules. Every field is checked on each pass so the form can show
// all problems at once; the result is rebuilt from scratch every time.

use crate::models::fields::{ContactField, FieldValues};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

pub const NAME_MIN_CHARS: usize = 2;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const PHONE_MIN_DIGITS: usize = 10;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
// Digits, spaces, hyphens and parentheses, with an optional leading plus.
const PHONE_PATTERN: &str = r"^\+?[0-9\s()\-]+$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Required,
    TooShort,
    InvalidFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: ContactField,
    pub kind: ErrorKind,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        use ContactField::*;
        use ErrorKind::*;
        match (self.field, self.kind) {
            (Name, Required) => "Name is required",
            (Name, _) => "Name must be at least 2 characters",
            (Email, Required) => "Email is required",
            (Email, _) => "Please enter a valid email address",
            (Phone, Required) => "Phone number is required",
            (Phone, _) => "Please enter a valid phone number",
            (Message, Required) => "Message is required",
            (Message, _) => "Message must be at least 10 characters",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Failed fields of one validation pass. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<ContactField, FieldError>,
}

impl ValidationErrors {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: ContactField) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn message(&self, field: ContactField) -> Option<&'static str> {
        self.errors.get(&field).map(FieldError::message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.values()
    }

    fn record(&mut self, field: ContactField, kind: Option<ErrorKind>) {
        if let Some(kind) = kind {
            self.errors.insert(field, FieldError { field, kind });
        }
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern is a valid regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Allowed characters only, and at least ten digits once everything else is stripped.
pub fn is_valid_phone(phone: &str) -> bool {
    phone_regex().is_match(phone)
        && phone.chars().filter(|c| c.is_ascii_digit()).count() >= PHONE_MIN_DIGITS
}

/// Length in UTF-16 code units, the unit browsers count in, so an emoji counts as two.
fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

pub fn validate_name(name: &str) -> Option<ErrorKind> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Some(ErrorKind::Required)
    } else if utf16_len(trimmed) < NAME_MIN_CHARS {
        Some(ErrorKind::TooShort)
    } else {
        None
    }
}

pub fn validate_email(email: &str) -> Option<ErrorKind> {
    if email.trim().is_empty() {
        Some(ErrorKind::Required)
    } else if !is_valid_email(email) {
        Some(ErrorKind::InvalidFormat)
    } else {
        None
    }
}

pub fn validate_phone(phone: &str) -> Option<ErrorKind> {
    if phone.trim().is_empty() {
        Some(ErrorKind::Required)
    } else if !is_valid_phone(phone) {
        Some(ErrorKind::InvalidFormat)
    } else {
        None
    }
}

pub fn validate_message(message: &str) -> Option<ErrorKind> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        Some(ErrorKind::Required)
    } else if utf16_len(trimmed) < MESSAGE_MIN_CHARS {
        Some(ErrorKind::TooShort)
    } else {
        None
    }
}

/// Run every contact rule against the current values.
pub fn validate_contact(values: &FieldValues<ContactField>) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    errors.record(ContactField::Name, validate_name(values.get(ContactField::Name)));
    errors.record(ContactField::Email, validate_email(values.get(ContactField::Email)));
    errors.record(ContactField::Phone, validate_phone(values.get(ContactField::Phone)));
    errors.record(
        ContactField::Message,
        validate_message(values.get(ContactField::Message)),
    );
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, email: &str, phone: &str, message: &str) -> FieldValues<ContactField> {
        let mut v = FieldValues::new();
        v.set(ContactField::Name, name);
        v.set(ContactField::Email, email);
        v.set(ContactField::Phone, phone);
        v.set(ContactField::Message, message);
        v
    }

    #[test]
    fn empty_form_reports_every_field_as_required() {
        let errors = validate_contact(&contact("", "", "", ""));
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Required));
        assert_eq!(errors.message(ContactField::Name), Some("Name is required"));
        assert_eq!(errors.message(ContactField::Email), Some("Email is required"));
        assert_eq!(
            errors.message(ContactField::Phone),
            Some("Phone number is required")
        );
        assert_eq!(errors.message(ContactField::Message), Some("Message is required"));
    }

    #[test]
    fn well_formed_contact_is_valid() {
        let errors = validate_contact(&contact("Jo", "a@b.co", "+1 555-123-4567", "Hello there!"));
        assert!(errors.is_valid(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let errors = validate_contact(&contact("   ", " ", "\t", "  \n "));
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Required));
    }

    #[test]
    fn name_needs_two_characters_after_trimming() {
        assert_eq!(validate_name(" J "), Some(ErrorKind::TooShort));
        assert_eq!(validate_name("Jo"), None);
    }

    #[test]
    fn lengths_count_utf16_units() {
        assert_eq!(validate_name("\u{1F600}"), None);
        assert_eq!(validate_name(" \u{e9} "), Some(ErrorKind::TooShort));
        assert_eq!(validate_name("Ch\u{e9}"), None);
        // Five emoji are ten units.
        assert_eq!(validate_message(&"\u{2600}\u{FE0F}".repeat(5)), None);
        assert_eq!(validate_message(&"\u{1F31E}".repeat(4)), Some(ErrorKind::TooShort));
        assert_eq!(validate_message(&"\u{1F31E}".repeat(5)), None);
    }

    #[test]
    fn email_shape() {
        assert_eq!(validate_email("bad-email"), Some(ErrorKind::InvalidFormat));
        assert_eq!(validate_email("a@b"), Some(ErrorKind::InvalidFormat));
        assert_eq!(validate_email("a b@c.de"), Some(ErrorKind::InvalidFormat));
        assert_eq!(validate_email("a@@b.co"), Some(ErrorKind::InvalidFormat));
        assert_eq!(validate_email("info@motopvmw.com"), None);
        assert_eq!(validate_email("first.last@sub.example.org"), None);
    }

    #[test]
    fn phone_shape() {
        assert_eq!(validate_phone("123"), Some(ErrorKind::InvalidFormat));
        assert_eq!(validate_phone("555-123-456x"), Some(ErrorKind::InvalidFormat));
        assert_eq!(validate_phone("555+123-4567-89"), Some(ErrorKind::InvalidFormat));
        assert_eq!(validate_phone("+(265) 994 108 077"), None);
        assert_eq!(validate_phone("0994108077"), None);
        assert_eq!(validate_phone("099-410-807"), Some(ErrorKind::InvalidFormat));
    }

    #[test]
    fn message_length_boundary() {
        assert_eq!(validate_message("123456789"), Some(ErrorKind::TooShort));
        assert_eq!(validate_message("1234567890"), None);
        assert_eq!(validate_message("  123456789  "), Some(ErrorKind::TooShort));
    }

    #[test]
    fn errors_are_recomputed_not_patched() {
        let mut values = contact("", "", "", "");
        assert_eq!(validate_contact(&values).len(), 4);

        values.set(ContactField::Name, "Jo");
        values.set(ContactField::Email, "a@b.co");
        let errors = validate_contact(&values);
        assert_eq!(errors.len(), 2);
        assert!(errors.get(ContactField::Name).is_none());
        assert!(errors.get(ContactField::Phone).is_some());
    }
}
