// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use regex::Regex;
use std::sync::LazyLock;

pub const PHONE_DIGITS: usize = 10;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+\d{1,3}[- ]?)?\(?\d{3}\)?[- ]?\d{3}[- ]?\d{4}$").expect("phone regex")
});

/// Email is optional: the empty string passes.
pub fn is_valid_email(email: &str) -> bool {
    email.is_empty() || EMAIL_PATTERN.is_match(email)
}

/// Exactly ten digits once formatting is stripped, written in an accepted
/// display shape (`5551234567`, `555-123-4567`, `(555) 123-4567`, ...).
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    digits == PHONE_DIGITS && PHONE_PATTERN.is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, is_valid_phone};

    #[test]
    fn phone_accepts_plain_and_separated_forms() {
        assert!(is_valid_phone("5551234567"));
        assert!(is_valid_phone("555-123-4567"));
        assert!(is_valid_phone("555 123 4567"));
        assert!(is_valid_phone("(555) 123-4567"));
        assert!(is_valid_phone("(555)123-4567"));
    }

    #[test]
    fn phone_rejects_short_blank_and_malformed() {
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("555.123.4567"));
        assert!(!is_valid_phone("555-123-45678"));
        assert!(!is_valid_phone("abc-def-ghij"));
    }

    #[test]
    fn phone_country_code_counts_toward_digit_total() {
        // The prefix shape is allowed but its digits push the count past ten.
        assert!(!is_valid_phone("+1 555-123-4567"));
    }

    #[test]
    fn email_is_optional_but_shaped_when_present() {
        assert!(is_valid_email(""));
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a@@b.co"));
    }
}
