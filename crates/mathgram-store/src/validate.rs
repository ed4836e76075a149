use std::sync::LazyLock;

use regex::Regex;

use crate::error::WeakPassword;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Checks password strength: a minimum length, at least one letter and at least one digit.
pub fn validate_password(password: &str) -> Result<(), WeakPassword> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WeakPassword::TooShort);
    }
    if !password.bytes().any(|b| b.is_ascii_alphabetic()) {
        return Err(WeakPassword::NoLetter);
    }
    if !password.bytes().any(|b| b.is_ascii_digit()) {
        return Err(WeakPassword::NoDigit);
    }
    Ok(())
}
