//! Character variety criteria - lowercase, uppercase, digits, special chars.
//!
//! Letter and digit classes are ASCII-only; anything else counts as special.

use secrecy::{ExposeSecret, SecretString};
use super::CriterionResult;

fn contains(password: &SecretString, pred: impl Fn(char) -> bool) -> bool {
    password.expose_secret().chars().any(pred)
}

pub fn lowercase_criterion(password: &SecretString) -> CriterionResult {
    if contains(password, |c| c.is_ascii_lowercase()) {
        return None;
    }
    Some("Lowercase letter")
}

pub fn uppercase_criterion(password: &SecretString) -> CriterionResult {
    if contains(password, |c| c.is_ascii_uppercase()) {
        return None;
    }
    Some("Uppercase letter")
}

pub fn digit_criterion(password: &SecretString) -> CriterionResult {
    if contains(password, |c| c.is_ascii_digit()) {
        return None;
    }
    Some("Number")
}

/// Anything that is not an ASCII letter or digit, including spaces and
/// non-ASCII letters.
pub fn special_criterion(password: &SecretString) -> CriterionResult {
    if contains(password, |c| !c.is_ascii_alphanumeric()) {
        return None;
    }
    Some("Special character")
}
