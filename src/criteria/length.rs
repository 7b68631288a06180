//! Length criterion - checks password minimum length.

use secrecy::{ExposeSecret, SecretString};
use super::CriterionResult;

pub const MIN_LENGTH: usize = 8;

/// Checks if the password has at least [`MIN_LENGTH`] characters.
///
/// Length is counted in characters, not bytes.
pub fn length_criterion(password: &SecretString) -> CriterionResult {
    if password.expose_secret().chars().count() < MIN_LENGTH {
        return Some("At least 8 characters");
    }
    None
}
