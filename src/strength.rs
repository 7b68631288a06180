//! Password strength scorer - main scoring logic.

use std::fmt;

use secrecy::SecretString;
use serde::Serialize;

use crate::criteria::{
    digit_criterion, length_criterion, lowercase_criterion, special_criterion,
    uppercase_criterion, CriterionResult,
};

/// Qualitative strength level, rendered as its CSS class name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLevel {
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLevel {
    /// Maps a criteria count to a level.
    pub fn from_score(score: u8) -> Self {
        match score {
            0 | 1 => StrengthLevel::Weak,
            2 => StrengthLevel::Fair,
            3 => StrengthLevel::Good,
            _ => StrengthLevel::Strong,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthLevel::Weak => "weak",
            StrengthLevel::Fair => "fair",
            StrengthLevel::Good => "good",
            StrengthLevel::Strong => "strong",
        }
    }
}

impl fmt::Display for StrengthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`check_password_strength`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrengthResult {
    /// Number of satisfied criteria, 0 to 5.
    pub score: u8,
    pub level: StrengthLevel,
    /// Unmet criteria, in evaluation order.
    pub feedback: Vec<&'static str>,
}

impl StrengthResult {
    pub fn is_strong(&self) -> bool {
        self.level == StrengthLevel::Strong
    }
}

/// Scores a password against five independent criteria.
///
/// Criteria run in a fixed order (length, lowercase, uppercase, digit,
/// special) and every unmet one contributes its hint to `feedback`.
///
/// # Example
///
/// ```rust
/// use chamalink_ui::{check_password_strength, StrengthLevel};
/// use secrecy::SecretString;
///
/// let password = SecretString::new("MyP@ssw0rd!".to_string().into());
/// let result = check_password_strength(&password);
/// assert_eq!(result.score, 5);
/// assert_eq!(result.level, StrengthLevel::Strong);
/// ```
pub fn check_password_strength(password: &SecretString) -> StrengthResult {
    let criteria: [fn(&SecretString) -> CriterionResult; 5] = [
        length_criterion,
        lowercase_criterion,
        uppercase_criterion,
        digit_criterion,
        special_criterion,
    ];

    let mut score = 0u8;
    let mut feedback = Vec::new();
    for criterion in criteria {
        match criterion(password) {
            Some(hint) => feedback.push(hint),
            None => score += 1,
        }
    }

    StrengthResult {
        score,
        level: StrengthLevel::from_score(score),
        feedback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string().into())
    }

    #[test]
    fn test_empty_password_is_weak_with_all_feedback() {
        let result = check_password_strength(&secret(""));
        assert_eq!(result.score, 0);
        assert_eq!(result.level, StrengthLevel::Weak);
        assert_eq!(
            result.feedback,
            vec![
                "At least 8 characters",
                "Lowercase letter",
                "Uppercase letter",
                "Number",
                "Special character",
            ]
        );
    }

    #[test]
    fn test_full_password_is_strong() {
        let result = check_password_strength(&secret("MyPass123!"));
        assert_eq!(result.score, 5);
        assert_eq!(result.level, StrengthLevel::Strong);
        assert!(result.feedback.is_empty());
        assert!(result.is_strong());
    }

    #[test]
    fn test_partial_passwords() {
        let result = check_password_strength(&secret("abc"));
        assert_eq!(result.score, 1);
        assert_eq!(result.level, StrengthLevel::Weak);

        let result = check_password_strength(&secret("abcdefgh"));
        assert_eq!(result.score, 2);
        assert_eq!(result.level, StrengthLevel::Fair);
        assert_eq!(
            result.feedback,
            vec!["Uppercase letter", "Number", "Special character"]
        );

        let result = check_password_strength(&secret("abcdefgH"));
        assert_eq!(result.level, StrengthLevel::Good);

        let result = check_password_strength(&secret("abcdefH1"));
        assert_eq!(result.score, 4);
        assert_eq!(result.level, StrengthLevel::Strong);
        assert_eq!(result.feedback, vec!["Special character"]);
    }

    #[test]
    fn test_level_table() {
        let levels: Vec<_> = (0..=5).map(StrengthLevel::from_score).collect();
        assert_eq!(
            levels,
            vec![
                StrengthLevel::Weak,
                StrengthLevel::Weak,
                StrengthLevel::Fair,
                StrengthLevel::Good,
                StrengthLevel::Strong,
                StrengthLevel::Strong,
            ]
        );
        assert_eq!(StrengthLevel::Fair.to_string(), "fair");
    }

    #[test]
    fn test_serializes_for_host() {
        let result = check_password_strength(&secret("abcdefgh"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["score"], 2);
        assert_eq!(json["level"], "fair");
        assert_eq!(json["feedback"][0], "Uppercase letter");
    }

    proptest! {
        #[test]
        fn prop_score_plus_feedback_is_five(pwd in ".{0,24}") {
            let result = check_password_strength(&secret(&pwd));
            prop_assert_eq!(result.score as usize + result.feedback.len(), 5);
            prop_assert_eq!(result.level, StrengthLevel::from_score(result.score));
        }

        #[test]
        fn prop_complete_passwords_are_strong(
            lower in "[a-z]{1,4}",
            upper in "[A-Z]{1,4}",
            digits in "[0-9]{1,4}",
            special in "[!@#$%^&*]{1,4}",
            pad in "[a-zA-Z0-9]{4}",
        ) {
            let pwd = format!("{lower}{upper}{digits}{special}{pad}");
            let result = check_password_strength(&secret(&pwd));
            prop_assert_eq!(result.score, 5);
            prop_assert_eq!(result.level, StrengthLevel::Strong);
            prop_assert!(result.feedback.is_empty());
        }
    }
}
