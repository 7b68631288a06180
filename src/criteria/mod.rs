//! Password strength criteria
//!
//! Each criterion checks one property of a candidate password.

mod length;
mod variety;

pub use length::length_criterion;
pub use variety::{digit_criterion, lowercase_criterion, special_criterion, uppercase_criterion};

/// Result type for criterion functions.
/// - `Some(description)` - Criterion unmet, with the hint shown to the user
/// - `None` - Criterion satisfied
pub type CriterionResult = Option<&'static str>;
