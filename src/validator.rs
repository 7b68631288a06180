//! Form validation.
//!
//! Required fields are classified by kind and marked with `is-valid` or
//! `is-invalid`. Re-running validation on an unchanged form produces the
//! same markers and verdict.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use secrecy::SecretString;

use crate::dom::{Document, Element, ElementId};
use crate::strength::check_password_strength;

pub const VALID_CLASS: &str = "is-valid";
pub const INVALID_CLASS: &str = "is-invalid";

/// Minimum strength score a password field needs to pass.
pub const MIN_PASSWORD_SCORE: u8 = 2;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Local subscriber numbers: `+254` or `0`, then 9 digits starting with 1 or 7.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+254|0)[17]\d{8}$").unwrap());

/// Kind-specific check applied to a non-empty required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Telephone,
    Password,
    Plain,
}

impl FieldKind {
    pub fn of(element: &Element) -> Self {
        match element.input_type().as_deref() {
            Some("email") => FieldKind::Email,
            Some("tel") => FieldKind::Telephone,
            _ if element.attr("name") == Some("phone_number") => FieldKind::Telephone,
            Some("password") => FieldKind::Password,
            _ => FieldKind::Plain,
        }
    }

    /// Checks an already-trimmed, non-empty value.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            FieldKind::Email => is_valid_email(value),
            FieldKind::Telephone => is_valid_phone(value),
            FieldKind::Password => {
                let secret = SecretString::new(value.to_string().into());
                check_password_strength(&secret).score >= MIN_PASSWORD_SCORE
            }
            FieldKind::Plain => true,
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// Classifies one field's raw value.
pub fn validate_field(element: &Element) -> bool {
    let value = element.value().trim();
    !value.is_empty() && FieldKind::of(element).accepts(value)
}

/// Required `input`, `select` and `textarea` elements owned by `form`.
///
/// Ownership follows [`Document::form_owner`], so fields placed elsewhere
/// with a matching `form` attribute count and descendants pointing at another
/// form do not.
pub fn required_fields(doc: &Document, form: ElementId) -> Vec<ElementId> {
    let required = |e: &Element| e.is_form_field() && e.has_attr("required");
    let mut fields: Vec<ElementId> = doc
        .select_within(form, required)
        .into_iter()
        .filter(|f| doc.form_owner(*f) == Some(form))
        .collect();
    for field in doc.select(|e| required(e) && e.has_attr("form")) {
        if doc.form_owner(field) == Some(form) && !fields.contains(&field) {
            fields.push(field);
        }
    }
    fields
}

/// Validates every required field of `form` and marks each one.
///
/// Returns `true` iff every required field is valid. A form that no longer
/// exists is never valid.
pub fn validate_form(doc: &mut Document, form: ElementId) -> bool {
    if doc.get(form).is_none() {
        return false;
    }

    let mut all_valid = true;
    for field in required_fields(doc, form) {
        let Some(element) = doc.get_mut(field) else {
            continue;
        };
        let valid = validate_field(element);
        element.remove_class(VALID_CLASS);
        element.remove_class(INVALID_CLASS);
        element.add_class(if valid { VALID_CLASS } else { INVALID_CLASS });
        all_valid &= valid;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Validated form {}: {}", form, all_valid);

    all_valid
}

/// Forms that re-validate whenever one of their fields loses focus.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    attached: HashSet<ElementId>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, form: ElementId) {
        self.attached.insert(form);
    }

    pub fn is_attached(&self, form: ElementId) -> bool {
        self.attached.contains(&form)
    }

    /// Handles a blur on `field`.
    ///
    /// Returns the verdict when the field's form is attached, `None`
    /// otherwise.
    pub fn on_blur(&self, doc: &mut Document, field: ElementId) -> Option<bool> {
        if !doc.get(field).is_some_and(Element::is_form_field) {
            return None;
        }
        let form = doc.form_owner(field)?;
        if !self.is_attached(form) {
            return None;
        }
        Some(validate_form(doc, form))
    }
}
