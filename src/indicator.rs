//! Live password strength indicator.

use secrecy::SecretString;

use crate::dom::{Document, Element, ElementId};
use crate::strength::{check_password_strength, StrengthResult};

pub const INDICATOR_CLASS: &str = "password-strength";
pub const FEEDBACK_CLASS: &str = "password-feedback";

const FEEDBACK_MUTED: &str = "text-muted mt-1 d-block password-feedback";
const FEEDBACK_SUCCESS: &str = "text-success mt-1 d-block password-feedback";

/// Replaces the indicator's children with the bar and feedback line.
pub fn install(doc: &mut Document, indicator: ElementId) -> bool {
    let Some(element) = doc.get(indicator) else {
        return false;
    };
    for child in element.children().to_vec() {
        doc.remove(child);
    }
    let built = doc
        .append(indicator, Element::new("div").with_class("password-strength-bar"))
        .and_then(|bar| doc.append(bar, Element::new("div").with_class("password-strength-fill")))
        .and_then(|_| doc.append(indicator, Element::new("small").with_class(FEEDBACK_MUTED)));
    built.is_some()
}

/// Scores `value` and renders the result into `indicator`.
pub fn update(doc: &mut Document, indicator: ElementId, value: &str) -> Option<StrengthResult> {
    let secret = SecretString::new(value.to_string().into());
    let result = check_password_strength(&secret);

    doc.get_mut(indicator)?
        .set_class_name(&format!("{INDICATOR_CLASS} {}", result.level));

    let feedback = doc
        .select_within(indicator, |e| e.has_class(FEEDBACK_CLASS))
        .into_iter()
        .next()
        .and_then(|id| doc.get_mut(id));
    if let Some(feedback) = feedback {
        if value.is_empty() {
            feedback.set_content("");
        } else if result.is_strong() {
            feedback.set_content("Strong password!");
            feedback.set_class_name(FEEDBACK_SUCCESS);
        } else {
            feedback.set_content(&format!("Needs: {}", result.feedback.join(", ")));
            feedback.set_class_name(FEEDBACK_MUTED);
        }
    }
    Some(result)
}
