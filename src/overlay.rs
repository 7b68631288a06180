//! Loading overlay placed over a container while it refreshes.

use crate::dom::{Document, Element, ElementId};

pub const OVERLAY_CLASS: &str = "loading-overlay";

const OVERLAY_LAYOUT: &str = "position-absolute top-0 start-0 w-100 h-100 d-flex \
    align-items-center justify-content-center bg-white bg-opacity-75";

/// Covers `container` with a spinner and `message`.
///
/// Returns the overlay's id, or `None` when the container is gone.
pub fn show_loading_overlay(
    doc: &mut Document,
    container: ElementId,
    message: &str,
) -> Option<ElementId> {
    doc.get_mut(container)?.set_style("position", "relative");

    let overlay = doc.append(
        container,
        Element::new("div")
            .with_class(OVERLAY_CLASS)
            .with_class(OVERLAY_LAYOUT)
            .with_style("z-index", "1000"),
    )?;
    let inner = doc.append(overlay, Element::new("div").with_class("text-center"))?;
    doc.append(inner, Element::new("div").with_class("loading-spinner mb-2"))?;
    doc.append(
        inner,
        Element::new("div").with_class("text-muted").with_content(message),
    )?;
    Some(overlay)
}

/// Removes the first overlay inside `container`. Returns `true` if one was
/// removed.
pub fn hide_loading_overlay(doc: &mut Document, container: ElementId) -> bool {
    match doc
        .select_within(container, |e| e.has_class(OVERLAY_CLASS))
        .first()
    {
        Some(overlay) => doc.remove(*overlay),
        None => false,
    }
}
