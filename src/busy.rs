//! Busy (loading) state for buttons and other controls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::dom::{Document, Element, ElementId};
use crate::page::Page;

pub const DEFAULT_BUSY_LABEL: &str = "Loading...";
pub const BUSY_CLASS: &str = "btn-loading";
pub const SPINNER_CLASS: &str = "loading-spinner";
pub const ORIGINAL_LABEL_ATTR: &str = "data-original-text";
/// Set on children hidden while busy; holds their previous `display` value.
pub const BUSY_HIDDEN_ATTR: &str = "data-busy-hidden";

/// Disables `control` and swaps its label for a spinner plus `label`.
///
/// Child elements such as icons are hidden until [`exit`]. The original
/// label is recorded only once, so repeated calls keep the label from before
/// the first call. Returns `false` if the control is gone.
pub fn enter(doc: &mut Document, control: ElementId, label: &str) -> bool {
    let Some(element) = doc.get_mut(control) else {
        return false;
    };
    element.set_disabled(true);
    element.add_class(BUSY_CLASS);
    if !element.has_attr(ORIGINAL_LABEL_ATTR) {
        let original = element.content().to_string();
        element.set_attr(ORIGINAL_LABEL_ATTR, &original);
    }
    element.set_content(label);

    let children = element.children().to_vec();
    for child in children {
        let Some(node) = doc.get_mut(child) else {
            continue;
        };
        if node.has_class(SPINNER_CLASS) || node.has_attr(BUSY_HIDDEN_ATTR) {
            continue;
        }
        let previous = node.style("display").unwrap_or_default().to_string();
        node.set_attr(BUSY_HIDDEN_ATTR, &previous);
        node.set_style("display", "none");
    }

    if doc
        .select_within(control, |e| e.has_class(SPINNER_CLASS))
        .is_empty()
    {
        doc.prepend(
            control,
            Element::new("span").with_class(&format!("{SPINNER_CLASS} me-2")),
        );
    }
    true
}

/// Re-enables `control` and restores the label recorded by [`enter`].
pub fn exit(doc: &mut Document, control: ElementId) -> bool {
    if doc.get(control).is_none() {
        return false;
    }
    for spinner in doc.select_within(control, |e| e.has_class(SPINNER_CLASS)) {
        doc.remove(spinner);
    }
    let children = doc.get(control).map(|e| e.children().to_vec()).unwrap_or_default();
    for child in children {
        let Some(node) = doc.get_mut(child) else {
            continue;
        };
        match node.remove_attr(BUSY_HIDDEN_ATTR).as_deref() {
            Some("") => {
                node.remove_style("display");
            }
            Some(previous) => node.set_style("display", previous),
            None => {}
        }
    }
    let Some(element) = doc.get_mut(control) else {
        return false;
    };
    element.set_disabled(false);
    element.remove_class(BUSY_CLASS);
    if let Some(original) = element.remove_attr(ORIGINAL_LABEL_ATTR) {
        element.set_content(&original);
    }
    true
}

/// `true` while `control` carries a recorded original label.
pub fn is_busy(doc: &Document, control: ElementId) -> bool {
    doc.get(control)
        .is_some_and(|e| e.has_attr(ORIGINAL_LABEL_ATTR))
}

/// One busy period with a guaranteed release.
///
/// Whichever comes first, [`BusyLease::release`] or the fallback timer,
/// runs [`exit`]; the other becomes a no-op.
#[derive(Debug, Clone)]
pub struct BusyLease {
    page: Page,
    control: ElementId,
    released: Arc<AtomicBool>,
    fallback: CancellationToken,
}

impl BusyLease {
    /// Enters the busy state and schedules an automatic release after
    /// `fallback`.
    pub fn engage(
        page: &Page,
        runtime: &Handle,
        control: ElementId,
        label: &str,
        fallback: Duration,
    ) -> Self {
        page.write(|doc| enter(doc, control, label));

        let lease = Self {
            page: page.clone(),
            control,
            released: Arc::new(AtomicBool::new(false)),
            fallback: CancellationToken::new(),
        };

        let timer = lease.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(fallback) => {
                    if timer.finish() {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("Busy state of {} released by fallback timer", timer.control);
                    }
                }
                _ = timer.fallback.cancelled() => {}
            }
        });
        lease
    }

    pub fn control(&self) -> ElementId {
        self.control
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Ends the busy period now. Returns `false` if already released.
    pub fn release(&self) -> bool {
        self.fallback.cancel();
        self.finish()
    }

    fn finish(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.page.write(|doc| exit(doc, self.control));
        true
    }
}


#[cfg(test)]
mod async_tests {
    use super::*;

    fn page_with_button() -> (Page, ElementId) {
        let mut doc = Document::new();
        let body = doc.body();
        let id = doc
            .append(body, Element::new("button").with_content("Submit"))
            .unwrap();
        (Page::new(doc), id)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_releases_after_timeout() {
        let (page, id) = page_with_button();
        let lease = BusyLease::engage(
            &page,
            &Handle::current(),
            id,
            DEFAULT_BUSY_LABEL,
            Duration::from_secs(10),
        );
        assert!(page.read(|doc| is_busy(doc, id)));

        tokio::time::sleep(Duration::from_millis(9_999)).await;
        assert!(page.read(|doc| is_busy(doc, id)));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(lease.is_released());
        page.read(|doc| {
            let el = doc.get(id).unwrap();
            assert!(!el.is_disabled());
            assert_eq!(el.content(), "Submit");
        });
        assert!(!lease.release());
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_then_fallback_is_noop() {
        let (page, id) = page_with_button();
        let lease = BusyLease::engage(
            &page,
            &Handle::current(),
            id,
            "Working",
            Duration::from_secs(10),
        );
        assert!(lease.release());
        assert!(!page.read(|doc| is_busy(doc, id)));

        // A second busy period must not be cut short by the first lease's timer.
        page.write(|doc| enter(doc, id, "Again"));
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(page.read(|doc| is_busy(doc, id)));
    }
}
