//! Toast notifications.
//!
//! Each toast owns its own expiry timer. Hiding removes the `show` class and
//! schedules removal after [`TOAST_GRACE_PERIOD`]; a one-shot flag makes the
//! auto-expiry and manual-close paths safe to fire in either order.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::config::{DEFAULT_TOAST_DURATION, TOAST_GRACE_PERIOD};
use crate::dom::{Document, Element, ElementId};
use crate::error::UiError;
use crate::page::Page;

pub const CONTAINER_CLASS: &str = "toast-container";
pub const TOAST_CLASS: &str = "toast";
pub const VISIBLE_CLASS: &str = "show";
pub const CLOSE_CLASS: &str = "btn-close";

/// Category of a toast. Unknown names are kept for the CSS class but
/// render with the info icon and a generic title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
    Other(String),
}

impl ToastKind {
    pub fn name(&self) -> &str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
            ToastKind::Other(name) => name,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "check-circle",
            ToastKind::Error | ToastKind::Warning => "exclamation-triangle",
            ToastKind::Info | ToastKind::Other(_) => "info-circle",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ToastKind::Success => "Success",
            ToastKind::Error => "Error",
            ToastKind::Warning => "Warning",
            ToastKind::Info => "Information",
            ToastKind::Other(_) => "Notification",
        }
    }
}

impl From<&str> for ToastKind {
    fn from(name: &str) -> Self {
        match name {
            "success" => ToastKind::Success,
            "error" => ToastKind::Error,
            "warning" => ToastKind::Warning,
            "info" => ToastKind::Info,
            other => ToastKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to one live toast.
#[derive(Debug, Clone)]
pub struct ToastHandle {
    id: ElementId,
    close_button: ElementId,
    hiding: Arc<AtomicBool>,
    expiry: CancellationToken,
}

impl ToastHandle {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn close_button(&self) -> ElementId {
        self.close_button
    }

    /// `true` once either the timer or a manual close has started hiding.
    pub fn is_hiding(&self) -> bool {
        self.hiding.load(Ordering::Acquire)
    }
}

type Registry = Arc<Mutex<HashMap<ElementId, ToastHandle>>>;

/// Shows and retires toasts inside the page's single toast container.
#[derive(Debug, Clone)]
pub struct Notifier {
    page: Page,
    runtime: Handle,
    container: Arc<Mutex<Option<ElementId>>>,
    toasts: Registry,
}

impl Notifier {
    /// Creates a notifier bound to the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::NoRuntime`] outside a runtime.
    pub fn new(page: Page) -> Result<Self, UiError> {
        let runtime = Handle::try_current().map_err(|_| UiError::NoRuntime)?;
        Ok(Self::with_runtime(page, runtime))
    }

    pub fn with_runtime(page: Page, runtime: Handle) -> Self {
        Self {
            page,
            runtime,
            container: Arc::new(Mutex::new(None)),
            toasts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Shows an info toast for the default duration.
    pub fn info(&self, message: &str) -> Option<ToastHandle> {
        self.show(message, ToastKind::Info, DEFAULT_TOAST_DURATION)
    }

    /// Appends a toast to the shared container and starts its expiry timer.
    ///
    /// Returns `None` only if the container could not be placed in the
    /// document.
    pub fn show(&self, message: &str, kind: ToastKind, duration: Duration) -> Option<ToastHandle> {
        let (id, close_button) = self.page.write(|doc| {
            let container = self.container_in(doc)?;
            render_toast(doc, container, message, &kind)
        })?;

        let handle = ToastHandle {
            id,
            close_button,
            hiding: Arc::new(AtomicBool::new(false)),
            expiry: CancellationToken::new(),
        };
        lock(&self.toasts).insert(id, handle.clone());

        #[cfg(feature = "tracing")]
        tracing::debug!("Toast {} shown ({}, {:?})", id, kind, duration);

        let notifier = self.clone();
        let timer = handle.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {
                    notifier.hide(&timer);
                }
                _ = timer.expiry.cancelled() => {}
            }
        });

        Some(handle)
    }

    /// Starts the hide-then-remove sequence now.
    ///
    /// Returns `false` if the toast was already hiding.
    pub fn dismiss(&self, handle: &ToastHandle) -> bool {
        handle.expiry.cancel();
        self.hide(handle)
    }

    /// Routes a click on a toast's close control.
    ///
    /// Returns `true` when `target` was a close control of a live toast.
    pub fn handle_click(&self, target: ElementId) -> bool {
        let toast = self.page.read(|doc| {
            let button = doc.closest(target, |e| e.has_class(CLOSE_CLASS))?;
            doc.closest(button, |e| e.has_class(TOAST_CLASS))
        });
        let Some(handle) = toast.and_then(|id| lock(&self.toasts).get(&id).cloned()) else {
            return false;
        };
        self.dismiss(&handle);
        true
    }

    /// Number of toasts not yet removed from the document.
    pub fn live_count(&self) -> usize {
        lock(&self.toasts).len()
    }

    fn hide(&self, handle: &ToastHandle) -> bool {
        if handle.hiding.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.page.write(|doc| {
            if let Some(toast) = doc.get_mut(handle.id) {
                toast.remove_class(VISIBLE_CLASS);
            }
        });

        let page = self.page.clone();
        let toasts = self.toasts.clone();
        let id = handle.id;
        self.runtime.spawn(async move {
            tokio::time::sleep(TOAST_GRACE_PERIOD).await;
            page.write(|doc| doc.remove(id));
            lock(&toasts).remove(&id);

            #[cfg(feature = "tracing")]
            tracing::debug!("Toast {} removed", id);
        });
        true
    }

    /// The cached container if still connected, else the first one in the
    /// document, else a new one under the body.
    fn container_in(&self, doc: &mut Document) -> Option<ElementId> {
        let mut cached = lock(&self.container);
        if let Some(id) = *cached {
            if doc.is_connected(id) {
                return Some(id);
            }
        }
        let id = match doc.select_class(CONTAINER_CLASS).into_iter().next() {
            Some(existing) => existing,
            None => {
                let body = doc.body();
                doc.append(body, Element::new("div").with_class(CONTAINER_CLASS))?
            }
        };
        *cached = Some(id);
        Some(id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn render_toast(
    doc: &mut Document,
    container: ElementId,
    message: &str,
    kind: &ToastKind,
) -> Option<(ElementId, ElementId)> {
    let toast = doc.append(
        container,
        Element::new("div")
            .with_class(&format!("{TOAST_CLASS} toast-{kind} {VISIBLE_CLASS}"))
            .with_attr("role", "alert"),
    )?;
    let header = doc.append(toast, Element::new("div").with_class("toast-header"))?;
    doc.append(
        header,
        Element::new("i").with_class(&format!("fas fa-{} me-2", kind.icon())),
    )?;
    doc.append(
        header,
        Element::new("strong").with_class("me-auto").with_content(kind.title()),
    )?;
    let close = doc.append(
        header,
        Element::new("button")
            .with_attr("type", "button")
            .with_class(CLOSE_CLASS)
            .with_attr("data-bs-dismiss", "toast"),
    )?;
    doc.append(
        toast,
        Element::new("div").with_class("toast-body").with_content(message),
    )?;
    Some((toast, close))
}


#[cfg(test)]
mod async_tests {
    use super::*;

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    fn toast_state(page: &Page, id: ElementId) -> Option<bool> {
        page.read(|doc| doc.get(id).map(|e| e.has_class(VISIBLE_CLASS)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_renders_structure_in_single_container() {
        let page = Page::default();
        let notifier = Notifier::new(page.clone()).unwrap();

        let first = notifier
            .show("Saved", ToastKind::Success, Duration::from_secs(5))
            .unwrap();
        let second = notifier.info("Heads up").unwrap();

        page.read(|doc| {
            let containers = doc.select_class(CONTAINER_CLASS);
            assert_eq!(containers.len(), 1);
            assert_eq!(doc.get(containers[0]).unwrap().children(), &[first.id(), second.id()]);

            let toast = doc.get(first.id()).unwrap();
            assert_eq!(toast.class_name(), "toast toast-success show");
            assert_eq!(toast.attr("role"), Some("alert"));
            assert_eq!(doc.text_content(first.id()), "SuccessSaved");

            let icon = doc.select_within(first.id(), |e| e.tag() == "i")[0];
            assert!(doc.get(icon).unwrap().has_class("fa-check-circle"));
            let body = doc.select_within(first.id(), |e| e.has_class("toast-body"))[0];
            assert_eq!(doc.get(body).unwrap().content(), "Saved");
        });
        assert_eq!(notifier.live_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reuses_existing_container() {
        let mut doc = Document::new();
        let body = doc.body();
        let existing = doc
            .append(body, Element::new("div").with_class(CONTAINER_CLASS))
            .unwrap();
        let page = Page::new(doc);
        let notifier = Notifier::new(page.clone()).unwrap();

        let toast = notifier.info("hello").unwrap();
        page.read(|doc| {
            assert_eq!(doc.select_class(CONTAINER_CLASS), vec![existing]);
            assert_eq!(doc.get(toast.id()).unwrap().parent(), Some(existing));
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_waits_for_grace_period() {
        let page = Page::default();
        let notifier = Notifier::new(page.clone()).unwrap();
        let toast = notifier.show("gone soon", ToastKind::Info, Duration::ZERO).unwrap();

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(toast_state(&page, toast.id()), Some(false));
        assert!(toast.is_hiding());

        tokio::time::sleep(Duration::from_millis(297)).await;
        assert_eq!(toast_state(&page, toast.id()), Some(false));

        tokio::time::sleep(Duration::from_millis(5)).await;
        settle().await;
        assert_eq!(toast_state(&page, toast.id()), None);
        assert_eq!(notifier.live_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_after_duration() {
        let page = Page::default();
        let notifier = Notifier::new(page.clone()).unwrap();
        let toast = notifier.info("five seconds").unwrap();

        tokio::time::sleep(Duration::from_millis(4999)).await;
        assert_eq!(toast_state(&page, toast.id()), Some(true));

        tokio::time::sleep(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(toast_state(&page, toast.id()), Some(false));

        tokio::time::sleep(TOAST_GRACE_PERIOD).await;
        settle().await;
        assert_eq!(toast_state(&page, toast.id()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_close_then_timer_removes_once() {
        let page = Page::default();
        let notifier = Notifier::new(page.clone()).unwrap();
        let toast = notifier
            .show("closing", ToastKind::Warning, Duration::from_millis(100))
            .unwrap();

        assert!(notifier.handle_click(toast.close_button()));
        assert!(!notifier.dismiss(&toast));
        assert_eq!(toast_state(&page, toast.id()), Some(false));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(toast_state(&page, toast.id()), Some(false));

        tokio::time::sleep(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(toast_state(&page, toast.id()), None);
        assert!(!notifier.handle_click(toast.close_button()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_then_manual_close_is_noop() {
        let page = Page::default();
        let notifier = Notifier::new(page.clone()).unwrap();
        let toast = notifier
            .show("expiring", ToastKind::Error, Duration::from_millis(50))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(toast.is_hiding());
        assert!(!notifier.dismiss(&toast));

        tokio::time::sleep(TOAST_GRACE_PERIOD).await;
        settle().await;
        assert_eq!(toast_state(&page, toast.id()), None);
        assert_eq!(notifier.live_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toasts_expire_independently() {
        let page = Page::default();
        let notifier = Notifier::new(page.clone()).unwrap();
        let short = notifier
            .show("short", ToastKind::Info, Duration::from_millis(100))
            .unwrap();
        let long = notifier
            .show("long", ToastKind::Info, Duration::from_secs(2))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(toast_state(&page, short.id()), None);
        assert_eq!(toast_state(&page, long.id()), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_outside_close_control_is_ignored() {
        let page = Page::default();
        let notifier = Notifier::new(page.clone()).unwrap();
        let toast = notifier.info("stay").unwrap();

        assert!(!notifier.handle_click(toast.id()));
        assert!(!toast.is_hiding());
    }
}
