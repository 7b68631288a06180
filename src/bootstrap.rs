//! Page bootstrap - wires every controller to page-ready and to events.

use std::collections::{HashMap, HashSet};

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::busy::{BusyLease, DEFAULT_BUSY_LABEL};
use crate::config::UiConfig;
use crate::dom::{Document, Element, ElementId, ScrollBehavior};
use crate::error::UiError;
use crate::indicator::{install as install_indicator, update as update_indicator};
use crate::notifier::{Notifier, ToastKind};
use crate::page::Page;
use crate::poller::{CountSource, Poller};
use crate::validator::{validate_form, Validator};

pub const ALERT_CLASS: &str = "alert";
pub const ASYNC_BUTTON_CLASS: &str = "btn-async";

/// Attribute on a password input naming the id of its strength indicator.
pub const STRENGTH_INDICATOR_ATTR: &str = "data-strength-indicator";

/// A user interaction delivered to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    Click(ElementId),
    Input(ElementId),
    Blur(ElementId),
}

/// Whether the host should run the event's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Proceed,
    Prevented,
}

/// Maps an alert's style classes to a toast kind.
pub fn alert_kind(alert: &Element) -> ToastKind {
    if alert.has_class("alert-success") {
        ToastKind::Success
    } else if alert.has_class("alert-danger") {
        ToastKind::Error
    } else if alert.has_class("alert-warning") {
        ToastKind::Warning
    } else {
        ToastKind::Info
    }
}

/// Live wiring of one page.
///
/// Background tasks (alert dismissal, polling) stop on [`Bootstrap::shutdown`]
/// or when the bootstrap is dropped.
#[derive(Debug)]
pub struct Bootstrap {
    page: Page,
    config: UiConfig,
    runtime: Handle,
    notifier: Notifier,
    validator: Validator,
    anchors: HashSet<ElementId>,
    indicators: HashMap<ElementId, ElementId>,
    leases: HashMap<ElementId, BusyLease>,
    shutdown: CancellationToken,
}

impl Bootstrap {
    /// Runs the page-ready wiring.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::NoRuntime`] when called outside a Tokio runtime.
    pub fn ready(page: Page, config: UiConfig) -> Result<Self, UiError> {
        let runtime = Handle::try_current().map_err(|_| UiError::NoRuntime)?;
        let notifier = Notifier::with_runtime(page.clone(), runtime.clone());

        let mut bootstrap = Self {
            page,
            config,
            runtime,
            notifier,
            validator: Validator::new(),
            anchors: HashSet::new(),
            indicators: HashMap::new(),
            leases: HashMap::new(),
            shutdown: CancellationToken::new(),
        };

        bootstrap.anchors = bootstrap.page.read(|doc| {
            doc.select(|e| e.tag() == "a" && e.attr("href").is_some_and(|h| h.starts_with('#')))
                .into_iter()
                .collect()
        });
        bootstrap.schedule_alert_dismissal();

        let bindings = bootstrap.page.read(|doc| {
            doc.select(|e| e.tag() == "input" && e.input_type().as_deref() == Some("password"))
                .into_iter()
                .filter_map(|input| {
                    let target = doc.get(input)?.attr(STRENGTH_INDICATOR_ATTR)?;
                    Some((input, doc.element_by_id(target)?))
                })
                .collect::<Vec<_>>()
        });
        for (input, target) in bindings {
            bootstrap.bind_strength_indicator(input, target);
        }

        for form in bootstrap.page.read(|doc| doc.select_tag("form")) {
            bootstrap.validator.attach(form);
        }

        bootstrap.convert_alerts();

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Page ready: {} anchors, {} strength indicators",
            bootstrap.anchors.len(),
            bootstrap.indicators.len()
        );

        Ok(bootstrap)
    }

    /// Runs [`Bootstrap::ready`] and, for signed-in pages, polls the
    /// configured endpoint over HTTP.
    ///
    /// A poller that cannot be built (no base URL, client setup failure) is
    /// logged and skipped; the rest of the page stays wired.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::NoRuntime`] when called outside a Tokio runtime.
    #[cfg(feature = "http")]
    pub fn ready_with_http(page: Page, config: UiConfig) -> Result<Self, UiError> {
        let mut bootstrap = Self::ready(page, config)?;
        if bootstrap.page.is_authenticated() {
            match crate::poller::HttpCountSource::from_config(&bootstrap.config) {
                Ok(source) => {
                    bootstrap.start_poller(source);
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Notification poller disabled: {}", e);
                    #[cfg(not(feature = "tracing"))]
                    let _ = e;
                }
            }
        }
        Ok(bootstrap)
    }

    /// Starts the badge poller when the page is authenticated.
    ///
    /// Returns `false`, without polling, for anonymous pages.
    pub fn start_poller<S: CountSource>(&mut self, source: S) -> bool {
        if !self.page.is_authenticated() {
            return false;
        }
        Poller::new(self.page.clone(), source, self.config.poll_interval)
            .spawn(&self.runtime, self.shutdown.child_token());
        true
    }

    /// Associates a password input with the element rendering its strength.
    pub fn bind_strength_indicator(&mut self, input: ElementId, indicator: ElementId) -> bool {
        if !self.page.write(|doc| install_indicator(doc, indicator)) {
            return false;
        }
        self.indicators.insert(input, indicator);
        true
    }

    /// Delivers an event and reports whether its default action may run.
    pub fn dispatch(&mut self, event: UiEvent) -> EventOutcome {
        match event {
            UiEvent::Click(target) => self.on_click(target),
            UiEvent::Input(target) => {
                if let Some(indicator) = self.indicators.get(&target).copied() {
                    self.page.write(|doc| {
                        let value = doc.get(target).map(|e| e.value().to_string())?;
                        update_indicator(doc, indicator, &value)
                    });
                }
                EventOutcome::Proceed
            }
            UiEvent::Blur(target) => {
                let validator = &self.validator;
                self.page.write(|doc| validator.on_blur(doc, target));
                EventOutcome::Proceed
            }
        }
    }

    /// Releases the busy state of a submit control once its operation ends.
    pub fn complete(&mut self, control: ElementId) -> bool {
        self.leases
            .remove(&control)
            .is_some_and(|lease| lease.release())
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Stops alert dismissal and polling.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn on_click(&mut self, target: ElementId) -> EventOutcome {
        self.leases.retain(|_, lease| !lease.is_released());

        let anchors = &self.anchors;
        let anchor = self
            .page
            .read(|doc| doc.closest(target, |e| e.tag() == "a"))
            .filter(|a| anchors.contains(a));
        if let Some(anchor) = anchor {
            self.page.write(|doc| scroll_to_anchor(doc, anchor));
            return EventOutcome::Prevented;
        }

        if self.notifier.handle_click(target) {
            return EventOutcome::Proceed;
        }

        let submit = self.page.read(|doc| {
            let control = doc.closest(target, |e| {
                (e.tag() == "button" && e.attr("type") == Some("submit"))
                    || e.has_class(ASYNC_BUTTON_CLASS)
            })?;
            let element = doc.get(control)?;
            if !(element.is_form_field() || element.tag() == "button") {
                return None;
            }
            Some((control, doc.form_owner(control)?))
        });
        let Some((control, form)) = submit else {
            return EventOutcome::Proceed;
        };

        if !self.page.write(|doc| validate_form(doc, form)) {
            return EventOutcome::Prevented;
        }

        if let Some(previous) = self.leases.remove(&control) {
            previous.release();
        }
        let lease = BusyLease::engage(
            &self.page,
            &self.runtime,
            control,
            DEFAULT_BUSY_LABEL,
            self.config.busy_fallback,
        );
        self.leases.insert(control, lease);
        EventOutcome::Proceed
    }

    fn schedule_alert_dismissal(&self) {
        let page = self.page.clone();
        let delay = self.config.alert_dismiss_delay;
        let token = self.shutdown.child_token();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    let removed = page.write(|doc| {
                        let alerts = doc.select_class(ALERT_CLASS);
                        alerts.into_iter().filter(|a| doc.remove(*a)).count()
                    });

                    #[cfg(feature = "tracing")]
                    tracing::debug!("Dismissed {} alerts", removed);
                    #[cfg(not(feature = "tracing"))]
                    let _ = removed;
                }
                _ = token.cancelled() => {}
            }
        });
    }

    fn convert_alerts(&self) {
        let alerts = self.page.read(|doc| {
            doc.select_class(ALERT_CLASS)
                .into_iter()
                .filter_map(|id| {
                    let kind = alert_kind(doc.get(id)?);
                    Some((id, doc.text_content(id).trim().to_string(), kind))
                })
                .collect::<Vec<_>>()
        });
        for (id, message, kind) in alerts {
            self.notifier.show(&message, kind, self.config.toast_duration);
            self.page.write(|doc| {
                if let Some(alert) = doc.get_mut(id) {
                    alert.set_style("display", "none");
                }
            });
        }
    }
}

impl Drop for Bootstrap {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Smooth-scrolls to the anchor's `#id` target, if it exists.
fn scroll_to_anchor(doc: &mut Document, anchor: ElementId) -> bool {
    let Some(target) = doc
        .get(anchor)
        .and_then(|a| a.attr("href"))
        .map(|href| href.trim_start_matches('#').to_string())
        .and_then(|id| doc.element_by_id(&id))
    else {
        return false;
    };
    doc.scroll_into_view(target, ScrollBehavior::Smooth)
}
