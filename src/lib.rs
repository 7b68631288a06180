//! Headless page controllers for ChamaLink
//!
//! This library provides the presentation-side behavior of the web
//! application against an in-memory document model: password strength
//! scoring, form validation, toast notifications, button busy states, a
//! loading overlay and the notification badge poller.
//!
//! # Features
//!
//! - `tracing` (default): Enables logging via tracing crate
//! - `http` (default): Enables the `reqwest`-backed notification count source
//!
//! # Environment Variables
//!
//! See [`UiConfig::from_env`] for the `CHAMALINK_*` overrides.
//!
//! # Example
//!
//! ```rust,no_run
//! use chamalink_ui::{Bootstrap, Document, Element, Page, UiConfig, UiEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::new();
//! let body = doc.body();
//! let form = doc.append(body, Element::new("form")).unwrap();
//! let email = doc
//!     .append(form, Element::new("input").with_attr("type", "email").with_attr("required", ""))
//!     .unwrap();
//!
//! let page = Page::new(doc);
//! let mut bootstrap = Bootstrap::ready(page.clone(), UiConfig::from_env()?)?;
//!
//! page.write(|doc| doc.get_mut(email).map(|e| e.set_value("a@b.com")));
//! bootstrap.dispatch(UiEvent::Blur(email));
//! # Ok(())
//! # }
//! ```

// Internal modules
mod bootstrap;
mod busy;
mod config;
mod criteria;
mod dom;
mod error;
mod indicator;
mod notifier;
mod overlay;
mod page;
mod poller;
mod strength;
mod validator;

// Public API
pub use bootstrap::{alert_kind, Bootstrap, EventOutcome, UiEvent, STRENGTH_INDICATOR_ATTR};
pub use busy::{enter as enter_busy, exit as exit_busy, is_busy, BusyLease, DEFAULT_BUSY_LABEL};
pub use config::{UiConfig, TOAST_GRACE_PERIOD};
pub use dom::{Document, Element, ElementId, ScrollBehavior, ScrollRequest};
pub use error::{ConfigError, PollError, UiError};
pub use notifier::{Notifier, ToastHandle, ToastKind};
pub use overlay::{hide_loading_overlay, show_loading_overlay};
pub use page::{parse_auth_flag, Page};
pub use poller::{apply_count, parse_count, CountSource, NotificationCount, Poller, BADGE_ID};
pub use strength::{check_password_strength, StrengthLevel, StrengthResult};
pub use validator::{is_valid_email, is_valid_phone, validate_form, FieldKind, Validator};

#[cfg(feature = "http")]
pub use poller::HttpCountSource;
