//! Notification count poller.
//!
//! Fetches `{"count": n}` on start and every poll interval and mirrors it
//! into the `#notificationBadge` element. Failures are logged and leave the
//! badge as it was; the schedule keeps running.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::dom::Document;
use crate::error::PollError;
use crate::page::Page;

pub const BADGE_ID: &str = "notificationBadge";

/// Body of the count endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NotificationCount {
    pub count: i64,
}

/// Source of the raw count response body.
pub trait CountSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<String, PollError>> + Send;
}

/// Parses the count endpoint body.
pub fn parse_count(body: &str) -> Result<i64, PollError> {
    let payload: NotificationCount = serde_json::from_str(body)?;
    Ok(payload.count)
}

/// Shows the badge with `count` when positive, hides it otherwise.
///
/// Returns `false` when the page has no badge.
pub fn apply_count(doc: &mut Document, count: i64) -> bool {
    let Some(badge) = doc.element_by_id(BADGE_ID).and_then(|id| doc.get_mut(id)) else {
        return false;
    };
    if count > 0 {
        badge.set_content(&count.to_string());
        badge.set_style("display", "block");
    } else {
        badge.set_style("display", "none");
    }
    true
}

/// Periodic badge refresher.
#[derive(Debug)]
pub struct Poller<S> {
    page: Page,
    source: Arc<S>,
    interval: Duration,
}

impl<S: CountSource> Poller<S> {
    pub fn new(page: Page, source: S, interval: Duration) -> Self {
        Self {
            page,
            source: Arc::new(source),
            interval,
        }
    }

    /// Fetches once and updates the badge.
    ///
    /// # Errors
    ///
    /// Returns the fetch or parse failure; the badge is untouched in that case.
    pub async fn poll_once(&self) -> Result<i64, PollError> {
        let body = self.source.fetch().await?;
        let count = parse_count(&body)?;
        self.page.write(|doc| apply_count(doc, count));
        Ok(count)
    }

    /// Polls immediately and then every interval until `token` is cancelled.
    ///
    /// A fetch that outlives the interval is abandoned as
    /// [`PollError::Timeout`] so the next tick still runs. Cancellation is
    /// honoured while a fetch is in flight.
    pub fn spawn(self, runtime: &Handle, token: CancellationToken) -> JoinHandle<()> {
        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            #[cfg(feature = "tracing")]
            tracing::info!("Notification poller started ({:?} interval)", self.interval);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let outcome = tokio::select! {
                    _ = token.cancelled() => break,
                    outcome = tokio::time::timeout(self.interval, self.poll_once()) => {
                        outcome.unwrap_or(Err(PollError::Timeout(self.interval)))
                    }
                };
                if let Err(e) = outcome {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Error loading notification count: {}", e);
                    #[cfg(not(feature = "tracing"))]
                    let _ = e;
                }
            }

            #[cfg(feature = "tracing")]
            tracing::info!("Notification poller stopped");
        })
    }
}

/// Reads the count over HTTP with `reqwest`.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpCountSource {
    client: reqwest::Client,
    url: String,
}

#[cfg(feature = "http")]
impl HttpCountSource {
    /// Creates a source whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Transport`] when the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PollError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Builds a source for the configured endpoint, timing requests out
    /// after one poll interval.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::MissingBaseUrl`] without a base URL.
    pub fn from_config(config: &crate::UiConfig) -> Result<Self, crate::UiError> {
        Ok(Self::new(config.count_url()?, config.poll_interval)?)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(feature = "http")]
impl CountSource for HttpCountSource {
    fn fetch(&self) -> impl Future<Output = Result<String, PollError>> + Send {
        let request = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json");
        async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(PollError::Status(status.as_u16()));
            }
            Ok(response.text().await?)
        }
    }
}
