//! Woopra event-tracking backend.
//!
//! Receives one event record from the tracking pipeline, decides whether to
//! forward it, derives the visitor properties and Woopra event name, then
//! calls `identify` and `track` on a freshly connected [`Tracker`].
//!
//! Gating, in order:
//!   no destination configured       → no-op
//!   empty username or event name    → no-op
//!   blacklisted event name          → no-op
//!   client-side problem_check       → identify only

use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::client::{Tracker, TrackerConnector, WoopraConnector};
use crate::events::{
    apply_page_view, build_user_properties, resolve_event_name, route_track, str_field, Event,
    TrackRoute,
};
use crate::types::{Config, Result, WoopraConfig};

/// Event names suppressed by every backend, on top of the configured list.
pub const DEFAULT_EVENT_BLACK_LIST: &[&str] = &[];

/// Shape expected by the upstream tracking pipeline.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Forward one event. Suppressed events return `Ok(())`.
    async fn send(&self, event: &Event) -> Result<()>;
}

/// Forwards events to woopra.com.
#[derive(Debug)]
pub struct WoopraBackend<C = WoopraConnector> {
    url: Option<String>,
    idle_timeout: Duration,
    secure: bool,
    event_black_list: HashSet<String>,
    connector: C,
}

impl WoopraBackend<WoopraConnector> {
    /// Backend talking to Woopra over HTTP.
    pub fn from_config(config: &Config) -> Result<Self> {
        let connector = WoopraConnector::new(&config.client)?;
        Self::new(config.woopra.clone(), connector)
    }
}

impl<C: TrackerConnector> WoopraBackend<C> {
    pub fn new(config: WoopraConfig, connector: C) -> Result<Self> {
        Self::with_default_black_list(config, DEFAULT_EVENT_BLACK_LIST.iter().copied(), connector)
    }

    /// Like [`WoopraBackend::new`] with a different component-level blacklist.
    /// The effective blacklist is the union with the configured one.
    pub fn with_default_black_list<I, S>(
        config: WoopraConfig,
        default_black_list: I,
        connector: C,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let url = config.destination().map(String::from);
        match url {
            Some(_) => config.validate()?,
            None => info!("woopra backend has no url configured, events will not be forwarded"),
        }

        let mut event_black_list: HashSet<String> =
            default_black_list.into_iter().map(Into::into).collect();
        event_black_list.extend(config.event_black_list.iter().cloned());

        Ok(Self {
            url,
            idle_timeout: config.idle_timeout_duration(),
            secure: config.secure,
            event_black_list,
            connector,
        })
    }

    /// Whether a destination is configured.
    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// Effective blacklist (default ∪ configured).
    pub fn event_black_list(&self) -> &HashSet<String> {
        &self.event_black_list
    }

    /// Process one event record.
    ///
    /// Failures from the tracking client are logged and returned unchanged.
    /// `identify` may already have reached the service when `track` fails.
    pub async fn process(&self, event: &Event) -> Result<()> {
        let Some(url) = self.url.as_deref() else {
            return Ok(());
        };

        let event_name = resolve_event_name(event);
        let username = str_field(event, "username");

        if username.is_empty() || event_name.is_empty() {
            debug!(event = event_name, username, "not forwarding event without username or name");
            return Ok(());
        }

        if self.event_black_list.contains(event_name) {
            debug!(event = event_name, "not forwarding blacklisted event");
            return Ok(());
        }

        debug!(event = event_name, username, url, "forwarding event");

        self.forward(url, username, event_name, event)
            .await
            .map_err(|err| {
                error!(event = event_name, error = %err, "EVENT-TRACKING WoopraBackend: EXCEPTION");
                err
            })
    }

    async fn forward(&self, url: &str, username: &str, event_name: &str, event: &Event) -> Result<()> {
        let mut tracker: Box<dyn Tracker> = self.connector.connect(url)?;
        tracker.set_secure(self.secure);
        tracker.set_idle_timeout(self.idle_timeout);

        let user_properties = build_user_properties(username, event_name, event);

        let mut record = event.clone();
        let event_name = apply_page_view(event_name.to_string(), &mut record);

        tracker.identify(&user_properties).await?;

        match route_track(event_name, &record) {
            TrackRoute::Forward(name) => {
                tracker.track(&name, &record).await?;
                info!(event = %name, username, "sent event to woopra");
            }
            TrackRoute::Suppress => {
                debug!(username, "did not track client-side problem_check");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl<C: TrackerConnector> Backend for WoopraBackend<C> {
    async fn send(&self, event: &Event) -> Result<()> {
        self.process(event).await
    }
}
