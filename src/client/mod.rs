//! Tracking-client capability.
//!
//! The forwarder never talks to the network itself. It connects a fresh
//! [`Tracker`] per event through a [`TrackerConnector`], configures it, then
//! calls `identify` and `track`. [`WoopraConnector`] is the HTTP adapter used
//! in production; tests substitute their own implementations.

mod woopra;

use async_trait::async_trait;
use std::time::Duration;

use crate::events::{Event, UserProperties};
use crate::types::Result;

pub use woopra::{WoopraConnector, WoopraTracker};

/// A per-event tracking session against the analytics service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Track over https when `true`.
    fn set_secure(&mut self, secure: bool);

    /// Idle time after which the service marks the visit offline.
    fn set_idle_timeout(&mut self, timeout: Duration);

    /// Attach visitor properties to this session.
    async fn identify(&mut self, properties: &UserProperties) -> Result<()>;

    /// Send one named event with its payload.
    async fn track(&mut self, event_name: &str, event: &Event) -> Result<()>;
}

/// Opens tracking sessions for a destination.
#[cfg_attr(test, mockall::automock)]
pub trait TrackerConnector: Send + Sync {
    fn connect(&self, url: &str) -> Result<Box<dyn Tracker>>;
}
