//! # Woopra Tracking - event-tracking backend for woopra.com
//!
//! Receives analytics events from an upstream tracking pipeline and forwards
//! them to Woopra:
//! - Gating on destination, username, event name and a blacklist
//! - Visitor properties derived per event (settings changes, progress
//!   summaries, course starts)
//! - Page-path events rewritten into Woopra page views
//! - HTTP transport through a pluggable tracking-client capability
//!
//! ## Flow
//!
//! ```text
//!   event record ─→ WoopraBackend::process
//!                     │ gate (url, username, name, blacklist)
//!                     │ build user properties
//!                     │ page-view rewrite
//!                     ↓
//!                   TrackerConnector::connect(url) ─→ Tracker
//!                     identify(user properties)
//!                     track(event name, record)
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod backend;
pub mod client;
pub mod events;
pub mod relay;
pub mod types;

// Internal utilities
pub mod observability;

pub use backend::{Backend, WoopraBackend, DEFAULT_EVENT_BLACK_LIST};
pub use client::{Tracker, TrackerConnector, WoopraConnector};
pub use events::Event;
pub use relay::{relay, RelayStats};
pub use types::{Config, Error, Result, WoopraConfig};
