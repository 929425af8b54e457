//! Line relay — newline-delimited JSON events → [`Backend`].
//!
//! Each input line is one event record. Blank lines are ignored, lines that
//! are not JSON objects are logged and skipped, and a failed forward does not
//! stop the relay.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::events::Event;
use crate::types::Result;

/// Counters for one relay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Events handed to the backend without error (suppressed ones included).
    pub sent: usize,
    /// Lines that were not JSON objects.
    pub skipped: usize,
    /// Events the backend returned an error for.
    pub failed: usize,
}

/// Feed every event line of `input` to `backend` until end of input.
///
/// Only read errors on `input` abort the relay.
pub async fn relay<R>(backend: &dyn Backend, input: R) -> Result<RelayStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = RelayStats::default();
    let mut lines = input.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let event: Event = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                warn!(line = line_no, error = %err, "skipping line that is not a JSON object");
                stats.skipped += 1;
                continue;
            }
        };

        // the backend already logged the failure itself
        match backend.send(&event).await {
            Ok(()) => stats.sent += 1,
            Err(_) => {
                debug!(line = line_no, "event not forwarded, continuing");
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}
