//! Replay of queued requests
//!
//! A replay pass walks the queue head-first and delivers one entry at a time:
//! - Each entry is resolved to a URL and POSTed with its stored payload
//! - A 2xx response deletes the entry and the pass moves on
//! - Anything else halts the pass; the failing entry and its successors stay
//!   queued, so the next pass retries from the same place
//!
//! Delivery is strictly sequential. Concurrent sends would break the
//! stop-on-first-failure ordering guarantee.

mod replayer;
mod transport;

use thiserror::Error;

use crate::config::{EndpointConfig, RelayConfig};
use crate::db::Database;
use crate::endpoint::{EndpointResolver, UnroutableDestination};
use crate::error::Result;
use crate::types::PassReport;

pub use replayer::Replayer;
pub use transport::{HttpTransport, Transport};

/// Why an entry could not be delivered
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// No base URL for the destination's category
    #[error(transparent)]
    Unroutable(#[from] UnroutableDestination),

    /// The backend answered outside the 2xx range
    #[error("HTTP error {0}")]
    Status(u16),

    /// Connection refused, DNS failure, timeout, and similar
    #[error("{0}")]
    Transport(String),
}

/// Run one replay pass against the configured HTTP endpoints
///
/// `Err` means a storage fault; delivery failures are reported through
/// [`crate::PassOutcome::Halted`].
pub fn run_replay_pass(
    db: &Database,
    endpoints: &EndpointConfig,
    relay: &RelayConfig,
) -> Result<PassReport> {
    let transport = HttpTransport::new(relay)?;
    let replayer = Replayer::new(db, EndpointResolver::new(endpoints.clone()), transport);
    replayer.run_pass()
}
