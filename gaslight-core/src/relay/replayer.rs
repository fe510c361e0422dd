//! Ordered replay pass

use crate::db::Database;
use crate::endpoint::EndpointResolver;
use crate::error::Result;
use crate::types::{Entry, PassOutcome, PassReport};

use super::{DeliveryError, Transport};

/// Drains the queue through a [`Transport`]
///
/// The replayer is the only component that deletes entries, and it only does
/// so after the transport reported a 2xx status for that entry.
pub struct Replayer<'a, T> {
    db: &'a Database,
    resolver: EndpointResolver,
    transport: T,
}

impl<'a, T: Transport> Replayer<'a, T> {
    pub fn new(db: &'a Database, resolver: EndpointResolver, transport: T) -> Self {
        Self {
            db,
            resolver,
            transport,
        }
    }

    /// Run one pass over the entries queued right now
    ///
    /// Entries are delivered in ascending id order. The first failure halts
    /// the pass with the failing entry left in place. Entries appended while
    /// the pass runs wait for the next pass.
    pub fn run_pass(&self) -> Result<PassReport> {
        let span = tracing::info_span!("replay_pass");
        let _enter = span.enter();

        let entries = self.db.entries()?;
        tracing::info!(queued = entries.len(), "Starting replay pass");

        let mut processed = 0;

        for entry in entries {
            if let Err(reason) = self.deliver(&entry) {
                tracing::warn!(
                    id = %entry.id,
                    destination = %entry.destination,
                    processed,
                    error = %reason,
                    "Replay pass halted"
                );
                return Ok(PassReport {
                    processed,
                    outcome: PassOutcome::Halted {
                        entry_id: entry.id,
                        reason,
                    },
                });
            }

            processed += 1;
            self.db.remove(entry.id)?;
        }

        tracing::info!(processed, "Replay pass complete");

        Ok(PassReport {
            processed,
            outcome: PassOutcome::Succeeded,
        })
    }

    fn deliver(&self, entry: &Entry) -> std::result::Result<(), DeliveryError> {
        let url = self.resolver.resolve(&entry.destination)?;

        let status = self.transport.deliver(&url, &entry.payload)?;
        if !(200..300).contains(&status) {
            return Err(DeliveryError::Status(status));
        }

        tracing::debug!(id = %entry.id, url = %url, status, "Delivered entry");
        Ok(())
    }
}
