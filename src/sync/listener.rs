//! Watch-side listener for medication data events

use crate::sync::codec::decode_any;
use crate::sync::transport::{DataEvent, DataEventKind, MEDICATION_KEY, MEDICATION_PATH};
use crate::watch::WatchMedicationStore;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Applies incoming medication data to the watch store
pub struct WatchDataListener {
    store: Arc<WatchMedicationStore>,
}

impl WatchDataListener {
    pub fn new(store: Arc<WatchMedicationStore>) -> Self {
        Self { store }
    }

    /// Handle one event. Returns the number of medications applied, or
    /// `None` if the event was ignored.
    pub fn handle_event(&self, event: &DataEvent) -> Option<usize> {
        if event.kind != DataEventKind::Changed || event.item.path != MEDICATION_PATH {
            tracing::trace!(path = %event.item.path, kind = ?event.kind, "Ignoring data event");
            return None;
        }

        let Some(payload) = event.item.get(MEDICATION_KEY) else {
            tracing::warn!("Medication data item has no payload");
            return None;
        };

        match decode_any(payload) {
            Ok(medications) => {
                let count = medications.len();
                self.store.replace(medications);
                tracing::info!(count, "Received medications from phone");
                Some(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode medication payload");
                None
            }
        }
    }

    /// Apply events until the channel closes
    pub async fn run(self, mut rx: broadcast::Receiver<DataEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    self.handle_event(&event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // The next event carries the full list anyway
                    tracing::warn!(skipped, "Watch listener lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Data layer closed, watch listener stopping");
                    break;
                }
            }
        }
    }

    pub fn spawn(self, rx: broadcast::Receiver<DataEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(rx))
    }
}
