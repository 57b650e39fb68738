//! Phone-side push of the medication list to the watch
//!
//! Pushes are best-effort: there is no retry and no acknowledgement. The
//! caller always gets a `SyncOutcome`, never an error, and the phone store
//! is never touched.

use crate::medication::Medication;
use crate::sync::codec::{encode, EncodedPayload, WireFormat};
use crate::sync::transport::{
    DataItem, DataLayer, DataValue, TransportError, FORMAT_KEY, MEDICATION_KEY, MEDICATION_PATH,
    TIMESTAMP_KEY,
};
use crate::watch::WatchMedication;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

/// Configuration for pushing to the watch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Whether pushes are sent at all
    pub enabled: bool,
    /// Encoding used for the payload
    pub format: WireFormat,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: WireFormat::default(),
        }
    }
}

/// Result of one push attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The data layer accepted the item
    Delivered { count: usize },
    /// Nothing to deliver to (sync disabled, watch not paired)
    Unavailable(String),
    /// Encoding failed or the data layer refused the item
    Failed(String),
}

impl SyncOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SyncOutcome::Delivered { .. })
    }
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncOutcome::Delivered { count } => write!(f, "delivered {} medications", count),
            SyncOutcome::Unavailable(reason) => write!(f, "unavailable: {}", reason),
            SyncOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Current state of the sync channel
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Outcome of the most recent push
    pub last_outcome: Option<SyncOutcome>,
    /// Number of push attempts
    pub pushes: u64,
    /// Epoch ms of the last delivered push
    pub last_push_timestamp: Option<i64>,
}

/// Pushes the medication list to paired watches
pub struct WatchSyncChannel {
    layer: Arc<dyn DataLayer>,
    config: SyncConfig,
    state: Arc<RwLock<SyncState>>,
}

impl WatchSyncChannel {
    pub fn new(layer: Arc<dyn DataLayer>, config: SyncConfig) -> Self {
        Self {
            layer,
            config,
            state: Arc::new(RwLock::new(SyncState::default())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn format(&self) -> WireFormat {
        self.config.format
    }

    /// Push the full list, replacing whatever the watch has
    pub async fn push(&self, medications: &[Medication]) -> SyncOutcome {
        let outcome = self.try_push(medications).await;

        match &outcome {
            SyncOutcome::Delivered { count } => {
                tracing::info!(count, format = %self.config.format, "Medications pushed to watch");
            }
            SyncOutcome::Unavailable(reason) => {
                tracing::warn!(reason = %reason, "Watch sync unavailable");
            }
            SyncOutcome::Failed(reason) => {
                tracing::warn!(reason = %reason, "Watch sync failed");
            }
        }

        let mut state = self.state.write().await;
        state.pushes += 1;
        if outcome.is_delivered() {
            state.last_push_timestamp = Some(Utc::now().timestamp_millis());
        }
        state.last_outcome = Some(outcome.clone());

        outcome
    }

    async fn try_push(&self, medications: &[Medication]) -> SyncOutcome {
        if !self.config.enabled {
            return SyncOutcome::Unavailable("sync disabled".to_string());
        }

        let projected: Vec<WatchMedication> =
            medications.iter().map(WatchMedication::from_medication).collect();

        let payload = match encode(self.config.format, &projected) {
            Ok(EncodedPayload::Text(text)) => DataValue::Text(text),
            Ok(EncodedPayload::Bytes(bytes)) => DataValue::Bytes(bytes),
            Err(e) => return SyncOutcome::Failed(e.to_string()),
        };

        let item = DataItem::new(MEDICATION_PATH)
            .with(MEDICATION_KEY, payload)
            .with(TIMESTAMP_KEY, DataValue::Long(Utc::now().timestamp_millis()))
            .with(FORMAT_KEY, DataValue::Text(self.config.format.to_string()));

        match self.layer.put_data_item(item).await {
            Ok(()) => SyncOutcome::Delivered {
                count: projected.len(),
            },
            Err(e @ TransportError::NotPaired) => SyncOutcome::Unavailable(e.to_string()),
            Err(e @ TransportError::Rejected(_)) => SyncOutcome::Failed(e.to_string()),
        }
    }

    /// Push without waiting for the result
    pub fn push_in_background(self: &Arc<Self>, medications: Vec<Medication>) -> JoinHandle<SyncOutcome> {
        let channel = Arc::clone(self);
        tokio::spawn(async move { channel.push(&medications).await })
    }

    /// Push on every change published by `rx`
    ///
    /// The task ends when the sending side is dropped.
    pub fn start_auto_sync(self: Arc<Self>, mut rx: watch::Receiver<Vec<Medication>>) -> JoinHandle<()> {
        if !self.config.enabled {
            tracing::info!("Watch auto-sync disabled");
        }

        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let medications = rx.borrow_and_update().clone();
                tracing::debug!(count = medications.len(), "Medication list changed, pushing");
                self.push(&medications).await;
            }
            tracing::debug!("Medication list closed, auto-sync stopped");
        })
    }

    /// Snapshot of the sync state
    pub async fn status(&self) -> SyncState {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::MedicationStore;
    use crate::sync::codec::decode_any;
    use crate::sync::transport::{DataEventKind, InProcessDataLayer};
    use async_trait::async_trait;
    use chrono::NaiveTime;
    use std::time::Duration;

    struct RejectingLayer;

    #[async_trait]
    impl DataLayer for RejectingLayer {
        async fn put_data_item(&self, _item: DataItem) -> Result<(), TransportError> {
            Err(TransportError::Rejected("quota exceeded".into()))
        }
    }

    fn meds() -> Vec<Medication> {
        vec![
            Medication::new("Amoxicillin", "500mg").at(NaiveTime::from_hms_opt(8, 0, 0).unwrap()),
            Medication::new("Vitamin D", "1000IU"),
        ]
    }

    #[tokio::test]
    async fn test_push_delivers_projection() {
        let layer = Arc::new(InProcessDataLayer::default());
        let mut rx = layer.subscribe();
        let channel = WatchSyncChannel::new(layer.clone(), SyncConfig::default());

        let meds = meds();
        let outcome = channel.push(&meds).await;
        assert_eq!(outcome, SyncOutcome::Delivered { count: 2 });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, DataEventKind::Changed);
        assert_eq!(event.item.path, MEDICATION_PATH);
        assert!(event.item.get(TIMESTAMP_KEY).and_then(|v| v.as_long()).is_some());
        assert_eq!(
            event.item.get(FORMAT_KEY).and_then(|v| v.as_text()),
            Some("framed")
        );

        let decoded = decode_any(event.item.get(MEDICATION_KEY).unwrap()).unwrap();
        assert_eq!(decoded[0].name, "Amoxicillin");
        assert_eq!(decoded[0].time, "8:00 AM");
        assert_eq!(decoded[1].time, "No time");

        let state = channel.status().await;
        assert_eq!(state.pushes, 1);
        assert!(state.last_push_timestamp.is_some());
    }

    #[tokio::test]
    async fn test_delimited_push() {
        let layer = Arc::new(InProcessDataLayer::default());
        let mut rx = layer.subscribe();
        let config = SyncConfig {
            enabled: true,
            format: WireFormat::Delimited,
        };
        let channel = WatchSyncChannel::new(layer, config);

        channel.push(&meds()).await;
        let event = rx.recv().await.unwrap();
        let text = event.item.get(MEDICATION_KEY).and_then(|v| v.as_text()).unwrap();
        assert!(text.contains("Amoxicillin,500mg,8:00 AM,Daily|"));
    }

    #[tokio::test]
    async fn test_unpaired_is_unavailable() {
        let layer = Arc::new(InProcessDataLayer::default());
        let channel = WatchSyncChannel::new(layer, SyncConfig::default());

        let outcome = channel.push(&meds()).await;
        assert!(matches!(outcome, SyncOutcome::Unavailable(_)));

        let state = channel.status().await;
        assert_eq!(state.pushes, 1);
        assert!(state.last_push_timestamp.is_none());
        assert_eq!(state.last_outcome, Some(outcome));
    }

    #[tokio::test]
    async fn test_rejected_is_failed() {
        let channel = WatchSyncChannel::new(Arc::new(RejectingLayer), SyncConfig::default());
        assert!(matches!(channel.push(&meds()).await, SyncOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_disabled() {
        let layer = Arc::new(InProcessDataLayer::default());
        let mut rx = layer.subscribe();
        let config = SyncConfig {
            enabled: false,
            ..Default::default()
        };
        let channel = WatchSyncChannel::new(layer, config);

        assert_eq!(
            channel.push(&meds()).await,
            SyncOutcome::Unavailable("sync disabled".into())
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_push_in_background() {
        let layer = Arc::new(InProcessDataLayer::default());
        let _rx = layer.subscribe();
        let channel = Arc::new(WatchSyncChannel::new(layer, SyncConfig::default()));

        let handle = channel.push_in_background(meds());
        assert_eq!(handle.await.unwrap(), SyncOutcome::Delivered { count: 2 });
    }

    #[tokio::test]
    async fn test_auto_sync_pushes_each_change() {
        let layer = Arc::new(InProcessDataLayer::default());
        let mut rx = layer.subscribe();
        let channel = Arc::new(WatchSyncChannel::new(layer, SyncConfig::default()));
        let store = MedicationStore::new();

        let task = channel.clone().start_auto_sync(store.subscribe());

        let med = Medication::new("Metformin", "500mg");
        let id = med.id.clone();
        store.add(med).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let decoded = decode_any(event.item.get(MEDICATION_KEY).unwrap()).unwrap();
        assert_eq!(decoded.len(), 1);

        store.delete(&id).unwrap();
        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let decoded = decode_any(event.item.get(MEDICATION_KEY).unwrap()).unwrap();
        assert!(decoded.is_empty());

        drop(store);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
