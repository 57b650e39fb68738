//! Data-layer transport between phone and watch
//!
//! The platform data layer is modelled as "put a data item at a path";
//! paired devices observe change events for that path. `InProcessDataLayer`
//! backs this with a tokio broadcast channel so both sides can run in one
//! process.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::broadcast;

/// Path the medication list is published under
pub const MEDICATION_PATH: &str = "/medication_data";
/// Data map key for the encoded list
pub const MEDICATION_KEY: &str = "medications";
/// Data map key for the push time (epoch ms)
pub const TIMESTAMP_KEY: &str = "timestamp";
/// Data map key naming the codec used
pub const FORMAT_KEY: &str = "format";

/// A value in a data item's map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataValue {
    Text(String),
    Bytes(Vec<u8>),
    Long(i64),
}

impl DataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            DataValue::Long(v) => Some(*v),
            _ => None,
        }
    }
}

pub type DataMap = BTreeMap<String, DataValue>;

/// A keyed blob published at a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataItem {
    pub path: String,
    pub data: DataMap,
}

impl DataItem {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: DataMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: DataValue) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.data.get(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEventKind {
    Changed,
    Deleted,
}

/// Change notification delivered to listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEvent {
    pub kind: DataEventKind,
    pub item: DataItem,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("No paired device")]
    NotPaired,

    #[error("Data item rejected: {0}")]
    Rejected(String),
}

/// Publishes data items to paired devices
#[async_trait]
pub trait DataLayer: Send + Sync {
    async fn put_data_item(&self, item: DataItem) -> Result<(), TransportError>;
}

/// Data layer inside a single process
pub struct InProcessDataLayer {
    tx: broadcast::Sender<DataEvent>,
    paired: AtomicBool,
}

impl InProcessDataLayer {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            paired: AtomicBool::new(true),
        }
    }

    /// Simulate pairing or unpairing the watch
    pub fn set_paired(&self, paired: bool) {
        self.paired.store(paired, Ordering::SeqCst);
        tracing::info!(paired, "Watch pairing changed");
    }

    pub fn is_paired(&self) -> bool {
        self.paired.load(Ordering::SeqCst)
    }

    /// Receive every data event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.tx.subscribe()
    }

    /// Publish a deletion for `path`
    pub fn delete_data_item(&self, path: &str) -> Result<(), TransportError> {
        self.publish(DataEvent {
            kind: DataEventKind::Deleted,
            item: DataItem::new(path),
        })
    }

    fn publish(&self, event: DataEvent) -> Result<(), TransportError> {
        if !self.is_paired() {
            return Err(TransportError::NotPaired);
        }
        // send() only fails when nobody is listening
        self.tx
            .send(event)
            .map(|receivers| {
                tracing::trace!(receivers, "Data event published");
            })
            .map_err(|_| TransportError::NotPaired)
    }
}

impl Default for InProcessDataLayer {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl DataLayer for InProcessDataLayer {
    async fn put_data_item(&self, item: DataItem) -> Result<(), TransportError> {
        if item.path.is_empty() || !item.path.starts_with('/') {
            return Err(TransportError::Rejected(format!(
                "invalid path '{}'",
                item.path
            )));
        }
        self.publish(DataEvent {
            kind: DataEventKind::Changed,
            item,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> DataItem {
        DataItem::new(MEDICATION_PATH)
            .with(MEDICATION_KEY, DataValue::Text("1,A,1mg,No time,Daily".into()))
            .with(TIMESTAMP_KEY, DataValue::Long(42))
    }

    #[tokio::test]
    async fn test_put_reaches_subscriber() {
        let layer = InProcessDataLayer::default();
        let mut rx = layer.subscribe();

        layer.put_data_item(item()).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, DataEventKind::Changed);
        assert_eq!(event.item, item());
        assert_eq!(event.item.get(TIMESTAMP_KEY).and_then(|v| v.as_long()), Some(42));
    }

    #[tokio::test]
    async fn test_no_subscriber_is_not_paired() {
        let layer = InProcessDataLayer::default();
        assert_eq!(
            layer.put_data_item(item()).await,
            Err(TransportError::NotPaired)
        );
    }

    #[tokio::test]
    async fn test_unpaired() {
        let layer = InProcessDataLayer::default();
        let _rx = layer.subscribe();
        layer.set_paired(false);

        assert_eq!(
            layer.put_data_item(item()).await,
            Err(TransportError::NotPaired)
        );

        layer.set_paired(true);
        assert!(layer.put_data_item(item()).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_path_rejected() {
        let layer = InProcessDataLayer::default();
        let _rx = layer.subscribe();
        let result = layer.put_data_item(DataItem::new("medication_data")).await;
        assert!(matches!(result, Err(TransportError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_delete_event() {
        let layer = InProcessDataLayer::default();
        let mut rx = layer.subscribe();
        layer.delete_data_item(MEDICATION_PATH).unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, DataEventKind::Deleted);
        assert_eq!(event.item.path, MEDICATION_PATH);
    }
}
