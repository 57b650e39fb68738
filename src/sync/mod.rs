//! Phone to watch synchronization
//!
//! The phone publishes its whole medication list as one data item; the
//! watch replaces its list with whatever arrives. There is no merge, no
//! acknowledgement and no retry.
//!
//! - **codec**: legacy delimited and framed encodings
//! - **transport**: the data layer abstraction and an in-process implementation
//! - **push**: phone-side `WatchSyncChannel`
//! - **listener**: watch-side `WatchDataListener`
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use timelycare::medication::Medication;
//! use timelycare::sync::{InProcessDataLayer, SyncConfig, SyncOutcome, WatchSyncChannel};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let layer = Arc::new(InProcessDataLayer::default());
//! let _watch = layer.subscribe();
//! let channel = WatchSyncChannel::new(layer, SyncConfig::default());
//!
//! let outcome = channel.push(&[Medication::new("Aspirin", "81mg")]).await;
//! assert_eq!(outcome, SyncOutcome::Delivered { count: 1 });
//! # }
//! ```

pub mod codec;
pub mod listener;
pub mod push;
pub mod transport;

pub use codec::{
    decode_any, decode_delimited, decode_framed, encode, encode_delimited, encode_framed,
    CodecError, EncodedPayload, WireFormat,
};
pub use listener::WatchDataListener;
pub use push::{SyncConfig, SyncOutcome, SyncState, WatchSyncChannel};
pub use transport::{
    DataEvent, DataEventKind, DataItem, DataLayer, DataMap, DataValue, InProcessDataLayer,
    TransportError, MEDICATION_PATH,
};
