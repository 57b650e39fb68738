//! TimelyCare Preference Storage
//!
//! Key-value storage the phone and watch halves persist through:
//!
//! - **types**: `PrefValue` and the `PreferenceStore` trait
//! - **memory**: process-local backend
//! - **json_file**: one JSON document per namespace
//! - **sqlite**: one SQLite table per namespace
//! - **open**: backend selection and file layout
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use timelycare::storage::{PrefsBackend, StorageConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StorageConfig::new("./data").backend(PrefsBackend::Sqlite);
//!     let prefs = config.open("phone")?;
//!
//!     prefs.put_bool("dark_mode", true)?;
//!     assert_eq!(prefs.get_bool("dark_mode")?, Some(true));
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod json_file;
pub mod memory;
pub mod open;
pub mod sqlite;
pub mod types;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use json_file::JsonFilePreferences;
pub use memory::MemoryPreferences;
pub use open::StorageConfig;
pub use sqlite::SqlitePreferences;
pub use types::{PrefValue, PreferenceStore, PrefsBackend};
