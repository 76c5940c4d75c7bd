//! # printrate_store - Settings persistence for printrate
//!
//! A small string-keyed store abstraction with two backends, plus the
//! settings layer that loads [`RateSettings`](printrate_core::RateSettings)
//! by merging a persisted blob onto defaults.
//!
//! ## Example
//!
//! ```rust
//! use printrate_store::{MemoryStore, SettingsStore, SETTINGS_KEY};
//!
//! let settings = SettingsStore::new(MemoryStore::new());
//! let loaded = settings.load(SETTINGS_KEY);
//! assert_eq!(loaded.currency_unit, "₹");
//! ```

pub mod error;
pub mod file;
pub mod memory;
pub mod settings_store;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use settings_store::{Payee, SettingsStore, PAYEE_HANDLE_KEY, PAYEE_NAME_KEY, SETTINGS_KEY};
pub use store::KeyValueStore;
