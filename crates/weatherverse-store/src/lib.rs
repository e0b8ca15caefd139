//! In-memory readings store for the WeatherVerse station.
//!
//! The store holds either a single "latest reading" slot or a bounded,
//! insertion-ordered history with oldest-first eviction. Nothing is persisted:
//! the store is scoped to the lifetime of the process that owns it.
//!
//! # Example
//!
//! ```
//! use weatherverse_store::Store;
//!
//! let mut store = Store::with_history(24)?;
//! store.record_reading(26.0, 40.0, None);
//!
//! let latest = store.latest().expect("just recorded");
//! assert_eq!(latest.temperature(), 26.0);
//! assert_eq!(store.history().len(), 1);
//! # Ok::<(), weatherverse_store::Error>(())
//! ```

mod error;
mod mode;
mod store;

pub use error::{Error, Result};
pub use mode::{StoreKind, StoreMode};
pub use store::{Store, StoreStats};
