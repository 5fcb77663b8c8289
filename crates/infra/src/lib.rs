//! Infrastructure layer: local store, configuration, and the `Book` service.

pub mod book;
pub mod change;
pub mod collections;
pub mod config;
pub mod settings;
pub mod store;


pub use book::{Book, BookError, BookResult, SavedInvoice};
pub use change::{Change, ChangeLog, ChangeSink, DiscardChanges};
pub use collections::{Collection, SETTINGS_KEY};
pub use config::AppConfig;
pub use settings::Settings;
pub use store::{InMemoryStore, LocalStore, SqliteStore, StoreError};
