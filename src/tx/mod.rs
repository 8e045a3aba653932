//! Submitted transactions and their settlement

pub mod store;
pub mod watcher;

pub use store::{Popup, TransactionStore};
pub use watcher::{TransactionEvent, TransactionWatcher};
