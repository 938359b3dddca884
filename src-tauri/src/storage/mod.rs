//! Key-value persistence through tauri-plugin-store.
//!
//! Each store is a JSON file in the app data directory and is saved right after
//! every write.

pub mod history;
pub mod settings;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store error: {0}")]
    Store(#[from] tauri_plugin_store::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
