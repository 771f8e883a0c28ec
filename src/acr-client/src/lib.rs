//! AI Code Reviewer client.
//!
//! - [`api`] - HTTP client for `/api/review`, `/api/generate` and `/api/health`
//! - [`history`] - bounded, persisted log of past interactions and its stats
//! - [`views`] - the review and generation forms
//! - [`replay`] - commands that load a history entry back into its form
//! - [`storage`] - key-value storage backing the history
//!
//! # Usage
//!
//! ```rust,no_run
//! use acr_client::{ApiClient, FileStore, HistoryStore, Workspace};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = ApiClient::new("http://localhost:4000");
//!     let mut history = HistoryStore::open(FileStore::default_location()?);
//!
//!     let mut workspace = Workspace::new();
//!     workspace.review.code = "fn main() {}".to_string();
//!     if let Ok(entry) = workspace.review.submit(&api).await {
//!         history.append(entry)?;
//!     }
//!     println!("{}", workspace.review.result);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
pub mod history;
pub mod replay;
pub mod storage;
pub mod views;

pub use api::{ApiClient, DEFAULT_SERVER_URL};
pub use error::{ClientError, Result, StorageError};
pub use history::{EntryKind, HISTORY_KEY, HistoryEntry, HistoryStore, MAX_HISTORY_ENTRIES, Stats};
pub use replay::{ReplayCommand, select};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use views::{GenerateForm, ReviewForm, View, Workspace};
