//! State layer for a memo board: memos, categories and background
//! preferences, persisted slot by slot into a key-value store.
//!
//! `MemoBoard` is the entry point. It loads every slot on construction,
//! falling back to seed data for anything missing or unreadable, and writes
//! the touched slots back after each mutation.

pub mod background;
pub mod backend;
pub mod categories;
pub mod config;
pub mod db;
pub mod filter;
pub mod memos;
pub mod models;
pub mod seed;
pub mod upload;

pub use backend::{BackendError, MemoBoard, UploadReport};
pub use config::{BoardConfig, UploadLimits};
pub use db::{KeyValueStore, MemoryStore, Persistence, SqliteStore};
pub use filter::ViewMode;
pub use models::{CategoryFilter, ImagePlaceholder, Language, Memo, MemoDraft, MemoIcon};
pub use upload::UploadTarget;
