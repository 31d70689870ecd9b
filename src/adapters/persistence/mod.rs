//! Persistence Adapters - JSONL-based File Storage
//!
//! Implements the `TagStore` port on append-only JSONL files.
//! No database dependency.

pub mod tag_store;

pub use tag_store::JsonlTagStore;
