//! Checkpoint module
//!
//! Persists feed continuations between runs so a reader can resume where
//! it stopped.
//!
//! # Overview
//!
//! - `Checkpoints` - serialized `{feeds: {name: {continuation, updated_at}}}`
//! - `CheckpointStore` - file-backed or in-memory persistence

mod store;
mod types;

pub use store::CheckpointStore;
pub use types::{Checkpoints, FeedCheckpoint};
