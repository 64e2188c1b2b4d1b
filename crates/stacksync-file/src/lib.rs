//! stacksync-file - Filesystem-backed node store.

mod store;

pub use store::{FileStore, JournalEntry, JournalOp};
