//! Core identity and naming types.
//!
//! These types enforce their invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod cdn_url;
mod cursor;
mod node_id;
mod type_prefix;

pub use cdn_url::CdnUrl;
pub use cursor::{SyncCursor, cursor_key};
pub use node_id::NodeId;
pub use type_prefix::TypePrefix;
