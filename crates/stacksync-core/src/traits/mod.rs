//! Collaborator traits: the host store, the remote fetcher, identity and digest.

mod fetch;
mod ids;
mod store;

pub use fetch::Fetcher;
pub use ids::{ContentDigester, IdFactory, Sha256Digest, Uuid5Ids};
pub use store::{NodeStore, SchemaSink, StatusStore};
