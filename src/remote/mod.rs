//! Client for the per-account remote document store.

mod client;
mod types;

pub use client::RemoteClient;
pub use types::RemoteDocument;
