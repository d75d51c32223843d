pub mod config;
pub mod data;
pub mod data_structures;
pub mod error;
pub mod graph;
pub mod network;
pub mod persistence;
pub mod ranking;
pub mod report;

#[cfg(test)]
mod test_utils;

pub use config::NetworkConfig;
pub use data::{InterestCatalog, Post, UserRecord, UserSnapshot};
pub use error::{Result, SocialError};
pub use graph::{SocialGraph, TraversalMode, UserHandle};
pub use network::SocialNetwork;
pub use persistence::{DirectoryStore, MemoryStore, SnapshotStore};
