use serde::{Deserialize, Serialize};

use super::Post;

/// Everything the persistence layer stores for one user.
///
/// Edge weights are deliberately absent: they are derived again from the interests when a network
/// is rebuilt from snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: u32,
    pub username: String,
    pub password: String,
    pub name: String,
    pub popularity: u32,
    pub friendliness: f64,
    pub category: String,
    pub interest_flags: Vec<bool>,
    /// Newest first.
    pub posts: Vec<Post>,
    /// Most recently added edge first.
    pub follower_names: Vec<String>,
    /// Most recently added edge first.
    pub following_names: Vec<String>,
}
