use std::{fs::File, path::Path};

use csv::Writer;
use serde::Serialize;

use crate::{
    error::{Result, SocialError},
    network::SocialNetwork,
};

/// One row of the per-user report.
#[derive(Debug, Serialize)]
struct UserRow {
    pub username: String,
    pub followers: usize,
    pub following: usize,
    pub posts: usize,
    pub popularity: u32,
    pub friendliness: f64,
    pub category: String,
}

/// Collects per-user statistics of a network and writes them as CSV.
pub struct NetworkLogger {
    rows: Vec<UserRow>,
}

impl NetworkLogger {
    pub fn new() -> Self {
        NetworkLogger { rows: Vec::new() }
    }

    /// Adds one row per user, in graph list order. Call `refresh_profiles` first for current
    /// friendliness values.
    pub fn add_network(&mut self, network: &SocialNetwork) {
        for handle in network.graph().users() {
            let Some(node) = network.graph().get(handle) else {
                continue;
            };
            let user = &node.record;
            self.rows.push(UserRow {
                username: user.username.clone(),
                followers: node.num_followers(),
                following: node.num_following(),
                posts: user.posts.len(),
                popularity: user.popularity,
                friendliness: user.friendliness,
                category: user.category.clone(),
            });
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_to_csv(&self, file_path: &Path) -> Result<()> {
        let file = File::create(file_path).map_err(|e| SocialError::io(e, file_path))?;
        let mut writer = Writer::from_writer(file);

        for row in &self.rows {
            writer.serialize(row)?;
        }

        writer.flush().map_err(|e| SocialError::io(e, file_path))?;
        Ok(())
    }
}

impl Default for NetworkLogger {
    fn default() -> Self {
        NetworkLogger::new()
    }
}
