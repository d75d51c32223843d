use std::collections::HashMap;

use tracing::debug;

use crate::{
    config::NetworkConfig,
    data::Post,
    data_structures::ranking_heap::MaxRankingHeap,
    error::{Result, SocialError},
    graph::{SocialGraph, UserHandle},
};

use super::{insert_or_drop, Feed, RankedSequence};

/// A post as it appears in somebody's feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPost {
    pub author: String,
    pub author_name: String,
    pub post: Post,
}

/// The newest post of each author every reader has already been shown.
///
/// Cursors hold post sequence numbers rather than counts, so deleting posts never shifts what is
/// considered unread.
#[derive(Debug, Default)]
pub struct FeedCursors {
    delivered: HashMap<(UserHandle, UserHandle), u64>,
}

impl FeedCursors {
    pub fn new() -> Self {
        FeedCursors::default()
    }

    /// Sequence number of the newest post of `author` delivered to `reader`.
    pub fn delivered(&self, reader: UserHandle, author: UserHandle) -> Option<u64> {
        self.delivered.get(&(reader, author)).copied()
    }

    fn mark_delivered(&mut self, reader: UserHandle, author: UserHandle, seq: u64) {
        let entry = self.delivered.entry((reader, author)).or_insert(seq);
        *entry = (*entry).max(seq);
    }

    /// Forgets what `reader` has seen, so the next feed replays everything.
    pub fn reset(&mut self, reader: UserHandle) {
        self.delivered.retain(|&(r, _), _| r != reader);
    }

    /// Drops every cursor involving `user`, as reader or as author.
    pub fn forget(&mut self, user: UserHandle) {
        self.delivered.retain(|&(r, a), _| r != user && a != user);
    }
}

pub struct FeedBuilder<'a> {
    graph: &'a SocialGraph,
    config: &'a NetworkConfig,
}

impl<'a> FeedBuilder<'a> {
    pub fn new(graph: &'a SocialGraph, config: &'a NetworkConfig) -> Self {
        FeedBuilder { graph, config }
    }

    /// Priority of the post at position `position` (0 = newest) of an author followed through an
    /// edge of weight `weight`.
    pub fn priority(&self, weight: f64, popularity: u32, position: usize) -> f64 {
        self.config.affinity_weight * (1.0 - weight)
            + self.config.popularity_weight * (1.0 + popularity as f64).ln()
            + self.config.recency_weight / (1.0 + position as f64)
    }

    /// Ranks every unread post of the users `reader` follows and marks them as delivered.
    pub fn build(&self, reader: UserHandle, cursors: &mut FeedCursors) -> Result<Feed> {
        let node = self.graph.get(reader).ok_or(SocialError::StaleHandle)?;
        let mut heap = MaxRankingHeap::with_capacity(self.config.heap_capacity)?;

        for edge in node.following() {
            let Some(author) = self.graph.record(edge.destination) else {
                continue;
            };

            let seen = cursors.delivered(reader, edge.destination);
            for (position, post) in author.posts.newer_than(seen).enumerate() {
                let priority = self.priority(edge.weight, author.popularity, position);
                insert_or_drop(
                    &mut heap,
                    &author.username,
                    priority,
                    FeedPost {
                        author: author.username.clone(),
                        author_name: author.display_name.clone(),
                        post: post.clone(),
                    },
                )?;
            }
            if let Some(newest) = author.posts.newest_seq() {
                cursors.mark_delivered(reader, edge.destination, newest);
            }
        }

        debug!(
            reader = %node.record.username,
            posts = heap.len(),
            dropped = heap.dropped(),
            "feed built"
        );
        Ok(RankedSequence::new(heap))
    }
}
