use tracing::debug;

use crate::{
    config::NetworkConfig,
    data::InterestCatalog,
    data_structures::ranking_heap::MinRankingHeap,
    error::{Result, SocialError},
    graph::{SocialGraph, UserHandle},
    network::UserDirectory,
};

use super::{insert_or_drop, RankedSequence, Suggestions};

/// A user proposed as a new friend.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub handle: UserHandle,
    pub username: String,
    pub display_name: String,
    pub shared_interests: Vec<String>,
}

/// Ranks candidate friends, closest first.
pub struct SuggestionBuilder<'a> {
    directory: &'a UserDirectory,
    graph: &'a SocialGraph,
    catalog: &'a InterestCatalog,
    config: &'a NetworkConfig,
}

impl<'a> SuggestionBuilder<'a> {
    pub fn new(
        directory: &'a UserDirectory,
        graph: &'a SocialGraph,
        catalog: &'a InterestCatalog,
        config: &'a NetworkConfig,
    ) -> Self {
        SuggestionBuilder {
            directory,
            graph,
            catalog,
            config,
        }
    }

    fn candidate(&self, user: UserHandle, handle: UserHandle) -> Option<Candidate> {
        let me = self.graph.record(user)?;
        let other = self.graph.record(handle)?;
        Some(Candidate {
            handle,
            username: other.username.clone(),
            display_name: other.display_name.clone(),
            shared_interests: self.catalog.shared_names(&me.interests, &other.interests),
        })
    }

    /// Every other user whose interest distance to `user` is below the configured maximum,
    /// most similar first.
    pub fn by_interests(&self, user: UserHandle) -> Result<Suggestions> {
        if !self.graph.contains(user) {
            return Err(SocialError::StaleHandle);
        }
        let mut heap = MinRankingHeap::with_capacity(self.config.heap_capacity)?;

        for (username, &handle) in self.directory.iter() {
            if handle == user {
                continue;
            }
            let Some(distance) = self.graph.affinity(user, handle) else {
                continue;
            };
            if distance >= self.config.suggestion_max_distance {
                continue;
            }
            if let Some(candidate) = self.candidate(user, handle) {
                insert_or_drop(&mut heap, username, distance, candidate)?;
            }
        }

        debug!(candidates = heap.len(), "interest suggestions built");
        Ok(RankedSequence::new(heap))
    }

    /// Every user reachable from `user` through the follow graph, nearest first.
    pub fn by_graph_distance(&self, user: UserHandle) -> Result<Suggestions> {
        let table = self.graph.dijkstra(user)?;
        let mut heap = MinRankingHeap::with_capacity(self.config.heap_capacity)?;

        for (handle, distance) in table.reachable() {
            if let Some(candidate) = self.candidate(user, handle) {
                let owner = candidate.username.clone();
                insert_or_drop(&mut heap, &owner, distance, candidate)?;
            }
        }

        debug!(candidates = heap.len(), "graph suggestions built");
        Ok(RankedSequence::new(heap))
    }
}

#[cfg(test)]
mod tests {
    use crate::{network::SocialNetwork, test_utils::sample_network};

    use super::*;

    fn builder(network: &SocialNetwork) -> SuggestionBuilder<'_> {
        SuggestionBuilder::new(
            network.directory(),
            network.graph(),
            network.catalog(),
            network.config(),
        )
    }

    #[test]
    fn test_interest_suggestions_most_similar_first() {
        let network = sample_network();
        let alice = network.lookup_user("alice").unwrap();
        let suggestions = builder(&network).by_interests(alice).unwrap();

        let ranked: Vec<(String, f64)> = suggestions
            .map(|item| (item.owner, item.priority))
            .collect();
        // bob shares 2 of 3, carol 1 of 3, dave nothing.
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, "bob");
        assert!((ranked[0].1 - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(ranked[1].0, "carol");
    }

    #[test]
    fn test_interest_suggestions_report_shared_interests() {
        let network = sample_network();
        let alice = network.lookup_user("alice").unwrap();
        let mut suggestions = builder(&network).by_interests(alice).unwrap();

        let best = suggestions.next_item().unwrap();
        assert_eq!(best.payload.shared_interests, vec!["music", "travel"]);
    }

    #[test]
    fn test_graph_suggestions_nearest_first() {
        let network = sample_network();
        let alice = network.lookup_user("alice").unwrap();
        let suggestions = builder(&network).by_graph_distance(alice).unwrap();

        let owners: Vec<String> = suggestions.map(|item| item.owner).collect();
        assert!(!owners.contains(&"alice".to_string()));
        assert_eq!(owners, vec!["bob", "carol"]);
    }
}
