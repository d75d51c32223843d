use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::{
    config::NetworkConfig,
    data::{InterestCatalog, InterestVector, Post, UserRecord, UserSnapshot},
    data_structures::hash_table::HashTable,
    error::{Result, SocialError},
    graph::{DistanceTable, SocialGraph, TraversalMode, UserHandle},
    persistence::SnapshotStore,
    ranking::{Feed, FeedBuilder, FeedCursors, SuggestionBuilder, Suggestions},
};

/// Username to user lookup.
pub type UserDirectory = HashTable<UserHandle>;

pub const CATEGORY_BUTTERFLY: &str = "Social butterfly";
pub const CATEGORY_FRIENDLY: &str = "Friendly";
pub const CATEGORY_RESERVED: &str = "Reserved";
pub const CATEGORY_LONER: &str = "Loner";

/// One independent social network: its interest catalog, user directory and follower graph.
///
/// Every mutation goes through this type so that the directory and the graph always agree on the
/// set of users.
pub struct SocialNetwork {
    catalog: InterestCatalog,
    config: NetworkConfig,
    directory: UserDirectory,
    graph: SocialGraph,
    cursors: FeedCursors,
}

impl SocialNetwork {
    pub fn new(catalog: InterestCatalog, config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        Ok(SocialNetwork {
            directory: HashTable::new(config.bucket_count),
            graph: SocialGraph::new(),
            cursors: FeedCursors::new(),
            catalog,
            config,
        })
    }

    pub fn catalog(&self) -> &InterestCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn graph(&self) -> &SocialGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn create_user(
        &mut self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserHandle> {
        validate_username(username)?;
        if self.directory.contains_key(username) {
            return Err(SocialError::DuplicateKey(username.to_string()));
        }

        let record = UserRecord::new(username, password, display_name, self.catalog.empty_vector());
        let handle = self.graph.add_user(record);
        if let Err(e) = self.directory.insert(username, handle) {
            self.graph.remove_user(handle)?;
            return Err(e);
        }

        info!(username, users = self.graph.len(), "user created");
        Ok(handle)
    }

    /// Removes the user from the directory and the graph, dropping all of their edges.
    pub fn delete_user(&mut self, handle: UserHandle) -> Result<UserRecord> {
        let username = self
            .graph
            .record(handle)
            .ok_or(SocialError::StaleHandle)?
            .username
            .clone();

        self.directory.remove(&username);
        self.cursors.forget(handle);
        let record = self.graph.remove_user(handle)?;

        info!(username, users = self.graph.len(), "user deleted");
        Ok(record)
    }

    pub fn lookup_user(&self, username: &str) -> Option<UserHandle> {
        self.directory.get(username).copied()
    }

    pub fn user(&self, handle: UserHandle) -> Option<&UserRecord> {
        self.graph.record(handle)
    }

    fn user_mut(&mut self, handle: UserHandle) -> Result<&mut UserRecord> {
        self.graph.record_mut(handle).ok_or(SocialError::StaleHandle)
    }

    /// The user's handle if `password` matches.
    pub fn login(&self, username: &str, password: &str) -> Option<UserHandle> {
        let handle = self.lookup_user(username)?;
        self.user(handle)?
            .check_password(password)
            .then_some(handle)
    }

    /// `a` starts following `b`. Following someone already followed changes nothing.
    pub fn follow(&mut self, a: UserHandle, b: UserHandle) -> Result<()> {
        if !self.graph.add_edge(a, b)? {
            debug!("follow ignored, edge already present");
        }
        Ok(())
    }

    /// Returns whether an edge was removed.
    pub fn unfollow(&mut self, a: UserHandle, b: UserHandle) -> bool {
        let removed = self.graph.remove_edge(a, b);
        debug!(removed, "unfollow");
        removed
    }

    /// Marks `topic` as an interest of the user.
    ///
    /// Weights of edges that already exist are left as they were computed when the edge was
    /// created; only new edges see the updated interests.
    pub fn add_interest(&mut self, handle: UserHandle, topic: &str) -> Result<()> {
        let index = self
            .catalog
            .index_of(topic)
            .ok_or_else(|| SocialError::UnknownInterest(topic.to_string()))?;
        self.user_mut(handle)?.interests.set(index)
    }

    pub fn publish_post(&mut self, handle: UserHandle, content: &str) -> Result<u32> {
        let user = self.user_mut(handle)?;
        let id = user.posts.publish(content).id;
        debug!(username = %user.username, post = id, "post published");
        Ok(id)
    }

    pub fn publish_post_at(
        &mut self,
        handle: UserHandle,
        content: &str,
        date: NaiveDateTime,
    ) -> Result<u32> {
        Ok(self.user_mut(handle)?.posts.publish_at(content, date).id)
    }

    pub fn delete_post(&mut self, handle: UserHandle, id: u32) -> Result<Post> {
        self.user_mut(handle)?
            .posts
            .remove(id)
            .ok_or_else(|| SocialError::NotFound(format!("post {}", id)))
    }

    pub fn find_post(&self, handle: UserHandle, id: u32) -> Option<&Post> {
        self.user(handle)?.posts.find(id)
    }

    /// Raises the user's popularity by one and returns the new value.
    pub fn like_user(&mut self, handle: UserHandle) -> Result<u32> {
        let user = self.user_mut(handle)?;
        user.popularity = user.popularity.saturating_add(1);
        Ok(user.popularity)
    }

    /// Ranks the unread posts of everyone `handle` follows. Posts handed out here are not
    /// included again in the next feed of the same user.
    pub fn build_feed(&mut self, handle: UserHandle) -> Result<Feed> {
        FeedBuilder::new(&self.graph, &self.config).build(handle, &mut self.cursors)
    }

    pub fn reset_feed(&mut self, handle: UserHandle) {
        self.cursors.reset(handle);
    }

    pub fn build_interest_suggestions(&self, handle: UserHandle) -> Result<Suggestions> {
        self.suggestions().by_interests(handle)
    }

    pub fn build_graph_suggestions(&self, handle: UserHandle) -> Result<Suggestions> {
        self.suggestions().by_graph_distance(handle)
    }

    fn suggestions(&self) -> SuggestionBuilder<'_> {
        SuggestionBuilder::new(&self.directory, &self.graph, &self.catalog, &self.config)
    }

    pub fn shortest_distances(&self, handle: UserHandle) -> Result<DistanceTable> {
        self.graph.dijkstra(handle)
    }

    pub fn traverse(&self, handle: UserHandle, mode: TraversalMode) -> Result<Vec<UserHandle>> {
        Ok(self.graph.traverse(handle, mode)?.collect())
    }

    /// `(followers + following) / (2 * (n - 1))` for a network of `n` users.
    pub fn friendliness(&self, handle: UserHandle) -> Option<f64> {
        let node = self.graph.get(handle)?;
        let others = self.graph.len().saturating_sub(1);
        if others == 0 {
            return Some(0.0);
        }
        let degree = node.num_followers() + node.num_following();
        Some(degree as f64 / (2 * others) as f64)
    }

    pub fn category(&self, friendliness: f64) -> &'static str {
        if friendliness >= self.config.butterfly_threshold {
            CATEGORY_BUTTERFLY
        } else if friendliness >= self.config.friendly_threshold {
            CATEGORY_FRIENDLY
        } else if friendliness > 0.0 {
            CATEGORY_RESERVED
        } else {
            CATEGORY_LONER
        }
    }

    /// Recomputes friendliness and category of every user from the current graph.
    pub fn refresh_profiles(&mut self) {
        let handles: Vec<UserHandle> = self.graph.users().collect();
        for handle in handles {
            let Some(friendliness) = self.friendliness(handle) else {
                continue;
            };
            let category = self.category(friendliness).to_string();
            if let Some(user) = self.graph.record_mut(handle) {
                user.friendliness = friendliness;
                user.category = category;
            }
        }
    }

    /// The persisted form of one user, with derived fields computed from the current graph.
    pub fn snapshot(&self, handle: UserHandle) -> Result<UserSnapshot> {
        let node = self.graph.get(handle).ok_or(SocialError::StaleHandle)?;
        let user = &node.record;
        let friendliness = self.friendliness(handle).unwrap_or(0.0);
        let names = |handles: Vec<UserHandle>| -> Vec<String> {
            handles
                .into_iter()
                .filter_map(|h| self.graph.record(h))
                .map(|record| record.username.clone())
                .collect()
        };

        Ok(UserSnapshot {
            id: user.id,
            username: user.username.clone(),
            password: user.password.clone(),
            name: user.display_name.clone(),
            popularity: user.popularity,
            friendliness,
            category: self.category(friendliness).to_string(),
            interest_flags: user.interests.flags().to_vec(),
            posts: user.posts.iter().cloned().collect(),
            follower_names: names(node.followers().map(|e| e.destination).collect()),
            following_names: names(node.following().map(|e| e.destination).collect()),
        })
    }

    /// Snapshots of every user, in graph list order.
    pub fn snapshots(&self) -> Vec<UserSnapshot> {
        self.graph
            .users()
            .filter_map(|handle| self.snapshot(handle).ok())
            .collect()
    }

    /// Rebuilds a network from stored snapshots. Edge weights are derived again from the
    /// interests; names that match no stored user are skipped.
    pub fn from_snapshots<I>(catalog: InterestCatalog, config: NetworkConfig, snapshots: I) -> Result<Self>
    where
        I: IntoIterator<Item = UserSnapshot>,
    {
        let mut network = SocialNetwork::new(catalog, config)?;
        let snapshots: Vec<UserSnapshot> = snapshots.into_iter().collect();

        // Users are prepended, so replaying back to front restores the stored list order.
        for snapshot in snapshots.iter().rev() {
            let handle = network.create_user(&snapshot.username, &snapshot.password, &snapshot.name)?;
            let interests = InterestVector::from_flags(snapshot.interest_flags.clone(), &network.catalog)?;
            let user = network.user_mut(handle)?;
            user.interests = interests;
            user.popularity = snapshot.popularity;
            user.friendliness = snapshot.friendliness;
            user.category = snapshot.category.clone();
            for post in &snapshot.posts {
                user.posts.push_oldest(post.clone());
            }
        }

        for snapshot in &snapshots {
            let Some(user) = network.lookup_user(&snapshot.username) else {
                continue;
            };
            for name in snapshot.following_names.iter().rev() {
                network.restore_edge(user, name, true)?;
            }
            for name in snapshot.follower_names.iter().rev() {
                network.restore_edge(user, name, false)?;
            }
        }

        network.refresh_profiles();
        Ok(network)
    }

    fn restore_edge(&mut self, user: UserHandle, partner: &str, outgoing: bool) -> Result<()> {
        let Some(other) = self.lookup_user(partner) else {
            warn!(partner, "stored edge points at an unknown user, skipped");
            return Ok(());
        };
        if other == user {
            warn!(partner, "stored self edge skipped");
            return Ok(());
        }

        if outgoing {
            self.graph.add_edge(user, other)?;
        } else {
            self.graph.add_edge(other, user)?;
        }
        Ok(())
    }

    pub fn load<S: SnapshotStore + ?Sized>(
        catalog: InterestCatalog,
        config: NetworkConfig,
        store: &S,
    ) -> Result<Self> {
        let snapshots = store
            .enumerate_stored_users()?
            .collect::<Result<Vec<UserSnapshot>>>()?;
        let network = SocialNetwork::from_snapshots(catalog, config, snapshots)?;
        info!(
            users = network.len(),
            edges = network.graph.edge_count(),
            "network loaded"
        );
        Ok(network)
    }

    /// Persists every user and removes stored users that no longer exist. Returns the number of
    /// users written.
    pub fn save<S: SnapshotStore + ?Sized>(&mut self, store: &mut S) -> Result<usize> {
        self.refresh_profiles();

        for username in store.stored_usernames()? {
            if !self.directory.contains_key(&username) {
                store.remove_user(&username)?;
            }
        }

        let snapshots = self.snapshots();
        for snapshot in &snapshots {
            store.persist_user(snapshot)?;
        }

        info!(users = snapshots.len(), "network saved");
        Ok(snapshots.len())
    }
}

fn validate_username(username: &str) -> Result<()> {
    let valid = !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && username != "."
        && username != "..";
    if valid {
        Ok(())
    } else {
        Err(SocialError::InvalidUsername(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{at, sample_network};

    use super::*;

    fn empty_network() -> SocialNetwork {
        SocialNetwork::new(InterestCatalog::default_topics(), NetworkConfig::default()).unwrap()
    }

    #[test]
    fn test_create_and_lookup() {
        let mut network = empty_network();
        let alice = network.create_user("alice", "pw", "Alice").unwrap();

        assert_eq!(network.lookup_user("alice"), Some(alice));
        assert_eq!(network.user(alice).unwrap().display_name, "Alice");
        assert_eq!(network.lookup_user("bob"), None);
        assert_eq!(network.len(), 1);
    }

    #[test]
    fn test_duplicate_username() {
        let mut network = empty_network();
        let first = network.create_user("alice", "pw", "Alice").unwrap();
        let second = network.create_user("alice", "other", "Impostor");

        assert!(matches!(second, Err(SocialError::DuplicateKey(_))));
        assert_eq!(network.len(), 1);
        assert_eq!(network.lookup_user("alice"), Some(first));
        assert_eq!(network.user(first).unwrap().display_name, "Alice");
    }

    #[test]
    fn test_invalid_usernames() {
        let mut network = empty_network();
        for name in ["", "..", "a/b", "with space"] {
            assert!(matches!(
                network.create_user(name, "pw", "x"),
                Err(SocialError::InvalidUsername(_))
            ));
        }
        assert!(network.is_empty());
    }

    #[test]
    fn test_delete_user_keeps_directory_and_graph_in_sync() {
        let mut network = sample_network();
        let bob = network.lookup_user("bob").unwrap();
        network.delete_user(bob).unwrap();

        assert_eq!(network.lookup_user("bob"), None);
        assert_eq!(network.directory().len(), network.graph().len());
        for handle in network.graph().users() {
            let name = &network.user(handle).unwrap().username;
            assert_eq!(network.lookup_user(name), Some(handle));
        }
        assert!(matches!(network.delete_user(bob), Err(SocialError::StaleHandle)));
    }

    #[test]
    fn test_login() {
        let mut network = empty_network();
        let alice = network.create_user("alice", "secret", "Alice").unwrap();
        assert_eq!(network.login("alice", "secret"), Some(alice));
        assert_eq!(network.login("alice", "wrong"), None);
        assert_eq!(network.login("nobody", "secret"), None);
    }

    #[test]
    fn test_follow_self_is_rejected() {
        let mut network = empty_network();
        let alice = network.create_user("alice", "pw", "Alice").unwrap();
        assert!(matches!(
            network.follow(alice, alice),
            Err(SocialError::SelfEdge(_))
        ));
        assert_eq!(network.graph().get(alice).unwrap().num_following(), 0);
    }

    #[test]
    fn test_add_interest() {
        let mut network = empty_network();
        let alice = network.create_user("alice", "pw", "Alice").unwrap();
        network.add_interest(alice, "music").unwrap();

        let index = network.catalog().index_of("music").unwrap();
        assert!(network.user(alice).unwrap().interests.has(index));
        assert!(matches!(
            network.add_interest(alice, "knitting"),
            Err(SocialError::UnknownInterest(_))
        ));
    }

    #[test]
    fn test_edge_weights_are_not_refreshed() {
        let mut network = empty_network();
        let alice = network.create_user("alice", "pw", "Alice").unwrap();
        let bob = network.create_user("bob", "pw", "Bob").unwrap();
        network.add_interest(alice, "music").unwrap();
        network.follow(alice, bob).unwrap();
        assert_eq!(network.graph().edge_weight(alice, bob), Some(1.0));

        network.add_interest(bob, "music").unwrap();
        assert_eq!(network.graph().affinity(alice, bob), Some(0.0));
        assert_eq!(network.graph().edge_weight(alice, bob), Some(1.0));
    }

    #[test]
    fn test_posts_and_popularity() {
        let mut network = empty_network();
        let alice = network.create_user("alice", "pw", "Alice").unwrap();
        let id = network.publish_post_at(alice, "hello", at(9)).unwrap();
        network.publish_post(alice, "later").unwrap();

        assert_eq!(network.user(alice).unwrap().posts.len(), 2);
        assert_eq!(network.find_post(alice, id).unwrap().content, "hello");
        assert_eq!(network.delete_post(alice, id).unwrap().content, "hello");
        assert!(matches!(
            network.delete_post(alice, id),
            Err(SocialError::NotFound(_))
        ));

        assert_eq!(network.like_user(alice).unwrap(), 1);
        assert_eq!(network.like_user(alice).unwrap(), 2);
    }

    #[test]
    fn test_friendliness_and_category() {
        let mut network = sample_network();
        network.refresh_profiles();

        // alice follows bob and is followed by dave, in a network of four users.
        let alice = network.lookup_user("alice").unwrap();
        let user = network.user(alice).unwrap();
        assert!((user.friendliness - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(user.category, CATEGORY_FRIENDLY);
        assert_eq!(network.category(0.0), CATEGORY_LONER);
        assert_eq!(network.category(0.1), CATEGORY_RESERVED);
        assert_eq!(network.category(0.9), CATEGORY_BUTTERFLY);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let network = sample_network();
        let snapshots = network.snapshots();

        let rebuilt = SocialNetwork::from_snapshots(
            network.catalog().clone(),
            network.config().clone(),
            snapshots.clone(),
        )
        .unwrap();

        assert_eq!(rebuilt.snapshots(), snapshots);
        let alice = rebuilt.lookup_user("alice").unwrap();
        let bob = rebuilt.lookup_user("bob").unwrap();
        assert!((rebuilt.graph().edge_weight(alice, bob).unwrap() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_feed_after_deleting_a_read_post() {
        let mut network = sample_network();
        let alice = network.lookup_user("alice").unwrap();
        let bob = network.lookup_user("bob").unwrap();

        let old = network.publish_post_at(bob, "old", at(9)).unwrap();
        assert_eq!(network.build_feed(alice).unwrap().count(), 1);

        network.publish_post_at(bob, "fresh", at(10)).unwrap();
        network.delete_post(bob, old).unwrap();

        let contents: Vec<String> = network
            .build_feed(alice)
            .unwrap()
            .map(|item| item.payload.post.content)
            .collect();
        assert_eq!(contents, vec!["fresh"]);
        assert_eq!(network.build_feed(alice).unwrap().count(), 0);
    }

    #[test]
    fn test_feed_through_session() {
        let mut network = sample_network();
        let alice = network.lookup_user("alice").unwrap();
        let bob = network.lookup_user("bob").unwrap();
        network.publish_post_at(bob, "bob was here", at(10)).unwrap();

        let feed: Vec<_> = network.build_feed(alice).unwrap().collect();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].owner, "bob");
        assert_eq!(network.build_feed(alice).unwrap().count(), 0);

        network.reset_feed(alice);
        assert_eq!(network.build_feed(alice).unwrap().count(), 1);
    }
}
