use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::{
    data::UserRecord,
    error::{Result, SocialError},
};

pub mod affinity;
pub mod shortest_path;
pub mod traversal;

pub use shortest_path::DistanceTable;
pub use traversal::{Traversal, TraversalMode};

/// Stable reference to a user stored in a [`SocialGraph`].
///
/// A handle goes stale once its user is removed, even if the slot is later reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserHandle {
    slot: u32,
    generation: u32,
}

/// One direction of a follow relationship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub destination: UserHandle,
    pub weight: f64,
}

/// A user record together with its two edge lists, each most recently added first.
#[derive(Debug)]
pub struct UserNode {
    pub record: UserRecord,
    following: VecDeque<Edge>,
    followers: VecDeque<Edge>,
}

impl UserNode {
    pub fn following(&self) -> impl Iterator<Item = &Edge> {
        self.following.iter()
    }

    pub fn followers(&self) -> impl Iterator<Item = &Edge> {
        self.followers.iter()
    }

    pub fn num_following(&self) -> usize {
        self.following.len()
    }

    pub fn num_followers(&self) -> usize {
        self.followers.len()
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<UserNode>,
}

/// Directed, affinity-weighted follower graph.
///
/// Users live in an arena of slots addressed by [`UserHandle`]. Following `a -> b` stores one
/// edge in `a`'s following list and a mirror edge with the same weight in `b`'s followers list;
/// both are always created and removed together.
#[derive(Debug, Default)]
pub struct SocialGraph {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    /// Most recently added user first.
    users: VecDeque<UserHandle>,
    /// Position of each handle in `users`, rebuilt on every structural change.
    positions: HashMap<UserHandle, usize>,
}

impl SocialGraph {
    pub fn new() -> Self {
        SocialGraph::default()
    }

    pub fn add_user(&mut self, record: UserRecord) -> UserHandle {
        let node = UserNode {
            record,
            following: VecDeque::new(),
            followers: VecDeque::new(),
        };

        let handle = match self.free_slots.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                entry.node = Some(node);
                UserHandle {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                UserHandle {
                    slot: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        self.users.push_front(handle);
        self.rebuild_positions();
        handle
    }

    /// Detaches a user, dropping every edge that touches it, and returns its record.
    pub fn remove_user(&mut self, handle: UserHandle) -> Result<UserRecord> {
        let position = self.index_of(handle).ok_or(SocialError::StaleHandle)?;
        self.free_all_edges(handle);
        self.users.remove(position);

        let slot = &mut self.slots[handle.slot as usize];
        let node = slot.node.take().ok_or(SocialError::StaleHandle)?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(handle.slot);

        self.rebuild_positions();
        Ok(node.record)
    }

    pub fn get(&self, handle: UserHandle) -> Option<&UserNode> {
        self.slots
            .get(handle.slot as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, handle: UserHandle) -> Option<&mut UserNode> {
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn record(&self, handle: UserHandle) -> Option<&UserRecord> {
        self.get(handle).map(|node| &node.record)
    }

    pub fn record_mut(&mut self, handle: UserHandle) -> Option<&mut UserRecord> {
        self.get_mut(handle).map(|node| &mut node.record)
    }

    pub fn contains(&self, handle: UserHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of users in the graph.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Handles in list order, most recently added first.
    pub fn users(&self) -> impl Iterator<Item = UserHandle> + '_ {
        self.users.iter().copied()
    }

    /// 0-based position of `handle` in list order. Positions shift on every add or remove, so
    /// they must not be kept across mutations.
    pub fn index_of(&self, handle: UserHandle) -> Option<usize> {
        self.positions.get(&handle).copied()
    }

    pub fn handle_at(&self, index: usize) -> Option<UserHandle> {
        self.users.get(index).copied()
    }

    fn rebuild_positions(&mut self) {
        self.positions.clear();
        self.positions.extend(
            self.users
                .iter()
                .enumerate()
                .map(|(position, &handle)| (handle, position)),
        );
    }

    /// Creates the edge `follower -> followee` and its mirror.
    ///
    /// The weight is the affinity distance of the two users' interests at this moment and is not
    /// recomputed if their interests change later. Returns `Ok(false)` when the edge already
    /// exists.
    pub fn add_edge(&mut self, follower: UserHandle, followee: UserHandle) -> Result<bool> {
        let weight = match (self.record(follower), self.record(followee)) {
            (Some(from), Some(to)) => affinity::distance(&from.interests, &to.interests),
            _ => return Err(SocialError::StaleHandle),
        };
        self.add_weighted_edge(follower, followee, weight)
    }

    pub(crate) fn add_weighted_edge(
        &mut self,
        follower: UserHandle,
        followee: UserHandle,
        weight: f64,
    ) -> Result<bool> {
        let (from, to) = match (self.get(follower), self.get(followee)) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(SocialError::StaleHandle),
        };
        if follower == followee {
            return Err(SocialError::SelfEdge(from.record.username.clone()));
        }
        if from.following.iter().any(|e| e.destination == followee) {
            return Ok(false);
        }

        debug!(
            follower = %from.record.username,
            followee = %to.record.username,
            weight,
            "adding edge"
        );

        if let Some(node) = self.get_mut(follower) {
            node.following.push_front(Edge {
                destination: followee,
                weight,
            });
        }
        if let Some(node) = self.get_mut(followee) {
            node.followers.push_front(Edge {
                destination: follower,
                weight,
            });
        }
        Ok(true)
    }

    /// Removes `a -> b` together with its mirror. If either half is missing the users are treated
    /// as not connected and nothing changes.
    pub fn remove_edge(&mut self, a: UserHandle, b: UserHandle) -> bool {
        let outgoing = self
            .get(a)
            .and_then(|node| node.following.iter().position(|e| e.destination == b));
        let incoming = self
            .get(b)
            .and_then(|node| node.followers.iter().position(|e| e.destination == a));

        let (Some(outgoing), Some(incoming)) = (outgoing, incoming) else {
            return false;
        };

        if let Some(node) = self.get_mut(a) {
            node.following.remove(outgoing);
        }
        if let Some(node) = self.get_mut(b) {
            node.followers.remove(incoming);
        }
        true
    }

    /// Drops every outgoing and incoming edge of `handle`, keeping the partners' lists in sync.
    pub fn free_all_edges(&mut self, handle: UserHandle) {
        let Some(node) = self.get(handle) else {
            return;
        };
        let followees: Vec<UserHandle> = node.following.iter().map(|e| e.destination).collect();
        let followers: Vec<UserHandle> = node.followers.iter().map(|e| e.destination).collect();

        for followee in followees {
            self.remove_edge(handle, followee);
        }
        for follower in followers {
            self.remove_edge(follower, handle);
        }

        if let Some(node) = self.get_mut(handle) {
            node.following.clear();
            node.followers.clear();
        }
    }

    pub fn is_following(&self, a: UserHandle, b: UserHandle) -> bool {
        self.edge_weight(a, b).is_some()
    }

    pub fn edge_weight(&self, a: UserHandle, b: UserHandle) -> Option<f64> {
        self.get(a)?
            .following
            .iter()
            .find(|e| e.destination == b)
            .map(|e| e.weight)
    }

    /// Affinity distance between two users, 0 for a user compared with itself.
    pub fn affinity(&self, a: UserHandle, b: UserHandle) -> Option<f64> {
        let from = self.record(a)?;
        let to = self.record(b)?;
        if a == b {
            return Some(0.0);
        }
        Some(affinity::distance(&from.interests, &to.interests))
    }

    pub fn edge_count(&self) -> usize {
        self.users
            .iter()
            .filter_map(|&handle| self.get(handle))
            .map(UserNode::num_following)
            .sum()
    }
}
