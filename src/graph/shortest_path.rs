use crate::error::{Result, SocialError};

use super::{SocialGraph, UserHandle};

/// Tentative distance of a user not (yet) reached.
pub const UNREACHABLE: f64 = f64::INFINITY;

/// Single-source shortest distances over the weighted `following` graph.
///
/// Entries are stored in graph list order as it was when the table was computed.
#[derive(Debug, Clone)]
pub struct DistanceTable {
    source: UserHandle,
    handles: Vec<UserHandle>,
    distances: Vec<f64>,
    previous: Vec<Option<usize>>,
}

impl DistanceTable {
    pub fn source(&self) -> UserHandle {
        self.source
    }

    fn position(&self, handle: UserHandle) -> Option<usize> {
        self.handles.iter().position(|&h| h == handle)
    }

    /// Distance to `target`, or `None` when it cannot be reached.
    pub fn get(&self, target: UserHandle) -> Option<f64> {
        let distance = self.distances[self.position(target)?];
        distance.is_finite().then_some(distance)
    }

    pub fn is_reachable(&self, target: UserHandle) -> bool {
        self.get(target).is_some()
    }

    /// Every user of the graph with its distance, `None` for unreachable ones.
    pub fn iter(&self) -> impl Iterator<Item = (UserHandle, Option<f64>)> + '_ {
        self.handles
            .iter()
            .zip(self.distances.iter())
            .map(|(&handle, &distance)| (handle, distance.is_finite().then_some(distance)))
    }

    /// Reachable users other than the source.
    pub fn reachable(&self) -> impl Iterator<Item = (UserHandle, f64)> + '_ {
        self.iter()
            .filter(move |&(handle, _)| handle != self.source)
            .filter_map(|(handle, distance)| distance.map(|d| (handle, d)))
    }

    /// Users on a shortest path from the source to `target`, both included.
    pub fn path_to(&self, target: UserHandle) -> Option<Vec<UserHandle>> {
        let mut current = self.position(target)?;
        if !self.distances[current].is_finite() {
            return None;
        }

        let mut path = vec![self.handles[current]];
        while let Some(previous) = self.previous[current] {
            path.push(self.handles[previous]);
            current = previous;
        }
        path.reverse();
        Some(path)
    }
}

impl SocialGraph {
    /// Dijkstra's algorithm with a linear scan for the next closest user, O(n²) in the number of
    /// users. Intended for networks of a few hundred users.
    pub fn dijkstra(&self, source: UserHandle) -> Result<DistanceTable> {
        let start = self.index_of(source).ok_or(SocialError::StaleHandle)?;
        let handles: Vec<UserHandle> = self.users().collect();
        let n = handles.len();

        let mut distances = vec![UNREACHABLE; n];
        let mut previous = vec![None; n];
        let mut visited = vec![false; n];
        distances[start] = 0.0;

        for _ in 0..n {
            let closest = (0..n)
                .filter(|&i| !visited[i] && distances[i].is_finite())
                .min_by(|&a, &b| distances[a].total_cmp(&distances[b]));
            let Some(u) = closest else {
                break;
            };
            visited[u] = true;

            let Some(node) = self.get(handles[u]) else {
                continue;
            };
            for edge in node.following() {
                let Some(v) = self.index_of(edge.destination) else {
                    continue;
                };
                let candidate = distances[u] + edge.weight;
                if !visited[v] && candidate < distances[v] {
                    distances[v] = candidate;
                    previous[v] = Some(u);
                }
            }
        }

        Ok(DistanceTable {
            source,
            handles,
            distances,
            previous,
        })
    }
}
