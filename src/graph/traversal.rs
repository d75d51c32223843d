use std::{collections::VecDeque, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SocialError};

use super::{SocialGraph, UserHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraversalMode {
    BreadthFirst,
    DepthFirst,
}

impl FromStr for TraversalMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(TraversalMode::BreadthFirst),
            "dfs" | "depth-first" => Ok(TraversalMode::DepthFirst),
            other => Err(format!("unknown traversal mode `{}`", other)),
        }
    }
}

/// Lazy walk over the users reachable from a start user through `following` edges.
///
/// Each reachable user is yielded exactly once. Siblings are visited in edge-list order, most
/// recently followed first. The walk holds a shared borrow of the graph, so the graph cannot
/// change underneath it.
pub struct Traversal<'g> {
    graph: &'g SocialGraph,
    mode: TraversalMode,
    frontier: VecDeque<usize>,
    visited: Vec<bool>,
}

impl<'g> Traversal<'g> {
    fn new(graph: &'g SocialGraph, start: UserHandle, mode: TraversalMode) -> Result<Self> {
        let start = graph.index_of(start).ok_or(SocialError::StaleHandle)?;
        let mut visited = vec![false; graph.len()];
        if mode == TraversalMode::BreadthFirst {
            visited[start] = true;
        }

        Ok(Traversal {
            graph,
            mode,
            frontier: VecDeque::from([start]),
            visited,
        })
    }

    fn neighbors(&self, index: usize) -> Vec<usize> {
        self.graph
            .handle_at(index)
            .and_then(|handle| self.graph.get(handle))
            .map(|node| {
                node.following()
                    .filter_map(|edge| self.graph.index_of(edge.destination))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn next_breadth_first(&mut self) -> Option<usize> {
        let current = self.frontier.pop_front()?;
        for neighbor in self.neighbors(current) {
            if !self.visited[neighbor] {
                self.visited[neighbor] = true;
                self.frontier.push_back(neighbor);
            }
        }
        Some(current)
    }

    fn next_depth_first(&mut self) -> Option<usize> {
        loop {
            let current = self.frontier.pop_back()?;
            if self.visited[current] {
                continue;
            }
            self.visited[current] = true;

            // Reversed so the first edge ends on top of the stack.
            for neighbor in self.neighbors(current).into_iter().rev() {
                if !self.visited[neighbor] {
                    self.frontier.push_back(neighbor);
                }
            }
            return Some(current);
        }
    }
}

impl Iterator for Traversal<'_> {
    type Item = UserHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let index = match self.mode {
            TraversalMode::BreadthFirst => self.next_breadth_first(),
            TraversalMode::DepthFirst => self.next_depth_first(),
        }?;
        self.graph.handle_at(index)
    }
}

impl SocialGraph {
    pub fn traverse(&self, start: UserHandle, mode: TraversalMode) -> Result<Traversal<'_>> {
        Traversal::new(self, start, mode)
    }

    pub fn bfs(&self, start: UserHandle) -> Result<Traversal<'_>> {
        self.traverse(start, TraversalMode::BreadthFirst)
    }

    pub fn dfs(&self, start: UserHandle) -> Result<Traversal<'_>> {
        self.traverse(start, TraversalMode::DepthFirst)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::graph_from_edges;

    use super::*;

    #[test]
    fn test_bfs_visits_each_reachable_user_once() {
        // A -> B, A -> C, B -> D
        let (graph, h) = graph_from_edges(&["A", "B", "C", "D"], &[(0, 1), (0, 2), (1, 3)]);
        let visited: Vec<UserHandle> = graph.bfs(h[0]).unwrap().collect();

        assert_eq!(visited.len(), 4);
        // C was followed last, so it comes before B.
        assert_eq!(visited, vec![h[0], h[2], h[1], h[3]]);
    }

    #[test]
    fn test_dfs_goes_deep_first() {
        // A -> B, A -> C, B -> D, with C followed first so B is at the head of A's list.
        let (graph, h) = graph_from_edges(&["A", "B", "C", "D"], &[(0, 2), (0, 1), (1, 3)]);
        let visited: Vec<UserHandle> = graph.dfs(h[0]).unwrap().collect();
        assert_eq!(visited, vec![h[0], h[1], h[3], h[2]]);
    }

    #[test]
    fn test_isolated_start_visits_only_itself() {
        let (graph, h) = graph_from_edges(&["A", "B", "C"], &[(1, 2)]);
        assert_eq!(graph.bfs(h[0]).unwrap().collect::<Vec<_>>(), vec![h[0]]);
        assert_eq!(graph.dfs(h[0]).unwrap().collect::<Vec<_>>(), vec![h[0]]);
    }

    #[test]
    fn test_cycles_terminate() {
        let (graph, h) = graph_from_edges(&["A", "B", "C"], &[(0, 1), (1, 2), (2, 0), (1, 0)]);
        for mode in [TraversalMode::BreadthFirst, TraversalMode::DepthFirst] {
            let mut visited: Vec<UserHandle> = graph.traverse(h[1], mode).unwrap().collect();
            assert_eq!(visited[0], h[1]);
            visited.sort();
            let mut expected = h.clone();
            expected.sort();
            assert_eq!(visited, expected);
        }
    }

    #[test]
    fn test_followers_are_not_followed() {
        // Only B -> A exists, so A reaches nobody.
        let (graph, h) = graph_from_edges(&["A", "B"], &[(1, 0)]);
        assert_eq!(graph.bfs(h[0]).unwrap().count(), 1);
        assert_eq!(graph.bfs(h[1]).unwrap().count(), 2);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("bfs".parse::<TraversalMode>(), Ok(TraversalMode::BreadthFirst));
        assert_eq!("DFS".parse::<TraversalMode>(), Ok(TraversalMode::DepthFirst));
        assert!("sideways".parse::<TraversalMode>().is_err());
    }
}
