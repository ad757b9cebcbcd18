//! Least common ancestors via breadth-first search.
//!
//! An "ancestor" of `v` here is any vertex reachable from `v` along directed
//! edges.  Orient the edges from child to parent to get the usual meaning.

use std::sync::Arc;

use dashmap::DashMap;
use log::trace;

use crate::traversal::ShortestPaths;
use crate::{Digraph, Vertex};

/// Answers least-common-ancestor queries over a private copy of a digraph.
///
/// The common ancestor of `v` and `w` is the vertex minimising the sum of the
/// shortest distances from `v` and from `w`.  One breadth-first search per
/// distinct query vertex is computed on first use and then cached, so `Lca`
/// can be shared between threads that query it concurrently.
pub struct Lca<V: Vertex> {
    digraph: Digraph<V>,
    bfs_cache: DashMap<u32, Arc<ShortestPaths>>,
}

impl<V: Vertex> Lca<V> {
    pub fn new(digraph: &Digraph<V>) -> Self {
        Self {
            digraph: digraph.without_parallel_edges(),
            bfs_cache: DashMap::new(),
        }
    }

    /// `None` for vertices absent from the digraph.
    fn bfs(&self, vertex: &V) -> Option<Arc<ShortestPaths>> {
        let index = self.digraph.index_of(vertex)?;
        if let Some(cached) = self.bfs_cache.get(&index) {
            cov_mark::hit!(bfs_cache_hit);
            return Some(Arc::clone(cached.value()));
        }
        let entry = self.bfs_cache.entry(index).or_insert_with(|| {
            trace!("computing BFS from {:?}", vertex);
            Arc::new(ShortestPaths::from_sources(&self.digraph, &[index]))
        });
        Some(Arc::clone(entry.value()))
    }

    /// The common ancestor together with the summed distance to it.
    fn closest_common(&self, v: &V, w: &V) -> Option<(u32, usize)> {
        let bfs_v = self.bfs(v)?;
        let bfs_w = self.bfs(w)?;

        let mut best: Option<(u32, usize)> = None;
        for vertex in self.digraph.vertex_indices() {
            let (Some(dist_v), Some(dist_w)) = (bfs_v.dist_to(vertex), bfs_w.dist_to(vertex)) else {
                continue;
            };
            let length = dist_v + dist_w;
            if best.map_or(true, |(_, minimum)| length < minimum) {
                best = Some((vertex, length));
            }
        }
        if best.is_none() {
            cov_mark::hit!(no_common_ancestor);
        }
        best
    }

    /// Length of the shortest "ancestral path" through a common ancestor of
    /// `v` and `w`.  `None` if they have no common ancestor.
    pub fn length(&self, v: &V, w: &V) -> Option<usize> {
        self.closest_common(v, w).map(|(_, length)| length)
    }

    /// The common ancestor of `v` and `w` minimising [`Self::length`].  Ties
    /// go to the vertex seen first in the digraph.
    pub fn ancestor(&self, v: &V, w: &V) -> Option<V> {
        self.closest_common(v, w)
            .map(|(ancestor, _)| self.digraph.vertex(ancestor).clone())
    }

    /// Common ancestor of many vertices, reduced pairwise over a balanced
    /// split of `vertices`.  Not guaranteed to be optimal for more than two
    /// vertices.
    pub fn ancestor_of(&self, vertices: &[V]) -> Option<V> {
        match vertices {
            [] => None,
            [v] => Some(v.clone()),
            [v, w] => self.ancestor(v, w),
            _ => {
                let (left, right) = vertices.split_at(vertices.len() / 2);
                let left = self.ancestor_of(left)?;
                let right = self.ancestor_of(right)?;
                self.ancestor(&left, &right)
            }
        }
    }

    /// Shortest distance from `descendant` up to `ancestor`.
    pub fn dist_to(&self, descendant: &V, ancestor: &V) -> Option<usize> {
        if descendant == ancestor {
            return Some(0);
        }
        let bfs = self.bfs(descendant)?;
        bfs.dist_to(self.digraph.index_of(ancestor)?)
    }

    pub fn has_path_to(&self, descendant: &V, ancestor: &V) -> bool {
        self.dist_to(descendant, ancestor).is_some()
    }

    /// A shortest path from `descendant` to `ancestor`.  Empty if there is
    /// none.
    pub fn path_to(&self, descendant: &V, ancestor: &V) -> Vec<V> {
        if descendant == ancestor {
            return vec![descendant.clone()];
        }
        let (Some(bfs), Some(index)) = (self.bfs(descendant), self.digraph.index_of(ancestor))
        else {
            return Vec::new();
        };
        self.digraph.vertices_of(&bfs.path_to(index))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use proptest::prelude::*;

    use super::*;
    use crate::arb_dag;

    fn diamond() -> Digraph<&'static str> {
        Digraph::from_edges_iter(vec![("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")])
    }

    /// A family tree with edges pointing from child to parent.
    fn family() -> Digraph<&'static str> {
        Digraph::from_edges_iter(vec![
            ("alice", "carol"),
            ("bob", "carol"),
            ("carol", "eve"),
            ("dave", "eve"),
            ("eve", "frank"),
            ("gina", "frank"),
        ])
    }

    #[test]
    fn diamond_with_edges_reversed() {
        let lca = Lca::new(&diamond().inverted());
        assert_eq!(lca.ancestor(&"B", &"C"), Some("A"));
        assert_eq!(lca.length(&"B", &"C"), Some(2));
    }

    #[test]
    fn diamond_common_descendant() {
        let lca = Lca::new(&diamond());
        assert_eq!(lca.ancestor(&"B", &"C"), Some("D"));
        assert_eq!(lca.length(&"B", &"C"), Some(2));
        assert_eq!(lca.ancestor(&"A", &"D"), Some("D"));
        assert_eq!(lca.length(&"A", &"D"), Some(2));
    }

    #[test]
    fn vertex_is_its_own_ancestor() {
        let lca = Lca::new(&family());
        assert_eq!(lca.ancestor(&"carol", &"carol"), Some("carol"));
        assert_eq!(lca.length(&"carol", &"carol"), Some(0));
        assert_eq!(lca.ancestor(&"alice", &"eve"), Some("eve"));
        assert_eq!(lca.length(&"alice", &"eve"), Some(2));
    }

    #[test]
    fn no_common_ancestor() {
        cov_mark::check!(no_common_ancestor);
        let digraph = Digraph::from_edges_iter(vec![(1, 2), (3, 4)]);
        let lca = Lca::new(&digraph);
        assert_eq!(lca.ancestor(&1, &3), None);
        assert_eq!(lca.length(&1, &3), None);
    }

    #[test]
    fn unknown_vertices() {
        let lca = Lca::new(&family());
        assert_eq!(lca.ancestor(&"zoe", &"alice"), None);
        assert_eq!(lca.dist_to(&"zoe", &"zoe"), Some(0));
        assert_eq!(lca.dist_to(&"zoe", &"eve"), None);
        assert!(lca.path_to(&"alice", &"zoe").is_empty());
    }

    #[test]
    fn many_vertices() {
        let lca = Lca::new(&family());
        assert_eq!(lca.ancestor_of(&[]), None);
        assert_eq!(lca.ancestor_of(&["dave"]), Some("dave"));
        assert_eq!(lca.ancestor_of(&["alice", "bob"]), Some("carol"));
        assert_eq!(lca.ancestor_of(&["alice", "bob", "dave"]), Some("eve"));
        assert_eq!(
            lca.ancestor_of(&["alice", "bob", "dave", "gina"]),
            Some("frank")
        );
    }

    #[test]
    fn many_vertices_without_common_ancestor() {
        let digraph = Digraph::from_edges_iter(vec![(1, 2), (3, 4), (5, 4)]);
        let lca = Lca::new(&digraph);
        assert_eq!(lca.ancestor_of(&[1, 3, 5]), None);
        assert_eq!(lca.ancestor_of(&[3, 5, 4]), Some(4));
    }

    #[test]
    fn paths_delegate_to_the_cached_bfs() {
        cov_mark::check!(bfs_cache_hit);
        let lca = Lca::new(&family());
        assert!(lca.has_path_to(&"alice", &"frank"));
        assert!(!lca.has_path_to(&"frank", &"alice"));
        assert_eq!(lca.dist_to(&"alice", &"frank"), Some(3));
        assert_eq!(
            lca.path_to(&"alice", &"frank"),
            vec!["alice", "carol", "eve", "frank"]
        );
        assert_eq!(lca.path_to(&"alice", &"alice"), vec!["alice"]);
    }

    #[test]
    fn concurrent_queries() {
        let lca = Lca::new(&family());
        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    assert_eq!(lca.ancestor(&"alice", &"dave"), Some("eve"));
                    assert_eq!(lca.length(&"gina", &"bob"), Some(4));
                });
            }
        });
    }

    proptest! {
        #[test]
        fn symmetric(dag in arb_dag(1..15, 0.3)) {
            let lca = Lca::new(&dag);
            let vertices: Vec<u16> = dag.iter_vertices().copied().collect();
            for v in &vertices {
                for w in &vertices {
                    prop_assert_eq!(lca.ancestor(v, w), lca.ancestor(w, v));
                    prop_assert_eq!(lca.length(v, w), lca.length(w, v));
                }
            }
        }

        #[test]
        fn length_is_the_sum_of_distances(dag in arb_dag(1..15, 0.3)) {
            let lca = Lca::new(&dag);
            let vertices: Vec<u16> = dag.iter_vertices().copied().collect();
            for v in &vertices {
                for w in &vertices {
                    if let Some(ancestor) = lca.ancestor(v, w) {
                        let sum = lca.dist_to(v, &ancestor).unwrap() + lca.dist_to(w, &ancestor).unwrap();
                        prop_assert_eq!(lca.length(v, w), Some(sum));
                    }
                }
            }
        }
    }
}
