//! [Transitive closure](https://en.wikipedia.org/wiki/Transitive_closure) and
//! [transitive reduction](https://en.wikipedia.org/wiki/Transitive_reduction)
//! backed by memoized depth-first reachability.
//!
//! Both take a private copy of the input digraph (parallel edges collapsed)
//! and compute their whole-relation result lazily, at most once, on first
//! request.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use log::{debug, trace};

use crate::traversal::Reachability;
use crate::{Digraph, Vertex};

/// One depth-first search per source vertex, computed on first use.
struct ReachabilityCache<V> {
    digraph: Digraph<V>,
    cache: DashMap<u32, Arc<Reachability>>,
}

impl<V: Vertex> ReachabilityCache<V> {
    fn new(digraph: &Digraph<V>) -> Self {
        Self {
            digraph: digraph.without_parallel_edges(),
            cache: DashMap::new(),
        }
    }

    fn descendants_of(&self, ancestor: u32) -> Arc<Reachability> {
        if let Some(cached) = self.cache.get(&ancestor) {
            return Arc::clone(cached.value());
        }
        let entry = self.cache.entry(ancestor).or_insert_with(|| {
            trace!("computing DFS from {:?}", self.digraph.vertex(ancestor));
            Arc::new(Reachability::from_source(&self.digraph, ancestor))
        });
        Arc::clone(entry.value())
    }

    fn reachable_index(&self, ancestor: u32, descendant: u32) -> bool {
        self.descendants_of(ancestor).contains(descendant)
    }

    /// Every vertex reaches itself, even one absent from the digraph.
    fn reachable(&self, ancestor: &V, descendant: &V) -> bool {
        if ancestor == descendant {
            return true;
        }
        match (
            self.digraph.index_of(ancestor),
            self.digraph.index_of(descendant),
        ) {
            (Some(ancestor), Some(descendant)) => self.reachable_index(ancestor, descendant),
            _ => false,
        }
    }

    /// A digraph with the same vertices (in the same order) and no edges.
    fn edgeless(&self) -> Digraph<V> {
        let mut result = Digraph::new();
        for vertex in self.digraph.iter_vertices() {
            result.add_vertex(vertex.clone());
        }
        result
    }
}

/// Pairwise reachability and, on request, the full reachability relation.
pub struct TransitiveClosure<V: Vertex> {
    reachability: ReachabilityCache<V>,
    closure: OnceLock<Digraph<V>>,
}

impl<V: Vertex> TransitiveClosure<V> {
    pub fn new(digraph: &Digraph<V>) -> Self {
        Self {
            reachability: ReachabilityCache::new(digraph),
            closure: OnceLock::new(),
        }
    }

    /// Is there a directed path from `ancestor` to `descendant`?  Always true
    /// when they are equal.
    pub fn reachable(&self, ancestor: &V, descendant: &V) -> bool {
        self.reachability.reachable(ancestor, descendant)
    }

    /// A digraph with an edge `a -> b` for every `a != b` such that `b` is
    /// reachable from `a`.  Computed once; later calls return the same
    /// relation.
    pub fn closure(&self) -> &Digraph<V> {
        self.closure.get_or_init(|| {
            let digraph = &self.reachability.digraph;
            let mut closure = self.reachability.edgeless();
            for ancestor in digraph.vertex_indices() {
                let reachable = self.reachability.descendants_of(ancestor);
                for descendant in reachable.iter() {
                    if ancestor != descendant {
                        closure.add_edge(
                            digraph.vertex(ancestor).clone(),
                            digraph.vertex(descendant).clone(),
                        );
                    }
                }
            }
            debug!(
                "transitive closure of {} vertices has {} edges",
                closure.vertex_count(),
                closure.edge_count()
            );
            closure
        })
    }
}

/// The digraph with the fewest edges that has the same reachability as the
/// input.
///
/// Uses the cubic reachability-based algorithm: for every vertex `l`, every
/// edge `a -> d` with `a` reaching `l` and `l` reaching `d` is redundant.  On
/// cyclic input the result is not guaranteed to preserve reachability.
pub struct TransitiveReduction<V: Vertex> {
    reachability: ReachabilityCache<V>,
    reduction: OnceLock<Digraph<V>>,
}

impl<V: Vertex> TransitiveReduction<V> {
    pub fn new(digraph: &Digraph<V>) -> Self {
        Self {
            reachability: ReachabilityCache::new(digraph),
            reduction: OnceLock::new(),
        }
    }

    pub fn reachable(&self, ancestor: &V, descendant: &V) -> bool {
        self.reachability.reachable(ancestor, descendant)
    }

    /// Computed once; later calls return the same relation.  The digraph
    /// passed to [`Self::new`] is never modified.
    pub fn reduction(&self) -> &Digraph<V> {
        self.reduction.get_or_init(|| {
            let digraph = &self.reachability.digraph;
            let mut reduction = digraph.clone();
            let mut removed = 0usize;
            for lineage in digraph.vertex_indices() {
                let descendants = self.reachability.descendants_of(lineage);
                for ancestor in digraph.vertex_indices() {
                    if ancestor == lineage || !self.reachability.reachable_index(ancestor, lineage) {
                        continue;
                    }
                    for descendant in descendants.iter() {
                        if descendant != lineage && reduction.clear_edge(ancestor, descendant) {
                            cov_mark::hit!(redundant_edge_removed);
                            removed += 1;
                        }
                    }
                }
            }
            debug!("transitive reduction removed {} edges", removed);
            reduction
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use proptest::prelude::*;

    use super::*;
    use crate::arb_dag;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn diamond() -> Digraph<&'static str> {
        Digraph::from_edges_iter(vec![("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")])
    }

    fn edge_set<V: Vertex>(digraph: &Digraph<V>) -> HashSet<(V, V)> {
        digraph
            .iter_edges()
            .map(|(u, v)| (u.clone(), v.clone()))
            .collect()
    }

    fn divisibility_poset_of_12() -> Digraph<u16> {
        let divisibility_poset_pairs = vec![
            (1, 2),
            (1, 3),
            (1, 4),
            (1, 5),
            (1, 6),
            (1, 7),
            (1, 8),
            (1, 9),
            (1, 10),
            (1, 11),
            (1, 12),
            (2, 4),
            (2, 6),
            (2, 8),
            (2, 10),
            (2, 12),
            (3, 6),
            (3, 9),
            (3, 12),
            (4, 8),
            (4, 12),
            (5, 10),
            (6, 12),
        ];
        Digraph::from_edges_iter(divisibility_poset_pairs)
    }

    #[test]
    fn diamond_closure() {
        init_logger();
        let closure = TransitiveClosure::new(&diamond());
        let relation = closure.closure();
        let descendants: HashSet<&str> = relation.iter_children(&"A").copied().collect();
        assert_eq!(descendants, HashSet::from(["B", "C", "D"]));
        assert_eq!(relation.iter_children(&"D").count(), 0);
        assert!(closure.reachable(&"A", &"D"));
        assert!(!closure.reachable(&"D", &"A"));
        assert!(closure.reachable(&"D", &"D"));
        assert!(closure.reachable(&"Z", &"Z"));
        assert!(!closure.reachable(&"Z", &"A"));
    }

    #[test]
    fn closure_is_computed_once() {
        let closure = TransitiveClosure::new(&diamond());
        let first: *const Digraph<&str> = closure.closure();
        let second: *const Digraph<&str> = closure.closure();
        assert_eq!(first, second);
    }

    #[test]
    fn closure_of_a_cycle_is_complete() {
        let closure = TransitiveClosure::new(&Digraph::from_edges_iter(vec![(1, 2), (2, 3), (3, 1)]));
        assert_eq!(
            edge_set(closure.closure()),
            HashSet::from([(1, 2), (1, 3), (2, 1), (2, 3), (3, 1), (3, 2)])
        );
    }

    #[test]
    fn diamond_reduction_is_unchanged() {
        let dag = diamond();
        let reduction = TransitiveReduction::new(&dag);
        assert_eq!(edge_set(reduction.reduction()), edge_set(&dag));
    }

    #[test]
    fn shortcut_is_removed() {
        cov_mark::check!(redundant_edge_removed);
        init_logger();
        let dag = Digraph::from_edges_iter(vec![("A", "B"), ("B", "C"), ("A", "C")]);
        let reduction = TransitiveReduction::new(&dag);
        assert_eq!(
            edge_set(reduction.reduction()),
            HashSet::from([("A", "B"), ("B", "C")])
        );
        // The caller's digraph is left alone.
        assert_eq!(dag.edge_count(), 3);
        assert!(reduction.reachable(&"A", &"C"));
    }

    #[test]
    fn reduction_collapses_parallel_edges() {
        let dag = Digraph::from_edges_iter(vec![(1, 2), (1, 2)]);
        let reduction = TransitiveReduction::new(&dag);
        assert_eq!(reduction.reduction().edge_count(), 1);
    }

    #[test]
    fn divisibility_poset_of_12_reduction() {
        let reduction = TransitiveReduction::new(&divisibility_poset_of_12());
        let expected = HashSet::from([
            (3, 9),
            (2, 6),
            (6, 12),
            (1, 7),
            (1, 11),
            (5, 10),
            (3, 6),
            (2, 10),
            (1, 2),
            (4, 12),
            (2, 4),
            (4, 8),
            (1, 5),
            (1, 3),
        ]);
        assert_eq!(edge_set(reduction.reduction()), expected);
    }

    #[test]
    fn divisibility_poset_of_12_descendants() {
        let closure = TransitiveClosure::new(&divisibility_poset_of_12());
        let relation = closure.closure();
        let descendants = |v: u16| {
            let mut descendants: Vec<u16> = relation.iter_children(&v).copied().collect();
            descendants.sort();
            descendants
        };
        assert_eq!(descendants(12), vec![]);
        assert_eq!(descendants(11), vec![]);
        assert_eq!(descendants(6), vec![12]);
        assert_eq!(descendants(4), vec![8, 12]);
        assert_eq!(descendants(3), vec![6, 9, 12]);
        assert_eq!(descendants(2), vec![4, 6, 8, 10, 12]);
        assert_eq!(descendants(1), vec![2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn concurrent_first_access() {
        let reduction = TransitiveReduction::new(&divisibility_poset_of_12());
        let results: Vec<usize> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| reduction.reduction() as *const Digraph<u16> as usize))
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    }

    proptest! {
        #[test]
        fn reduction_is_a_subset_of_closure(dag in arb_dag(0..20, 0.5)) {
            let closure = edge_set(TransitiveClosure::new(&dag).closure());
            let reduction = edge_set(TransitiveReduction::new(&dag).reduction());
            prop_assert!(reduction.is_subset(&closure));
        }

        #[test]
        fn reduction_preserves_reachability(dag in arb_dag(0..15, 0.5)) {
            let reduction = TransitiveReduction::new(&dag);
            let before = edge_set(TransitiveClosure::new(&dag).closure());
            let after = edge_set(TransitiveClosure::new(reduction.reduction()).closure());
            prop_assert_eq!(before, after);
        }

        #[test]
        fn reduction_is_minimal(dag in arb_dag(0..15, 0.5)) {
            let reduction = TransitiveReduction::new(&dag);
            let reduced = reduction.reduction();
            let before = edge_set(TransitiveClosure::new(reduced).closure());
            for (u, v) in edge_set(reduced) {
                let mut without = Digraph::new();
                for vertex in reduced.iter_vertices() {
                    without.add_vertex(*vertex);
                }
                for (a, b) in reduced.iter_edges() {
                    if (*a, *b) != (u, v) {
                        without.add_edge(*a, *b);
                    }
                }
                let after = edge_set(TransitiveClosure::new(&without).closure());
                prop_assert_ne!(&before, &after);
            }
        }
    }
}
