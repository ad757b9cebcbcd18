//! Enumeration and counting of every path between two vertex sets of a DAG.

use std::collections::HashMap;

use log::debug;
use roaring::RoaringBitmap;

use crate::topological_sort::topologically_ordered_indices;
use crate::{get_sinks, get_sources, Cycle, Digraph, Error, Vertex};

/// Every path of a DAG from a set of sources to a set of destinations.
///
/// Paths end at the first destination they meet: a destination is never
/// extended further, and a source that is itself a destination yields the
/// single-vertex path.  Paths come in source order and, within one source, in
/// depth-first discovery order.  Each parallel edge yields its own copy of
/// every path through it.
#[derive(Clone, Debug)]
pub struct AllPaths<V> {
    paths: Vec<Vec<V>>,
}

impl<V: Vertex> AllPaths<V> {
    /// Fails with [`Error::Cycle`] if `dag` isn't acyclic.
    pub fn new<S, D>(dag: &Digraph<V>, sources: S, destinations: D) -> crate::Result<Self, V>
    where
        S: IntoIterator<Item = V>,
        D: IntoIterator<Item = V>,
    {
        let finder = Cycle::new(dag);
        if finder.has_cycle() {
            return Err(Error::Cycle(finder.into_cycle()));
        }

        let destinations: Vec<V> = destinations.into_iter().collect();
        let destination_indices: RoaringBitmap = destinations
            .iter()
            .filter_map(|destination| dag.index_of(destination))
            .collect();

        let mut paths = Vec::new();
        for source in sources {
            match dag.index_of(&source) {
                Some(root) => {
                    enumerate_from(dag, root, &destination_indices, |path| {
                        paths.push(dag.vertices_of(path))
                    });
                }
                None if destinations.contains(&source) => {
                    cov_mark::hit!(detached_source_is_destination);
                    paths.push(vec![source]);
                }
                None => {}
            }
        }

        debug!("enumerated {} paths", paths.len());
        Ok(Self { paths })
    }

    pub fn between(dag: &Digraph<V>, source: V, destination: V) -> crate::Result<Self, V> {
        Self::new(dag, std::iter::once(source), std::iter::once(destination))
    }

    /// Every path from `source` to any sink.
    pub fn to_sinks(dag: &Digraph<V>, source: V) -> crate::Result<Self, V> {
        let sinks = get_sinks(dag)?;
        Self::new(dag, std::iter::once(source), sinks)
    }

    /// Every path from any source to any sink.
    pub fn sources_to_sinks(dag: &Digraph<V>) -> crate::Result<Self, V> {
        let sources = get_sources(dag)?;
        let sinks = get_sinks(dag)?;
        Self::new(dag, sources, sinks)
    }

    pub fn paths(&self) -> &[Vec<V>] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<Vec<V>> {
        self.paths
    }
}

/// Backtracking depth-first search from `root`, calling `emit` with every
/// path that reaches a destination.
fn enumerate_from<V: Vertex, F: FnMut(&[u32])>(
    dag: &Digraph<V>,
    root: u32,
    destinations: &RoaringBitmap,
    mut emit: F,
) {
    let mut path: Vec<u32> = vec![root];
    if destinations.contains(root) {
        cov_mark::hit!(source_is_destination);
        emit(&path);
        return;
    }

    let mut stack: Vec<(u32, usize)> = vec![(root, 0)];
    while let Some((parent, position)) = stack.last_mut() {
        let parent = *parent;
        let Some(&child) = dag.children_of(parent).get(*position) else {
            stack.pop();
            path.pop();
            continue;
        };
        *position += 1;
        path.push(child);
        if destinations.contains(child) {
            emit(&path);
            path.pop();
        } else {
            stack.push((child, 0));
        }
    }
}

/// Number of paths from `sources` to `destinations` in a DAG, without
/// enumerating them.
///
/// Counts are seeded with one per source occurrence (a source listed twice
/// counts twice) and pushed to children in topological order.  Unlike
/// [`AllPaths`], paths are counted through intermediate destinations too.
/// Fails with [`Error::Cycle`] if `dag` isn't acyclic and with
/// [`Error::PathCountOverflow`] if any intermediate count exceeds `u64`.
pub fn count_paths<V, S, D>(dag: &Digraph<V>, sources: S, destinations: D) -> crate::Result<u64, V>
where
    V: Vertex,
    S: IntoIterator<Item = V>,
    D: IntoIterator<Item = V>,
{
    let order = topologically_ordered_indices(dag)?;

    let mut counts: Vec<u64> = vec![0; dag.vertex_count()];
    let mut detached_counts: HashMap<V, u64> = HashMap::new();
    for source in sources {
        match dag.index_of(&source) {
            Some(index) => {
                if counts[index as usize] > 0 {
                    cov_mark::hit!(duplicate_source_counted_again);
                }
                counts[index as usize] = add_counts(counts[index as usize], 1)?;
            }
            None => {
                let count = detached_counts.entry(source).or_default();
                *count = add_counts(*count, 1)?;
            }
        }
    }

    for parent in order {
        let count = counts[parent as usize];
        if count == 0 {
            continue;
        }
        for &child in dag.children_of(parent) {
            counts[child as usize] = add_counts(counts[child as usize], count)?;
        }
    }

    destinations
        .into_iter()
        .map(|destination| match dag.index_of(&destination) {
            Some(index) => counts[index as usize],
            None => detached_counts.get(&destination).copied().unwrap_or(0),
        })
        .try_fold(0, add_counts::<V>)
}

fn add_counts<V: Vertex>(left: u64, right: u64) -> crate::Result<u64, V> {
    left.checked_add(right).ok_or_else(|| {
        cov_mark::hit!(path_count_overflow);
        Error::PathCountOverflow
    })
}

pub fn count_paths_between<V: Vertex>(dag: &Digraph<V>, source: V, destination: V) -> crate::Result<u64, V> {
    count_paths(dag, std::iter::once(source), std::iter::once(destination))
}

/// Number of paths from any source to any sink.
pub fn count_all_paths<V: Vertex>(dag: &Digraph<V>) -> crate::Result<u64, V> {
    let sources = get_sources(dag)?;
    let sinks = get_sinks(dag)?;
    count_paths(dag, sources, sinks)
}
