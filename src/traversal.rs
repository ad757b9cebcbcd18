//! Single-source depth-first reachability and multi-source breadth-first
//! shortest paths.

use std::collections::VecDeque;

use roaring::RoaringBitmap;

use crate::{Digraph, Vertex};

/// Everything reachable from one vertex, in terms of dense vertex indices.
#[derive(Clone, Debug, Default)]
pub(crate) struct Reachability {
    marked: RoaringBitmap,
}

impl Reachability {
    pub(crate) fn from_source<V: Vertex>(digraph: &Digraph<V>, source: u32) -> Self {
        let mut marked = RoaringBitmap::new();
        let mut to_visit = vec![source];
        marked.insert(source);
        while let Some(parent) = to_visit.pop() {
            for &child in digraph.children_of(parent) {
                if marked.insert(child) {
                    to_visit.push(child);
                }
            }
        }
        Self { marked }
    }

    #[inline]
    pub(crate) fn contains(&self, index: u32) -> bool {
        self.marked.contains(index)
    }

    /// Includes the source itself.
    pub(crate) fn len(&self) -> u64 {
        self.marked.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.marked.iter()
    }
}

/// Depth-first search from a single source.
///
/// A source that isn't part of the digraph behaves as an isolated vertex: it
/// reaches only itself.
pub struct Dfs<'a, V> {
    digraph: &'a Digraph<V>,
    source: V,
    reachability: Reachability,
}

impl<'a, V: Vertex> Dfs<'a, V> {
    pub fn new(digraph: &'a Digraph<V>, source: V) -> Self {
        let reachability = match digraph.index_of(&source) {
            Some(index) => Reachability::from_source(digraph, index),
            None => Reachability::default(),
        };
        Self {
            digraph,
            source,
            reachability,
        }
    }

    /// Is `destination` reachable from the source?
    pub fn marked(&self, destination: &V) -> bool {
        if *destination == self.source {
            return true;
        }
        self.digraph
            .index_of(destination)
            .is_some_and(|index| self.reachability.contains(index))
    }

    /// Number of vertices reachable from the source, the source included.
    pub fn count(&self) -> usize {
        if self.digraph.contains_vertex(&self.source) {
            self.reachability.len() as usize
        } else {
            1
        }
    }
}

/// Shortest-path tree of a breadth-first search, in terms of dense vertex
/// indices.
#[derive(Clone, Debug)]
pub(crate) struct ShortestPaths {
    marked: RoaringBitmap,
    edge_to: Vec<u32>,
    dist_to: Vec<u32>,
}

impl ShortestPaths {
    /// All `sources` start at distance 0.  The first predecessor to discover a
    /// vertex wins and is never overwritten.
    pub(crate) fn from_sources<V: Vertex>(digraph: &Digraph<V>, sources: &[u32]) -> Self {
        let mut marked = RoaringBitmap::new();
        let mut edge_to: Vec<u32> = vec![0; digraph.vertex_count()];
        let mut dist_to: Vec<u32> = vec![u32::MAX; digraph.vertex_count()];

        for &source in sources {
            marked.insert(source);
            dist_to[source as usize] = 0;
        }
        let mut to_visit: VecDeque<u32> = sources.iter().copied().collect();
        while let Some(parent) = to_visit.pop_front() {
            for &child in digraph.children_of(parent) {
                if marked.insert(child) {
                    edge_to[child as usize] = parent;
                    dist_to[child as usize] = dist_to[parent as usize] + 1;
                    to_visit.push_back(child);
                }
            }
        }

        Self {
            marked,
            edge_to,
            dist_to,
        }
    }

    #[inline]
    pub(crate) fn has_path_to(&self, index: u32) -> bool {
        self.marked.contains(index)
    }

    pub(crate) fn dist_to(&self, index: u32) -> Option<usize> {
        if self.has_path_to(index) {
            Some(self.dist_to[index as usize] as usize)
        } else {
            None
        }
    }

    /// From the nearest source to `index`.  Empty if `index` is unreached.
    pub(crate) fn path_to(&self, index: u32) -> Vec<u32> {
        let mut path = Vec::new();
        if !self.has_path_to(index) {
            return path;
        }
        let mut x = index;
        while self.dist_to[x as usize] != 0 {
            path.push(x);
            x = self.edge_to[x as usize];
        }
        path.push(x);
        path.reverse();
        path
    }
}

/// Breadth-first search from one or more sources, all at distance 0.
///
/// Ties between equally short paths go to whichever predecessor was dequeued
/// first, i.e. they follow the order of the sources and of each vertex's
/// children.  Sources absent from the digraph reach only themselves.
pub struct Bfs<'a, V> {
    digraph: &'a Digraph<V>,
    detached_sources: Vec<V>,
    shortest_paths: ShortestPaths,
}

impl<'a, V: Vertex> Bfs<'a, V> {
    pub fn new(digraph: &'a Digraph<V>, source: V) -> Self {
        Self::from_sources(digraph, std::iter::once(source))
    }

    pub fn from_sources<I: IntoIterator<Item = V>>(digraph: &'a Digraph<V>, sources: I) -> Self {
        let mut indices = Vec::new();
        let mut detached_sources = Vec::new();
        for source in sources {
            match digraph.index_of(&source) {
                Some(index) => indices.push(index),
                None => detached_sources.push(source),
            }
        }
        Self {
            digraph,
            detached_sources,
            shortest_paths: ShortestPaths::from_sources(digraph, &indices),
        }
    }

    pub fn has_path_to(&self, destination: &V) -> bool {
        match self.digraph.index_of(destination) {
            Some(index) => self.shortest_paths.has_path_to(index),
            None => self.detached_sources.contains(destination),
        }
    }

    /// Number of edges on a shortest path from any source.  `None` if
    /// `destination` is unreachable.
    pub fn dist_to(&self, destination: &V) -> Option<usize> {
        match self.digraph.index_of(destination) {
            Some(index) => self.shortest_paths.dist_to(index),
            None if self.detached_sources.contains(destination) => Some(0),
            None => None,
        }
    }

    /// A shortest path from the nearest source to `destination`.  Empty if
    /// `destination` is unreachable.
    pub fn path_to(&self, destination: &V) -> Vec<V> {
        match self.digraph.index_of(destination) {
            Some(index) => self
                .digraph
                .vertices_of(&self.shortest_paths.path_to(index)),
            None if self.detached_sources.contains(destination) => vec![destination.clone()],
            None => Vec::new(),
        }
    }
}
