//! Directed graphs represented as an adjacency relation: every vertex maps to
//! an ordered list of children.
//!
//! The relation is a multimap.  Duplicate edges are kept (they multiply path
//! counts) and a vertex may be present with zero children.  Internally every
//! vertex gets a dense `u32` index the first time it is seen, either as a key
//! or as a child, so algorithms can keep their per-vertex state in bitmaps and
//! vectors instead of hash maps.  Iteration over vertices follows that
//! first-seen order.

use std::collections::HashMap;
use std::io::Write;
use std::ops::Range;

use proptest::prelude::*;
use proptest::strategy::{NewTree, ValueTree};
use proptest::test_runner::TestRunner;
use rand::distributions::Uniform;
use rand::prelude::Distribution;
use rand::Rng;
use roaring::RoaringBitmap;

use crate::Vertex;

/// An in-memory directed graph with caller-supplied vertex identities.
#[derive(Clone)]
pub struct Digraph<V> {
    vertices: Vec<V>,
    indices: HashMap<V, u32>,
    children: Vec<Vec<u32>>,
}

impl<V> Default for Digraph<V> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            indices: HashMap::new(),
            children: Vec::new(),
        }
    }
}

impl<V: Vertex> PartialEq for Digraph<V> {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices && self.children == other.children
    }
}

impl<V: Vertex> Eq for Digraph<V> {}

impl<V: Vertex> std::fmt::Debug for Digraph<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let edges: Vec<(&V, &V)> = self.iter_edges().collect();
        write!(f, "Digraph::from_edges_iter(vec!{:?})", edges)?;
        Ok(())
    }
}

impl<V: Vertex> Digraph<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a digraph from `(parent, child)` pairs, keeping their order
    /// and any duplicates.
    pub fn from_edges_iter<I: IntoIterator<Item = (V, V)>>(edges: I) -> Self {
        let mut digraph = Self::new();
        for (parent, child) in edges {
            digraph.add_edge(parent, child);
        }
        digraph
    }

    /// Adds `vertex` with no children.  Does nothing if it's already present.
    pub fn add_vertex(&mut self, vertex: V) {
        self.intern(vertex);
    }

    /// Appends `child` to the children of `parent`, even if the same edge is
    /// already present.
    pub fn add_edge(&mut self, parent: V, child: V) {
        let parent = self.intern(parent);
        let child = self.intern(child);
        self.children[parent as usize].push(child);
    }

    fn intern(&mut self, vertex: V) -> u32 {
        if let Some(index) = self.indices.get(&vertex) {
            return *index;
        }
        assert!(self.vertices.len() < u32::MAX as usize);
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex.clone());
        self.indices.insert(vertex, index);
        self.children.push(Vec::new());
        index
    }

    /// Removes every copy of the edge `parent -> child`.  Returns whether
    /// anything was removed.
    pub(crate) fn clear_edge(&mut self, parent: u32, child: u32) -> bool {
        let children = &mut self.children[parent as usize];
        let before = children.len();
        children.retain(|v| *v != child);
        children.len() != before
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Counts parallel edges separately.
    pub fn edge_count(&self) -> usize {
        self.children.iter().map(Vec::len).sum()
    }

    pub fn contains_vertex(&self, vertex: &V) -> bool {
        self.indices.contains_key(vertex)
    }

    /// Iterates over all vertices, keys and children alike, in first-seen order.
    pub fn iter_vertices(&self) -> impl Iterator<Item = &V> + '_ {
        self.vertices.iter()
    }

    /// Iterates over the children of `vertex` in insertion order, duplicates
    /// included.  Empty for unknown vertices.
    pub fn iter_children<'a>(&'a self, vertex: &V) -> impl Iterator<Item = &'a V> + 'a {
        let children: &[u32] = match self.index_of(vertex) {
            Some(index) => self.children_of(index),
            None => &[],
        };
        children.iter().map(move |child| self.vertex(*child))
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = (&V, &V)> + '_ {
        self.children.iter().enumerate().flat_map(move |(parent, children)| {
            children
                .iter()
                .map(move |child| (&self.vertices[parent], self.vertex(*child)))
        })
    }

    /// A vertex without any outgoing edge.
    pub fn is_sink(&self, vertex: &V) -> bool {
        self.iter_children(vertex).next().is_none()
    }

    /// Returns a digraph with every edge reversed.  All vertices are kept, in
    /// the same order.
    pub fn inverted(&self) -> Self {
        let mut result = Self::new();
        for vertex in &self.vertices {
            result.add_vertex(vertex.clone());
        }
        for (parent, child) in self.iter_edges() {
            result.add_edge(child.clone(), parent.clone());
        }
        result
    }

    /// Returns a copy where each edge appears at most once, keeping the first
    /// occurrence of every child.
    pub fn without_parallel_edges(&self) -> Self {
        let mut result = self.clone();
        for children in result.children.iter_mut() {
            let mut seen = RoaringBitmap::new();
            children.retain(|child| seen.insert(*child));
        }
        result
    }

    #[inline]
    pub(crate) fn index_of(&self, vertex: &V) -> Option<u32> {
        self.indices.get(vertex).copied()
    }

    #[inline]
    pub(crate) fn vertex(&self, index: u32) -> &V {
        &self.vertices[index as usize]
    }

    #[inline]
    pub(crate) fn children_of(&self, index: u32) -> &[u32] {
        &self.children[index as usize]
    }

    #[inline]
    pub(crate) fn vertex_indices(&self) -> Range<u32> {
        0..self.vertices.len() as u32
    }

    pub(crate) fn vertices_of(&self, indices: &[u32]) -> Vec<V> {
        indices
            .iter()
            .map(|index| self.vertex(*index).clone())
            .collect()
    }

    /// Outputs the digraph in the [Graphviz DOT](https://graphviz.org/) format.
    pub fn to_dot<W: Write>(&self, output: &mut W) -> std::result::Result<(), std::io::Error> {
        writeln!(output, "digraph digraph_{} {{", self.vertex_count())?;

        for (index, vertex) in self.vertices.iter().enumerate() {
            let label = format!("{:?}", vertex).replace('"', "\\\"");
            writeln!(output, "\t_{}[label=\"{}\"];", index, label)?;
        }

        writeln!(output, "\n")?;

        for (parent, children) in self.children.iter().enumerate() {
            for child in children {
                writeln!(output, "\t_{} -> _{};", parent, child)?;
            }
        }

        writeln!(output, "}}")?;
        Ok(())
    }

    pub fn to_dot_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), std::io::Error> {
        let mut file = std::fs::File::create(path)?;
        self.to_dot(&mut file)?;
        Ok(())
    }
}

/// Random digraphs over vertices `0..n`, without self loops.  Most of them
/// contain cycles.
pub fn arb_digraph(vertex_count: impl Into<Range<u16>>, edge_probability: f64) -> DigraphStrategy {
    DigraphStrategy {
        vertex_count: vertex_count.into(),
        edge_probability,
        acyclic: false,
    }
}

/// Random DAGs over vertices `0..n`.  Edges only go from a lower to a higher
/// vertex, so cycles are unrepresentable.
pub fn arb_dag(vertex_count: impl Into<Range<u16>>, edge_probability: f64) -> DigraphStrategy {
    DigraphStrategy {
        vertex_count: vertex_count.into(),
        edge_probability,
        acyclic: true,
    }
}

#[derive(Debug)]
pub struct DigraphStrategy {
    vertex_count: Range<u16>,
    edge_probability: f64,
    acyclic: bool,
}

/// Shrinks by dropping candidate edges one at a time.  Vertices are never
/// dropped, so the vertex set stays `0..vertex_count`.
#[derive(Debug)]
pub struct DigraphValueTree {
    vertex_count: u16,
    candidates: Vec<(u16, u16)>,
    kept: RoaringBitmap,
    next_candidate: u32,
    last_removed: Option<u32>,
}

impl Strategy for DigraphStrategy {
    type Tree = DigraphValueTree;

    type Value = Digraph<u16>;

    fn new_tree(&self, runner: &mut TestRunner) -> NewTree<Self> {
        if self.vertex_count.is_empty() {
            panic!(
                "Invalid use of empty size range. (hint: did you \
                 accidentally write {}..{} where you meant {}..={} \
                 somewhere?)",
                self.vertex_count.start,
                self.vertex_count.end,
                self.vertex_count.start,
                self.vertex_count.end
            );
        }
        if !(0.0..=1.0).contains(&self.edge_probability) {
            panic!(
                "Invalid probability set for generating edges. \
                 Needs to be a number between 0 and 1, but got {}",
                self.edge_probability
            );
        }
        let vertex_count =
            Uniform::new(self.vertex_count.start, self.vertex_count.end).sample(runner.rng());
        let candidates: Vec<(u16, u16)> = (0..vertex_count)
            .flat_map(|u| (0..vertex_count).map(move |v| (u, v)))
            .filter(|(u, v)| if self.acyclic { u < v } else { u != v })
            .collect();
        let mut kept = RoaringBitmap::new();
        for index in 0..candidates.len() as u32 {
            if runner.rng().gen_bool(self.edge_probability) {
                kept.insert(index);
            }
        }
        Ok(DigraphValueTree {
            vertex_count,
            candidates,
            kept,
            next_candidate: 0,
            last_removed: None,
        })
    }
}

impl ValueTree for DigraphValueTree {
    type Value = Digraph<u16>;

    fn current(&self) -> Self::Value {
        let mut digraph = Digraph::new();
        for vertex in 0..self.vertex_count {
            digraph.add_vertex(vertex);
        }
        for index in self.kept.iter() {
            let (parent, child) = self.candidates[index as usize];
            digraph.add_edge(parent, child);
        }
        digraph
    }

    fn simplify(&mut self) -> bool {
        while (self.next_candidate as usize) < self.candidates.len() {
            let candidate = self.next_candidate;
            self.next_candidate += 1;
            if self.kept.remove(candidate) {
                self.last_removed = Some(candidate);
                return true;
            }
        }
        false
    }

    fn complicate(&mut self) -> bool {
        match self.last_removed.take() {
            Some(candidate) => {
                self.kept.insert(candidate);
                true
            }
            None => false,
        }
    }
}
