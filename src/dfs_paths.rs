use roaring::RoaringBitmap;

use crate::{Digraph, Vertex};

/// Single-source reachability with *a* path to every reachable vertex.
///
/// Unlike [`crate::Bfs`] the paths are not necessarily shortest: each vertex
/// keeps the predecessor through which depth-first search discovered it first.
pub struct DfsPaths<'a, V> {
    digraph: &'a Digraph<V>,
    source: V,
    marked: RoaringBitmap,
    edge_to: Vec<u32>,
}

impl<'a, V: Vertex> DfsPaths<'a, V> {
    pub fn new(digraph: &'a Digraph<V>, source: V) -> Self {
        let mut marked = RoaringBitmap::new();
        let mut edge_to: Vec<u32> = vec![0; digraph.vertex_count()];

        if let Some(root) = digraph.index_of(&source) {
            marked.insert(root);
            let mut stack: Vec<(u32, usize)> = vec![(root, 0)];
            while let Some((parent, position)) = stack.last_mut() {
                let parent = *parent;
                let Some(&child) = digraph.children_of(parent).get(*position) else {
                    stack.pop();
                    continue;
                };
                *position += 1;
                if marked.insert(child) {
                    edge_to[child as usize] = parent;
                    stack.push((child, 0));
                }
            }
        }

        Self {
            digraph,
            source,
            marked,
            edge_to,
        }
    }

    pub fn has_path_to(&self, destination: &V) -> bool {
        if *destination == self.source {
            return true;
        }
        self.digraph
            .index_of(destination)
            .is_some_and(|index| self.marked.contains(index))
    }

    /// Empty if `destination` is unreachable.
    pub fn path_to(&self, destination: &V) -> Vec<V> {
        if *destination == self.source {
            return vec![self.source.clone()];
        }
        let (Some(root), Some(index)) = (
            self.digraph.index_of(&self.source),
            self.digraph.index_of(destination),
        ) else {
            return Vec::new();
        };
        if !self.marked.contains(index) {
            return Vec::new();
        }

        let mut path = Vec::new();
        let mut x = index;
        while x != root {
            path.push(x);
            x = self.edge_to[x as usize];
        }
        path.push(root);
        path.reverse();
        self.digraph.vertices_of(&path)
    }
}
