//! Depth-first cycle detection.

use log::debug;
use roaring::RoaringBitmap;

use crate::{Digraph, Vertex};

/// Finds one directed cycle in a digraph, if there is any.
///
/// Every vertex (keys and children alike) is used as a DFS root in turn, so
/// disconnected components and isolated sinks are covered.  The search stops
/// at the first back edge.
#[derive(Clone, Debug)]
pub struct Cycle<V> {
    cycle: Vec<V>,
}

impl<V: Vertex> Cycle<V> {
    pub fn new(digraph: &Digraph<V>) -> Self {
        let cycle = find_cycle(digraph)
            .map(|indices| digraph.vertices_of(&indices))
            .unwrap_or_default();
        if !cycle.is_empty() {
            debug!("found a cycle of {} vertices", cycle.len() - 1);
        }
        Self { cycle }
    }

    pub fn has_cycle(&self) -> bool {
        !self.cycle.is_empty()
    }

    /// The witness cycle as a closed walk: the first and the last vertex are
    /// the same.  Empty if the digraph is acyclic.
    pub fn cycle(&self) -> &[V] {
        &self.cycle
    }

    pub fn into_cycle(self) -> Vec<V> {
        self.cycle
    }
}

fn find_cycle<V: Vertex>(digraph: &Digraph<V>) -> Option<Vec<u32>> {
    let mut marked = RoaringBitmap::new();
    let mut on_stack = RoaringBitmap::new();
    let mut edge_to: Vec<u32> = vec![0; digraph.vertex_count()];
    // (vertex, position of the next child to explore)
    let mut stack: Vec<(u32, usize)> = Vec::new();

    for root in digraph.vertex_indices() {
        if marked.contains(root) {
            continue;
        }
        marked.insert(root);
        on_stack.insert(root);
        stack.push((root, 0));

        while let Some((parent, position)) = stack.last_mut() {
            let parent = *parent;
            let Some(&child) = digraph.children_of(parent).get(*position) else {
                on_stack.remove(parent);
                stack.pop();
                continue;
            };
            *position += 1;

            if !marked.contains(child) {
                edge_to[child as usize] = parent;
                marked.insert(child);
                on_stack.insert(child);
                stack.push((child, 0));
            } else if on_stack.contains(child) {
                cov_mark::hit!(back_edge_found);
                let mut walk = Vec::new();
                let mut inbred = parent;
                while inbred != child {
                    walk.push(inbred);
                    inbred = edge_to[inbred as usize];
                }
                walk.push(child);
                walk.push(parent);
                walk.reverse();
                return Some(walk);
            }
        }
    }

    None
}
