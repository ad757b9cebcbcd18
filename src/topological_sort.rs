use log::debug;
use roaring::RoaringBitmap;

use crate::{Cycle, Digraph, Error, Vertex};

/// A topological ordering of a DAG: every edge points from an earlier vertex
/// to a later one.
///
/// This is the reversed depth-first postorder, computed with an explicit
/// stack instead of recursion.  Every vertex appears exactly once.
#[derive(Clone, Debug)]
pub struct TopologicalSort<V> {
    order: Vec<V>,
}

impl<V: Vertex> TopologicalSort<V> {
    /// Fails with [`Error::Cycle`] if `dag` isn't acyclic.
    pub fn new(dag: &Digraph<V>) -> crate::Result<Self, V> {
        let order = topologically_ordered_indices(dag)?;
        debug!("topologically sorted {} vertices", order.len());
        Ok(Self {
            order: dag.vertices_of(&order),
        })
    }

    pub fn order(&self) -> &[V] {
        &self.order
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.order.iter()
    }

    pub fn into_order(self) -> Vec<V> {
        self.order
    }
}

impl<'a, V> IntoIterator for &'a TopologicalSort<V> {
    type Item = &'a V;

    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

/// Same as [`TopologicalSort::new`], but in terms of dense vertex indices.
pub(crate) fn topologically_ordered_indices<V: Vertex>(dag: &Digraph<V>) -> crate::Result<Vec<u32>, V> {
    let finder = Cycle::new(dag);
    if finder.has_cycle() {
        return Err(Error::Cycle(finder.into_cycle()));
    }

    let mut marked = RoaringBitmap::new();
    let mut post_order: Vec<u32> = Vec::with_capacity(dag.vertex_count());
    let mut stack: Vec<(u32, usize)> = Vec::new();

    for root in dag.vertex_indices() {
        if marked.contains(root) {
            continue;
        }
        marked.insert(root);
        stack.push((root, 0));

        while let Some((parent, position)) = stack.last_mut() {
            let parent = *parent;
            match dag.children_of(parent).get(*position) {
                Some(&child) => {
                    *position += 1;
                    // Parallel edges are skipped here: the child is already marked.
                    if marked.insert(child) {
                        stack.push((child, 0));
                    }
                }
                None => {
                    // We have visited all the descendants of `parent`.
                    post_order.push(parent);
                    stack.pop();
                }
            }
        }
    }

    post_order.reverse();
    Ok(post_order)
}

/// Vertices without incoming edges, in the topological order of the inverted
/// DAG.
pub fn get_sources<V: Vertex>(dag: &Digraph<V>) -> crate::Result<Vec<V>, V> {
    get_sinks(&dag.inverted())
}

/// Vertices without outgoing edges, in topological order.
pub fn get_sinks<V: Vertex>(dag: &Digraph<V>) -> crate::Result<Vec<V>, V> {
    let sort = TopologicalSort::new(dag)?;
    Ok(sort
        .into_order()
        .into_iter()
        .filter(|vertex| dag.is_sink(vertex))
        .collect())
}
