//! Classical algorithms over directed graphs given as an adjacency relation:
//! every vertex maps to an ordered, possibly duplicated, list of children.
//!
//! Every algorithm is an object constructed from a [`Digraph`].  Construction
//! performs the traversal eagerly (except for the lazily computed
//! [`TransitiveClosure::closure`] and [`TransitiveReduction::reduction`]) and
//! the resulting object answers read-only queries.  Per-run traversal state is
//! keyed by the dense vertex index assigned by [`Digraph`] and stored in
//! roaring bitmaps and plain vectors.
//!
//! Algorithms that require acyclicity ([`TopologicalSort`], [`AllPaths`],
//! [`count_paths`]) run the [`Cycle`] detector first and fail with
//! [`Error::Cycle`] carrying the witness cycle.
//!
//! ## Anti-features
//!
//! * No weighted edges.
//! * No general graph mutation beyond building a [`Digraph`].
//! * Recursion-free, but still in-memory only: the whole graph has to fit in
//!   one process.

use std::fmt::Debug;
use std::hash::Hash;

pub mod all_paths;
pub mod cycle;
pub mod dfs_paths;
pub mod digraph;
pub mod error;
pub mod lca;
pub mod topological_sort;
pub mod transitive;
pub mod traversal;

/// Anything usable as a vertex identity.
pub trait Vertex: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Vertex for T {}

pub use all_paths::{count_all_paths, count_paths, count_paths_between, AllPaths};
pub use cycle::Cycle;
pub use dfs_paths::DfsPaths;
pub use digraph::{arb_dag, arb_digraph, Digraph};
pub use error::{Error, Result};
pub use lca::Lca;
pub use topological_sort::{get_sinks, get_sources, TopologicalSort};
pub use transitive::{TransitiveClosure, TransitiveReduction};
pub use traversal::{Bfs, Dfs};
