//! Low-level directed graph storage.
//!
//! [`GraphInternal`] keeps nodes in insertion order and indexes edges by both
//! endpoints, so the process graph can answer "what leaves this node" and
//! "what arrives at this node" without scanning the edge list.

use std::collections::HashMap;

use indexmap::IndexMap;

use laneflow_core::identifier::Id;

// =============================================================================
// Low-level primitive types
// =============================================================================

/// Index of an edge in [`GraphInternal`]'s edge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeIndex(usize);

// =============================================================================
// Core internal graph structure
// =============================================================================

/// Directed graph with node data `N` and edge data `E`.
///
/// Node iteration follows insertion order. Edges between the same pair of
/// nodes are allowed; callers deduplicate before inserting when needed.
#[derive(Debug)]
pub(super) struct GraphInternal<N, E>
where
    N: Copy + std::fmt::Debug,
    E: Copy + std::fmt::Debug,
{
    nodes: IndexMap<Id, N>,
    edges: Vec<E>,
    income_edges: HashMap<Id, Vec<EdgeIndex>>,
    outgoing_edges: HashMap<Id, Vec<EdgeIndex>>,
}

impl<N, E> GraphInternal<N, E>
where
    N: Copy + std::fmt::Debug,
    E: Copy + std::fmt::Debug,
{
    pub(super) fn new() -> Self {
        GraphInternal {
            nodes: IndexMap::new(),
            edges: Vec::new(),
            income_edges: HashMap::new(),
            outgoing_edges: HashMap::new(),
        }
    }

    /// Returns the node data for the given ID, if it exists.
    pub(super) fn node(&self, id: Id) -> Option<N> {
        self.nodes.get(&id).copied()
    }

    /// Returns the insertion position of the node with the given ID.
    pub(super) fn node_position(&self, id: Id) -> Option<usize> {
        self.nodes.get_index_of(&id)
    }

    /// Returns an iterator over all node data in insertion order.
    pub(super) fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.nodes.values().copied()
    }

    pub(super) fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub(super) fn contains_node(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns an iterator over all edge data in insertion order.
    pub(super) fn edges(&self) -> impl Iterator<Item = E> + '_ {
        self.edges.iter().copied()
    }

    pub(super) fn edges_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the data of edges leaving `source_id`, in insertion order.
    pub(super) fn outgoing(&self, source_id: Id) -> impl Iterator<Item = E> + '_ {
        self.outgoing_edges
            .get(&source_id)
            .into_iter()
            .flatten()
            .map(|idx| self.edges[idx.0])
    }

    /// Returns the data of edges arriving at `target_id`, in insertion order.
    pub(super) fn incoming(&self, target_id: Id) -> impl Iterator<Item = E> + '_ {
        self.income_edges
            .get(&target_id)
            .into_iter()
            .flatten()
            .map(|idx| self.edges[idx.0])
    }

    /// Returns the ids of nodes that have no incoming edge, in insertion order.
    pub(super) fn roots(&self) -> impl Iterator<Item = Id> + '_ {
        self.nodes
            .keys()
            .copied()
            .filter(|id| !self.income_edges.contains_key(id))
    }

    /// Adds a node to the graph.
    ///
    /// Returns `false` and leaves the graph untouched when a node with the
    /// same ID already exists.
    pub(super) fn add_node(&mut self, id: Id, node: N) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, node);
        true
    }

    /// Adds a directed edge between two existing nodes.
    ///
    /// # Panics
    /// Panics in debug builds if either endpoint is missing. Callers validate
    /// endpoints first.
    pub(super) fn add_edge(&mut self, source_id: Id, target_id: Id, edge: E) {
        debug_assert!(
            self.nodes.contains_key(&source_id),
            "Adding edge: Source node {source_id} does not exist for {edge:?}",
        );
        debug_assert!(
            self.nodes.contains_key(&target_id),
            "Adding edge: Target node {target_id} does not exist for {edge:?}",
        );

        self.edges.push(edge);

        let idx = EdgeIndex(self.edges.len() - 1);
        self.outgoing_edges.entry(source_id).or_default().push(idx);
        self.income_edges.entry(target_id).or_default().push(idx);
    }
}
