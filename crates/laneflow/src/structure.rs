//! Logical process graph built from a validated blueprint.
//!
//! [`GraphBuilder`] is the entry point of the layout pipeline. It rejects
//! blueprints that cannot be laid out, derives the sequence flows, indexes
//! them by source and target, partitions nodes by lane, and then drives
//! [`RankAssigner`] and [`GeometryBuilder`].

mod graph_base;

use indexmap::IndexMap;
use log::{debug, info, trace};

use laneflow_core::{
    identifier::Id,
    semantic::{Blueprint, Lane, Node, NodeKind},
};

use crate::{
    config::LayoutConfig,
    error::{LaneflowError, SpecError},
    layout::{GeometryBuilder, ProcessGeometry, RankAssigner, RankMap},
};

use graph_base::GraphInternal;

/// A directed sequence flow between two nodes.
///
/// A flow is identified by its endpoints: the blueprint never yields two
/// flows for the same (source, target) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceEdge {
    source: Id,
    target: Id,
}

impl SequenceEdge {
    pub fn new(source: Id, target: Id) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }
}

/// The validated node/edge/lane structure of a blueprint.
#[derive(Debug)]
pub struct ProcessGraph<'a> {
    name: Option<&'a str>,
    graph: GraphInternal<&'a Node, SequenceEdge>,
    lanes: &'a [Lane],
    lane_members: IndexMap<Id, Vec<Id>>,
}

impl<'a> ProcessGraph<'a> {
    /// Workflow name, when the blueprint carries one.
    pub fn name(&self) -> Option<&'a str> {
        self.name
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.graph.nodes()
    }

    pub fn node(&self, id: Id) -> Option<&'a Node> {
        self.graph.node(id)
    }

    /// Declaration index of a node.
    pub fn node_index(&self, id: Id) -> Option<usize> {
        self.graph.node_position(id)
    }

    /// The first declared node, where traversal starts.
    pub fn first_node(&self) -> Option<&'a Node> {
        self.graph.nodes().next()
    }

    pub fn nodes_count(&self) -> usize {
        self.graph.nodes_count()
    }

    /// Sequence flows in derivation order: by source declaration, then by
    /// branch order.
    pub fn edges(&self) -> impl Iterator<Item = SequenceEdge> + '_ {
        self.graph.edges()
    }

    pub fn edges_count(&self) -> usize {
        self.graph.edges_count()
    }

    /// Flows leaving `id`.
    pub fn outgoing(&self, id: Id) -> impl Iterator<Item = SequenceEdge> + '_ {
        self.graph.outgoing(id)
    }

    /// Flows arriving at `id`.
    pub fn incoming(&self, id: Id) -> impl Iterator<Item = SequenceEdge> + '_ {
        self.graph.incoming(id)
    }

    /// Nodes no flow arrives at.
    pub fn roots(&self) -> impl Iterator<Item = Id> + '_ {
        self.graph.roots()
    }

    /// Lanes in declaration order.
    pub fn lanes(&self) -> &'a [Lane] {
        self.lanes
    }

    /// Ids of the nodes in `lane`, in declaration order.
    pub fn lane_members(&self, lane: Id) -> &[Id] {
        self.lane_members
            .get(&lane)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Position of `lane` in declaration order.
    pub fn lane_index(&self, lane: Id) -> Option<usize> {
        self.lane_members.get_index_of(&lane)
    }
}

/// The result of a full layout: logical graph, ranks and geometry.
#[derive(Debug)]
pub struct ProcessDiagram<'a> {
    graph: ProcessGraph<'a>,
    ranks: RankMap,
    geometry: ProcessGeometry,
}

impl<'a> ProcessDiagram<'a> {
    pub fn graph(&self) -> &ProcessGraph<'a> {
        &self.graph
    }

    pub fn ranks(&self) -> &RankMap {
        &self.ranks
    }

    pub fn geometry(&self) -> &ProcessGeometry {
        &self.geometry
    }
}

/// Validates blueprints and runs the layout pipeline.
///
/// The builder holds no per-conversion state; one instance can lay out any
/// number of blueprints.
///
/// # Examples
///
/// ```
/// use laneflow::config::LayoutConfig;
/// use laneflow::identifier::Id;
/// use laneflow::semantic::{Blueprint, Lane, Node, NodeKind, Successors};
/// use laneflow::structure::GraphBuilder;
///
/// let lane = Id::new("1");
/// let blueprint = Blueprint::new(
///     Some(vec![
///         Node::new(Id::new("1"), NodeKind::Start, "Begin", lane, Successors::Single(Id::new("99"))),
///         Node::new(Id::new("99"), NodeKind::Finish, "End", lane, Successors::None),
///     ]),
///     Some(vec![Lane::new(lane, "default")]),
/// );
///
/// let layout = LayoutConfig::default();
/// let diagram = GraphBuilder::new(&layout).build(&blueprint).unwrap();
/// assert_eq!(diagram.graph().edges_count(), 1);
/// assert_eq!(diagram.ranks().lane_depths(), &[1]);
/// ```
pub struct GraphBuilder<'c> {
    layout: &'c LayoutConfig,
}

impl<'c> GraphBuilder<'c> {
    pub fn new(layout: &'c LayoutConfig) -> Self {
        Self { layout }
    }

    /// Validates `blueprint` and runs rank assignment and geometry.
    ///
    /// # Errors
    ///
    /// Returns [`LaneflowError::InvalidSpecification`] for blueprints that
    /// fail validation and [`LaneflowError::Layout`] for grid conflicts.
    pub fn build<'a>(&self, blueprint: &'a Blueprint) -> Result<ProcessDiagram<'a>, LaneflowError> {
        let graph = Self::build_graph(blueprint)?;

        let ranks = RankAssigner::new(&graph).assign()?;
        info!(
            ranked = ranks.len(),
            nodes = graph.nodes_count();
            "Ranks assigned"
        );

        let geometry = GeometryBuilder::new(self.layout).build(&graph, &ranks);
        info!(
            shapes = geometry.node_bounds().len(),
            edges = geometry.edge_waypoints().len(),
            omitted = geometry.omitted().len();
            "Geometry built"
        );

        Ok(ProcessDiagram {
            graph,
            ranks,
            geometry,
        })
    }

    /// Validates `blueprint` and derives its logical graph.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecError`] when a collection is missing, the node list is
    /// empty, an id is declared twice, a node names an undeclared lane, or a
    /// `next` refers to an unknown node.
    pub fn build_graph(blueprint: &Blueprint) -> Result<ProcessGraph<'_>, SpecError> {
        let nodes = blueprint.nodes().ok_or(SpecError::MissingNodes)?;
        let lanes = blueprint.lanes().ok_or(SpecError::MissingLanes)?;
        if nodes.is_empty() {
            return Err(SpecError::EmptyNodes);
        }

        let mut lane_members: IndexMap<Id, Vec<Id>> = IndexMap::with_capacity(lanes.len());
        for lane in lanes {
            if lane_members.insert(lane.id(), Vec::new()).is_some() {
                return Err(SpecError::DuplicateLane(lane.id()));
            }
        }

        let mut graph = GraphInternal::new();
        for node in nodes {
            let Some(members) = lane_members.get_mut(&node.lane_id()) else {
                return Err(SpecError::UnknownLane {
                    node: node.id(),
                    lane: node.lane_id(),
                });
            };
            if !graph.add_node(node.id(), node) {
                return Err(SpecError::DuplicateNode(node.id()));
            }
            members.push(node.id());
        }

        for node in nodes {
            if let Some(target) = node
                .next()
                .referenced_targets()
                .find(|target| !graph.contains_node(*target))
            {
                return Err(SpecError::UnknownTarget {
                    node: node.id(),
                    target,
                });
            }
        }

        for node in nodes {
            if node.kind() == NodeKind::Finish {
                if !node.next().distinct_targets().is_empty() {
                    debug!(node:% = node.id(); "Ignoring successors of finish node");
                }
                continue;
            }
            for target in node.next().distinct_targets() {
                trace!(source:% = node.id(), target:% = target; "Adding sequence flow");
                graph.add_edge(node.id(), target, SequenceEdge::new(node.id(), target));
            }
        }

        let graph = ProcessGraph {
            name: blueprint.name(),
            graph,
            lanes,
            lane_members,
        };
        debug!(
            nodes = graph.nodes_count(),
            edges = graph.edges_count(),
            lanes = lanes.len(),
            roots = graph.roots().count();
            "Process graph built"
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use laneflow_core::semantic::{Branch, Successors};

    use super::*;

    fn node(id: &str, kind: NodeKind, lane: &str, next: Successors) -> Node {
        Node::new(Id::new(id), kind, format!("node {id}"), Id::new(lane), next)
    }

    fn single(id: &str) -> Successors {
        Successors::Single(Id::new(id))
    }

    fn lanes(ids: &[&str]) -> Option<Vec<Lane>> {
        Some(ids.iter().map(|id| Lane::new(Id::new(id), *id)).collect())
    }

    #[test]
    fn test_missing_collections() {
        let no_lanes = Blueprint::new(Some(vec![node("1", NodeKind::Start, "1", Successors::None)]), None);
        assert_eq!(
            GraphBuilder::build_graph(&no_lanes).unwrap_err(),
            SpecError::MissingLanes
        );

        let no_nodes = Blueprint::new(None, lanes(&["1"]));
        assert_eq!(
            GraphBuilder::build_graph(&no_nodes).unwrap_err(),
            SpecError::MissingNodes
        );

        let empty = Blueprint::new(Some(Vec::new()), lanes(&["1"]));
        assert_eq!(
            GraphBuilder::build_graph(&empty).unwrap_err(),
            SpecError::EmptyNodes
        );
    }

    #[test]
    fn test_duplicates_rejected() {
        let duplicate_node = Blueprint::new(
            Some(vec![
                node("1", NodeKind::Start, "1", single("2")),
                node("2", NodeKind::Finish, "1", Successors::None),
                node("1", NodeKind::UserTask, "1", Successors::None),
            ]),
            lanes(&["1"]),
        );
        assert_eq!(
            GraphBuilder::build_graph(&duplicate_node).unwrap_err(),
            SpecError::DuplicateNode(Id::new("1"))
        );

        let duplicate_lane = Blueprint::new(
            Some(vec![node("1", NodeKind::Start, "1", Successors::None)]),
            lanes(&["1", "1"]),
        );
        assert_eq!(
            GraphBuilder::build_graph(&duplicate_lane).unwrap_err(),
            SpecError::DuplicateLane(Id::new("1"))
        );
    }

    #[test]
    fn test_unknown_references_rejected() {
        let unknown_lane = Blueprint::new(
            Some(vec![node("1", NodeKind::Start, "ghost", Successors::None)]),
            lanes(&["1"]),
        );
        assert_eq!(
            GraphBuilder::build_graph(&unknown_lane).unwrap_err(),
            SpecError::UnknownLane {
                node: Id::new("1"),
                lane: Id::new("ghost"),
            }
        );

        let unknown_target = Blueprint::new(
            Some(vec![
                node("1", NodeKind::Flow, "1", Successors::Branches(vec![
                    Branch::new("a", Id::new("2")),
                    Branch::new("b", Id::new("404")),
                ])),
                node("2", NodeKind::Finish, "1", Successors::None),
            ]),
            lanes(&["1"]),
        );
        assert_eq!(
            GraphBuilder::build_graph(&unknown_target).unwrap_err(),
            SpecError::UnknownTarget {
                node: Id::new("1"),
                target: Id::new("404"),
            }
        );
    }

    #[test]
    fn test_edges_derivation() {
        let blueprint = Blueprint::new(
            Some(vec![
                node("1", NodeKind::Start, "1", single("2")),
                node("2", NodeKind::Flow, "1", Successors::Branches(vec![
                    Branch::new("yes", Id::new("3")),
                    Branch::new("again", Id::new("3")),
                    Branch::new("no", Id::new("99")),
                ])),
                node("3", NodeKind::SystemTask, "1", single("99")),
                node("4", NodeKind::ScriptTask, "1", Successors::Unsupported("array".to_string())),
                node("99", NodeKind::Finish, "1", single("1")),
            ]),
            lanes(&["1"]),
        );

        let graph = GraphBuilder::build_graph(&blueprint).unwrap();
        let edges: Vec<(String, String)> = graph
            .edges()
            .map(|edge| (edge.source().to_string(), edge.target().to_string()))
            .collect();
        let expected: Vec<(String, String)> = [("1", "2"), ("2", "3"), ("2", "99"), ("3", "99")]
            .iter()
            .map(|(s, t)| (s.to_string(), t.to_string()))
            .collect();
        assert_eq!(edges, expected);

        let into_finish: Vec<Id> = graph.incoming(Id::new("99")).map(|e| e.source()).collect();
        assert_eq!(into_finish, vec![Id::new("2"), Id::new("3")]);
        assert_eq!(graph.outgoing(Id::new("99")).count(), 0);
        assert_eq!(graph.outgoing(Id::new("4")).count(), 0);

        let roots: Vec<Id> = graph.roots().collect();
        assert_eq!(roots, vec![Id::new("1"), Id::new("4")]);
    }

    #[test]
    fn test_lane_partition_and_indices() {
        let blueprint = Blueprint::new(
            Some(vec![
                node("1", NodeKind::Start, "b", single("2")),
                node("2", NodeKind::UserTask, "a", single("3")),
                node("3", NodeKind::Finish, "b", Successors::None),
            ]),
            lanes(&["a", "b", "c"]),
        );

        let graph = GraphBuilder::build_graph(&blueprint).unwrap();
        assert_eq!(graph.lane_members(Id::new("a")), &[Id::new("2")]);
        assert_eq!(graph.lane_members(Id::new("b")), &[Id::new("1"), Id::new("3")]);
        assert!(graph.lane_members(Id::new("c")).is_empty());
        assert!(graph.lane_members(Id::new("zzz")).is_empty());

        assert_eq!(graph.lane_index(Id::new("c")), Some(2));
        assert_eq!(graph.node_index(Id::new("3")), Some(2));
        assert_eq!(graph.first_node().map(Node::id), Some(Id::new("1")));
    }
}
