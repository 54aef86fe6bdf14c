//! Depth-first rank assignment over per-lane grids.

use indexmap::IndexMap;
use log::{debug, trace, warn};

use laneflow_core::{identifier::Id, semantic::Successors};

use crate::{error::LayoutError, structure::ProcessGraph};

use super::grid::{Grid, Rank};

/// Final ranks of every reachable node plus the depth of every lane.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankMap {
    ranks: IndexMap<Id, Rank>,
    lane_depths: Vec<usize>,
}

impl RankMap {
    /// Returns the rank of `id`, or `None` when the node was never reached.
    pub fn rank(&self, id: Id) -> Option<Rank> {
        self.ranks.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Ranked nodes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, Rank)> + '_ {
        self.ranks.iter().map(|(id, rank)| (*id, *rank))
    }

    /// Row count of each lane, in lane declaration order. Never zero.
    pub fn lane_depths(&self) -> &[usize] {
        &self.lane_depths
    }

    /// The right-most column used by any node.
    pub fn max_column(&self) -> Option<usize> {
        self.ranks.values().map(|rank| rank.column()).max()
    }
}

/// Places the nodes of a [`ProcessGraph`] on one [`Grid`] per lane.
///
/// Traversal starts at the first declared node and follows every node's
/// `next` depth-first, finish nodes included. A child goes one column right
/// of its parent; the `i`-th distinct child also goes `i` rows down, after a
/// fresh row has been reserved below row `i - 1` in the parent's lane and,
/// for a child in another lane, in the child's lane as well. Every grid is
/// compacted once traversal finishes.
pub struct RankAssigner<'g, 'a> {
    graph: &'g ProcessGraph<'a>,
}

impl<'g, 'a> RankAssigner<'g, 'a> {
    pub fn new(graph: &'g ProcessGraph<'a>) -> Self {
        Self { graph }
    }

    /// Runs the traversal and compaction.
    ///
    /// Nodes the traversal never reaches get no rank.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::GridConflict`] when a child lands on an
    /// occupied cell inside its lane's grid, and [`LayoutError::UnknownNode`]
    /// when a flow points outside the graph.
    pub fn assign(&self) -> Result<RankMap, LayoutError> {
        let lanes = self.graph.lanes();
        let mut grids: IndexMap<Id, Grid> = lanes.iter().map(|lane| (lane.id(), Grid::new())).collect();

        if let Some(first) = self.graph.first_node() {
            grids
                .entry(first.lane_id())
                .or_default()
                .add_element(first.id(), Rank::default())?;

            let mut stack = vec![first];
            while let Some(current) = stack.pop() {
                if let Successors::Unsupported(shape) = current.next() {
                    warn!(
                        node:% = current.id(),
                        shape = shape.as_str();
                        "Unsupported `next` value, successors are not laid out"
                    );
                    continue;
                }

                for (index, child_id) in current.next().distinct_targets().into_iter().enumerate() {
                    let child = self.graph.node(child_id).ok_or(LayoutError::UnknownNode(child_id))?;
                    let placed = grids
                        .get(&child.lane_id())
                        .is_some_and(|grid| grid.contains(child_id));
                    if placed {
                        continue;
                    }

                    if index > 0 {
                        grids.entry(current.lane_id()).or_default().add_row_after(index - 1);
                        if child.lane_id() != current.lane_id() {
                            grids.entry(child.lane_id()).or_default().add_row_after(index - 1);
                        }
                    }
                    let parent = grids
                        .get(&current.lane_id())
                        .and_then(|grid| grid.rank(current.id()))
                        .ok_or(LayoutError::UnknownNode(current.id()))?;

                    let rank = Rank::new(parent.column() + 1, parent.row() + index);
                    trace!(parent:% = current.id(), child:% = child_id, rank:% = rank; "Ranking child");
                    grids.entry(child.lane_id()).or_default().add_element(child_id, rank)?;
                    stack.push(child);
                }
            }
        }

        for grid in grids.values_mut() {
            grid.simplify();
        }

        let mut ranks = IndexMap::with_capacity(self.graph.nodes_count());
        for node in self.graph.nodes() {
            match grids.get(&node.lane_id()).and_then(|grid| grid.rank(node.id())) {
                Some(rank) => {
                    ranks.insert(node.id(), rank);
                }
                None => debug!(node:% = node.id(); "Node is unreachable from the first node"),
            }
        }

        let lane_depths = lanes
            .iter()
            .map(|lane| {
                self.graph
                    .lane_members(lane.id())
                    .iter()
                    .filter_map(|id| ranks.get(id))
                    .map(|rank| rank.row() + 1)
                    .max()
                    .unwrap_or(1)
            })
            .collect();

        Ok(RankMap { ranks, lane_depths })
    }
}

#[cfg(test)]
mod tests {
    use laneflow_core::semantic::{Blueprint, Branch, Lane, Node, NodeKind};

    use super::*;
    use crate::structure::GraphBuilder;

    fn node(id: &str, kind: NodeKind, lane: &str, next: Successors) -> Node {
        Node::new(Id::new(id), kind, id, Id::new(lane), next)
    }

    fn single(id: &str) -> Successors {
        Successors::Single(Id::new(id))
    }

    fn branches(targets: &[(&str, &str)]) -> Successors {
        Successors::Branches(
            targets
                .iter()
                .map(|(label, target)| Branch::new(*label, Id::new(target)))
                .collect(),
        )
    }

    fn blueprint(nodes: Vec<Node>, lanes: &[&str]) -> Blueprint {
        Blueprint::new(
            Some(nodes),
            Some(lanes.iter().map(|id| Lane::new(Id::new(id), *id)).collect()),
        )
    }

    fn assign(blueprint: &Blueprint) -> RankMap {
        let graph = GraphBuilder::build_graph(blueprint).unwrap();
        RankAssigner::new(&graph).assign().unwrap()
    }

    fn rank_of(ranks: &RankMap, id: &str) -> Option<(usize, usize)> {
        ranks.rank(Id::new(id)).map(|rank| (rank.column(), rank.row()))
    }

    #[test]
    fn test_linear_chain() {
        let blueprint = blueprint(
            vec![
                node("1", NodeKind::Start, "1", single("2")),
                node("2", NodeKind::SystemTask, "1", single("99")),
                node("99", NodeKind::Finish, "1", Successors::None),
            ],
            &["1"],
        );

        let ranks = assign(&blueprint);
        assert_eq!(rank_of(&ranks, "1"), Some((0, 0)));
        assert_eq!(rank_of(&ranks, "2"), Some((1, 0)));
        assert_eq!(rank_of(&ranks, "99"), Some((2, 0)));
        assert_eq!(ranks.lane_depths(), &[1]);
        assert_eq!(ranks.max_column(), Some(2));
    }

    #[test]
    fn test_branches_take_separate_rows() {
        let blueprint = blueprint(
            vec![
                node("1", NodeKind::Start, "1", single("2")),
                node("2", NodeKind::Flow, "1", branches(&[("yes", "3"), ("no", "4")])),
                node("3", NodeKind::UserTask, "1", single("99")),
                node("4", NodeKind::SystemTask, "1", single("99")),
                node("99", NodeKind::Finish, "1", Successors::None),
            ],
            &["1"],
        );

        let ranks = assign(&blueprint);
        assert_eq!(rank_of(&ranks, "2"), Some((1, 0)));
        assert_eq!(rank_of(&ranks, "3"), Some((2, 0)));
        assert_eq!(rank_of(&ranks, "4"), Some((2, 1)));
        assert_eq!(rank_of(&ranks, "99").map(|(column, _)| column), Some(3));
        assert_eq!(ranks.lane_depths(), &[2]);
    }

    #[test]
    fn test_duplicate_branch_targets_share_one_row() {
        let blueprint = blueprint(
            vec![
                node("1", NodeKind::Flow, "1", branches(&[("a", "2"), ("b", "2")])),
                node("2", NodeKind::Finish, "1", Successors::None),
            ],
            &["1"],
        );

        let ranks = assign(&blueprint);
        assert_eq!(rank_of(&ranks, "2"), Some((1, 0)));
        assert_eq!(ranks.lane_depths(), &[1]);
    }

    #[test]
    fn test_lanes_have_independent_grids() {
        let blueprint = blueprint(
            vec![
                node("1", NodeKind::Start, "a", single("2")),
                node("2", NodeKind::UserTask, "b", single("3")),
                node("3", NodeKind::SystemTask, "a", single("99")),
                node("99", NodeKind::Finish, "a", Successors::None),
            ],
            &["a", "b", "empty"],
        );

        let ranks = assign(&blueprint);
        assert_eq!(rank_of(&ranks, "1"), Some((0, 0)));
        assert_eq!(rank_of(&ranks, "2"), Some((1, 0)));
        assert_eq!(rank_of(&ranks, "3"), Some((2, 0)));
        assert_eq!(rank_of(&ranks, "99"), Some((3, 0)));
        assert_eq!(ranks.lane_depths(), &[1, 1, 1]);
    }

    #[test]
    fn test_unreachable_nodes_are_unranked() {
        let blueprint = blueprint(
            vec![
                node("1", NodeKind::Start, "1", single("99")),
                node("orphan", NodeKind::UserTask, "1", single("99")),
                node("99", NodeKind::Finish, "1", Successors::None),
            ],
            &["1"],
        );

        let ranks = assign(&blueprint);
        assert_eq!(ranks.len(), 2);
        assert_eq!(rank_of(&ranks, "orphan"), None);
        let order: Vec<Id> = ranks.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![Id::new("1"), Id::new("99")]);
    }

    #[test]
    fn test_unsupported_next_stops_traversal() {
        let blueprint = blueprint(
            vec![
                node("1", NodeKind::Start, "1", single("2")),
                node("2", NodeKind::ScriptTask, "1", Successors::Unsupported("array".to_string())),
                node("99", NodeKind::Finish, "1", Successors::None),
            ],
            &["1"],
        );

        let ranks = assign(&blueprint);
        assert_eq!(rank_of(&ranks, "2"), Some((1, 0)));
        assert_eq!(rank_of(&ranks, "99"), None);
    }

    #[test]
    fn test_finish_successors_are_ranked() {
        let blueprint = blueprint(
            vec![
                node("1", NodeKind::Start, "1", single("99")),
                node("99", NodeKind::Finish, "1", single("late")),
                node("late", NodeKind::UserTask, "1", Successors::None),
            ],
            &["1"],
        );

        let ranks = assign(&blueprint);
        assert_eq!(rank_of(&ranks, "99"), Some((1, 0)));
        assert_eq!(rank_of(&ranks, "late"), Some((2, 0)));
        assert_eq!(ranks.len(), 3);
    }

    #[test]
    fn test_cross_lane_branch_reserves_row_in_target_lane() {
        let blueprint = blueprint(
            vec![
                node("s", NodeKind::Flow, "a", branches(&[("left", "g"), ("right", "k")])),
                node("g", NodeKind::Flow, "a", branches(&[("left", "h"), ("right", "n")])),
                node("k", NodeKind::UserTask, "b", single("m")),
                node("m", NodeKind::UserTask, "b", Successors::None),
                node("h", NodeKind::SystemTask, "a", Successors::None),
                node("n", NodeKind::SystemTask, "b", Successors::None),
            ],
            &["a", "b"],
        );

        let ranks = assign(&blueprint);
        assert_eq!(ranks.len(), 6);
        assert_eq!(rank_of(&ranks, "s"), Some((0, 0)));
        assert_eq!(rank_of(&ranks, "g"), Some((1, 0)));
        assert_eq!(rank_of(&ranks, "h"), Some((2, 0)));
        // `k` and `m` moved down a row to make room for `n`
        assert_eq!(rank_of(&ranks, "n"), Some((2, 0)));
        assert_eq!(rank_of(&ranks, "k"), Some((1, 1)));
        assert_eq!(rank_of(&ranks, "m"), Some((2, 1)));
        assert_eq!(ranks.lane_depths(), &[1, 2]);
    }

    #[test]
    fn test_loop_back_does_not_move_placed_nodes() {
        let blueprint = blueprint(
            vec![
                node("1", NodeKind::Start, "1", single("2")),
                node("2", NodeKind::UserTask, "1", single("3")),
                node("3", NodeKind::Flow, "1", branches(&[("retry", "2"), ("done", "99")])),
                node("99", NodeKind::Finish, "1", Successors::None),
            ],
            &["1"],
        );

        let ranks = assign(&blueprint);
        assert_eq!(rank_of(&ranks, "2"), Some((1, 0)));
        assert_eq!(rank_of(&ranks, "3"), Some((2, 0)));
        // second distinct child of the gateway, compacted back to row 0
        assert_eq!(rank_of(&ranks, "99"), Some((3, 0)));
    }
}
