//! Mapping from ranks to absolute diagram coordinates.
//!
//! Every lane is a horizontal band as tall as its depth in rows. A node's cell
//! sits at `padding + column * column_spacing` horizontally and at
//! `padding + row * row_spacing` below the top of its lane; the node's
//! [`BoundsStrategy`] then positions the shape inside the cell. Edges are
//! routed as orthogonal polylines between the resulting boxes.

use indexmap::IndexMap;
use log::{debug, warn};
use thiserror::Error;

use laneflow_core::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
    semantic::{BoundsStrategy, Node},
};

use crate::{
    config::LayoutConfig,
    structure::{ProcessGraph, SequenceEdge},
};

use super::{grid::Rank, rank::RankMap};

/// Centers closer than this are treated as the same horizontal axis.
const AXIS_TOLERANCE: f32 = 1e-3;

/// A diagram element that could not be placed.
///
/// These never abort a conversion; the element is left out of
/// [`ProcessGeometry`] and reported through [`ProcessGeometry::omitted`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("node `{0}` has no rank")]
    MissingRank(Id),

    #[error("node `{node}` belongs to unknown lane `{lane}`")]
    UnknownLane { node: Id, lane: Id },

    #[error("flow `{from}` -> `{to}` has an endpoint without bounds")]
    MissingEndpoint { from: Id, to: Id },
}

/// The horizontal band of one lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneBand {
    lane: Id,
    bounds: Bounds,
}

impl LaneBand {
    pub fn lane(&self) -> Id {
        self.lane
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Absolute geometry of a laid-out process.
#[derive(Debug, Clone, Default)]
pub struct ProcessGeometry {
    node_bounds: IndexMap<Id, Bounds>,
    edge_waypoints: IndexMap<SequenceEdge, Vec<Point>>,
    lane_bands: Vec<LaneBand>,
    container: Bounds,
    omitted: Vec<GeometryError>,
}

impl ProcessGeometry {
    /// Shape bounds per node, in declaration order.
    pub fn node_bounds(&self) -> &IndexMap<Id, Bounds> {
        &self.node_bounds
    }

    /// Routed polyline per sequence flow, in flow order.
    pub fn edge_waypoints(&self) -> &IndexMap<SequenceEdge, Vec<Point>> {
        &self.edge_waypoints
    }

    /// Lane bands in lane declaration order.
    pub fn lane_bands(&self) -> &[LaneBand] {
        &self.lane_bands
    }

    /// Bounds of the participant enclosing every lane.
    pub fn container(&self) -> Bounds {
        self.container
    }

    /// Elements skipped because they could not be placed.
    pub fn omitted(&self) -> &[GeometryError] {
        &self.omitted
    }
}

/// Computes [`ProcessGeometry`] from a graph and its ranks.
pub struct GeometryBuilder<'c> {
    layout: &'c LayoutConfig,
}

impl<'c> GeometryBuilder<'c> {
    pub fn new(layout: &'c LayoutConfig) -> Self {
        Self { layout }
    }

    pub fn build(&self, graph: &ProcessGraph<'_>, ranks: &RankMap) -> ProcessGeometry {
        let depths = ranks.lane_depths();
        let offsets = self.lane_offsets(depths);
        let total_width = (ranks.max_column().unwrap_or(0) + 1) as f32 * self.layout.column_spacing();

        let mut geometry = ProcessGeometry::default();

        for node in graph.nodes() {
            match self.place_node(graph, ranks, &offsets, node) {
                Ok(bounds) => {
                    geometry.node_bounds.insert(node.id(), bounds);
                }
                Err(err) => {
                    debug!(node:% = node.id(), reason:% = err; "Node omitted from geometry");
                    geometry.omitted.push(err);
                }
            }
        }

        for edge in graph.edges() {
            let endpoints = geometry
                .node_bounds
                .get(&edge.source())
                .zip(geometry.node_bounds.get(&edge.target()));
            match endpoints {
                Some((source, target)) => {
                    let waypoints = self.route(*source, *target);
                    geometry.edge_waypoints.insert(edge, waypoints);
                }
                None => {
                    let err = GeometryError::MissingEndpoint {
                        from: edge.source(),
                        to: edge.target(),
                    };
                    warn!(reason:% = err; "Sequence flow omitted from geometry");
                    geometry.omitted.push(err);
                }
            }
        }

        geometry.lane_bands = self.lane_bands(graph.lanes().iter().map(|lane| lane.id()), depths, total_width);
        geometry.container = Bounds::new_from_top_left(
            Point::new(self.layout.padding(), self.band_top()),
            Size::new(total_width, offsets.last().copied().unwrap_or_default()),
        );

        debug!(
            width = geometry.container.width(),
            height = geometry.container.height();
            "Participant container sized"
        );
        geometry
    }

    /// Bounds of a node of the given strategy at `rank`, inside a lane
    /// starting `lane_offset` below the top of the first lane.
    pub fn node_bounds(&self, strategy: BoundsStrategy, rank: Rank, lane_offset: f32) -> Bounds {
        let layout = self.layout;
        let cell_x = layout.padding() + rank.column() as f32 * layout.column_spacing();
        let cell_y = layout.padding() + rank.row() as f32 * layout.row_spacing() + lane_offset;
        let width = layout.node_width();
        let height = layout.node_height();
        let event = layout.event_size();
        let gateway = layout.gateway_size();

        let (top_left, size) = match strategy {
            BoundsStrategy::StartEvent => (
                Point::new(cell_x + width - event, cell_y + (height - event) / 2.0),
                Size::square(event),
            ),
            BoundsStrategy::EndEvent => (
                Point::new(cell_x, cell_y + (height - event) / 2.0),
                Size::square(event),
            ),
            BoundsStrategy::Gateway => (
                Point::new(cell_x + (width - gateway) / 2.0, cell_y + (height - gateway) / 2.0),
                Size::square(gateway),
            ),
            BoundsStrategy::Activity => (Point::new(cell_x, cell_y), Size::new(width, height)),
        };
        Bounds::new_from_top_left(top_left, size)
    }

    /// Orthogonal waypoints from `source` to `target`.
    ///
    /// A target to the right on another axis gets a forward elbow, a target
    /// below or above gets a vertical detour leaving through the bottom or
    /// top, and anything else is joined by a straight segment.
    pub fn route(&self, source: Bounds, target: Bounds) -> Vec<Point> {
        let off_x = self.layout.horizontal_margin() / 1.5;
        let off_y = self.layout.vertical_margin() / 1.5;
        let s = source.center();
        let t = target.center();
        let same_axis = (s.y() - t.y()).abs() < AXIS_TOLERANCE;

        if target.min_x() > source.min_x() && !same_axis {
            let elbow_x = source.max_x() + off_x;
            vec![
                Point::new(source.max_x(), s.y()),
                Point::new(elbow_x, s.y()),
                Point::new(elbow_x, t.y()),
                Point::new(target.min_x(), t.y()),
            ]
        } else if !same_axis && t.y() > s.y() {
            let detour_y = source.max_y() + off_y;
            vec![
                Point::new(s.x(), source.max_y()),
                Point::new(s.x(), detour_y),
                Point::new(t.x(), detour_y),
                Point::new(t.x(), target.min_y()),
            ]
        } else if !same_axis {
            let detour_y = source.min_y() - off_y;
            vec![
                Point::new(s.x(), source.min_y()),
                Point::new(s.x(), detour_y),
                Point::new(t.x(), detour_y),
                Point::new(t.x(), target.max_y()),
            ]
        } else {
            vec![Point::new(source.max_x(), s.y()), Point::new(target.min_x(), t.y())]
        }
    }

    fn place_node(
        &self,
        graph: &ProcessGraph<'_>,
        ranks: &RankMap,
        offsets: &[f32],
        node: &Node,
    ) -> Result<Bounds, GeometryError> {
        let rank = ranks.rank(node.id()).ok_or(GeometryError::MissingRank(node.id()))?;
        let lane_offset = graph
            .lane_index(node.lane_id())
            .and_then(|index| offsets.get(index).copied())
            .ok_or(GeometryError::UnknownLane {
                node: node.id(),
                lane: node.lane_id(),
            })?;
        Ok(self.node_bounds(node.kind().bounds_strategy(), rank, lane_offset))
    }

    /// Vertical offset of each lane from the first, with the total height
    /// appended as the final entry.
    fn lane_offsets(&self, depths: &[usize]) -> Vec<f32> {
        let row_spacing = self.layout.row_spacing();
        let mut offsets = Vec::with_capacity(depths.len() + 1);
        let mut offset = 0.0;
        offsets.push(offset);
        for depth in depths {
            offset += *depth as f32 * row_spacing;
            offsets.push(offset);
        }
        offsets
    }

    fn lane_bands(&self, lanes: impl Iterator<Item = Id>, depths: &[usize], total_width: f32) -> Vec<LaneBand> {
        let layout = self.layout;
        let offsets = self.lane_offsets(depths);
        lanes
            .zip(depths)
            .zip(offsets)
            .map(|((lane, depth), offset)| LaneBand {
                lane,
                bounds: Bounds::new_from_top_left(
                    Point::new(layout.padding() + layout.lane_header_width(), self.band_top() + offset),
                    Size::new(
                        total_width - layout.lane_header_width(),
                        *depth as f32 * layout.row_spacing(),
                    ),
                ),
            })
            .collect()
    }

    /// Top edge of the first lane.
    fn band_top(&self) -> f32 {
        self.layout.padding() - self.layout.vertical_margin()
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Property Test Functions
    // ===================

    /// Lane bands tile the participant vertically, in order and without gaps.
    fn check_lane_bands_partition(depths: &[usize], max_column: usize) -> Result<(), TestCaseError> {
        let layout = LayoutConfig::default();
        let builder = GeometryBuilder::new(&layout);
        let total_width = (max_column + 1) as f32 * layout.column_spacing();
        let lanes = (0..depths.len()).map(|index| Id::from_number(index as i64));

        let bands = builder.lane_bands(lanes, depths, total_width);
        prop_assert_eq!(bands.len(), depths.len());

        let mut expected_top = builder.band_top();
        for (band, depth) in bands.iter().zip(depths) {
            let bounds = band.bounds();
            prop_assert!(approx_eq!(f32, bounds.min_y(), expected_top, epsilon = 0.01));
            prop_assert!(approx_eq!(
                f32,
                bounds.height(),
                *depth as f32 * layout.row_spacing(),
                epsilon = 0.01
            ));
            expected_top = bounds.max_y();
        }
        Ok(())
    }

    /// The first and last waypoints sit on the source and target boxes.
    fn check_route_endpoints(source: Rank, target: Rank) -> Result<(), TestCaseError> {
        let layout = LayoutConfig::default();
        let builder = GeometryBuilder::new(&layout);
        let source = builder.node_bounds(BoundsStrategy::Activity, source, 0.0);
        let target = builder.node_bounds(BoundsStrategy::Activity, target, 0.0);

        let waypoints = builder.route(source, target);
        prop_assert!(waypoints.len() == 2 || waypoints.len() == 4);
        prop_assert!(source.contains(waypoints[0]));
        prop_assert!(target.contains(waypoints[waypoints.len() - 1]));

        for pair in waypoints.windows(2) {
            let horizontal = approx_eq!(f32, pair[0].y(), pair[1].y());
            let vertical = approx_eq!(f32, pair[0].x(), pair[1].x());
            prop_assert!(horizontal || vertical, "diagonal segment {:?}", pair);
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn lane_bands_partition(
            depths in prop::collection::vec(1usize..5, 1..6),
            max_column in 0usize..10,
        ) {
            check_lane_bands_partition(&depths, max_column)?;
        }

        #[test]
        fn route_endpoints_touch_shapes(
            source in (0usize..6, 0usize..6),
            target in (0usize..6, 0usize..6),
        ) {
            prop_assume!(source != target);
            check_route_endpoints(Rank::new(source.0, source.1), Rank::new(target.0, target.1))?;
        }
    }
}
