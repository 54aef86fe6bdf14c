//! Lane-aware rank assignment and geometry.
//!
//! Layout runs in two passes over a [`ProcessGraph`](crate::structure::ProcessGraph):
//!
//! 1. [`RankAssigner`] walks the graph depth-first from the first declared
//!    node and gives every reachable node a discrete [`Rank`] in its lane's
//!    [`Grid`]. Rows are over-allocated for branches and compacted afterwards.
//! 2. [`GeometryBuilder`] stacks the lanes vertically and turns ranks into
//!    shape bounds, edge waypoints, lane bands and the participant container.

mod geometry;
mod grid;
mod rank;

pub use geometry::{GeometryBuilder, GeometryError, LaneBand, ProcessGeometry};
pub use grid::{Grid, GridSize, Rank};
pub use rank::{RankAssigner, RankMap};
