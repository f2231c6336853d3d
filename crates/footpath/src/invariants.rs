//! Graph invariant checks over the whole map.
//!
//! Connect and disconnect keep these true after every call; the validation
//! system re-checks them whenever the map changes and logs any violation.

use bevy::prelude::*;

use crate::connection::linked_path_across;
use crate::elements::TileElement;
use crate::grid::{directions_in, Direction, TileMap, TilePos};
use crate::params::FootpathParams;
use crate::tile_query::TileQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// An edge bit with no path linking back and nothing else accepting it.
    DanglingEdge {
        pos: TilePos,
        height: u8,
        direction: Direction,
    },
    /// A queue segment with more than two connections.
    QueueOverCapacity { pos: TilePos, height: u8, edges: u8 },
    /// A sloped segment carrying corner bits.
    SlopedCorners { pos: TilePos, height: u8, corners: u8 },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvariantViolation::DanglingEdge {
                pos,
                height,
                direction,
            } => write!(
                f,
                "path at ({}, {}) height {height} has a dangling {direction:?} edge",
                pos.x, pos.y
            ),
            InvariantViolation::QueueOverCapacity { pos, height, edges } => write!(
                f,
                "queue at ({}, {}) height {height} has edges {edges:#06b}",
                pos.x, pos.y
            ),
            InvariantViolation::SlopedCorners {
                pos,
                height,
                corners,
            } => write!(
                f,
                "sloped path at ({}, {}) height {height} has corners {corners:#06b}",
                pos.x, pos.y
            ),
        }
    }
}

/// Checks edge symmetry, the queue degree bound and the sloped-corner rule
/// for every path on the map.
pub fn check_graph_invariants<M: TileQuery + ?Sized>(
    map: &M,
    params: &FootpathParams,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let size = map.map_size();
    for y in 0..size {
        for x in 0..size {
            let pos = TilePos::new(x, y);
            for path in map.elements(pos).iter().filter_map(TileElement::as_path) {
                let height = path.base_height;
                for direction in directions_in(path.edges) {
                    if !edge_is_backed(map, pos, direction, path.edge_height(direction), params) {
                        violations.push(InvariantViolation::DanglingEdge {
                            pos,
                            height,
                            direction,
                        });
                    }
                }
                if path.queue && path.edge_count() > 2 {
                    violations.push(InvariantViolation::QueueOverCapacity {
                        pos,
                        height,
                        edges: path.edges,
                    });
                }
                if path.sloped && path.corners != 0 {
                    violations.push(InvariantViolation::SlopedCorners {
                        pos,
                        height,
                        corners: path.corners,
                    });
                }
            }
        }
    }
    violations
}

fn edge_is_backed<M: TileQuery + ?Sized>(
    map: &M,
    pos: TilePos,
    dir: Direction,
    height: Option<u8>,
    params: &FootpathParams,
) -> bool {
    let Some(height) = height else {
        return false;
    };
    let Some(next) = map.step(pos, dir) else {
        return params.open_map_edges;
    };
    linked_path_across(map, pos, dir, height).is_some()
        || map
            .elements(next)
            .iter()
            .any(|e| {
                e.as_path().is_none() && e.wants_path_connection(dir.opposite()) == Some(height)
            })
}

/// Result of the most recent validation pass.
#[derive(Resource, Default, Debug)]
pub struct FootpathInvariantReport {
    pub checks: u64,
    pub violations: u32,
}

/// Re-validates the graph after the map changed.
pub fn validate_footpath_graph(
    map: Res<TileMap>,
    params: Res<FootpathParams>,
    mut report: ResMut<FootpathInvariantReport>,
) {
    let violations = check_graph_invariants(&*map, &params);
    for violation in &violations {
        warn!("Footpath invariant violation: {violation}");
    }
    report.checks += 1;
    report.violations = violations.len() as u32;
}
