use serde::{Deserialize, Serialize};

use crate::grid::{Direction, TilePos};

/// Outcome of a map-edge reachability walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchResult {
    /// The walk stepped off the map.
    Success,
    /// Nothing usable on the very first tile.
    NotFound,
    /// Every branch dead-ended after at least one step.
    Incomplete,
    /// The step ceiling or the junction budget ran out.
    TooComplex,
}

impl SearchResult {
    pub fn is_success(self) -> bool {
        self == SearchResult::Success
    }
}

/// Filters applied while walking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkOptions {
    /// Treat queue segments as absent.
    pub ignore_queues: bool,
    /// Walk through edges closed by no-entry banners.
    pub ignore_no_entry: bool,
    /// Report every path tile the walk visits to the ownership fixer.
    pub fix_ownership: bool,
}

/// One pending step of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Frame {
    /// Tile the step leaves from.
    pub pos: TilePos,
    /// Height of the edge being crossed.
    pub height: u8,
    pub direction: Direction,
    /// Steps taken on this branch, starting at 1.
    pub level: u32,
    /// No plain step has been taken since the last junction.
    pub after_junction: bool,
    /// Junction budget left on this branch.
    pub tolerance: i32,
}
