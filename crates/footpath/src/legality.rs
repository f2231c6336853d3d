//! Stateless predicates deciding whether two adjacent tiles may share a
//! footpath connection.

use crate::config::SLOPE_RISE;
use crate::elements::{EntranceElement, TrackElement};
use crate::grid::{Direction, TilePos};
use crate::tile_query::TileQuery;

/// Height at which a path with the given base and slope meets the tile
/// across `dir`.
///
/// A sloped path only has edges along its slope: the uphill edge sits
/// [`SLOPE_RISE`] above the base, the downhill edge at the base.
pub fn edge_height(base: u8, slope: Option<Direction>, dir: Direction) -> Option<u8> {
    match slope {
        None => Some(base),
        Some(up) if up == dir => base.checked_add(SLOPE_RISE),
        Some(up) if up.opposite() == dir => Some(base),
        Some(_) => None,
    }
}

/// True when a path at `height`/`slope` can join a neighbouring path at
/// `neighbour_height`/`neighbour_slope` across `dir`.
pub fn slope_compatible(
    height: u8,
    slope: Option<Direction>,
    neighbour_height: u8,
    neighbour_slope: Option<Direction>,
    dir: Direction,
) -> bool {
    let near = edge_height(height, slope, dir);
    let far = edge_height(neighbour_height, neighbour_slope, dir.opposite());
    matches!((near, far), (Some(a), Some(b)) if a == b)
}

/// True when a wall on the edge between `pos` and its neighbour across
/// `dir` overlaps the vertical range `lo..hi`. Walls are checked on both
/// sides of the edge.
pub fn fence_blocks<M: TileQuery + ?Sized>(
    map: &M,
    pos: TilePos,
    dir: Direction,
    (lo, hi): (u8, u8),
) -> bool {
    let near = map
        .elements(pos)
        .iter()
        .filter_map(|e| e.as_wall())
        .any(|w| w.blocks(dir, lo, hi));
    if near {
        return true;
    }
    map.step(pos, dir).is_some_and(|other| {
        map.elements(other)
            .iter()
            .filter_map(|e| e.as_wall())
            .any(|w| w.blocks(dir.opposite(), lo, hi))
    })
}

/// True when the flat-ride piece takes a footpath on its `side`.
pub fn track_accepts(track: &TrackElement, side: Direction) -> bool {
    track.path_mask() & side.bit() != 0
}

/// True when the entrance takes a footpath on its `side`.
pub fn entrance_accepts(entrance: &EntranceElement, side: Direction) -> bool {
    entrance.path_mask() & side.bit() != 0
}
