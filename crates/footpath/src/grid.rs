use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAP_SIZE;
use crate::elements::TileElement;
use crate::tile_query::{ElementRef, TileQuery};

/// Maximum number of elements stacked on a single tile.
pub const MAX_ELEMENTS_PER_TILE: usize = 32;

/// Compass direction of a tile edge. The discriminant is the bit index used
/// in edge masks, and the declaration order is the tie-break order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Direction {
    #[default]
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Wraps `i` into the 0..4 range.
    #[inline]
    pub fn from_index(i: u8) -> Self {
        Self::ALL[(i & 3) as usize]
    }

    #[inline]
    pub fn opposite(self) -> Self {
        self.rotate_cw(2)
    }

    #[inline]
    pub fn rotate_cw(self, turns: u8) -> Self {
        Self::from_index(self.index().wrapping_add(turns))
    }

    #[inline]
    pub fn bit(self) -> u8 {
        1 << self.index()
    }

    /// True for the two directions at right angles to `self`.
    #[inline]
    pub fn is_perpendicular(self, other: Direction) -> bool {
        (self.index() ^ other.index()) & 1 == 1
    }

    pub fn delta(self) -> (i16, i16) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// Diagonal position on a tile. Corner `c` sits between direction `c` and
/// direction `c + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Corner {
    NorthEast = 0,
    SouthEast = 1,
    SouthWest = 2,
    NorthWest = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthEast,
        Corner::SouthEast,
        Corner::SouthWest,
        Corner::NorthWest,
    ];

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_index(i: u8) -> Self {
        Self::ALL[(i & 3) as usize]
    }

    #[inline]
    pub fn bit(self) -> u8 {
        1 << self.index()
    }

    #[inline]
    pub fn rotate_cw(self, turns: u8) -> Self {
        Self::from_index(self.index().wrapping_add(turns))
    }

    /// The two edge directions that bound this corner, clockwise order.
    pub fn sides(self) -> (Direction, Direction) {
        let first = Direction::from_index(self.index());
        (first, first.rotate_cw(1))
    }
}

/// Number of edge bits set in the low nibble of `mask`.
#[inline]
pub fn edge_count(mask: u8) -> u32 {
    (mask & 0x0F).count_ones()
}

/// Directions whose bits are set in `mask`, in N, E, S, W order.
pub fn directions_in(mask: u8) -> impl DoubleEndedIterator<Item = Direction> {
    Direction::ALL
        .into_iter()
        .filter(move |d| mask & d.bit() != 0)
}

/// First direction in N, E, S, W order whose bit is set in `mask`.
pub fn first_direction(mask: u8) -> Option<Direction> {
    directions_in(mask).next()
}

/// Rotates a 4-bit direction mask clockwise by `turns` quarter turns.
#[inline]
pub fn rotate_mask(mask: u8, turns: u8) -> u8 {
    let mask = mask & 0x0F;
    let turns = turns & 3;
    ((mask << turns) | (mask >> ((4 - turns) & 3))) & 0x0F
}

/// Tile coordinate. `x` grows East, `y` grows South.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TilePos {
    pub x: u8,
    pub y: u8,
}

impl TilePos {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// The adjacent tile in `dir`, or `None` when it lies outside a square
    /// map of `map_size` tiles per axis.
    pub fn step(self, dir: Direction, map_size: u8) -> Option<TilePos> {
        let (dx, dy) = dir.delta();
        let nx = self.x as i16 + dx;
        let ny = self.y as i16 + dy;
        let size = map_size as i16;
        if nx < 0 || ny < 0 || nx >= size || ny >= size {
            return None;
        }
        Some(TilePos::new(nx as u8, ny as u8))
    }
}

/// Errors raised when placing elements on a [`TileMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMapError {
    /// The position lies outside the map.
    OutOfBounds { pos: TilePos, map_size: u8 },
    /// The tile already holds `MAX_ELEMENTS_PER_TILE` elements.
    TileFull { pos: TilePos },
}

impl std::fmt::Display for TileMapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TileMapError::OutOfBounds { pos, map_size } => write!(
                f,
                "tile ({}, {}) is outside the {map_size}x{map_size} map",
                pos.x, pos.y
            ),
            TileMapError::TileFull { pos } => write!(
                f,
                "tile ({}, {}) already holds {MAX_ELEMENTS_PER_TILE} elements",
                pos.x, pos.y
            ),
        }
    }
}

impl std::error::Error for TileMapError {}

/// Square grid of per-tile element stacks.
///
/// Elements on a tile keep their insertion order; the order matters for
/// "first element on tile" lookups. Elements are addressed by
/// [`ElementRef`] (tile + stack index), never by pointer.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TileMap {
    size: u8,
    tiles: Vec<Vec<TileElement>>,
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_SIZE)
    }
}

impl TileMap {
    /// Creates an empty map of `size` x `size` tiles. A zero size is bumped
    /// to one tile.
    pub fn new(size: u8) -> Self {
        let size = size.max(1);
        let count = size as usize * size as usize;
        Self {
            size,
            tiles: vec![Vec::new(); count],
        }
    }

    #[inline]
    pub fn index(&self, pos: TilePos) -> usize {
        pos.y as usize * self.size as usize + pos.x as usize
    }

    #[inline]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    /// Appends `element` to the top of the stack at `pos`.
    pub fn insert(
        &mut self,
        pos: TilePos,
        element: TileElement,
    ) -> Result<ElementRef, TileMapError> {
        if !self.in_bounds(pos) {
            return Err(TileMapError::OutOfBounds {
                pos,
                map_size: self.size,
            });
        }
        let idx = self.index(pos);
        let stack = &mut self.tiles[idx];
        if stack.len() >= MAX_ELEMENTS_PER_TILE {
            return Err(TileMapError::TileFull { pos });
        }
        stack.push(element);
        Ok(ElementRef::new(pos, stack.len() - 1))
    }

    /// Removes and returns the referenced element. Elements above it on the
    /// same tile shift down by one index.
    pub fn remove(&mut self, element: ElementRef) -> Option<TileElement> {
        if !self.in_bounds(element.pos) {
            return None;
        }
        let idx = self.index(element.pos);
        let stack = &mut self.tiles[idx];
        if element.index >= stack.len() {
            return None;
        }
        Some(stack.remove(element.index))
    }

    /// Every position on the map, row by row.
    pub fn positions(&self) -> impl Iterator<Item = TilePos> {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| TilePos::new(x, y)))
    }
}

impl TileQuery for TileMap {
    fn map_size(&self) -> u8 {
        self.size
    }

    fn elements(&self, pos: TilePos) -> &[TileElement] {
        if !self.in_bounds(pos) {
            return &[];
        }
        &self.tiles[self.index(pos)]
    }

    fn elements_mut(&mut self, pos: TilePos) -> &mut [TileElement] {
        if !self.in_bounds(pos) {
            return Default::default();
        }
        let idx = self.index(pos);
        &mut self.tiles[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::PathElement;

    #[test]
    fn test_opposite_and_rotation() {
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::West.opposite(), Direction::East);
        assert_eq!(Direction::West.rotate_cw(1), Direction::North);
        assert!(Direction::North.is_perpendicular(Direction::East));
        assert!(!Direction::North.is_perpendicular(Direction::South));
    }

    #[test]
    fn test_corner_sides() {
        assert_eq!(
            Corner::NorthEast.sides(),
            (Direction::North, Direction::East)
        );
        assert_eq!(
            Corner::NorthWest.sides(),
            (Direction::West, Direction::North)
        );
    }

    #[test]
    fn test_rotate_mask() {
        assert_eq!(rotate_mask(0b0001, 0), 0b0001);
        assert_eq!(rotate_mask(0b0001, 1), 0b0010);
        assert_eq!(rotate_mask(0b1000, 1), 0b0001);
        assert_eq!(rotate_mask(0b0101, 3), 0b1010);
    }

    #[test]
    fn test_directions_in_order() {
        let dirs: Vec<Direction> = directions_in(0b1010).collect();
        assert_eq!(dirs, vec![Direction::East, Direction::West]);
        assert_eq!(first_direction(0b1100), Some(Direction::South));
        assert_eq!(first_direction(0), None);
        assert_eq!(edge_count(0xF3), 2);
    }

    #[test]
    fn test_step_stays_in_bounds() {
        let origin = TilePos::new(0, 0);
        assert_eq!(origin.step(Direction::West, 8), None);
        assert_eq!(origin.step(Direction::North, 8), None);
        assert_eq!(origin.step(Direction::East, 8), Some(TilePos::new(1, 0)));
        assert_eq!(TilePos::new(7, 7).step(Direction::South, 8), None);
    }

    #[test]
    fn test_insert_and_remove_shift_indices() {
        let mut map = TileMap::new(4);
        let pos = TilePos::new(1, 1);
        let a = map
            .insert(pos, TileElement::Path(PathElement::flat(2)))
            .unwrap();
        let b = map
            .insert(pos, TileElement::Path(PathElement::flat(8)))
            .unwrap();
        assert_eq!((a.index, b.index), (0, 1));

        assert!(map.remove(a).is_some());
        assert_eq!(map.elements(pos).len(), 1);
        assert_eq!(map.elements(pos)[0].base_height(), 8);
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let mut map = TileMap::new(4);
        let err = map
            .insert(TilePos::new(4, 0), TileElement::Path(PathElement::flat(2)))
            .unwrap_err();
        assert_eq!(
            err,
            TileMapError::OutOfBounds {
                pos: TilePos::new(4, 0),
                map_size: 4
            }
        );
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_out_of_bounds_reads_are_empty() {
        let mut map = TileMap::new(2);
        assert!(map.elements(TilePos::new(5, 5)).is_empty());
        assert!(map.elements_mut(TilePos::new(5, 5)).is_empty());
    }

    #[test]
    fn test_positions_cover_map() {
        let map = TileMap::new(3);
        assert_eq!(map.positions().count(), 9);
        assert_eq!(map.positions().last(), Some(TilePos::new(2, 2)));
    }
}
