//! Typed tile elements.
//!
//! Every element kind is its own struct with its own capability methods;
//! [`TileElement`] is the sum type stored on a tile. The footpath graph
//! mostly cares about [`PathElement`], and asks tracks and entrances which
//! of their sides want a path through [`TileElement::wants_path_connection`].

use serde::{Deserialize, Serialize};

use crate::config::{PATH_CLEARANCE, SLOPE_RISE};
use crate::grid::{edge_count, rotate_mask, Corner, Direction};
use crate::legality;
use crate::rides::{RideId, StationIndex};

// ---------------------------------------------------------------------------
// PathElement
// ---------------------------------------------------------------------------

/// One footpath segment on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathElement {
    pub base_height: u8,
    pub clearance_height: u8,
    pub sloped: bool,
    /// Uphill direction when `sloped`. Unsloped queues reuse it as the
    /// direction they prefer to keep when their capacity is rebalanced.
    pub slope_direction: Direction,
    /// Low nibble: one bit per [`Direction`].
    pub edges: u8,
    /// Low nibble: one bit per [`Corner`].
    pub corners: u8,
    pub queue: bool,
    pub ride: Option<RideId>,
    pub station: Option<StationIndex>,
    pub has_queue_banner: bool,
    pub queue_banner_direction: Direction,
    pub wide: bool,
    pub broken: bool,
    pub blocked_by_vehicle: bool,
}

impl PathElement {
    pub fn flat(base_height: u8) -> Self {
        Self {
            base_height,
            clearance_height: base_height.saturating_add(PATH_CLEARANCE),
            sloped: false,
            slope_direction: Direction::North,
            edges: 0,
            corners: 0,
            queue: false,
            ride: None,
            station: None,
            has_queue_banner: false,
            queue_banner_direction: Direction::North,
            wide: false,
            broken: false,
            blocked_by_vehicle: false,
        }
    }

    /// A path rising [`SLOPE_RISE`] units toward `uphill`.
    pub fn sloped(base_height: u8, uphill: Direction) -> Self {
        Self {
            clearance_height: base_height.saturating_add(PATH_CLEARANCE + SLOPE_RISE),
            sloped: true,
            slope_direction: uphill,
            ..Self::flat(base_height)
        }
    }

    pub fn queue(base_height: u8) -> Self {
        Self::flat(base_height).into_queue()
    }

    pub fn into_queue(mut self) -> Self {
        self.queue = true;
        self
    }

    /// Uphill direction, or `None` for a flat path.
    #[inline]
    pub fn slope(&self) -> Option<Direction> {
        self.sloped.then_some(self.slope_direction)
    }

    /// Height at which this segment meets its neighbour across `dir`, or
    /// `None` when the side of a slope faces `dir`.
    #[inline]
    pub fn edge_height(&self, dir: Direction) -> Option<u8> {
        legality::edge_height(self.base_height, self.slope(), dir)
    }

    #[inline]
    pub fn has_edge(&self, dir: Direction) -> bool {
        self.edges & dir.bit() != 0
    }

    #[inline]
    pub fn set_edge(&mut self, dir: Direction) {
        self.edges |= dir.bit();
    }

    #[inline]
    pub fn clear_edge(&mut self, dir: Direction) {
        self.edges &= !dir.bit();
    }

    #[inline]
    pub fn edge_count(&self) -> u32 {
        edge_count(self.edges)
    }

    #[inline]
    pub fn has_corner(&self, corner: Corner) -> bool {
        self.corners & corner.bit() != 0
    }

    pub fn set_corner(&mut self, corner: Corner, filled: bool) {
        if filled {
            self.corners |= corner.bit();
        } else {
            self.corners &= !corner.bit();
        }
    }

    /// Drops every ride-chain stamp written by a queue walk.
    pub fn clear_queue_chain(&mut self) {
        self.ride = None;
        self.station = None;
        self.has_queue_banner = false;
    }

    /// Packs the element into its fixed 8-byte storage layout.
    ///
    /// `RideId(0xFFFF)` and `StationIndex(0xFF)` are the "none" markers and
    /// cannot be stored.
    pub fn pack(&self) -> [u8; 8] {
        let mut flags = 0u8;
        flags |= self.sloped as u8;
        flags |= self.slope_direction.index() << 1;
        flags |= (self.queue as u8) << 3;
        flags |= (self.has_queue_banner as u8) << 4;
        flags |= (self.wide as u8) << 5;
        flags |= (self.broken as u8) << 6;
        flags |= (self.blocked_by_vehicle as u8) << 7;

        let ride = self.ride.map_or(NO_RIDE, |r| r.0).to_le_bytes();
        [
            self.base_height,
            self.clearance_height,
            (self.edges & 0x0F) | ((self.corners & 0x0F) << 4),
            flags,
            self.queue_banner_direction.index(),
            ride[0],
            ride[1],
            self.station.map_or(NO_STATION, |s| s.0),
        ]
    }

    pub fn unpack(bytes: &[u8; 8]) -> Result<Self, PathDecodeError> {
        let base_height = bytes[0];
        let clearance_height = bytes[1];
        if clearance_height < base_height {
            return Err(PathDecodeError::ClearanceBelowBase {
                base_height,
                clearance_height,
            });
        }
        if bytes[4] & !0b11 != 0 {
            return Err(PathDecodeError::ReservedBits {
                byte: 4,
                value: bytes[4],
            });
        }

        let flags = bytes[3];
        let ride = u16::from_le_bytes([bytes[5], bytes[6]]);
        Ok(Self {
            base_height,
            clearance_height,
            sloped: flags & 1 != 0,
            slope_direction: Direction::from_index(flags >> 1),
            edges: bytes[2] & 0x0F,
            corners: bytes[2] >> 4,
            queue: flags & (1 << 3) != 0,
            ride: (ride != NO_RIDE).then_some(RideId(ride)),
            station: (bytes[7] != NO_STATION).then_some(StationIndex(bytes[7])),
            has_queue_banner: flags & (1 << 4) != 0,
            queue_banner_direction: Direction::from_index(bytes[4]),
            wide: flags & (1 << 5) != 0,
            broken: flags & (1 << 6) != 0,
            blocked_by_vehicle: flags & (1 << 7) != 0,
        })
    }
}

const NO_RIDE: u16 = 0xFFFF;
const NO_STATION: u8 = 0xFF;

/// Errors raised by [`PathElement::unpack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDecodeError {
    /// Bits that must be zero were set.
    ReservedBits { byte: usize, value: u8 },
    /// The stored clearance lies below the base height.
    ClearanceBelowBase { base_height: u8, clearance_height: u8 },
}

impl std::fmt::Display for PathDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathDecodeError::ReservedBits { byte, value } => {
                write!(f, "reserved bits set in byte {byte}: {value:#04x}")
            }
            PathDecodeError::ClearanceBelowBase {
                base_height,
                clearance_height,
            } => write!(
                f,
                "clearance height {clearance_height} is below base height {base_height}"
            ),
        }
    }
}

impl std::error::Error for PathDecodeError {}

// ---------------------------------------------------------------------------
// Ride track
// ---------------------------------------------------------------------------

/// Footprint of a flat ride, in tiles per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlatRideShape {
    Single,
    Square2,
    Square3,
}

impl FlatRideShape {
    pub fn side(self) -> u8 {
        match self {
            FlatRideShape::Single => 1,
            FlatRideShape::Square2 => 2,
            FlatRideShape::Square3 => 3,
        }
    }

    /// Unrotated "connects to path" mask of piece `sequence`.
    ///
    /// Pieces are numbered row by row from the north-west corner; only the
    /// outer sides of the footprint accept a path.
    pub fn path_mask(self, sequence: u8) -> u8 {
        let n = self.side();
        if sequence >= n * n {
            return 0;
        }
        let (row, col) = (sequence / n, sequence % n);
        let mut mask = 0;
        if row == 0 {
            mask |= Direction::North.bit();
        }
        if row == n - 1 {
            mask |= Direction::South.bit();
        }
        if col == 0 {
            mask |= Direction::West.bit();
        }
        if col == n - 1 {
            mask |= Direction::East.bit();
        }
        mask
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    /// Coaster and transport track never joins a footpath.
    Coaster,
    FlatRide(FlatRideShape),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackElement {
    pub ride: RideId,
    pub base_height: u8,
    pub direction: Direction,
    pub sequence: u8,
    pub kind: TrackKind,
}

impl TrackElement {
    /// Sides of this piece that accept a footpath, rotated into world space.
    pub fn path_mask(&self) -> u8 {
        match self.kind {
            TrackKind::Coaster => 0,
            TrackKind::FlatRide(shape) => {
                rotate_mask(shape.path_mask(self.sequence), self.direction.index())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entrances
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntranceKind {
    RideEntrance,
    RideExit,
    ParkEntrance,
}

/// A ride entrance/exit or one piece of a park entrance.
///
/// `direction` points from the entrance toward the path it serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntranceElement {
    pub kind: EntranceKind,
    pub ride: Option<RideId>,
    pub station: Option<StationIndex>,
    pub base_height: u8,
    pub direction: Direction,
    pub sequence: u8,
}

impl EntranceElement {
    pub fn ride_entrance(
        ride: RideId,
        station: StationIndex,
        base_height: u8,
        direction: Direction,
    ) -> Self {
        Self {
            kind: EntranceKind::RideEntrance,
            ride: Some(ride),
            station: Some(station),
            base_height,
            direction,
            sequence: 0,
        }
    }

    pub fn path_mask(&self) -> u8 {
        let unrotated = match (self.kind, self.sequence) {
            (EntranceKind::RideEntrance | EntranceKind::RideExit, _) => 0b0001,
            // The centre piece opens front and back; side pieces are solid.
            (EntranceKind::ParkEntrance, 0) => 0b0101,
            (EntranceKind::ParkEntrance, _) => 0,
        };
        rotate_mask(unrotated, self.direction.index())
    }
}

// ---------------------------------------------------------------------------
// Scenery and land
// ---------------------------------------------------------------------------

/// A wall or fence standing on one edge of its tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallElement {
    pub base_height: u8,
    pub clearance_height: u8,
    pub direction: Direction,
}

impl WallElement {
    /// True when this wall stands on edge `dir` and overlaps `lo..hi`.
    pub fn blocks(&self, dir: Direction, lo: u8, hi: u8) -> bool {
        self.direction == dir && self.base_height < hi && lo < self.clearance_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerElement {
    pub base_height: u8,
    pub direction: Direction,
    /// Guests may not leave the tile through `direction`.
    pub no_entry: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceElement {
    pub base_height: u8,
}

// ---------------------------------------------------------------------------
// TileElement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileElement {
    Path(PathElement),
    Track(TrackElement),
    Entrance(EntranceElement),
    Wall(WallElement),
    Banner(BannerElement),
    Surface(SurfaceElement),
}

impl TileElement {
    pub fn base_height(&self) -> u8 {
        match self {
            TileElement::Path(p) => p.base_height,
            TileElement::Track(t) => t.base_height,
            TileElement::Entrance(e) => e.base_height,
            TileElement::Wall(w) => w.base_height,
            TileElement::Banner(b) => b.base_height,
            TileElement::Surface(s) => s.base_height,
        }
    }

    pub fn as_path(&self) -> Option<&PathElement> {
        match self {
            TileElement::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_path_mut(&mut self) -> Option<&mut PathElement> {
        match self {
            TileElement::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_track(&self) -> Option<&TrackElement> {
        match self {
            TileElement::Track(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_entrance(&self) -> Option<&EntranceElement> {
        match self {
            TileElement::Entrance(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_wall(&self) -> Option<&WallElement> {
        match self {
            TileElement::Wall(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_banner(&self) -> Option<&BannerElement> {
        match self {
            TileElement::Banner(b) => Some(b),
            _ => None,
        }
    }

    /// Height at which a non-path element wants a footpath to meet its
    /// `side`, or `None` when that side takes no path.
    pub fn wants_path_connection(&self, side: Direction) -> Option<u8> {
        let (mask, height) = match self {
            TileElement::Track(t) => (t.path_mask(), t.base_height),
            TileElement::Entrance(e) => (e.path_mask(), e.base_height),
            _ => return None,
        };
        (mask & side.bit() != 0).then_some(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sloped_edge_heights() {
        let path = PathElement::sloped(4, Direction::East);
        assert_eq!(path.edge_height(Direction::East), Some(6));
        assert_eq!(path.edge_height(Direction::West), Some(4));
        assert_eq!(path.edge_height(Direction::North), None);
        assert_eq!(path.clearance_height, 10);
        assert_eq!(PathElement::flat(4).edge_height(Direction::North), Some(4));
    }

    #[test]
    fn test_edge_and_corner_bits() {
        let mut path = PathElement::flat(2);
        path.set_edge(Direction::East);
        path.set_edge(Direction::West);
        assert_eq!(path.edges, 0b1010);
        assert_eq!(path.edge_count(), 2);
        path.clear_edge(Direction::East);
        assert!(!path.has_edge(Direction::East));

        path.set_corner(Corner::SouthWest, true);
        assert_eq!(path.corners, 0b0100);
        path.set_corner(Corner::SouthWest, false);
        assert_eq!(path.corners, 0);
    }

    #[test]
    fn test_pack_layout() {
        let mut path = PathElement::sloped(8, Direction::South).into_queue();
        path.edges = 0b0101;
        path.has_queue_banner = true;
        path.queue_banner_direction = Direction::West;
        path.ride = Some(RideId(0x0102));
        path.station = Some(StationIndex(3));

        let bytes = path.pack();
        assert_eq!(bytes[0], 8);
        assert_eq!(bytes[1], 14);
        assert_eq!(bytes[2], 0b0000_0101);
        // sloped, slope dir 2, queue, banner
        assert_eq!(bytes[3], 0b0001_1101);
        assert_eq!(bytes[4], 3);
        assert_eq!(&bytes[5..7], &[0x02, 0x01]);
        assert_eq!(bytes[7], 3);

        assert_eq!(PathElement::unpack(&bytes), Ok(path));
    }

    #[test]
    fn test_unpack_marks_missing_ride() {
        let path = PathElement::flat(2);
        let bytes = path.pack();
        assert_eq!(&bytes[5..8], &[0xFF, 0xFF, 0xFF]);
        let decoded = PathElement::unpack(&bytes).unwrap();
        assert_eq!(decoded.ride, None);
        assert_eq!(decoded.station, None);
    }

    #[test]
    fn test_unpack_rejects_garbage() {
        let mut bytes = PathElement::flat(2).pack();
        bytes[4] = 0x80;
        assert_eq!(
            PathElement::unpack(&bytes),
            Err(PathDecodeError::ReservedBits {
                byte: 4,
                value: 0x80
            })
        );

        let mut bytes = PathElement::flat(6).pack();
        bytes[1] = 2;
        let err = PathElement::unpack(&bytes).unwrap_err();
        assert!(err.to_string().contains("below base height"));
    }

    #[test]
    fn test_flat_ride_masks() {
        assert_eq!(FlatRideShape::Single.path_mask(0), 0b1111);
        // north-west and south-east pieces of a 2x2 ride
        assert_eq!(FlatRideShape::Square2.path_mask(0), 0b1001);
        assert_eq!(FlatRideShape::Square2.path_mask(3), 0b0110);
        assert_eq!(FlatRideShape::Square3.path_mask(4), 0);
        assert_eq!(FlatRideShape::Square3.path_mask(1), 0b0001);
        assert_eq!(FlatRideShape::Square3.path_mask(9), 0);
    }

    #[test]
    fn test_track_mask_follows_rotation() {
        let track = TrackElement {
            ride: RideId(0),
            base_height: 2,
            direction: Direction::East,
            sequence: 1,
            kind: TrackKind::FlatRide(FlatRideShape::Square3),
        };
        // the north side piece turned a quarter clockwise faces east
        assert_eq!(track.path_mask(), Direction::East.bit());

        let coaster = TrackElement {
            kind: TrackKind::Coaster,
            ..track
        };
        assert_eq!(coaster.path_mask(), 0);
    }

    #[test]
    fn test_entrance_masks() {
        let entrance =
            EntranceElement::ride_entrance(RideId(1), StationIndex(0), 2, Direction::South);
        assert_eq!(entrance.path_mask(), Direction::South.bit());

        let park = EntranceElement {
            kind: EntranceKind::ParkEntrance,
            ride: None,
            station: None,
            base_height: 2,
            direction: Direction::East,
            sequence: 0,
        };
        assert_eq!(park.path_mask(), Direction::East.bit() | Direction::West.bit());
        let side = EntranceElement { sequence: 1, ..park };
        assert_eq!(side.path_mask(), 0);
    }

    #[test]
    fn test_wants_path_connection() {
        let entrance = TileElement::Entrance(EntranceElement::ride_entrance(
            RideId(1),
            StationIndex(0),
            6,
            Direction::North,
        ));
        assert_eq!(entrance.wants_path_connection(Direction::North), Some(6));
        assert_eq!(entrance.wants_path_connection(Direction::South), None);
        assert_eq!(
            TileElement::Path(PathElement::flat(2)).wants_path_connection(Direction::North),
            None
        );
    }

    #[test]
    fn test_wall_blocks_overlapping_range() {
        let wall = WallElement {
            base_height: 2,
            clearance_height: 6,
            direction: Direction::East,
        };
        assert!(wall.blocks(Direction::East, 2, 6));
        assert!(wall.blocks(Direction::East, 4, 8));
        assert!(!wall.blocks(Direction::East, 6, 10));
        assert!(!wall.blocks(Direction::West, 2, 6));
    }
}
