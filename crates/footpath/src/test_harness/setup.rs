//! Builder methods that place elements for integration tests.

use crate::elements::{
    BannerElement, EntranceElement, FlatRideShape, PathElement, TileElement, TrackElement,
    TrackKind, WallElement,
};
use crate::grid::{Direction, TileMap, TilePos};
use crate::params::FootpathParams;
use crate::rides::{RideId, RideRegistry, StationIndex};
use crate::tile_query::ElementRef;

use super::TestPark;

impl TestPark {
    // -----------------------------------------------------------------------
    // Parameters
    // -----------------------------------------------------------------------

    pub fn with_params(mut self, params: FootpathParams) -> Self {
        self.app.world_mut().insert_resource(params);
        self
    }

    // -----------------------------------------------------------------------
    // Paths
    // -----------------------------------------------------------------------

    /// Place an unwired flat path. It is connected by the next
    /// `connect_placed()`.
    pub fn with_path(self, x: u8, y: u8, height: u8) -> Self {
        self.with_element(x, y, TileElement::Path(PathElement::flat(height)))
    }

    pub fn with_queue(self, x: u8, y: u8, height: u8) -> Self {
        self.with_element(x, y, TileElement::Path(PathElement::queue(height)))
    }

    /// A queue that prefers to keep its `preferred` edge when rebalanced.
    pub fn with_queue_preferring(self, x: u8, y: u8, height: u8, preferred: Direction) -> Self {
        let mut queue = PathElement::queue(height);
        queue.slope_direction = preferred;
        self.with_element(x, y, TileElement::Path(queue))
    }

    pub fn with_slope(self, x: u8, y: u8, height: u8, uphill: Direction) -> Self {
        self.with_element(x, y, TileElement::Path(PathElement::sloped(height, uphill)))
    }

    // -----------------------------------------------------------------------
    // Scenery
    // -----------------------------------------------------------------------

    /// A wall on edge `side` of the tile. Walls are not wired, so they never
    /// join the placed list.
    pub fn with_wall(mut self, x: u8, y: u8, height: u8, side: Direction) -> Self {
        self.place(
            x,
            y,
            TileElement::Wall(WallElement {
                base_height: height,
                clearance_height: height + 4,
                direction: side,
            }),
        );
        self
    }

    pub fn with_banner(
        mut self,
        x: u8,
        y: u8,
        height: u8,
        side: Direction,
        no_entry: bool,
    ) -> Self {
        self.place(
            x,
            y,
            TileElement::Banner(BannerElement {
                base_height: height,
                direction: side,
                no_entry,
            }),
        );
        self
    }

    // -----------------------------------------------------------------------
    // Rides
    // -----------------------------------------------------------------------

    /// Place a ride entrance opening toward `facing` and register it as the
    /// entrance of `station`.
    pub fn with_ride_entrance(
        mut self,
        x: u8,
        y: u8,
        height: u8,
        facing: Direction,
        ride: RideId,
        station: StationIndex,
    ) -> Self {
        self.app
            .world_mut()
            .resource_mut::<RideRegistry>()
            .set_station_entrance(ride, station, TilePos::new(x, y));
        self.with_element(
            x,
            y,
            TileElement::Entrance(EntranceElement::ride_entrance(ride, station, height, facing)),
        )
    }

    /// Place every piece of a flat ride with its north-west corner at
    /// (x, y), unrotated.
    pub fn with_flat_ride(
        mut self,
        x: u8,
        y: u8,
        height: u8,
        ride: RideId,
        shape: FlatRideShape,
    ) -> Self {
        let side = shape.side();
        for sequence in 0..side * side {
            let piece = TrackElement {
                ride,
                base_height: height,
                direction: Direction::North,
                sequence,
                kind: TrackKind::FlatRide(shape),
            };
            self = self.with_element(
                x + sequence % side,
                y + sequence / side,
                TileElement::Track(piece),
            );
        }
        self
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn with_element(mut self, x: u8, y: u8, element: TileElement) -> Self {
        let placed = self.place(x, y, element);
        self.placed.push(placed);
        self
    }

    /// Put `element` on top of the stack at (x, y) without wiring it.
    pub fn place(&mut self, x: u8, y: u8, element: TileElement) -> ElementRef {
        let pos = TilePos::new(x, y);
        self.app
            .world_mut()
            .resource_mut::<TileMap>()
            .insert(pos, element)
            .unwrap_or_else(|e| panic!("TestPark: cannot place element: {e}"))
    }
}
