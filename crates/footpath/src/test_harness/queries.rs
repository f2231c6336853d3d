//! Edit, update and query methods for `TestPark`.

use bevy::prelude::*;

use crate::elements::PathElement;
use crate::grid::{Direction, TileMap, TilePos};
use crate::invariants::FootpathInvariantReport;
use crate::plugin::{FootpathEditEvent, FootpathEditLog, MapEdgeCheckRequest, MapEdgeCheckResult};
use crate::reachability::{SearchResult, WalkOptions};
use crate::rides::RideId;
use crate::tile_query::{ElementRef, TileQuery};

use super::TestPark;

impl TestPark {
    // -----------------------------------------------------------------------
    // Edits
    // -----------------------------------------------------------------------

    pub fn update(&mut self) {
        self.app.update();
    }

    pub fn send(&mut self, event: FootpathEditEvent) {
        self.app.world_mut().send_event(event);
    }

    /// Connect everything placed since the last call, in placement order,
    /// as one batch.
    pub fn connect_placed(&mut self) {
        for element in std::mem::take(&mut self.placed) {
            self.send(FootpathEditEvent::Connect(element));
        }
        self.update();
    }

    pub fn connect_element(&mut self, element: ElementRef) {
        self.send(FootpathEditEvent::Connect(element));
        self.update();
    }

    pub fn connect(&mut self, x: u8, y: u8, height: u8) {
        let element = self.element_at(x, y, height);
        self.send(FootpathEditEvent::Connect(element));
        self.update();
    }

    /// Unwire the element but leave it on the map.
    pub fn disconnect(&mut self, x: u8, y: u8, height: u8) {
        let element = self.element_at(x, y, height);
        self.send(FootpathEditEvent::Disconnect {
            element,
            remove: false,
        });
        self.update();
    }

    /// Unwire the element and delete it, like demolishing it.
    pub fn remove(&mut self, x: u8, y: u8, height: u8) {
        let element = self.element_at(x, y, height);
        self.send(FootpathEditEvent::Disconnect {
            element,
            remove: true,
        });
        self.update();
    }

    pub fn recompute_wide(&mut self, x: u8, y: u8) {
        self.send(FootpathEditEvent::RecomputeWide(TilePos::new(x, y)));
        self.update();
    }

    pub fn rewalk_ride(&mut self, ride: RideId) {
        self.send(FootpathEditEvent::RewalkRide(ride));
        self.update();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn map(&self) -> &TileMap {
        self.app.world().resource::<TileMap>()
    }

    pub fn edit_log(&self) -> &FootpathEditLog {
        self.app.world().resource::<FootpathEditLog>()
    }

    pub fn invariant_report(&self) -> &FootpathInvariantReport {
        self.app.world().resource::<FootpathInvariantReport>()
    }

    /// First element on (x, y) with base height `height`.
    pub fn element_at(&self, x: u8, y: u8, height: u8) -> ElementRef {
        let pos = TilePos::new(x, y);
        self.map()
            .elements(pos)
            .iter()
            .position(|e| e.base_height() == height)
            .map(|index| ElementRef::new(pos, index))
            .unwrap_or_else(|| panic!("No element at ({x}, {y}) height {height}"))
    }

    pub fn path_at(&self, x: u8, y: u8, height: u8) -> PathElement {
        let map = self.map();
        map.find_path_at(TilePos::new(x, y), height)
            .and_then(|element| map.path(element))
            .copied()
            .unwrap_or_else(|| panic!("Expected a path at ({x}, {y}) height {height}"))
    }

    /// Ask the query system whether the path at (x, y) reaches the map
    /// edge through its `direction` edge.
    pub fn check_map_edge(
        &mut self,
        x: u8,
        y: u8,
        height: u8,
        direction: Direction,
        options: WalkOptions,
    ) -> SearchResult {
        let request = MapEdgeCheckRequest {
            pos: TilePos::new(x, y),
            height,
            direction,
            options,
        };
        self.app.world_mut().send_event(request);
        self.update();
        self.app
            .world()
            .resource::<Events<MapEdgeCheckResult>>()
            .iter_current_update_events()
            .filter(|answer| answer.request == request)
            .last()
            .map(|answer| answer.result)
            .unwrap_or_else(|| panic!("No map edge answer for {request:?}"))
    }
}
