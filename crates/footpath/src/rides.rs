//! Ride identity and the ride/station lookup the footpath graph consumes.
//!
//! Ride simulation lives elsewhere; the footpath code only needs to know
//! where each station's entrance sits so it can walk the queue line.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::TilePos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RideId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationIndex(pub u8);

/// Location of one station's entrance element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationEntrance {
    pub station: StationIndex,
    pub pos: TilePos,
}

/// Capability query into the ride system.
pub trait RideQuery {
    /// Entrances of every station of `ride`, in station order.
    fn station_entrances(&self, ride: RideId) -> Vec<StationEntrance>;

    fn ride_exists(&self, ride: RideId) -> bool;
}

/// In-memory ride table keyed by ride id.
#[derive(Resource, Default, Debug, Clone)]
pub struct RideRegistry {
    rides: BTreeMap<RideId, Vec<StationEntrance>>,
}

impl RideRegistry {
    /// Registers (or moves) the entrance of `station` on `ride`.
    pub fn set_station_entrance(&mut self, ride: RideId, station: StationIndex, pos: TilePos) {
        let stations = self.rides.entry(ride).or_default();
        match stations.iter_mut().find(|s| s.station == station) {
            Some(existing) => existing.pos = pos,
            None => {
                stations.push(StationEntrance { station, pos });
                stations.sort_by_key(|s| s.station);
            }
        }
    }

    pub fn remove_ride(&mut self, ride: RideId) {
        self.rides.remove(&ride);
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }
}

impl RideQuery for RideRegistry {
    fn station_entrances(&self, ride: RideId) -> Vec<StationEntrance> {
        self.rides.get(&ride).cloned().unwrap_or_default()
    }

    fn ride_exists(&self, ride: RideId) -> bool {
        self.rides.contains_key(&ride)
    }
}
