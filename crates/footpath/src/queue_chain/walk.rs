use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::elements::{EntranceKind, TileElement};
use crate::grid::{directions_in, Direction, TilePos};
use crate::rides::{RideId, RideQuery, StationEntrance};
use crate::tile_query::{ElementRef, TileQuery};

use super::tracker::QueueChainTracker;

/// What one flush did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueWalkSummary {
    pub rides_walked: u32,
    pub stations_walked: u32,
    pub segments_stamped: u32,
    pub banners_placed: u32,
    pub loops_detected: u32,
}

/// Re-walks the queue line of every pending ride and empties the tracker.
///
/// Queue segments stamped with a pending ride are cleared first, so a line
/// that got shorter loses its old banner. Each station's line is then
/// followed from its entrance: every segment reached is stamped with the
/// ride and station, and the last one gets the banner facing the direction
/// it was reached from.
pub fn flush_queue_rewalk<M, R>(
    map: &mut M,
    tracker: &mut QueueChainTracker,
    rides: &R,
) -> QueueWalkSummary
where
    M: TileQuery + ?Sized,
    R: RideQuery + ?Sized,
{
    let pending = tracker.drain();
    let mut summary = QueueWalkSummary::default();
    if pending.is_empty() {
        return summary;
    }

    let size = map.map_size();
    for y in 0..size {
        for x in 0..size {
            for element in map.elements_mut(TilePos::new(x, y)) {
                if let Some(path) = element.as_path_mut() {
                    if path.queue && path.ride.is_some_and(|r| pending.contains(&r)) {
                        path.clear_queue_chain();
                    }
                }
            }
        }
    }

    // Segments stamped during this flush, and by which ride.
    let mut claimed: HashMap<ElementRef, RideId> = HashMap::new();
    for ride in pending {
        if !rides.ride_exists(ride) {
            debug!("Queue rewalk skipped for missing ride {}", ride.0);
            continue;
        }
        summary.rides_walked += 1;
        for station in rides.station_entrances(ride) {
            walk_station(map, ride, station, &mut claimed, &mut summary);
        }
    }
    summary
}

fn walk_station<M: TileQuery + ?Sized>(
    map: &mut M,
    ride: RideId,
    station: StationEntrance,
    claimed: &mut HashMap<ElementRef, RideId>,
    summary: &mut QueueWalkSummary,
) {
    let entrance = map.elements(station.pos).iter().find_map(|e| match e {
        TileElement::Entrance(entrance)
            if entrance.kind == EntranceKind::RideEntrance
                && entrance.ride == Some(ride)
                && entrance.station.is_none_or(|s| s == station.station) =>
        {
            Some(*entrance)
        }
        _ => None,
    });
    let Some(entrance) = entrance else {
        debug!(
            "Ride {} station {} has no entrance at ({}, {})",
            ride.0, station.station.0, station.pos.x, station.pos.y
        );
        return;
    };
    summary.stations_walked += 1;

    let mut pos = station.pos;
    let mut dir = entrance.direction;
    let mut height = entrance.base_height;
    let mut visited: HashSet<ElementRef> = HashSet::new();
    let mut last: Option<(ElementRef, Direction)> = None;

    while let Some(segment) = next_queue_segment(map, pos, dir, height) {
        if !visited.insert(segment) {
            warn!(
                "Queue line of ride {} loops back at ({}, {})",
                ride.0, segment.pos.x, segment.pos.y
            );
            summary.loops_detected += 1;
            break;
        }
        if claimed.get(&segment).is_some_and(|owner| *owner != ride) {
            break;
        }
        let Some(path) = map.path_mut(segment) else {
            break;
        };
        path.ride = Some(ride);
        path.station = Some(station.station);
        path.has_queue_banner = false;
        let path = *path;
        claimed.insert(segment, ride);
        summary.segments_stamped += 1;
        last = Some((segment, dir));

        // First remaining edge, in N, E, S, W order, that leads on to
        // another queue segment.
        let remaining = path.edges & !dir.opposite().bit();
        let onward = directions_in(remaining).find_map(|d| {
            let h = path.edge_height(d)?;
            next_queue_segment(map, segment.pos, d, h).map(|_| (d, h))
        });
        let Some((next_dir, next_height)) = onward else {
            break;
        };
        pos = segment.pos;
        dir = next_dir;
        height = next_height;
    }

    if let Some((segment, arrival)) = last {
        if let Some(path) = map.path_mut(segment) {
            path.has_queue_banner = true;
            path.queue_banner_direction = arrival;
            summary.banners_placed += 1;
        }
    }
}

/// The queue segment across `dir` from `pos` that meets the edge at
/// `height` and links back.
fn next_queue_segment<M: TileQuery + ?Sized>(
    map: &M,
    pos: TilePos,
    dir: Direction,
    height: u8,
) -> Option<ElementRef> {
    let next = map.step(pos, dir)?;
    let back = dir.opposite();
    map.elements(next)
        .iter()
        .position(|e| {
            e.as_path().is_some_and(|p| {
                p.queue && p.has_edge(back) && p.edge_height(back) == Some(height)
            })
        })
        .map(|index| ElementRef::new(next, index))
}
