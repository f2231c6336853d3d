use bevy::prelude::*;

use crate::config::MAX_QUEUE_EDGES;
use crate::elements::{PathElement, TileElement};
use crate::grid::{edge_count, Direction, TilePos};
use crate::neighbours::{resolve_neighbour, NeighbourOrder};
use crate::params::FootpathParams;
use crate::queue_chain::QueueChainTracker;
use crate::tile_query::{ElementRef, TileQuery};

use super::corners::refresh_edge_corners;
use super::editor::{disconnect_edge, link};

/// Which side of the two-connection limit a queue is about to cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityChange {
    /// A new connection is about to be added.
    Adding,
    /// An existing connection is about to be removed.
    Removing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebalance {
    NotNeeded,
    /// An edge toward a plain path was dropped to make room.
    Freed(Direction),
    /// A replacement edge was wired so the queue keeps a connection.
    Rerouted(Direction),
    /// No legal alternative exists; the caller proceeds as is.
    NoAlternative,
}

/// Keeps a queue segment between one and two connections around an edit.
///
/// `exclude` masks edges the rebalance must not touch: for
/// [`CapacityChange::Adding`] the edges that must survive, for
/// [`CapacityChange::Removing`] the edges about to go.
pub fn queue_capacity_rebalance<M: TileQuery + ?Sized>(
    map: &mut M,
    tracker: &mut QueueChainTracker,
    params: &FootpathParams,
    queue: ElementRef,
    change: CapacityChange,
    exclude: u8,
) -> Rebalance {
    let Some(path) = map.path(queue).copied() else {
        return Rebalance::NotNeeded;
    };
    if !path.queue {
        return Rebalance::NotNeeded;
    }

    let outcome = match change {
        CapacityChange::Adding => {
            if path.edge_count() < MAX_QUEUE_EDGES {
                return Rebalance::NotNeeded;
            }
            match find_droppable_edge(map, queue, exclude) {
                Some(dir) => {
                    disconnect_edge(map, tracker, queue, dir);
                    Rebalance::Freed(dir)
                }
                None => Rebalance::NoAlternative,
            }
        }
        CapacityChange::Removing => {
            if path.edges & exclude == 0 || edge_count(path.edges & !exclude) > 0 {
                return Rebalance::NotNeeded;
            }
            reroute(map, tracker, params, queue, &path, exclude)
        }
    };
    debug!(
        "Queue rebalance at ({}, {}) {:?}: {:?}",
        queue.pos.x, queue.pos.y, change, outcome
    );
    outcome
}

/// The edge a full queue would give up to accept a new connection.
///
/// Only edges leading to a plain path, off the map, or to nothing at all are
/// candidates; links to other queues, tracks and entrances are kept. The
/// queue's preferred direction is tried last.
pub fn find_droppable_edge<M: TileQuery + ?Sized>(
    map: &M,
    queue: ElementRef,
    keep: u8,
) -> Option<Direction> {
    let path = *map.path(queue)?;
    if !path.queue {
        return None;
    }
    let preferred = path.slope_direction;
    Direction::ALL
        .into_iter()
        .filter(|d| *d != preferred)
        .chain(std::iter::once(preferred))
        .find(|&dir| {
            path.has_edge(dir)
                && keep & dir.bit() == 0
                && edge_is_droppable(map, queue.pos, &path, dir)
        })
}

fn edge_is_droppable<M: TileQuery + ?Sized>(
    map: &M,
    pos: TilePos,
    path: &PathElement,
    dir: Direction,
) -> bool {
    let Some(height) = path.edge_height(dir) else {
        return true;
    };
    let Some(next) = map.step(pos, dir) else {
        return true;
    };
    let back = dir.opposite();
    for element in map.elements(next) {
        match element {
            TileElement::Path(p) if p.edge_height(back) == Some(height) => return !p.queue,
            other if other.wants_path_connection(back) == Some(height) => return false,
            _ => {}
        }
    }
    true
}

/// Wires one replacement connection, preferred direction first.
fn reroute<M: TileQuery + ?Sized>(
    map: &mut M,
    tracker: &mut QueueChainTracker,
    params: &FootpathParams,
    queue: ElementRef,
    path: &PathElement,
    exclude: u8,
) -> Rebalance {
    let preferred = path.slope_direction;
    let order = std::iter::once(preferred).chain(
        Direction::ALL
            .into_iter()
            .filter(move |d| *d != preferred),
    );
    for dir in order {
        if exclude & dir.bit() != 0 || path.has_edge(dir) {
            continue;
        }
        let Some(neighbour) = resolve_neighbour(map, queue, dir, params) else {
            continue;
        };
        if matches!(
            neighbour.order,
            NeighbourOrder::QueueNeedingCapacity | NeighbourOrder::MapEdge
        ) {
            continue;
        }
        link(map, tracker, queue, &neighbour);
        refresh_edge_corners(map, queue, dir);
        return Rebalance::Rerouted(dir);
    }
    Rebalance::NoAlternative
}
