use bevy::prelude::*;

use crate::config::MAX_QUEUE_EDGES;
use crate::elements::TileElement;
use crate::grid::{directions_in, Direction, TilePos};
use crate::legality::fence_blocks;
use crate::neighbours::{
    accepts_connection, collect_neighbours, CollectMode, Neighbour, NeighbourTarget,
};
use crate::params::FootpathParams;
use crate::queue_chain::QueueChainTracker;
use crate::rides::RideId;
use crate::tile_query::{ElementRef, TileQuery};

use super::corners::{connect_corners, refresh_edge_corners};
use super::rebalance::{queue_capacity_rebalance, CapacityChange, Rebalance};

/// A path whose corner bits need another look once the batch is done.
/// Paths are flagged by position and height because element indices can
/// shift while the batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CornerFixup {
    pub pos: TilePos,
    pub height: u8,
}

/// Wires a newly placed path, track or entrance into the graph.
///
/// For a path this links every accepted neighbour (both sides of each edge)
/// and then recomputes its corners. For a track or entrance it connects
/// each path facing one of its accepting sides.
pub fn connect_tile<M: TileQuery + ?Sized>(
    map: &mut M,
    tracker: &mut QueueChainTracker,
    params: &FootpathParams,
    origin: ElementRef,
) {
    let Some(element) = map.element(origin).copied() else {
        debug!(
            "connect_tile: no element at ({}, {}) #{}",
            origin.pos.x, origin.pos.y, origin.index
        );
        return;
    };
    match element {
        TileElement::Path(_) => connect_path(map, tracker, params, origin),
        TileElement::Track(_) | TileElement::Entrance(_) => {
            for side in Direction::ALL {
                let Some(height) = element.wants_path_connection(side) else {
                    continue;
                };
                let facing = map
                    .step(origin.pos, side)
                    .and_then(|next| map.find_path_by_edge(next, side.opposite(), height));
                if let Some(path) = facing {
                    connect_path(map, tracker, params, path);
                }
            }
            if let TileElement::Entrance(entrance) = element {
                push_ride(tracker, entrance.ride);
            }
        }
        _ => {}
    }
}

fn connect_path<M: TileQuery + ?Sized>(
    map: &mut M,
    tracker: &mut QueueChainTracker,
    params: &FootpathParams,
    origin: ElementRef,
) {
    let Some(path) = map.path(origin).copied() else {
        return;
    };
    if path.queue {
        push_ride(tracker, path.ride);
    }

    let mut linked = 0u8;
    for neighbour in collect_neighbours(map, origin, CollectMode::Commit, params) {
        let dir = neighbour.direction;
        let Some(current) = map.path(origin).copied() else {
            return;
        };

        if current.queue && !current.has_edge(dir) && current.edge_count() >= MAX_QUEUE_EDGES {
            let outcome = queue_capacity_rebalance(
                map,
                tracker,
                params,
                origin,
                CapacityChange::Adding,
                linked | dir.bit(),
            );
            if !matches!(outcome, Rebalance::Freed(_)) {
                continue;
            }
        }

        if let NeighbourTarget::Path(target) = neighbour.target {
            let back = dir.opposite();
            let full = map
                .path(target)
                .is_some_and(|t| t.queue && !t.has_edge(back) && t.edge_count() >= MAX_QUEUE_EDGES);
            if full {
                let outcome = queue_capacity_rebalance(
                    map,
                    tracker,
                    params,
                    target,
                    CapacityChange::Adding,
                    back.bit(),
                );
                if !matches!(outcome, Rebalance::Freed(_)) {
                    continue;
                }
            }
        }

        link(map, tracker, origin, &neighbour);
        linked |= dir.bit();
    }

    connect_corners(map, origin);
}

/// Sets the edge bit toward `neighbour` on `origin` and the mirrored bit on
/// a path neighbour, queueing any ride whose line changed.
pub(super) fn link<M: TileQuery + ?Sized>(
    map: &mut M,
    tracker: &mut QueueChainTracker,
    origin: ElementRef,
    neighbour: &Neighbour,
) {
    let dir = neighbour.direction;
    if let Some(path) = map.path_mut(origin) {
        path.set_edge(dir);
        if path.queue {
            push_ride(tracker, path.ride);
        }
    }
    match neighbour.target {
        NeighbourTarget::Path(target) => {
            if let Some(other) = map.path_mut(target) {
                other.set_edge(dir.opposite());
                if other.queue {
                    push_ride(tracker, other.ride);
                }
            }
        }
        NeighbourTarget::Entrance(_) => push_ride(tracker, neighbour.ride),
        NeighbourTarget::Track(_) | NeighbourTarget::MapEdge => {}
    }
}

/// Clears the edge `dir` on `origin` and the mirrored edge on the path
/// across it, then refreshes the two 2x2 blocks along that edge.
///
/// Returns the path on the far side, when one was linked.
pub fn disconnect_edge<M: TileQuery + ?Sized>(
    map: &mut M,
    tracker: &mut QueueChainTracker,
    origin: ElementRef,
    dir: Direction,
) -> Option<ElementRef> {
    let path = map.path(origin).copied()?;
    if let Some(p) = map.path_mut(origin) {
        p.clear_edge(dir);
    }
    if path.queue {
        push_ride(tracker, path.ride);
    }

    let mirror = path
        .edge_height(dir)
        .and_then(|height| linked_path_across(map, origin.pos, dir, height));
    if let Some(other) = mirror.and_then(|m| map.path_mut(m)) {
        other.clear_edge(dir.opposite());
        if other.queue {
            push_ride(tracker, other.ride);
        }
    }
    refresh_edge_corners(map, origin, dir);
    mirror
}

/// Unwires an element that is about to be removed.
///
/// Every neighbour linked to it loses its mirrored edge; a neighbouring
/// queue that would be left with no connection first tries to wire an
/// alternative. Neighbours are flagged in `fixups` for the end-of-batch
/// corner pass. A removed path keeps no edges or corners.
pub fn disconnect_tile<M: TileQuery + ?Sized>(
    map: &mut M,
    tracker: &mut QueueChainTracker,
    params: &FootpathParams,
    origin: ElementRef,
    fixups: &mut Vec<CornerFixup>,
) {
    let Some(element) = map.element(origin).copied() else {
        return;
    };
    match element {
        TileElement::Path(path) => {
            if path.queue {
                push_ride(tracker, path.ride);
            }
            for dir in directions_in(path.edges) {
                if let Some(height) = path.edge_height(dir) {
                    unlink_neighbour(map, tracker, params, origin.pos, dir, height, fixups);
                }
            }
            if let Some(p) = map.path_mut(origin) {
                p.edges = 0;
                p.corners = 0;
            }
            connect_corners(map, origin);
        }
        TileElement::Track(_) | TileElement::Entrance(_) => {
            for side in Direction::ALL {
                if let Some(height) = element.wants_path_connection(side) {
                    unlink_neighbour(map, tracker, params, origin.pos, side, height, fixups);
                }
            }
            if let TileElement::Entrance(entrance) = element {
                push_ride(tracker, entrance.ride);
            }
        }
        _ => {}
    }
}

/// Rechecks every edge of `origin` and clears the ones whose target no
/// longer accepts the connection (removed, raised, or walled off).
///
/// A queue about to lose its last connection is rebalanced first. Paths
/// still linked to `origin` are flagged in `fixups`. Returns the mask of
/// cleared edges.
pub fn prune_stale_edges<M: TileQuery + ?Sized>(
    map: &mut M,
    tracker: &mut QueueChainTracker,
    params: &FootpathParams,
    origin: ElementRef,
    fixups: &mut Vec<CornerFixup>,
) -> u8 {
    let Some(path) = map.path(origin).copied() else {
        return 0;
    };

    let mut stale = 0u8;
    for dir in directions_in(path.edges) {
        let wanted = path.edge_height(dir).is_some_and(|height| {
            !fence_blocks(
                map,
                origin.pos,
                dir,
                (path.base_height, path.clearance_height),
            ) && match map.step(origin.pos, dir) {
                Some(next) => accepts_connection(map, next, dir, height),
                None => params.open_map_edges,
            }
        });
        if wanted {
            let still_linked = path
                .edge_height(dir)
                .and_then(|height| linked_path_across(map, origin.pos, dir, height));
            if let Some(other) = still_linked {
                if let Some(p) = map.path(other) {
                    fixups.push(CornerFixup {
                        pos: other.pos,
                        height: p.base_height,
                    });
                }
            }
        } else {
            stale |= dir.bit();
        }
    }
    if stale == 0 {
        return 0;
    }

    if path.queue {
        queue_capacity_rebalance(map, tracker, params, origin, CapacityChange::Removing, stale);
    }
    for dir in directions_in(stale) {
        disconnect_edge(map, tracker, origin, dir);
    }
    debug!(
        "Pruned stale edges {:#06b} at ({}, {})",
        stale, origin.pos.x, origin.pos.y
    );
    stale
}

fn unlink_neighbour<M: TileQuery + ?Sized>(
    map: &mut M,
    tracker: &mut QueueChainTracker,
    params: &FootpathParams,
    pos: TilePos,
    dir: Direction,
    height: u8,
    fixups: &mut Vec<CornerFixup>,
) {
    let Some(neighbour) = linked_path_across(map, pos, dir, height) else {
        return;
    };
    let Some(path) = map.path(neighbour).copied() else {
        return;
    };
    let back = dir.opposite();
    if path.queue {
        push_ride(tracker, path.ride);
        queue_capacity_rebalance(
            map,
            tracker,
            params,
            neighbour,
            CapacityChange::Removing,
            back.bit(),
        );
    }
    if let Some(p) = map.path_mut(neighbour) {
        p.clear_edge(back);
    }
    refresh_edge_corners(map, neighbour, back);
    fixups.push(CornerFixup {
        pos: neighbour.pos,
        height: path.base_height,
    });
}

/// The path across `dir` from `pos` that meets the edge at `height` and
/// links back toward `pos`.
pub fn linked_path_across<M: TileQuery + ?Sized>(
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
            e.as_path()
                .is_some_and(|p| p.has_edge(back) && p.edge_height(back) == Some(height))
        })
        .map(|index| ElementRef::new(next, index))
}

fn push_ride(tracker: &mut QueueChainTracker, ride: Option<RideId>) {
    if let Some(ride) = ride {
        tracker.push(ride);
    }
}
