//! Candidate neighbours of a path segment, in connection priority order.

use crate::config::MAX_QUEUE_EDGES;
use crate::connection::find_droppable_edge;
use crate::elements::TileElement;
use crate::grid::{Direction, TilePos};
use crate::legality::{entrance_accepts, fence_blocks, track_accepts};
use crate::params::FootpathParams;
use crate::rides::{RideId, StationIndex};
use crate::tile_query::{ElementRef, TileQuery};

/// Connection priority of a neighbour; higher values connect first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NeighbourOrder {
    /// Open map edge, only offered in editor mode.
    MapEdge = 1,
    /// A queue already holding two other connections.
    QueueNeedingCapacity = 2,
    Path = 3,
    QueueWithCapacity = 4,
    Track = 5,
    Entrance = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighbourTarget {
    Path(ElementRef),
    Track(ElementRef),
    Entrance(ElementRef),
    MapEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbour {
    /// Direction from the origin toward this neighbour.
    pub direction: Direction,
    /// Height of the shared edge.
    pub height: u8,
    pub order: NeighbourOrder,
    pub target: NeighbourTarget,
    pub ride: Option<RideId>,
    pub station: Option<StationIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectMode {
    /// Report candidates only.
    Query,
    /// Candidates the editor will actually wire; queue origins are limited
    /// to a single ride and two neighbours.
    Commit,
}

/// Resolves the one element across `dir` that `origin` could connect to.
///
/// Returns `None` when the origin is not a path, the side of a slope faces
/// `dir`, a wall blocks the edge, or nothing on the far tile takes a path at
/// the shared edge height.
pub fn resolve_neighbour<M: TileQuery + ?Sized>(
    map: &M,
    origin: ElementRef,
    dir: Direction,
    params: &FootpathParams,
) -> Option<Neighbour> {
    let path = *map.path(origin)?;
    let height = path.edge_height(dir)?;
    if fence_blocks(
        map,
        origin.pos,
        dir,
        (path.base_height, path.clearance_height),
    ) {
        return None;
    }

    let Some(next) = map.step(origin.pos, dir) else {
        return params.open_map_edges.then_some(Neighbour {
            direction: dir,
            height,
            order: NeighbourOrder::MapEdge,
            target: NeighbourTarget::MapEdge,
            ride: None,
            station: None,
        });
    };

    let back = dir.opposite();
    map.elements(next)
        .iter()
        .enumerate()
        .find_map(|(index, element)| {
            let at = ElementRef::new(next, index);
            let (order, target, ride, station) = match element {
                TileElement::Entrance(e)
                    if e.base_height == height && entrance_accepts(e, back) =>
                {
                    (
                        NeighbourOrder::Entrance,
                        NeighbourTarget::Entrance(at),
                        e.ride,
                        e.station,
                    )
                }
                TileElement::Track(t) if t.base_height == height && track_accepts(t, back) => {
                    (
                        NeighbourOrder::Track,
                        NeighbourTarget::Track(at),
                        Some(t.ride),
                        None,
                    )
                }
                TileElement::Path(p) if p.edge_height(back) == Some(height) => {
                    let order = if !p.queue {
                        NeighbourOrder::Path
                    } else if p.has_edge(back) || p.edge_count() < MAX_QUEUE_EDGES {
                        NeighbourOrder::QueueWithCapacity
                    } else {
                        NeighbourOrder::QueueNeedingCapacity
                    };
                    (order, NeighbourTarget::Path(at), p.ride, p.station)
                }
                _ => return None,
            };
            Some(Neighbour {
                direction: dir,
                height,
                order,
                target,
                ride,
                station,
            })
        })
}

/// Gathers the neighbours `origin` could connect to, highest priority
/// first with ties broken N, E, S, W.
///
/// A full queue is only offered when one of its other connections can be
/// dropped to make room.
pub fn collect_neighbours<M: TileQuery + ?Sized>(
    map: &M,
    origin: ElementRef,
    mode: CollectMode,
    params: &FootpathParams,
) -> Vec<Neighbour> {
    let Some(origin_is_queue) = map.path(origin).map(|p| p.queue) else {
        return Vec::new();
    };

    let mut found: Vec<Neighbour> = Direction::ALL
        .into_iter()
        .filter_map(|dir| resolve_neighbour(map, origin, dir, params))
        .filter(|n| match (n.order, n.target) {
            (NeighbourOrder::QueueNeedingCapacity, NeighbourTarget::Path(target)) => {
                find_droppable_edge(map, target, n.direction.opposite().bit()).is_some()
            }
            _ => true,
        })
        .collect();

    found.sort_by(|a, b| {
        b.order
            .cmp(&a.order)
            .then_with(|| a.direction.cmp(&b.direction))
    });

    if mode == CollectMode::Commit && origin_is_queue {
        retain_single_ride(&mut found);
        found.truncate(MAX_QUEUE_EDGES as usize);
    }
    found
}

/// Drops candidates belonging to a different ride (or a different station
/// of the same ride) than the first ride-bound candidate.
fn retain_single_ride(found: &mut Vec<Neighbour>) {
    let mut first: Option<(RideId, Option<StationIndex>)> = None;
    found.retain(|n| {
        let Some(ride) = n.ride else {
            return true;
        };
        match first {
            None => {
                first = Some((ride, n.station));
                true
            }
            Some((first_ride, first_station)) => {
                ride == first_ride
                    && match (first_station, n.station) {
                        (Some(a), Some(b)) => a == b,
                        _ => true,
                    }
            }
        }
    });
}

/// Whether anything on `pos` across from a path would still accept the edge
/// `dir` at `height`. Used when rechecking existing connections.
pub fn accepts_connection<M: TileQuery + ?Sized>(
    map: &M,
    pos: TilePos,
    dir: Direction,
    height: u8,
) -> bool {
    let back = dir.opposite();
    map.elements(pos).iter().any(|element| match element {
        TileElement::Path(p) => p.edge_height(back) == Some(height),
        other => other.wants_path_connection(back) == Some(height),
    })
}
