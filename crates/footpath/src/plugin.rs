//! Bevy wiring for the footpath graph.
//!
//! Tools and rides never call the editor directly; they send
//! [`FootpathEditEvent`]s. All events read in one frame form one edit batch,
//! so the queue-line rewalk runs once per frame at most.
//!
//! ```text
//! Edit  →  Query  →  Validate
//! ```
//!
//! * **Edit** – applies the frame's edit batch, removing elements that were
//!   disconnected for removal.
//! * **Query** – answers map-edge reachability requests against the
//!   post-edit graph.
//! * **Validate** – re-checks graph invariants when the map changed.

use bevy::prelude::*;

use crate::batch::FootpathEdit;
use crate::grid::{Direction, TileMap, TilePos};
use crate::invariants::{validate_footpath_graph, FootpathInvariantReport};
use crate::ownership::OwnershipFixups;
use crate::params::FootpathParams;
use crate::queue_chain::{QueueChainTracker, QueueWalkSummary};
use crate::reachability::{is_reachable_from_map_edge, SearchResult, WalkOptions};
use crate::rides::{RideId, RideRegistry};
use crate::tile_query::ElementRef;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootpathEditEvent {
    /// A path, track piece or entrance was placed.
    Connect(ElementRef),
    /// Unwire an element. With `remove`, it is deleted from the map right
    /// after.
    Disconnect { element: ElementRef, remove: bool },
    /// Something next to the element changed; drop edges nothing accepts.
    Recheck(ElementRef),
    RecomputeWide(TilePos),
    RewalkRide(RideId),
}

/// Ask whether the path at `pos` reaches the map edge across `direction`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEdgeCheckRequest {
    pub pos: TilePos,
    pub height: u8,
    pub direction: Direction,
    pub options: WalkOptions,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEdgeCheckResult {
    pub request: MapEdgeCheckRequest,
    pub result: SearchResult,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Running totals of applied edit batches.
#[derive(Resource, Default, Debug)]
pub struct FootpathEditLog {
    pub batches: u64,
    pub edits: u64,
    pub removed: u64,
    pub last_summary: QueueWalkSummary,
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FootpathSet {
    Edit,
    Query,
    Validate,
}

/// Applies every edit event of this frame as one batch.
///
/// Elements disconnected with `remove` leave the map straight away, so no
/// later edit in the batch can link to them. Handles in the events still to
/// run are shifted down to match.
pub fn apply_footpath_edits(
    mut events: EventReader<FootpathEditEvent>,
    mut map: ResMut<TileMap>,
    mut tracker: ResMut<QueueChainTracker>,
    params: Res<FootpathParams>,
    rides: Res<RideRegistry>,
    mut log: ResMut<FootpathEditLog>,
) {
    if events.is_empty() {
        return;
    }

    let mut pending: Vec<Option<FootpathEditEvent>> = events.read().copied().map(Some).collect();
    let mut removed = 0u64;
    let mut batch = FootpathEdit::begin(&mut *map, &mut *tracker, &*params);
    for i in 0..pending.len() {
        let Some(event) = pending[i] else {
            continue;
        };
        match event {
            FootpathEditEvent::Connect(element) => batch.connect_tile(element),
            FootpathEditEvent::Disconnect { element, remove } => {
                batch.disconnect_tile(element);
                if remove {
                    if batch.map_mut().remove(element).is_some() {
                        removed += 1;
                        shift_after_removal(&mut pending[i + 1..], element);
                    } else {
                        warn!(
                            "Footpath edit: no element to remove at ({}, {}) index {}",
                            element.pos.x, element.pos.y, element.index
                        );
                    }
                }
            }
            FootpathEditEvent::Recheck(element) => {
                batch.prune_stale_edges(element);
            }
            FootpathEditEvent::RecomputeWide(center) => {
                batch.recompute_wide_flags(center);
            }
            FootpathEditEvent::RewalkRide(ride) => {
                batch.push_queue_ride_for_rewalk(ride);
            }
        }
    }
    let summary = batch.finish(&*rides);

    log.batches += 1;
    log.edits += pending.len() as u64;
    log.removed += removed;
    log.last_summary = summary;
}

/// Re-targets handles on the tile of `removed` after its stack shrank.
/// Events aimed at the removed element itself are dropped.
fn shift_after_removal(events: &mut [Option<FootpathEditEvent>], removed: ElementRef) {
    for slot in events.iter_mut() {
        let Some(event) = slot.as_mut() else {
            continue;
        };
        let element = match event {
            FootpathEditEvent::Connect(element)
            | FootpathEditEvent::Disconnect { element, .. }
            | FootpathEditEvent::Recheck(element) => element,
            FootpathEditEvent::RecomputeWide(_) | FootpathEditEvent::RewalkRide(_) => continue,
        };
        if element.pos != removed.pos || element.index < removed.index {
            continue;
        }
        if element.index == removed.index {
            *slot = None;
        } else {
            element.index -= 1;
        }
    }
}

/// Answers map-edge reachability requests.
pub fn answer_map_edge_checks(
    mut requests: EventReader<MapEdgeCheckRequest>,
    mut results: EventWriter<MapEdgeCheckResult>,
    map: Res<TileMap>,
    params: Res<FootpathParams>,
    mut fixups: ResMut<OwnershipFixups>,
) {
    for request in requests.read() {
        let result = is_reachable_from_map_edge(
            &*map,
            request.pos,
            request.height,
            request.direction,
            request.options,
            &params,
            &mut *fixups,
        );
        results.send(MapEdgeCheckResult {
            request: *request,
            result,
        });
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct FootpathPlugin;

impl Plugin for FootpathPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileMap>()
            .init_resource::<RideRegistry>()
            .init_resource::<OwnershipFixups>()
            .init_resource::<QueueChainTracker>()
            .init_resource::<FootpathParams>()
            .init_resource::<FootpathEditLog>()
            .init_resource::<FootpathInvariantReport>()
            .add_event::<FootpathEditEvent>()
            .add_event::<MapEdgeCheckRequest>()
            .add_event::<MapEdgeCheckResult>()
            .configure_sets(
                Update,
                (FootpathSet::Edit, FootpathSet::Query, FootpathSet::Validate).chain(),
            )
            .add_systems(
                Update,
                (
                    apply_footpath_edits.in_set(FootpathSet::Edit),
                    answer_map_edge_checks.in_set(FootpathSet::Query),
                    validate_footpath_graph
                        .run_if(resource_changed::<TileMap>)
                        .in_set(FootpathSet::Validate),
                ),
            );

        // Register for save/load via the SaveableRegistry.
        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<FootpathParams>();
    }
}
