//! One edit batch over the footpath graph.
//!
//! A tool action that touches many tiles opens a [`FootpathEdit`], applies
//! its connects and disconnects, then calls [`FootpathEdit::finish`]. The
//! queue-line rewalk runs once there, not once per tile, and before anything
//! else reads the banner fields.

use bevy::prelude::*;

use crate::connection::{
    connect_corners, connect_tile, disconnect_tile, prune_stale_edges, CornerFixup,
};
use crate::grid::TilePos;
use crate::params::FootpathParams;
use crate::queue_chain::{flush_queue_rewalk, QueueChainTracker, QueueWalkSummary};
use crate::rides::{RideId, RideQuery};
use crate::tile_query::{ElementRef, TileQuery};
use crate::wide;

pub struct FootpathEdit<'a, M: TileQuery + ?Sized> {
    map: &'a mut M,
    tracker: &'a mut QueueChainTracker,
    params: &'a FootpathParams,
    corner_fixups: Vec<CornerFixup>,
}

impl<'a, M: TileQuery + ?Sized> FootpathEdit<'a, M> {
    /// Opens a batch. Rides left pending by an earlier, unfinished batch
    /// are discarded.
    pub fn begin(
        map: &'a mut M,
        tracker: &'a mut QueueChainTracker,
        params: &'a FootpathParams,
    ) -> Self {
        tracker.begin_batch(params.queue_chain_capacity);
        Self {
            map,
            tracker,
            params,
            corner_fixups: Vec::new(),
        }
    }

    pub fn connect_tile(&mut self, element: ElementRef) {
        connect_tile(self.map, self.tracker, self.params, element);
    }

    /// Unwires `element` ahead of its removal. The caller removes the
    /// element from storage afterwards.
    pub fn disconnect_tile(&mut self, element: ElementRef) {
        disconnect_tile(
            self.map,
            self.tracker,
            self.params,
            element,
            &mut self.corner_fixups,
        );
    }

    /// Drops the edges of `element` that nothing accepts any more.
    pub fn prune_stale_edges(&mut self, element: ElementRef) -> u8 {
        prune_stale_edges(
            self.map,
            self.tracker,
            self.params,
            element,
            &mut self.corner_fixups,
        )
    }

    pub fn push_queue_ride_for_rewalk(&mut self, ride: RideId) -> bool {
        self.tracker.push(ride)
    }

    pub fn recompute_wide_flags(&mut self, center: TilePos) -> u32 {
        wide::recompute_wide_flags(self.map, center)
    }

    pub fn map(&self) -> &M {
        &*self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut *self.map
    }

    /// Closes the batch: rewalks every pending queue line once, then
    /// recomputes the corners of paths flagged while disconnecting.
    pub fn finish<R: RideQuery + ?Sized>(mut self, rides: &R) -> QueueWalkSummary {
        let summary = flush_queue_rewalk(self.map, self.tracker, rides);

        self.corner_fixups.sort_unstable();
        self.corner_fixups.dedup();
        for fixup in &self.corner_fixups {
            if let Some(path) = self.map.find_path_at(fixup.pos, fixup.height) {
                connect_corners(self.map, path);
            }
        }
        if summary.rides_walked > 0 {
            debug!(
                "Footpath batch finished: {} rides rewalked, {} corner fixups",
                summary.rides_walked,
                self.corner_fixups.len()
            );
        }
        summary
    }
}
