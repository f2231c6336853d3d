use bevy::prelude::*;

use crate::config::DEFAULT_QUEUE_CHAIN_CAPACITY;
use crate::rides::RideId;

/// Rides whose queue lines must be re-walked once the current edit batch
/// ends.
///
/// The list is bounded. Once `capacity` distinct rides are pending, pushes
/// for further rides are dropped for the rest of the batch; rides already
/// pending are unaffected.
#[derive(Resource, Debug, Clone)]
pub struct QueueChainTracker {
    pending: Vec<RideId>,
    capacity: usize,
    dropped: u32,
}

impl Default for QueueChainTracker {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CHAIN_CAPACITY)
    }
}

impl QueueChainTracker {
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            pending: Vec::with_capacity(capacity as usize),
            capacity: capacity as usize,
            dropped: 0,
        }
    }

    /// Starts a new batch: forgets pending rides and applies `capacity`.
    pub fn begin_batch(&mut self, capacity: u32) {
        self.pending.clear();
        self.capacity = capacity as usize;
        self.dropped = 0;
    }

    /// Queues `ride` for a rewalk. Returns `false` when the ride had to be
    /// dropped because the batch is full.
    pub fn push(&mut self, ride: RideId) -> bool {
        if self.pending.contains(&ride) {
            return true;
        }
        if self.pending.len() >= self.capacity {
            if self.dropped == 0 {
                warn!(
                    "Queue chain tracker full ({} rides), dropping rewalk of ride {}",
                    self.capacity, ride.0
                );
            } else {
                debug!("Queue chain tracker full, dropping ride {}", ride.0);
            }
            self.dropped += 1;
            return false;
        }
        self.pending.push(ride);
        true
    }

    pub fn pending(&self) -> &[RideId] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pushes refused since the batch began.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Takes the pending rides in push order, leaving the list empty.
    pub fn drain(&mut self) -> Vec<RideId> {
        std::mem::take(&mut self.pending)
    }
}
