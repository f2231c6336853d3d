//! Ride queue lines: the batch-scoped list of rides awaiting a rewalk, and
//! the walk that stamps ride/station ownership and places the banner.

mod tracker;
mod walk;

pub use tracker::QueueChainTracker;
pub use walk::{flush_queue_rewalk, QueueWalkSummary};
