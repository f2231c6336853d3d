//! Edge and corner bookkeeping: wiring path segments to their neighbours and
//! unwiring them again.

mod corners;
mod editor;
mod rebalance;
#[cfg(test)]
mod tests;

pub use corners::{connect_corners, refresh_corner, refresh_edge_corners};
pub use editor::{
    connect_tile, disconnect_edge, disconnect_tile, linked_path_across, prune_stale_edges,
    CornerFixup,
};
pub use rebalance::{find_droppable_edge, queue_capacity_rebalance, CapacityChange, Rebalance};
