mod types;
mod walker;

pub use types::{SearchResult, WalkOptions};
pub use walker::{is_reachable_from_map_edge, ReachabilityWalker};
