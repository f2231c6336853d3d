/// Largest supported map dimension, in tiles per axis.
pub const MAX_MAP_SIZE: u16 = 255;
/// Map size used by `TileMap::default()` and the test harness.
pub const DEFAULT_MAP_SIZE: u8 = 64;

/// Height difference between the low and high end of a sloped path.
pub const SLOPE_RISE: u8 = 2;
/// Vertical clearance reserved above a path's base height.
pub const PATH_CLEARANCE: u8 = 4;

/// A queue segment may bridge at most this many neighbours.
pub const MAX_QUEUE_EDGES: u32 = 2;

/// Junction budget a reachability walk starts with.
pub const DEFAULT_JUNCTION_TOLERANCE: i32 = 16;
/// Hard per-branch step ceiling of a reachability walk.
pub const DEFAULT_MAX_WALK_STEPS: u32 = 250;

/// Distinct rides one edit batch can queue for a queue-line rewalk.
pub const DEFAULT_QUEUE_CHAIN_CAPACITY: u32 = 64;
