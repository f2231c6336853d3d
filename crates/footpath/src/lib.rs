//! Footpath connectivity for a tile-based park world.
//!
//! Path segments live in per-tile element stacks next to ride track,
//! entrances, walls and banners. This crate keeps their edge and corner
//! bits consistent as things are built and demolished, balances the two
//! connections a queue segment may hold, stamps queue lines with their ride,
//! and answers "does this path reach the map edge?".

use bevy::prelude::*;
use std::collections::BTreeMap;

pub mod batch;
pub mod config;
pub mod connection;
pub mod elements;
pub mod grid;
pub mod invariants;
pub mod legality;
pub mod neighbours;
pub mod ownership;
pub mod params;
pub mod plugin;
pub mod queue_chain;
pub mod reachability;
pub mod rides;
pub mod tile_query;
pub mod wide;

#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

pub use batch::FootpathEdit;
pub use elements::{PathElement, TileElement};
pub use grid::{Corner, Direction, TileMap, TilePos};
pub use params::FootpathParams;
pub use plugin::{
    FootpathEditEvent, FootpathEditLog, FootpathPlugin, FootpathSet, MapEdgeCheckRequest,
    MapEdgeCheckResult,
};
pub use reachability::{SearchResult, WalkOptions};
pub use rides::{RideId, StationIndex};
pub use tile_query::{ElementRef, TileQuery};

// ---------------------------------------------------------------------------
// Saveable resources
// ---------------------------------------------------------------------------

/// A resource persisted as one keyed blob in the host's save file.
///
/// The host's save system owns the file format; it asks
/// [`SaveableRegistry`] for the blobs and hands them back on load.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Key in the save file's extension map. Never change it once shipped.
    const SAVE_KEY: &'static str;

    /// `None` skips the entry, e.g. while the resource is at its default.
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// `bitcode::decode`, falling back to `Default` with a warning.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    match bitcode::decode(bytes) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                "Saveable {}: failed to decode {} bytes, falling back to default: {}",
                key,
                bytes.len(),
                e
            );
            T::default()
        }
    }
}

type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;

struct SaveableEntry {
    key: &'static str,
    save: SaveFn,
    load: LoadFn,
}

/// Footpath resources the host should persist, keyed by `SAVE_KEY`.
#[derive(Resource, Default)]
pub struct SaveableRegistry {
    entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Panics in debug builds when `T::SAVE_KEY` is already taken.
    pub fn register<T: Saveable>(&mut self) {
        if self.contains(T::SAVE_KEY) {
            warn!(
                "SaveableRegistry: duplicate key '{}', ignoring second registration",
                T::SAVE_KEY
            );
            debug_assert!(false, "SaveableRegistry: duplicate key '{}'", T::SAVE_KEY);
            return;
        }
        self.entries.push(SaveableEntry {
            key: T::SAVE_KEY,
            save: Box::new(|world: &World| {
                world.get_resource::<T>().and_then(|r| r.save_to_bytes())
            }),
            load: Box::new(|world: &mut World, bytes: &[u8]| {
                world.insert_resource(T::load_from_bytes(bytes));
            }),
        });
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.key)
    }

    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        self.entries
            .iter()
            .filter_map(|entry| Some((entry.key.to_string(), (entry.save)(world)?)))
            .collect()
    }

    /// Resources whose key is absent keep their current value.
    pub fn load_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            if let Some(bytes) = extensions.get(entry.key) {
                (entry.load)(world, bytes);
            }
        }
    }
}
