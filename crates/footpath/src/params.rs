//! Data-driven footpath parameters.
//!
//! The search budgets and queue-chain capacity default to the constants in
//! [`crate::config`] but live in a [`FootpathParams`] resource so scenarios
//! and editor tooling can tune them without recompilation. Overrides persist
//! through the `Saveable` registry.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_JUNCTION_TOLERANCE, DEFAULT_MAX_WALK_STEPS, DEFAULT_QUEUE_CHAIN_CAPACITY,
};

/// Tunables for the footpath graph.
#[derive(
    Resource, Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct FootpathParams {
    /// Junction budget each reachability walk starts with.
    pub junction_tolerance: i32,
    /// Per-branch step ceiling of a reachability walk.
    pub max_walk_steps: u32,
    /// Distinct rides a single edit batch can queue for a rewalk.
    pub queue_chain_capacity: u32,
    /// Editor/sandbox rule: paths may connect off the edge of the map.
    pub open_map_edges: bool,
}

impl Default for FootpathParams {
    fn default() -> Self {
        Self {
            junction_tolerance: DEFAULT_JUNCTION_TOLERANCE,
            max_walk_steps: DEFAULT_MAX_WALK_STEPS,
            queue_chain_capacity: DEFAULT_QUEUE_CHAIN_CAPACITY,
            open_map_edges: false,
        }
    }
}

impl FootpathParams {
    /// Parameters for the scenario editor, where map edges count as open.
    pub fn editor() -> Self {
        Self {
            open_map_edges: true,
            ..Self::default()
        }
    }
}

impl crate::Saveable for FootpathParams {
    const SAVE_KEY: &'static str = "footpath_params";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if *self == Self::default() {
            return None;
        }
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Saveable;

    #[test]
    fn test_defaults_match_constants() {
        let params = FootpathParams::default();
        assert_eq!(params.junction_tolerance, 16);
        assert_eq!(params.max_walk_steps, 250);
        assert_eq!(params.queue_chain_capacity, 64);
        assert!(!params.open_map_edges);
    }

    #[test]
    fn test_default_params_are_not_saved() {
        assert!(FootpathParams::default().save_to_bytes().is_none());
    }

    #[test]
    fn test_saveable_roundtrip_keeps_overrides() {
        let params = FootpathParams {
            junction_tolerance: 4,
            max_walk_steps: 40,
            ..FootpathParams::editor()
        };
        let bytes = params.save_to_bytes().expect("non-default params are saved");
        assert_eq!(FootpathParams::load_from_bytes(&bytes), params);
    }

    #[test]
    fn test_corrupt_bytes_fall_back_to_default() {
        let loaded = FootpathParams::load_from_bytes(&[]);
        assert_eq!(loaded, FootpathParams::default());
    }

    #[test]
    fn test_params_deserialize_from_json() {
        let json = r#"{
            "junction_tolerance": 8,
            "max_walk_steps": 100,
            "queue_chain_capacity": 16,
            "open_map_edges": true
        }"#;
        let params: FootpathParams = serde_json::from_str(json).expect("valid json");
        assert_eq!(params.junction_tolerance, 8);
        assert_eq!(params.max_walk_steps, 100);
        assert_eq!(params.queue_chain_capacity, 16);
        assert!(params.open_map_edges);
    }
}
