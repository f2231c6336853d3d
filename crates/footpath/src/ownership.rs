//! Land-ownership hook driven by the reachability walk.

use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::grid::TilePos;

/// Receives "this tile carries a public path" notifications.
///
/// Implementations must be idempotent: the same tile can be reported by
/// several walks.
pub trait OwnershipFixer {
    fn fix_ownership(&mut self, pos: TilePos);
}

/// Records tiles whose ownership needs fixing for the land system to
/// consume later.
#[derive(Resource, Default, Debug, Clone)]
pub struct OwnershipFixups {
    tiles: BTreeSet<TilePos>,
}

impl OwnershipFixups {
    pub fn contains(&self, pos: TilePos) -> bool {
        self.tiles.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Hands the pending tiles to the land system, ordered by position.
    pub fn drain(&mut self) -> Vec<TilePos> {
        std::mem::take(&mut self.tiles).into_iter().collect()
    }
}

impl OwnershipFixer for OwnershipFixups {
    fn fix_ownership(&mut self, pos: TilePos) {
        self.tiles.insert(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixups_are_deduplicated() {
        let mut fixups = OwnershipFixups::default();
        fixups.fix_ownership(TilePos::new(2, 1));
        fixups.fix_ownership(TilePos::new(2, 1));
        fixups.fix_ownership(TilePos::new(0, 3));
        assert_eq!(fixups.len(), 2);
        assert!(fixups.contains(TilePos::new(0, 3)));

        let drained = fixups.drain();
        assert_eq!(drained, vec![TilePos::new(0, 3), TilePos::new(2, 1)]);
        assert!(fixups.is_empty());
    }
}
