use bevy::prelude::*;

use crate::elements::{PathElement, TileElement};
use crate::grid::{directions_in, edge_count, first_direction, Direction, TilePos};
use crate::ownership::OwnershipFixer;
use crate::params::FootpathParams;
use crate::tile_query::TileQuery;

use super::types::{Frame, SearchResult, WalkOptions};

/// Bounded depth-first search for a route from a path to the map edge.
///
/// The search keeps its own stack of [`Frame`]s instead of recursing. Each
/// branch carries its own step count and junction budget, so the walk ends
/// on any input, cyclic graphs included. The walker only reads the map;
/// the one side effect is the optional ownership report.
pub struct ReachabilityWalker<'a, M: TileQuery + ?Sized> {
    map: &'a M,
    options: WalkOptions,
    max_steps: u32,
    junction_tolerance: i32,
    stack: Vec<Frame>,
    branched: bool,
}

impl<'a, M: TileQuery + ?Sized> ReachabilityWalker<'a, M> {
    pub fn new(map: &'a M, params: &FootpathParams, options: WalkOptions) -> Self {
        Self {
            map,
            options,
            max_steps: params.max_walk_steps,
            junction_tolerance: params.junction_tolerance,
            stack: Vec::new(),
            branched: false,
        }
    }

    /// Walks from `pos` across its `direction` edge at `height`.
    pub fn walk(
        &mut self,
        pos: TilePos,
        height: u8,
        direction: Direction,
        fixer: &mut dyn OwnershipFixer,
    ) -> SearchResult {
        self.stack.clear();
        self.branched = false;
        self.stack.push(Frame {
            pos,
            height,
            direction,
            level: 1,
            after_junction: false,
            tolerance: self.junction_tolerance,
        });

        while let Some(frame) = self.stack.pop() {
            match self.advance(frame, fixer) {
                Some(SearchResult::Success) => return SearchResult::Success,
                Some(SearchResult::TooComplex) => {
                    debug!(
                        "Reachability walk from ({}, {}) gave up at ({}, {}) level {}",
                        pos.x, pos.y, frame.pos.x, frame.pos.y, frame.level
                    );
                    return SearchResult::TooComplex;
                }
                // Once the walk has branched a dead end only closes that
                // branch.
                Some(dead_end) if !self.branched => return dead_end,
                _ => {}
            }
        }
        SearchResult::Incomplete
    }

    /// Takes one step. Returns a result when the step ends its branch.
    fn advance(&mut self, frame: Frame, fixer: &mut dyn OwnershipFixer) -> Option<SearchResult> {
        if frame.level > self.max_steps {
            return Some(SearchResult::TooComplex);
        }
        let Some(next) = self.map.step(frame.pos, frame.direction) else {
            return Some(SearchResult::Success);
        };

        let back = frame.direction.opposite();
        let ignore_queues = self.options.ignore_queues;
        let found = self
            .map
            .elements(next)
            .iter()
            .filter_map(TileElement::as_path)
            .find(|p| (!ignore_queues || !p.queue) && p.edge_height(back) == Some(frame.height))
            .copied();
        let Some(path) = found else {
            return Some(if frame.level == 1 {
                SearchResult::NotFound
            } else {
                SearchResult::Incomplete
            });
        };
        if self.options.fix_ownership {
            fixer.fix_ownership(next);
        }

        let mut exits = path.edges & !back.bit();
        if !self.options.ignore_no_entry {
            exits &= !self.no_entry_mask(next, &path);
        }

        match edge_count(exits) {
            0 => Some(SearchResult::Incomplete),
            1 => {
                let direction = first_direction(exits)?;
                self.stack.push(Frame {
                    pos: next,
                    height: path.edge_height(direction)?,
                    direction,
                    level: frame.level + 1,
                    after_junction: false,
                    tolerance: frame.tolerance,
                });
                None
            }
            _ => {
                let cost = if frame.after_junction { 2 } else { 1 };
                let tolerance = frame.tolerance - cost;
                if tolerance < 0 {
                    return Some(SearchResult::TooComplex);
                }
                self.branched = true;
                // Pushed in reverse so the first direction is explored first.
                for direction in directions_in(exits).rev() {
                    if let Some(height) = path.edge_height(direction) {
                        self.stack.push(Frame {
                            pos: next,
                            height,
                            direction,
                            level: frame.level + 1,
                            after_junction: true,
                            tolerance,
                        });
                    }
                }
                None
            }
        }
    }

    /// Edges of the path on `pos` closed by a no-entry banner.
    fn no_entry_mask(&self, pos: TilePos, path: &PathElement) -> u8 {
        self.map
            .elements(pos)
            .iter()
            .filter_map(TileElement::as_banner)
            .filter(|b| {
                b.no_entry
                    && b.base_height >= path.base_height
                    && b.base_height < path.clearance_height
            })
            .fold(0, |mask, b| mask | b.direction.bit())
    }
}

/// Checks whether the path at `pos` reaches the map edge through its
/// `direction` edge at `height`.
pub fn is_reachable_from_map_edge<M: TileQuery + ?Sized>(
    map: &M,
    pos: TilePos,
    height: u8,
    direction: Direction,
    options: WalkOptions,
    params: &FootpathParams,
    fixer: &mut dyn OwnershipFixer,
) -> SearchResult {
    ReachabilityWalker::new(map, params, options).walk(pos, height, direction, fixer)
}
