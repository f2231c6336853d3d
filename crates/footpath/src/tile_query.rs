//! Read/write access to per-tile element stacks.
//!
//! The graph code never holds a reference into the map across an edit; it
//! keeps [`ElementRef`] handles and re-borrows through [`TileQuery`].

use crate::elements::{PathElement, TileElement};
use crate::grid::{Direction, TilePos};

/// Stable handle to one element: its tile plus its index in that tile's
/// stack. Removing an element lower in the same stack invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef {
    pub pos: TilePos,
    pub index: usize,
}

impl ElementRef {
    pub const fn new(pos: TilePos, index: usize) -> Self {
        Self { pos, index }
    }
}

/// Tile storage as seen by the footpath graph.
pub trait TileQuery {
    fn map_size(&self) -> u8;

    /// Elements on `pos` in stack order; empty outside the map.
    fn elements(&self, pos: TilePos) -> &[TileElement];

    fn elements_mut(&mut self, pos: TilePos) -> &mut [TileElement];

    fn contains(&self, pos: TilePos) -> bool {
        let size = self.map_size();
        pos.x < size && pos.y < size
    }

    fn step(&self, pos: TilePos, dir: Direction) -> Option<TilePos> {
        pos.step(dir, self.map_size())
    }

    fn element(&self, element: ElementRef) -> Option<&TileElement> {
        self.elements(element.pos).get(element.index)
    }

    fn path(&self, element: ElementRef) -> Option<&PathElement> {
        self.element(element).and_then(TileElement::as_path)
    }

    fn path_mut(&mut self, element: ElementRef) -> Option<&mut PathElement> {
        self.elements_mut(element.pos)
            .get_mut(element.index)
            .and_then(TileElement::as_path_mut)
    }

    /// First path on `pos` that meets its neighbour across `dir` at
    /// `height`.
    fn find_path_by_edge(&self, pos: TilePos, dir: Direction, height: u8) -> Option<ElementRef> {
        self.elements(pos)
            .iter()
            .position(|e| {
                e.as_path()
                    .is_some_and(|p| p.edge_height(dir) == Some(height))
            })
            .map(|index| ElementRef::new(pos, index))
    }

    /// First path on `pos` whose base sits at `base_height`.
    fn find_path_at(&self, pos: TilePos, base_height: u8) -> Option<ElementRef> {
        self.elements(pos)
            .iter()
            .position(|e| e.as_path().is_some_and(|p| p.base_height == base_height))
            .map(|index| ElementRef::new(pos, index))
    }
}
