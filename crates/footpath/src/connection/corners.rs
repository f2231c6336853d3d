use crate::grid::{Corner, Direction, TilePos};
use crate::tile_query::{ElementRef, TileQuery};

/// Recomputes all four corner bits of `origin` and of the tiles sharing
/// each 2x2 block with it.
pub fn connect_corners<M: TileQuery + ?Sized>(map: &mut M, origin: ElementRef) {
    for corner in Corner::ALL {
        refresh_corner(map, origin, corner);
    }
}

/// Recomputes the two blocks that contain the edge `dir` of `origin`.
pub fn refresh_edge_corners<M: TileQuery + ?Sized>(
    map: &mut M,
    origin: ElementRef,
    dir: Direction,
) {
    refresh_corner(map, origin, Corner::from_index(dir.index()));
    refresh_corner(map, origin, Corner::from_index(dir.index().wrapping_add(3)));
}

/// Fills or clears the corner bits of the 2x2 block in quadrant `corner`
/// of `origin`.
///
/// The block is complete when all four tiles hold a flat path at the same
/// height and every one of them links to both of its block neighbours.
/// The bits are written on every member that exists, so a broken block
/// loses its bits everywhere.
pub fn refresh_corner<M: TileQuery + ?Sized>(map: &mut M, origin: ElementRef, corner: Corner) {
    let Some(path) = map.path(origin).copied() else {
        return;
    };
    let (d1, d2) = corner.sides();
    let height = path.base_height;

    let view: &M = map;
    let a = view
        .step(origin.pos, d1)
        .and_then(|pos| flat_path_at(view, pos, height));
    let b = view
        .step(origin.pos, d2)
        .and_then(|pos| flat_path_at(view, pos, height));
    let d = view
        .step(origin.pos, d1)
        .and_then(|pos| view.step(pos, d2))
        .and_then(|pos| flat_path_at(view, pos, height));

    let links = |element: Option<ElementRef>, x: Direction, y: Direction| {
        element
            .and_then(|e| view.path(e))
            .is_some_and(|p| p.has_edge(x) && p.has_edge(y))
    };
    let complete = !path.sloped
        && links(Some(origin), d1, d2)
        && links(a, d2, d1.opposite())
        && links(b, d1, d2.opposite())
        && links(d, d1.opposite(), d2.opposite());

    let members = [
        (Some(origin), corner),
        (a, corner.rotate_cw(1)),
        (d, corner.rotate_cw(2)),
        (b, corner.rotate_cw(3)),
    ];
    for (member, bit) in members {
        if let Some(p) = member.and_then(|m| map.path_mut(m)) {
            p.set_corner(bit, complete && !p.sloped);
        }
    }
}

fn flat_path_at<M: TileQuery + ?Sized>(map: &M, pos: TilePos, height: u8) -> Option<ElementRef> {
    map.elements(pos)
        .iter()
        .position(|e| {
            e.as_path()
                .is_some_and(|p| !p.sloped && p.base_height == height)
        })
        .map(|index| ElementRef::new(pos, index))
}
