//! Plaza ("wide") flags derived from corner bits.

use crate::grid::{Direction, TilePos};
use crate::tile_query::TileQuery;

/// Recomputes the wide flag of every path in the 3x3 block centred on
/// `center`. Returns how many flags changed.
///
/// A flat, non-queue path is wide when it belongs to at least one complete
/// 2x2 block, which its corner bits record.
pub fn recompute_wide_flags<M: TileQuery + ?Sized>(map: &mut M, center: TilePos) -> u32 {
    let mut changed = 0;
    for pos in neighbourhood(map, center) {
        for element in map.elements_mut(pos) {
            let Some(path) = element.as_path_mut() else {
                continue;
            };
            let wide = !path.sloped && !path.queue && path.corners & 0x0F != 0;
            if path.wide != wide {
                path.wide = wide;
                changed += 1;
            }
        }
    }
    changed
}

fn neighbourhood<M: TileQuery + ?Sized>(map: &M, center: TilePos) -> Vec<TilePos> {
    let mut tiles = Vec::with_capacity(9);
    let rows = [
        map.step(center, Direction::North),
        Some(center),
        map.step(center, Direction::South),
    ];
    for row in rows.into_iter().flatten() {
        tiles.extend(map.step(row, Direction::West));
        tiles.push(row);
        tiles.extend(map.step(row, Direction::East));
    }
    tiles.retain(|pos| map.contains(*pos));
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_tile;
    use crate::elements::{PathElement, TileElement};
    use crate::grid::TileMap;
    use crate::params::FootpathParams;
    use crate::queue_chain::QueueChainTracker;

    #[test]
    fn test_square_becomes_wide() {
        let mut map = TileMap::new(6);
        let mut tracker = QueueChainTracker::default();
        let params = FootpathParams::default();
        let mut placed = Vec::new();
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            placed.push(
                map.insert(TilePos::new(x, y), TileElement::Path(PathElement::flat(2)))
                    .unwrap(),
            );
        }
        let tail = map
            .insert(TilePos::new(3, 2), TileElement::Path(PathElement::flat(2)))
            .unwrap();
        placed.push(tail);
        for element in &placed {
            connect_tile(&mut map, &mut tracker, &params, *element);
        }

        assert_eq!(recompute_wide_flags(&mut map, TilePos::new(2, 2)), 4);
        assert!(map.path(placed[0]).unwrap().wide);
        assert!(!map.path(tail).unwrap().wide);
        // nothing left to change
        assert_eq!(recompute_wide_flags(&mut map, TilePos::new(2, 2)), 0);
    }

    #[test]
    fn test_corner_tile_neighbourhood_is_clipped() {
        let map = TileMap::new(4);
        let tiles = neighbourhood(&map, TilePos::new(0, 0));
        assert_eq!(
            tiles,
            vec![
                TilePos::new(0, 0),
                TilePos::new(1, 0),
                TilePos::new(0, 1),
                TilePos::new(1, 1)
            ]
        );
    }
}
