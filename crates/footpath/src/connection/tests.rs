#[cfg(test)]
mod tests {
    use crate::connection::{
        connect_tile, disconnect_tile, prune_stale_edges, queue_capacity_rebalance,
        CapacityChange, CornerFixup, Rebalance,
    };
    use crate::elements::{EntranceElement, PathElement, TileElement, WallElement};
    use crate::grid::{Corner, Direction, TileMap, TilePos};
    use crate::params::FootpathParams;
    use crate::queue_chain::QueueChainTracker;
    use crate::rides::{RideId, StationIndex};
    use crate::tile_query::{ElementRef, TileQuery};

    fn place(map: &mut TileMap, x: u8, y: u8, path: PathElement) -> ElementRef {
        map.insert(TilePos::new(x, y), TileElement::Path(path))
            .unwrap()
    }

    fn path(map: &TileMap, element: ElementRef) -> PathElement {
        *map.path(element).unwrap()
    }

    fn connect_all(map: &mut TileMap, tracker: &mut QueueChainTracker, elements: &[ElementRef]) {
        let params = FootpathParams::default();
        for &element in elements {
            connect_tile(map, tracker, &params, element);
        }
    }

    #[test]
    fn test_straight_corridor() {
        let mut map = TileMap::new(8);
        let mut tracker = QueueChainTracker::default();
        let row: Vec<ElementRef> = (0..3)
            .map(|x| place(&mut map, x, 0, PathElement::flat(2)))
            .collect();
        connect_all(&mut map, &mut tracker, &row);

        let middle = path(&map, row[1]);
        assert_eq!(middle.edges, Direction::East.bit() | Direction::West.bit());
        assert_eq!(middle.corners, 0);
        assert_eq!(path(&map, row[0]).edges, Direction::East.bit());
        assert_eq!(path(&map, row[2]).edges, Direction::West.bit());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_square_fills_corners_and_removal_clears_them() {
        let mut map = TileMap::new(6);
        let mut tracker = QueueChainTracker::default();
        let nw = place(&mut map, 1, 1, PathElement::flat(2));
        let ne = place(&mut map, 2, 1, PathElement::flat(2));
        let sw = place(&mut map, 1, 2, PathElement::flat(2));
        let se = place(&mut map, 2, 2, PathElement::flat(2));
        connect_all(&mut map, &mut tracker, &[nw, ne, sw, se]);

        assert_eq!(path(&map, nw).corners, Corner::SouthEast.bit());
        assert_eq!(path(&map, ne).corners, Corner::SouthWest.bit());
        assert_eq!(path(&map, se).corners, Corner::NorthWest.bit());
        assert_eq!(path(&map, sw).corners, Corner::NorthEast.bit());
        assert!(!path(&map, nw).has_corner(Corner::NorthWest));

        let mut fixups = Vec::new();
        disconnect_tile(
            &mut map,
            &mut tracker,
            &FootpathParams::default(),
            se,
            &mut fixups,
        );
        for element in [nw, ne, sw, se] {
            assert_eq!(path(&map, element).corners, 0);
        }
        assert_eq!(path(&map, ne).edges, Direction::West.bit());
        assert_eq!(path(&map, sw).edges, Direction::North.bit());
        assert_eq!(path(&map, se).edges, 0);
        assert_eq!(
            fixups,
            vec![
                CornerFixup {
                    pos: TilePos::new(2, 1),
                    height: 2
                },
                CornerFixup {
                    pos: TilePos::new(1, 2),
                    height: 2
                },
            ]
        );
    }

    #[test]
    fn test_connect_twice_changes_nothing() {
        let mut map = TileMap::new(6);
        let mut tracker = QueueChainTracker::default();
        let mut placed = Vec::new();
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2), (3, 2)] {
            placed.push(place(&mut map, x, y, PathElement::flat(2)));
        }
        connect_all(&mut map, &mut tracker, &placed);
        let before = map.clone();
        connect_all(&mut map, &mut tracker, &placed);
        assert_eq!(map, before);
    }

    #[test]
    fn test_sloped_path_never_gets_corners() {
        let mut map = TileMap::new(6);
        let mut tracker = QueueChainTracker::default();
        let nw = place(&mut map, 1, 1, PathElement::flat(2));
        let ne = place(&mut map, 2, 1, PathElement::flat(2));
        let sw = place(&mut map, 1, 2, PathElement::flat(2));
        // rises to the east, so its west edge meets the square at height 2
        let se = place(&mut map, 2, 2, PathElement::sloped(2, Direction::East));
        connect_all(&mut map, &mut tracker, &[nw, ne, sw, se]);

        assert_eq!(path(&map, se).corners, 0);
        assert_eq!(path(&map, se).edges, Direction::West.bit());
        assert_eq!(path(&map, nw).corners, 0);
    }

    #[test]
    fn test_wall_prevents_connection() {
        let mut map = TileMap::new(4);
        let mut tracker = QueueChainTracker::default();
        let a = place(&mut map, 1, 1, PathElement::flat(2));
        let b = place(&mut map, 2, 1, PathElement::flat(2));
        map.insert(
            TilePos::new(1, 1),
            TileElement::Wall(WallElement {
                base_height: 2,
                clearance_height: 4,
                direction: Direction::East,
            }),
        )
        .unwrap();
        connect_all(&mut map, &mut tracker, &[a, b]);
        assert_eq!(path(&map, a).edges, 0);
        assert_eq!(path(&map, b).edges, 0);
    }

    #[test]
    fn test_third_connection_to_full_queue_frees_a_plain_link() {
        let mut map = TileMap::new(6);
        let mut tracker = QueueChainTracker::default();
        let queue = place(&mut map, 2, 2, PathElement::queue(2));
        let north = place(&mut map, 2, 1, PathElement::flat(2));
        let east = place(&mut map, 3, 2, PathElement::flat(2));
        connect_all(&mut map, &mut tracker, &[queue, north, east]);
        assert_eq!(
            path(&map, queue).edges,
            Direction::North.bit() | Direction::East.bit()
        );

        let south = place(&mut map, 2, 3, PathElement::flat(2));
        connect_all(&mut map, &mut tracker, &[south]);

        let q = path(&map, queue);
        assert!(q.edge_count() <= 2);
        // north is the preferred link, so east gives way
        assert_eq!(q.edges, Direction::North.bit() | Direction::South.bit());
        assert_eq!(path(&map, east).edges, 0);
        assert_eq!(path(&map, south).edges, Direction::North.bit());
    }

    #[test]
    fn test_full_queue_gives_up_preferred_link_last() {
        let mut map = TileMap::new(6);
        let mut tracker = QueueChainTracker::default();
        let mut preferring_east = PathElement::queue(2);
        preferring_east.slope_direction = Direction::East;
        let queue = place(&mut map, 2, 2, preferring_east);
        let north = place(&mut map, 2, 1, PathElement::flat(2));
        let east = place(&mut map, 3, 2, PathElement::flat(2));
        connect_all(&mut map, &mut tracker, &[queue, north, east]);

        let south = place(&mut map, 2, 3, PathElement::flat(2));
        connect_all(&mut map, &mut tracker, &[south]);

        assert_eq!(
            path(&map, queue).edges,
            Direction::East.bit() | Direction::South.bit()
        );
        assert_eq!(path(&map, north).edges, 0);
        assert_eq!(path(&map, east).edges, Direction::West.bit());
    }

    #[test]
    fn test_removing_last_link_reroutes_to_preferred_side() {
        let mut map = TileMap::new(6);
        let mut tracker = QueueChainTracker::default();
        let params = FootpathParams::default();
        let mut preferring_west = PathElement::queue(2);
        preferring_west.slope_direction = Direction::West;
        let queue = place(&mut map, 2, 2, preferring_west);
        let north = place(&mut map, 2, 1, PathElement::flat(2));
        connect_all(&mut map, &mut tracker, &[queue]);
        let east = place(&mut map, 3, 2, PathElement::flat(2));
        let west = place(&mut map, 1, 2, PathElement::flat(2));

        let mut fixups = Vec::new();
        disconnect_tile(&mut map, &mut tracker, &params, north, &mut fixups);

        assert_eq!(path(&map, queue).edges, Direction::West.bit());
        assert_eq!(path(&map, west).edges, Direction::East.bit());
        assert_eq!(path(&map, east).edges, 0);
    }

    #[test]
    fn test_full_queue_between_queues_rejects_third_link() {
        let mut map = TileMap::new(6);
        let mut tracker = QueueChainTracker::default();
        let queue = place(&mut map, 2, 2, PathElement::queue(2));
        let north = place(&mut map, 2, 1, PathElement::queue(2));
        let east = place(&mut map, 3, 2, PathElement::queue(2));
        connect_all(&mut map, &mut tracker, &[queue, north, east]);

        let south = place(&mut map, 2, 3, PathElement::flat(2));
        connect_all(&mut map, &mut tracker, &[south]);

        assert_eq!(
            path(&map, queue).edges,
            Direction::North.bit() | Direction::East.bit()
        );
        assert_eq!(path(&map, south).edges, 0);
    }

    #[test]
    fn test_queue_origin_links_at_most_two() {
        let mut map = TileMap::new(6);
        let mut tracker = QueueChainTracker::default();
        let mut around = Vec::new();
        for (x, y) in [(2, 1), (3, 2), (2, 3), (1, 2)] {
            around.push(place(&mut map, x, y, PathElement::flat(2)));
        }
        let queue = place(&mut map, 2, 2, PathElement::queue(2));
        connect_all(&mut map, &mut tracker, &[queue]);

        assert_eq!(
            path(&map, queue).edges,
            Direction::North.bit() | Direction::East.bit()
        );
        assert_eq!(path(&map, around[2]).edges, 0);
    }

    #[test]
    fn test_removing_last_link_reroutes_queue() {
        let mut map = TileMap::new(6);
        let mut tracker = QueueChainTracker::default();
        let params = FootpathParams::default();
        let queue = place(&mut map, 2, 2, PathElement::queue(2));
        let north = place(&mut map, 2, 1, PathElement::flat(2));
        connect_all(&mut map, &mut tracker, &[queue]);
        let east = place(&mut map, 3, 2, PathElement::flat(2));

        let mut fixups = Vec::new();
        disconnect_tile(&mut map, &mut tracker, &params, north, &mut fixups);

        assert_eq!(path(&map, queue).edges, Direction::East.bit());
        assert_eq!(path(&map, east).edges, Direction::West.bit());
    }

    #[test]
    fn test_rebalance_not_needed_below_capacity() {
        let mut map = TileMap::new(4);
        let mut tracker = QueueChainTracker::default();
        let queue = place(&mut map, 1, 1, PathElement::queue(2));
        let outcome = queue_capacity_rebalance(
            &mut map,
            &mut tracker,
            &FootpathParams::default(),
            queue,
            CapacityChange::Adding,
            0,
        );
        assert_eq!(outcome, Rebalance::NotNeeded);
    }

    #[test]
    fn test_entrance_wires_facing_path_and_queues_ride() {
        let mut map = TileMap::new(6);
        let mut tracker = QueueChainTracker::default();
        let ride = RideId(4);
        let queue = place(&mut map, 2, 1, PathElement::queue(2));
        let entrance = map
            .insert(
                TilePos::new(2, 2),
                TileElement::Entrance(EntranceElement::ride_entrance(
                    ride,
                    StationIndex(0),
                    2,
                    Direction::North,
                )),
            )
            .unwrap();
        connect_all(&mut map, &mut tracker, &[entrance]);

        assert_eq!(path(&map, queue).edges, Direction::South.bit());
        assert_eq!(tracker.pending(), &[ride]);
    }

    #[test]
    fn test_prune_clears_walled_off_edge_on_both_sides() {
        let mut map = TileMap::new(4);
        let mut tracker = QueueChainTracker::default();
        let params = FootpathParams::default();
        let a = place(&mut map, 1, 1, PathElement::flat(2));
        let b = place(&mut map, 1, 2, PathElement::flat(2));
        let c = place(&mut map, 0, 1, PathElement::flat(2));
        connect_all(&mut map, &mut tracker, &[a, b, c]);

        map.insert(
            TilePos::new(1, 2),
            TileElement::Wall(WallElement {
                base_height: 0,
                clearance_height: 8,
                direction: Direction::North,
            }),
        )
        .unwrap();

        let mut fixups = Vec::new();
        let cleared = prune_stale_edges(&mut map, &mut tracker, &params, a, &mut fixups);
        assert_eq!(cleared, Direction::South.bit());
        assert_eq!(path(&map, a).edges, Direction::West.bit());
        assert_eq!(path(&map, b).edges, 0);
        assert_eq!(
            fixups,
            vec![CornerFixup {
                pos: TilePos::new(0, 1),
                height: 2
            }]
        );
    }
}
