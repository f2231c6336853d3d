//! Assertion helpers for `TestPark` integration tests.

use crate::grid::Direction;
use crate::invariants::check_graph_invariants;
use crate::params::FootpathParams;

use super::TestPark;

impl TestPark {
    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_edges(&self, x: u8, y: u8, height: u8, expected: u8) {
        let edges = self.path_at(x, y, height).edges;
        assert_eq!(
            edges, expected,
            "Expected edges {expected:#06b} at ({x}, {y}), got {edges:#06b}"
        );
    }

    pub fn assert_corners(&self, x: u8, y: u8, height: u8, expected: u8) {
        let corners = self.path_at(x, y, height).corners;
        assert_eq!(
            corners, expected,
            "Expected corners {expected:#06b} at ({x}, {y}), got {corners:#06b}"
        );
    }

    pub fn assert_queue_banner(&self, x: u8, y: u8, height: u8, facing: Direction) {
        let path = self.path_at(x, y, height);
        assert!(
            path.has_queue_banner,
            "Expected a queue banner at ({x}, {y})"
        );
        assert_eq!(
            path.queue_banner_direction, facing,
            "Queue banner at ({x}, {y}) faces the wrong way"
        );
    }

    pub fn assert_no_queue_banner(&self, x: u8, y: u8, height: u8) {
        assert!(
            !self.path_at(x, y, height).has_queue_banner,
            "Unexpected queue banner at ({x}, {y})"
        );
    }

    /// Assert edge symmetry, queue degree and the sloped-corner rule over
    /// the whole map.
    pub fn assert_graph_invariants(&self) {
        let params = self.app.world().resource::<FootpathParams>();
        let violations = check_graph_invariants(self.map(), params);
        assert!(
            violations.is_empty(),
            "Footpath invariants violated:\n{}",
            violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}
