//! # TestPark: headless harness for footpath integration tests
//!
//! Wraps `bevy::app::App` + `FootpathPlugin`. Builder methods place elements
//! on the map without wiring them; edits then go through the same
//! `FootpathEditEvent` flow the game uses, one batch per `update()`.

mod assertions;
mod queries;
mod setup;

use bevy::app::App;
use bevy::prelude::*;

use crate::config::DEFAULT_MAP_SIZE;
use crate::grid::TileMap;
use crate::plugin::FootpathPlugin;
use crate::tile_query::ElementRef;

/// A headless Bevy App running the footpath graph.
pub struct TestPark {
    app: App,
    /// Elements placed by builders and not yet sent to the editor.
    placed: Vec<ElementRef>,
}

impl Default for TestPark {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPark {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An empty park on the default map size.
    pub fn new() -> Self {
        Self::with_map_size(DEFAULT_MAP_SIZE)
    }

    pub fn with_map_size(size: u8) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(FootpathPlugin);
        app.insert_resource(TileMap::new(size));

        // Run one update so the first validation pass happens on an empty map.
        app.update();

        Self {
            app,
            placed: Vec::new(),
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}
