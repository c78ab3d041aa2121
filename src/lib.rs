//! Terrain and water simulation engine for the Ski Tycoon browser game.
//!
//! The simulation, camera and input handling are plain Rust and run
//! anywhere; the `web` module wraps them for the browser as the `WebGame`
//! handle with `init_game` and `render_frame`. The native build exposes the
//! same engine to the headless `ski-tycoon` CLI and to tests.

pub mod assets;
pub mod camera;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod input;
pub mod mesh;
pub mod render;
pub mod terrain;
#[cfg(target_arch = "wasm32")]
pub mod web;
pub mod world;

pub use assets::{AssetManager, Handle};
pub use camera::DeltaCamera;
pub use config::{GameConfig, Resolution};
pub use error::{EventError, ScenarioError, TerrainError};
pub use game::{Frame, Game};
pub use grid::Grid;
pub use input::{InputEvent, InputState, KeyCode, MouseButton, NamedKey};
pub use mesh::{Mesh, Transform, Vertex};
pub use render::{CameraParams, LightParams};
pub use terrain::{Droplet, Scenario, SimulationParams, Terrain, TerrainLibrary, TerrainRecipe};
pub use world::World;
