//! Browser-independent game session: owns the world, reacts to host input and
//! describes what to draw each frame.

use anyhow::{anyhow, Context, Result};
use glam::{Mat4, Vec2};
use log::{info, warn};

use crate::assets::{AssetManager, Handle};
use crate::camera::DeltaCamera;
use crate::config::{GameConfig, Resolution};
use crate::input::{InputEvent, InputState, KeyCode, NamedKey};
use crate::mesh::Mesh;
use crate::render::{CameraParams, LightParams};
use crate::terrain::TerrainLibrary;
use crate::world::World;

/// One mesh placed in the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub mesh: Handle<Mesh>,
    pub model: Mat4,
}

/// Everything the renderer needs for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub resolution: Resolution,
    pub camera: CameraParams,
    pub light: LightParams,
    pub items: Vec<DrawItem>,
}

pub struct Game {
    config: GameConfig,
    library: TerrainLibrary,
    world: World,
    assets: AssetManager<Mesh>,
    camera: DeltaCamera,
    input: InputState,
    resolution: Resolution,
    scenario: usize,
    paused: bool,
    frames: u64,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_library(config, TerrainLibrary::default())
    }

    pub fn with_library(config: GameConfig, library: TerrainLibrary) -> Result<Self> {
        if library.is_empty() {
            return Err(anyhow!("scenario library is empty"));
        }
        let mut game = Self {
            resolution: config.resolution,
            camera: DeltaCamera::new(config.camera.min_radius),
            scenario: config.scenario,
            config,
            library,
            world: World::new(),
            assets: AssetManager::new(),
            input: InputState::new(),
            paused: false,
            frames: 0,
        };
        game.load_scenario(game.scenario)?;
        Ok(game)
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn current_scenario(&self) -> usize {
        self.scenario
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn library(&self) -> &TerrainLibrary {
        &self.library
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn assets(&self) -> &AssetManager<Mesh> {
        &self.assets
    }

    pub fn camera(&self) -> &DeltaCamera {
        &self.camera
    }

    /// Clears the world and builds scenario `index` from the library.
    pub fn load_scenario(&mut self, index: usize) -> Result<()> {
        let scenario = self
            .library
            .get(index)
            .ok_or_else(|| anyhow!("no scenario at index {index} ({} available)", self.library.len()))?;
        scenario
            .build(&mut self.world, &mut self.camera, &mut self.assets)
            .with_context(|| format!("failed to build scenario {:?}", scenario.name))?;
        self.scenario = index;
        Ok(())
    }

    /// Applies one frame's worth of host events, then turns the accumulated
    /// drag and scroll into camera motion.
    pub fn handle_events(&mut self, events: &[InputEvent]) {
        for event in events {
            // Held keys auto-repeat keydown; only the first press counts.
            let repeat = matches!(event, InputEvent::KeyDown(key) if self.input.is_key_down(*key));
            self.input.apply(event);
            match event {
                InputEvent::KeyDown(key) if !repeat => self.handle_key(*key),
                InputEvent::SelectScenario(index) => self.select_scenario(*index),
                InputEvent::Resize(resolution) => {
                    if resolution.is_empty() {
                        warn!("ignoring resize to {}x{}", resolution.x, resolution.y);
                    } else {
                        self.resolution = *resolution;
                    }
                }
                _ => {}
            }
        }

        let (drag, scroll) = self.input.take_frame_deltas();
        let camera = &self.config.camera;
        if drag != Vec2::ZERO {
            self.camera.rotate(drag * camera.orbit_sensitivity);
        }
        if scroll != 0.0 {
            self.camera.zoom(scroll * camera.zoom_sensitivity);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Named(NamedKey::Space) => {
                self.paused = !self.paused;
                info!("simulation {}", if self.paused { "paused" } else { "resumed" });
            }
            KeyCode::Character('R') => self.select_scenario(self.scenario),
            KeyCode::Digit(digit @ 1..=9) => self.select_scenario(digit as usize - 1),
            _ => {}
        }
    }

    fn select_scenario(&mut self, index: usize) {
        if let Err(err) = self.load_scenario(index) {
            warn!("{err:#}");
        }
    }

    /// Runs one simulation step unless paused.
    pub fn update(&mut self) {
        if !self.paused {
            self.world
                .simulate(&self.config.simulation, &mut self.assets);
        }
        self.frames += 1;
    }

    pub fn frame(&self) -> Frame {
        Frame {
            resolution: self.resolution,
            camera: self
                .camera
                .params(self.resolution.aspect(), self.config.camera.fov_degrees),
            light: self.config.light,
            items: self
                .world
                .entities()
                .iter()
                .map(|entity| DrawItem {
                    mesh: entity.mesh,
                    model: entity.transform.matrix(),
                })
                .collect(),
        }
    }

    /// Handles events, steps the simulation and returns the frame to draw.
    pub fn advance(&mut self, events: &[InputEvent]) -> Frame {
        self.handle_events(events);
        self.update();
        self.frame()
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec2, Vec3};

    use super::*;
    use crate::input::MouseButton;

    fn game() -> Game {
        Game::new(GameConfig::default()).unwrap()
    }

    fn peak(game: &Game) -> f32 {
        *game
            .world()
            .terrains()
            .next()
            .unwrap()
            .heights()
            .get(IVec2::new(10, 10))
            .unwrap()
    }

    #[test]
    fn starts_with_configured_scenario() {
        let config = GameConfig {
            scenario: 2,
            ..GameConfig::default()
        };
        let game = Game::new(config).unwrap();
        assert_eq!(game.current_scenario(), 2);
        assert_eq!(game.world().len(), 1);
    }

    #[test]
    fn unknown_scenario_is_an_error() {
        let config = GameConfig {
            scenario: 7,
            ..GameConfig::default()
        };
        assert!(Game::new(config).is_err());
    }

    #[test]
    fn advance_runs_the_simulation() {
        let mut game = game();
        let frame = game.advance(&[]);
        assert!(peak(&game) < 6.0);
        assert_eq!(frame.items.len(), 1);
        assert_eq!(game.assets().generation(frame.items[0].mesh), Some(1));
        assert_eq!(game.frames(), 1);
    }

    #[test]
    fn space_pauses_the_simulation() {
        let mut game = game();
        game.advance(&[InputEvent::KeyDown(KeyCode::Named(NamedKey::Space))]);
        assert!(game.paused());
        assert_eq!(peak(&game), 6.0);
    }

    #[test]
    fn held_space_does_not_flicker_pause() {
        let mut game = game();
        let space = KeyCode::Named(NamedKey::Space);
        game.handle_events(&[InputEvent::KeyDown(space), InputEvent::KeyDown(space)]);
        game.handle_events(&[InputEvent::KeyDown(space)]);
        assert!(game.paused());
        game.handle_events(&[InputEvent::KeyUp(space), InputEvent::KeyDown(space)]);
        assert!(!game.paused());
    }

    #[test]
    fn non_finite_pointer_leaves_camera_usable() {
        let mut game = game();
        let yaw = game.camera().yaw();
        let frame = game.advance(&[
            InputEvent::MouseDown {
                button: MouseButton::LEFT,
                position: Vec2::ZERO,
            },
            InputEvent::MouseMove {
                position: Vec2::new(f32::NAN, 0.0),
            },
            InputEvent::Wheel { delta: f32::NAN },
        ]);
        assert_eq!(game.camera().yaw(), yaw);
        assert!(frame.camera.view_proj.is_finite());
        game.handle_events(&[InputEvent::MouseMove {
            position: Vec2::new(10.0, 0.0),
        }]);
        assert!((game.camera().yaw() - (yaw + 0.1)).abs() < 1e-5);
    }

    #[test]
    fn digits_and_events_switch_scenarios() {
        let mut game = game();
        game.handle_events(&[InputEvent::KeyDown(KeyCode::Digit(3))]);
        assert_eq!(game.current_scenario(), 2);
        game.handle_events(&[InputEvent::SelectScenario(1)]);
        assert_eq!(game.current_scenario(), 1);
        game.handle_events(&[InputEvent::SelectScenario(40)]);
        assert_eq!(game.current_scenario(), 1);
        assert_eq!(game.world().len(), 1);
    }

    #[test]
    fn reset_restores_initial_terrain() {
        let mut game = game();
        game.advance(&[]);
        let reset = KeyCode::Character('R');
        game.advance(&[InputEvent::KeyDown(reset), InputEvent::KeyUp(reset)]);
        game.handle_events(&[InputEvent::KeyDown(reset)]);
        assert_eq!(peak(&game), 6.0);
    }

    #[test]
    fn drag_orbits_and_wheel_zooms() {
        let mut game = game();
        let yaw = game.camera().yaw();
        let radius = game.camera().radius();
        game.handle_events(&[
            InputEvent::MouseDown {
                button: MouseButton::LEFT,
                position: Vec2::ZERO,
            },
            InputEvent::MouseMove {
                position: Vec2::new(30.0, 0.0),
            },
            InputEvent::MouseUp {
                button: MouseButton::LEFT,
            },
            InputEvent::Wheel { delta: 100.0 },
        ]);
        assert!((game.camera().yaw() - (yaw + 0.3)).abs() < 1e-5);
        assert!(game.camera().radius() > radius);
    }

    #[test]
    fn resize_updates_projection() {
        let mut game = game();
        let frame = game.advance(&[
            InputEvent::Resize(Resolution::new(400, 400)),
            InputEvent::Resize(Resolution::new(0, 10)),
        ]);
        assert_eq!(frame.resolution, Resolution::new(400, 400));
        assert_eq!(frame.camera.position, game.camera().eye());
        assert_ne!(frame.camera.position, Vec3::ZERO);
    }
}
