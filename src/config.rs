use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::render::LightParams;
use crate::terrain::SimulationParams;

/// Size of the render target in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: u32,
    pub y: u32,
}

impl Resolution {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn aspect(&self) -> f32 {
        if self.y == 0 {
            1.0
        } else {
            self.x as f32 / self.y as f32
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x == 0 || self.y == 0
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Camera feel: how far a drag or wheel tick moves the orbit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    /// Radians of orbit per pixel dragged.
    pub orbit_sensitivity: f32,
    /// Fractional radius change per wheel `deltaY` unit.
    pub zoom_sensitivity: f32,
    pub min_radius: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            orbit_sensitivity: 0.01,
            zoom_sensitivity: 0.001,
            min_radius: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub resolution: Resolution,
    pub canvas_id: String,
    pub scenario: usize,
    pub simulation: SimulationParams,
    pub camera: CameraConfig,
    pub light: LightParams,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            canvas_id: "canvas".to_string(),
            scenario: 0,
            simulation: SimulationParams::default(),
            camera: CameraConfig::default(),
            light: LightParams::default(),
        }
    }
}

/// Loosely typed key/value access, such as a JS object or the map passed to
/// `init_game`.
pub trait FieldSource {
    fn number(&self, key: &str) -> Option<f64>;
    fn text(&self, key: &str) -> Option<String>;
}

impl GameConfig {
    /// Builds a config from `x`/`y` plus the optional `canvas_id`, `scenario`
    /// and `substeps` keys. Anything else keeps its default.
    pub fn from_lookup(lookup: &impl FieldSource) -> Result<Self> {
        let x = lookup
            .number("x")
            .ok_or_else(|| anyhow!("resolution is missing the x entry"))?;
        let y = lookup
            .number("y")
            .ok_or_else(|| anyhow!("resolution is missing the y entry"))?;
        let resolution = Resolution::new(positive_pixels(x, "x")?, positive_pixels(y, "y")?);

        let mut config = Self {
            resolution,
            ..Self::default()
        };
        if let Some(canvas_id) = lookup.text("canvas_id") {
            config.canvas_id = canvas_id;
        }
        if let Some(scenario) = lookup.number("scenario") {
            if scenario < 0.0 || scenario.fract() != 0.0 {
                return Err(anyhow!("scenario must be a non-negative integer, got {scenario}"));
            }
            config.scenario = scenario as usize;
        }
        if let Some(substeps) = lookup.number("substeps") {
            if !(0.0..=1000.0).contains(&substeps) {
                return Err(anyhow!("substeps must be between 0 and 1000, got {substeps}"));
            }
            config.simulation.substeps = substeps as u32;
        }
        Ok(config)
    }
}

fn positive_pixels(value: f64, axis: &str) -> Result<u32> {
    if !value.is_finite() || value < 1.0 || value > u32::MAX as f64 {
        return Err(anyhow!("resolution {axis} must be a positive pixel count, got {value}"));
    }
    Ok(value as u32)
}
