//! Heightfield terrain and the shallow-water solver that runs on top of it.
//!
//! Heights live on cell centres. Velocities live on a staggered grid one cell
//! larger in each axis: `velocity[x, y].x` is the flow across the face between
//! cells `x - 1` and `x`, and `.y` the flow across the face between `y - 1`
//! and `y`.

mod library;
mod pgm;

use glam::{IVec2, UVec2, Vec2, Vec3};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::grid::Grid;
use crate::mesh::Mesh;

pub use library::{Scenario, TerrainLibrary, TerrainRecipe};

/// Tunables for [`Terrain::water_simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    #[serde(default = "default_delta_t")]
    pub delta_t: f32,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_viscosity")]
    pub viscosity: f32,
    #[serde(default = "default_substeps")]
    pub substeps: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            delta_t: default_delta_t(),
            gravity: default_gravity(),
            viscosity: default_viscosity(),
            substeps: default_substeps(),
        }
    }
}

fn default_delta_t() -> f32 {
    Terrain::DELTA_T
}

fn default_gravity() -> f32 {
    Terrain::G
}

fn default_viscosity() -> f32 {
    Terrain::VISC
}

fn default_substeps() -> u32 {
    Terrain::SUBSTEPS
}

/// A raised column of water placed on otherwise flat terrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Droplet {
    pub position: UVec2,
    pub height: f32,
}

impl Droplet {
    pub fn new(x: u32, y: u32, height: f32) -> Self {
        Self {
            position: UVec2::new(x, y),
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    heights: Grid<f32>,
    velocity: Grid<Vec2>,
    dimensions: UVec2,
}

impl Terrain {
    pub const DELTA_T: f32 = 0.01;
    pub const G: f32 = 0.1;
    pub const VISC: f32 = 0.0002;
    pub const SUBSTEPS: u32 = 20;

    /// Builds terrain from a height buffer laid out like [`Grid`].
    pub fn from_heights(heights: Vec<f32>, dimensions: UVec2) -> Result<Self, TerrainError> {
        if dimensions.x == 0 || dimensions.y == 0 {
            return Err(TerrainError::EmptyDimensions {
                width: dimensions.x,
                height: dimensions.y,
            });
        }
        Ok(Self {
            heights: Grid::from_vec(heights, dimensions)?,
            velocity: Grid::filled(Vec2::ZERO, dimensions + UVec2::ONE),
            dimensions,
        })
    }

    pub fn flat(dimensions: UVec2, height: f32) -> Result<Self, TerrainError> {
        let cells = dimensions.x as usize * dimensions.y as usize;
        Self::from_heights(vec![height; cells], dimensions)
    }

    /// Cone whose height changes by `slope` per unit of distance from `center`.
    pub fn cone(
        dimensions: UVec2,
        center: Vec2,
        center_height: f32,
        slope: f32,
    ) -> Result<Self, TerrainError> {
        Self::from_heights(
            radial_heights(dimensions, center, |radius| center_height + radius * slope),
            dimensions,
        )
    }

    /// Like [`Terrain::cone`] but never lower than `min_height`.
    pub fn cone_flat(
        dimensions: UVec2,
        center: Vec2,
        center_height: f32,
        slope: f32,
        min_height: f32,
    ) -> Result<Self, TerrainError> {
        Self::from_heights(
            radial_heights(dimensions, center, |radius| {
                (center_height + radius * slope).max(min_height)
            }),
            dimensions,
        )
    }

    pub fn droplet(
        dimensions: UVec2,
        height: f32,
        droplets: &[Droplet],
    ) -> Result<Self, TerrainError> {
        let mut terrain = Self::flat(dimensions, height)?;
        for drop in droplets {
            match terrain.heights.get_mut(drop.position.as_ivec2()) {
                Some(cell) => *cell = drop.height,
                None => warn!(
                    "droplet at ({}, {}) lies outside {}x{} terrain",
                    drop.position.x, drop.position.y, dimensions.x, dimensions.y
                ),
            }
        }
        Ok(terrain)
    }

    /// Parses an ASCII (`P2`) graymap, scaling samples into `0..=scaling`.
    pub fn from_pgm(data: &[u8], scaling: f32) -> Result<Self, TerrainError> {
        let text = std::str::from_utf8(data).map_err(|_| TerrainError::InvalidUtf8)?;
        pgm::terrain_from_pgm(text, scaling)
    }

    pub fn dimensions(&self) -> UVec2 {
        self.dimensions
    }

    pub fn heights(&self) -> &Grid<f32> {
        &self.heights
    }

    pub fn velocity(&self) -> &Grid<Vec2> {
        &self.velocity
    }

    /// Sum of all cell heights.
    pub fn volume(&self) -> f32 {
        self.heights.iter().sum()
    }

    /// Lowest and highest cell.
    pub fn height_range(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), h| {
                (lo.min(*h), hi.max(*h))
            })
    }

    pub fn mesh(&self) -> Mesh {
        Mesh::from_heights(self.heights.data(), self.dimensions)
    }

    /// World position of the surface at `coordinate`, or `None` off the grid.
    pub fn transform_at(&self, coordinate: IVec2) -> Option<Vec3> {
        self.heights
            .get(coordinate)
            .map(|height| Vec3::new(coordinate.x as f32, *height, coordinate.y as f32))
    }

    /// Like [`Terrain::transform_at`] for a fractional coordinate, truncated and
    /// clamped onto the grid.
    pub fn transform_rounded(&self, coordinate: Vec2) -> Vec3 {
        let max = self.dimensions.as_ivec2() - IVec2::ONE;
        let cell = coordinate.as_ivec2().clamp(IVec2::ZERO, max);
        Vec3::new(cell.x as f32, *self.heights.get_clamped(cell), cell.y as f32)
    }

    /// Advances the water by `params.substeps` two-stage steps.
    pub fn water_simulation(&mut self, params: &SimulationParams) {
        for _ in 0..params.substeps {
            let half_velocity =
                Self::update_velocity(&self.heights, &self.velocity, self.dimensions, params);
            let half_heights = Self::update_water(
                &self.heights,
                &self.velocity,
                &self.heights,
                self.dimensions,
                params.delta_t,
            );

            self.velocity =
                Self::update_velocity(&half_heights, &self.velocity, self.dimensions, params);
            self.heights = Self::update_water(
                &half_heights,
                &half_velocity,
                &self.heights,
                self.dimensions,
                params.delta_t,
            );
        }
    }

    /// Accelerates `velocity_apply` along the height gradient of `heights`.
    fn update_velocity(
        heights: &Grid<f32>,
        velocity_apply: &Grid<Vec2>,
        dimensions: UVec2,
        params: &SimulationParams,
    ) -> Grid<Vec2> {
        let mut out = velocity_apply.clone();
        let step = params.delta_t * params.gravity;
        for x in 0..dimensions.x as i32 {
            for y in 0..dimensions.y as i32 {
                let here = IVec2::new(x, y);
                let center = *heights.get_clamped(here);
                let left = *heights.get_clamped(IVec2::new(x - 1, y));
                let below = *heights.get_clamped(IVec2::new(x, y - 1));

                let Some(v) = out.get_mut(here) else {
                    continue;
                };
                v.x += (left - center) * step;
                v.x -= v.x * params.viscosity;
                if x == 0 {
                    v.x = 0.0;
                }
                v.y += (below - center) * step;
                v.y -= v.y * params.viscosity;
                if y == 0 {
                    v.y = 0.0;
                }
            }
        }
        out
    }

    /// Moves water between cells according to the face fluxes of `velocity`,
    /// writing the result on top of `heights_apply`.
    fn update_water(
        heights: &Grid<f32>,
        velocity: &Grid<Vec2>,
        heights_apply: &Grid<f32>,
        dimensions: UVec2,
        delta_t: f32,
    ) -> Grid<f32> {
        let mut out = heights_apply.clone();
        let (width, depth) = (dimensions.x as i32, dimensions.y as i32);
        for x in 0..width {
            for y in 0..depth {
                let here = IVec2::new(x, y);
                let water = *heights.get_clamped(here);
                let flow = face_flow(velocity, here);

                let water_left = *heights.get_clamped(IVec2::new(x - 1, y));
                let water_below = *heights.get_clamped(IVec2::new(x, y - 1));
                let (water_right, flow_right) = if x + 1 < width {
                    let right = IVec2::new(x + 1, y);
                    (*heights.get_clamped(right), face_flow(velocity, right).x)
                } else {
                    (water, 0.0)
                };
                let (water_above, flow_above) = if y + 1 < depth {
                    let above = IVec2::new(x, y + 1);
                    (*heights.get_clamped(above), face_flow(velocity, above).y)
                } else {
                    (water, 0.0)
                };

                let delta_x =
                    flow_right * (water_right + water) / 2.0 - flow.x * (water_left + water) / 2.0;
                let delta_y =
                    flow_above * (water_above + water) / 2.0 - flow.y * (water_below + water) / 2.0;
                if let Some(cell) = out.get_mut(here) {
                    *cell -= (delta_x + delta_y) * delta_t;
                }
            }
        }
        out
    }
}

fn face_flow(velocity: &Grid<Vec2>, coordinate: IVec2) -> Vec2 {
    velocity.get(coordinate).copied().unwrap_or(Vec2::ZERO)
}

fn radial_heights(dimensions: UVec2, center: Vec2, height: impl Fn(f32) -> f32) -> Vec<f32> {
    let mut heights = Vec::with_capacity(dimensions.x as usize * dimensions.y as usize);
    for x in 0..dimensions.x {
        for y in 0..dimensions.y {
            let radius = Vec2::new(x as f32, y as f32).distance(center);
            heights.push(height(radius));
        }
    }
    heights
}
