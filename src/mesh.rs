use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, UVec2, Vec3};
use serde::{Deserialize, Serialize};

/// Interleaved vertex uploaded to the GPU as-is.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const STRIDE: usize = std::mem::size_of::<Self>();
    pub const NORMAL_OFFSET: usize = 3 * std::mem::size_of::<f32>();
}

/// Indexed triangle list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Triangulates a heightfield with one vertex per cell at `(x, height, y)`.
    ///
    /// `heights` must use the [`crate::grid::Grid`] layout.
    pub fn from_heights(heights: &[f32], dimensions: UVec2) -> Self {
        let (width, depth) = (dimensions.x as usize, dimensions.y as usize);
        let vertices = heights
            .iter()
            .enumerate()
            .map(|(i, height)| Vertex {
                position: [(i / depth) as f32, *height, (i % depth) as f32],
                normal: [0.0; 3],
            })
            .collect::<Vec<_>>();

        let mut indices = Vec::with_capacity(width.saturating_sub(1) * depth.saturating_sub(1) * 6);
        for x in 0..width.saturating_sub(1) {
            for y in 0..depth.saturating_sub(1) {
                let i00 = (x * depth + y) as u32;
                let i01 = i00 + 1;
                let i10 = i00 + depth as u32;
                let i11 = i10 + 1;
                indices.extend_from_slice(&[i00, i01, i10, i10, i01, i11]);
            }
        }

        let mut mesh = Self { vertices, indices };
        mesh.compute_normals();
        mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Replaces vertex normals with the normalised sum of adjacent face normals.
    pub fn compute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertices.len()];
        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            let p0 = Vec3::from(self.vertices[i0].position);
            let p1 = Vec3::from(self.vertices[i1].position);
            let p2 = Vec3::from(self.vertices[i2].position);
            let normal = (p1 - p0).cross(p2 - p0);
            if normal.length_squared() > f32::EPSILON {
                let normal = normal.normalize();
                accum[i0] += normal;
                accum[i1] += normal;
                accum[i2] += normal;
            }
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(accum) {
            vertex.normal = normal.normalize_or_zero().to_array();
        }
    }
}

/// Placement of a mesh in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}
