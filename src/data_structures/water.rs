//! Sparse water surface covering the lake.
//!
//! Only grid cells inside the lake ellipse produce a vertex. A validity index
//! maps every cell to its output vertex (or to nothing), and each of the two
//! triangles of a quad is emitted only when all three of its corners are valid.
//! The two triangles are tested independently, so the rim of the surface can
//! show small cracks where one half of a quad survives.

use cgmath::{InnerSpace, Vector2, Vector3};

use crate::data_structures::model::{MeshData, ModelVertex};
use crate::data_structures::terrain::LakeShape;

#[derive(Clone, Copy, Debug)]
pub struct WaterParams {
    pub size: u32,
    pub lake: LakeShape,
    pub level: f32,
    pub uv_scale: f32,
}

impl WaterParams {
    pub fn new(size: u32, center: Vector2<f32>, radius: f32, level: f32, uv_scale: f32) -> Self {
        Self {
            size,
            lake: LakeShape::new(center, radius),
            level,
            uv_scale,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct WaterMeshData {
    pub mesh: MeshData,
    /// `valid_indices[z * size + x]` is the output vertex of cell `(x, z)`,
    /// or `None` when the cell lies outside the lake.
    pub valid_indices: Vec<Option<u32>>,
}

impl WaterMeshData {
    pub fn vertex_at(&self, size: u32, x: u32, z: u32) -> Option<&ModelVertex> {
        self.valid_indices[(z * size + x) as usize].map(|i| &self.mesh.vertices[i as usize])
    }
}

pub fn generate_water(params: &WaterParams) -> WaterMeshData {
    let size = params.size;
    let cells = (size * size) as usize;
    let half = size as f32 * 0.5;
    let uv_extent = size as f32 * params.uv_scale;

    let mut valid_indices = vec![None; cells];
    // Kept per cell so a displaced surface can reuse the normal pass below.
    let heights = vec![params.level; cells];
    let mut vertices = Vec::new();

    for z in 0..size {
        for x in 0..size {
            if !params.lake.contains(x as f32, z as f32) {
                continue;
            }
            let cell = (z * size + x) as usize;
            valid_indices[cell] = Some(vertices.len() as u32);
            vertices.push(ModelVertex {
                position: [x as f32 - half, heights[cell], z as f32 - half],
                tex_coords: [x as f32 / uv_extent, z as f32 / uv_extent],
                normal: [0.0, 1.0, 0.0],
            });
        }
    }

    let height = |x: u32, z: u32| heights[(z * size + x) as usize];
    for z in 1..size.saturating_sub(1) {
        for x in 1..size.saturating_sub(1) {
            let Some(vertex) = valid_indices[(z * size + x) as usize] else {
                continue;
            };
            let normal = Vector3::new(
                height(x - 1, z) - height(x + 1, z),
                2.0,
                height(x, z - 1) - height(x, z + 1),
            )
            .normalize();
            vertices[vertex as usize].normal = normal.into();
        }
    }

    let mut indices = Vec::new();
    let quads = size.saturating_sub(1);
    for z in 0..quads {
        for x in 0..quads {
            let top_left = (z * size + x) as usize;
            let top_right = top_left + 1;
            let bottom_left = ((z + 1) * size + x) as usize;
            let bottom_right = bottom_left + 1;

            let corners = |a: usize, b: usize, c: usize| {
                Some([valid_indices[a]?, valid_indices[b]?, valid_indices[c]?])
            };
            if let Some(tri) = corners(top_left, bottom_left, top_right) {
                indices.extend_from_slice(&tri);
            }
            if let Some(tri) = corners(top_right, bottom_left, bottom_right) {
                indices.extend_from_slice(&tri);
            }
        }
    }

    WaterMeshData {
        mesh: MeshData { vertices, indices },
        valid_indices,
    }
}
