//! Procedural terrain with a lake basin.
//!
//! Heights come from coherent Perlin noise. A lake is carved into the
//! heightfield: inside an elliptical footprint whose rim is roughened by a
//! second, coarser noise sample, the height blends smoothly down to a fixed
//! floor. Normals are central differences of neighbouring heights.

use bevy_math::Vec2;
use cgmath::{InnerSpace, Vector2, Vector3};
use noiz::prelude::*;

use crate::data_structures::model::{MeshData, ModelVertex};

/// Frequency of the base height noise.
pub const NOISE_FREQUENCY: f32 = 0.1;
/// Frequency of the noise that roughens the lake rim.
pub const SHORE_NOISE_FREQUENCY: f32 = 0.2;
/// Amplitude, in grid cells, of the rim roughening.
pub const SHORE_NOISE_AMPLITUDE: f32 = 8.0;
pub const LAKE_FLOOR: f32 = -20.0;
/// Width of the band at the rim over which the floor blends into the terrain.
pub const SHORE_BLEND_WIDTH: f32 = 10.0;

/// Deterministic 2D Perlin noise. The same seed always yields the same field.
pub struct HeightNoise {
    perlin: Noise<common_noise::Perlin>,
}

impl HeightNoise {
    pub fn new(seed: u32) -> Self {
        let mut perlin = Noise::<common_noise::Perlin>::default();
        perlin.set_seed(seed);
        Self { perlin }
    }

    pub fn sample(&self, x: f32, z: f32) -> f32 {
        self.perlin.sample_for::<f32>(Vec2::new(x, z))
    }
}

impl Default for HeightNoise {
    fn default() -> Self {
        Self::new(0)
    }
}

/// The anisotropic ellipse describing the lake, in grid cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LakeShape {
    pub center: Vector2<f32>,
    pub radius: f32,
    pub stretch: Vector2<f32>,
}

impl LakeShape {
    pub fn new(center: Vector2<f32>, radius: f32) -> Self {
        Self {
            center,
            radius,
            stretch: Vector2::new(1.3, 0.8),
        }
    }

    /// Distance from the centre with X stretched and Z compressed, so the
    /// `radius` iso-line is an ellipse rather than a circle.
    pub fn elliptical_distance(&self, x: f32, z: f32) -> f32 {
        Vector2::new(
            (x - self.center.x) * self.stretch.x,
            (z - self.center.y) * self.stretch.y,
        )
        .magnitude()
    }

    pub fn contains(&self, x: f32, z: f32) -> bool {
        self.elliptical_distance(x, z) < self.radius
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TerrainParams {
    pub size: u32,
    pub height_scale: f32,
    pub uv_scale: f32,
    pub lake: LakeShape,
}

impl TerrainParams {
    /// Terrain of `size`² cells with the lake placed off-centre at 70% / 40%
    /// of the grid and a radius of 8% of the grid.
    pub fn new(size: u32, height_scale: f32, uv_scale: f32) -> Self {
        let extent = size as f32;
        Self {
            size,
            height_scale,
            uv_scale,
            lake: LakeShape::new(Vector2::new(extent * 0.7, extent * 0.4), extent * 0.08),
        }
    }

    pub fn with_lake(mut self, lake: LakeShape) -> Self {
        self.lake = lake;
        self
    }
}

/// Row-major grid of heights, `heights[z * size + x]`.
#[derive(Clone, Debug)]
pub struct Heightfield {
    pub size: u32,
    pub heights: Vec<f32>,
}

impl Heightfield {
    pub fn height(&self, x: u32, z: u32) -> f32 {
        self.heights[(z * self.size + x) as usize]
    }

    /// Central-difference normal at an interior cell. Border cells have no
    /// full neighbourhood and yield `None`.
    pub fn normal(&self, x: u32, z: u32) -> Option<Vector3<f32>> {
        if x + 1 >= self.size || z + 1 >= self.size {
            return None;
        }
        let h_left = self.height(x.checked_sub(1)?, z);
        let h_right = self.height(x + 1, z);
        let h_down = self.height(x, z.checked_sub(1)?);
        let h_up = self.height(x, z + 1);
        Some(Vector3::new(h_left - h_right, 2.0, h_down - h_up).normalize())
    }
}

/// Hermite interpolation between `edge0` and `edge1`, clamped to [0, 1].
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn sample_heightfield(params: &TerrainParams, noise: &HeightNoise) -> Heightfield {
    let size = params.size;
    let lake = &params.lake;
    let mut heights = Vec::with_capacity((size * size) as usize);
    for z in 0..size {
        for x in 0..size {
            let (fx, fz) = (x as f32, z as f32);
            let rim_noise = noise.sample(fx * SHORE_NOISE_FREQUENCY, fz * SHORE_NOISE_FREQUENCY)
                * SHORE_NOISE_AMPLITUDE;
            let distorted_distance = lake.elliptical_distance(fx, fz) + rim_noise;

            let mut height =
                noise.sample(fx * NOISE_FREQUENCY, fz * NOISE_FREQUENCY) * params.height_scale;
            if distorted_distance < lake.radius {
                let blend = smoothstep(
                    lake.radius - SHORE_BLEND_WIDTH,
                    lake.radius,
                    distorted_distance,
                );
                height = LAKE_FLOOR + (height - LAKE_FLOOR) * blend;
            }
            heights.push(height);
        }
    }
    Heightfield { size, heights }
}

/// Build the terrain mesh: `size`² vertices centred on the origin and
/// `6 * (size - 1)²` indices.
pub fn generate_terrain(params: &TerrainParams, noise: &HeightNoise) -> MeshData {
    let heightfield = sample_heightfield(params, noise);
    terrain_mesh(params, &heightfield)
}

pub fn terrain_mesh(params: &TerrainParams, heightfield: &Heightfield) -> MeshData {
    let size = params.size;
    let half = size as f32 * 0.5;
    let uv_extent = size as f32 * params.uv_scale;

    let mut vertices = Vec::with_capacity((size * size) as usize);
    for z in 0..size {
        for x in 0..size {
            vertices.push(ModelVertex {
                position: [x as f32 - half, heightfield.height(x, z), z as f32 - half],
                tex_coords: [x as f32 / uv_extent, z as f32 / uv_extent],
                normal: [0.0, 1.0, 0.0],
            });
        }
    }

    // Under water the floor is shaded as if flat. The footprint test is a
    // plain circle around the lake centre, not the rim ellipse.
    for z in 1..size.saturating_sub(1) {
        for x in 1..size.saturating_sub(1) {
            let submerged = Vector2::new(x as f32, z as f32) - params.lake.center;
            if submerged.magnitude() < params.lake.radius {
                continue;
            }
            if let Some(normal) = heightfield.normal(x, z) {
                vertices[(z * size + x) as usize].normal = normal.into();
            }
        }
    }

    MeshData {
        vertices,
        indices: grid_indices(size),
    }
}

/// Two triangles per quad: (top left, bottom left, top right) and
/// (top right, bottom left, bottom right).
pub fn grid_indices(size: u32) -> Vec<u32> {
    let quads = size.saturating_sub(1);
    let mut indices = Vec::with_capacity((quads * quads * 6) as usize);
    for z in 0..quads {
        for x in 0..quads {
            let top_left = z * size + x;
            let top_right = top_left + 1;
            let bottom_left = (z + 1) * size + x;
            let bottom_right = bottom_left + 1;
            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }
    indices
}
