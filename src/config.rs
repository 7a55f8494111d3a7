//! Scene configuration.
//!
//! [`SceneConfig`] gathers every tunable of the lakeside scene in one place.
//! The [`Default`] impl carries the values the demo ships with; callers can
//! override single fields with struct update syntax before passing the config
//! to [`crate::flow::run`].

use cgmath::{Deg, Vector2, Vector3};

/// Parameters of the procedurally generated terrain.
#[derive(Clone, Debug)]
pub struct TerrainConfig {
    /// Number of grid cells along each axis.
    pub size: u32,
    pub height_scale: f32,
    pub uv_scale: f32,
    pub texture: String,
}

/// Parameters of the lake basin and the water surface inside it.
#[derive(Clone, Debug)]
pub struct LakeConfig {
    /// Lake centre in grid cells.
    pub center: Vector2<f32>,
    pub radius: f32,
    pub water_grid_size: u32,
    pub water_level: f32,
    pub water_uv_scale: f32,
    /// Vertical offset applied to the water node.
    pub water_offset_y: f32,
}

/// A model file paired with the texture wrapped around it.
#[derive(Clone, Debug)]
pub struct ModelAsset {
    pub obj: String,
    pub texture: String,
}

#[derive(Clone, Debug)]
pub struct ShadowConfig {
    /// Requested edge length of the square shadow map. Clamped to the device limit.
    pub map_size: u32,
    /// Half extent of the orthographic light frustum.
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vector3<f32>,
    /// How far the boat is lifted while the depth pass is rendered.
    pub boat_lift: f32,
}

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub position: Vector3<f32>,
    pub front: Vector3<f32>,
    /// Heading that the first mouse motion turns from.
    pub yaw: Deg<f32>,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub sensitivity: f32,
    pub move_speed: f32,
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub terrain: TerrainConfig,
    pub lake: LakeConfig,
    pub tree: ModelAsset,
    pub boat: ModelAsset,
    pub fish: ModelAsset,
    pub tree_count: usize,
    pub fish_count: usize,
    /// Cubemap faces in layer order (+X, -X, +Y, -Y, +Z, -Z).
    pub skybox_faces: [String; 6],
    pub skybox_scale: f32,
    pub light_direction: Vector3<f32>,
    pub light_color: Vector3<f32>,
    pub shadow: ShadowConfig,
    pub camera: CameraConfig,
    /// Seed for scattering trees and fish.
    pub seed: u64,
    pub clear_colour: wgpu::Color,
}

impl SceneConfig {
    /// Half the terrain extent; grid cell `c` sits at world coordinate `c - half_extent`.
    pub fn half_extent(&self) -> f32 {
        self.terrain.size as f32 * 0.5
    }

    /// The scattering seed folded to the 32 bits the height noise takes, so
    /// the upper half still changes the terrain.
    pub fn noise_seed(&self) -> u32 {
        (self.seed ^ (self.seed >> 32)) as u32
    }

    /// The lake centre in world space (x, z).
    pub fn lake_center_world(&self) -> Vector2<f32> {
        let half = self.half_extent();
        Vector2::new(self.lake.center.x - half, self.lake.center.y - half)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        let size = 1000;
        Self {
            terrain: TerrainConfig {
                size,
                height_scale: 4.0,
                uv_scale: 0.02,
                texture: "textures/grass1.png".into(),
            },
            lake: LakeConfig {
                center: Vector2::new(size as f32 * 0.7, size as f32 * 0.4),
                radius: size as f32 * 0.08,
                water_grid_size: size,
                water_level: -18.0,
                water_uv_scale: 0.001,
                water_offset_y: 15.0,
            },
            tree: ModelAsset {
                obj: "obj/RedDeliciousApple.obj".into(),
                texture: "textures/treeTexture.png".into(),
            },
            boat: ModelAsset {
                obj: "obj/boat.obj".into(),
                texture: "textures/wood2.png".into(),
            },
            fish: ModelAsset {
                obj: "obj/fish.obj".into(),
                texture: "textures/fish.png".into(),
            },
            tree_count: 30,
            fish_count: 10,
            skybox_faces: [
                "textures/right.png".into(),
                "textures/left.png".into(),
                "textures/bottom.png".into(),
                "textures/top.png".into(),
                "textures/front.png".into(),
                "textures/back.png".into(),
            ],
            skybox_scale: 1000.0,
            light_direction: Vector3::new(-0.03, -1.0, 0.0),
            light_color: Vector3::new(1.0, 1.0, 1.0),
            shadow: ShadowConfig {
                map_size: 4096,
                half_extent: 600.0,
                near: 1.0,
                far: 1000.0,
                eye: Vector3::new(0.0, 600.0, 0.0),
                boat_lift: 30.0,
            },
            camera: CameraConfig {
                position: Vector3::new(0.0, 20.0, -30.0),
                front: Vector3::new(0.0, -0.2, 1.0),
                yaw: Deg(-90.0),
                fovy: Deg(60.0),
                znear: 0.5,
                zfar: 1000.0,
                sensitivity: 0.1,
                move_speed: 1.0,
            },
            seed: 0x1a4e,
            clear_colour: wgpu::Color {
                r: 0.3,
                g: 0.5,
                b: 0.8,
                a: 1.0,
            },
        }
    }
}
