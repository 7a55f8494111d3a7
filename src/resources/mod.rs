//! Loading of meshes, textures and text from external files.
//!
//! - `mesh` parses OBJ models into CPU meshes
//! - `texture` decodes images into 2D textures and cubemaps, with solid fallbacks
//! - `font` builds quad meshes for text against a glyph atlas
//!
//! Everything uploaded to the GPU is kept in [`Assets`] and referenced from the
//! scene graph by plain handles.

use std::path::PathBuf;

use anyhow::Context as _;

use crate::{
    config::SceneConfig,
    data_structures::{
        model::{GpuMesh, MeshData},
        scene_graph::Geometry,
        terrain::{HeightNoise, LakeShape, TerrainParams, generate_terrain},
        texture::Texture,
        water::{WaterParams, generate_water},
    },
    scene::SceneAssets,
};

pub mod font;
pub mod mesh;
pub mod texture;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub usize);

#[derive(Debug)]
pub struct BoundTexture {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

/// GPU-resident meshes and textures, owned for the lifetime of the scene.
#[derive(Debug)]
pub struct Assets {
    meshes: Vec<GpuMesh>,
    textures: Vec<BoundTexture>,
    pub texture_layout: wgpu::BindGroupLayout,
    pub cubemap_layout: wgpu::BindGroupLayout,
}

impl Assets {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            meshes: Vec::new(),
            textures: Vec::new(),
            texture_layout: texture::diffuse_layout(device),
            cubemap_layout: texture::cubemap_layout(device),
        }
    }

    pub fn add_mesh(&mut self, device: &wgpu::Device, name: &str, data: &MeshData) -> MeshHandle {
        self.meshes.push(GpuMesh::from_data(device, name, data));
        MeshHandle(self.meshes.len() - 1)
    }

    pub fn add_texture(&mut self, device: &wgpu::Device, name: &str, texture: Texture) -> TextureHandle {
        let bind_group = texture::mk_bind_group(device, &self.texture_layout, &texture, name);
        self.textures.push(BoundTexture {
            texture,
            bind_group,
        });
        TextureHandle(self.textures.len() - 1)
    }

    pub fn add_cubemap(&mut self, device: &wgpu::Device, name: &str, texture: Texture) -> TextureHandle {
        let bind_group = texture::mk_bind_group(device, &self.cubemap_layout, &texture, name);
        self.textures.push(BoundTexture {
            texture,
            bind_group,
        });
        TextureHandle(self.textures.len() - 1)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(handle.0)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&BoundTexture> {
        self.textures.get(handle.0)
    }
}

/// Files are resolved relative to `./assets`.
pub fn asset_path(file_name: &str) -> PathBuf {
    std::path::Path::new("./").join("assets").join(file_name)
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    let path = asset_path(file_name);
    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = asset_path(file_name);
    tokio::fs::read(&path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))
}

/**
 * Generate the terrain and water and load every model and texture the scene
 * needs, uploading all of it.
 *
 * Missing or broken files never fail the load: models degrade to empty meshes
 * and textures to solid colours, each with a logged error.
 */
pub async fn load_scene_assets(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    config: &SceneConfig,
) -> anyhow::Result<(Assets, SceneAssets)> {
    let mut assets = Assets::new(device);

    let lake = LakeShape::new(config.lake.center, config.lake.radius);
    let terrain_params = TerrainParams::new(
        config.terrain.size,
        config.terrain.height_scale,
        config.terrain.uv_scale,
    )
    .with_lake(lake);
    let terrain_data = generate_terrain(&terrain_params, &HeightNoise::new(config.noise_seed()));
    let water_data = generate_water(&WaterParams::new(
        config.lake.water_grid_size,
        config.lake.center,
        config.lake.radius,
        config.lake.water_level,
        config.lake.water_uv_scale,
    ));
    log::info!(
        "generated terrain ({} indices) and water ({} indices)",
        terrain_data.indices.len(),
        water_data.mesh.indices.len()
    );

    let models = [&config.tree.obj, &config.boat.obj, &config.fish.obj];
    let [tree_data, boat_data, fish_data]: [MeshData; 3] =
        futures::future::join_all(models.iter().map(|obj| mesh::load_mesh_or_empty(obj)))
            .await
            .try_into()
            .map_err(|_| anyhow::anyhow!("expected three models"))?;

    let mut upload = |name: &str, data: &MeshData, texture: Texture| {
        let mesh = assets.add_mesh(device, name, data);
        let texture = assets.add_texture(device, name, texture);
        Geometry {
            mesh,
            index_count: data.index_count(),
            texture: Some(texture),
        }
    };

    let terrain_texture =
        texture::load_texture_or_fallback(&config.terrain.texture, device, queue).await;
    let terrain = upload("terrain", &terrain_data, terrain_texture);
    // The water shader colours the surface itself and ignores its texture.
    let water_texture = Texture::create_solid(device, queue, [40, 90, 160, 255], "water");
    let water = upload("water", &water_data.mesh, water_texture);

    let tree_texture = texture::load_texture_or_fallback(&config.tree.texture, device, queue).await;
    let tree = upload(&config.tree.obj, &tree_data, tree_texture);
    let boat_texture = texture::load_texture_or_fallback(&config.boat.texture, device, queue).await;
    let boat = upload(&config.boat.obj, &boat_data, boat_texture);
    let fish_texture = texture::load_texture_or_fallback(&config.fish.texture, device, queue).await;
    let fish = upload(&config.fish.obj, &fish_data, fish_texture);

    let cubemap = match texture::load_cubemap(&config.skybox_faces, device, queue).await {
        Ok(cubemap) => cubemap,
        Err(e) => {
            log::error!("Failed to build the skybox cubemap: {e:#}");
            let faces = texture::fill_missing_faces(Default::default(), texture::FALLBACK_RGBA);
            Texture::create_cubemap(device, queue, &faces, "skybox")?
        }
    };
    let skybox = assets.add_cubemap(device, "skybox", cubemap);

    Ok((
        assets,
        SceneAssets {
            terrain,
            water,
            tree,
            boat,
            fish,
            skybox,
        },
    ))
}
