use anyhow::Context as _;

use crate::{
    data_structures::texture::{self, Texture},
    resources::load_binary,
};

/// Colour of the stand-in for a texture that failed to load.
pub const FALLBACK_RGBA: [u8; 4] = [255, 0, 255, 255];

pub fn diffuse_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    sampled_layout(device, wgpu::TextureViewDimension::D2, "diffuse_bind_group_layout")
}

pub fn cubemap_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    sampled_layout(device, wgpu::TextureViewDimension::Cube, "cubemap_bind_group_layout")
}

fn sampled_layout(
    device: &wgpu::Device,
    view_dimension: wgpu::TextureViewDimension,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some(label),
    })
}

/// Bind a texture and its sampler against one of the layouts above.
pub fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    label: &str,
) -> wgpu::BindGroup {
    let fallback_sampler;
    let sampler = match &texture.sampler {
        Some(sampler) => sampler,
        None => {
            fallback_sampler = texture::create_default_sampler(device);
            &fallback_sampler
        }
    };
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some(label),
    })
}

fn extension(file_name: &str) -> Option<&str> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
}

pub async fn load_image(file_name: &str) -> anyhow::Result<image::RgbaImage> {
    let data = load_binary(file_name).await?;
    let img = texture::decode_image(&data, extension(file_name))
        .with_context(|| format!("cannot decode {file_name}"))?;
    log::debug!("loaded {file_name}: {}x{}", img.width(), img.height());
    Ok(img.to_rgba8())
}

pub async fn load_texture(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let img = load_image(file_name).await?;
    Ok(Texture::from_rgba(device, queue, &img, Some(file_name)))
}

/// Load a texture, or log the failure and return a solid 1x1 stand-in.
pub async fn load_texture_or_fallback(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Texture {
    match load_texture(file_name, device, queue).await {
        Ok(texture) => texture,
        Err(e) => {
            log::error!("Failed to load texture {file_name}: {e:#}");
            Texture::create_solid(device, queue, FALLBACK_RGBA, file_name)
        }
    }
}

/**
 * Replace every missing cubemap face with a solid face.
 *
 * Missing faces take the size of the first face that did load, so the six
 * layers stay uniform. When none loaded, all faces are 1x1.
 */
pub fn fill_missing_faces(faces: [Option<image::RgbaImage>; 6], rgba: [u8; 4]) -> [image::RgbaImage; 6] {
    let (width, height) = faces
        .iter()
        .flatten()
        .next()
        .map_or((1, 1), |face| face.dimensions());
    faces.map(|face| {
        face.unwrap_or_else(|| image::RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    })
}

/// Load the six skybox faces (+X, -X, +Y, -Y, +Z, -Z) into one cubemap.
pub async fn load_cubemap(
    faces: &[String; 6],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let loaded = futures::future::join_all(faces.iter().map(|face| async move {
        match load_image(face).await {
            Ok(img) => Some(img),
            Err(e) => {
                log::error!("Failed to load cubemap face {face}: {e:#}");
                None
            }
        }
    }))
    .await;
    let loaded: [Option<image::RgbaImage>; 6] = loaded
        .try_into()
        .map_err(|_| anyhow::anyhow!("a cubemap needs exactly six faces"))?;
    let faces = fill_missing_faces(loaded, FALLBACK_RGBA);
    Texture::create_cubemap(device, queue, &faces, "skybox")
}
