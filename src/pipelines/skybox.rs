use wgpu::util::DeviceExt;

use crate::{
    data_structures::model::Vertex,
    pipelines::basic::{depth_state, mk_render_pipeline},
};

pub const SKYBOX_VERTEX_COUNT: u32 = 36;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyboxVertex {
    pub position: [f32; 3],
}

impl Vertex for SkyboxVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SkyboxVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Cube spanning -1..1 on every axis as twelve unindexed triangles.
pub fn cube_vertices() -> Vec<SkyboxVertex> {
    // (face centre, first in-face axis, second in-face axis)
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let corner = |n: [f32; 3], a: [f32; 3], b: [f32; 3], sa: f32, sb: f32| SkyboxVertex {
        position: [
            n[0] + a[0] * sa + b[0] * sb,
            n[1] + a[1] * sa + b[1] * sb,
            n[2] + a[2] * sa + b[2] * sb,
        ],
    };
    faces
        .iter()
        .flat_map(|&(n, a, b)| {
            [
                corner(n, a, b, -1.0, -1.0),
                corner(n, a, b, 1.0, -1.0),
                corner(n, a, b, 1.0, 1.0),
                corner(n, a, b, -1.0, -1.0),
                corner(n, a, b, 1.0, 1.0),
                corner(n, a, b, -1.0, 1.0),
            ]
        })
        .collect()
}

pub fn mk_cube_buffer(device: &wgpu::Device) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Skybox Vertex Buffer"),
        contents: bytemuck::cast_slice(&cube_vertices()),
        usage: wgpu::BufferUsages::VERTEX,
    })
}

/**
 * The skybox is drawn at the far plane around the camera. It passes the
 * depth test only where nothing closer was drawn and never writes depth.
 */
pub fn mk_skybox_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    globals_layout: &wgpu::BindGroupLayout,
    cubemap_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Skybox Pipeline Layout"),
        bind_group_layouts: &[Some(globals_layout), Some(cubemap_layout)],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Skybox Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("skybox.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        "Skybox Pipeline",
        Some(config.format),
        Some(wgpu::BlendState::REPLACE),
        Some(depth_state(false, wgpu::CompareFunction::LessEqual)),
        &[SkyboxVertex::desc()],
        shader,
    )
}
