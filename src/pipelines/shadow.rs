//! Depth-only pass rendered from the light.
//!
//! The light is directional, so its camera is orthographic. The frustum has a
//! fixed size and must cover the whole terrain: anything outside it casts no
//! shadow and nothing reports that.

use cgmath::{InnerSpace, Matrix4, Point3, Vector3, ortho};

use crate::{
    camera::OPENGL_TO_WGPU_MATRIX,
    config::ShadowConfig,
    data_structures::model::{ModelVertex, Vertex},
    pipelines::basic::{depth_state, mk_render_pipeline},
};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniform {
    pub light_space: [[f32; 4]; 4],
}

/// Clamp the requested shadow map edge to what the device can allocate.
pub fn shadow_map_size(requested: u32, device_limit: u32) -> u32 {
    if requested > device_limit {
        log::error!(
            "Shadow map of {requested}x{requested} exceeds the device limit, using {device_limit}x{device_limit}"
        );
    }
    requested.min(device_limit).max(1)
}

/**
 * Orthographic projection times a view looking from `config.eye` along the
 * light direction.
 */
pub fn light_space_matrix(config: &ShadowConfig, direction: Vector3<f32>) -> Matrix4<f32> {
    let h = config.half_extent;
    let projection = OPENGL_TO_WGPU_MATRIX * ortho(-h, h, -h, h, config.near, config.far);
    let eye = Point3::new(config.eye.x, config.eye.y, config.eye.z);
    // A light pointing straight down would make the usual up vector degenerate
    let up = if direction.normalize().y.abs() > 0.999 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };
    let view = Matrix4::look_at_rh(eye, eye + direction, up);
    projection * view
}

pub fn mk_shadow_globals_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("shadow_bind_group_layout"),
    })
}

pub fn mk_shadow_pipeline(
    device: &wgpu::Device,
    shadow_layout: &wgpu::BindGroupLayout,
    node_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Shadow Pipeline Layout"),
        bind_group_layouts: &[Some(shadow_layout), Some(node_layout)],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Shadow Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
    };
    let mut depth = depth_state(true, wgpu::CompareFunction::LessEqual);
    depth.bias = wgpu::DepthBiasState {
        constant: 2,
        slope_scale: 2.0,
        clamp: 0.0,
    };
    mk_render_pipeline(
        device,
        &layout,
        "Shadow Pipeline",
        None,
        None,
        Some(depth),
        &[ModelVertex::desc()],
        shader,
    )
}
