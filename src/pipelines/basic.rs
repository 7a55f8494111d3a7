use cgmath::{Matrix, Matrix4, SquareMatrix, Vector3};

use crate::data_structures::{
    model::{ModelVertex, Vertex},
    scene_graph::NodeTag,
    texture::Texture,
};

/// Per-frame values shared by every draw of the colour pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Camera rotation without translation, for the skybox.
    pub sky_view_proj: [[f32; 4]; 4],
    pub light_space: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub boat_pos: [f32; 4],
    /// Elapsed seconds in `x`.
    pub time: [f32; 4],
}

impl Default for GlobalsUniform {
    fn default() -> Self {
        let identity = Matrix4::<f32>::identity().into();
        Self {
            view_proj: identity,
            sky_view_proj: identity,
            light_space: identity,
            camera_pos: [0.0; 4],
            boat_pos: [0.0; 4],
            time: [0.0; 4],
        }
    }
}

/// Shading treatment selected per geometry node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShadingFlags {
    pub is_tree: bool,
    pub is_water: bool,
    pub is_boat: bool,
}

impl From<NodeTag> for ShadingFlags {
    fn from(tag: NodeTag) -> Self {
        Self {
            is_tree: tag == NodeTag::Tree,
            is_water: tag == NodeTag::Water,
            is_boat: tag == NodeTag::Boat,
        }
    }
}

/// Per-draw values, stored at a dynamic offset in one shared buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    /// is_tree, is_water, is_boat, is_geometry
    pub flags: [u32; 4],
}

impl NodeUniform {
    pub fn new(model: Matrix4<f32>, flags: ShadingFlags) -> Self {
        let normal = model
            .invert()
            .map_or(Matrix4::identity(), |inverse| inverse.transpose());
        Self {
            model: model.into(),
            normal: normal.into(),
            flags: [
                flags.is_tree as u32,
                flags.is_water as u32,
                flags.is_boat as u32,
                1,
            ],
        }
    }
}

pub fn to_vec4(v: Vector3<f32>) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    has_dynamic_offset: bool,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    }
}

/// Globals plus the shadow map and its comparison sampler.
pub fn mk_globals_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                false,
                std::mem::size_of::<GlobalsUniform>(),
            ),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Depth,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
        label: Some("globals_bind_group_layout"),
    })
}

pub fn mk_node_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_entry(
            0,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            true,
            std::mem::size_of::<NodeUniform>(),
        )],
        label: Some("node_bind_group_layout"),
    })
}

/// Bind group layouts shared by the opaque and the transparent scene pipelines.
pub struct SceneLayouts<'a> {
    pub globals: &'a wgpu::BindGroupLayout,
    pub light: &'a wgpu::BindGroupLayout,
    pub node: &'a wgpu::BindGroupLayout,
    pub texture: &'a wgpu::BindGroupLayout,
}

impl SceneLayouts<'_> {
    pub fn mk_pipeline_layout(&self, device: &wgpu::Device) -> wgpu::PipelineLayout {
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[Some(self.globals), Some(self.light), Some(self.node), Some(self.texture)],
            immediate_size: 0,
        })
    }
}

pub fn scene_shader() -> wgpu::ShaderModuleDescriptor<'static> {
    wgpu::ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
    }
}

pub fn mk_basic_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    layouts: &SceneLayouts,
) -> wgpu::RenderPipeline {
    mk_render_pipeline(
        device,
        &layouts.mk_pipeline_layout(device),
        "Basic Pipeline",
        Some(config.format),
        Some(wgpu::BlendState::REPLACE),
        Some(depth_state(true, wgpu::CompareFunction::Less)),
        &[ModelVertex::desc()],
        scene_shader(),
    )
}

pub fn depth_state(write: bool, compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: Texture::DEPTH_FORMAT,
        depth_write_enabled: Some(write),
        depth_compare: Some(compare),
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/**
 * Build a triangle-list pipeline with `vs_main` / `fs_main` entry points.
 *
 * Without a `color_format` no fragment stage is attached and the pipeline
 * only writes depth. Faces are not culled: the imported models are not
 * guaranteed to be closed or consistently wound.
 */
#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    label: &str,
    color_format: Option<wgpu::TextureFormat>,
    blend: Option<wgpu::BlendState>,
    depth_stencil: Option<wgpu::DepthStencilState>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);
    let targets = [color_format.map(|format| wgpu::ColorTargetState {
        format,
        blend,
        write_mask: wgpu::ColorWrites::ALL,
    })];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: color_format.map(|_| wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &targets,
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
