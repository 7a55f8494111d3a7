//! Frame rendering: a depth pass from the light followed by the colour pass.
//!
//! Drawing is split in two steps. Planning walks the scene graph and turns it
//! into a flat list of [`DrawCommand`]s without touching the GPU, so draw order
//! and light handling can be checked in tests. The [`Renderer`] then records
//! both passes from those lists.
//!
//! # Key types
//!
//! - [`DrawCommand`] is one draw of the colour pass
//! - [`ColorPassPlan`] is the ordered command list plus the light uniform
//! - [`Renderer`] owns the pipelines and per-frame buffers

use std::{collections::HashSet, iter};

use anyhow::Context as _;
use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector4};

use crate::{
    config::{SceneConfig, ShadowConfig},
    context::Context,
    data_structures::{
        scene_graph::{Geometry, NodeId, NodeKind, NodeTag, SceneGraph},
        texture::Texture,
    },
    pipelines::{
        basic::{
            GlobalsUniform, NodeUniform, SceneLayouts, ShadingFlags, mk_basic_pipeline,
            mk_globals_layout, mk_node_layout, to_vec4,
        },
        light::{LightResources, LightUniform},
        shadow::{
            ShadowUniform, light_space_matrix, mk_shadow_globals_layout, mk_shadow_pipeline,
            shadow_map_size,
        },
        skybox::{SKYBOX_VERTEX_COUNT, mk_cube_buffer, mk_skybox_pipeline},
        transparent::mk_transparent_pipeline,
    },
    resources::{Assets, BoundTexture, TextureHandle, texture::FALLBACK_RGBA},
    scene::{Scene, ShadowCaster},
};

/// One draw of the colour pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Skybox {
        node: NodeId,
        world_matrix: Matrix4<f32>,
        cubemap: TextureHandle,
    },
    Geometry {
        node: NodeId,
        world_matrix: Matrix4<f32>,
        geometry: Geometry,
        flags: ShadingFlags,
    },
}

impl DrawCommand {
    pub fn node(&self) -> NodeId {
        match self {
            DrawCommand::Skybox { node, .. } | DrawCommand::Geometry { node, .. } => *node,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ColorPassPlan {
    pub commands: Vec<DrawCommand>,
    /// Uniform of the last light node visited.
    pub light: Option<LightUniform>,
    /// Light nodes beyond the first. Each one overwrote the previous uniform.
    pub extra_lights: usize,
    /// Geometry nodes skipped because their mesh has no indices.
    pub empty: Vec<NodeId>,
}

/**
 * Order the colour pass.
 *
 * The root's children are stably reordered so the water comes last, then the
 * graph is walked in pre-order. Light nodes produce no draw but set the light
 * uniform; when there is more than one the last wins.
 */
pub fn plan_color_pass(graph: &mut SceneGraph) -> ColorPassPlan {
    let root = graph.root();
    graph.move_children_last(root, |node| node.tag == NodeTag::Water);

    let mut plan = ColorPassPlan::default();
    for id in graph.pre_order(root) {
        let node = graph.node(id);
        match node.kind() {
            NodeKind::Skybox => {
                if let Some(cubemap) = node.cubemap {
                    plan.commands.push(DrawCommand::Skybox {
                        node: id,
                        world_matrix: node.world_matrix,
                        cubemap,
                    });
                }
            }
            NodeKind::Geometry => match node.geometry {
                Some(geometry) if geometry.index_count == 0 => plan.empty.push(id),
                Some(geometry) => plan.commands.push(DrawCommand::Geometry {
                    node: id,
                    world_matrix: node.world_matrix,
                    geometry,
                    flags: node.tag.into(),
                }),
                None => (),
            },
            NodeKind::DirectionalLight => {
                if plan.light.is_some() {
                    plan.extra_lights += 1;
                }
                plan.light = Some(LightUniform::from_light(
                    node.light_direction.normalize(),
                    node.light_color,
                ));
            }
        }
    }
    plan
}

/// Shadow casters that actually have triangles to draw.
pub fn drawable_casters(casters: Vec<ShadowCaster>) -> Vec<ShadowCaster> {
    casters
        .into_iter()
        .filter(|caster| caster.geometry.index_count > 0)
        .collect()
}

/// Camera view with its translation removed, so the sky stays centred on the eye.
pub fn rotation_only(view: Matrix4<f32>) -> Matrix4<f32> {
    let mut rotation = view;
    rotation.w = Vector4::new(0.0, 0.0, 0.0, 1.0);
    rotation
}

fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

/// Per-draw uniforms for both passes, packed at a fixed stride in one buffer.
struct NodeUniforms {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    layout: wgpu::BindGroupLayout,
    stride: u32,
    capacity: u32,
    staging: Vec<u8>,
}

impl NodeUniforms {
    fn new(device: &wgpu::Device) -> Self {
        let layout = mk_node_layout(device);
        let alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let stride = align_to(std::mem::size_of::<NodeUniform>() as u32, alignment);
        let capacity = 64;
        let buffer = Self::mk_buffer(device, stride, capacity);
        let bind_group = Self::mk_bind_group(device, &layout, &buffer);
        Self {
            buffer,
            bind_group,
            layout,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    fn mk_buffer(device: &wgpu::Device, stride: u32, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Node Uniform Buffer"),
            size: u64::from(stride) * u64::from(capacity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn mk_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("node_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<NodeUniform>() as u64),
                }),
            }],
        })
    }

    /// Upload `uniforms`; slot `i` lives at offset `i * stride`.
    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, uniforms: &[NodeUniform]) {
        let required = uniforms.len() as u32;
        if required > self.capacity {
            let mut capacity = self.capacity.max(1);
            while capacity < required {
                capacity = capacity.saturating_mul(2);
            }
            log::debug!("growing node uniform buffer to {capacity} slots");
            self.buffer = Self::mk_buffer(device, self.stride, capacity);
            self.bind_group = Self::mk_bind_group(device, &self.layout, &self.buffer);
            self.capacity = capacity;
        }

        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(uniforms.len() * stride, 0);
        for (slot, uniform) in self.staging.chunks_exact_mut(stride).zip(uniforms) {
            let bytes = bytemuck::bytes_of(uniform);
            slot[..bytes.len()].copy_from_slice(bytes);
        }
        if !self.staging.is_empty() {
            queue.write_buffer(&self.buffer, 0, &self.staging);
        }
    }

    fn offset(&self, slot: usize) -> u32 {
        slot as u32 * self.stride
    }
}

/// Pipelines and GPU state for drawing the lakeside scene.
pub struct Renderer {
    basic: wgpu::RenderPipeline,
    transparent: wgpu::RenderPipeline,
    shadow: wgpu::RenderPipeline,
    skybox: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    shadow_buffer: wgpu::Buffer,
    shadow_bind_group: wgpu::BindGroup,
    light: LightResources,
    nodes: NodeUniforms,
    shadow_map: Texture,
    shadow_config: ShadowConfig,
    cube: wgpu::Buffer,
    fallback: BoundTexture,
    warned_lights: bool,
    warned_empty: HashSet<NodeId>,
}

impl Renderer {
    pub fn new(ctx: &Context, assets: &Assets, config: &SceneConfig) -> anyhow::Result<Self> {
        let device = &ctx.device;

        let size = shadow_map_size(
            config.shadow.map_size,
            device.limits().max_texture_dimension_2d,
        );
        let shadow_map = Texture::create_shadow_map(device, size);
        let shadow_sampler = shadow_map
            .sampler
            .as_ref()
            .context("shadow map was created without a comparison sampler")?;

        let globals_layout = mk_globals_layout(device);
        let globals_buffer = uniform_buffer(device, "Globals Buffer", &GlobalsUniform::default());
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(shadow_sampler),
                },
            ],
        });

        let shadow_layout = mk_shadow_globals_layout(device);
        let shadow_buffer = uniform_buffer(
            device,
            "Shadow Buffer",
            &ShadowUniform {
                light_space: Matrix4::identity().into(),
            },
        );
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_bind_group"),
            layout: &shadow_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_buffer.as_entire_binding(),
            }],
        });

        let light = LightResources::new(device, LightUniform::default());
        let nodes = NodeUniforms::new(device);

        let layouts = SceneLayouts {
            globals: &globals_layout,
            light: &light.bind_group_layout,
            node: &nodes.layout,
            texture: &assets.texture_layout,
        };
        let basic = mk_basic_pipeline(device, &ctx.config, &layouts);
        let transparent = mk_transparent_pipeline(device, &ctx.config, &layouts);
        let shadow = mk_shadow_pipeline(device, &shadow_layout, &nodes.layout);
        let skybox = mk_skybox_pipeline(device, &ctx.config, &globals_layout, &assets.cubemap_layout);

        let fallback_texture = Texture::create_solid(device, &ctx.queue, FALLBACK_RGBA, "fallback");
        let fallback = BoundTexture {
            bind_group: crate::resources::texture::mk_bind_group(
                device,
                &assets.texture_layout,
                &fallback_texture,
                "fallback",
            ),
            texture: fallback_texture,
        };

        log::info!("renderer ready, shadow map {size}x{size}");

        Ok(Self {
            basic,
            transparent,
            shadow,
            skybox,
            globals_buffer,
            globals_bind_group,
            shadow_buffer,
            shadow_bind_group,
            light,
            nodes,
            shadow_map,
            shadow_config: config.shadow.clone(),
            cube: mk_cube_buffer(device),
            fallback,
            warned_lights: false,
            warned_empty: HashSet::new(),
        })
    }

    /**
     * Draw one frame.
     *
     * The shadow casters are collected first (this re-propagates the graph
     * with the boat lifted and then restores it), followed by planning the
     * colour pass against the restored matrices. Both passes are recorded into
     * one encoder and presented.
     */
    pub fn render(
        &mut self,
        ctx: &Context,
        scene: &mut Scene,
        assets: &Assets,
    ) -> Result<(), wgpu::SurfaceError> {
        let casters = drawable_casters(scene.prepare_shadow_casters());
        let plan = plan_color_pass(&mut scene.graph);
        self.report(&plan);

        if let Some(light) = plan.light {
            self.light.write(&ctx.queue, light);
        }

        let light_space = light_space_matrix(&self.shadow_config, scene.light_direction());
        ctx.queue.write_buffer(
            &self.shadow_buffer,
            0,
            bytemuck::cast_slice(&[ShadowUniform {
                light_space: light_space.into(),
            }]),
        );

        let view = ctx.camera.calc_matrix();
        let projection = ctx.projection.calc_matrix();
        let sky_model = plan
            .commands
            .iter()
            .find_map(|command| match command {
                DrawCommand::Skybox { world_matrix, .. } => Some(rotation_only(*world_matrix)),
                _ => None,
            })
            .unwrap_or_else(Matrix4::identity);
        let camera = ctx.camera.position;
        let globals = GlobalsUniform {
            view_proj: (projection * view).into(),
            sky_view_proj: (projection * rotation_only(view) * sky_model).into(),
            light_space: light_space.into(),
            camera_pos: [camera.x, camera.y, camera.z, 1.0],
            boat_pos: to_vec4(scene.boat_position()),
            time: [scene.clock.time, 0.0, 0.0, 0.0],
        };
        ctx.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::cast_slice(&[globals]));

        // Shadow casters take the first slots, colour draws follow.
        let mut uniforms: Vec<NodeUniform> = casters
            .iter()
            .map(|caster| NodeUniform::new(caster.world_matrix, ShadingFlags::default()))
            .collect();
        let color_base = uniforms.len();
        uniforms.extend(plan.commands.iter().filter_map(|command| match command {
            DrawCommand::Geometry {
                world_matrix,
                flags,
                ..
            } => Some(NodeUniform::new(*world_matrix, *flags)),
            DrawCommand::Skybox { .. } => None,
        }));
        self.nodes.write(&ctx.device, &ctx.queue, &uniforms);

        let output = ctx.surface.get_current_texture()?;
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            shadow_pass.set_pipeline(&self.shadow);
            shadow_pass.set_bind_group(0, &self.shadow_bind_group, &[]);
            for (slot, caster) in casters.iter().enumerate() {
                let Some(mesh) = assets.mesh(caster.geometry.mesh) else {
                    continue;
                };
                shadow_pass.set_bind_group(1, &self.nodes.bind_group, &[self.nodes.offset(slot)]);
                shadow_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                shadow_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                shadow_pass.draw_indexed(0..caster.geometry.index_count, 0, 0..1);
            }
        }

        {
            let mut color_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Colour Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            let mut slot = color_base;
            for command in &plan.commands {
                match command {
                    DrawCommand::Skybox { cubemap, .. } => {
                        let Some(cubemap) = assets.texture(*cubemap) else {
                            continue;
                        };
                        color_pass.set_pipeline(&self.skybox);
                        color_pass.set_bind_group(0, &self.globals_bind_group, &[]);
                        color_pass.set_bind_group(1, &cubemap.bind_group, &[]);
                        color_pass.set_vertex_buffer(0, self.cube.slice(..));
                        color_pass.draw(0..SKYBOX_VERTEX_COUNT, 0..1);
                    }
                    DrawCommand::Geometry {
                        geometry, flags, ..
                    } => {
                        let offset = self.nodes.offset(slot);
                        slot += 1;
                        let Some(mesh) = assets.mesh(geometry.mesh) else {
                            continue;
                        };
                        let texture = geometry
                            .texture
                            .and_then(|handle| assets.texture(handle))
                            .unwrap_or(&self.fallback);
                        color_pass.set_pipeline(if flags.is_water {
                            &self.transparent
                        } else {
                            &self.basic
                        });
                        color_pass.set_bind_group(0, &self.globals_bind_group, &[]);
                        color_pass.set_bind_group(1, &self.light.bind_group, &[]);
                        color_pass.set_bind_group(2, &self.nodes.bind_group, &[offset]);
                        color_pass.set_bind_group(3, &texture.bind_group, &[]);
                        color_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                        color_pass
                            .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        color_pass.draw_indexed(0..geometry.index_count, 0, 0..1);
                    }
                }
            }
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn report(&mut self, plan: &ColorPassPlan) {
        if plan.extra_lights > 0 && !self.warned_lights {
            log::warn!(
                "{} extra directional light(s) in the scene, only the last one is used",
                plan.extra_lights
            );
            self.warned_lights = true;
        }
        for node in &plan.empty {
            if self.warned_empty.insert(*node) {
                log::warn!("{node:?} has geometry without indices and is not drawn");
            }
        }
    }
}

fn uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, label: &str, value: &T) -> wgpu::Buffer {
    use wgpu::util::DeviceExt;
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}
