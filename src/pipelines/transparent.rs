use crate::{
    data_structures::model::{ModelVertex, Vertex},
    pipelines::basic::{SceneLayouts, depth_state, mk_render_pipeline, scene_shader},
};

/**
 * The scene pipeline with alpha blending, used for the water surface.
 *
 * It shares shader and layouts with the basic pipeline. The water is drawn
 * after every opaque node so the lake bed shows through it.
 */
pub fn mk_transparent_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    layouts: &SceneLayouts,
) -> wgpu::RenderPipeline {
    mk_render_pipeline(
        device,
        &layouts.mk_pipeline_layout(device),
        "Transparent Pipeline",
        Some(config.format),
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(depth_state(true, wgpu::CompareFunction::Less)),
        &[ModelVertex::desc()],
        scene_shader(),
    )
}
