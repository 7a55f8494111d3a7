use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};
use lakeside::{
    config::SceneConfig,
    data_structures::scene_graph::NodeTag,
    pipelines::{
        basic::{NodeUniform, ShadingFlags},
        light::{LIGHT_INTENSITY, LightUniform, SPECULAR_STRENGTH},
        shadow::{light_space_matrix, shadow_map_size},
        skybox::{SKYBOX_VERTEX_COUNT, cube_vertices},
    },
};

use crate::common::test_utils::{EPSILON, assert_close};

mod common;

#[test]
fn should_scale_every_light_term_from_the_colour() {
    let uniform = LightUniform::from_light(Vector3::new(0.0, -1.0, 0.0), Vector3::new(1.0, 0.5, 0.0));
    let scaled = [LIGHT_INTENSITY, 0.5 * LIGHT_INTENSITY, 0.0, 0.0];

    assert_eq!(uniform.direction, [0.0, -1.0, 0.0, 0.0]);
    assert_eq!(uniform.ambient, scaled);
    assert_eq!(uniform.diffuse, scaled);
    assert_eq!(uniform.color, scaled);
    assert_eq!(
        uniform.specular,
        [SPECULAR_STRENGTH, SPECULAR_STRENGTH, SPECULAR_STRENGTH, 0.0]
    );
}

#[test]
fn should_clamp_the_shadow_map_to_the_device() {
    assert_eq!(shadow_map_size(4096, 8192), 4096);
    assert_eq!(shadow_map_size(4096, 2048), 2048);
    assert_eq!(shadow_map_size(0, 2048), 1);
}

#[test]
fn should_project_the_terrain_into_the_shadow_map() {
    let config = SceneConfig::default();
    let matrix = light_space_matrix(&config.shadow, config.light_direction);
    let half = config.half_extent();

    for (x, z) in [(-half, -half), (half, half), (0.0, 0.0), (half, -half)] {
        for y in [-20.0, 0.0, 20.0] {
            let clip = matrix * Vector4::new(x, y, z, 1.0);
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "({x}, {y}, {z}) -> {ndc:?}");
            assert!((0.0..=1.0).contains(&ndc.z), "({x}, {y}, {z}) depth {}", ndc.z);
        }
    }
}

#[test]
fn should_handle_a_light_pointing_straight_down() {
    let config = SceneConfig::default();
    let matrix = light_space_matrix(&config.shadow, Vector3::new(0.0, -1.0, 0.0));
    assert!(matrix.invert().is_some());
    let clip = matrix * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert!(clip.x.is_finite() && clip.y.is_finite() && clip.z.is_finite());
}

#[test]
fn should_flag_nodes_by_tag() {
    assert_eq!(
        ShadingFlags::from(NodeTag::Tree),
        ShadingFlags {
            is_tree: true,
            ..Default::default()
        }
    );
    assert!(ShadingFlags::from(NodeTag::Water).is_water);
    assert!(ShadingFlags::from(NodeTag::Boat).is_boat);
    assert_eq!(ShadingFlags::from(NodeTag::Fish), ShadingFlags::default());
}

#[test]
fn should_pack_node_uniforms() {
    let model = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0))
        * Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
    let uniform = NodeUniform::new(
        model,
        ShadingFlags {
            is_water: true,
            ..Default::default()
        },
    );

    assert_eq!(uniform.flags, [0, 1, 0, 1]);
    let stored: Matrix4<f32> = uniform.model.into();
    assert_eq!(stored, model);
    // Normals scale by the inverse of the model's scale.
    let normal: Matrix4<f32> = uniform.normal.into();
    assert_close(normal.x.x, 0.5);
    assert_close(normal.y.y, 1.0);
}

#[test]
fn should_fall_back_to_identity_normals_for_singular_models() {
    let uniform = NodeUniform::new(
        Matrix4::from_nonuniform_scale(1.0, 0.0, 1.0),
        ShadingFlags::default(),
    );
    let normal: Matrix4<f32> = uniform.normal.into();
    assert_eq!(normal, Matrix4::identity());
}

#[test]
fn should_build_a_closed_unit_cube() {
    let vertices = cube_vertices();
    assert_eq!(vertices.len() as u32, SKYBOX_VERTEX_COUNT);
    for vertex in &vertices {
        assert!(vertex.position.iter().all(|c| (c.abs() - 1.0).abs() < EPSILON));
    }
    // Every face contributes two triangles that lie on it.
    for face in vertices.chunks_exact(6) {
        let axis = (0..3)
            .find(|&axis| face.iter().all(|v| v.position[axis] == face[0].position[axis]))
            .expect("face is axis aligned");
        assert!(face.iter().all(|v| v.position[axis].abs() == 1.0));
    }
}
