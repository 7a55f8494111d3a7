use lakeside::resources::{
    font::{ATLAS_COLUMNS, text_mesh},
    mesh::{load_mesh_or_empty, parse_obj},
    texture::{FALLBACK_RGBA, fill_missing_faces},
};

use crate::common::test_utils::{assert_close, block_on};

mod common;

const TRIANGLE: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";

const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

#[test]
fn should_parse_a_textured_triangle() {
    let mesh = block_on(parse_obj(TRIANGLE)).unwrap();

    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.indices.len(), 3);
    let second = mesh.vertices[mesh.indices[1] as usize];
    assert_eq!(second.position, [1.0, 0.0, 0.0]);
    assert_eq!(second.normal, [0.0, 0.0, 1.0]);
    // V is flipped for wgpu's top-left texture origin.
    assert_eq!(second.tex_coords, [1.0, 1.0]);
}

#[test]
fn should_fan_triangulate_polygons() {
    let mesh = block_on(parse_obj(QUAD)).unwrap();

    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.indices.len(), 6);
    let triangles: Vec<_> = mesh
        .triangles()
        .map(|t| t.map(|v| v.position))
        .collect();
    // Every triangle of the fan shares the first corner.
    assert!(triangles.iter().all(|t| t.contains(&[0.0, 0.0, 0.0])));
    // Missing normals and uvs default to zero.
    assert!(mesh.vertices.iter().all(|v| v.normal == [0.0; 3]));
}

#[test]
fn should_accept_every_face_index_form() {
    for face in ["f 1 2 3", "f 1/1 2/1 3/1", "f 1//1 2//1 3//1", "f 1/1/1 2/1/1 3/1/1"] {
        let text = format!("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.5\nvn 0 1 0\n{face}\n");
        let mesh = block_on(parse_obj(&text)).unwrap();
        assert_eq!(mesh.indices.len(), 3, "{face}");
        assert_eq!(mesh.vertices.len(), 3, "{face}");
    }
}

#[test]
fn should_fail_on_malformed_faces() {
    let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 two 3
";
    assert!(block_on(parse_obj(text)).is_err());
}

#[test]
fn should_merge_objects_with_an_index_offset() {
    let text = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o second
v 0 0 5
v 1 0 5
v 0 1 5
f 4 5 6
";
    let mesh = block_on(parse_obj(text)).unwrap();
    assert_eq!(mesh.vertices.len(), 6);
    assert_eq!(mesh.indices.len(), 6);
    for triangle in mesh.triangles().skip(1) {
        assert!(triangle.iter().all(|v| v.position[2] == 5.0));
    }
}

#[test]
fn should_fall_back_to_an_empty_mesh_for_missing_models() {
    let mesh = block_on(load_mesh_or_empty("obj/does-not-exist.obj"));
    assert!(mesh.vertices.is_empty());
    assert_eq!(mesh.index_count(), 0);
}

#[test]
fn should_build_one_quad_per_printable_character() {
    let mesh = text_mesh("Hi!", 2.0, 3.0);
    assert_eq!(mesh.vertices.len(), 12);
    assert_eq!(mesh.indices.len(), 18);

    // 'H' is code 72 and fills the first unit-wide slot, twice as tall.
    let h = &mesh.vertices[0..4];
    assert_close(h[0].tex_coords[0], 72.0 / ATLAS_COLUMNS as f32);
    assert_close(h[1].tex_coords[0], 73.0 / ATLAS_COLUMNS as f32);
    assert_eq!(h[0].position, [0.0, 0.0, 0.0]);
    assert_eq!(h[2].position, [1.0, 2.0, 0.0]);
    assert_eq!(&mesh.indices[6..12], &[4, 5, 6, 4, 6, 7]);
}

#[test]
fn should_leave_a_gap_for_unprintable_characters() {
    let mesh = text_mesh("a\tb", 1.0, 3.0);
    assert_eq!(mesh.vertices.len(), 8);
    // 'b' keeps the third slot.
    assert_close(mesh.vertices[4].position[0], 2.0);
}

#[test]
fn should_build_nothing_for_empty_text() {
    let mesh = text_mesh("", 1.0, 10.0);
    assert!(mesh.vertices.is_empty());
    assert!(mesh.indices.is_empty());
}

#[test]
fn should_fill_missing_cubemap_faces_with_the_loaded_size() {
    let loaded = image::RgbaImage::from_pixel(4, 2, image::Rgba([1, 2, 3, 4]));
    let faces = fill_missing_faces(
        [None, Some(loaded.clone()), None, None, None, None],
        FALLBACK_RGBA,
    );

    assert_eq!(faces[1], loaded);
    for (i, face) in faces.iter().enumerate().filter(|(i, _)| *i != 1) {
        assert_eq!(face.dimensions(), (4, 2), "face {i}");
        assert_eq!(face.get_pixel(0, 0).0, FALLBACK_RGBA);
    }
}

#[test]
fn should_fill_all_faces_when_none_loaded() {
    let faces = fill_missing_faces(Default::default(), [9, 9, 9, 255]);
    assert!(faces.iter().all(|face| face.dimensions() == (1, 1)));
}
