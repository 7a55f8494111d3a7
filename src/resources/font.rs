//! Quad-per-character text meshes for a 128-column glyph atlas.

use crate::data_structures::model::{MeshData, ModelVertex};

/// Number of glyph columns in the atlas; a character's column is its code.
pub const ATLAS_COLUMNS: u32 = 128;
pub const PRINTABLE: std::ops::RangeInclusive<u32> = 32..=126;

/// Lay `text` out along +X in the Z = 0 plane, `total_width` wide.
///
/// Every printable ASCII character gets four vertices and six indices.
/// Anything else keeps its slot on the baseline but emits nothing, leaving a gap.
pub fn text_mesh(text: &str, height_over_width: f32, total_width: f32) -> MeshData {
    let len = text.chars().count();
    if len == 0 {
        return MeshData::default();
    }
    let char_width = total_width / len as f32;
    let char_height = height_over_width * char_width;
    let cell = 1.0 / ATLAS_COLUMNS as f32;

    let mut mesh = MeshData::default();
    for (i, ch) in text.chars().enumerate() {
        let code = ch as u32;
        if !PRINTABLE.contains(&code) {
            continue;
        }
        let x0 = i as f32 * char_width;
        let x1 = x0 + char_width;
        let u0 = code as f32 * cell;
        let u1 = u0 + cell;

        let base = mesh.vertices.len() as u32;
        let corner = |x: f32, y: f32, u: f32, v: f32| ModelVertex {
            position: [x, y, 0.0],
            tex_coords: [u, v],
            normal: [0.0, 0.0, 1.0],
        };
        mesh.vertices.extend_from_slice(&[
            corner(x0, 0.0, u0, 0.0),
            corner(x1, 0.0, u1, 0.0),
            corner(x1, char_height, u1, 1.0),
            corner(x0, char_height, u0, 1.0),
        ]);
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}
