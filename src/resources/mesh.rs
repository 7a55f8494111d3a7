use std::io::{BufReader, Cursor};

use anyhow::Context as _;

use crate::{
    data_structures::model::{MeshData, ModelVertex},
    resources::load_string,
};

/**
 * Parse Wavefront OBJ text into a single triangle mesh.
 *
 * Polygons are fan-triangulated and position/uv/normal indices are unified
 * into one index per vertex. All objects and groups of the file are merged.
 * Materials are ignored: every model in the scene gets its texture from the
 * scene setup, not from an `.mtl` file.
 *
 * A malformed face fails the whole parse.
 */
pub async fn parse_obj(text: &str) -> anyhow::Result<MeshData> {
    let mut reader = BufReader::new(Cursor::new(text));
    let (models, _) = tobj::load_obj_buf_async(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| async { Err(tobj::LoadError::OpenFileFailed) },
    )
    .await?;

    let mut data = MeshData::default();
    for m in models {
        let offset = data.vertices.len() as u32;
        let mesh = &m.mesh;
        data.vertices
            .extend((0..mesh.positions.len() / 3).map(|i| ModelVertex {
                position: [
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ],
                // OBJ puts v = 0 at the bottom of the image, wgpu at the top
                tex_coords: [
                    mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                    1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
                ],
                normal: [
                    mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                    mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                    mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
                ],
            }));
        data.indices
            .extend(mesh.indices.iter().map(|index| index + offset));
    }
    Ok(data)
}

pub async fn load_mesh(file_name: &str) -> anyhow::Result<MeshData> {
    let text = load_string(file_name).await?;
    let data = parse_obj(&text)
        .await
        .with_context(|| format!("malformed OBJ in {file_name}"))?;
    log::debug!(
        "loaded {file_name}: {} vertices, {} indices",
        data.vertices.len(),
        data.indices.len()
    );
    Ok(data)
}

/// Load a model, or log the failure and return an empty mesh that draws nothing.
pub async fn load_mesh_or_empty(file_name: &str) -> MeshData {
    match load_mesh(file_name).await {
        Ok(data) => data,
        Err(e) => {
            log::error!("Failed to load model {file_name}: {e:#}");
            MeshData::default()
        }
    }
}
