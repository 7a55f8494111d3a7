#![allow(dead_code)]

use cgmath::{Matrix4, Vector2};
use lakeside::{
    SceneConfig,
    data_structures::{
        scene_graph::{Geometry, NodeId, SceneGraph},
        terrain::{LakeShape, TerrainParams},
    },
    resources::{MeshHandle, TextureHandle},
    scene::SceneAssets,
};

pub const EPSILON: f32 = 1e-5;

pub fn geometry(id: usize, index_count: u32) -> Geometry {
    Geometry {
        mesh: MeshHandle(id),
        index_count,
        texture: Some(TextureHandle(id)),
    }
}

/// Handles standing in for uploaded assets. Every mesh has one triangle.
pub fn fake_assets() -> SceneAssets {
    SceneAssets {
        terrain: geometry(0, 3),
        water: geometry(1, 3),
        tree: geometry(2, 3),
        boat: geometry(3, 3),
        fish: geometry(4, 3),
        skybox: TextureHandle(5),
    }
}

/// The demo scene with fewer scattered objects.
pub fn small_config() -> SceneConfig {
    SceneConfig {
        tree_count: 5,
        fish_count: 3,
        ..Default::default()
    }
}

/// Terrain whose lake sits far outside the grid, so nothing is carved.
pub fn dry_terrain(size: u32) -> TerrainParams {
    TerrainParams::new(size, 4.0, 0.02)
        .with_lake(LakeShape::new(Vector2::new(10_000.0, 10_000.0), 5.0))
}

pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Runtime::new()
        .expect("failed to start a runtime")
        .block_on(future)
}

pub fn world_matrices(graph: &SceneGraph, ids: &[NodeId]) -> Vec<Matrix4<f32>> {
    ids.iter().map(|id| graph.node(*id).world_matrix).collect()
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}
