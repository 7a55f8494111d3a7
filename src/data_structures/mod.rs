//! Scene data structures: meshes, textures, generated geometry and the scene graph.
//!
//! - `model` contains the vertex layout, CPU mesh data and its GPU upload
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `terrain` generates the noise heightfield with the carved lake basin
//! - `water` generates the sparse lake surface
//! - `scene_graph` holds the node arena and hierarchical scene organization

pub mod model;
pub mod scene_graph;
pub mod terrain;
pub mod texture;
pub mod water;
