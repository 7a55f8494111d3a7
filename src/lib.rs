//! lakeside
//!
//! An animated lakeside scene rendered with wgpu: procedurally generated
//! terrain with a carved lake, a sparse water surface, a scattered forest,
//! a bobbing boat and swimming fish under a skybox, lit by one directional
//! light with a shadow map.
//!
//! High-level modules
//! - `config`: every tunable of the scene in one struct
//! - `camera`: fly camera, controller and projection
//! - `context`: window and GPU context with the surface-sized state
//! - `data_structures`: meshes, textures, generators and the scene graph
//! - `animation`: per-frame animation and world transform propagation
//! - `scene`: construction of the lakeside scene and shadow-pass preparation
//! - `pipelines`: render pipelines and their uniform layouts
//! - `render`: draw planning and the two-pass renderer
//! - `resources`: asset loading and the GPU asset registry
//! - `flow`: the event loop
//!

pub mod animation;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

pub use config::SceneConfig;
