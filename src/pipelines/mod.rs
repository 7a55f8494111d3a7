//! Render pipelines and the uniform layouts they bind.
//!
//! - `basic` is the opaque scene pipeline and the shared pipeline builder
//! - `transparent` draws the alpha blended water with the same shader
//! - `light` holds the directional light uniform
//! - `shadow` renders the depth map from the light
//! - `skybox` draws the cubemap behind everything else

pub mod basic;
pub mod light;
pub mod shadow;
pub mod skybox;
pub mod transparent;
