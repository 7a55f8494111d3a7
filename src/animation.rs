//! Procedural animation and world transform propagation.
//!
//! Every frame the scene graph is walked parent before children. Nodes whose
//! tag carries an [`AnimationRole`] get their position or rotation rewritten
//! from closed-form periodic functions of the frame clock, then the node's
//! local transform is composed with its parent's world matrix.

use cgmath::{Matrix4, SquareMatrix};

use crate::data_structures::scene_graph::{AnimationRole, NodeId, SceneGraph, SceneNode};

pub const SWIM_SPEED: f32 = 1.5;
/// Per-propagation horizontal step of a fish. Applied additively, so fish drift.
pub const SWIM_STEP: f32 = 0.02;
pub const SWIM_YAW: f32 = 30.0;

pub const SWAY_SPEED: f32 = 0.7;
pub const SWAY_ANGLE: f32 = 5.0;

pub const WAVE_STRENGTH: f32 = 0.6;
pub const WAVE_SPEED: f32 = 2.0;
pub const WAVE_FREQUENCY: f32 = 0.2;
pub const BOAT_BASE_HEIGHT: f32 = -2.5;
pub const BOAT_TILT: f32 = 2.0;

/// Elapsed scene time and whether the current propagation feeds the depth pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationClock {
    pub time: f32,
    pub shadow_pass: bool,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: f32) {
        self.time += dt.max(0.0);
    }

    /// The same instant, seen from the depth pass.
    pub fn for_shadow_pass(self) -> Self {
        Self {
            shadow_pass: true,
            ..self
        }
    }
}

/// Phase offset that keeps neighbouring objects out of step. Taken from the
/// local position, which equals the world position for children of the root.
fn positional_phase(node: &SceneNode) -> f32 {
    node.position.x * 0.1 + node.position.z * 0.1
}

pub fn swim(node: &mut SceneNode, time: f32) {
    let phase = time * SWIM_SPEED + positional_phase(node);
    node.position.x += phase.sin() * SWIM_STEP;
    node.position.z += phase.cos() * SWIM_STEP;
    node.rotation.y = phase.sin() * SWIM_YAW.to_radians();
}

pub fn sway(node: &mut SceneNode, time: f32) {
    let phase = time * SWAY_SPEED + positional_phase(node);
    node.rotation.x = phase.sin() * SWAY_ANGLE.to_radians();
    node.rotation.z = phase.cos() * SWAY_ANGLE.to_radians();
}

/// Height of the boat above its base: three superimposed waves.
pub fn wave_offset(x: f32, z: f32, time: f32) -> f32 {
    let wave1 = (time * WAVE_SPEED + x * WAVE_FREQUENCY).sin() * WAVE_STRENGTH;
    let wave2 = (time * WAVE_SPEED * 1.2 + z * WAVE_FREQUENCY * 1.5).cos() * WAVE_STRENGTH * 0.7;
    let wave3 =
        (time * WAVE_SPEED * 0.9 + (x + z) * WAVE_FREQUENCY * 1.1).sin() * WAVE_STRENGTH * 0.5;
    wave1 + wave2 + wave3
}

pub fn bob(node: &mut SceneNode, time: f32) {
    node.position.y = BOAT_BASE_HEIGHT + wave_offset(node.position.x, node.position.z, time);
    node.rotation.x = (time * 1.5).sin() * BOAT_TILT.to_radians();
    node.rotation.z = (time * 1.3).cos() * BOAT_TILT.to_radians();
}

pub fn animate(node: &mut SceneNode, clock: &AnimationClock) {
    match node.tag.animation_role() {
        AnimationRole::Swim => swim(node, clock.time),
        AnimationRole::Sway => sway(node, clock.time),
        // Holding the boat still keeps its shadow from jittering with the waves.
        AnimationRole::Bob if !clock.shadow_pass => bob(node, clock.time),
        AnimationRole::Bob | AnimationRole::None => {}
    }
}

/// Animate and recompute world matrices for the whole tree below the root.
pub fn propagate(graph: &mut SceneGraph, clock: &AnimationClock) {
    propagate_from(graph, graph.root(), Matrix4::identity(), clock);
}

/// Animate `start` and its descendants, with `parent_world` as the world
/// matrix of `start`'s parent.
pub fn propagate_from(
    graph: &mut SceneGraph,
    start: NodeId,
    parent_world: Matrix4<f32>,
    clock: &AnimationClock,
) {
    let mut stack = vec![(start, parent_world)];
    while let Some((id, parent_world)) = stack.pop() {
        let node = graph.node_mut(id);
        animate(node, clock);
        node.world_matrix = parent_world * node.local_transform();

        let world = node.world_matrix;
        stack.extend(node.children().iter().rev().map(|&child| (child, world)));
    }
}
