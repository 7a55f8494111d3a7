use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};
use lakeside::{
    animation::{AnimationClock, BOAT_BASE_HEIGHT, propagate, propagate_from, wave_offset},
    data_structures::scene_graph::{NodeId, NodeKind, NodeTag, SceneGraph},
};

use crate::common::test_utils::{assert_close, world_matrices};

mod common;

fn tagged_child(graph: &mut SceneGraph, parent: NodeId, tag: NodeTag) -> NodeId {
    let id = graph.create_node(NodeKind::Geometry);
    graph.set_tag(id, tag);
    graph.attach_child(parent, id).unwrap();
    id
}

fn clock_at(time: f32) -> AnimationClock {
    let mut clock = AnimationClock::new();
    clock.advance(time);
    clock
}

#[test]
fn should_chain_parent_transforms() {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let parent = tagged_child(&mut graph, root, NodeTag::None);
    let child = tagged_child(&mut graph, parent, NodeTag::None);
    graph.set_position(parent, Vector3::new(10.0, 0.0, 0.0));
    graph.set_scale(parent, Vector3::new(2.0, 2.0, 2.0));
    graph.set_position(child, Vector3::new(1.0, 1.0, 0.0));

    propagate(&mut graph, &AnimationClock::new());

    let p = graph.node(child).world_matrix * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert_close(p.x, 12.0);
    assert_close(p.y, 2.0);
    assert_close(graph.node(child).world_position().x, 12.0);
}

#[test]
fn should_be_idempotent_for_nodes_without_animation() {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let plain = tagged_child(&mut graph, root, NodeTag::None);
    let water = tagged_child(&mut graph, root, NodeTag::Water);
    let nested = tagged_child(&mut graph, plain, NodeTag::None);
    graph.set_position(plain, Vector3::new(3.0, -1.0, 7.5));
    graph.set_rotation(plain, Vector3::new(0.1, 0.2, 0.3));
    graph.set_position(water, Vector3::new(0.0, 15.0, 0.0));
    graph.set_position(nested, Vector3::new(-2.0, 0.5, 1.0));
    let ids = [root, plain, water, nested];

    let clock = clock_at(4.2);
    propagate(&mut graph, &clock);
    let first = world_matrices(&graph, &ids);
    propagate(&mut graph, &clock);
    let second = world_matrices(&graph, &ids);

    assert_eq!(first, second);
}

#[test]
fn should_turn_fish_but_not_plain_geometry() {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let fish = tagged_child(&mut graph, root, NodeTag::Fish);
    let plain = tagged_child(&mut graph, root, NodeTag::None);
    for id in [fish, plain] {
        graph.set_position(id, Vector3::new(5.0, -7.0, 5.0));
    }

    propagate(&mut graph, &clock_at(1.0));

    assert!(graph.node(fish).rotation.y.abs() > 1e-3);
    assert_eq!(graph.node(plain).rotation.y, 0.0);
    assert_ne!(graph.node(fish).world_matrix, graph.node(plain).world_matrix);
}

#[test]
fn should_let_fish_drift_with_every_propagation() {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let fish = tagged_child(&mut graph, root, NodeTag::Fish);
    let clock = clock_at(0.5);

    propagate(&mut graph, &clock);
    let once = graph.node(fish).position;
    propagate(&mut graph, &clock);
    let twice = graph.node(fish).position;

    assert_ne!(once, twice);
    assert_eq!(once.y, twice.y);
}

#[test]
fn should_sway_trees_around_x_and_z() {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let tree = tagged_child(&mut graph, root, NodeTag::Tree);
    graph.set_position(tree, Vector3::new(20.0, 0.0, -40.0));

    propagate(&mut graph, &clock_at(2.0));

    let node = graph.node(tree);
    assert_eq!(node.rotation.y, 0.0);
    assert!(node.rotation.x.abs() <= 5f32.to_radians() + 1e-6);
    assert!(node.rotation.z.abs() <= 5f32.to_radians() + 1e-6);
    assert_eq!(node.position, Vector3::new(20.0, 0.0, -40.0));
}

#[test]
fn should_bob_the_boat_on_the_waves() {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let boat = tagged_child(&mut graph, root, NodeTag::Boat);
    graph.set_position(boat, Vector3::new(-20.0, -10.0, 20.0));

    propagate(&mut graph, &clock_at(3.0));

    let expected = BOAT_BASE_HEIGHT + wave_offset(-20.0, 20.0, 3.0);
    assert_close(graph.node(boat).position.y, expected);
}

#[test]
fn should_hold_the_boat_still_in_the_shadow_pass() {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let boat = tagged_child(&mut graph, root, NodeTag::Boat);
    graph.set_position(boat, Vector3::new(0.0, 25.0, 0.0));

    let clock = clock_at(3.0).for_shadow_pass();
    propagate(&mut graph, &clock);

    let node = graph.node(boat);
    assert_eq!(node.position, Vector3::new(0.0, 25.0, 0.0));
    assert_eq!(node.rotation, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn should_propagate_a_subtree_under_a_given_parent() {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let parent = tagged_child(&mut graph, root, NodeTag::None);
    let child = tagged_child(&mut graph, parent, NodeTag::None);
    graph.set_position(child, Vector3::new(1.0, 0.0, 0.0));

    let offset = Matrix4::from_translation(Vector3::new(0.0, 100.0, 0.0));
    propagate_from(&mut graph, parent, offset, &AnimationClock::new());

    assert_eq!(graph.node(parent).world_matrix, offset);
    assert_close(graph.node(child).world_position().y, 100.0);
    // The root was not visited.
    assert_eq!(graph.node(root).world_matrix, Matrix4::identity());
}

#[test]
fn should_never_run_the_clock_backwards() {
    let mut clock = AnimationClock::new();
    clock.advance(1.5);
    clock.advance(-3.0);
    assert_eq!(clock.time, 1.5);
    assert!(!clock.shadow_pass);
    assert!(clock.for_shadow_pass().shadow_pass);
    assert_eq!(clock.for_shadow_pass().time, 1.5);
}
