use lakeside::{
    SceneConfig,
    data_structures::{
        scene_graph::{NodeKind, NodeTag},
        terrain::LakeShape,
    },
    scene::{Scene, shadow_casters},
};

use crate::common::test_utils::{assert_close, fake_assets, small_config};

mod common;

#[test]
fn should_append_root_children_in_scene_order() {
    let scene = Scene::build(&small_config(), &fake_assets()).unwrap();
    let root = scene.graph.root();

    let mut expected = vec![
        scene.water,
        scene.light,
        scene.terrain,
        scene.skybox,
        scene.boat,
        scene.named_tree,
    ];
    expected.extend(&scene.fish);
    expected.extend(&scene.trees);
    assert_eq!(scene.graph.children(root), expected.as_slice());

    assert_eq!(scene.fish.len(), 3);
    assert_eq!(scene.trees.len(), 5);
    assert_eq!(scene.graph.len(), 1 + 6 + 3 + 5);
}

#[test]
fn should_give_every_node_its_kind_and_tag() {
    let scene = Scene::build(&small_config(), &fake_assets()).unwrap();
    let graph = &scene.graph;

    assert_eq!(graph.node(scene.light).kind(), NodeKind::DirectionalLight);
    assert_eq!(graph.node(scene.skybox).kind(), NodeKind::Skybox);
    assert_eq!(graph.node(scene.water).tag, NodeTag::Water);
    assert_eq!(graph.node(scene.boat).tag, NodeTag::Boat);
    assert_eq!(graph.node(scene.named_tree).tag, NodeTag::Tree);
    assert_eq!(graph.node(scene.terrain).tag, NodeTag::None);
    assert!(scene.fish.iter().all(|&id| graph.node(id).tag == NodeTag::Fish));
    assert!(scene.trees.iter().all(|&id| graph.node(id).tag == NodeTag::Tree));
    assert_eq!(graph.node(scene.skybox).cubemap, Some(fake_assets().skybox));
}

#[test]
fn should_place_fish_inside_the_lake() {
    let config = SceneConfig {
        fish_count: 20,
        ..small_config()
    };
    let scene = Scene::build(&config, &fake_assets()).unwrap();
    let lake = LakeShape::new(config.lake_center_world(), config.lake.radius);

    for &fish in &scene.fish {
        let position = scene.graph.node(fish).position;
        assert!(lake.elliptical_distance(position.x, position.z) <= lake.radius);
        assert_eq!(position.y, -7.0);
        assert_eq!(position.x, position.x.floor());
    }
}

#[test]
fn should_scatter_trees_over_the_terrain() {
    let config = SceneConfig {
        tree_count: 50,
        ..small_config()
    };
    let scene = Scene::build(&config, &fake_assets()).unwrap();
    let half = config.half_extent();

    for &tree in &scene.trees {
        let node = scene.graph.node(tree);
        assert!((-half..half).contains(&node.position.x));
        assert!((-half..half).contains(&node.position.z));
        assert!((1.0..5.0).contains(&node.scale.x));
        assert_eq!(node.scale.x, node.scale.y);
    }
}

#[test]
fn should_build_the_same_scene_from_the_same_seed() {
    let a = Scene::build(&small_config(), &fake_assets()).unwrap();
    let b = Scene::build(&small_config(), &fake_assets()).unwrap();
    for (x, y) in a.fish.iter().chain(&a.trees).zip(b.fish.iter().chain(&b.trees)) {
        assert_eq!(a.graph.node(*x).position, b.graph.node(*y).position);
    }
}

#[test]
fn should_fold_the_whole_seed_into_the_noise_seed() {
    let low = SceneConfig {
        seed: 0x1a4e,
        ..small_config()
    };
    let high = SceneConfig {
        seed: 0x1a4e | (7 << 32),
        ..small_config()
    };
    assert_eq!(low.noise_seed(), 0x1a4e);
    assert_ne!(low.noise_seed(), high.noise_seed());
}

#[test]
fn should_skip_fish_when_the_lake_has_no_area() {
    let mut config = small_config();
    config.lake.radius = 0.0;
    let scene = Scene::build(&config, &fake_assets()).unwrap();
    assert!(scene.fish.is_empty());
    assert_eq!(scene.trees.len(), 5);
}

#[test]
fn should_give_up_on_fish_when_the_lake_is_off_the_terrain() {
    let mut config = small_config();
    config.lake.center = cgmath::Vector2::new(5000.0, 5000.0);
    config.lake.radius = 10.0;
    let scene = Scene::build(&config, &fake_assets()).unwrap();
    assert!(scene.fish.is_empty());
    assert_eq!(scene.trees.len(), 5);
}

#[test]
fn should_give_up_on_fish_when_the_lake_holds_no_grid_cell() {
    let mut config = small_config();
    let half = config.half_extent();
    config.lake.center = cgmath::Vector2::new(half + 0.5, half + 0.5);
    config.lake.radius = 0.4;
    let scene = Scene::build(&config, &fake_assets()).unwrap();
    assert!(scene.fish.is_empty());
}

#[test]
fn should_place_named_objects_around_the_lake() {
    let config = small_config();
    let scene = Scene::build(&config, &fake_assets()).unwrap();
    let lake = config.lake_center_world();

    let tree = scene.graph.node(scene.named_tree).position;
    assert_close(tree.x, lake.x + 60.0);
    assert_close(tree.z, lake.y);
    let boat = scene.graph.node(scene.boat).position;
    assert_close(boat.x, lake.x - 20.0);
    assert_close(boat.z, lake.y + 20.0);
    let water = scene.graph.node(scene.water).position;
    assert_close(water.y, config.lake.water_offset_y);
}

#[test]
fn should_lift_the_boat_only_while_collecting_shadow_casters() {
    let mut scene = Scene::build(&small_config(), &fake_assets()).unwrap();
    scene.update(0.75);
    let before = scene.graph.node(scene.boat).world_matrix;
    let boat_y = scene.graph.node(scene.boat).position.y;

    let casters = scene.prepare_shadow_casters();

    let boat = casters
        .iter()
        .find(|caster| caster.node == scene.boat)
        .expect("the boat casts a shadow");
    assert_close(boat.world_matrix.w.y, boat_y + scene.boat_lift);

    assert_eq!(scene.graph.node(scene.boat).position.y, boat_y);
    assert_eq!(scene.graph.node(scene.boat).world_matrix, before);
}

#[test]
fn should_exclude_water_sky_and_light_from_shadow_casters() {
    let mut scene = Scene::build(&small_config(), &fake_assets()).unwrap();
    scene.update(0.1);
    let casters = shadow_casters(&scene.graph);
    let nodes: Vec<_> = casters.iter().map(|caster| caster.node).collect();

    assert!(!nodes.contains(&scene.water));
    assert!(!nodes.contains(&scene.skybox));
    assert!(!nodes.contains(&scene.light));
    assert!(!nodes.contains(&scene.graph.root()));
    assert!(nodes.contains(&scene.terrain));
    assert!(nodes.contains(&scene.boat));
    assert_eq!(nodes.len(), 3 + scene.fish.len() + scene.trees.len());
}

#[test]
fn should_normalise_the_light_direction() {
    let scene = Scene::build(&small_config(), &fake_assets()).unwrap();
    let direction = scene.light_direction();
    assert_close(cgmath::InnerSpace::magnitude(direction), 1.0);
    assert!(direction.y < 0.0);
}
