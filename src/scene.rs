//! The lakeside scene: construction and per-frame transform updates.
//!
//! [`Scene`] owns the node graph, the animation clock and the ids of the nodes
//! the renderer treats specially. It never touches the GPU: geometry arrives as
//! handles in [`SceneAssets`] and leaves as matrices.

use anyhow::Result;
use cgmath::{InnerSpace, Matrix4, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    animation::{AnimationClock, propagate},
    config::SceneConfig,
    data_structures::{
        scene_graph::{Geometry, NodeId, NodeKind, NodeTag, SceneGraph},
        terrain::LakeShape,
    },
    resources::TextureHandle,
};

/// Rejection-sampling budget per requested fish.
pub const FISH_ATTEMPTS_PER_FISH: usize = 10_000;

/// Uploaded geometry for every kind of object in the scene.
#[derive(Clone, Copy, Debug)]
pub struct SceneAssets {
    pub terrain: Geometry,
    pub water: Geometry,
    pub tree: Geometry,
    pub boat: Geometry,
    pub fish: Geometry,
    pub skybox: TextureHandle,
}

/// A node that contributes to the shadow map, with the world matrix it had
/// while the depth pass was prepared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowCaster {
    pub node: NodeId,
    pub world_matrix: Matrix4<f32>,
    pub geometry: Geometry,
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub graph: SceneGraph,
    pub clock: AnimationClock,
    pub water: NodeId,
    pub light: NodeId,
    pub terrain: NodeId,
    pub skybox: NodeId,
    pub boat: NodeId,
    pub named_tree: NodeId,
    pub fish: Vec<NodeId>,
    pub trees: Vec<NodeId>,
    /// Vertical lift applied to the boat while the shadow map is prepared.
    pub boat_lift: f32,
}

impl Scene {
    /**
     * Build the lakeside scene.
     *
     * Root children are appended in the order water, light, terrain, skybox,
     * boat, named tree, then the fish and finally the scattered trees. Fish are
     * placed by rejection sampling inside the lake ellipse, trees anywhere on
     * the terrain.
     */
    pub fn build(config: &SceneConfig, assets: &SceneAssets) -> Result<Self> {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let lake_world = config.lake_center_world();
        let half = config.half_extent();

        let skybox = graph.create_node(NodeKind::Skybox);
        graph.set_cubemap(skybox, assets.skybox);
        graph.set_scale(skybox, Vector3::new(1.0, 1.0, 1.0) * config.skybox_scale);

        let light = graph.create_node(NodeKind::DirectionalLight);
        graph.set_light(light, config.light_direction, config.light_color);

        let water = graph.create_node(NodeKind::Geometry);
        graph.set_tag(water, NodeTag::Water);
        graph.set_geometry(water, assets.water);
        graph.set_position(water, Vector3::new(0.0, config.lake.water_offset_y, 0.0));

        let named_tree = graph.create_node(NodeKind::Geometry);
        graph.set_tag(named_tree, NodeTag::Tree);
        graph.set_geometry(named_tree, assets.tree);
        graph.set_position(named_tree, Vector3::new(lake_world.x + 60.0, 0.0, lake_world.y));
        graph.set_scale(named_tree, Vector3::new(4.0, 4.0, 4.0));

        let boat = graph.create_node(NodeKind::Geometry);
        graph.set_tag(boat, NodeTag::Boat);
        graph.set_geometry(boat, assets.boat);
        graph.set_position(boat, Vector3::new(lake_world.x - 20.0, -10.0, lake_world.y + 20.0));
        graph.set_scale(boat, Vector3::new(2.5, 2.5, 2.5));

        let terrain = graph.create_node(NodeKind::Geometry);
        graph.set_geometry(terrain, assets.terrain);

        for child in [water, light, terrain, skybox, boat, named_tree] {
            graph.attach_child(root, child)?;
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let lake = LakeShape::new(lake_world, config.lake.radius);

        let mut fish = Vec::with_capacity(config.fish_count);
        // Lakes with no area would never accept a sample.
        if config.lake.radius > 0.0 {
            let max_attempts = config.fish_count.saturating_mul(FISH_ATTEMPTS_PER_FISH);
            let mut attempts = 0;
            while fish.len() < config.fish_count && attempts < max_attempts {
                attempts += 1;
                let x = rng.gen_range(-half..half).floor();
                let z = rng.gen_range(-half..half).floor();
                if lake.elliptical_distance(x, z) > lake.radius {
                    continue;
                }
                let node = graph.create_node(NodeKind::Geometry);
                graph.set_tag(node, NodeTag::Fish);
                graph.set_geometry(node, assets.fish);
                graph.set_position(node, Vector3::new(x, -7.0, z));
                graph.set_scale(node, Vector3::new(0.3, 0.3, 0.3));
                graph.set_rotation(node, Vector3::new((-90.0f32).to_radians(), 0.0, 0.0));
                graph.attach_child(root, node)?;
                fish.push(node);
            }
            if fish.len() < config.fish_count {
                log::warn!(
                    "Placed {} of {} fish, the lake barely overlaps the terrain grid",
                    fish.len(),
                    config.fish_count
                );
            }
        } else if config.fish_count > 0 {
            log::warn!("The lake has no area, no fish are placed");
        }

        let mut trees = Vec::with_capacity(config.tree_count);
        for _ in 0..config.tree_count {
            let x = rng.gen_range(-half..half).floor();
            let z = rng.gen_range(-half..half).floor();
            let scale = rng.gen_range(1.0..5.0);
            let node = graph.create_node(NodeKind::Geometry);
            graph.set_tag(node, NodeTag::Tree);
            graph.set_geometry(node, assets.tree);
            graph.set_position(node, Vector3::new(x, 0.0, z));
            graph.set_scale(node, Vector3::new(scale, scale, scale));
            graph.attach_child(root, node)?;
            trees.push(node);
        }

        log::info!(
            "built scene: {} nodes, {} fish, {} trees",
            graph.len(),
            fish.len(),
            trees.len()
        );

        Ok(Self {
            graph,
            clock: AnimationClock::new(),
            water,
            light,
            terrain,
            skybox,
            boat,
            named_tree,
            fish,
            trees,
            boat_lift: config.shadow.boat_lift,
        })
    }

    /// Advance the clock by `dt` seconds and animate the whole graph.
    pub fn update(&mut self, dt: f32) {
        self.clock.advance(dt);
        propagate(&mut self.graph, &self.clock);
    }

    /**
     * World matrices for the depth pass.
     *
     * The boat is lifted and the graph re-propagated with the boat's wave
     * motion suspended, then every shadow caster is collected. Afterwards the
     * boat is put back and the graph propagated again so the colour pass sees
     * unperturbed matrices.
     */
    pub fn prepare_shadow_casters(&mut self) -> Vec<ShadowCaster> {
        let resting_y = self.graph.node(self.boat).position.y;
        self.graph.node_mut(self.boat).position.y += self.boat_lift;
        propagate(&mut self.graph, &self.clock.for_shadow_pass());

        let casters = shadow_casters(&self.graph);

        self.graph.node_mut(self.boat).position.y = resting_y;
        propagate(&mut self.graph, &self.clock);
        casters
    }

    pub fn boat_position(&self) -> Vector3<f32> {
        self.graph.node(self.boat).position
    }

    /// Normalised direction of the scene's light.
    pub fn light_direction(&self) -> Vector3<f32> {
        self.graph.node(self.light).light_direction.normalize()
    }
}

/// Geometry below the root that casts a shadow: everything except the water.
pub fn shadow_casters(graph: &SceneGraph) -> Vec<ShadowCaster> {
    graph
        .pre_order(graph.root())
        .into_iter()
        .filter_map(|id| {
            let node = graph.node(id);
            if node.kind() != NodeKind::Geometry || node.tag == NodeTag::Water {
                return None;
            }
            let geometry = node.geometry?;
            Some(ShadowCaster {
                node: id,
                world_matrix: node.world_matrix,
                geometry,
            })
        })
        .collect()
}
