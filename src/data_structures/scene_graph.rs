//! Scene graph and hierarchical scene organization.
//!
//! The graph is a strict tree stored in an arena:
//!
//! - every node lives in [`SceneGraph::nodes`] and is addressed by a [`NodeId`]
//! - parents own an ordered list of child ids, children point back at their parent
//! - [`SceneGraph::attach_child`] refuses anything that would give a node two
//!   parents or close a cycle, so the tree shape holds by construction
//!
//! Nodes carry a closed [`NodeKind`] that never changes and a [`NodeTag`] that
//! names the role a node plays in the scene (tree, fish, boat, water). The tag
//! decides which procedural animation and which shading treatment apply.

use anyhow::{Result, bail};
use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};

use crate::resources::{MeshHandle, TextureHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Geometry,
    DirectionalLight,
    Skybox,
}

/// The part a node plays in the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeTag {
    #[default]
    None,
    Tree,
    Fish,
    Boat,
    Water,
}

/// Procedural motion applied to a node by the transform propagator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationRole {
    None,
    /// Rotational sway around X and Z.
    Sway,
    /// Horizontal drift with a sinusoidal yaw.
    Swim,
    /// Compound wave bobbing with pitch and roll.
    Bob,
}

impl NodeTag {
    pub fn animation_role(self) -> AnimationRole {
        match self {
            NodeTag::Tree => AnimationRole::Sway,
            NodeTag::Fish => AnimationRole::Swim,
            NodeTag::Boat => AnimationRole::Bob,
            NodeTag::None | NodeTag::Water => AnimationRole::None,
        }
    }
}

/// What a geometry node draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub mesh: MeshHandle,
    /// Number of indices in `mesh`. Zero means there is nothing to draw.
    pub index_count: u32,
    pub texture: Option<TextureHandle>,
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    kind: NodeKind,
    pub tag: NodeTag,
    pub position: Vector3<f32>,
    /// Euler angles in radians, applied in Y, X, Z order.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    /// Pivot for rotation and scale, in local coordinates.
    pub reference_point: Vector3<f32>,
    pub geometry: Option<Geometry>,
    /// Used by skybox nodes only.
    pub cubemap: Option<TextureHandle>,
    pub light_direction: Vector3<f32>,
    pub light_color: Vector3<f32>,
    /// Only meaningful after a propagation pass.
    pub world_matrix: Matrix4<f32>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl SceneNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            tag: NodeTag::None,
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            reference_point: Vector3::new(0.0, 0.0, 0.0),
            geometry: None,
            cubemap: None,
            light_direction: Vector3::new(0.0, -1.0, 0.0),
            light_color: Vector3::new(1.0, 1.0, 1.0),
            world_matrix: Matrix4::identity(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /**
     * `T(position) * T(ref) * Ry * Rx * Rz * S * T(-ref)`: rotation and scale
     * pivot around the reference point, then the node is moved into place.
     */
    pub fn local_transform(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_translation(self.reference_point)
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
            * Matrix4::from_translation(-self.reference_point)
    }

    /// World-space origin of the node after the last propagation.
    pub fn world_position(&self) -> Vector3<f32> {
        self.world_matrix.w.truncate()
    }
}

#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// A graph holding only an empty geometry root.
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode::new(NodeKind::Geometry)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached node. It takes part in propagation and rendering only
    /// once it is attached below the root.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode::new(kind));
        id
    }

    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SceneNode {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            bail!("cannot attach {child:?} to {parent:?}: unknown node");
        }
        if child == self.root {
            bail!("the root node cannot be attached as a child");
        }
        if let Some(owner) = self.nodes[child.0].parent {
            bail!("{child:?} is already a child of {owner:?}");
        }
        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                bail!("attaching {child:?} to {parent:?} would create a cycle");
            }
            ancestor = self.nodes[id.0].parent;
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn set_tag(&mut self, id: NodeId, tag: NodeTag) {
        self.node_mut(id).tag = tag;
    }

    pub fn set_position(&mut self, id: NodeId, position: Vector3<f32>) {
        self.node_mut(id).position = position;
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Vector3<f32>) {
        self.node_mut(id).rotation = rotation;
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vector3<f32>) {
        self.node_mut(id).scale = scale;
    }

    pub fn set_reference_point(&mut self, id: NodeId, reference_point: Vector3<f32>) {
        self.node_mut(id).reference_point = reference_point;
    }

    pub fn set_geometry(&mut self, id: NodeId, geometry: Geometry) {
        self.node_mut(id).geometry = Some(geometry);
    }

    pub fn set_cubemap(&mut self, id: NodeId, cubemap: TextureHandle) {
        self.node_mut(id).cubemap = Some(cubemap);
    }

    pub fn set_light(&mut self, id: NodeId, direction: Vector3<f32>, color: Vector3<f32>) {
        let node = self.node_mut(id);
        node.light_direction = direction;
        node.light_color = color;
    }

    /// Reorder the children of `parent` so those matching `last` come after
    /// all others. Relative order within both groups is kept.
    pub fn move_children_last(&mut self, parent: NodeId, last: impl Fn(&SceneNode) -> bool) {
        let mut children = std::mem::take(&mut self.nodes[parent.0].children);
        children.sort_by_key(|id| last(&self.nodes[id.0]));
        self.nodes[parent.0].children = children;
    }

    /// Depth-first, parent before children, siblings in insertion order.
    pub fn pre_order(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev());
        }
        order
    }

    pub fn first_tagged(&self, tag: NodeTag) -> Option<NodeId> {
        self.pre_order(self.root)
            .into_iter()
            .find(|id| self.nodes[id.0].tag == tag)
    }

    pub fn tagged(&self, tag: NodeTag) -> Vec<NodeId> {
        self.pre_order(self.root)
            .into_iter()
            .filter(|id| self.nodes[id.0].tag == tag)
            .collect()
    }
}
