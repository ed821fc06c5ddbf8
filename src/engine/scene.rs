//! Scene graph: an explicit tree of transform nodes.
//!
//! Nodes are stored in insertion order and may only parent to nodes that
//! already exist, so the graph can never contain a cycle. A node has at most
//! one parent; the room node owns the floor and the walls while fixtures,
//! water and door are standalone nodes positioned in room space.

use glam::Vec3;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Transform-only node.
    Empty,
    Ground { width: f32, depth: f32 },
    Box { size: Vec3 },
    Plane { size: f32 },
}

/// Which resolved material a node wears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialSlot {
    Floor,
    Walls,
    Fixture,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Room,
    Floor,
    Wall,
    Door,
    Fixture,
    Faucet,
    Water,
}

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub name: String,
    pub role: Role,
    pub shape: Shape,
    /// Local position (relative to the parent, or room space for roots).
    pub position: Vec3,
    /// Euler rotation in radians (x, y, z).
    pub rotation: Vec3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialSlot>,
    pub visible: bool,
}

impl Node {
    pub fn new(name: impl Into<String>, role: Role, shape: Shape) -> Self {
        Node {
            name: name.into(),
            role,
            shape,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            parent: None,
            material: None,
            visible: true,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_material(mut self, slot: MaterialSlot) -> Self {
        self.material = Some(slot);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        self.push(node)
    }

    /// Add `node` under `parent`. Panics if `parent` was not created by this
    /// graph, which would break the insertion-order invariant.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "parent {parent:?} does not exist");
        node.parent = Some(parent);
        self.push(node)
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes()
            .filter(move |(_, n)| n.parent == Some(parent))
            .map(|(id, _)| id)
    }

    pub fn find(&self, role: Role) -> Option<NodeId> {
        self.nodes().find(|(_, n)| n.role == role).map(|(id, _)| id)
    }

    /// Room-space position: the node's local position plus its ancestors'.
    /// Parents carry translation only.
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        let mut node = self.get(id);
        let mut position = node.position;
        while let Some(parent) = node.parent {
            node = self.get(parent);
            position += node.position;
        }
        position
    }
}
