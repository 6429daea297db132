use crate::error::SceneError;
use crate::lights::{AmbientLight, DirectionalLight, SpotLight};
use cubelight_common::{Color, ObjectId, Transform};
use glam::Mat4;
use std::collections::BTreeMap;

/// Shape of a mesh, in the object's local space.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Axis-aligned box centred on the origin.
    Box { width: f32, height: f32, depth: f32 },
    /// UV sphere centred on the origin.
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
}

/// Surface description of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Lit surface. `colors` holds either a single colour or one colour per
    /// box face in +X, -X, +Y, -Y, +Z, -Z order.
    Standard {
        colors: Vec<Color>,
        roughness: f32,
        metalness: f32,
    },
    /// Unlit, flat colour.
    Basic { color: Color },
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh { geometry: Geometry, material: Material },
    /// Edge outline of a box, drawn as line segments.
    Edges { geometry: Geometry, color: Color },
    AmbientLight(AmbientLight),
    DirectionalLight(DirectionalLight),
    SpotLight(SpotLight),
}

/// One object in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub parent: Option<ObjectId>,
    pub transform: Transform,
    pub kind: NodeKind,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            parent: None,
            transform: Transform::default(),
            kind,
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn casting_shadow(mut self, on: bool) -> Self {
        self.cast_shadow = on;
        self
    }

    pub fn receiving_shadow(mut self, on: bool) -> Self {
        self.receive_shadow = on;
        self
    }
}

/// Flat store of scene objects with parent links.
///
/// Listing order is insertion order so that debug output stays stable.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<ObjectId, Node>,
    order: Vec<ObjectId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a root-level object.
    pub fn add(&mut self, mut node: Node) -> ObjectId {
        let id = ObjectId::new();
        node.parent = None;
        self.nodes.insert(id, node);
        self.order.push(id);
        id
    }

    /// Add an object whose transform is relative to `parent`.
    pub fn add_child(&mut self, parent: ObjectId, mut node: Node) -> Result<ObjectId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::UnknownObject(parent));
        }
        let id = ObjectId::new();
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        self.order.push(id);
        Ok(id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.nodes[id].name == name)
    }

    pub fn children(&self, parent: ObjectId) -> Vec<ObjectId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.nodes[id].parent == Some(parent))
            .collect()
    }

    /// Objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Node)> {
        self.order.iter().map(|id| (*id, &self.nodes[id]))
    }

    /// Local-to-world matrix, composing every ancestor's transform.
    pub fn world_matrix(&self, id: ObjectId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut matrix = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            matrix = node.transform.matrix() * matrix;
        }
        Some(matrix)
    }

    /// Whether the object and all of its ancestors are visible.
    pub fn is_visible(&self, id: ObjectId) -> bool {
        let mut current = self.nodes.get(&id);
        while let Some(node) = current {
            if !node.visible {
                return false;
            }
            current = node.parent.and_then(|p| self.nodes.get(&p));
        }
        self.nodes.contains_key(&id)
    }
}
