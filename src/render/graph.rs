use crate::geometry::Geometry;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Raw color string as written in scene markup. The renderer receives it
/// untouched; nothing in this crate parses or validates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub const WHITE: &'static str = "#FFFFFF";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn white() -> Self {
        Self::new(Self::WHITE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Shading {
    #[default]
    Smooth,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub wireframe: bool,
    pub shading: Shading,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::white(),
            opacity: 1.0,
            transparent: false,
            wireframe: false,
            shading: Shading::Smooth,
        }
    }
}

impl Material {
    /// Opaque flat-shaded surface.
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            shading: Shading::Flat,
            ..Self::default()
        }
    }

    /// White see-through surface.
    pub fn translucent(opacity: f32) -> Self {
        Self {
            opacity,
            transparent: true,
            ..Self::default()
        }
    }

    pub fn translucent_wireframe(opacity: f32) -> Self {
        Self {
            wireframe: true,
            ..Self::translucent(opacity)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub position: Vec3,
}

impl Mesh {
    pub fn new(name: impl Into<String>, geometry: Arc<Geometry>, material: Material) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            position: Vec3::ZERO,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }
}

/// Container whose children are positioned in world space.
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub name: String,
    pub children: Vec<Mesh>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, mesh: Mesh) {
        self.children.push(mesh);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum SceneObject {
    Mesh(Mesh),
    Group(Group),
}

impl SceneObject {
    pub fn name(&self) -> &str {
        match self {
            SceneObject::Mesh(mesh) => &mesh.name,
            SceneObject::Group(group) => &group.name,
        }
    }

    /// Meshes this object contributes to a frame, groups flattened.
    pub fn meshes(&self) -> &[Mesh] {
        match self {
            SceneObject::Mesh(mesh) => std::slice::from_ref(mesh),
            SceneObject::Group(group) => &group.children,
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            SceneObject::Mesh(mesh) => Some(mesh),
            SceneObject::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            SceneObject::Group(group) => Some(group),
            SceneObject::Mesh(_) => None,
        }
    }
}

impl From<Mesh> for SceneObject {
    fn from(mesh: Mesh) -> Self {
        SceneObject::Mesh(mesh)
    }
}

impl From<Group> for SceneObject {
    fn from(group: Group) -> Self {
        SceneObject::Group(group)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Scene-level objects added by components. Objects are kept in insertion
/// order and are never removed.
#[derive(Debug, Default)]
pub struct RenderGraph {
    objects: Vec<(ObjectId, SceneObject)>,
    next_id: u32,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: impl Into<SceneObject>) -> ObjectId {
        let object = object.into();
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        log::debug!(
            "[render] added object {} '{}' ({} meshes)",
            id.0,
            object.name(),
            object.meshes().len()
        );
        self.objects.push((id, object));
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, object)| object)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    /// Number of top-level objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn mesh_count(&self) -> usize {
        self.objects
            .iter()
            .map(|(_, object)| object.meshes().len())
            .sum()
    }
}
