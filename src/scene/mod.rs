pub mod manifest;
pub mod registry;

use crate::ecs::{EcsError, Entity, World};
use crate::geometry::{self, Geometry};
use crate::overlay::ConfigError;
use crate::render::graph::{Material, RenderGraph};
use glam::Vec3;
use registry::{ComponentInstance, ComponentRegistry};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

// Segment counts used for host spheres when none are given.
const SPHERE_WIDTH_SEGMENTS: u32 = 18;
const SPHERE_HEIGHT_SEGMENTS: u32 = 36;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("entity {0} has no host object")]
    MissingHost(Entity),
    #[error("no component registered under '{0}'")]
    UnknownComponent(String),
    #[error(transparent)]
    Ecs(#[from] EcsError),
    #[error("invalid component attributes: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Sphere { radius: f32 },
    Box { width: f32, height: f32, depth: f32 },
}

impl Primitive {
    pub fn geometry(&self) -> Geometry {
        match *self {
            Primitive::Sphere { radius } => {
                geometry::uv_sphere(radius, SPHERE_WIDTH_SEGMENTS, SPHERE_HEIGHT_SEGMENTS)
            }
            Primitive::Box {
                width,
                height,
                depth,
            } => geometry::cuboid(width, height, depth),
        }
    }
}

/// Renderable entity owned by the scene. Components may restyle it through
/// `material` but never move or destroy it.
#[derive(Debug, Clone)]
pub struct HostObject {
    pub name: String,
    pub position: Vec3,
    pub primitive: Primitive,
    pub material: Material,
}

impl HostObject {
    pub fn new(name: impl Into<String>, primitive: Primitive) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            primitive,
            material: Material::default(),
        }
    }

    pub fn sphere(name: impl Into<String>, radius: f32) -> Self {
        Self::new(name, Primitive::Sphere { radius })
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }
}

/// Host objects plus the scene-level objects components add.
#[derive(Default)]
pub struct Scene {
    world: World,
    graph: RenderGraph,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut RenderGraph {
        &mut self.graph
    }

    pub fn host(&self, entity: Entity) -> Result<&HostObject, SceneError> {
        self.world
            .get::<HostObject>(entity)
            .ok_or(SceneError::MissingHost(entity))
    }

    pub fn host_mut(&mut self, entity: Entity) -> Result<&mut HostObject, SceneError> {
        self.world
            .get_mut::<HostObject>(entity)
            .ok_or(SceneError::MissingHost(entity))
    }

    pub fn spawn_host(&mut self, host: HostObject) -> Entity {
        let entity = self.world.spawn();
        self.world
            .insert(entity, host)
            .expect("freshly spawned entity is alive");
        entity
    }

    pub fn hosts(&self) -> impl Iterator<Item = (Entity, &HostObject)> {
        self.world.query::<HostObject>()
    }
}

/// A host plus the components declared on it, in declaration order.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    host: HostObject,
    components: Vec<(String, String)>,
}

impl EntityDescriptor {
    pub fn new(host: HostObject) -> Self {
        Self {
            host,
            components: Vec::new(),
        }
    }

    pub fn with_component(
        mut self,
        name: impl Into<String>,
        attributes: impl Into<String>,
    ) -> Self {
        self.components.push((name.into(), attributes.into()));
        self
    }
}

struct Attachment {
    name: String,
    instance: Box<dyn ComponentInstance>,
}

/// Drives component lifecycles for the hosts of one scene: attach when a
/// host is spawned or a component is first set, update on later changes.
pub struct SceneRuntime {
    scene: Scene,
    registry: Arc<ComponentRegistry>,
    attachments: BTreeMap<Entity, Vec<Attachment>>,
}

impl SceneRuntime {
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self {
            scene: Scene::new(),
            registry,
            attachments: BTreeMap::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Spawns the host and attaches its components. If any component is
    /// unknown or rejects its attributes the host is removed again; objects
    /// already added to the render graph by earlier components stay there.
    pub fn spawn(&mut self, descriptor: EntityDescriptor) -> Result<Entity, SceneError> {
        if let Some((name, _)) = descriptor
            .components
            .iter()
            .find(|(name, _)| !self.registry.contains(name))
        {
            return Err(SceneError::UnknownComponent(name.clone()));
        }

        let host_name = descriptor.host.name.clone();
        let entity = self.scene.spawn_host(descriptor.host);
        log::info!("[scene] spawned host '{host_name}' as {entity}");

        for (name, attributes) in &descriptor.components {
            if let Err(err) = self.attach(entity, name, attributes) {
                self.despawn(entity)?;
                return Err(err);
            }
        }
        Ok(entity)
    }

    /// Delivers a property change. A component that is not attached yet is
    /// attached with these attributes instead.
    pub fn set_attribute(
        &mut self,
        entity: Entity,
        component: &str,
        attributes: &str,
    ) -> Result<(), SceneError> {
        self.scene.host(entity)?;

        let attached = self
            .attachments
            .get_mut(&entity)
            .and_then(|list| {
                list.iter_mut()
                    .find(|attachment| attachment.name == component)
            });

        match attached {
            Some(attachment) => {
                log::debug!("[scene] update '{component}' on {entity}");
                attachment.instance.update(&mut self.scene, entity, attributes)
            }
            None => self.attach(entity, component, attributes),
        }
    }

    /// Removes the host and drops its component state.
    pub fn despawn(&mut self, entity: Entity) -> Result<(), SceneError> {
        self.attachments.remove(&entity);
        self.scene.world.despawn(entity)?;
        log::info!("[scene] despawned {entity}");
        Ok(())
    }

    pub fn attached_components(&self, entity: Entity) -> Vec<&str> {
        self.attachments
            .get(&entity)
            .map(|list| {
                list.iter()
                    .map(|attachment| attachment.name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Typed view of an attached component's instance state.
    pub fn component<T: 'static>(&self, entity: Entity, component: &str) -> Option<&T> {
        self.attachments
            .get(&entity)?
            .iter()
            .find(|attachment| attachment.name == component)?
            .instance
            .as_any()
            .downcast_ref::<T>()
    }

    fn attach(
        &mut self,
        entity: Entity,
        component: &str,
        attributes: &str,
    ) -> Result<(), SceneError> {
        let definition = self
            .registry
            .get(component)
            .ok_or_else(|| SceneError::UnknownComponent(component.to_owned()))?;
        let instance = definition
            .factory()
            .attach(&mut self.scene, entity, attributes)?;
        log::debug!("[scene] attached '{component}' to {entity}");

        self.attachments.entry(entity).or_default().push(Attachment {
            name: component.to_owned(),
            instance,
        });
        Ok(())
    }
}
