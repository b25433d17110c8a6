//! Geodesic wireframe overlay for host objects.
//!
//! Attaching an overlay repaints the host with a solid color and can add two
//! scene-level objects: a translucent icosahedral wireframe and a group of
//! small spheres, one per wireframe vertex. Both sit at [`ANCHOR`], the
//! placement the showcase scene gives its host, rather than following the
//! host itself. Later updates only repaint the host.

mod config;

pub use config::{ConfigError, OverlayConfig, OverlayConfigBuilder, parse_declarations};

use crate::ecs::Entity;
use crate::geometry::{self, Geometry};
use crate::render::graph::{Group, Material, Mesh, ObjectId};
use crate::scene::registry::{
    ComponentDefinition, ComponentFactory, ComponentInstance, ComponentRegistry,
};
use crate::scene::{Scene, SceneError};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

pub const ANCHOR: Vec3 = Vec3::new(0.0, 1.25, -5.0);
pub const WIREFRAME_DETAIL: u32 = 2;
pub const MARKER_RADIUS: f32 = 0.045;
pub const MARKER_SEGMENTS: u32 = 16;

pub const WIREFRAME_NAME: &str = "overlay-wireframe";
pub const MARKER_GROUP_NAME: &str = "overlay-nodes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WireframeVariant {
    #[default]
    Standard,
    Wide,
}

impl WireframeVariant {
    pub const ALL: [WireframeVariant; 2] = [WireframeVariant::Standard, WireframeVariant::Wide];

    /// Circumscribed radius of the wireframe polyhedron.
    pub fn radius(self) -> f32 {
        match self {
            WireframeVariant::Standard => 2.5,
            WireframeVariant::Wide => 3.0,
        }
    }

    /// Name the variant is registered under.
    pub fn component_name(self) -> &'static str {
        match self {
            WireframeVariant::Standard => "overlay",
            WireframeVariant::Wide => "overlay-wide",
        }
    }
}

/// Per-attachment state returned by [`OverlayMeshGenerator::attach`].
#[derive(Debug, Clone)]
pub struct OverlayState {
    host: Entity,
    config: OverlayConfig,
    wireframe: Option<ObjectId>,
    markers: Option<ObjectId>,
    vertex_count: usize,
}

impl OverlayState {
    pub fn host(&self) -> Entity {
        self.host
    }

    /// Most recent config, including colors delivered through updates.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn wireframe(&self) -> Option<ObjectId> {
        self.wireframe
    }

    pub fn markers(&self) -> Option<ObjectId> {
        self.markers
    }

    /// Vertex count of the generated polyhedron, whether or not it was shown.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

pub struct OverlayMeshGenerator {
    variant: WireframeVariant,
    wireframe_geometry: Arc<Geometry>,
    marker_geometry: Arc<Geometry>,
}

impl OverlayMeshGenerator {
    pub fn new(variant: WireframeVariant) -> Self {
        Self {
            variant,
            wireframe_geometry: Arc::new(geometry::icosahedron(
                variant.radius(),
                WIREFRAME_DETAIL,
            )),
            marker_geometry: Arc::new(geometry::uv_sphere(
                MARKER_RADIUS,
                MARKER_SEGMENTS,
                MARKER_SEGMENTS,
            )),
        }
    }

    pub fn variant(&self) -> WireframeVariant {
        self.variant
    }

    /// Polyhedron shared by every wireframe this generator builds. It depends
    /// only on the variant, never on the host.
    pub fn wireframe_geometry(&self) -> &Arc<Geometry> {
        &self.wireframe_geometry
    }

    pub fn attach(
        &self,
        scene: &mut Scene,
        host: Entity,
        config: OverlayConfig,
    ) -> Result<OverlayState, SceneError> {
        scene.host_mut(host)?.material = Material::solid(config.color().clone());

        let wireframe = Mesh::new(
            WIREFRAME_NAME,
            Arc::clone(&self.wireframe_geometry),
            Material::translucent_wireframe(config.opacity()),
        )
        .at(ANCHOR);

        let wireframe = if config.show_wireframe() {
            Some(scene.graph_mut().add_object(wireframe))
        } else {
            None
        };

        let markers = if config.show_nodes() {
            let mut group = Group::new(MARKER_GROUP_NAME);
            for (index, vertex) in self.wireframe_geometry.vertices().iter().enumerate() {
                group.push(
                    Mesh::new(
                        format!("overlay-node-{index}"),
                        Arc::clone(&self.marker_geometry),
                        Material::translucent(config.opacity()),
                    )
                    .at(*vertex + ANCHOR),
                );
            }
            Some(scene.graph_mut().add_object(group))
        } else {
            None
        };

        let vertex_count = self.wireframe_geometry.vertex_count();
        log::info!(
            "[overlay] attached to {host}: color {} wireframe {} markers {}",
            config.color(),
            wireframe.is_some(),
            if markers.is_some() { vertex_count } else { 0 },
        );

        Ok(OverlayState {
            host,
            config,
            wireframe,
            markers,
            vertex_count,
        })
    }

    /// Repaints the host with the new color. The wireframe and markers built
    /// at attach time are left exactly as they were.
    pub fn update(
        &self,
        scene: &mut Scene,
        state: &mut OverlayState,
        config: OverlayConfig,
    ) -> Result<(), SceneError> {
        let host = scene.host_mut(state.host)?;
        host.material.color = config.color().clone();
        log::debug!("[overlay] {} recolored to {}", state.host, config.color());
        state.config = config;
        Ok(())
    }
}

/// Registry adapter: parses declaration strings and forwards to the
/// generator.
pub struct OverlayComponent {
    generator: Arc<OverlayMeshGenerator>,
}

impl OverlayComponent {
    pub fn new(variant: WireframeVariant) -> Self {
        Self {
            generator: Arc::new(OverlayMeshGenerator::new(variant)),
        }
    }

    pub fn definition(variant: WireframeVariant) -> ComponentDefinition {
        ComponentDefinition::builder(Arc::new(Self::new(variant)))
            .properties(OverlayConfig::schema())
            .build()
    }
}

impl ComponentFactory for OverlayComponent {
    fn attach(
        &self,
        scene: &mut Scene,
        host: Entity,
        attributes: &str,
    ) -> Result<Box<dyn ComponentInstance>, SceneError> {
        let config = OverlayConfig::parse_attributes(attributes)?;
        let state = self.generator.attach(scene, host, config)?;
        Ok(Box::new(OverlayInstance {
            generator: Arc::clone(&self.generator),
            state,
        }))
    }
}

pub struct OverlayInstance {
    generator: Arc<OverlayMeshGenerator>,
    state: OverlayState,
}

impl OverlayInstance {
    pub fn state(&self) -> &OverlayState {
        &self.state
    }
}

impl ComponentInstance for OverlayInstance {
    fn update(
        &mut self,
        scene: &mut Scene,
        _host: Entity,
        attributes: &str,
    ) -> Result<(), SceneError> {
        let config = self.state.config.merge_attributes(attributes)?;
        self.generator.update(scene, &mut self.state, config)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Registry holding both overlay variants.
pub fn default_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    for variant in WireframeVariant::ALL {
        registry.register(variant.component_name(), OverlayComponent::definition(variant));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::graph::{SceneObject, Shading};
    use crate::scene::HostObject;

    fn scene_with_host() -> (Scene, Entity) {
        let mut scene = Scene::new();
        let host = scene.spawn_host(HostObject::sphere("sphere", 1.25).at(ANCHOR));
        (scene, host)
    }

    fn showcase_config() -> OverlayConfig {
        OverlayConfig::new("#D92B6A", true, 0.15, true)
    }

    #[test]
    fn hidden_overlay_only_recolors() {
        let (mut scene, host) = scene_with_host();
        let generator = OverlayMeshGenerator::new(WireframeVariant::Standard);
        let config = OverlayConfig::builder().color("#00FF00").build();

        let state = generator.attach(&mut scene, host, config).unwrap();

        assert!(scene.graph().is_empty());
        assert!(state.wireframe().is_none());
        assert!(state.markers().is_none());
        let material = &scene.host(host).unwrap().material;
        assert_eq!(material.color.as_str(), "#00FF00");
        assert_eq!(material.shading, Shading::Flat);
        assert!(!material.transparent);
    }

    #[test]
    fn showcase_attach_builds_wireframe_and_markers() {
        let (mut scene, host) = scene_with_host();
        let generator = OverlayMeshGenerator::new(WireframeVariant::Standard);

        let state = generator.attach(&mut scene, host, showcase_config()).unwrap();

        assert_eq!(scene.graph().len(), 2);
        let wireframe = scene
            .graph()
            .get(state.wireframe().unwrap())
            .and_then(SceneObject::as_mesh)
            .expect("wireframe mesh");
        assert_eq!(wireframe.position, ANCHOR);
        assert!(wireframe.material.wireframe);
        assert_eq!(wireframe.material.opacity, 0.15);
        assert_eq!(wireframe.geometry.vertex_count(), 92);

        let markers = scene
            .graph()
            .get(state.markers().unwrap())
            .and_then(SceneObject::as_group)
            .expect("marker group");
        assert_eq!(markers.len(), 92);
        for (marker, vertex) in markers.children.iter().zip(wireframe.geometry.vertices()) {
            assert_eq!(marker.position, *vertex + ANCHOR);
            assert_eq!(marker.material.opacity, 0.15);
            assert!(!marker.material.wireframe);
        }
    }

    #[test]
    fn anchor_ignores_host_position() {
        let mut scene = Scene::new();
        let host = scene.spawn_host(HostObject::sphere("moved", 1.0).at(Vec3::new(10.0, 0.0, 3.0)));
        let generator = OverlayMeshGenerator::new(WireframeVariant::Wide);
        let config = OverlayConfig::builder().show_wireframe(true).build();

        let state = generator.attach(&mut scene, host, config).unwrap();

        let mesh = scene
            .graph()
            .get(state.wireframe().unwrap())
            .and_then(SceneObject::as_mesh)
            .unwrap();
        assert_eq!(mesh.position, ANCHOR);
        assert!((mesh.geometry.bounding_radius() - 3.0).abs() < 1.0e-4);
    }

    #[test]
    fn update_recolors_without_touching_overlay() {
        let (mut scene, host) = scene_with_host();
        let generator = OverlayMeshGenerator::new(WireframeVariant::Standard);
        let mut state = generator.attach(&mut scene, host, showcase_config()).unwrap();
        let before: Vec<_> = scene
            .graph()
            .iter()
            .flat_map(|(_, object)| object.meshes())
            .map(|mesh| (mesh.position, mesh.material.clone()))
            .collect();

        let next = OverlayConfig::new("#9564F2", false, 0.9, false);
        generator.update(&mut scene, &mut state, next).unwrap();

        let after: Vec<_> = scene
            .graph()
            .iter()
            .flat_map(|(_, object)| object.meshes())
            .map(|mesh| (mesh.position, mesh.material.clone()))
            .collect();
        assert_eq!(before, after);
        assert_eq!(scene.host(host).unwrap().material.color.as_str(), "#9564F2");
        assert_eq!(scene.host(host).unwrap().material.shading, Shading::Flat);
        assert_eq!(state.config().color().as_str(), "#9564F2");
    }

    #[test]
    fn attach_requires_live_host() {
        let (mut scene, host) = scene_with_host();
        scene.world_mut().despawn(host).unwrap();
        let generator = OverlayMeshGenerator::new(WireframeVariant::Standard);

        let err = generator
            .attach(&mut scene, host, OverlayConfig::default())
            .expect_err("dead host");
        assert!(matches!(err, SceneError::MissingHost(entity) if entity == host));
    }

    #[test]
    fn default_registry_lists_both_variants() {
        let registry = default_registry();
        assert_eq!(registry.len(), 2);
        for variant in WireframeVariant::ALL {
            let definition = registry.get(variant.component_name()).expect("registered");
            assert_eq!(definition.schema(), OverlayConfig::schema().as_slice());
        }
    }
}
