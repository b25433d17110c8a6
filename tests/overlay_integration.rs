use geodesic_overlay::overlay::{
    ANCHOR, MARKER_GROUP_NAME, OverlayConfig, OverlayInstance, OverlayMeshGenerator, WIREFRAME_NAME,
    WireframeVariant, default_registry,
};
use geodesic_overlay::render::graph::{SceneObject, Shading};
use geodesic_overlay::scene::{EntityDescriptor, HostObject, Primitive, Scene, SceneRuntime};
use glam::Vec3;
use proptest::prelude::*;
use std::sync::Arc;

const SHOWCASE: &str = "color: #D92B6A; showNodes: true; opacity: 0.15; showWireframe: true";

fn runtime() -> SceneRuntime {
    SceneRuntime::new(Arc::new(default_registry()))
}

fn showcase_host(runtime: &mut SceneRuntime) -> geodesic_overlay::ecs::Entity {
    runtime
        .spawn(
            EntityDescriptor::new(HostObject::sphere("sphere", 1.25).at(ANCHOR))
                .with_component("overlay", SHOWCASE),
        )
        .expect("spawn showcase host")
}

fn mesh_snapshot(scene: &Scene) -> Vec<(String, Vec3, f32, bool)> {
    scene
        .graph()
        .iter()
        .flat_map(|(_, object)| object.meshes().iter())
        .map(|mesh| {
            (
                mesh.name.clone(),
                mesh.position,
                mesh.material.opacity,
                mesh.material.wireframe,
            )
        })
        .collect()
}

#[test]
fn showcase_attach_through_runtime() {
    let mut runtime = runtime();
    let host = showcase_host(&mut runtime);
    let scene = runtime.scene();

    let material = &scene.host(host).unwrap().material;
    assert_eq!(material.color.as_str(), "#D92B6A");
    assert_eq!(material.shading, Shading::Flat);

    let objects: Vec<_> = scene.graph().iter().map(|(_, object)| object).collect();
    assert_eq!(objects.len(), 2);

    let wireframe = objects[0].as_mesh().expect("wireframe first");
    assert_eq!(wireframe.name, WIREFRAME_NAME);
    assert_eq!(wireframe.position, ANCHOR);
    assert_eq!(wireframe.material.opacity, 0.15);

    let markers = objects[1].as_group().expect("markers second");
    assert_eq!(markers.name, MARKER_GROUP_NAME);
    assert_eq!(markers.len(), wireframe.geometry.vertex_count());
    for (marker, vertex) in markers.children.iter().zip(wireframe.geometry.vertices()) {
        assert!((marker.position - (*vertex + ANCHOR)).length() < 1.0e-6);
        assert_eq!(marker.material.opacity, 0.15);
        assert!(marker.material.transparent);
    }

    let state = runtime
        .component::<OverlayInstance>(host, "overlay")
        .expect("overlay attached")
        .state();
    assert_eq!(state.vertex_count(), 92);
    assert_eq!(state.host(), host);
}

#[test]
fn update_only_changes_host_color() {
    let mut runtime = runtime();
    let host = showcase_host(&mut runtime);
    let before = mesh_snapshot(runtime.scene());

    runtime
        .set_attribute(host, "overlay", "color: #9564F2; opacity: 0.8; showNodes: false")
        .expect("update");

    assert_eq!(mesh_snapshot(runtime.scene()), before);
    let material = &runtime.scene().host(host).unwrap().material;
    assert_eq!(material.color.as_str(), "#9564F2");
    assert_eq!(material.opacity, 1.0);

    let state = runtime
        .component::<OverlayInstance>(host, "overlay")
        .unwrap()
        .state();
    assert_eq!(state.config().color().as_str(), "#9564F2");
    assert!(!state.config().show_nodes());
    assert!(state.markers().is_some());
}

#[test]
fn rejected_update_keeps_previous_color() {
    let mut runtime = runtime();
    let host = showcase_host(&mut runtime);

    let result = runtime.set_attribute(host, "overlay", "color: #000000; showNodes: maybe");

    assert!(result.is_err());
    assert_eq!(
        runtime.scene().host(host).unwrap().material.color.as_str(),
        "#D92B6A"
    );
}

#[test]
fn out_of_range_opacity_reaches_materials() {
    let mut runtime = runtime();
    let host = runtime
        .spawn(
            EntityDescriptor::new(HostObject::sphere("sphere", 1.25).at(ANCHOR))
                .with_component("overlay", "color: #D92B6A; opacity: 1.5; showWireframe: true"),
        )
        .expect("opacity is not range checked");

    assert_eq!(runtime.scene().host(host).unwrap().material.color.as_str(), "#D92B6A");
    let objects: Vec<_> = runtime.scene().graph().iter().map(|(_, object)| object).collect();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].as_mesh().unwrap().material.opacity, 1.5);
}

#[test]
fn update_never_adds_overlay_objects() {
    let mut runtime = runtime();
    let host = runtime
        .spawn(
            EntityDescriptor::new(HostObject::sphere("sphere", 1.25).at(ANCHOR))
                .with_component("overlay", "color: #D92B6A"),
        )
        .unwrap();
    assert_eq!(runtime.scene().graph().len(), 0);

    runtime
        .set_attribute(host, "overlay", "color: #9564F2; showWireframe: true; showNodes: true")
        .expect("update");

    assert_eq!(runtime.scene().graph().len(), 0);
    assert_eq!(runtime.scene().host(host).unwrap().material.color.as_str(), "#9564F2");
    let state = runtime
        .component::<OverlayInstance>(host, "overlay")
        .unwrap()
        .state();
    assert!(state.config().show_wireframe());
    assert!(state.config().show_nodes());
    assert!(state.wireframe().is_none());
    assert!(state.markers().is_none());
}

#[test]
fn wide_variant_uses_larger_radius() {
    let mut runtime = runtime();
    let host = runtime
        .spawn(
            EntityDescriptor::new(HostObject::sphere("sphere", 1.25))
                .with_component("overlay-wide", "showWireframe: true"),
        )
        .unwrap();

    let state = runtime
        .component::<OverlayInstance>(host, "overlay-wide")
        .unwrap()
        .state();
    let mesh = runtime
        .scene()
        .graph()
        .get(state.wireframe().unwrap())
        .and_then(SceneObject::as_mesh)
        .unwrap();
    assert!((mesh.geometry.bounding_radius() - 3.0).abs() < 1.0e-4);
}

fn primitive() -> impl Strategy<Value = Primitive> {
    prop_oneof![
        (0.1f32..5.0).prop_map(|radius| Primitive::Sphere { radius }),
        (0.1f32..5.0, 0.1f32..5.0, 0.1f32..5.0).prop_map(|(width, height, depth)| Primitive::Box {
            width,
            height,
            depth
        }),
    ]
}

fn position() -> impl Strategy<Value = Vec3> {
    (-50.0f32..50.0, -50.0f32..50.0, -50.0f32..50.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    #[test]
    fn registered_objects_follow_flags(
        show_wireframe in any::<bool>(),
        show_nodes in any::<bool>(),
        opacity in -1.0f32..2.0,
    ) {
        let mut scene = Scene::new();
        let host = scene.spawn_host(HostObject::sphere("sphere", 1.25));
        let generator = OverlayMeshGenerator::new(WireframeVariant::Standard);
        let config = OverlayConfig::new("#FFFFFF", show_nodes, opacity, show_wireframe);

        let state = generator.attach(&mut scene, host, config).unwrap();

        let wireframes = scene
            .graph()
            .iter()
            .filter(|(_, object)| object.name() == WIREFRAME_NAME)
            .count();
        prop_assert_eq!(wireframes, usize::from(show_wireframe));
        prop_assert_eq!(state.wireframe().is_some(), show_wireframe);

        let markers: usize = scene
            .graph()
            .iter()
            .filter_map(|(_, object)| object.as_group())
            .map(|group| group.len())
            .sum();
        let expected = if show_nodes {
            generator.wireframe_geometry().vertex_count()
        } else {
            0
        };
        prop_assert_eq!(markers, expected);
        prop_assert_eq!(
            scene.graph().mesh_count(),
            usize::from(show_wireframe) + expected
        );
    }

    #[test]
    fn wireframe_is_independent_of_host(
        first_shape in primitive(),
        second_shape in primitive(),
        first_position in position(),
        second_position in position(),
    ) {
        let mut scene = Scene::new();
        let first = scene.spawn_host(HostObject::new("first", first_shape).at(first_position));
        let second = scene.spawn_host(HostObject::new("second", second_shape).at(second_position));
        let config = OverlayConfig::builder()
            .show_wireframe(true)
            .show_nodes(true)
            .build();

        let state_a = OverlayMeshGenerator::new(WireframeVariant::Standard)
            .attach(&mut scene, first, config.clone())
            .unwrap();
        let state_b = OverlayMeshGenerator::new(WireframeVariant::Standard)
            .attach(&mut scene, second, config)
            .unwrap();

        let mesh_a = scene
            .graph()
            .get(state_a.wireframe().unwrap())
            .and_then(SceneObject::as_mesh)
            .unwrap();
        let mesh_b = scene
            .graph()
            .get(state_b.wireframe().unwrap())
            .and_then(SceneObject::as_mesh)
            .unwrap();
        prop_assert_eq!(mesh_a.geometry.vertices(), mesh_b.geometry.vertices());
        prop_assert_eq!(mesh_a.position, mesh_b.position);

        let markers_a = scene
            .graph()
            .get(state_a.markers().unwrap())
            .and_then(SceneObject::as_group)
            .unwrap();
        let markers_b = scene
            .graph()
            .get(state_b.markers().unwrap())
            .and_then(SceneObject::as_group)
            .unwrap();
        for (a, b) in markers_a.children.iter().zip(&markers_b.children) {
            prop_assert_eq!(a.position, b.position);
        }
    }
}
