use geodesic_overlay::demo::{Demo, DemoConfig};
use geodesic_overlay::overlay::OverlayInstance;
use geodesic_overlay::vr::{InputEvent, InputProvider, ScriptedInput};
use std::path::Path;

fn host_color(demo: &Demo) -> String {
    demo.engine()
        .runtime()
        .scene()
        .host(demo.host())
        .expect("host alive")
        .material
        .color
        .as_str()
        .to_owned()
}

#[test]
fn scripted_click_cycles_to_next_palette_color() {
    let config = DemoConfig::default();
    let mut demo = Demo::build_with_input(&config, |host| {
        Box::new(ScriptedInput::new([
            vec![],
            vec![InputEvent::Click { target: host }],
        ])) as Box<dyn InputProvider>
    })
    .expect("build demo");

    demo.engine_mut().step(0.016);
    assert_eq!(host_color(&demo), "#D92B6A");
    let before = demo.engine().last_summary().unwrap().clone();

    demo.engine_mut().step(0.016);
    assert_eq!(host_color(&demo), "#9564F2");

    let after = demo.engine().last_summary().unwrap();
    assert_eq!(after.host_draws, 1);
    assert_eq!(after.overlay_draws, 1 + 92);
    assert_eq!(after.wireframe_draws, 1);
    assert_eq!(after.draws.len(), before.draws.len());
    for (old, new) in before.draws.iter().zip(&after.draws).skip(1) {
        assert_eq!(old.position, new.position);
        assert_eq!(old.opacity, new.opacity);
        assert_eq!(old.color, new.color);
    }
    assert_eq!(after.draws[0].color, "#9564F2");
}

#[test]
fn first_click_follows_declared_overlay_color() {
    let config = DemoConfig {
        overlay: "color: #9564F2; showWireframe: true".to_owned(),
        ..DemoConfig::default()
    };
    let mut demo = Demo::build_with_input(&config, |host| {
        Box::new(ScriptedInput::new([vec![InputEvent::Click { target: host }]]))
            as Box<dyn InputProvider>
    })
    .expect("build demo");
    assert_eq!(host_color(&demo), "#9564F2");

    demo.engine_mut().step(0.016);
    assert_eq!(host_color(&demo), "#FFCF59");
}

#[test]
fn clicks_on_other_entities_are_ignored() {
    let config = DemoConfig::default();
    let mut demo = Demo::build_with_input(&config, |host| {
        let elsewhere = geodesic_overlay::ecs::Entity::new(host.index() + 40, 0);
        Box::new(ScriptedInput::new([vec![InputEvent::Click { target: elsewhere }]]))
            as Box<dyn InputProvider>
    })
    .unwrap();

    demo.engine_mut().step(0.016);
    assert_eq!(host_color(&demo), "#D92B6A");
}

#[test]
fn gaze_demo_runs_full_palette_cycle() {
    let mut demo = Demo::build(&DemoConfig::default()).unwrap();
    demo.run();

    // Six frames with a click every second frame: three clicks, back to the start.
    assert_eq!(host_color(&demo), "#D92B6A");
    let engine = demo.engine();
    assert_eq!(engine.frame_stats().unwrap().frames, 6);
    assert_eq!(engine.last_summary().unwrap().frame_index, 6);

    let state = engine
        .runtime()
        .component::<OverlayInstance>(demo.host(), "overlay")
        .unwrap()
        .state();
    assert_eq!(state.config().opacity(), 0.15);
    assert_eq!(engine.runtime().scene().graph().len(), 2);
}

#[test]
fn showcase_scene_file_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenes/showcase.json");
    let config = DemoConfig::load(&path).expect("scene file");
    assert_eq!(config, DemoConfig::default());
}
