pub mod demo;
pub mod ecs;
pub mod engine;
pub mod geometry;
pub mod overlay;
pub mod render;
pub mod scene;
pub mod vr;

/// Runs the showcase scene with default settings.
pub fn run() -> Result<(), demo::DemoError> {
    let mut demo = demo::Demo::build(&demo::DemoConfig::default())?;
    demo.run();
    Ok(())
}
