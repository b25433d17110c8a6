//! Companion demo: one host sphere wearing an overlay whose color advances
//! through a palette each time the host is clicked.

use crate::ecs::Entity;
use crate::engine::Engine;
use crate::engine::schedule::Stage;
use crate::overlay::{WireframeVariant, default_registry};
use crate::render::graph::Color;
use crate::render::{NullGpuBackend, Renderer};
use crate::scene::{EntityDescriptor, HostObject, SceneError, SceneRuntime};
use crate::vr::{InputEvent, InputProvider, NullVrBridge, SimulatedGazeInput};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("failed to read demo config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid demo config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("color palette is empty")]
    EmptyPalette,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DemoConfig {
    pub host_name: String,
    pub host_position: [f32; 3],
    pub host_radius: f32,
    pub variant: WireframeVariant,
    /// Declaration string for the overlay component.
    pub overlay: String,
    pub palette: Vec<String>,
    pub frames: u32,
    /// Frames between simulated gaze clicks.
    pub click_interval: u32,
    pub eye_resolution: [u32; 2],
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            host_name: "sphere".to_owned(),
            host_position: [0.0, 1.25, -5.0],
            host_radius: 1.25,
            variant: WireframeVariant::Standard,
            overlay: "color: #D92B6A; showNodes: true; opacity: 0.15; showWireframe: true"
                .to_owned(),
            palette: vec![
                "#D92B6A".to_owned(),
                "#9564F2".to_owned(),
                "#FFCF59".to_owned(),
            ],
            frames: 6,
            click_interval: 2,
            eye_resolution: [1440, 1600],
        }
    }
}

impl DemoConfig {
    pub fn from_json(json: &str) -> Result<Self, DemoError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, DemoError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// Walks a palette, wrapping at the end. Starts on the first entry unless
/// moved with [`ColorCycler::resume_from`].
#[derive(Debug, Clone)]
pub struct ColorCycler {
    palette: Vec<Color>,
    index: usize,
}

impl ColorCycler {
    pub fn new(palette: impl IntoIterator<Item = impl Into<Color>>) -> Result<Self, DemoError> {
        let palette: Vec<Color> = palette.into_iter().map(Into::into).collect();
        if palette.is_empty() {
            return Err(DemoError::EmptyPalette);
        }
        Ok(Self { palette, index: 0 })
    }

    /// Positions the cycler so the next `advance` yields the entry after
    /// `color`. A color that is not in the palette restarts the cycle, so the
    /// next `advance` yields the first entry.
    pub fn resume_from(&mut self, color: &Color) {
        self.index = self
            .palette
            .iter()
            .position(|entry| entry == color)
            .unwrap_or(self.palette.len() - 1);
    }

    pub fn current(&self) -> &Color {
        &self.palette[self.index]
    }

    pub fn advance(&mut self) -> &Color {
        self.index = (self.index + 1) % self.palette.len();
        self.current()
    }
}

pub struct Demo {
    engine: Engine,
    host: Entity,
}

impl Demo {
    pub fn build(config: &DemoConfig) -> Result<Self, DemoError> {
        // The host does not exist until the runtime spawns it, so the gaze
        // provider is created afterwards through the closure.
        Self::build_with_input(config, |host| {
            Box::new(SimulatedGazeInput::new(host, config.click_interval)) as Box<dyn InputProvider>
        })
    }

    pub fn build_with_input<F>(config: &DemoConfig, make_input: F) -> Result<Self, DemoError>
    where
        F: FnOnce(Entity) -> Box<dyn InputProvider>,
    {
        let mut cycler = ColorCycler::new(config.palette.iter().map(String::as_str))?;

        let mut runtime = SceneRuntime::new(Arc::new(default_registry()));
        let component = config.variant.component_name();
        let host = runtime.spawn(
            EntityDescriptor::new(
                HostObject::sphere(config.host_name.clone(), config.host_radius)
                    .at(Vec3::from_array(config.host_position)),
            )
            .with_component(component, config.overlay.clone()),
        )?;
        // The overlay declaration may start on any color; clicks continue
        // from whatever the host shows.
        cycler.resume_from(&runtime.scene().host(host)?.material.color);

        let renderer = Renderer::new(
            Box::new(NullGpuBackend),
            Box::new(NullVrBridge::new(config.eye_resolution)),
        );
        let mut engine = Engine::new(runtime, renderer);
        engine.configure_max_frames(config.frames);

        let mut input = make_input(host);
        log::info!("[demo] routing {} clicks on {host} to '{component}'", input.label());
        engine.add_system_fn(Stage::Input, "cycle_color_on_click", move |runtime, delta| {
            for event in input.sample(delta) {
                let InputEvent::Click { target } = event;
                if target != host {
                    continue;
                }
                let color = cycler.advance().clone();
                log::info!("[demo] click on {host}: color {color}");
                let attributes = format!("color: {color}");
                if let Err(err) = runtime.set_attribute(host, component, &attributes) {
                    log::error!("[demo] failed to deliver color change: {err}");
                }
            }
        });

        Ok(Self { engine, host })
    }

    pub fn run(&mut self) {
        self.engine.run();
    }

    pub fn host(&self) -> Entity {
        self.host
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }
}
