pub mod schedule;

use crate::ecs::Entity;
use crate::render::{FrameSummary, Renderer};
use crate::scene::SceneRuntime;
use schedule::{Scheduler, Stage, System};
use std::time::Instant;

const DEFAULT_MAX_FRAMES: u32 = 3;

/// Running frame statistics, stored on a dedicated entity of the scene world.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    pub frames: u64,
    pub total_time: f32,
    pub average_frame_time: f32,
    pub stage_ms: [f32; Stage::count()],
}

/// Frame loop: scheduled stages against the scene runtime, then a render.
pub struct Engine {
    scheduler: Scheduler,
    renderer: Renderer,
    target_frame_time: f32,
    max_frames: u32,
    stats_entity: Entity,
    last_summary: Option<FrameSummary>,
}

impl Engine {
    pub fn new(mut runtime: SceneRuntime, renderer: Renderer) -> Self {
        let world = runtime.scene_mut().world_mut();
        let stats_entity = world.spawn();
        world
            .insert(stats_entity, FrameStats::default())
            .expect("freshly spawned entity is alive");

        let mut engine = Self {
            scheduler: Scheduler::new(runtime),
            renderer,
            target_frame_time: 1.0 / 60.0,
            max_frames: DEFAULT_MAX_FRAMES,
            stats_entity,
            last_summary: None,
        };
        engine.register_core_systems();
        engine
    }

    pub fn add_system<S>(&mut self, stage: Stage, name: &'static str, system: S)
    where
        S: System + 'static,
    {
        self.scheduler.add_system(stage, name, system);
    }

    pub fn add_system_fn<F>(&mut self, stage: Stage, name: &'static str, func: F)
    where
        F: FnMut(&mut SceneRuntime, f32) + Send + 'static,
    {
        self.scheduler.add_system_fn(stage, name, func);
    }

    pub fn configure_max_frames(&mut self, frames: u32) {
        self.max_frames = frames.max(1);
    }

    pub fn max_frames(&self) -> u32 {
        self.max_frames
    }

    pub fn run(&mut self) {
        let mut last_frame = Instant::now();
        for _ in 0..self.max_frames {
            let now = Instant::now();
            let raw_delta = now.duration_since(last_frame).as_secs_f32();
            let delta_seconds = if raw_delta == 0.0 {
                self.target_frame_time
            } else {
                raw_delta
            };
            last_frame = now;
            self.step(delta_seconds);
        }
        log::info!(
            "[engine] ran {} frames on {} / {}",
            self.max_frames,
            self.renderer.backend_label(),
            self.renderer.vr_label()
        );
    }

    /// Runs one frame with an explicit time step.
    pub fn step(&mut self, delta_seconds: f32) {
        self.scheduler.tick(delta_seconds);
        self.record_stage_timings();

        match self.renderer.render(self.scheduler.runtime().scene(), delta_seconds) {
            Ok(summary) => self.last_summary = Some(summary),
            Err(err) => log::error!("[engine] render error: {err}"),
        }
    }

    pub fn runtime(&self) -> &SceneRuntime {
        self.scheduler.runtime()
    }

    pub fn runtime_mut(&mut self) -> &mut SceneRuntime {
        self.scheduler.runtime_mut()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn last_summary(&self) -> Option<&FrameSummary> {
        self.last_summary.as_ref()
    }

    pub fn frame_stats(&self) -> Option<&FrameStats> {
        self.runtime()
            .scene()
            .world()
            .get::<FrameStats>(self.stats_entity)
    }

    fn register_core_systems(&mut self) {
        let stats_entity = self.stats_entity;
        self.add_system_fn(Stage::Diagnostics, "frame_stats", move |runtime, delta| {
            if let Some(stats) = runtime
                .scene_mut()
                .world_mut()
                .get_mut::<FrameStats>(stats_entity)
            {
                stats.frames += 1;
                stats.total_time += delta;
                stats.average_frame_time = stats.total_time / stats.frames as f32;
                log::debug!(
                    "[engine] frame {} avg {:.4}s",
                    stats.frames,
                    stats.average_frame_time
                );
            }
        });
    }

    fn record_stage_timings(&mut self) {
        let profile = self.scheduler.last_profile().clone();
        let stats_entity = self.stats_entity;
        if let Some(stats) = self
            .scheduler
            .runtime_mut()
            .scene_mut()
            .world_mut()
            .get_mut::<FrameStats>(stats_entity)
        {
            for stage in Stage::ordered() {
                if let Some(stage_profile) = profile.stage(stage) {
                    stats.stage_ms[stage.index()] = stage_profile.total_ms();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullGpuBackend;
    use crate::scene::registry::ComponentRegistry;
    use crate::vr::NullVrBridge;
    use std::sync::Arc;

    fn engine() -> Engine {
        let runtime = SceneRuntime::new(Arc::new(ComponentRegistry::new()));
        let renderer =
            Renderer::new(Box::new(NullGpuBackend), Box::new(NullVrBridge::default()));
        Engine::new(runtime, renderer)
    }

    #[test]
    fn run_executes_configured_frames() {
        let mut engine = engine();
        engine.configure_max_frames(5);
        engine.run();

        assert_eq!(engine.frame_stats().unwrap().frames, 5);
        assert_eq!(engine.renderer().frame_index(), 5);
        assert_eq!(engine.last_summary().unwrap().frame_index, 5);
    }

    #[test]
    fn stats_entity_is_not_drawn() {
        let mut engine = engine();
        engine.step(0.016);

        let summary = engine.last_summary().unwrap();
        assert_eq!(summary.host_draws, 0);
        assert!(summary.draws.is_empty());
    }
}
