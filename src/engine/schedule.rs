use crate::scene::SceneRuntime;
use std::time::{Duration, Instant};

pub trait System: Send {
    fn run(&mut self, runtime: &mut SceneRuntime, delta_seconds: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Sample input and deliver the resulting property changes.
    Input,
    Simulation,
    Diagnostics,
}

impl Stage {
    pub const fn ordered() -> [Stage; 3] {
        [Stage::Input, Stage::Simulation, Stage::Diagnostics]
    }

    pub const fn count() -> usize {
        3
    }

    pub fn index(self) -> usize {
        match self {
            Stage::Input => 0,
            Stage::Simulation => 1,
            Stage::Diagnostics => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Input => "Input",
            Stage::Simulation => "Simulation",
            Stage::Diagnostics => "Diagnostics",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameProfile {
    stages: Vec<StageProfile>,
}

impl FrameProfile {
    pub fn stages(&self) -> &[StageProfile] {
        &self.stages
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageProfile> {
        self.stages.iter().find(|profile| profile.stage == stage)
    }
}

#[derive(Debug, Clone)]
pub struct StageProfile {
    pub stage: Stage,
    pub total: Duration,
    pub systems: Vec<SystemProfile>,
}

impl StageProfile {
    pub fn total_ms(&self) -> f32 {
        self.total.as_secs_f64() as f32 * 1000.0
    }
}

#[derive(Debug, Clone)]
pub struct SystemProfile {
    pub name: &'static str,
    pub duration: Duration,
}

const SLOW_SYSTEM_THRESHOLD_MS: f32 = 4.0;

struct SystemEntry {
    name: &'static str,
    system: Box<dyn System>,
}

struct StageBucket {
    stage: Stage,
    systems: Vec<SystemEntry>,
}

/// Runs registered systems stage by stage, in registration order within a
/// stage, against the scene runtime it owns.
pub struct Scheduler {
    runtime: SceneRuntime,
    buckets: Vec<StageBucket>,
    last_profile: FrameProfile,
}

impl Scheduler {
    pub fn new(runtime: SceneRuntime) -> Self {
        let buckets = Stage::ordered()
            .into_iter()
            .map(|stage| StageBucket {
                stage,
                systems: Vec::new(),
            })
            .collect();
        Self {
            runtime,
            buckets,
            last_profile: FrameProfile::default(),
        }
    }

    pub fn runtime(&self) -> &SceneRuntime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut SceneRuntime {
        &mut self.runtime
    }

    pub fn last_profile(&self) -> &FrameProfile {
        &self.last_profile
    }

    pub fn add_system<S>(&mut self, stage: Stage, name: &'static str, system: S)
    where
        S: System + 'static,
    {
        self.buckets[stage.index()].systems.push(SystemEntry {
            name,
            system: Box::new(system),
        });
    }

    pub fn add_system_fn<F>(&mut self, stage: Stage, name: &'static str, func: F)
    where
        F: FnMut(&mut SceneRuntime, f32) + Send + 'static,
    {
        self.add_system(stage, name, FnSystem { func });
    }

    pub fn tick(&mut self, delta_seconds: f32) {
        let mut frame_profile = FrameProfile::default();

        for bucket in &mut self.buckets {
            let stage_start = Instant::now();
            let mut systems = Vec::with_capacity(bucket.systems.len());

            for entry in &mut bucket.systems {
                log::trace!("[scheduler::{:?}] running system {}", bucket.stage, entry.name);
                let system_start = Instant::now();
                entry.system.run(&mut self.runtime, delta_seconds);
                let duration = system_start.elapsed();

                if duration.as_secs_f32() * 1000.0 > SLOW_SYSTEM_THRESHOLD_MS {
                    log::warn!(
                        "[scheduler::{:?}] system {} took {:.3} ms",
                        bucket.stage,
                        entry.name,
                        duration.as_secs_f64() * 1000.0,
                    );
                }
                systems.push(SystemProfile {
                    name: entry.name,
                    duration,
                });
            }

            frame_profile.stages.push(StageProfile {
                stage: bucket.stage,
                total: stage_start.elapsed(),
                systems,
            });
        }

        self.last_profile = frame_profile;
    }
}

struct FnSystem<F: FnMut(&mut SceneRuntime, f32) + Send + 'static> {
    func: F,
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&mut SceneRuntime, f32) + Send + 'static,
{
    fn run(&mut self, runtime: &mut SceneRuntime, delta_seconds: f32) {
        (self.func)(runtime, delta_seconds);
    }
}
