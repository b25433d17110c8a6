use crate::ecs::Entity;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Cursor click or gaze fuse completed on `target`.
    Click { target: Entity },
}

pub trait InputProvider: Send {
    fn label(&self) -> &'static str;

    /// Events raised since the previous sample.
    fn sample(&mut self, delta_seconds: f32) -> Vec<InputEvent>;
}

/// Gaze cursor resting on one entity, firing a click every `interval`
/// samples.
pub struct SimulatedGazeInput {
    target: Entity,
    interval: u32,
    frames_since_click: u32,
}

impl SimulatedGazeInput {
    pub fn new(target: Entity, interval: u32) -> Self {
        Self {
            target,
            interval: interval.max(1),
            frames_since_click: 0,
        }
    }
}

impl InputProvider for SimulatedGazeInput {
    fn label(&self) -> &'static str {
        "Simulated Gaze"
    }

    fn sample(&mut self, _delta_seconds: f32) -> Vec<InputEvent> {
        self.frames_since_click += 1;
        if self.frames_since_click < self.interval {
            return Vec::new();
        }
        self.frames_since_click = 0;
        vec![InputEvent::Click {
            target: self.target,
        }]
    }
}

/// Replays a fixed list of per-frame event batches, then goes quiet.
#[derive(Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl InputProvider for ScriptedInput {
    fn label(&self) -> &'static str {
        "Scripted"
    }

    fn sample(&mut self, _delta_seconds: f32) -> Vec<InputEvent> {
        self.frames.pop_front().unwrap_or_default()
    }
}
