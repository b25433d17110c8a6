pub mod input;

pub use input::{InputEvent, InputProvider, ScriptedInput, SimulatedGazeInput};

use thiserror::Error;

/// Average interpupillary distance in metres.
const DEFAULT_IPD: f32 = 0.064;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VrView {
    pub resolution: [u32; 2],
    /// Horizontal offset of this eye from the head centre.
    pub eye_offset: f32,
}

#[derive(Debug, Clone, Default)]
pub struct VrViewConfig {
    pub views: Vec<VrView>,
}

impl VrViewConfig {
    pub fn stereo(resolution: [u32; 2], ipd: f32) -> Self {
        let half = ipd / 2.0;
        Self {
            views: [-half, half]
                .into_iter()
                .map(|eye_offset| VrView {
                    resolution,
                    eye_offset,
                })
                .collect(),
        }
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHandle {
    pub id: u64,
    pub size: [u32; 2],
}

#[derive(Debug, Clone, Default)]
pub struct VrFrameSubmission {
    pub surfaces: Vec<SurfaceHandle>,
}

#[derive(Debug, Error)]
#[error("{reason}")]
pub struct VrError {
    reason: String,
}

impl VrError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub type VrResult<T> = Result<T, VrError>;

pub trait VrBridge: Send {
    fn label(&self) -> &'static str;
    fn acquire_views(&mut self) -> VrViewConfig;
    fn present(&mut self, submission: VrFrameSubmission) -> VrResult<()>;
}

/// Headset stand-in: two eyes, accepts any submission whose surfaces match
/// the views it last handed out.
pub struct NullVrBridge {
    eye_resolution: [u32; 2],
    views: VrViewConfig,
    presented: u64,
}

impl NullVrBridge {
    pub fn new(eye_resolution: [u32; 2]) -> Self {
        Self {
            eye_resolution,
            views: VrViewConfig::stereo(eye_resolution, DEFAULT_IPD),
            presented: 0,
        }
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented
    }
}

impl Default for NullVrBridge {
    fn default() -> Self {
        Self::new([1440, 1600])
    }
}

impl VrBridge for NullVrBridge {
    fn label(&self) -> &'static str {
        "Null VR Bridge"
    }

    fn acquire_views(&mut self) -> VrViewConfig {
        self.views = VrViewConfig::stereo(self.eye_resolution, DEFAULT_IPD);
        self.views.clone()
    }

    fn present(&mut self, submission: VrFrameSubmission) -> VrResult<()> {
        let expected = self.views.view_count();
        if submission.surfaces.len() != expected {
            return Err(VrError::new(format!(
                "expected {expected} surfaces but received {}",
                submission.surfaces.len()
            )));
        }
        let mismatch = submission
            .surfaces
            .iter()
            .zip(&self.views.views)
            .enumerate()
            .find(|(_, (surface, view))| surface.size != view.resolution);
        if let Some((eye, (surface, view))) = mismatch {
            return Err(VrError::new(format!(
                "surface for eye {eye} is {:?}, view wants {:?}",
                surface.size, view.resolution
            )));
        }
        self.presented += 1;
        Ok(())
    }
}
