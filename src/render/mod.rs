pub mod graph;

use crate::scene::Scene;
use crate::vr::{SurfaceHandle, VrBridge, VrError, VrFrameSubmission, VrViewConfig};
use glam::Vec3;
use graph::Material;
use serde::Serialize;
use thiserror::Error;

/// One mesh as the backend sees it.
#[derive(Debug, Clone, Serialize)]
pub struct DrawCall {
    pub name: String,
    pub position: Vec3,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub color: String,
    pub opacity: f32,
    pub wireframe: bool,
}

impl DrawCall {
    fn new(
        name: &str,
        position: Vec3,
        vertex_count: usize,
        triangle_count: usize,
        material: &Material,
    ) -> Self {
        Self {
            name: name.to_owned(),
            position,
            vertex_count,
            triangle_count,
            color: material.color.as_str().to_owned(),
            opacity: material.opacity,
            wireframe: material.wireframe,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FrameInputs {
    pub frame_index: u64,
    pub delta_seconds: f32,
    pub elapsed_seconds: f32,
    pub draws: Vec<DrawCall>,
}

#[derive(Debug)]
pub struct RenderSubmission {
    pub frame_index: u64,
    pub vr_submission: VrFrameSubmission,
}

/// What a frame put on screen.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    pub frame_index: u64,
    pub elapsed_seconds: f32,
    pub host_draws: usize,
    pub overlay_draws: usize,
    pub wireframe_draws: usize,
    pub total_vertices: usize,
    pub draws: Vec<DrawCall>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("vr bridge error: {0}")]
    Vr(#[from] VrError),
    #[error("renderer expected frame {expected} but backend produced {got}")]
    FrameOutOfOrder { expected: u64, got: u64 },
    #[error("gpu backend failure: {0}")]
    Backend(&'static str),
}

pub type RenderResult<T> = Result<T, RenderError>;

pub trait GpuBackend: Send {
    fn label(&self) -> &'static str;
    fn render_frame(
        &mut self,
        inputs: &FrameInputs,
        views: &VrViewConfig,
    ) -> RenderResult<RenderSubmission>;
}

pub struct Renderer {
    backend: Box<dyn GpuBackend>,
    vr: Box<dyn VrBridge>,
    frame_index: u64,
    elapsed_seconds: f32,
}

impl Renderer {
    pub fn new(backend: Box<dyn GpuBackend>, vr: Box<dyn VrBridge>) -> Self {
        Self {
            backend,
            vr,
            frame_index: 0,
            elapsed_seconds: 0.0,
        }
    }

    /// Draws host objects in spawn order (a host spawned into a reused slot
    /// still comes after older hosts), then render-graph objects in
    /// insertion order.
    pub fn render(&mut self, scene: &Scene, delta_seconds: f32) -> RenderResult<FrameSummary> {
        let next_index = self.frame_index + 1;
        let elapsed = self.elapsed_seconds + delta_seconds;

        let mut draws = Vec::new();
        for (_, host) in scene.hosts() {
            let geometry = host.primitive.geometry();
            draws.push(DrawCall::new(
                &host.name,
                host.position,
                geometry.vertex_count(),
                geometry.triangle_count(),
                &host.material,
            ));
        }
        let host_draws = draws.len();

        for (_, object) in scene.graph().iter() {
            for mesh in object.meshes() {
                draws.push(DrawCall::new(
                    &mesh.name,
                    mesh.position,
                    mesh.geometry.vertex_count(),
                    mesh.geometry.triangle_count(),
                    &mesh.material,
                ));
            }
        }

        let views = self.vr.acquire_views();
        let inputs = FrameInputs {
            frame_index: next_index,
            delta_seconds,
            elapsed_seconds: elapsed,
            draws,
        };

        let submission = self.backend.render_frame(&inputs, &views)?;
        if submission.frame_index != next_index {
            return Err(RenderError::FrameOutOfOrder {
                expected: next_index,
                got: submission.frame_index,
            });
        }
        self.vr.present(submission.vr_submission)?;

        self.frame_index = next_index;
        self.elapsed_seconds = elapsed;

        let FrameInputs { draws, .. } = inputs;
        Ok(FrameSummary {
            frame_index: next_index,
            elapsed_seconds: elapsed,
            host_draws,
            overlay_draws: draws.len() - host_draws,
            wireframe_draws: draws.iter().filter(|draw| draw.wireframe).count(),
            total_vertices: draws.iter().map(|draw| draw.vertex_count).sum(),
            draws,
        })
    }

    pub fn backend_label(&self) -> &'static str {
        self.backend.label()
    }

    pub fn vr_label(&self) -> &'static str {
        self.vr.label()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

/// Backend that draws nothing and hands the bridge one surface per view.
#[derive(Default)]
pub struct NullGpuBackend;

impl GpuBackend for NullGpuBackend {
    fn label(&self) -> &'static str {
        "Null GPU Backend"
    }

    fn render_frame(
        &mut self,
        inputs: &FrameInputs,
        views: &VrViewConfig,
    ) -> RenderResult<RenderSubmission> {
        let surfaces = views
            .views
            .iter()
            .enumerate()
            .map(|(eye, view)| SurfaceHandle {
                id: eye as u64,
                size: view.resolution,
            })
            .collect::<Vec<_>>();

        log::debug!(
            "[renderer] frame {} at {:.3} s (dt {:.3} s) - {} draws into {} surfaces",
            inputs.frame_index,
            inputs.elapsed_seconds,
            inputs.delta_seconds,
            inputs.draws.len(),
            surfaces.len()
        );

        Ok(RenderSubmission {
            frame_index: inputs.frame_index,
            vr_submission: VrFrameSubmission { surfaces },
        })
    }
}
