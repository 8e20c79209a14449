//! Runtime trait definitions

use async_trait::async_trait;
use rendergrid_core::{GpuId, RenderJob, RendergridResult};

/// Terminal outcome of one render process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Raw exit code, when the platform reports one
    pub code: Option<i32>,
}

impl ExitReport {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

/// Handle to one in-flight render process
#[async_trait]
pub trait RenderHandle: Send {
    /// Wait for the process to terminate and report its exit status.
    ///
    /// Called exactly once per handle, during the scheduler's drain phase.
    async fn wait(&mut self) -> RendergridResult<ExitReport>;
}

/// Runtime trait for launching render jobs
#[async_trait]
pub trait RenderRuntime: Send + Sync {
    /// Start one render process for the given job, pinned to one GPU.
    ///
    /// Returns immediately with a handle; never blocks on completion.
    async fn launch(
        &self,
        job: &RenderJob,
        gpu: &GpuId,
    ) -> RendergridResult<Box<dyn RenderHandle>>;

    /// Get the runtime name
    fn name(&self) -> &'static str;
}
