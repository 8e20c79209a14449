//! Process-based render runtime
//!
//! Each job runs as one external renderer invocation. The assigned GPU is
//! pinned through a process-scoped environment variable so concurrent jobs
//! on different devices cannot contend for the same one.

use async_trait::async_trait;
use rendergrid_core::{GpuId, RenderConfig, RenderJob, RendergridError, RendergridResult};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, error, info};

use crate::traits::{ExitReport, RenderHandle, RenderRuntime};

/// Process runtime configuration
#[derive(Debug, Clone)]
pub struct ProcessRuntimeConfig {
    /// Path to the render executable
    pub executable: std::path::PathBuf,
    /// Scene file opened in batch mode
    pub scene_file: std::path::PathBuf,
    /// Extra arguments appended after the job arguments
    pub extra_args: Vec<String>,
    /// Environment variable carrying the GPU restriction
    pub gpu_env_var: String,
}

impl From<&RenderConfig> for ProcessRuntimeConfig {
    fn from(config: &RenderConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            scene_file: config.scene_file.clone(),
            extra_args: config.extra_args.clone(),
            gpu_env_var: config.gpu_env_var.clone(),
        }
    }
}

/// Process-based runtime for launching render jobs
pub struct ProcessRuntime {
    config: ProcessRuntimeConfig,
}

impl ProcessRuntime {
    /// Create a new process runtime
    pub fn new(config: ProcessRuntimeConfig) -> Self {
        Self { config }
    }

    /// Build the renderer invocation for a job.
    ///
    /// Positional shape: `<executable> -b <scene_file> -o <output_path>
    /// -f <frame> -- <layer> [extra_args..]`, with the GPU restriction
    /// applied through the configured environment variable.
    fn build_command(&self, job: &RenderJob, gpu: &GpuId) -> Command {
        let mut cmd = Command::new(&self.config.executable);

        cmd.arg("-b").arg(&self.config.scene_file);
        cmd.arg("-o").arg(&job.output_path);
        cmd.arg("-f").arg(job.frame.to_string());
        cmd.arg("--").arg(&job.layer);

        for arg in &self.config.extra_args {
            cmd.arg(arg);
        }

        cmd.env(&self.config.gpu_env_var, gpu.as_str());

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        cmd
    }
}

#[async_trait]
impl RenderRuntime for ProcessRuntime {
    async fn launch(
        &self,
        job: &RenderJob,
        gpu: &GpuId,
    ) -> RendergridResult<Box<dyn RenderHandle>> {
        let mut cmd = self.build_command(job, gpu);

        match cmd.spawn() {
            Ok(child) => {
                info!(
                    job = %job,
                    gpu = %gpu,
                    pid = child.id().unwrap_or(0),
                    "Render process spawned"
                );
                Ok(Box::new(ProcessHandle {
                    job: job.clone(),
                    child,
                }))
            }
            Err(e) => {
                error!(job = %job, gpu = %gpu, error = %e, "Failed to spawn render process");
                Err(RendergridError::Launch(format!(
                    "Failed to spawn renderer for {}: {}",
                    job, e
                )))
            }
        }
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

/// Handle wrapping one spawned render process
pub struct ProcessHandle {
    job: RenderJob,
    child: Child,
}

#[async_trait]
impl RenderHandle for ProcessHandle {
    async fn wait(&mut self) -> RendergridResult<ExitReport> {
        let status = self.child.wait().await?;

        if status.success() {
            debug!(job = %self.job, "Render process completed");
        } else {
            error!(job = %self.job, status = %status, "Render process failed");
        }

        Ok(ExitReport {
            success: status.success(),
            code: status.code(),
        })
    }
}
