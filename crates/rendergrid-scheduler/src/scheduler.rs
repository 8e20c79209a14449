//! The scheduler loop
//!
//! Drives the whole batch from a single control task: for each job, rotate
//! through GPU candidates until admission control accepts one, launch the
//! render process, and move on without waiting for completion. Concurrency
//! comes entirely from the spawned processes; admission control is the only
//! throttle. At the end every recorded handle is drained in launch order.

use rendergrid_core::{GpuConfig, GpuId, RenderJob};
use rendergrid_runtime::{RenderHandle, RenderRuntime};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::admission::AdmissionController;
use crate::calibrate::ThresholdCalibrator;
use crate::probe::TelemetryProbe;
use crate::select::RoundRobin;

/// Aggregate outcome of one scheduling run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Jobs enumerated from the plan
    pub total: usize,
    /// Jobs successfully launched
    pub launched: usize,
    /// Jobs that completed with exit status zero
    pub succeeded: usize,
    /// Jobs that completed with a non-zero exit status
    pub failed: Vec<(RenderJob, Option<i32>)>,
    /// Jobs whose process could not be started
    pub launch_failed: Vec<RenderJob>,
    /// Jobs that exhausted the admission attempt bound
    pub starved: Vec<RenderJob>,
}

impl RunReport {
    /// True when every enumerated job launched and exited cleanly
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

/// One launched job awaiting completion
struct InFlight {
    job: RenderJob,
    gpu: GpuId,
    handle: Box<dyn RenderHandle>,
}

/// What became of one job's admission attempt
enum Admission {
    Launched(InFlight),
    Starved,
    LaunchFailed,
}

/// Admission-controlled, GPU-aware scheduler for a batch of render jobs
pub struct RenderScheduler {
    selector: RoundRobin,
    admission: AdmissionController,
    calibrator: ThresholdCalibrator,
    runtime: Arc<dyn RenderRuntime>,
    /// Minimum free MiB required for admission; 0 until calibration runs
    threshold: u64,
    /// Whether the one-shot calibration has been attempted
    calibrated: bool,
    max_attempts_per_job: Option<u32>,
}

impl RenderScheduler {
    /// Wire up a scheduler from the GPU configuration and the two seams
    /// (telemetry probe, render runtime).
    pub fn new(
        config: &GpuConfig,
        probe: Arc<dyn TelemetryProbe>,
        runtime: Arc<dyn RenderRuntime>,
    ) -> Self {
        info!(
            pool = ?config.pool,
            load_delay_ms = config.load_delay_ms,
            safety_factor = config.safety_factor,
            "Scheduler initialized"
        );

        Self {
            selector: RoundRobin::new(config.pool.clone()),
            admission: AdmissionController::new(
                Arc::clone(&probe),
                Duration::from_millis(config.load_delay_ms),
            ),
            calibrator: ThresholdCalibrator::new(
                probe,
                Duration::from_secs(config.calibration_secs),
                Duration::from_millis(config.calibration_interval_ms),
                config.safety_factor,
            ),
            runtime,
            threshold: 0,
            calibrated: false,
            max_attempts_per_job: config.max_attempts_per_job,
        }
    }

    /// Total GPU selection attempts made so far, including denied ones
    pub fn selection_attempts(&self) -> u64 {
        self.selector.cursor()
    }

    /// Current admission threshold in MiB (0 while uncalibrated)
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Run the whole batch: admit and launch every job, then drain.
    pub async fn run(&mut self, jobs: Vec<RenderJob>) -> RunReport {
        let mut report = RunReport {
            total: jobs.len(),
            ..RunReport::default()
        };
        let mut in_flight: Vec<InFlight> = Vec::new();

        for job in jobs {
            match self.admit_and_launch(&job).await {
                Admission::Launched(launched) => {
                    report.launched += 1;
                    in_flight.push(launched);
                }
                Admission::Starved => {
                    warn!(job = %job, "Job starved out of admission attempts, skipping");
                    report.starved.push(job);
                }
                Admission::LaunchFailed => {
                    report.launch_failed.push(job);
                }
            }
        }

        self.drain(in_flight, &mut report).await;
        report
    }

    /// Rotate through GPU candidates until one admits the job, then launch.
    ///
    /// Starvation (the configured attempt bound ran out) and launch failure
    /// both leave the rest of the batch unaffected.
    async fn admit_and_launch(&mut self, job: &RenderJob) -> Admission {
        let mut attempts = 0u32;

        loop {
            if let Some(max) = self.max_attempts_per_job {
                if attempts >= max {
                    return Admission::Starved;
                }
            }

            let candidate = self.selector.next_candidate();
            attempts += 1;

            if !self.admission.is_admissible(&candidate, self.threshold).await {
                continue;
            }

            info!(job = %job, gpu = %candidate, attempts, "Job admitted, launching");

            let handle = match self.runtime.launch(job, &candidate).await {
                Ok(handle) => handle,
                Err(e) => {
                    error!(job = %job, gpu = %candidate, error = %e, "Launch failed");
                    return Admission::LaunchFailed;
                }
            };

            // One-shot: sample the first job's memory footprint to turn the
            // open-admission policy into a data-driven threshold.
            if !self.calibrated {
                self.calibrated = true;
                self.threshold = self.calibrator.calibrate(&candidate).await;
            }

            return Admission::Launched(InFlight {
                job: job.clone(),
                gpu: candidate,
                handle,
            });
        }
    }

    /// Await every in-flight handle in launch order and record outcomes.
    async fn drain(&mut self, in_flight: Vec<InFlight>, report: &mut RunReport) {
        let total = in_flight.len();
        info!(in_flight = total, "All jobs launched, draining");

        for (done, mut entry) in in_flight.into_iter().enumerate() {
            match entry.handle.wait().await {
                Ok(exit) if exit.success => {
                    report.succeeded += 1;
                    info!(
                        job = %entry.job,
                        gpu = %entry.gpu,
                        completed = done + 1,
                        total,
                        "Job completed"
                    );
                }
                Ok(exit) => {
                    error!(
                        job = %entry.job,
                        gpu = %entry.gpu,
                        code = ?exit.code,
                        "Job exited with failure"
                    );
                    report.failed.push((entry.job, exit.code));
                }
                Err(e) => {
                    error!(job = %entry.job, error = %e, "Failed to await job");
                    report.failed.push((entry.job, None));
                }
            }
        }
    }
}
