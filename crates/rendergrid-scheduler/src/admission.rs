//! Free-memory admission control
//!
//! Advisory gate deciding whether one more render job may start on a
//! candidate device. A denial is a retry signal, never a fatal error;
//! the fixed pre-check delay is the scheduler's only throttle on how
//! fast new jobs are admitted.

use rendergrid_core::GpuId;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::probe::TelemetryProbe;

/// Gates job launches on current free memory vs. the calibrated threshold
pub struct AdmissionController {
    probe: Arc<dyn TelemetryProbe>,
    load_delay: Duration,
}

impl AdmissionController {
    pub fn new(probe: Arc<dyn TelemetryProbe>, load_delay: Duration) -> Self {
        Self { probe, load_delay }
    }

    /// Decide whether a job may launch on `gpu` right now.
    ///
    /// Sleeps the configured load delay before reading telemetry. A zero
    /// threshold admits unconditionally: before calibration has run the
    /// controller has no basis to reject. A device missing from the
    /// snapshot (failed query, invalid identifier) is denied.
    pub async fn is_admissible(&self, gpu: &GpuId, threshold: u64) -> bool {
        tokio::time::sleep(self.load_delay).await;

        let free = self.probe.free_memory().await;
        match free.get(gpu) {
            Some(&free_mib) => {
                if threshold == 0 || free_mib >= threshold {
                    debug!(gpu = %gpu, free_mib, threshold, "GPU admissible");
                    true
                } else {
                    warn!(
                        gpu = %gpu,
                        free_mib,
                        threshold,
                        "Insufficient free memory, retrying on next candidate"
                    );
                    false
                }
            }
            None => {
                error!(gpu = %gpu, "GPU absent from telemetry snapshot, denying admission");
                false
            }
        }
    }
}
