//! Threshold calibration from live memory sampling
//!
//! A single snapshot under-reports a render job's footprint because scene
//! and texture upload produce transient spikes. The calibrator samples
//! used memory over a short window while the first job runs and takes the
//! observed peak as the job's cost estimate.

use rendergrid_core::GpuId;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::probe::TelemetryProbe;

/// Samples one GPU's used memory over a window to estimate peak job cost
pub struct ThresholdCalibrator {
    probe: Arc<dyn TelemetryProbe>,
    duration: Duration,
    interval: Duration,
    safety_factor: f64,
}

impl ThresholdCalibrator {
    pub fn new(
        probe: Arc<dyn TelemetryProbe>,
        duration: Duration,
        interval: Duration,
        safety_factor: f64,
    ) -> Self {
        Self {
            probe,
            duration,
            interval,
            safety_factor,
        }
    }

    /// Poll used memory for `gpu` over the calibration window and return
    /// the maximum observed value in MiB. Failed samples (device absent
    /// from the snapshot) are skipped rather than treated as zero.
    pub async fn observe_peak(&self, gpu: &GpuId) -> u64 {
        let deadline = Instant::now() + self.duration;
        let mut peak = 0u64;

        loop {
            let used = self.probe.used_memory().await;
            if let Some(&used_mib) = used.get(gpu) {
                if used_mib > peak {
                    peak = used_mib;
                }
                debug!(gpu = %gpu, used_mib, peak, "Calibration sample");
            }

            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(self.interval).await;
        }

        peak
    }

    /// Calibrate the admission threshold: observed peak scaled by the
    /// safety factor, leaving headroom for the next job's own spike.
    pub async fn calibrate(&self, gpu: &GpuId) -> u64 {
        info!(
            gpu = %gpu,
            window_secs = self.duration.as_secs_f64(),
            "Calibrating admission threshold"
        );

        let peak = self.observe_peak(gpu).await;
        let threshold = (peak as f64 * self.safety_factor) as u64;

        info!(gpu = %gpu, peak_mib = peak, threshold_mib = threshold, "Calibration complete");
        threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rendergrid_core::MemoryMap;
    use std::sync::Mutex;

    /// Replays a scripted sequence of used-memory readings for GPU "0"
    struct ScriptedProbe {
        readings: Mutex<Vec<Option<u64>>>,
    }

    impl ScriptedProbe {
        fn new(readings: Vec<Option<u64>>) -> Self {
            Self {
                readings: Mutex::new(readings),
            }
        }
    }

    #[async_trait]
    impl TelemetryProbe for ScriptedProbe {
        async fn free_memory(&self) -> MemoryMap {
            MemoryMap::new()
        }

        async fn used_memory(&self) -> MemoryMap {
            let mut readings = self.readings.lock().unwrap();
            let next = if readings.is_empty() {
                None
            } else {
                readings.remove(0)
            };
            let mut map = MemoryMap::new();
            if let Some(v) = next {
                map.insert(GpuId::from("0"), v);
            }
            map
        }
    }

    fn calibrator(probe: ScriptedProbe, factor: f64) -> ThresholdCalibrator {
        ThresholdCalibrator::new(
            Arc::new(probe),
            Duration::from_millis(100),
            Duration::from_millis(1),
            factor,
        )
    }

    #[tokio::test]
    async fn test_peak_is_maximum_sample() {
        let probe = ScriptedProbe::new(vec![
            Some(1000),
            Some(4200),
            Some(3900),
            Some(2000),
            Some(1000),
            Some(1000),
            Some(1000),
            Some(1000),
        ]);
        let cal = calibrator(probe, 1.0);
        let peak = cal.observe_peak(&GpuId::from("0")).await;
        assert_eq!(peak, 4200);
    }

    #[tokio::test]
    async fn test_failed_samples_are_skipped() {
        let probe = ScriptedProbe::new(vec![Some(500), None, Some(700), None]);
        let cal = calibrator(probe, 1.0);
        let peak = cal.observe_peak(&GpuId::from("0")).await;
        assert_eq!(peak, 700);
    }

    #[tokio::test]
    async fn test_all_samples_failed_yields_zero() {
        let probe = ScriptedProbe::new(Vec::new());
        let cal = calibrator(probe, 1.5);
        assert_eq!(cal.calibrate(&GpuId::from("0")).await, 0);
    }

    #[tokio::test]
    async fn test_safety_factor_scales_threshold() {
        let probe = ScriptedProbe::new(vec![Some(1000); 10]);
        let cal = calibrator(probe, 1.5);
        let threshold = cal.calibrate(&GpuId::from("0")).await;
        assert_eq!(threshold, 1500);
    }
}
