//! Configuration types for rendergrid

use crate::gpu::GpuId;
use crate::{RendergridError, RendergridResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level configuration for a scheduling run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Render executable configuration
    pub render: RenderConfig,
    /// Batch plan (frames, layers, output layout)
    pub plan: RenderPlan,
    /// GPU pool and admission tunables
    pub gpu: GpuConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> RendergridResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RendergridError::Config(format!("Failed to read config file: {}", e))
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants that cannot be expressed in the TOML schema
    pub fn validate(&self) -> RendergridResult<()> {
        if self.gpu.pool.is_empty() {
            return Err(RendergridError::Config(
                "GPU pool must contain at least one device".to_string(),
            ));
        }
        if self.plan.end_frame < self.plan.start_frame {
            return Err(RendergridError::Config(format!(
                "start_frame ({}) must not exceed end_frame ({})",
                self.plan.start_frame, self.plan.end_frame
            )));
        }
        if self.plan.layers.is_empty() {
            return Err(RendergridError::Config(
                "plan must define at least one render layer".to_string(),
            ));
        }
        if self.gpu.safety_factor < 1.0 {
            return Err(RendergridError::Config(format!(
                "safety_factor must be >= 1.0, got {}",
                self.gpu.safety_factor
            )));
        }
        Ok(())
    }
}

/// Render executable configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Path to the render executable
    pub executable: PathBuf,
    /// Scene file opened by the renderer
    pub scene_file: PathBuf,
    /// Extra arguments appended after the positional job arguments
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Environment variable used to pin the process to one GPU
    #[serde(default = "default_gpu_env_var")]
    pub gpu_env_var: String,
}

fn default_gpu_env_var() -> String {
    "CUDA_VISIBLE_DEVICES".to_string()
}

/// Batch plan: which frames and layers to render, and where output goes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderPlan {
    /// Scene identifier used in the output directory layout
    pub scene: String,
    /// First frame of the range (inclusive)
    pub start_frame: u32,
    /// Last frame of the range (inclusive)
    pub end_frame: u32,
    /// Root directory for rendered output
    pub output_dir: PathBuf,
    /// Render-layer name to target object/material identifier
    pub layers: BTreeMap<String, String>,
}

/// GPU pool and admission control tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuConfig {
    /// Ordered pool of GPU identifiers to round-robin across
    pub pool: Vec<GpuId>,
    /// Delay before each admission check, in milliseconds
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,
    /// Length of the calibration sampling window, in seconds
    #[serde(default = "default_calibration_secs")]
    pub calibration_secs: u64,
    /// Interval between calibration samples, in milliseconds
    #[serde(default = "default_calibration_interval_ms")]
    pub calibration_interval_ms: u64,
    /// Multiplier applied to the calibrated peak to leave headroom
    #[serde(default = "default_safety_factor")]
    pub safety_factor: f64,
    /// Upper bound on admission attempts per job; unbounded when absent
    #[serde(default)]
    pub max_attempts_per_job: Option<u32>,
}

fn default_load_delay_ms() -> u64 {
    2000
}

fn default_calibration_secs() -> u64 {
    20
}

fn default_calibration_interval_ms() -> u64 {
    500
}

fn default_safety_factor() -> f64 {
    1.2
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            pool: vec![GpuId::from(0)],
            load_delay_ms: default_load_delay_ms(),
            calibration_secs: default_calibration_secs(),
            calibration_interval_ms: default_calibration_interval_ms(),
            safety_factor: default_safety_factor(),
            max_attempts_per_job: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    const BASE: &str = r#"
[render]
executable = "/opt/blender/blender"
scene_file = "cache/SpacecraftMotion.blend"

[plan]
scene = "002"
start_frame = 0
end_frame = 480
output_dir = "cache/dataset"

[plan.layers]
nucleus = "AsteroidSurface.001"
jets = "Dust.001"

[gpu]
pool = ["0", "1"]
"#;

    #[test]
    fn test_config_parse_defaults() {
        let config = parse(BASE);
        assert_eq!(config.gpu.load_delay_ms, 2000);
        assert_eq!(config.gpu.calibration_secs, 20);
        assert!((config.gpu.safety_factor - 1.2).abs() < f64::EPSILON);
        assert_eq!(config.gpu.max_attempts_per_job, None);
        assert_eq!(config.render.gpu_env_var, "CUDA_VISIBLE_DEVICES");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_empty_pool() {
        let mut config = parse(BASE);
        config.gpu.pool.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_inverted_frame_range() {
        let mut config = parse(BASE);
        config.plan.start_frame = 500;
        config.plan.end_frame = 486;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_shrinking_safety_factor() {
        let mut config = parse(BASE);
        config.gpu.safety_factor = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_explicit_tunables() {
        let toml_str = format!(
            "{}load_delay_ms = 250\nmax_attempts_per_job = 16\n",
            BASE
        );
        let config = parse(&toml_str);
        assert_eq!(config.gpu.load_delay_ms, 250);
        assert_eq!(config.gpu.max_attempts_per_job, Some(16));
    }
}
