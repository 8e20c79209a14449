//! GPU memory telemetry
//!
//! Queries per-device memory through an external management command
//! (`nvidia-smi` by default). Every call is a fresh snapshot; failures
//! degrade to an empty snapshot so a broken query reads as "state
//! unknown" rather than "memory free".

use async_trait::async_trait;
use rendergrid_core::{GpuId, MemoryMap};
use tokio::process::Command;
use tracing::error;

/// Point-in-time memory telemetry for all installed GPUs
#[async_trait]
pub trait TelemetryProbe: Send + Sync {
    /// Free memory per device, in MiB. Empty on query failure.
    async fn free_memory(&self) -> MemoryMap;

    /// Used memory per device, in MiB. Empty on query failure.
    async fn used_memory(&self) -> MemoryMap;
}

/// Probe backed by the `nvidia-smi` management CLI
pub struct SmiProbe {
    command: String,
}

impl SmiProbe {
    pub fn new() -> Self {
        Self {
            command: "nvidia-smi".to_string(),
        }
    }

    /// Use a different management command (tests, wrapper scripts)
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    async fn query(&self, field: &str) -> MemoryMap {
        let output = Command::new(&self.command)
            .arg(format!("--query-gpu={}", field))
            .arg("--format=csv,noheader,nounits")
            .output()
            .await;

        let output = match output {
            Ok(o) => o,
            Err(e) => {
                error!(command = %self.command, error = %e, "Telemetry query failed to execute");
                return MemoryMap::new();
            }
        };

        if !output.status.success() {
            error!(
                command = %self.command,
                status = %output.status,
                "Telemetry query exited with an error"
            );
            return MemoryMap::new();
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_memory_query(&stdout) {
            Ok(map) => map,
            Err(e) => {
                error!(command = %self.command, error = %e, "Failed to parse telemetry output");
                MemoryMap::new()
            }
        }
    }
}

impl Default for SmiProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelemetryProbe for SmiProbe {
    async fn free_memory(&self) -> MemoryMap {
        self.query("memory.free").await
    }

    async fn used_memory(&self) -> MemoryMap {
        self.query("memory.used").await
    }
}

/// Parse one-value-per-line query output into a device-indexed map.
///
/// Devices are keyed by their enumeration order, stringified, matching
/// the pool identifiers in the configuration.
fn parse_memory_query(raw: &str) -> Result<MemoryMap, String> {
    let mut map = MemoryMap::new();
    let mut index = 0u32;
    for (line_no, raw_line) in raw.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let value = line
            .parse::<u64>()
            .map_err(|_| format!("invalid memory value '{}' at line {}", line, line_no + 1))?;
        map.insert(GpuId::from(index), value);
        index += 1;
    }
    Ok(map)
}
