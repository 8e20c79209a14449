//! GPU identifiers and memory snapshots

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque identifier for one GPU device in the configured pool.
///
/// Telemetry keys devices by their stringified enumeration index, so the
/// identifier is a string rather than a numeric index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GpuId(pub String);

impl GpuId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GpuId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GpuId {
    fn from(s: &str) -> Self {
        GpuId(s.to_string())
    }
}

impl From<u32> for GpuId {
    fn from(index: u32) -> Self {
        GpuId(index.to_string())
    }
}

/// Point-in-time memory snapshot, one value per device in MiB.
///
/// Produced fresh on every telemetry query. An empty map means the query
/// failed and the device state is unknown, not that memory usage is zero.
pub type MemoryMap = BTreeMap<GpuId, u64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_id_from_index() {
        assert_eq!(GpuId::from(3), GpuId("3".to_string()));
        assert_eq!(GpuId::from(3).to_string(), "3");
    }

    #[test]
    fn test_memory_map_lookup() {
        let mut map = MemoryMap::new();
        map.insert(GpuId::from("0"), 16384);
        assert_eq!(map.get(&GpuId::from("0")), Some(&16384));
        assert_eq!(map.get(&GpuId::from("1")), None);
    }
}
