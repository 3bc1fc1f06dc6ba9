use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Media-job polling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Refresh cycle interval.
    #[serde(default = "d_interval_ms")]
    pub interval_ms: u64,
    /// Terminal jobs are dropped from the tracked set after this many
    /// cycles, so the set does not grow without bound.
    #[serde(default = "d_evict_after_cycles")]
    pub evict_after_cycles: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: d_interval_ms(),
            evict_after_cycles: d_evict_after_cycles(),
        }
    }
}

fn d_interval_ms() -> u64 {
    5_000
}

fn d_evict_after_cycles() -> u32 {
    12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PollingConfig::default();
        assert_eq!(cfg.interval_ms, 5_000);
        assert_eq!(cfg.evict_after_cycles, 12);
    }
}
