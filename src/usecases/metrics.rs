//! In-process skill counters served by `GET /api/metrics`.

use crate::usecases::contract::SkillKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone, Serialize)]
pub struct SkillStats {
    pub agent: &'static str,
    pub invocations: u64,
    pub failures: u64,
    pub total_latency_ms: u64,
    pub avg_latency_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub total_invocations: u64,
    pub total_failures: u64,
    /// Keyed by skill name; every skill is present even before its first call.
    pub skills: BTreeMap<&'static str, SkillStats>,
}

pub struct SkillMetrics {
    started_at: DateTime<Utc>,
    started: Instant,
    stats: Mutex<HashMap<SkillKind, SkillStats>>,
}

impl SkillMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
            stats: Mutex::new(HashMap::new()),
        }
    }

    pub fn record(&self, kind: SkillKind, elapsed: Duration, ok: bool) {
        // A poisoned lock only loses counters.
        if let Ok(mut stats) = self.stats.lock() {
            let entry = stats.entry(kind).or_default();
            entry.invocations += 1;
            if !ok {
                entry.failures += 1;
            }
            entry.total_latency_ms += elapsed.as_millis() as u64;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let recorded = self
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();

        let mut skills = BTreeMap::new();
        for kind in SkillKind::ALL {
            let mut s = recorded.get(&kind).cloned().unwrap_or_default();
            s.agent = kind.agent();
            s.avg_latency_ms = if s.invocations == 0 {
                0.0
            } else {
                s.total_latency_ms as f64 / s.invocations as f64
            };
            skills.insert(kind.as_str(), s);
        }

        MetricsSnapshot {
            started_at: self.started_at,
            uptime_secs: self.started.elapsed().as_secs(),
            total_invocations: skills.values().map(|s| s.invocations).sum(),
            total_failures: skills.values().map(|s| s.failures).sum(),
            skills,
        }
    }
}

impl Default for SkillMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lists_every_skill() {
        let metrics = SkillMetrics::new();
        metrics.record(SkillKind::Chat, Duration::from_millis(30), true);
        metrics.record(SkillKind::Chat, Duration::from_millis(10), false);

        let snap = metrics.snapshot();
        assert_eq!(snap.skills.len(), SkillKind::ALL.len());
        let chat = &snap.skills["chat"];
        assert_eq!(chat.invocations, 2);
        assert_eq!(chat.failures, 1);
        assert_eq!(chat.avg_latency_ms, 20.0);
        assert_eq!(chat.agent, "assistant");
        assert_eq!(snap.skills["seo"].invocations, 0);
        assert_eq!(snap.total_invocations, 2);
        assert_eq!(snap.total_failures, 1);
    }
}
