use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Per-node process counters. Shared via `Arc` so a host can read them
/// while the node keeps running.
pub struct NodeMetrics {
    node_id: String,
    process_calls: AtomicU64,
    failures: AtomicU64,
    total_latency_us: AtomicU64,
    max_latency_us: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub node_id: String,
    pub process_calls: u64,
    pub failures: u64,
    pub avg_latency_us: u64,
    pub max_latency_us: u64,
}

impl NodeMetrics {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            process_calls: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            max_latency_us: AtomicU64::new(0),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn process_calls(&self) -> u64 {
        self.process_calls.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Run one process call, recording its latency and outcome.
    pub fn measure<R>(&self, f: impl FnOnce() -> anyhow::Result<R>) -> anyhow::Result<R> {
        let start = Instant::now();
        let result = f();
        let latency_us = start.elapsed().as_micros() as u64;

        self.process_calls.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.max_latency_us.fetch_max(latency_us, Ordering::Relaxed);
        if result.is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    pub fn avg_latency_us(&self) -> u64 {
        let calls = self.process_calls();
        if calls == 0 {
            return 0;
        }
        self.total_latency_us.load(Ordering::Relaxed) / calls
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            node_id: self.node_id.clone(),
            process_calls: self.process_calls(),
            failures: self.failures(),
            avg_latency_us: self.avg_latency_us(),
            max_latency_us: self.max_latency_us.load(Ordering::Relaxed),
        }
    }
}
