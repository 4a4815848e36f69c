//! Minimal metrics registry for the decision engine.
//!
//! No external metrics crate; counters and histograms with dynamic labels are
//! backed by `DashMap`. Labels are flattened into sorted key vectors to keep
//! deterministic ordering. Histogram buckets are fixed in microseconds to
//! avoid floating point math.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn render_labels(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for an exact label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format, rows sorted by label set.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        let mut rows: Vec<(String, u64)> = self
            .map
            .iter()
            .map(|r| (render_labels(r.key()), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (labels, val) in rows {
            let _ = writeln!(out, "{}{{{}}} {}", name, labels, val);
        }
    }
}

// 10us, 50us, 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms
const BUCKETS_MICROS: [u64; 9] = [10, 50, 100, 500, 1_000, 5_000, 10_000, 50_000, 100_000];

/// Per-label histogram. `slots[i]` counts observations that fall in bucket
/// `i` only; the last slot is the overflow above the largest bound.
#[derive(Default)]
struct Slots {
    sum: AtomicU64,
    slots: [AtomicU64; BUCKETS_MICROS.len() + 1],
}

impl Slots {
    fn total(&self) -> u64 {
        self.slots.iter().map(|s| s.load(Ordering::Relaxed)).sum()
    }
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<Vec<(String, String)>, Slots>,
}

impl HistogramVec {
    /// Record one duration (microsecond scale).
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        let slot = BUCKETS_MICROS.partition_point(|&bound| bound < micros);

        let entry = self.map.entry(label_key(labels)).or_default();
        entry.slots[slot].fetch_add(1, Ordering::Relaxed);
        entry.sum.fetch_add(micros, Ordering::Relaxed);
    }

    /// Number of observations for an exact label set.
    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.total())
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format. Buckets are made
    /// cumulative here.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} histogram", name);

        let mut rows: Vec<(String, Vec<u64>, u64)> = self
            .map
            .iter()
            .map(|r| {
                let slots = r.value().slots.iter().map(|s| s.load(Ordering::Relaxed)).collect();
                (render_labels(r.key()), slots, r.value().sum.load(Ordering::Relaxed))
            })
            .collect();
        rows.sort();

        for (labels, slots, sum) in rows {
            let sep = if labels.is_empty() { "" } else { "," };
            let mut seen = 0u64;
            for (le, n) in BUCKETS_MICROS.iter().zip(&slots) {
                seen += *n;
                let _ = writeln!(out, "{name}_bucket{{{labels}{sep}le=\"{le}\"}} {seen}");
            }
            let total: u64 = slots.iter().sum();
            let _ = writeln!(out, "{name}_bucket{{{labels}{sep}le=\"+Inf\"}} {total}");
            let _ = writeln!(out, "{name}_sum{{{labels}}} {sum}");
            let _ = writeln!(out, "{name}_count{{{labels}}} {total}");
        }
    }
}

/// Decision metrics. Faults carry their own outcome label so a
/// misconfigured accessor never looks like an ordinary Deny.
#[derive(Default)]
pub struct GuardMetrics {
    /// labels: outcome, path
    pub decisions: CounterVec,
    /// labels: model
    pub resolution_faults: CounterVec,
    /// labels: path
    pub decision_duration: HistogramVec,
}

impl GuardMetrics {
    /// Render every decision metric.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.decisions.render("ownerguard_decisions_total", &mut out);
        self.resolution_faults
            .render("ownerguard_resolution_faults_total", &mut out);
        self.decision_duration
            .render("ownerguard_decision_duration_micros", &mut out);
        out
    }
}
