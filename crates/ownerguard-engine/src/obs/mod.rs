//! Lightweight in-process metrics (dependency-free).
//!
//! Counters and histograms are stored as atomics and rendered in Prometheus
//! text format by whatever endpoint the embedding service exposes.

pub mod metrics;

pub use metrics::GuardMetrics;
