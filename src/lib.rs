//! # gmond-bridge
//!
//! A telemetry bridge that polls a Ganglia `gmond` daemon and republishes
//! its cluster report as Prometheus-compatible gauges.
//!
//! ## Features
//!
//! - Streaming decode of the gmond XML report
//! - Runtime registration of one gauge per discovered metric name
//! - Metric name sanitization into the Prometheus identifier alphabet
//! - Per-cluster labels with values retained across polls
//!
//! ## Architecture
//!
//! Collectors implement the [`module::Collector`] trait. An external
//! scheduler calls [`Collector::update`](module::Collector::update) on each
//! poll and receives every current series as a [`module::Sample`] on a
//! channel. Serving those samples over HTTP is left to the host process.
//!
//! ```ignore
//! use gmond_bridge::modules::gmond::{GmondCollector, GmondConfig};
//!
//! let mut collector = GmondCollector::new(GmondConfig::new("gmond.internal:8649"));
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! collector.update(&tx).await?;
//! while let Ok(sample) = rx.try_recv() {
//!     println!("{}", sample.to_prometheus());
//! }
//! ```

pub mod module;
pub mod modules;
