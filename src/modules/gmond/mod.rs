//! gmond Collector Module
//!
//! Polls a Ganglia `gmond` daemon over TCP, decodes its XML cluster report,
//! and republishes every numeric metric as a gauge labeled by cluster.
//! Metric names are discovered at runtime and sanitized into the
//! `[A-Za-z0-9_]` alphabet before registration.

mod collector;
mod config;
mod decoder;
mod error;
mod registry;
mod report;
mod sanitize;

pub use collector::GmondCollector;
pub use config::GmondConfig;
pub use decoder::decode;
pub use error::{ConfigError, ConfigResult, DecodeError, GmondError, GmondResult};
pub use registry::{GaugeHandle, GaugeRegistry};
pub use report::{Cluster, ExtraElement, Host, Metric, Report};
pub use sanitize::{is_sanitized, sanitize};
