//! # Collector Modules
//!
//! Each module implements the [`Collector`](crate::module::Collector) trait
//! so an external scheduler can poll it and gather its samples.
//!
//! ## Available Modules
//!
//! - [`gmond`] - Ganglia gmond cluster reports republished as gauges

pub mod gmond;
