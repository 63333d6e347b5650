//! # Collector Contract
//!
//! Defines the interface an external scheduler uses to drive collectors,
//! the sample type they emit, and the phases of a poll.

mod contract;
mod status;

pub use contract::{Collector, Sample, SampleSink};
pub(crate) use contract::{escape_help, escape_label_value};
pub use status::PollPhase;
