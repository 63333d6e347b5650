//! The collector contract driven by the external scheduler.

use std::future::Future;
use tokio::sync::mpsc;

/// One published series value emitted during a flush.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Fully qualified metric name (namespace prefix included).
    pub name: String,

    /// Help text fixed at first registration. Empty when unknown.
    pub help: String,

    /// Value of the `cluster` label.
    pub cluster: String,

    /// Current gauge value.
    pub value: f64,
}

impl Sample {
    /// Creates a new sample.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        cluster: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            cluster: cluster.into(),
            value,
        }
    }

    /// Formats the sample as a single Prometheus exposition line.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "{}{{cluster=\"{}\"}} {}",
            self.name,
            escape_label_value(&self.cluster),
            self.value
        )
    }
}

/// Channel half that receives flushed samples.
pub type SampleSink = mpsc::UnboundedSender<Sample>;

/// A metrics source polled by an external scheduler.
///
/// Each call to [`update`](Collector::update) performs one full poll cycle
/// and pushes every currently known series into `sink`. Calls on a single
/// instance are serialized through `&mut self`; different collectors may be
/// updated concurrently.
///
/// # Example
///
/// ```ignore
/// use gmond_bridge::module::{Collector, SampleSink};
///
/// async fn poll_all<C: Collector>(collector: &mut C, sink: &SampleSink) {
///     if let Err(e) = collector.update(sink).await {
///         tracing::warn!(collector = collector.name(), error = %e, "poll failed");
///     }
/// }
/// ```
pub trait Collector: Send {
    /// Error returned by a failed poll.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short name identifying the collector.
    fn name(&self) -> &str;

    /// Runs one poll cycle and flushes all series into `sink`.
    ///
    /// # Errors
    ///
    /// Returns the first error hit while acquiring or decoding the source
    /// data. A failed poll leaves previously published values untouched.
    fn update(&mut self, sink: &SampleSink)
        -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Escapes a label value for the text exposition format.
pub(crate) fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Escapes help text for the text exposition format.
pub(crate) fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}
