//! gmond collector implementing the poll cycle.

use super::config::GmondConfig;
use super::decoder::decode;
use super::error::{GmondError, GmondResult};
use super::registry::GaugeRegistry;
use super::report::Report;
use super::sanitize::sanitize;
use crate::module::{Collector, PollPhase, SampleSink};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Collector republishing a gmond report as cluster-labeled gauges.
///
/// The registry is created with the collector and only grows: every metric
/// name ever seen keeps its gauge, and every cluster keeps its last value
/// until a later poll overwrites it.
#[derive(Debug)]
pub struct GmondCollector {
    /// Configuration.
    config: GmondConfig,
    /// Gauges discovered so far.
    registry: Arc<GaugeRegistry>,
    /// Current poll phase.
    phase: PollPhase,
}

impl GmondCollector {
    /// Create a collector with the given configuration.
    #[must_use]
    pub fn new(config: GmondConfig) -> Self {
        let registry = Arc::new(GaugeRegistry::new(&config.namespace));
        Self {
            config,
            registry,
            phase: PollPhase::Idle,
        }
    }

    /// Get the active configuration.
    #[must_use]
    pub fn config(&self) -> &GmondConfig {
        &self.config
    }

    /// Get the gauge registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<GaugeRegistry> {
        &self.registry
    }

    /// Current poll phase.
    #[must_use]
    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Runs one poll cycle: fetch, apply, flush.
    ///
    /// # Errors
    ///
    /// Returns the connection or decode failure that aborted the poll. The
    /// registry is left exactly as it was before the call.
    pub async fn update(&mut self, sink: &SampleSink) -> GmondResult<()> {
        debug!(address = %self.config.address, "gmond collector update");

        let report = match self.fetch().await {
            Ok(report) => report,
            Err(e) => {
                warn!(phase = %e.phase(), error = %e, "gmond poll failed");
                return Err(e);
            },
        };

        self.phase = PollPhase::Applying;
        let applied = self.apply(&report);

        self.phase = PollPhase::Flushing;
        let flushed = self.flush(sink);

        self.phase = PollPhase::Idle;
        debug!(
            clusters = report.clusters.len(),
            applied, flushed, "gmond poll complete"
        );
        Ok(())
    }

    /// Connects to the daemon and decodes its report.
    ///
    /// Connecting and decoding together are bounded by the configured
    /// timeout. The connection is closed before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`GmondError::Connect`], [`GmondError::Timeout`],
    /// [`GmondError::Transport`] or [`GmondError::Decode`].
    pub async fn fetch(&mut self) -> GmondResult<Report> {
        let address = self.config.address.as_str();
        let timeout = self.config.timeout;

        self.phase = PollPhase::Connecting;
        let outcome = tokio::time::timeout(timeout, fetch_report(address, &mut self.phase)).await;
        let phase = std::mem::take(&mut self.phase);

        match outcome {
            Ok(result) => result,
            Err(_) => Err(GmondError::Timeout {
                address: address.to_string(),
                timeout,
                phase,
            }),
        }
    }

    /// Writes every metric of `report` into the registry.
    ///
    /// Metrics are visited cluster by cluster, host by host, in document
    /// order; the last value seen for a name within a cluster wins.
    /// Returns the number of values set.
    pub fn apply(&self, report: &Report) -> usize {
        let mut applied = 0;
        for cluster in &report.clusters {
            for host in &cluster.hosts {
                for metric in &host.metrics {
                    let name = sanitize(&metric.name);
                    let handle = self.registry.resolve(&name, metric.help());
                    self.registry.set_value(&handle, &cluster.name, metric.value);
                    applied += 1;
                }
            }
        }
        applied
    }

    /// Sends every registered series to `sink`. Returns the number sent.
    pub fn flush(&self, sink: &SampleSink) -> usize {
        let mut flushed = 0;
        for sample in self.registry.collect_all() {
            if sink.send(sample).is_err() {
                warn!(flushed, "Sample receiver closed, stopping flush");
                break;
            }
            flushed += 1;
        }
        flushed
    }
}

impl Default for GmondCollector {
    fn default() -> Self {
        Self::new(GmondConfig::default())
    }
}

impl Collector for GmondCollector {
    type Error = GmondError;

    fn name(&self) -> &str {
        "gmond"
    }

    async fn update(&mut self, sink: &SampleSink) -> GmondResult<()> {
        GmondCollector::update(self, sink).await
    }
}

/// Opens the connection and decodes one report, recording progress in `phase`.
///
/// The stream is owned here, so it is closed on every return path and when
/// the future is dropped by the timeout.
async fn fetch_report(address: &str, phase: &mut PollPhase) -> GmondResult<Report> {
    let stream = TcpStream::connect(address)
        .await
        .map_err(|source| GmondError::Connect {
            address: address.to_string(),
            source,
        })?;

    *phase = PollPhase::Decoding;
    decode(BufReader::new(stream))
        .await
        .map_err(|e| GmondError::from_decode(address, e))
}
