//! In-memory tree of one decoded gmond report.

/// Root of one decoded poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Clusters in document order.
    pub clusters: Vec<Cluster>,
}

impl Report {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of metrics across every cluster and host.
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.clusters
            .iter()
            .flat_map(|c| &c.hosts)
            .map(|h| h.metrics.len())
            .sum()
    }
}

/// A gmond cluster. Its name becomes the `cluster` label value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cluster {
    /// Cluster name.
    pub name: String,
    /// Cluster owner, if reported.
    pub owner: Option<String>,
    /// Hosts in document order.
    pub hosts: Vec<Host>,
}

impl Cluster {
    /// Creates an empty cluster.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a host.
    #[must_use]
    pub fn with_host(mut self, host: Host) -> Self {
        self.hosts.push(host);
        self
    }
}

/// A host reporting into a cluster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Host {
    /// Host name.
    pub name: String,
    /// Host address, if reported.
    pub ip: Option<String>,
    /// Metrics in document order.
    pub metrics: Vec<Metric>,
}

impl Host {
    /// Creates a host with no metrics.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a metric.
    #[must_use]
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }
}

/// A single measurement with its descriptive extras.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metric {
    /// Raw metric name as reported by the daemon.
    pub name: String,
    /// Measured value.
    pub value: f64,
    /// Declared value type (`float`, `uint32`, ...).
    pub metric_type: Option<String>,
    /// Declared unit.
    pub units: Option<String>,
    /// Extra descriptive attributes in document order.
    pub extra: Vec<ExtraElement>,
}

impl Metric {
    /// Creates a metric with no extras.
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            ..Self::default()
        }
    }

    /// Adds an extra attribute.
    #[must_use]
    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push(ExtraElement::new(name, value));
        self
    }

    /// Returns the `DESC` and `TITLE` extras.
    ///
    /// Extras are scanned in document order; a later occurrence replaces an
    /// earlier one until both have been seen, at which point the scan stops.
    #[must_use]
    pub fn description(&self) -> (Option<&str>, Option<&str>) {
        let mut desc = None;
        let mut title = None;
        for element in &self.extra {
            match element.name.as_str() {
                "DESC" => desc = Some(element.value.as_str()),
                "TITLE" => title = Some(element.value.as_str()),
                _ => {},
            }
            if desc.is_some_and(|d| !d.is_empty()) && title.is_some_and(|t| !t.is_empty()) {
                break;
            }
        }
        (desc, title)
    }

    /// Help text for this metric: its `DESC`, or empty.
    #[must_use]
    pub fn help(&self) -> &str {
        self.description().0.unwrap_or("")
    }
}

/// One `EXTRA_ELEMENT` name/value pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraElement {
    /// Attribute name, e.g. `DESC`.
    pub name: String,
    /// Attribute value.
    pub value: String,
}

impl ExtraElement {
    /// Creates an extra element.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
