//! Registry of dynamically discovered, cluster-labeled gauges.

use crate::module::{escape_help, escape_label_value, Sample};
use prometheus_client::metrics::gauge::Gauge;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Gauge cell storing an `f64`.
type GaugeCell = Gauge<f64, AtomicU64>;

/// A gauge with a single `cluster` label.
///
/// Help text is captured when the handle is created and never changes.
/// Values are kept per cluster for the lifetime of the handle.
#[derive(Debug)]
pub struct GaugeHandle {
    /// Sanitized metric name, without namespace.
    name: String,
    /// Fully qualified metric name.
    full_name: String,
    /// Help text.
    help: String,
    /// Gauge cells keyed by cluster label value.
    values: RwLock<BTreeMap<String, GaugeCell>>,
}

impl GaugeHandle {
    fn new(namespace: &str, name: &str, help: &str) -> Self {
        Self {
            name: name.to_string(),
            full_name: format!("{namespace}_{name}"),
            help: help.to_string(),
            values: RwLock::new(BTreeMap::new()),
        }
    }

    /// Sanitized metric name, without namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Published metric name, `<namespace>_<name>`.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Help text captured at registration.
    #[must_use]
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Sets the value for `cluster`, replacing any previous value.
    pub fn set(&self, cluster: &str, value: f64) {
        {
            let values = read(&self.values);
            if let Some(gauge) = values.get(cluster) {
                gauge.set(value);
                return;
            }
        }

        let mut values = write(&self.values);
        values
            .entry(cluster.to_string())
            .or_default()
            .set(value);
    }

    /// Current value for `cluster`.
    #[must_use]
    pub fn get(&self, cluster: &str) -> Option<f64> {
        read(&self.values).get(cluster).map(GaugeCell::get)
    }

    /// Number of cluster labels holding a value.
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.values).len()
    }

    /// Returns `true` if no value has been set yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current `(cluster, value)` pairs, ordered by cluster.
    #[must_use]
    pub fn values(&self) -> Vec<(String, f64)> {
        read(&self.values)
            .iter()
            .map(|(cluster, gauge)| (cluster.clone(), gauge.get()))
            .collect()
    }

    fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.values()
            .into_iter()
            .map(move |(cluster, value)| Sample::new(&self.full_name, &self.help, cluster, value))
    }
}

/// Map from sanitized metric name to its gauge handle.
///
/// Handles are created on first sight of a name and never removed.
#[derive(Debug)]
pub struct GaugeRegistry {
    /// Prefix of every published name.
    namespace: String,
    /// Handles keyed by sanitized name.
    handles: RwLock<BTreeMap<String, Arc<GaugeHandle>>>,
}

impl GaugeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            handles: RwLock::new(BTreeMap::new()),
        }
    }

    /// Namespace prefixed to every published name.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the handle for `name`, creating it with `help` if it is new.
    ///
    /// For an existing handle `help` is ignored.
    pub fn resolve(&self, name: &str, help: &str) -> Arc<GaugeHandle> {
        if let Some(handle) = read(&self.handles).get(name) {
            return Arc::clone(handle);
        }

        let mut handles = write(&self.handles);
        let handle = handles.entry(name.to_string()).or_insert_with(|| {
            debug!(metric = %name, help = %help, "Registered gauge");
            Arc::new(GaugeHandle::new(&self.namespace, name, help))
        });
        Arc::clone(handle)
    }

    /// Sets `value` for `cluster` on `handle`.
    pub fn set_value(&self, handle: &GaugeHandle, cluster: &str, value: f64) {
        trace!(metric = %handle.full_name(), %cluster, value, "Set gauge");
        handle.set(cluster, value);
    }

    /// Returns the handle for `name`, if registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<GaugeHandle>> {
        read(&self.handles).get(name).cloned()
    }

    /// Registered sanitized names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        read(&self.handles).keys().cloned().collect()
    }

    /// Number of registered handles.
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.handles).len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every handle's every label value, ordered by name then cluster.
    #[must_use]
    pub fn collect_all(&self) -> Vec<Sample> {
        let handles: Vec<Arc<GaugeHandle>> = read(&self.handles).values().cloned().collect();
        handles.iter().flat_map(|h| h.samples()).collect()
    }

    /// Encode all gauges in Prometheus text format.
    #[must_use]
    pub fn encode_prometheus(&self) -> String {
        let handles = read(&self.handles);
        let mut output = String::new();

        for handle in handles.values() {
            let name = handle.full_name();
            output.push_str(&format!("# HELP {} {}\n", name, escape_help(handle.help())));
            output.push_str(&format!("# TYPE {} gauge\n", name));
            for (cluster, value) in handle.values() {
                output.push_str(&format!(
                    "{}{{cluster=\"{}\"}} {}\n",
                    name,
                    escape_label_value(&cluster),
                    value
                ));
            }
        }

        output
    }
}

impl Default for GaugeRegistry {
    fn default() -> Self {
        Self::new("ganglia")
    }
}

// Values stay consistent across a panicking writer, so poisoning is not fatal.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
