//! gmond collector error types.

use crate::module::PollPhase;
use std::io;
use std::num::ParseFloatError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for a gmond poll.
pub type GmondResult<T> = Result<T, GmondError>;

/// Errors that fail a whole poll.
#[derive(Debug, Error)]
pub enum GmondError {
    /// The connection to the daemon could not be opened.
    #[error("can't connect to gmond at {address}: {source}")]
    Connect {
        /// Daemon address.
        address: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Connecting and decoding did not finish within the configured timeout.
    #[error("gmond at {address} did not answer within {timeout:?} (while {phase})")]
    Timeout {
        /// Daemon address.
        address: String,
        /// Configured timeout.
        timeout: Duration,
        /// Phase the poll was in when the timeout fired.
        phase: PollPhase,
    },

    /// The connection failed while the report was being read.
    #[error("connection to gmond at {address} failed: {source}")]
    Transport {
        /// Daemon address.
        address: String,
        /// The underlying IO error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The report could not be parsed.
    #[error("couldn't parse xml from {address}: {source}")]
    Decode {
        /// Daemon address.
        address: String,
        /// The decoder failure.
        #[source]
        source: DecodeError,
    },
}

impl GmondError {
    /// Wraps a decoder failure, reclassifying read errors as transport failures.
    pub(crate) fn from_decode(address: &str, err: DecodeError) -> Self {
        match err {
            DecodeError::Io(source) => Self::Transport {
                address: address.to_string(),
                source,
            },
            source => Self::Decode {
                address: address.to_string(),
                source,
            },
        }
    }

    /// Phase of the poll that failed.
    #[must_use]
    pub fn phase(&self) -> PollPhase {
        match self {
            Self::Connect { .. } => PollPhase::Connecting,
            Self::Timeout { phase, .. } => *phase,
            Self::Transport { .. } | Self::Decode { .. } => PollPhase::Decoding,
        }
    }

    /// Returns `true` for transport-level failures (refused, timeout, reset).
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Timeout { .. } | Self::Transport { .. }
        )
    }

    /// Returns `true` if the payload itself was malformed.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Errors produced while decoding a gmond XML report.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Malformed XML.
    #[error("malformed XML: {0}")]
    Xml(quick_xml::Error),

    /// Reading from the underlying stream failed.
    #[error("read failed: {0}")]
    Io(Arc<io::Error>),

    /// The stream ended before any element was seen.
    #[error("document has no root element")]
    MissingRoot,

    /// The root element is not `GANGLIA_XML`.
    #[error("expected <GANGLIA_XML> root element, found <{0}>")]
    UnexpectedRoot(String),

    /// The stream ended inside an open element.
    #[error("document ended with {open} unclosed element(s)")]
    Truncated {
        /// Number of elements still open at end of stream.
        open: usize,
    },

    /// A numeric metric carried a value that is not a number.
    #[error("metric '{metric}' has non-numeric value '{value}': {source}")]
    InvalidValue {
        /// Raw metric name.
        metric: String,
        /// Raw value text.
        value: String,
        /// Parse failure.
        #[source]
        source: ParseFloatError,
    },
}

impl From<quick_xml::Error> for DecodeError {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(e) => Self::Io(e),
            other => Self::Xml(other),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for DecodeError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(quick_xml::Error::InvalidAttr(err))
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read configuration file '{path}': {source}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML content.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds an unusable value.
    #[error("invalid value for field '{field}': {message}")]
    InvalidValue {
        /// Name of the field.
        field: String,
        /// Error message.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
