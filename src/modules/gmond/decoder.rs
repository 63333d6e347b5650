//! Streaming decoder for the gmond XML report.
//!
//! The daemon answers every connection with one document shaped like
//!
//! ```text
//! GANGLIA_XML
//! └── CLUSTER  NAME OWNER
//!     └── HOST  NAME IP
//!         └── METRIC  NAME VAL TYPE UNITS
//!             └── EXTRA_DATA
//!                 └── EXTRA_ELEMENT  NAME VAL
//! ```
//!
//! Events are pulled from the reader as bytes arrive. Elements outside this
//! shape are skipped along with their children. Decoding returns as soon as
//! the root element closes.
//!
//! The declared charset is not honored: input is always read as UTF-8.
//! Documents declared as ISO-8859-1 but containing only ASCII decode fine;
//! genuinely non-UTF-8 attribute values fail with [`DecodeError::Xml`].

use super::error::DecodeError;
use super::report::{Cluster, ExtraElement, Host, Metric, Report};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tokio::io::AsyncBufRead;
use tracing::{debug, trace};

const ROOT: &[u8] = b"GANGLIA_XML";

/// Decodes one gmond report from `reader`.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the stream is not a well-formed
/// `GANGLIA_XML` document, a metric value is not numeric, or reading fails.
pub async fn decode<R: AsyncBufRead + Unpin>(reader: R) -> Result<Report, DecodeError> {
    let mut reader = Reader::from_reader(reader);
    let mut builder = ReportBuilder::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into_async(&mut buf).await? {
            Event::Decl(decl) => match decl.encoding() {
                Some(Ok(charset)) if !is_utf8_label(&charset) => {
                    debug!(
                        charset = %String::from_utf8_lossy(&charset),
                        "Declared charset is read as UTF-8"
                    );
                },
                _ => {},
            },
            Event::Start(e) => builder.start(&e)?,
            Event::Empty(e) => {
                if builder.empty(&e)? {
                    return Ok(builder.finish());
                }
            },
            Event::End(_) => {
                if builder.end() {
                    return Ok(builder.finish());
                }
            },
            Event::Eof => return Err(builder.eof_error()),
            _ => {},
        }
        buf.clear();
    }
}

fn is_utf8_label(charset: &[u8]) -> bool {
    charset.eq_ignore_ascii_case(b"utf-8") || charset.eq_ignore_ascii_case(b"utf8")
}

/// What an open element contributes to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Root,
    Cluster,
    Host,
    Metric,
    ExtraData,
    Ignored,
}

#[derive(Debug, Default)]
struct ReportBuilder {
    report: Report,
    stack: Vec<Frame>,
    root_seen: bool,
}

impl ReportBuilder {
    fn start(&mut self, e: &BytesStart<'_>) -> Result<(), DecodeError> {
        let frame = self.open(e)?;
        self.stack.push(frame);
        Ok(())
    }

    /// Handles a self-closing element. Returns `true` if it was the root.
    fn empty(&mut self, e: &BytesStart<'_>) -> Result<bool, DecodeError> {
        let frame = self.open(e)?;
        Ok(frame == Frame::Root)
    }

    /// Closes the innermost element. Returns `true` once the root is closed.
    fn end(&mut self) -> bool {
        self.stack.pop();
        self.stack.is_empty()
    }

    fn finish(self) -> Report {
        self.report
    }

    fn eof_error(&self) -> DecodeError {
        if self.root_seen {
            DecodeError::Truncated {
                open: self.stack.len(),
            }
        } else {
            DecodeError::MissingRoot
        }
    }

    fn open(&mut self, e: &BytesStart<'_>) -> Result<Frame, DecodeError> {
        let qname = e.name();
        let name = qname.as_ref();

        let Some(&parent) = self.stack.last() else {
            if name != ROOT {
                return Err(DecodeError::UnexpectedRoot(
                    String::from_utf8_lossy(name).into_owned(),
                ));
            }
            self.root_seen = true;
            return Ok(Frame::Root);
        };

        let frame = match (parent, name) {
            (Frame::Root, b"CLUSTER") => {
                self.report.clusters.push(Cluster {
                    name: attr(e, b"NAME")?.unwrap_or_default(),
                    owner: attr(e, b"OWNER")?,
                    hosts: Vec::new(),
                });
                Frame::Cluster
            },
            (Frame::Cluster, b"HOST") => {
                let host = Host {
                    name: attr(e, b"NAME")?.unwrap_or_default(),
                    ip: attr(e, b"IP")?,
                    metrics: Vec::new(),
                };
                if let Some(cluster) = self.report.clusters.last_mut() {
                    cluster.hosts.push(host);
                }
                Frame::Host
            },
            (Frame::Host, b"METRIC") => match parse_metric(e)? {
                Some(metric) => {
                    if let Some(host) = self.current_host() {
                        host.metrics.push(metric);
                    }
                    Frame::Metric
                },
                None => Frame::Ignored,
            },
            (Frame::Metric, b"EXTRA_DATA") => Frame::ExtraData,
            (Frame::ExtraData, b"EXTRA_ELEMENT") => {
                let element = ExtraElement {
                    name: attr(e, b"NAME")?.unwrap_or_default(),
                    value: attr(e, b"VAL")?.unwrap_or_default(),
                };
                if let Some(metric) = self.current_host().and_then(|h| h.metrics.last_mut()) {
                    metric.extra.push(element);
                }
                Frame::Ignored
            },
            _ => Frame::Ignored,
        };

        Ok(frame)
    }

    fn current_host(&mut self) -> Option<&mut Host> {
        self.report
            .clusters
            .last_mut()
            .and_then(|c| c.hosts.last_mut())
    }
}

/// Builds a metric from its attributes. String-typed metrics yield `None`.
fn parse_metric(e: &BytesStart<'_>) -> Result<Option<Metric>, DecodeError> {
    let name = attr(e, b"NAME")?.unwrap_or_default();
    let metric_type = attr(e, b"TYPE")?;

    if metric_type.as_deref() == Some("string") {
        trace!(metric = %name, "Skipping string metric");
        return Ok(None);
    }

    // An empty value reads as zero; whitespace alone does not.
    let value = match attr(e, b"VAL")? {
        Some(raw) if raw.is_empty() => 0.0,
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|source| DecodeError::InvalidValue {
                metric: name.clone(),
                value: raw.clone(),
                source,
            })?,
        None => 0.0,
    };

    Ok(Some(Metric {
        name,
        value,
        metric_type,
        units: attr(e, b"UNITS")?,
        extra: Vec::new(),
    }))
}

/// Returns the unescaped value of attribute `key`, if present.
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, DecodeError> {
    for attribute in e.attributes() {
        let attribute = attribute?;
        if attribute.key.as_ref() == key {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
