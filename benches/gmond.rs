//! Benchmarks for the gmond collector.
//!
//! Tests: name sanitization, XML report decoding, registry apply,
//! flush and Prometheus text export.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gmond_bridge::modules::gmond::{decode, sanitize, GmondCollector, Report};
use std::fmt::Write;
use std::hint::black_box;
use tokio::sync::mpsc;

/// Create a current-thread Tokio runtime for async benchmarks.
fn bench_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime for benchmarks")
}

/// Build a report document with `clusters * hosts * metrics` metrics.
fn generate_report(clusters: usize, hosts: usize, metrics: usize) -> String {
    let mut doc = String::from("<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<GANGLIA_XML>\n");
    for c in 0..clusters {
        let _ = writeln!(doc, "<CLUSTER NAME=\"cluster-{c}\">");
        for h in 0..hosts {
            let _ = writeln!(doc, "<HOST NAME=\"host{h}\" IP=\"10.0.{c}.{h}\">");
            for m in 0..metrics {
                let _ = writeln!(
                    doc,
                    "<METRIC NAME=\"metric.{m} value\" VAL=\"{}.5\" TYPE=\"float\"><EXTRA_DATA>\
<EXTRA_ELEMENT NAME=\"GROUP\" VAL=\"bench\"/><EXTRA_ELEMENT NAME=\"DESC\" VAL=\"Metric {m}\"/>\
</EXTRA_DATA></METRIC>",
                    m * h
                );
            }
            doc.push_str("</HOST>\n");
        }
        doc.push_str("</CLUSTER>\n");
    }
    doc.push_str("</GANGLIA_XML>\n");
    doc
}

// ---------------------------------------------------------------------------
// Name sanitization
// ---------------------------------------------------------------------------

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("gmond/sanitize");

    for name in ["load_one", "cpu.load.1m", "disk free /var/lib (%)"] {
        group.bench_with_input(BenchmarkId::from_parameter(name), name, |b, name| {
            b.iter(|| black_box(sanitize(black_box(name))));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// XML decode
// ---------------------------------------------------------------------------

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("gmond/decode");
    let rt = bench_runtime();

    for (clusters, hosts) in [(1, 1), (2, 16), (4, 64)] {
        let doc = generate_report(clusters, hosts, 30);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{clusters}x{hosts}")),
            &doc,
            |b, doc| {
                b.iter(|| {
                    let report = rt.block_on(decode(doc.as_bytes())).expect("valid report");
                    black_box(report);
                });
            },
        );
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Apply, flush and export
// ---------------------------------------------------------------------------

fn decoded_report(clusters: usize, hosts: usize, metrics: usize) -> Report {
    let doc = generate_report(clusters, hosts, metrics);
    bench_runtime()
        .block_on(decode(doc.as_bytes()))
        .expect("valid report")
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("gmond/apply");
    let report = decoded_report(4, 64, 30);
    group.throughput(Throughput::Elements(report.metric_count() as u64));

    group.bench_function("first_poll", |b| {
        b.iter(|| {
            let collector = GmondCollector::default();
            black_box(collector.apply(&report));
        });
    });

    let collector = GmondCollector::default();
    collector.apply(&report);
    group.bench_function("repeat_poll", |b| {
        b.iter(|| black_box(collector.apply(&report)));
    });

    group.finish();
}

fn bench_flush_and_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("gmond/flush");
    let collector = GmondCollector::default();
    collector.apply(&decoded_report(16, 8, 30));

    group.bench_function("flush", |b| {
        let (tx, mut rx) = mpsc::unbounded_channel();
        b.iter(|| {
            black_box(collector.flush(&tx));
            while rx.try_recv().is_ok() {}
        });
    });

    group.bench_function("encode_prometheus", |b| {
        b.iter(|| black_box(collector.registry().encode_prometheus()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sanitize,
    bench_decode,
    bench_apply,
    bench_flush_and_export,
);
criterion_main!(benches);
