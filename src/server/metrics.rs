//! Prometheus metrics endpoint
//!
//! The proxy exports a fixed set of counters in the Prometheus text
//! format: previews served, redirects by entry point and failed lookups by
//! error code.

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use parking_lot::Mutex;

pub const PREVIEWS_RENDERED: &str = "xcard_previews_rendered_total";
pub const REDIRECTS: &str = "xcard_redirects_total";
pub const LOOKUP_FAILURES: &str = "xcard_lookup_failures_total";

#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counter partitioned by one label. Series render in label order.
#[derive(Debug)]
pub struct LabeledCounter {
    label: &'static str,
    series: Mutex<BTreeMap<String, u64>>,
}

impl LabeledCounter {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            series: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn inc(&self, value: &str) {
        let mut series = self.series.lock();
        match series.get_mut(value) {
            Some(count) => *count += 1,
            None => {
                series.insert(value.to_string(), 1);
            }
        }
    }

    pub fn get(&self, value: &str) -> u64 {
        self.series.lock().get(value).copied().unwrap_or(0)
    }
}

/// Counters for the preview proxy.
#[derive(Debug)]
pub struct ProxyMetrics {
    pub previews_rendered: Counter,
    pub redirects: LabeledCounter,
    pub lookup_failures: LabeledCounter,
}

impl Default for ProxyMetrics {
    fn default() -> Self {
        Self {
            previews_rendered: Counter::default(),
            redirects: LabeledCounter::new("source"),
            lookup_failures: LabeledCounter::new("code"),
        }
    }
}

impl ProxyMetrics {
    /// Count a redirect by where the identifier came from (`query`, `path`).
    pub fn redirect(&self, source: &str) {
        self.redirects.inc(source);
    }

    /// Count a failed lookup by error code.
    pub fn lookup_failure(&self, code: &str) {
        self.lookup_failures.inc(code);
    }

    /// Prometheus text exposition of every counter.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(512);

        write_family(&mut out, PREVIEWS_RENDERED, "Preview documents served to bots");
        let _ = writeln!(out, "{} {}", PREVIEWS_RENDERED, self.previews_rendered.get());

        write_family(&mut out, REDIRECTS, "Redirects to the canonical page");
        write_series(&mut out, REDIRECTS, &self.redirects);

        write_family(&mut out, LOOKUP_FAILURES, "Upstream lookups that failed");
        write_series(&mut out, LOOKUP_FAILURES, &self.lookup_failures);

        out
    }
}

pub static PROXY_METRICS: LazyLock<ProxyMetrics> = LazyLock::new(ProxyMetrics::default);

fn write_family(out: &mut String, name: &str, help: &str) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} counter");
}

fn write_series(out: &mut String, name: &str, counter: &LabeledCounter) {
    for (value, count) in counter.series.lock().iter() {
        let _ = writeln!(out, "{name}{{{}=\"{}\"}} {count}", counter.label, quote_label(value));
    }
}

/// Label values escape backslash, double quote and newline.
fn quote_label(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted
}

/// Prometheus scrape endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        PROXY_METRICS.render(),
    )
}
