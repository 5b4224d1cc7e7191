// Prometheus metrics for data loading and the log stream.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// 1 once the game-data tables are loaded.
    pub static ref GAME_DATA_LOADED: IntGauge =
        IntGauge::new("endfield_game_data_loaded", "Whether game data is loaded").unwrap();

    /// 1 while the log stream is connected.
    pub static ref LOG_STREAM_CONNECTED: IntGauge =
        IntGauge::new("endfield_log_stream_connected", "Log stream connection is open").unwrap();

    /// Lines currently held in the log buffer.
    pub static ref LOG_BUFFER_LINES: IntGauge =
        IntGauge::new("endfield_log_buffer_lines", "Lines held in the log buffer").unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    /// Data resource requests, by kind (table, i18n).
    pub static ref TABLE_FETCHES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("endfield_table_fetches_total", "Data resource requests"),
        &["resource_kind"],
    )
    .unwrap();

    /// Failed data resource requests, by kind.
    pub static ref TABLE_FETCH_ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("endfield_table_fetch_errors_total", "Failed data resource requests"),
        &["resource_kind"],
    )
    .unwrap();

    /// Bytes of data resource bodies received over HTTP.
    pub static ref DATA_BYTES_FETCHED_TOTAL: IntCounter = IntCounter::new(
        "endfield_data_bytes_fetched_total",
        "Bytes of data resources received",
    )
    .unwrap();

    /// Log lines received from the backend.
    pub static ref LOG_LINES_RECEIVED_TOTAL: IntCounter = IntCounter::new(
        "endfield_log_lines_received_total",
        "Log lines received",
    )
    .unwrap();

    /// Successful log stream handshakes.
    pub static ref LOG_STREAM_CONNECTS_TOTAL: IntCounter = IntCounter::new(
        "endfield_log_stream_connects_total",
        "Log stream connections established",
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Wall time of a full game-data load in seconds.
    pub static ref GAME_DATA_LOAD_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("endfield_game_data_load_seconds", "Game data load time in seconds")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(GAME_DATA_LOADED.clone()),
        Box::new(LOG_STREAM_CONNECTED.clone()),
        Box::new(LOG_BUFFER_LINES.clone()),
        Box::new(TABLE_FETCHES_TOTAL.clone()),
        Box::new(TABLE_FETCH_ERRORS_TOTAL.clone()),
        Box::new(DATA_BYTES_FETCHED_TOTAL.clone()),
        Box::new(LOG_LINES_RECEIVED_TOTAL.clone()),
        Box::new(LOG_STREAM_CONNECTS_TOTAL.clone()),
        Box::new(GAME_DATA_LOAD_SECONDS.clone()),
    ];

    for c in collectors {
        if let Err(e) = REGISTRY.register(c) {
            tracing::debug!("Metric already registered: {e}");
        }
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
