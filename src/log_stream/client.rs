// Live backend log feed: a supervisor task that keeps a log connection open,
// fills a bounded buffer and reconnects on loss until unmounted.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::metrics;

use super::ansi::AnsiConverter;
use super::buffer::{LogBuffer, MAX_LOGS};
use super::transport::{LogConnector, WsConnector};

/// Fixed delay the log viewer waits before reconnecting.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Capacity of the live line broadcast; slower subscribers skip lines.
const LINE_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// When to retry after a dropped connection or a failed connect.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    /// Growth per consecutive failed attempt; 1.0 keeps the delay fixed.
    pub multiplier: f64,
    pub max_delay: Duration,
    /// Give up after this many consecutive failed attempts. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            multiplier: 1.0,
            max_delay: delay,
            max_attempts: None,
        }
    }

    pub fn exponential(initial_delay: Duration, multiplier: f64, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            multiplier,
            max_delay,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Delay before the next attempt given the number of consecutive failed
    /// attempts so far, or `None` once the policy is exhausted. A connection that
    /// was established and then dropped counts as zero failures.
    pub fn delay_for(&self, failures: u32) -> Option<Duration> {
        if self.max_attempts.is_some_and(|max| failures >= max) {
            return None;
        }
        let exponent = failures.saturating_sub(1).min(i32::MAX as u32) as i32;
        let cap = self.max_delay.max(self.initial_delay);
        let scaled = self.initial_delay.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
        // Out-of-range products saturate at the cap.
        Some(Duration::try_from_secs_f64(scaled).map_or(cap, |delay| delay.min(cap)))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RECONNECT_DELAY)
    }
}

#[derive(Debug, Clone)]
pub struct LogStreamOptions {
    pub policy: ReconnectPolicy,
    /// Convert ANSI colour codes in each line to HTML before buffering.
    pub convert_ansi: bool,
    pub capacity: usize,
}

impl Default for LogStreamOptions {
    fn default() -> Self {
        Self {
            policy: ReconnectPolicy::default(),
            convert_ansi: false,
            capacity: MAX_LOGS,
        }
    }
}

struct Supervisor {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

struct Inner {
    url: String,
    connector: Arc<dyn LogConnector>,
    policy: ReconnectPolicy,
    converter: Option<AnsiConverter>,
    buffer: Mutex<LogBuffer>,
    state: watch::Sender<ConnectionState>,
    lines: broadcast::Sender<String>,
    supervisor: Mutex<Option<Supervisor>>,
}

/// Handle to the log feed. Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct LogStreamClient {
    inner: Arc<Inner>,
}

impl LogStreamClient {
    pub fn new(
        url: impl Into<String>,
        connector: Arc<dyn LogConnector>,
        options: LogStreamOptions,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (lines, _) = broadcast::channel(LINE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                url: url.into(),
                connector,
                policy: options.policy,
                converter: options.convert_ansi.then(AnsiConverter::default),
                buffer: Mutex::new(LogBuffer::with_capacity(options.capacity)),
                state,
                lines,
                supervisor: Mutex::new(None),
            }),
        }
    }

    /// Client for a `ws://` / `wss://` log endpoint.
    pub fn websocket(url: impl Into<String>, options: LogStreamOptions) -> Self {
        Self::new(url, Arc::new(WsConnector), options)
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Start streaming. Returns `false` if a supervisor is already running.
    /// Must be called from within a tokio runtime.
    pub fn mount(&self) -> bool {
        let mut slot = self.inner.supervisor.lock().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref().is_some_and(|s| !s.handle.is_finished()) {
            return false;
        }
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(supervise(self.inner.clone(), shutdown_rx));
        *slot = Some(Supervisor { shutdown, handle });
        true
    }

    /// Stop streaming: closes the connection, cancels a pending reconnect and
    /// waits for the supervisor to exit. The buffer keeps its lines.
    pub async fn unmount(&self) {
        let supervisor = self
            .inner
            .supervisor
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(supervisor) = supervisor else {
            return;
        };
        let _ = supervisor.shutdown.send(true);
        if let Err(e) = supervisor.handle.await {
            tracing::error!("Log stream supervisor panicked: {e}");
        }
        self.inner.set_state(ConnectionState::Disconnected);
    }

    pub fn is_mounted(&self) -> bool {
        self.inner
            .supervisor
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|s| !s.handle.is_finished())
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Lines as they arrive, after conversion.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.inner.lines.subscribe()
    }

    /// Buffered lines, oldest first.
    pub fn logs(&self) -> Vec<String> {
        self.inner.buffer().snapshot()
    }

    pub fn clear_logs(&self) {
        self.inner.buffer().clear();
        metrics::LOG_BUFFER_LINES.set(0);
    }
}

impl Inner {
    fn buffer(&self) -> std::sync::MutexGuard<'_, LogBuffer> {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
        metrics::LOG_STREAM_CONNECTED.set(i64::from(state == ConnectionState::Connected));
    }

    fn on_message(&self, line: String) {
        let line = match &self.converter {
            Some(converter) => converter.to_html(&line),
            None => line,
        };
        let len = {
            let mut buffer = self.buffer();
            buffer.push(line.clone());
            buffer.len()
        };
        metrics::LOG_LINES_RECEIVED_TOTAL.inc();
        metrics::LOG_BUFFER_LINES.set(len as i64);
        // No subscribers is fine.
        let _ = self.lines.send(line);
    }
}

/// What ended a live connection.
enum Ended {
    Shutdown,
    Lost,
}

async fn supervise(inner: Arc<Inner>, mut shutdown: watch::Receiver<bool>) {
    let mut failures: u32 = 0;

    loop {
        inner.set_state(ConnectionState::Connecting);
        let connected = tokio::select! {
            result = inner.connector.connect(&inner.url) => result,
            _ = shutdown.changed() => break,
        };

        match connected {
            Ok(mut connection) => {
                failures = 0;
                inner.set_state(ConnectionState::Connected);
                metrics::LOG_STREAM_CONNECTS_TOTAL.inc();
                tracing::info!("Log stream connected to {}", inner.url);

                let ended = loop {
                    let next = tokio::select! {
                        line = connection.next_line() => Some(line),
                        _ = shutdown.changed() => None,
                    };
                    match next {
                        Some(Some(Ok(line))) => inner.on_message(line),
                        Some(Some(Err(e))) => {
                            tracing::warn!("Log stream error: {e}");
                            break Ended::Lost;
                        }
                        Some(None) => {
                            tracing::warn!("Log stream closed by server");
                            break Ended::Lost;
                        }
                        None => {
                            connection.close().await;
                            break Ended::Shutdown;
                        }
                    }
                };
                inner.set_state(ConnectionState::Disconnected);
                if let Ended::Shutdown = ended {
                    tracing::info!("Log stream closed");
                    return;
                }
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                inner.set_state(ConnectionState::Disconnected);
                tracing::warn!("Log stream connect to {} failed: {e}", inner.url);
            }
        }

        let Some(delay) = inner.policy.delay_for(failures) else {
            tracing::error!("Log stream giving up after {failures} failed attempts");
            break;
        };
        tracing::info!("Reconnecting log stream in {:.1}s...", delay.as_secs_f64());
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
    }

    inner.set_state(ConnectionState::Disconnected);
}
