//! Error-log sink: forwards error-level log events to the Protect API.
//!
//! Errors that happen inside the host SDK (a dropped message, a failed
//! callback, a missing container) are otherwise only visible in the host
//! page's console.  This module ships them to
//! `<protect_client_url>/api/util/log-client-error` so they can be seen
//! server-side.
//!
//! # Pieces
//!
//! ```text
//! tracing::error!(..)
//!      │
//!      ▼
//! ErrorLogLayer (tracing_subscriber::Layer, filters by level)
//!      │ push(ErrorLogRecord)
//!      ▼
//! ErrorLogSink ──mpsc──► background task ──► LogTransport::send (one at a time, in order)
//!                                                 └─ HttpLogTransport: POST JSON via reqwest
//! ```
//!
//! # Failure handling
//!
//! Nothing here may fail the caller.  A record that cannot be sent is logged
//! at debug level and dropped.  Those debug events are emitted from this
//! module's own target, which [`ErrorLogLayer`] skips, so the sink never
//! feeds on its own failures.
//!
//! # What is a `Layer`? (for beginners)
//!
//! `tracing` separates *emitting* events (`error!`, `info!`, ...) from
//! *handling* them.  A `tracing_subscriber::Layer` is one handler in a stack;
//! `fmt` (console output) is another.  Adding [`ErrorLogLayer`] to the stack
//! leaves console logging unchanged and additionally queues every
//! sufficiently severe event for upload.

use std::backtrace::Backtrace;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{debug, Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use url::Url;

use crate::domain::ClientConfig;

/// Path of the error-log endpoint, relative to the Protect Client base URL.
pub const LOG_CLIENT_ERROR_PATH: &str = "/api/util/log-client-error";

/// Target of the sink's own diagnostics.  [`ErrorLogLayer`] ignores exactly
/// this target, so nothing else under this module path is lost.
const SINK_TARGET: &str = "protect_client::error_log_sink";

/// Error type for the error-log sink.
#[derive(Debug, Error)]
pub enum LogSinkError {
    /// The HTTP request could not be sent.
    #[error("error log request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success status.
    #[error("error log endpoint responded with HTTP {0}")]
    Status(u16),

    /// The endpoint URL could not be built.
    #[error("invalid error log endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Body of one request to the error-log endpoint.
///
/// ```json
/// {"errString":"invalid event name \"x\" passed from child iframe","stackTrace":""}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogRecord {
    /// The formatted log message.
    pub err_string: String,
    /// Captured backtrace, or empty when stacks are not included.
    pub stack_trace: String,
}

// ── Transport ─────────────────────────────────────────────────────────────────

/// Delivers one [`ErrorLogRecord`] to the error-log endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogTransport: Send + Sync {
    /// Sends `record`.
    async fn send(&self, record: ErrorLogRecord) -> Result<(), LogSinkError>;
}

/// [`LogTransport`] that POSTs JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLogTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpLogTransport {
    /// Creates a transport posting to `<protect_client_url>/api/util/log-client-error`.
    ///
    /// # Errors
    ///
    /// Returns [`LogSinkError::Endpoint`] if the endpoint URL cannot be built.
    pub fn new(protect_client_url: &Url) -> Result<Self, LogSinkError> {
        let endpoint = protect_client_url.join(LOG_CLIENT_ERROR_PATH)?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    /// The URL records are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl LogTransport for HttpLogTransport {
    async fn send(&self, record: ErrorLogRecord) -> Result<(), LogSinkError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&record)
            .send()
            .await
            .map_err(|e| LogSinkError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LogSinkError::Status(status.as_u16()));
        }
        Ok(())
    }
}

// ── Sink ──────────────────────────────────────────────────────────────────────

/// Queue of records plus the single task that sends them.
///
/// Cloning shares the queue.  Must be created inside a Tokio runtime.
#[derive(Clone)]
pub struct ErrorLogSink {
    sender: Arc<Mutex<Option<mpsc::UnboundedSender<ErrorLogRecord>>>>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ErrorLogSink {
    /// Starts the background task that drains the queue through `transport`.
    pub fn spawn(transport: Arc<dyn LogTransport>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ErrorLogRecord>();
        let worker = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                if let Err(e) = transport.send(record).await {
                    debug!(target: SINK_TARGET, "dropping error log record: {e}");
                }
            }
        });
        Self {
            sender: Arc::new(Mutex::new(Some(tx))),
            worker: Arc::new(Mutex::new(Some(worker))),
        }
    }

    /// Queues `record` for sending.
    ///
    /// Returns `false` if the sink has been closed.
    pub fn push(&self, record: ErrorLogRecord) -> bool {
        lock(&self.sender)
            .as_ref()
            .map_or(false, |tx| tx.send(record).is_ok())
    }

    /// Stops accepting records and waits until every queued record has been
    /// handed to the transport.
    pub async fn close(&self) {
        lock(&self.sender).take();
        let worker = lock(&self.worker).take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                debug!(target: SINK_TARGET, "error log worker ended abnormally: {e}");
            }
        }
    }
}

impl fmt::Debug for ErrorLogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLogSink")
            .field("open", &lock(&self.sender).is_some())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Layer ─────────────────────────────────────────────────────────────────────

/// Which events are uploaded, and whether a backtrace is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorLogOptions {
    /// Least severe level that is uploaded.
    pub level: Level,
    /// Attach a captured backtrace to every record.
    pub include_stack: bool,
}

impl Default for ErrorLogOptions {
    fn default() -> Self {
        Self {
            level: Level::ERROR,
            include_stack: false,
        }
    }
}

/// `tracing_subscriber` layer that queues events on an [`ErrorLogSink`].
#[derive(Debug, Clone)]
pub struct ErrorLogLayer {
    sink: ErrorLogSink,
    options: ErrorLogOptions,
}

impl ErrorLogLayer {
    /// Creates a layer feeding `sink`.
    pub fn new(sink: ErrorLogSink, options: ErrorLogOptions) -> Self {
        Self { sink, options }
    }

    /// The sink this layer feeds.
    pub fn sink(&self) -> &ErrorLogSink {
        &self.sink
    }
}

impl<S: Subscriber> Layer<S> for ErrorLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // tracing orders levels by verbosity: ERROR is the smallest.
        if *metadata.level() > self.options.level || metadata.target() == SINK_TARGET {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let stack_trace = if self.options.include_stack {
            Backtrace::force_capture().to_string()
        } else {
            String::new()
        };
        self.sink.push(ErrorLogRecord {
            err_string: visitor.finish(),
            stack_trace,
        });
    }
}

/// Formats an event as `message key=value key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}

/// Builds the HTTP transport, sink and layer for `config`.
///
/// Add the returned layer to the subscriber stack; call
/// [`ErrorLogSink::close`] on [`ErrorLogLayer::sink`] before exiting to flush
/// queued records.  Must be called inside a Tokio runtime.
///
/// # Errors
///
/// Returns [`LogSinkError::Endpoint`] if the endpoint URL cannot be built.
pub fn configure_error_log(
    options: ErrorLogOptions,
    config: &ClientConfig,
) -> Result<ErrorLogLayer, LogSinkError> {
    let transport = HttpLogTransport::new(config.protect_client_url())?;
    let sink = ErrorLogSink::spawn(Arc::new(transport));
    Ok(ErrorLogLayer::new(sink, options))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
