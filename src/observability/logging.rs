//! Structured logging.
//!
//! # Responsibilities
//! - Encode every `tracing` event as one JSON object per line
//! - Merge request-scoped span fields (the correlation ID) into each record
//! - Initialize the process-wide subscriber once at startup
//!
//! # Record Shape
//! ```text
//! {"timestamp", "level", "message", "module", "function", "line",
//!  "correlation_id"?, ...extra fields}
//! ```
//!
//! # Design Decisions
//! - Each record is fully serialized before a single `write_all`, so
//!   concurrent requests never interleave partial lines
//! - `function` is the innermost span name; handlers are instrumented so
//!   this is the handler function
//! - `tracing` has no CRITICAL level: [`critical!`](crate::critical) emits
//!   an ERROR event carrying `severity = "CRITICAL"` which is promoted here
//! - Unencodable field values degrade the record instead of failing the caller

use std::fmt;
use std::io::{self, Write};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{span, Event, Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::ObservabilityConfig;

/// Reserved field that overrides the rendered level of an ERROR event.
pub const SEVERITY_FIELD: &str = "severity";

/// Value of [`SEVERITY_FIELD`] marking a critical failure.
pub const CRITICAL: &str = "CRITICAL";

const CORRELATION_ID_FIELD: &str = "correlation_id";
const CONTEXT_ERROR_FIELD: &str = "context_error";
const NO_FUNCTION: &str = "-";
const BASE_FIELDS: [&str; 6] = ["timestamp", "level", "message", "module", "function", "line"];

/// Emit a CRITICAL record.
///
/// Accepts the same field syntax as [`tracing::error!`].
///
/// ```ignore
/// critical!(correlation_id = %id, "Critical system failure occurred");
/// ```
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        ::tracing::error!(
            severity = $crate::observability::logging::CRITICAL,
            $($arg)+
        )
    };
}

/// Current UTC time as an ISO-8601 string with microsecond precision.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Error raised while turning event fields into JSON.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// JSON has no representation for NaN or infinity.
    #[error("field `{field}` holds non-finite number {value}")]
    NonFiniteNumber { field: &'static str, value: f64 },

    /// Serializing the assembled record failed.
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Level names as they appear in the `level` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    fn from_event(level: &Level, severity_override: Option<&str>) -> Self {
        if *level == Level::ERROR {
            if severity_override == Some(CRITICAL) {
                Severity::Critical
            } else {
                Severity::Error
            }
        } else if *level == Level::WARN {
            Severity::Warning
        } else if *level == Level::INFO {
            Severity::Info
        } else {
            Severity::Debug
        }
    }
}

/// One line of log output.
#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    timestamp: String,
    level: Severity,
    message: &'a str,
    module: &'a str,
    function: &'a str,
    line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<Value>,
    #[serde(flatten)]
    context: Map<String, Value>,
}

impl LogRecord<'_> {
    fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        let mut buf = serde_json::to_vec(self)?;
        buf.push(b'\n');
        Ok(buf)
    }

    /// Drop the extra context and describe why.
    fn degrade(&mut self, error: &EncodingError) {
        self.context.clear();
        self.context
            .insert(CONTEXT_ERROR_FIELD.to_string(), Value::String(error.to_string()));
    }
}

/// Collects event or span fields as JSON values.
#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    severity: Option<String>,
    fields: Map<String, Value>,
    error: Option<EncodingError>,
}

impl JsonVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for JsonVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        match Number::from_f64(value) {
            Some(number) => self.insert(field, Value::Number(number)),
            None => {
                self.error.get_or_insert(EncodingError::NonFiniteNumber {
                    field: field.name(),
                    value,
                });
            }
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            SEVERITY_FIELD => self.severity = Some(value.to_string()),
            _ => self.insert(field, Value::String(value.to_string())),
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{:?}", value)),
            SEVERITY_FIELD => self.severity = Some(format!("{:?}", value)),
            _ => self.insert(field, Value::String(format!("{:?}", value))),
        }
    }
}

/// Fields recorded on a span, inherited by events inside it.
#[derive(Debug, Default)]
struct SpanFields(Map<String, Value>);

/// A [`Layer`] that writes every event as a single JSON line.
pub struct JsonLogLayer<W> {
    make_writer: W,
}

impl<W> JsonLogLayer<W>
where
    W: for<'w> MakeWriter<'w> + 'static,
{
    /// Layer writing to any sink; stdout in production, a buffer in tests.
    pub fn with_writer(make_writer: W) -> Self {
        Self { make_writer }
    }

    fn write_record(&self, record: &mut LogRecord<'_>, meta: &tracing::Metadata<'_>) {
        let buf = match record.encode() {
            Ok(buf) => buf,
            Err(error) => {
                record.degrade(&error);
                match record.encode() {
                    Ok(buf) => buf,
                    Err(_) => return,
                }
            }
        };

        let mut writer = self.make_writer.make_writer_for(meta);
        let _ = writer.write_all(&buf);
    }
}

impl<S, W> Layer<S> for JsonLogLayer<W>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        attrs.record(&mut visitor);

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(visitor.fields));
        }
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut visitor = JsonVisitor::default();
        values.record(&mut visitor);

        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<SpanFields>() {
            Some(stored) => stored.0.extend(visitor.fields),
            None => extensions.insert(SpanFields(visitor.fields)),
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();

        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);
        let mut fields = visitor.fields;

        // Walk from the innermost span outwards; inner values win.
        let mut function = None;
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if function.is_none() {
                    function = Some(span.name());
                }
                if let Some(stored) = span.extensions().get::<SpanFields>() {
                    for (key, value) in &stored.0 {
                        if !fields.contains_key(key) {
                            fields.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
        }

        let correlation_id = fields.remove(CORRELATION_ID_FIELD);
        for key in BASE_FIELDS {
            if let Some(value) = fields.remove(key) {
                fields.insert(format!("context.{}", key), value);
            }
        }

        let message = visitor.message.unwrap_or_default();
        let mut record = LogRecord {
            timestamp: utc_timestamp(),
            level: Severity::from_event(meta.level(), visitor.severity.as_deref()),
            message: &message,
            module: meta.module_path().unwrap_or_else(|| meta.target()),
            function: function.unwrap_or(NO_FUNCTION),
            line: meta.line().unwrap_or(0),
            correlation_id,
            context: fields,
        };

        if let Some(error) = visitor.error {
            record.degrade(&error);
        }

        self.write_record(&mut record, meta);
    }
}

/// Build a subscriber that filters with `filter` and encodes with [`JsonLogLayer`].
pub fn json_subscriber<W>(filter: EnvFilter, make_writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(filter)
        .with(JsonLogLayer::with_writer(make_writer))
}

/// Default filter: `RUST_LOG` if set, otherwise the configured level with
/// framework crates quietened.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{},tower_http=warn,hyper=warn", config.log_level).into()
    })
}

/// Install the process-wide JSON subscriber writing to stdout.
///
/// Must be called once, before the first record is emitted.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    json_subscriber(env_filter(config), io::stdout).try_init()
}
