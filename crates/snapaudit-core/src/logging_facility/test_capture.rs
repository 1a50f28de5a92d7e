//! In-memory capture of log events for test assertions

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use snapaudit_core_types::schema::{FIELD_EVENT, FIELD_OP};

type EventLog = Arc<Mutex<Vec<CapturedEvent>>>;

/// A captured log event with all of its fields rendered as strings
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn from_event(event: &Event<'_>) -> Self {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let fields = fields.0;
        Self {
            level: *event.metadata().level(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            fields,
        }
    }
}

/// Renders every field value as text; strings are kept unquoted
#[derive(Default)]
struct Fields(HashMap<String, String>);

impl Fields {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

struct CaptureLayer(EventLog);

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let captured = CapturedEvent::from_event(event);
        if let Ok(mut log) = self.0.lock() {
            log.push(captured);
        }
    }
}

/// Handle for reading captured events
///
/// The capture is process-global, so tests should filter by an op name
/// or subject id unique to the test.
#[derive(Clone)]
pub struct TestCapture {
    log: EventLog,
}

impl TestCapture {
    /// Snapshot of everything captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Events for `op` whose `field` equals `value`
    pub fn events_where(&self, op: &str, field: &str, value: &str) -> Vec<CapturedEvent> {
        self.matching(|e| e.op.as_deref() == Some(op) && e.field(field) == Some(value))
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.matching(predicate).len()
    }

    /// # Panics
    ///
    /// Panics if no event with this `op` and `event` was captured
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let hits =
            self.count_events(|e| e.op.as_deref() == Some(op) && e.event.as_deref() == Some(event));
        assert!(
            hits > 0,
            "no {} event captured for op {} ({} events total)",
            event,
            op,
            self.events().len()
        );
    }

    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }

    fn matching<F>(&self, predicate: F) -> Vec<CapturedEvent>
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().into_iter().filter(|e| predicate(e)).collect()
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber (once per process)
///
/// Must run before anything else installs a global subscriber in the same
/// test binary, otherwise no events are captured.
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let log = EventLog::default();
            let _ = tracing_subscriber::registry()
                .with(CaptureLayer(Arc::clone(&log)))
                .try_init();
            TestCapture { log }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup_on_captured_event() {
        let event = CapturedEvent {
            level: Level::INFO,
            op: Some("apply_change".to_string()),
            event: Some("start".to_string()),
            fields: HashMap::from([("subject_id".to_string(), "emby-1".to_string())]),
        };
        assert_eq!(event.field("subject_id"), Some("emby-1"));
        assert_eq!(event.field("missing"), None);
    }

    #[test]
    fn test_clear_empties_the_log() {
        let capture = TestCapture {
            log: EventLog::default(),
        };
        if let Ok(mut log) = capture.log.lock() {
            log.push(CapturedEvent {
                level: Level::WARN,
                op: None,
                event: None,
                fields: HashMap::new(),
            });
        }
        assert_eq!(capture.count_events(|e| e.level == Level::WARN), 1);
        capture.clear();
        assert!(capture.events().is_empty());
    }
}
