//! Log capture for tests
//!
//! A `tracing` layer that copies every event's fields into a shared buffer.
//! Engine tests use it to check that a run logged exactly one start/end pair
//! under its `run_id`.

use driftx_core_types::schema::{FIELD_EVENT, FIELD_OP, FIELD_RUN_ID};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

type Sink = Arc<Mutex<Vec<CapturedEvent>>>;

/// One recorded event; every field value is kept in its rendered form
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn from_event(event: &Event<'_>) -> Self {
        let mut fields = FieldMap::default();
        event.record(&mut fields);
        let fields = fields.0;
        Self {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

#[derive(Default)]
struct FieldMap(HashMap<String, String>);

impl FieldMap {
    fn put(&mut self, field: &Field, value: impl ToString) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

impl Visit for FieldMap {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value);
    }
}

struct CaptureLayer(Sink);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let captured = CapturedEvent::from_event(event);
        if let Ok(mut sink) = self.0.lock() {
            sink.push(captured);
        }
    }
}

/// Read side of the capture buffer
#[derive(Clone, Default)]
pub struct TestCapture {
    sink: Sink,
}

impl TestCapture {
    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.sink.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn events_for_run(&self, run_id: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.field(FIELD_RUN_ID) == Some(run_id))
            .collect()
    }

    /// # Panics
    ///
    /// When no event with this `op` and `event` was recorded.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "no {op}/{event} event among {} captured",
            events.len()
        );
    }

    pub fn clear(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            sink.clear();
        }
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber, once per process
///
/// The buffer is shared by every test in the binary; filter by run id or
/// a unique op name.
///
/// ```
/// use driftx_core::logging_facility::test_capture::init_test_capture;
/// use driftx_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op");
/// capture.assert_event_exists("doc_capture_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let capture = TestCapture::default();
            tracing_subscriber::registry()
                .with(CaptureLayer(capture.sink.clone()))
                .try_init()
                .ok();
            capture
        })
        .clone()
}
