#![forbid(unsafe_code)]

//! Tracing contract tests for the tour engine.
//!
//! Verify the `tour.step` span and the lifecycle, lock and missing-target
//! events the controller emits, with their targets, levels and fields.
//!
//! Run:
//!   cargo test -p guidepost --test tracing_tour_events

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use guidepost::{
    DeterministicClock, MemoryDocument, TourConfig, TourController, TourStep,
};
use guidepost_core::{Event, KeyCode, KeyEvent, Rect};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use web_time::Duration;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

struct SpanCapture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl SpanCapture {
    fn new() -> (Self, CaptureHandle) {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let handle = CaptureHandle {
            spans: spans.clone(),
            events: events.clone(),
        };
        (Self { spans, events }, handle)
    }
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn find(&self, target: &str, message: &str) -> Option<CapturedEvent> {
        self.events()
            .into_iter()
            .find(|e| e.target == target && e.message() == message)
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for SpanCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let (layer, handle) = SpanCapture::new();
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    handle
}

fn page() -> MemoryDocument {
    let doc = MemoryDocument::new(800.0, 600.0);
    doc.insert("#search", Rect::new(40.0, 80.0, 300.0, 36.0));
    doc.insert("#list", Rect::new(40.0, 900.0, 700.0, 300.0));
    doc
}

fn steps() -> TourConfig {
    TourConfig::new(vec![
        TourStep::new("#search", "Search", ""),
        TourStep::new("#list", "List", ""),
        TourStep::new("#missing", "Missing", ""),
    ])
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn each_step_entry_opens_a_span() {
    let handle = with_captured_tracing(|| {
        let mut tour = TourController::new(page(), DeterministicClock::new());
        tour.configure(steps());
        tour.start();
        tour.next();
    });

    let spans: Vec<_> = handle
        .spans()
        .into_iter()
        .filter(|s| s.name == "tour.step")
        .collect();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].fields.get("index").map(String::as_str), Some("0"));
    assert_eq!(spans[0].fields.get("target").map(String::as_str), Some("#search"));
    assert_eq!(spans[1].fields.get("target").map(String::as_str), Some("#list"));
}

#[test]
fn lifecycle_is_logged_at_info() {
    let handle = with_captured_tracing(|| {
        let mut tour = TourController::new(page(), DeterministicClock::new());
        tour.configure(steps());
        tour.start();
        tour.handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape)));
    });

    let started = handle
        .find("guidepost.tour", "tour started")
        .expect("start logged");
    assert_eq!(started.level, tracing::Level::INFO);
    assert_eq!(started.fields.get("steps").map(String::as_str), Some("3"));

    let skipped = handle
        .find("guidepost.tour", "tour skipped")
        .expect("skip logged");
    assert_eq!(skipped.level, tracing::Level::INFO);
    assert_eq!(skipped.fields.get("at").map(String::as_str), Some("0"));
}

#[test]
fn lock_and_scroll_are_logged_at_debug() {
    let handle = with_captured_tracing(|| {
        let mut tour = TourController::new(page(), DeterministicClock::new());
        tour.configure(steps());
        tour.start();
        tour.next();
        tour.advance(Duration::from_millis(650));
        tour.complete();
    });

    let acquired = handle
        .find("guidepost.lock", "scroll lock acquired")
        .expect("acquire logged");
    assert_eq!(acquired.level, tracing::Level::DEBUG);
    assert!(handle.find("guidepost.lock", "scroll lock released").is_some());

    let scrolls: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|e| e.target == "guidepost.scroll" && e.message() == "centering scroll issued")
        .collect();
    assert_eq!(scrolls.len(), 1);
    assert_eq!(scrolls[0].fields.get("y").map(String::as_str), Some("750.0"));
}

#[test]
fn missing_target_is_a_warning() {
    let handle = with_captured_tracing(|| {
        let mut tour = TourController::new(page(), DeterministicClock::new());
        tour.configure(steps());
        tour.start();
        tour.jump_to(2);
        tour.advance(Duration::from_millis(650));
    });

    let warnings: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].target, "guidepost.tour");
    assert_eq!(
        warnings[0].fields.get("selector").map(String::as_str),
        Some("#missing")
    );
}

#[test]
fn invalid_transitions_stay_below_info() {
    let handle = with_captured_tracing(|| {
        let mut tour = TourController::new(page(), DeterministicClock::new());
        tour.configure(steps());
        tour.next();
        tour.previous();
        tour.start();
        tour.start();
        tour.previous();
    });

    let noisy: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|e| e.level <= tracing::Level::INFO)
        .filter(|e| e.message() != "tour started" && e.message() != "tour torn down mid-flight")
        .collect();
    assert!(noisy.is_empty(), "unexpected events: {noisy:?}");
}
