//! Structured log contract for the accordion controller.
//!
//! Transitions, scheduling, and cancellation each emit one event with a
//! dotted `message` name. Hosts filter and alert on those names, so they are
//! pinned here.

use std::sync::{Arc, Mutex};

use foldline::prelude::*;
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use web_time::{Duration, Instant};

#[derive(Debug, Default)]
struct CapturedEvent {
    message: String,
    fields: Vec<(String, String)>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for EventCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct FieldVisitor(CapturedEvent);
        impl tracing::field::Visit for FieldVisitor {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.0.message = value.to_owned();
                } else {
                    self.0.fields.push((field.name().to_owned(), value.to_owned()));
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                let rendered = format!("{value:?}").trim_matches('"').to_owned();
                if field.name() == "message" {
                    self.0.message = rendered;
                } else {
                    self.0.fields.push((field.name().to_owned(), rendered));
                }
            }
        }
        let mut visitor = FieldVisitor(CapturedEvent::default());
        event.record(&mut visitor);
        self.events
            .lock()
            .expect("event capture lock")
            .push(visitor.0);
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture {
        events: Arc::clone(&events),
    });
    tracing::subscriber::with_default(subscriber, f);
    let mut guard = events.lock().expect("event capture lock");
    std::mem::take(&mut *guard)
}

fn named<'a>(events: &'a [CapturedEvent], message: &str) -> Vec<&'a CapturedEvent> {
    events.iter().filter(|e| e.message == message).collect()
}

#[test]
fn every_transition_is_logged_with_its_cause() {
    let events = capture(|| {
        let t0 = Instant::now();
        let mut ctl = AccordionController::with_defaults(960);
        ctl.on_intersection(ElementId::Root, 1.0, t0);
        ctl.tick(t0 + Duration::from_millis(200)).unwrap();
        ctl.toggle(2).unwrap();
        ctl.toggle(2).unwrap();
    });

    let transitions = named(&events, "accordion.transition");
    assert_eq!(transitions.len(), 3, "{events:?}");
    assert_eq!(transitions[0].field("cause"), Some("AutoOpen"));
    assert_eq!(transitions[0].field("to"), Some("Some(0)"));
    assert_eq!(transitions[1].field("cause"), Some("Manual"));
    assert_eq!(transitions[1].field("from"), Some("Some(0)"));
    assert_eq!(transitions[2].field("to"), Some("None"));
}

#[test]
fn scheduling_and_cancellation_are_logged() {
    let events = capture(|| {
        let t0 = Instant::now();
        let mut ctl = AccordionController::with_defaults(960);
        ctl.toggle(0).unwrap();
        ctl.on_content_scroll(
            ElementId::Content(0),
            ScrollMetrics::new(600.0, 400.0, 1000.0),
            t0,
        );
        ctl.toggle(0).unwrap();
    });

    let scheduled = named(&events, "accordion.advance.scheduled");
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].field("from"), Some("0"));
    assert_eq!(named(&events, "accordion.pending.canceled").len(), 1);
}

#[test]
fn stale_signals_are_traced_not_raised() {
    let events = capture(|| {
        let mut ctl = AccordionController::with_defaults(960);
        ctl.on_content_scroll(
            ElementId::Content(1),
            ScrollMetrics::new(600.0, 400.0, 1000.0),
            Instant::now(),
        );
    });

    let stale = named(&events, "accordion.stale_signal");
    assert_eq!(stale.len(), 1);
    assert!(
        stale[0]
            .field("error")
            .is_some_and(|e| e.contains("scroll")),
        "{stale:?}"
    );
}
