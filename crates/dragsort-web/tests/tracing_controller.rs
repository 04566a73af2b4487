//! Log output of the attachment controller.

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use dragsort_core::{GroupId, SortableConfig};
use dragsort_runtime::ObservableList;
use dragsort_web::{Gesture, HeadlessDocument, ListView, Sortable, ViewRegistry};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct Captured {
    level: tracing::Level,
    message: String,
}

#[derive(Default, Clone)]
struct Capture(Arc<Mutex<Vec<Captured>>>);

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

fn with_capture<F: FnOnce()>(f: F) -> Vec<Captured> {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    let events = capture.0.lock().unwrap().clone();
    events
}

#[test]
fn invalid_config_is_warned_not_rejected() {
    let events = with_capture(|| {
        let doc = HeadlessDocument::new();
        let registry: ViewRegistry<&str> = ViewRegistry::new();
        let sortable = Sortable::new(doc, registry, SortableConfig::default().with_target_class(""));
        assert_eq!(sortable.target_class(), "");
    });
    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::WARN && e.message.contains("config problem"))
    );
}

#[test]
fn rejected_dragstart_is_logged_at_debug() {
    let events = with_capture(|| {
        let doc = HeadlessDocument::new();
        let group = GroupId::next();
        let registry = ViewRegistry::new();
        registry.register(ListView::new(
            Rc::clone(&doc),
            ObservableList::new(["A"]),
            group,
        ));
        let scalar = doc.create_element();
        registry.bind_scalar(scalar, "count", group);
        let sortable = Sortable::with_group(group, Rc::clone(&doc), registry, SortableConfig::default());
        let _handle = sortable.attach(&scalar);
        assert!(Gesture::start(&doc, scalar).is_err());
    });
    let rejected: Vec<_> = events
        .iter()
        .filter(|e| e.message.contains("drag start rejected"))
        .collect();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].level, tracing::Level::DEBUG);
    assert!(
        events
            .iter()
            .all(|e| e.level == tracing::Level::DEBUG || e.level == tracing::Level::TRACE)
    );
}
