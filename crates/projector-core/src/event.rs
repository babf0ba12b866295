use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::{Concept, ConceptId, ConceptRef, EngineError, Model, ProjectionId, Value};

pub const VALUE_CHANGED: &str = "value.changed";
pub const VALUE_ADDED: &str = "value.added";
pub const VALUE_REMOVED: &str = "value.removed";
pub const VALUE_SWAPPED: &str = "value.swapped";
pub const VIEW_CHANGED: &str = "view.changed";
pub const DISPLAYED: &str = "displayed";

#[derive(Clone, Default)]
pub enum Payload {
    #[default]
    None,
    Value(Value),
    Element(ConceptRef),
    Swap(ConceptRef, ConceptRef),
    View(usize),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::None => write!(f, "None"),
            Payload::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Payload::Element(e) => f.debug_tuple("Element").field(&e.id()).finish(),
            Payload::Swap(a, b) => f.debug_tuple("Swap").field(&a.id()).field(&b.id()).finish(),
            Payload::View(i) => f.debug_tuple("View").field(i).finish(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ModelEvent {
    pub name: String,
    /// Concept the event is about; `None` for view-level events.
    pub source: Option<ConceptId>,
    pub payload: Payload,
}

impl ModelEvent {
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            source: None,
            payload,
        }
    }

    pub fn from_concept(concept: &dyn Concept, name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            source: Some(concept.id()),
            payload,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// View-level events concern everyone; model events only their source.
    pub fn concerns(&self, id: &ConceptId) -> bool {
        self.source.as_ref().is_none_or(|s| s == id)
    }
}

pub type Handler = Rc<dyn Fn(&mut Model, &ModelEvent) -> Result<(), EngineError>>;

/// Per-projection registry from event name to subscribers, in subscription
/// order. Subscriptions are append-only.
#[derive(Default)]
pub struct EventChannel {
    handlers: HashMap<String, Vec<Handler>>,
}

impl EventChannel {
    pub fn register_handler(
        &mut self,
        name: impl Into<String>,
        handler: impl Fn(&mut Model, &ModelEvent) -> Result<(), EngineError> + 'static,
    ) {
        self.handlers
            .entry(name.into())
            .or_default()
            .push(Rc::new(handler));
    }

    /// Snapshot of the subscribers for `name`; handlers registered while the
    /// snapshot is being delivered only see later events.
    pub fn subscribers(&self, name: &str) -> Vec<Handler> {
        self.handlers.get(name).cloned().unwrap_or_default()
    }

    pub fn count(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }
}

#[derive(Clone, Debug)]
pub struct Envelope {
    pub projection: ProjectionId,
    pub event: ModelEvent,
}

/// Queue shared between the model and every observer it hands out.
#[derive(Clone, Default)]
pub struct Mailbox(Rc<RefCell<VecDeque<Envelope>>>);

impl Mailbox {
    pub fn post(&self, envelope: Envelope) {
        self.0.borrow_mut().push_back(envelope);
    }

    pub fn take_all(&self) -> Vec<Envelope> {
        self.0.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn same(&self, other: &Mailbox) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_channel_keeps_subscription_order() {
        let mut channel = EventChannel::default();
        channel.register_handler(VALUE_CHANGED, |_, _| Ok(()));
        channel.register_handler(VALUE_CHANGED, |_, _| {
            Err(EngineError::Handler {
                event: VALUE_CHANGED.into(),
                message: "second".into(),
            })
        });
        channel.register_handler(VIEW_CHANGED, |_, _| Ok(()));

        assert_eq!(channel.count(VALUE_CHANGED), 2);
        assert_eq!(channel.count(VIEW_CHANGED), 1);
        assert_eq!(channel.count(DISPLAYED), 0);
        assert!(channel.subscribers(DISPLAYED).is_empty());
    }

    #[test]
    fn test_mailbox_fifo() {
        let mut keys: SlotMap<ProjectionId, ()> = SlotMap::with_key();
        let p = keys.insert(());
        let mailbox = Mailbox::default();
        let other = mailbox.clone();
        other.post(Envelope {
            projection: p,
            event: ModelEvent::new(VALUE_ADDED, Payload::None),
        });
        other.post(Envelope {
            projection: p,
            event: ModelEvent::new(VALUE_REMOVED, Payload::None),
        });
        assert_eq!(mailbox.len(), 2);
        assert!(mailbox.same(&other));

        let names: Vec<String> = mailbox.take_all().into_iter().map(|e| e.event.name).collect();
        assert_eq!(names, vec![VALUE_ADDED, VALUE_REMOVED]);
        assert!(mailbox.is_empty());
    }

    #[test]
    fn test_event_concerns() {
        let id = ConceptId::new("a");
        let view = ModelEvent::new(VIEW_CHANGED, Payload::View(1));
        assert!(view.concerns(&id));
        let mut scoped = ModelEvent::new(VALUE_CHANGED, Payload::Value(Value::Bool(true)));
        scoped.source = Some(ConceptId::new("b"));
        assert!(!scoped.concerns(&id));
        assert!(scoped.is(VALUE_CHANGED));
    }
}
