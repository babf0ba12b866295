//! The domain-model boundary.
//!
//! A `Concept` is owned by the host's model, never by the engine. The engine
//! keeps `ConceptRef` handles, reads through the query methods and asks for
//! changes through the mutators; the concept reports what actually changed to
//! every registered `Observer`.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{Envelope, Mailbox, ModelEvent};
use crate::{Candidate, ProjectionId, Value};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConceptId(pub String);

impl ConceptId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type ConceptRef = Rc<dyn Concept>;

/// A concept refused a mutation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Rejection {
    pub message: String,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type Mutation<T = ()> = Result<T, Rejection>;

/// An attribute slot of a concept as seen by the resolver.
#[derive(Clone)]
pub struct AttributeBinding {
    pub name: String,
    pub optional: bool,
    /// `None` until the attribute is materialized.
    pub target: Option<ConceptRef>,
}

impl fmt::Debug for AttributeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeBinding")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .field("target", &self.target.as_ref().map(|t| t.id()))
            .finish()
    }
}

pub trait Concept {
    fn id(&self) -> ConceptId;
    /// Concept type name; projection schemas are registered against it.
    fn name(&self) -> &str;

    fn register(&self, observer: Observer);
    fn unregister(&self, observer: &Observer);

    fn has_value(&self) -> bool {
        false
    }
    fn get_value(&self) -> Value {
        Value::Null
    }
    fn set_value(&self, _value: Value) -> Mutation {
        Err(Rejection::new(format!("`{}` does not hold a value", self.name())))
    }
    fn get_candidates(&self) -> Vec<Candidate> {
        Vec::new()
    }

    /// Ordered collection for list-like concepts.
    fn elements(&self) -> Vec<ConceptRef> {
        Vec::new()
    }
    fn create_element(&self) -> Mutation<ConceptRef> {
        Err(Rejection::new(format!("`{}` is not a collection", self.name())))
    }
    fn remove_element_at(&self, _index: usize) -> Mutation {
        Err(Rejection::new(format!("`{}` is not a collection", self.name())))
    }
    fn swap_element(&self, _a: usize, _b: usize) -> Mutation {
        Err(Rejection::new(format!("`{}` is not a collection", self.name())))
    }
    /// Position inside the owning collection, if any.
    fn index(&self) -> Option<usize> {
        None
    }

    fn attribute(&self, _name: &str) -> Option<AttributeBinding> {
        None
    }
    fn create_attribute(&self, name: &str) -> Mutation<ConceptRef> {
        Err(Rejection::new(format!(
            "`{}` has no attribute `{name}`",
            self.name()
        )))
    }
    fn property(&self, _name: &str) -> Option<Value> {
        None
    }
    fn delete(&self) -> Mutation {
        Err(Rejection::new(format!("`{}` cannot be deleted", self.name())))
    }
}

/// Subscription handle a projection hands to a concept. Notifications land in
/// the model's mailbox and are delivered on the projection's event channel.
#[derive(Clone)]
pub struct Observer {
    projection: ProjectionId,
    mailbox: Mailbox,
}

impl Observer {
    pub(crate) fn new(projection: ProjectionId, mailbox: Mailbox) -> Self {
        Self {
            projection,
            mailbox,
        }
    }

    pub fn projection(&self) -> ProjectionId {
        self.projection
    }

    pub fn notify(&self, event: ModelEvent) {
        self.mailbox.post(Envelope {
            projection: self.projection,
            event,
        });
    }
}

impl PartialEq for Observer {
    fn eq(&self, other: &Self) -> bool {
        self.projection == other.projection && self.mailbox.same(&other.mailbox)
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("projection", &self.projection)
            .finish()
    }
}
