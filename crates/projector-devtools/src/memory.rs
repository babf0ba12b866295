//! In-memory concepts for tests and demos.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use projector_core::{
    AttributeBinding, Candidate, Concept, ConceptId, ConceptRef, ModelEvent, Mutation, Observer,
    Payload, Rejection, VALUE_ADDED, VALUE_CHANGED, VALUE_REMOVED, VALUE_SWAPPED, Value,
};

type Validator = Box<dyn Fn(&Value) -> Result<(), String>>;

struct Slot {
    name: String,
    concept: String,
    optional: bool,
    target: Option<Rc<MemoryConcept>>,
}

/// A concept held entirely in memory. Every mutation reports itself to the
/// registered observers.
pub struct MemoryConcept {
    me: Weak<MemoryConcept>,
    id: ConceptId,
    name: String,
    value: RefCell<Value>,
    candidates: RefCell<Vec<Candidate>>,
    elements: RefCell<Vec<Rc<MemoryConcept>>>,
    element_name: Option<String>,
    parent: RefCell<Weak<MemoryConcept>>,
    attributes: RefCell<Vec<Slot>>,
    properties: HashMap<String, Value>,
    observers: RefCell<Vec<Observer>>,
    validator: Option<Validator>,
    next: Cell<usize>,
}

pub struct MemoryConceptBuilder {
    id: String,
    name: String,
    value: Value,
    candidates: Vec<Candidate>,
    elements: Vec<Rc<MemoryConcept>>,
    element_name: Option<String>,
    attributes: Vec<Slot>,
    properties: HashMap<String, Value>,
    validator: Option<Validator>,
}

impl MemoryConceptBuilder {
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn candidates(mut self, candidates: Vec<Candidate>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Makes the concept a collection whose new elements are named `name`.
    pub fn collection_of(mut self, name: impl Into<String>) -> Self {
        self.element_name = Some(name.into());
        self
    }

    pub fn element(mut self, element: Rc<MemoryConcept>) -> Self {
        self.elements.push(element);
        self
    }

    /// Declares an attribute slot materialized on demand as a `concept`.
    pub fn attribute(mut self, name: impl Into<String>, concept: impl Into<String>, optional: bool) -> Self {
        self.attributes.push(Slot {
            name: name.into(),
            concept: concept.into(),
            optional,
            target: None,
        });
        self
    }

    /// Declares an attribute slot that already holds `target`.
    pub fn attribute_with(mut self, name: impl Into<String>, target: Rc<MemoryConcept>) -> Self {
        self.attributes.push(Slot {
            name: name.into(),
            concept: target.name.clone(),
            optional: false,
            target: Some(target),
        });
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn validator(mut self, validator: impl Fn(&Value) -> Result<(), String> + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn build(self) -> Rc<MemoryConcept> {
        let count = self.elements.len();
        let concept = Rc::new_cyclic(|me| MemoryConcept {
            me: me.clone(),
            id: ConceptId::new(self.id),
            name: self.name,
            value: RefCell::new(self.value),
            candidates: RefCell::new(self.candidates),
            elements: RefCell::new(Vec::new()),
            element_name: self.element_name,
            parent: RefCell::new(Weak::new()),
            attributes: RefCell::new(self.attributes),
            properties: self.properties,
            observers: RefCell::new(Vec::new()),
            validator: self.validator,
            next: Cell::new(count),
        });
        for element in &self.elements {
            element.parent.replace(Rc::downgrade(&concept));
        }
        concept.elements.replace(self.elements);
        concept
    }
}

impl MemoryConcept {
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> MemoryConceptBuilder {
        MemoryConceptBuilder {
            id: id.into(),
            name: name.into(),
            value: Value::Null,
            candidates: Vec::new(),
            elements: Vec::new(),
            element_name: None,
            attributes: Vec::new(),
            properties: HashMap::new(),
            validator: None,
        }
    }

    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Rc<Self> {
        Self::builder(id, name).build()
    }

    /// A collection named `name` holding one `element` concept per id.
    pub fn list(id: &str, name: &str, element: &str, ids: &[&str]) -> Rc<Self> {
        ids.iter()
            .fold(Self::builder(id, name).collection_of(element), |b, e| {
                b.element(Self::new(*e, element))
            })
            .build()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn element_ids(&self) -> Vec<String> {
        self.elements.borrow().iter().map(|e| e.id.0.clone()).collect()
    }

    pub fn element_at(&self, index: usize) -> Option<Rc<MemoryConcept>> {
        self.elements.borrow().get(index).cloned()
    }

    pub fn attribute_target(&self, name: &str) -> Option<Rc<MemoryConcept>> {
        self.attributes
            .borrow()
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.target.clone())
    }

    /// Inserts an existing concept into the collection, as another editor
    /// of the same model would.
    pub fn insert_element_at(&self, index: usize, element: Rc<MemoryConcept>) {
        let index = index.min(self.elements.borrow().len());
        element.parent.replace(self.me.clone());
        self.elements.borrow_mut().insert(index, element.clone());
        self.emit(VALUE_ADDED, Payload::Element(element));
    }

    pub fn push_element(&self, element: Rc<MemoryConcept>) {
        let end = self.elements.borrow().len();
        self.insert_element_at(end, element);
    }

    /// Replaces the value without validation and reports it.
    pub fn replace_value(&self, value: impl Into<Value>) {
        let value = value.into();
        self.value.replace(value.clone());
        self.emit(VALUE_CHANGED, Payload::Value(value));
    }

    /// Offers a new set of candidates and reports it as a value change.
    pub fn replace_candidates(&self, candidates: Vec<Candidate>) {
        self.candidates.replace(candidates);
        self.emit(VALUE_CHANGED, Payload::None);
    }

    /// Reports a wholesale collection change without touching the elements.
    pub fn touch(&self) {
        self.emit(VALUE_CHANGED, Payload::None);
    }

    fn emit(&self, name: &str, payload: Payload) {
        let observers = self.observers.borrow().clone();
        for observer in observers {
            observer.notify(ModelEvent::from_concept(self, name, payload.clone()));
        }
    }

    fn check_index(&self, index: usize) -> Mutation {
        let len = self.elements.borrow().len();
        if index < len {
            Ok(())
        } else {
            Err(Rejection::new(format!(
                "`{}` has no element {index} (length {len})",
                self.id
            )))
        }
    }
}

impl Concept for MemoryConcept {
    fn id(&self) -> ConceptId {
        self.id.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn register(&self, observer: Observer) {
        self.observers.borrow_mut().push(observer);
    }

    fn unregister(&self, observer: &Observer) {
        self.observers.borrow_mut().retain(|o| o != observer);
    }

    fn has_value(&self) -> bool {
        !self.value.borrow().is_null()
    }

    fn get_value(&self) -> Value {
        self.value.borrow().clone()
    }

    fn set_value(&self, value: Value) -> Mutation {
        if let Some(validate) = &self.validator {
            validate(&value).map_err(Rejection::new)?;
        }
        if *self.value.borrow() == value {
            return Ok(());
        }
        self.value.replace(value.clone());
        self.emit(VALUE_CHANGED, Payload::Value(value));
        Ok(())
    }

    fn get_candidates(&self) -> Vec<Candidate> {
        self.candidates.borrow().clone()
    }

    fn elements(&self) -> Vec<ConceptRef> {
        self.elements
            .borrow()
            .iter()
            .map(|e| e.clone() as ConceptRef)
            .collect()
    }

    fn create_element(&self) -> Mutation<ConceptRef> {
        let Some(name) = &self.element_name else {
            return Err(Rejection::new(format!("`{}` is not a collection", self.id)));
        };
        let n = self.next.get();
        self.next.set(n + 1);
        let element = MemoryConcept::new(format!("{}/{n}", self.id), name.clone());
        self.push_element(element.clone());
        Ok(element as ConceptRef)
    }

    fn remove_element_at(&self, index: usize) -> Mutation {
        self.check_index(index)?;
        let removed = self.elements.borrow_mut().remove(index);
        removed.parent.replace(Weak::new());
        self.emit(VALUE_REMOVED, Payload::Element(removed));
        Ok(())
    }

    fn swap_element(&self, a: usize, b: usize) -> Mutation {
        self.check_index(a)?;
        self.check_index(b)?;
        if a == b {
            return Ok(());
        }
        self.elements.borrow_mut().swap(a, b);
        let (first, second) = {
            let elements = self.elements.borrow();
            (elements[b].clone(), elements[a].clone())
        };
        self.emit(VALUE_SWAPPED, Payload::Swap(first, second));
        Ok(())
    }

    fn index(&self) -> Option<usize> {
        let parent = self.parent.borrow().upgrade()?;
        let elements = parent.elements.borrow();
        elements.iter().position(|e| std::ptr::eq(Rc::as_ptr(e), self))
    }

    fn attribute(&self, name: &str) -> Option<AttributeBinding> {
        self.attributes
            .borrow()
            .iter()
            .find(|s| s.name == name)
            .map(|s| AttributeBinding {
                name: s.name.clone(),
                optional: s.optional,
                target: s.target.clone().map(|t| t as ConceptRef),
            })
    }

    fn create_attribute(&self, name: &str) -> Mutation<ConceptRef> {
        let mut attributes = self.attributes.borrow_mut();
        let slot = attributes
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| Rejection::new(format!("`{}` has no attribute `{name}`", self.id)))?;
        let target = slot
            .target
            .get_or_insert_with(|| MemoryConcept::new(format!("{}.{name}", self.id), slot.concept.clone()))
            .clone();
        Ok(target as ConceptRef)
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.get(name).cloned()
    }

    fn delete(&self) -> Mutation {
        let parent = self
            .parent
            .borrow()
            .upgrade()
            .ok_or_else(|| Rejection::new(format!("`{}` is not in a collection", self.id)))?;
        let index = self
            .index()
            .ok_or_else(|| Rejection::new(format!("`{}` is detached", self.id)))?;
        parent.remove_element_at(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_indices_follow_mutations() {
        let list = MemoryConcept::list("l", "list", "item", &["x", "y", "z"]);
        let y = list.element_at(1).unwrap();
        assert_eq!(y.index(), Some(1));

        list.remove_element_at(0).unwrap();
        assert_eq!(y.index(), Some(0));
        assert_eq!(list.element_ids(), vec!["y", "z"]);

        list.swap_element(0, 1).unwrap();
        assert_eq!(y.index(), Some(1));

        let created = list.create_element().unwrap();
        assert_eq!(created.id().0, "l/3");
        assert_eq!(created.index(), Some(2));
        assert!(list.remove_element_at(7).is_err());
    }

    #[test]
    fn test_validator_rejects() {
        let age = MemoryConcept::builder("age", "number")
            .validator(|v| match v {
                Value::Number(n) if *n >= 0.0 => Ok(()),
                _ => Err("age must be a positive number".into()),
            })
            .build();
        assert!(age.set_value(Value::Number(3.0)).is_ok());
        let err = age.set_value(Value::Text("old".into())).unwrap_err();
        assert_eq!(err.message, "age must be a positive number");
        assert_eq!(age.get_value(), Value::Number(3.0));
    }

    #[test]
    fn test_optional_attribute_materializes_once() {
        let person = MemoryConcept::builder("p", "person")
            .attribute("address", "address", true)
            .build();
        let slot = person.attribute("address").unwrap();
        assert!(slot.optional);
        assert!(slot.target.is_none());

        let first = person.create_attribute("address").unwrap();
        let second = person.create_attribute("address").unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(first.name(), "address");
        assert!(person.attribute("address").unwrap().target.is_some());
        assert!(person.create_attribute("phone").is_err());
    }

    #[test]
    fn test_delete_through_parent() {
        let list = MemoryConcept::list("l", "list", "item", &["x", "y"]);
        let x = list.element_at(0).unwrap();
        x.delete().unwrap();
        assert_eq!(list.element_ids(), vec!["y"]);
        assert!(x.delete().is_err());
    }
}
