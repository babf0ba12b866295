use std::collections::HashMap;

use crate::{Component, ComponentCore, ComponentNode, Field, SchemaError};

pub type ComponentFactory =
    fn(ComponentCore, &ComponentNode) -> Result<Box<dyn Component>, SchemaError>;
pub type FieldFactory = fn(ComponentCore, &ComponentNode) -> Result<Box<dyn Field>, SchemaError>;

/// Constructors per family, keyed by the schema's variant kind.
#[derive(Default)]
pub struct Factories {
    layouts: HashMap<String, ComponentFactory>,
    fields: HashMap<String, FieldFactory>,
    statics: HashMap<String, ComponentFactory>,
}

impl Factories {
    pub fn register_layout(&mut self, kind: impl Into<String>, factory: ComponentFactory) {
        self.layouts.insert(kind.into(), factory);
    }

    pub fn register_field(&mut self, kind: impl Into<String>, factory: FieldFactory) {
        self.fields.insert(kind.into(), factory);
    }

    pub fn register_static(&mut self, kind: impl Into<String>, factory: ComponentFactory) {
        self.statics.insert(kind.into(), factory);
    }

    pub fn layout(&self, kind: &str) -> Option<ComponentFactory> {
        self.layouts.get(kind).copied()
    }

    pub fn field(&self, kind: &str) -> Option<FieldFactory> {
        self.fields.get(kind).copied()
    }

    pub fn static_(&self, kind: &str) -> Option<ComponentFactory> {
        self.statics.get(kind).copied()
    }

    pub fn kinds(&self) -> (Vec<&str>, Vec<&str>, Vec<&str>) {
        let sorted = |keys: Vec<_>| {
            let mut keys = keys;
            keys.sort_unstable();
            keys
        };
        (
            sorted(self.layouts.keys().map(String::as_str).collect()),
            sorted(self.fields.keys().map(String::as_str).collect()),
            sorted(self.statics.keys().map(String::as_str).collect()),
        )
    }
}
