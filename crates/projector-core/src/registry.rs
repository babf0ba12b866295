//! Model registry: one arena per component family, keyed by typed indices,
//! plus the reverse lookup from visual handle to owning component.

use std::collections::HashMap;

use slotmap::{Key, SlotMap, new_key_type};

use crate::{Component, ComponentKind, ComponentRef, Field, VisualHandle};

new_key_type! {
    pub struct LayoutId;
    pub struct FieldId;
    pub struct StaticId;
    pub struct ProjectionId;
    pub struct TimerId;
}

/// Arena whose slots can be checked out while their component runs.
/// A reserved or checked-out slot holds `None`.
pub struct Arena<K: Key, T: ?Sized> {
    slots: SlotMap<K, Option<Box<T>>>,
}

impl<K: Key, T: ?Sized> Default for Arena<K, T> {
    fn default() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }
}

impl<K: Key, T: ?Sized> Arena<K, T> {
    pub fn reserve(&mut self) -> K {
        self.slots.insert(None)
    }

    pub fn fill(&mut self, key: K, value: Box<T>) {
        if let Some(slot) = self.slots.get_mut(key) {
            *slot = Some(value);
        }
    }

    pub fn take(&mut self, key: K) -> Option<Box<T>> {
        self.slots.get_mut(key).and_then(Option::take)
    }

    pub fn release(&mut self, key: K) -> Option<Box<T>> {
        self.slots.remove(key).flatten()
    }

    pub fn contains(&self, key: K) -> bool {
        self.slots.contains_key(key)
    }

    /// Registered but currently checked out (or still being built).
    pub fn is_checked_out(&self, key: K) -> bool {
        matches!(self.slots.get(key), Some(None))
    }

    pub fn get(&self, key: K) -> Option<&T> {
        self.slots.get(key).and_then(|s| s.as_deref())
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots.get_mut(key).and_then(|s| s.as_deref_mut())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.slots.keys()
    }
}

/// A freshly built component on its way into its arena.
pub enum Built {
    Field(Box<dyn Field>),
    Plain(Box<dyn Component>),
}

impl Built {
    pub fn component(&self) -> &dyn Component {
        match self {
            Built::Field(f) => &**f,
            Built::Plain(c) => &**c,
        }
    }

    pub fn component_mut(&mut self) -> &mut dyn Component {
        match self {
            Built::Field(f) => &mut **f,
            Built::Plain(c) => &mut **c,
        }
    }
}

#[derive(Default)]
pub struct Registry {
    pub layouts: Arena<LayoutId, dyn Component>,
    pub fields: Arena<FieldId, dyn Field>,
    pub statics: Arena<StaticId, dyn Component>,
    handles: HashMap<VisualHandle, ComponentRef>,
}

impl Registry {
    pub fn reserve(&mut self, kind: ComponentKind) -> ComponentRef {
        match kind {
            ComponentKind::Layout => ComponentRef::Layout(self.layouts.reserve()),
            ComponentKind::Field => ComponentRef::Field(self.fields.reserve()),
            ComponentKind::Static => ComponentRef::Static(self.statics.reserve()),
        }
    }

    pub fn contains(&self, r: ComponentRef) -> bool {
        match r {
            ComponentRef::Layout(id) => self.layouts.contains(id),
            ComponentRef::Field(id) => self.fields.contains(id),
            ComponentRef::Static(id) => self.statics.contains(id),
        }
    }

    pub fn is_checked_out(&self, r: ComponentRef) -> bool {
        match r {
            ComponentRef::Layout(id) => self.layouts.is_checked_out(id),
            ComponentRef::Field(id) => self.fields.is_checked_out(id),
            ComponentRef::Static(id) => self.statics.is_checked_out(id),
        }
    }

    pub fn get(&self, r: ComponentRef) -> Option<&dyn Component> {
        match r {
            ComponentRef::Layout(id) => self.layouts.get(id),
            ComponentRef::Field(id) => self.fields.get(id).map(|f| f as &dyn Component),
            ComponentRef::Static(id) => self.statics.get(id),
        }
    }

    pub fn get_mut(&mut self, r: ComponentRef) -> Option<&mut dyn Component> {
        match r {
            ComponentRef::Layout(id) => self.layouts.get_mut(id).map(|c| c as &mut dyn Component),
            ComponentRef::Field(id) => self.fields.get_mut(id).map(|f| f as &mut dyn Component),
            ComponentRef::Static(id) => self.statics.get_mut(id).map(|c| c as &mut dyn Component),
        }
    }

    pub fn take(&mut self, r: ComponentRef) -> Option<Built> {
        match r {
            ComponentRef::Layout(id) => self.layouts.take(id).map(Built::Plain),
            ComponentRef::Field(id) => self.fields.take(id).map(Built::Field),
            ComponentRef::Static(id) => self.statics.take(id).map(Built::Plain),
        }
    }

    /// Returns a checked-out component to its slot. Mismatched families are
    /// dropped with a warning.
    pub fn restore(&mut self, r: ComponentRef, built: Built) {
        match (r, built) {
            (ComponentRef::Layout(id), Built::Plain(c)) => self.layouts.fill(id, c),
            (ComponentRef::Static(id), Built::Plain(c)) => self.statics.fill(id, c),
            (ComponentRef::Field(id), Built::Field(f)) => self.fields.fill(id, f),
            (r, _) => log::warn!("component family mismatch while restoring {r}"),
        }
    }

    pub fn release(&mut self, r: ComponentRef) {
        match r {
            ComponentRef::Layout(id) => drop(self.layouts.release(id)),
            ComponentRef::Field(id) => drop(self.fields.release(id)),
            ComponentRef::Static(id) => drop(self.statics.release(id)),
        }
        self.handles.retain(|_, owner| *owner != r);
    }

    pub fn bind_handle(&mut self, handle: VisualHandle, r: ComponentRef) {
        self.handles.insert(handle, r);
    }

    pub fn resolve_element(&self, handle: VisualHandle) -> Option<ComponentRef> {
        self.handles.get(&handle).copied()
    }

    pub fn len(&self) -> usize {
        self.layouts.len() + self.fields.len() + self.statics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_checkout_cycle() {
        let mut arena: Arena<TimerId, str> = Arena::default();
        let k = arena.reserve();
        assert!(arena.contains(k));
        assert!(arena.is_checked_out(k));
        assert!(arena.get(k).is_none());

        arena.fill(k, "blink".into());
        assert_eq!(arena.get(k), Some("blink"));
        assert!(!arena.is_checked_out(k));

        let taken = arena.take(k).unwrap();
        assert!(arena.is_checked_out(k));
        assert!(arena.take(k).is_none());
        arena.fill(k, taken);

        assert_eq!(arena.release(k).as_deref(), Some("blink"));
        assert!(!arena.contains(k));
        assert!(arena.is_empty());
    }

    #[test]
    fn test_reserve_is_typed_per_family() {
        let mut registry = Registry::default();
        let layout = registry.reserve(ComponentKind::Layout);
        let field = registry.reserve(ComponentKind::Field);
        assert_eq!(layout.kind(), ComponentKind::Layout);
        assert_eq!(field.kind(), ComponentKind::Field);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.layouts.len(), 1);
        assert_eq!(registry.fields.len(), 1);
        assert!(registry.statics.is_empty());

        registry.release(field);
        assert!(!registry.contains(field));
        assert!(registry.contains(layout));
    }
}
