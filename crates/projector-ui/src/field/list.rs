//! Collection fields: one item per element of the bound concept, kept in
//! model order by [`ItemList`]. The list and table fields share everything
//! but their rendering and sideways navigation.
//!
//! Keys:
//! - enter creates an element and focuses its item once it appears;
//! - delete inside an item removes that element;
//! - shift+arrow along the axis swaps the item with its neighbour;
//! - arrows along the axis move between items in collection order.

use projector_core::{
    Component, ComponentCore, ComponentNode, ConceptId, Direction, EngineError, Field, Flags,
    Focus, Model, ModelEvent, Orientation, Payload, Primitive, SchemaError, Step, VALUE_ADDED,
    VALUE_CHANGED, VALUE_REMOVED, VALUE_SWAPPED, Value, VisualHandle,
};

use super::reconcile::{ItemList, ItemShape};
use super::{FieldConfig, show_errors};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Presentation {
    List,
    Table,
}

pub struct CollectionField {
    pub(crate) core: ComponentCore,
    pub(crate) config: FieldConfig,
    pub(crate) presentation: Presentation,
    pub(crate) items: ItemList,
    pub(crate) empty_label: Option<VisualHandle>,
    /// Element created from here whose item should take focus on arrival.
    pending_focus: Option<ConceptId>,
    /// Item position to refocus after a removal started here.
    refocus: Option<usize>,
    errors: Vec<String>,
}

pub fn create(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Field>, SchemaError> {
    let config: FieldConfig = node.config()?;
    let shape = ItemShape::Projection {
        tag: config.tag.clone(),
    };
    Ok(Box::new(CollectionField::new(core, config, Presentation::List, shape)))
}

impl CollectionField {
    pub(crate) fn new(
        core: ComponentCore,
        config: FieldConfig,
        presentation: Presentation,
        shape: ItemShape,
    ) -> Self {
        Self {
            core,
            config,
            presentation,
            items: ItemList::new(shape),
            empty_label: None,
            pending_focus: None,
            refocus: None,
            errors: Vec::new(),
        }
    }

    fn orientation(&self) -> Orientation {
        match self.presentation {
            Presentation::List => self.config.orientation,
            Presentation::Table => Orientation::Vertical,
        }
    }

    pub fn items(&self) -> &ItemList {
        &self.items
    }

    fn decorate(&self, model: &mut Model) {
        let empty = self.items.is_empty();
        let target = model.target_mut();
        if let Some(element) = self.core.element {
            target.set_class(element, "empty", empty);
        }
        if let Some(label) = self.empty_label {
            target.set_class(label, "hidden", !empty);
        }
    }

    /// Focuses the item at `index`, or failing that the nearest focusable
    /// one in direction `step`.
    fn focus_item(&self, model: &mut Model, index: usize, step: Step) -> bool {
        let mut current = Some(index);
        while let Some(i) = current {
            let Some(item) = self.items.get(i) else {
                return false;
            };
            if let Some(r) = model.first_focusable(&item.children)
                && model.focus(r, None)
            {
                return true;
            }
            current = step.apply(i, self.items.len());
        }
        false
    }

    fn after_event(&mut self, model: &mut Model, added: Option<usize>) {
        self.decorate(model);
        if let (Some(at), Some(pending)) = (added, &self.pending_focus)
            && self.items.get(at).is_some_and(|i| i.concept.id() == *pending)
        {
            self.pending_focus = None;
            self.focus_item(model, at, Step::Forward);
        }
        if let Some(at) = self.refocus.take() {
            let landed = match self.items.len() {
                0 => false,
                len => self.focus_item(model, at.min(len - 1), Step::Backward),
            };
            if !landed {
                model.claim_focus(self);
            }
        }
    }

    /// Item the command is aimed at.
    fn target_item(&self, model: &Model, target: Option<VisualHandle>) -> Option<usize> {
        let handle = target?;
        if Some(handle) == self.core.element {
            return None;
        }
        self.items.position_of(model, handle)
    }
}

impl Component for CollectionField {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn init(&mut self, model: &mut Model) -> Result<(), EngineError> {
        self.core.flags.insert(Flags::FOCUSABLE);
        self.core.flags.set(Flags::READONLY, self.config.readonly);
        let source = self.core.source.id();
        model.listen(
            self.core.id,
            self.core.projection,
            source,
            &[VALUE_ADDED, VALUE_REMOVED, VALUE_SWAPPED, VALUE_CHANGED],
        )
    }

    fn render(&mut self, model: &mut Model) -> Result<VisualHandle, EngineError> {
        if let Some(element) = self.core.element {
            return Ok(element);
        }
        let element = match self.presentation {
            Presentation::List => {
                let target = model.target_mut();
                let element = target.create(Primitive::container().class("field").class("list"));
                let container = target.create(
                    Primitive::container()
                        .class("items")
                        .class(self.config.orientation.class()),
                );
                target.append(element, container);
                self.items.attach(container);
                element
            }
            Presentation::Table => super::table::render_frame(self, model),
        };
        let text = model.config().empty_list_label.clone();
        let label = model
            .target_mut()
            .create(Primitive::text_node(text).class("empty-label"));
        model.target_mut().append(element, label);
        self.empty_label = Some(label);

        if let Err(e) = self.items.rebuild(model, &mut self.core) {
            self.items.clear(model, self.core.projection);
            model.target_mut().remove(element);
            return Err(e);
        }
        let empty = self.items.is_empty();
        model.target_mut().set_class(element, "empty", empty);
        model.target_mut().set_class(label, "hidden", !empty);
        Ok(element)
    }

    fn focus(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> Focus {
        match model.first_focusable(&self.core.children) {
            Some(first) => Focus::Delegate(first),
            None => Focus::Accept,
        }
    }

    fn enter_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        if self.core.flags.contains(Flags::READONLY) {
            return projector_core::unhandled(&self.core, "enter");
        }
        let created = self.core.source.create_element();
        match model.mutate(created) {
            Some(element) => {
                self.pending_focus = Some(element.id());
                true
            }
            None => false,
        }
    }

    fn delete_handler(&mut self, model: &mut Model, target: Option<VisualHandle>) -> bool {
        if self.core.flags.contains(Flags::READONLY) {
            return false;
        }
        let Some(at) = self.target_item(model, target) else {
            return projector_core::unhandled(&self.core, "delete");
        };
        let index = self
            .items
            .get(at)
            .and_then(|i| i.concept.index())
            .unwrap_or(at);
        let removed = self.core.source.remove_element_at(index);
        if model.mutate(removed).is_some() {
            self.refocus = Some(at);
        }
        true
    }

    fn arrow_handler(
        &mut self,
        model: &mut Model,
        dir: Direction,
        target: Option<VisualHandle>,
    ) -> bool {
        let Some(at) = self.target_item(model, target) else {
            return false;
        };
        let Some(step) = self.orientation().step(dir) else {
            return match (self.presentation, target) {
                (Presentation::Table, Some(origin)) => self
                    .items
                    .get(at)
                    .is_some_and(|row| model.focus_nearest(row.element, Some(origin), dir)),
                _ => false,
            };
        };
        match step.apply(at, self.items.len()) {
            Some(next) => self.focus_item(model, next, step),
            None => false,
        }
    }

    fn shift_handler(
        &mut self,
        model: &mut Model,
        dir: Direction,
        target: Option<VisualHandle>,
    ) -> bool {
        if self.core.flags.contains(Flags::READONLY) {
            return false;
        }
        let (Some(at), Some(step)) = (self.target_item(model, target), self.orientation().step(dir))
        else {
            return projector_core::unhandled(&self.core, "shift");
        };
        let Some(other) = step.apply(at, self.items.len()) else {
            return false;
        };
        let swapped = self.core.source.swap_element(at, other);
        model.mutate(swapped).is_some()
    }

    fn update(&mut self, model: &mut Model, event: &ModelEvent) -> Result<(), EngineError> {
        let added = match (&event.payload, event.name.as_str()) {
            (Payload::Element(element), VALUE_ADDED) => {
                self.items.added(model, &mut self.core, element.clone())?
            }
            (Payload::Element(element), VALUE_REMOVED) => {
                self.items.removed(model, &mut self.core, element)?;
                None
            }
            (Payload::Swap(a, b), VALUE_SWAPPED) => {
                self.items.swapped(model, &mut self.core, a, b)?;
                None
            }
            (_, VALUE_CHANGED) => {
                self.items.rebuild(model, &mut self.core)?;
                None
            }
            _ => return Ok(()),
        };
        self.after_event(model, added);
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some(match self.items.len() {
            1 => "1 item".to_string(),
            n => format!("{n} items"),
        })
    }
}

impl Field for CollectionField {
    fn has_value(&self) -> bool {
        !self.items.is_empty()
    }

    fn get_value(&self) -> Value {
        Value::Number(self.items.len() as f64)
    }

    /// Collections are edited element by element, never replaced wholesale.
    fn set_value(&mut self, model: &mut Model, value: Value, _commit: bool) -> bool {
        self.errors = vec![format!("a collection cannot be set to `{value}`")];
        show_errors(model, &self.core, &self.errors);
        false
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }
}
