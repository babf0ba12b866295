//! Single-line text field.
//!
//! The buffer is edited locally while focused and committed on enter or when
//! focus leaves. A rejected commit reverts to the last committed text. Caret
//! blink runs on a model timer that only exists while the field is focused.

use projector_core::{
    Component, ComponentCore, ComponentNode, Direction, EngineError, Field, Flags, Model,
    ModelEvent, Primitive, PrimitiveKind, SchemaError, TimerId, VALUE_CHANGED, Value,
    VisualHandle,
};

use super::buffer::TextBuffer;
use super::{FieldConfig, show_errors};

pub struct TextField {
    core: ComponentCore,
    config: FieldConfig,
    buffer: TextBuffer,
    committed: String,
    errors: Vec<String>,
    blink: Option<TimerId>,
    caret: bool,
}

pub fn create(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Field>, SchemaError> {
    Ok(Box::new(TextField {
        core,
        config: node.config()?,
        buffer: TextBuffer::default(),
        committed: String::new(),
        errors: Vec::new(),
        blink: None,
        caret: false,
    }))
}

impl TextField {
    fn is_dirty(&self) -> bool {
        self.buffer.text != self.committed
    }

    fn is_readonly(&self) -> bool {
        self.core.flags.contains(Flags::READONLY)
    }

    fn refresh(&self, model: &mut Model) {
        let Some(element) = self.core.element else {
            return;
        };
        let target = model.target_mut();
        target.set_text(element, &self.buffer.text);
        target.set_class(element, "empty", self.buffer.text.is_empty());
        target.set_class(element, "dirty", self.is_dirty());
    }

    fn edited(&mut self, model: &mut Model, changed: bool) -> bool {
        if changed {
            self.refresh(model);
        }
        changed
    }

    fn commit(&mut self, model: &mut Model) -> bool {
        let value = Value::Text(self.buffer.text.clone());
        let accepted = match model.commit_value(&self.core.source, value) {
            Ok(()) => {
                self.committed = self.buffer.text.clone();
                self.errors.clear();
                true
            }
            Err(rejection) => {
                self.buffer.set(&self.committed);
                self.errors = vec![rejection.message];
                false
            }
        };
        self.refresh(model);
        show_errors(model, &self.core, &self.errors);
        accepted
    }

    fn stop_blink(&mut self, model: &mut Model) {
        if let Some(timer) = self.blink.take() {
            model.cancel_timer(timer);
        }
        self.caret = false;
        if let Some(element) = self.core.element {
            model.target_mut().set_class(element, "caret", false);
        }
    }
}

impl Component for TextField {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn init(&mut self, model: &mut Model) -> Result<(), EngineError> {
        self.core.flags.insert(Flags::FOCUSABLE);
        self.core.flags.set(Flags::READONLY, self.config.readonly);
        self.committed = self.core.source.get_value().to_display();
        self.buffer.set(&self.committed);
        let source = self.core.source.id();
        model.listen(self.core.id, self.core.projection, source, &[VALUE_CHANGED])
    }

    fn render(&mut self, model: &mut Model) -> Result<VisualHandle, EngineError> {
        if let Some(element) = self.core.element {
            return Ok(element);
        }
        let mut primitive = Primitive::new(PrimitiveKind::Input)
            .class("field")
            .class("text-field")
            .text(self.buffer.text.clone());
        if let Some(placeholder) = &self.config.placeholder {
            primitive = primitive.attr("placeholder", placeholder.clone());
        }
        if self.buffer.text.is_empty() {
            primitive = primitive.class("empty");
        }
        if self.is_readonly() {
            primitive = primitive.class("readonly");
        }
        Ok(model.target_mut().create(primitive))
    }

    fn focus_in(&mut self, model: &mut Model) {
        if self.blink.is_none() {
            let interval = model.config().caret_blink();
            self.blink = Some(model.start_timer(self.core.id, interval));
        }
        self.caret = true;
        if let Some(element) = self.core.element {
            model.target_mut().set_class(element, "caret", true);
        }
    }

    fn focus_out(&mut self, model: &mut Model) {
        self.stop_blink(model);
        if self.is_dirty() {
            self.commit(model);
        }
    }

    fn on_timer(&mut self, model: &mut Model, timer: TimerId) {
        if self.blink != Some(timer) {
            return;
        }
        self.caret = !self.caret;
        if let Some(element) = self.core.element {
            model.target_mut().set_class(element, "caret", self.caret);
        }
    }

    fn space_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        if self.is_readonly() {
            return projector_core::unhandled(&self.core, "space");
        }
        self.buffer.insert(" ");
        self.edited(model, true)
    }

    fn enter_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        if !self.is_dirty() {
            return projector_core::unhandled(&self.core, "enter");
        }
        self.commit(model);
        true
    }

    fn escape_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        if !self.is_dirty() {
            return projector_core::unhandled(&self.core, "escape");
        }
        self.buffer.set(&self.committed);
        self.edited(model, true)
    }

    fn backspace_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        if self.is_readonly() {
            return false;
        }
        let changed = self.buffer.delete_backward();
        self.edited(model, changed)
    }

    fn delete_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        if self.is_readonly() {
            return false;
        }
        let changed = self.buffer.delete_forward();
        self.edited(model, changed)
    }

    fn arrow_handler(
        &mut self,
        _model: &mut Model,
        dir: Direction,
        _target: Option<VisualHandle>,
    ) -> bool {
        // at the edges the arrow leaves the field
        match dir {
            Direction::Left => self.buffer.move_left(),
            Direction::Right => self.buffer.move_right(),
            Direction::Up | Direction::Down => false,
        }
    }

    fn input(&mut self, model: &mut Model, text: &str) -> bool {
        if self.is_readonly() || text.is_empty() {
            return false;
        }
        self.buffer.insert(text);
        self.edited(model, true)
    }

    fn update(&mut self, model: &mut Model, event: &ModelEvent) -> Result<(), EngineError> {
        if event.is(VALUE_CHANGED) && !self.is_dirty() {
            self.committed = self.core.source.get_value().to_display();
            self.buffer.set(&self.committed);
            self.refresh(model);
        }
        Ok(())
    }

    fn destroy(&mut self, model: &mut Model) {
        self.stop_blink(model);
    }

    fn describe(&self) -> Option<String> {
        let mut state = format!("{:?}", self.buffer.text);
        if self.is_dirty() {
            state.push_str(" dirty");
        }
        if let Some(error) = self.errors.first() {
            state.push_str(&format!(" error: {error}"));
        }
        Some(state)
    }
}

impl Field for TextField {
    fn has_value(&self) -> bool {
        !self.committed.is_empty()
    }

    fn get_value(&self) -> Value {
        if self.buffer.text.is_empty() {
            Value::Null
        } else {
            Value::Text(self.buffer.text.clone())
        }
    }

    fn set_value(&mut self, model: &mut Model, value: Value, commit: bool) -> bool {
        if commit && self.is_readonly() {
            return false;
        }
        self.buffer.set(&value.to_display());
        if commit {
            self.commit(model)
        } else {
            self.refresh(model);
            true
        }
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }
}
