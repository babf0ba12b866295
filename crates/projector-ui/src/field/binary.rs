use projector_core::{
    Component, ComponentCore, ComponentNode, EngineError, Field, Flags, Model, ModelEvent,
    Primitive, PrimitiveKind, SchemaError, VALUE_CHANGED, Value, VisualHandle,
};

use super::{FieldConfig, show_errors};

/// Checkbox over a boolean concept. A concept without a value reads as
/// unchecked.
pub struct BinaryField {
    core: ComponentCore,
    config: FieldConfig,
    checked: bool,
    errors: Vec<String>,
}

pub fn create(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Field>, SchemaError> {
    Ok(Box::new(BinaryField {
        core,
        config: node.config()?,
        checked: false,
        errors: Vec::new(),
    }))
}

impl BinaryField {
    fn show(&self, model: &mut Model) {
        if let Some(element) = self.core.element {
            let target = model.target_mut();
            target.set_attribute(element, "checked", if self.checked { "true" } else { "false" });
            target.set_class(element, "checked", self.checked);
        }
    }

    fn toggle(&mut self, model: &mut Model) -> bool {
        if self.core.flags.contains(Flags::READONLY) {
            return false;
        }
        let next = !self.checked;
        self.set_value(model, Value::Bool(next), true);
        true
    }
}

impl Component for BinaryField {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn init(&mut self, model: &mut Model) -> Result<(), EngineError> {
        self.core.flags.insert(Flags::FOCUSABLE);
        self.core.flags.set(Flags::READONLY, self.config.readonly);
        self.checked = self.core.source.get_value().as_bool().unwrap_or(false);
        let source = self.core.source.id();
        model.listen(self.core.id, self.core.projection, source, &[VALUE_CHANGED])
    }

    fn render(&mut self, model: &mut Model) -> Result<VisualHandle, EngineError> {
        if let Some(element) = self.core.element {
            return Ok(element);
        }
        let mut primitive = Primitive::new(PrimitiveKind::Toggle)
            .class("field")
            .class("binary")
            .attr("checked", if self.checked { "true" } else { "false" });
        if self.checked {
            primitive = primitive.class("checked");
        }
        Ok(model.target_mut().create(primitive))
    }

    fn space_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        self.toggle(model)
    }

    fn enter_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        self.toggle(model)
    }

    fn update(&mut self, model: &mut Model, event: &ModelEvent) -> Result<(), EngineError> {
        if event.is(VALUE_CHANGED) {
            self.checked = self.core.source.get_value().as_bool().unwrap_or(false);
            self.show(model);
        }
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        Some(if self.checked { "checked" } else { "unchecked" }.to_string())
    }
}

impl Field for BinaryField {
    fn has_value(&self) -> bool {
        self.core.source.has_value()
    }

    fn get_value(&self) -> Value {
        Value::Bool(self.checked)
    }

    fn set_value(&mut self, model: &mut Model, value: Value, commit: bool) -> bool {
        let Some(checked) = value.as_bool() else {
            self.errors = vec![format!("`{value}` is not a boolean")];
            show_errors(model, &self.core, &self.errors);
            return false;
        };
        if commit
            && let Err(rejection) = model.commit_value(&self.core.source, Value::Bool(checked))
        {
            self.errors = vec![rejection.message];
            show_errors(model, &self.core, &self.errors);
            return false;
        }
        self.checked = checked;
        self.errors.clear();
        show_errors(model, &self.core, &self.errors);
        self.show(model);
        true
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }
}
