//! Choice among the candidates a concept offers. Closed, it shows the
//! selected label; open, it shows the candidate menu with a highlight that
//! up and down move.

use projector_core::{
    Candidate, Component, ComponentCore, ComponentNode, Direction, EngineError, Field, Flags,
    Model, ModelEvent, Primitive, RenderTarget, SchemaError, VALUE_CHANGED, Value, VisualHandle,
};

use super::{FieldConfig, show_errors};

pub struct ChoiceField {
    core: ComponentCore,
    config: FieldConfig,
    candidates: Vec<Candidate>,
    selected: Option<usize>,
    /// Highlighted candidate while the menu is open.
    open: Option<usize>,
    label: Option<VisualHandle>,
    menu: Option<VisualHandle>,
    options: Vec<VisualHandle>,
    errors: Vec<String>,
}

pub fn create(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Field>, SchemaError> {
    Ok(Box::new(ChoiceField {
        core,
        config: node.config()?,
        candidates: Vec::new(),
        selected: None,
        open: None,
        label: None,
        menu: None,
        options: Vec::new(),
        errors: Vec::new(),
    }))
}

impl ChoiceField {
    fn find(&self, value: &Value) -> Option<usize> {
        self.candidates.iter().position(|c| c.value == *value)
    }

    fn label_text(&self) -> String {
        match self.selected {
            Some(i) => self.candidates[i].label.clone(),
            None => self.config.placeholder.clone().unwrap_or_default(),
        }
    }

    fn show(&self, model: &mut Model) {
        let label = self.label_text();
        let target = model.target_mut();
        if let Some(handle) = self.label {
            target.set_text(handle, &label);
            target.set_class(handle, "empty", self.selected.is_none());
        }
        if let Some(menu) = self.menu {
            target.set_class(menu, "hidden", self.open.is_none());
        }
        if let Some(element) = self.core.element {
            target.set_class(element, "open", self.open.is_some());
        }
        for (i, option) in self.options.iter().enumerate() {
            target.set_class(*option, "selected", self.selected == Some(i));
            target.set_class(*option, "highlighted", self.open == Some(i));
        }
    }

    /// Refetches the candidates, rebuilding the menu when they changed.
    fn refresh_candidates(&mut self, model: &mut Model) {
        let candidates = self.core.source.get_candidates();
        if candidates == self.candidates {
            return;
        }
        self.candidates = candidates;
        if let Some(menu) = self.menu {
            let target = model.target_mut();
            for option in self.options.drain(..) {
                target.remove(option);
            }
            self.options = self
                .candidates
                .iter()
                .map(|candidate| option_for(target, menu, candidate))
                .collect();
        }
        self.selected = self.find(&self.core.source.get_value());
        self.open = match self.candidates.len() {
            0 => None,
            len => self.open.map(|i| i.min(len - 1)),
        };
    }

    fn open_menu(&mut self, model: &mut Model) -> bool {
        self.refresh_candidates(model);
        if self.candidates.is_empty() || self.core.flags.contains(Flags::READONLY) {
            return false;
        }
        self.open = Some(self.selected.unwrap_or(0));
        self.show(model);
        true
    }

    fn close_menu(&mut self, model: &mut Model) {
        if self.open.take().is_some() {
            self.show(model);
        }
    }
}

fn option_for(target: &mut dyn RenderTarget, menu: VisualHandle, candidate: &Candidate) -> VisualHandle {
    let option = target.create(
        Primitive::text_node(candidate.label.clone())
            .class("option")
            .attr("data-candidate", candidate.id.clone()),
    );
    target.append(menu, option);
    option
}

impl Component for ChoiceField {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn init(&mut self, model: &mut Model) -> Result<(), EngineError> {
        self.core.flags.insert(Flags::FOCUSABLE);
        self.core.flags.set(Flags::READONLY, self.config.readonly);
        self.candidates = self.core.source.get_candidates();
        self.selected = self.find(&self.core.source.get_value());
        let source = self.core.source.id();
        model.listen(self.core.id, self.core.projection, source, &[VALUE_CHANGED])
    }

    fn render(&mut self, model: &mut Model) -> Result<VisualHandle, EngineError> {
        if let Some(element) = self.core.element {
            return Ok(element);
        }
        let target = model.target_mut();
        let element = target.create(Primitive::container().class("field").class("choice"));
        let label = target.create(Primitive::text_node(self.label_text()).class("label"));
        target.append(element, label);
        let menu = target.create(Primitive::container().class("options").class("hidden"));
        target.append(element, menu);
        self.options = self
            .candidates
            .iter()
            .map(|candidate| option_for(target, menu, candidate))
            .collect();
        self.label = Some(label);
        self.menu = Some(menu);
        // element is not yet stored on the core; decorate directly
        if let Some(i) = self.selected {
            target.set_class(self.options[i], "selected", true);
        }
        if self.selected.is_none() {
            target.set_class(label, "empty", true);
        }
        Ok(element)
    }

    fn focus_out(&mut self, model: &mut Model) {
        self.close_menu(model);
    }

    fn space_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        if self.open.is_some() {
            self.close_menu(model);
            return true;
        }
        self.open_menu(model)
    }

    fn enter_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        let Some(highlighted) = self.open else {
            return self.open_menu(model);
        };
        let value = self.candidates[highlighted].value.clone();
        self.open = None;
        self.set_value(model, value, true);
        true
    }

    fn escape_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        if self.open.is_none() {
            return projector_core::unhandled(&self.core, "escape");
        }
        self.close_menu(model);
        true
    }

    fn arrow_handler(
        &mut self,
        model: &mut Model,
        dir: Direction,
        _target: Option<VisualHandle>,
    ) -> bool {
        let Some(highlighted) = self.open else {
            return false;
        };
        let next = match dir {
            Direction::Up => highlighted.saturating_sub(1),
            Direction::Down => (highlighted + 1).min(self.candidates.len() - 1),
            // sideways leaves the open menu as it is
            Direction::Left | Direction::Right => return false,
        };
        self.open = Some(next);
        self.show(model);
        true
    }

    fn update(&mut self, model: &mut Model, event: &ModelEvent) -> Result<(), EngineError> {
        if event.is(VALUE_CHANGED) {
            self.refresh_candidates(model);
            self.selected = self.find(&self.core.source.get_value());
            self.show(model);
        }
        Ok(())
    }

    fn describe(&self) -> Option<String> {
        let mut state = self.label_text();
        if self.open.is_some() {
            state.push_str(" open");
        }
        Some(state)
    }
}

impl Field for ChoiceField {
    fn has_value(&self) -> bool {
        self.selected.is_some()
    }

    fn get_value(&self) -> Value {
        self.selected
            .map(|i| self.candidates[i].value.clone())
            .unwrap_or_default()
    }

    fn set_value(&mut self, model: &mut Model, value: Value, commit: bool) -> bool {
        let Some(index) = self.find(&value) else {
            self.errors = vec![format!("`{value}` is not one of the choices")];
            show_errors(model, &self.core, &self.errors);
            return false;
        };
        if commit && let Err(rejection) = model.commit_value(&self.core.source, value) {
            self.errors = vec![rejection.message];
            show_errors(model, &self.core, &self.errors);
            self.show(model);
            return false;
        }
        self.selected = Some(index);
        self.errors.clear();
        show_errors(model, &self.core, &self.errors);
        self.show(model);
        true
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }
}
