//! Non-editable components: text, buttons acting on the bound concept,
//! links switching the projection's view, and activators standing in for
//! optional attributes that do not exist yet.

use projector_core::{
    Child, Component, ComponentCore, ComponentNode, EngineError, Flags, Model, Primitive,
    PrimitiveKind, SchemaError, Severity, VisualHandle,
};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Appends a new element to the bound collection.
    Create,
    /// Removes the bound concept from its collection.
    Delete,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub content: Option<String>,
    pub action: Option<Action>,
    /// Link and activator: view tag.
    pub tag: Option<String>,
    /// Activator: attribute to materialize.
    pub attribute: Option<String>,
}

fn report(model: &mut Model, core: &ComponentCore, error: EngineError) {
    log::warn!("{} ({}) failed: {error}", core.id, core.variant);
    model.notify_host(&error.to_string(), Severity::Error);
}

pub struct TextStatic {
    core: ComponentCore,
    config: StaticConfig,
}

pub fn text(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Component>, SchemaError> {
    Ok(Box::new(TextStatic {
        core,
        config: node.config()?,
    }))
}

impl Component for TextStatic {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn render(&mut self, model: &mut Model) -> Result<VisualHandle, EngineError> {
        if let Some(element) = self.core.element {
            return Ok(element);
        }
        let content = self.config.content.clone().unwrap_or_default();
        Ok(model
            .target_mut()
            .create(Primitive::text_node(content).class("static").class("text")))
    }
}

pub struct Button {
    core: ComponentCore,
    config: StaticConfig,
}

pub fn button(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Component>, SchemaError> {
    Ok(Box::new(Button {
        core,
        config: node.config()?,
    }))
}

impl Button {
    fn press(&mut self, model: &mut Model) -> bool {
        let source = self.core.source.clone();
        match self.config.action {
            Some(Action::Create) => model.mutate(source.create_element()).is_some(),
            // our own item goes away with the element; the model defers that
            Some(Action::Delete) => model.mutate(source.delete()).is_some(),
            None => projector_core::unhandled(&self.core, "press"),
        }
    }
}

impl Component for Button {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn init(&mut self, _model: &mut Model) -> Result<(), EngineError> {
        self.core.flags.insert(Flags::FOCUSABLE);
        Ok(())
    }

    fn render(&mut self, model: &mut Model) -> Result<VisualHandle, EngineError> {
        if let Some(element) = self.core.element {
            return Ok(element);
        }
        let content = match (&self.config.content, self.config.action) {
            (Some(content), _) => content.clone(),
            (None, Some(Action::Create)) => "add".to_string(),
            (None, Some(Action::Delete)) => "remove".to_string(),
            (None, None) => String::new(),
        };
        Ok(model.target_mut().create(
            Primitive::new(PrimitiveKind::Button)
                .class("static")
                .class("button")
                .text(content),
        ))
    }

    fn space_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        self.press(model)
    }

    fn enter_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        self.press(model)
    }
}

pub struct Link {
    core: ComponentCore,
    tag: String,
    content: String,
}

pub fn link(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Component>, SchemaError> {
    let config: StaticConfig = node.config()?;
    let tag = config.tag.unwrap_or_default();
    let content = config.content.unwrap_or_else(|| tag.clone());
    Ok(Box::new(Link { core, tag, content }))
}

impl Link {
    fn follow(&mut self, model: &mut Model) -> bool {
        // tears down the view holding this link; the model destroys us
        // once we return
        match model.change_view_by_tag(self.core.projection, &self.tag) {
            Ok(changed) => changed,
            Err(e) => {
                report(model, &self.core, e);
                false
            }
        }
    }
}

impl Component for Link {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn init(&mut self, _model: &mut Model) -> Result<(), EngineError> {
        self.core.flags.insert(Flags::FOCUSABLE);
        Ok(())
    }

    fn render(&mut self, model: &mut Model) -> Result<VisualHandle, EngineError> {
        if let Some(element) = self.core.element {
            return Ok(element);
        }
        Ok(model.target_mut().create(
            Primitive::new(PrimitiveKind::Link)
                .class("static")
                .class("link")
                .text(self.content.clone())
                .attr("data-tag", self.tag.clone()),
        ))
    }

    fn space_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        self.follow(model)
    }

    fn enter_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        self.follow(model)
    }
}

/// Placeholder for an optional attribute. Activating it creates the
/// attribute, projects it and puts the projection where the activator was.
pub struct Activator {
    core: ComponentCore,
    attribute: String,
    tag: Option<String>,
    content: String,
}

pub fn activator(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Component>, SchemaError> {
    let config: StaticConfig = node.config()?;
    let attribute = config.attribute.unwrap_or_default();
    let content = config.content.unwrap_or_else(|| attribute.clone());
    Ok(Box::new(Activator {
        core,
        attribute,
        tag: config.tag,
        content,
    }))
}

impl Activator {
    fn activate(&mut self, model: &mut Model) -> bool {
        let created = self.core.source.create_attribute(&self.attribute);
        let Some(concept) = model.mutate(created) else {
            return false;
        };
        let resolution =
            match model.resolve_projection(concept, self.tag.as_deref(), self.core.parent) {
                Ok(resolution) => resolution,
                Err(e) => {
                    report(model, &self.core, e);
                    return false;
                }
            };

        let elements = model.materialize(&resolution);
        if let Some(old) = self.core.element.take() {
            let target = model.target_mut();
            if let (Some(parent), Some(at)) = (target.parent(old), target.position(old)) {
                for (offset, element) in elements.iter().enumerate() {
                    target.insert(parent, at + offset, *element);
                }
            }
            target.remove(old);
        }

        let adopted = resolution.children();
        let me = Child::Component(self.core.id);
        if !model.replace_child(self.core.parent, self.core.projection, me, adopted.clone()) {
            log::debug!("{} had no owner slot to hand over", self.core.id);
        }
        model.destroy(self.core.id);
        if let Some(first) = model.first_focusable(&adopted) {
            model.focus(first, None);
        }
        true
    }
}

impl Component for Activator {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn init(&mut self, _model: &mut Model) -> Result<(), EngineError> {
        self.core.flags.insert(Flags::FOCUSABLE);
        Ok(())
    }

    fn render(&mut self, model: &mut Model) -> Result<VisualHandle, EngineError> {
        if let Some(element) = self.core.element {
            return Ok(element);
        }
        Ok(model.target_mut().create(
            Primitive::new(PrimitiveKind::Button)
                .class("static")
                .class("activator")
                .text(self.content.clone())
                .attr("data-attribute", self.attribute.clone()),
        ))
    }

    fn space_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        self.activate(model)
    }

    fn enter_handler(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> bool {
        self.activate(model)
    }

    fn describe(&self) -> Option<String> {
        Some(format!("for `{}`", self.attribute))
    }
}
