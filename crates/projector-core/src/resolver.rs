//! Content dispatch: turns a schema node plus a binding into live components.

use serde_json::Value as Json;

use crate::registry::Built;
use crate::{
    Args, AttributeNode, Binding, Child, ComponentKind, ComponentNode, ComponentRef, ConceptRef,
    Lifecycle, Model, Primitive, PrimitiveKind, ProjectionId, Result, SchemaError,
    SchemaNode, Severity, TemplateNode, Value, VisualHandle,
};

/// What resolving one schema node produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Component {
        component: ComponentRef,
        element: VisualHandle,
    },
    Projection {
        projection: ProjectionId,
        element: VisualHandle,
    },
    /// Template output, in order.
    Fragment(Vec<Resolution>),
    /// A property read; nothing was materialized.
    Property(Value),
    /// A binding could not be satisfied.
    Placeholder(VisualHandle),
}

impl Resolution {
    /// Components and projections the caller now owns, in order.
    pub fn children(&self) -> Vec<Child> {
        match self {
            Resolution::Component { component, .. } => vec![Child::Component(*component)],
            Resolution::Projection { projection, .. } => vec![Child::Projection(*projection)],
            Resolution::Fragment(parts) => parts.iter().flat_map(Resolution::children).collect(),
            Resolution::Property(_) | Resolution::Placeholder(_) => Vec::new(),
        }
    }

    pub fn component(&self) -> Option<ComponentRef> {
        match self {
            Resolution::Component { component, .. } => Some(*component),
            _ => None,
        }
    }

    pub fn projection(&self) -> Option<ProjectionId> {
        match self {
            Resolution::Projection { projection, .. } => Some(*projection),
            _ => None,
        }
    }

    /// First element already created by the resolution.
    pub fn element(&self) -> Option<VisualHandle> {
        match self {
            Resolution::Component { element, .. }
            | Resolution::Projection { element, .. }
            | Resolution::Placeholder(element) => Some(*element),
            Resolution::Fragment(parts) => parts.iter().find_map(Resolution::element),
            Resolution::Property(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Resolution::Placeholder(_))
    }
}

enum Factory {
    Plain(crate::ComponentFactory),
    Field(crate::FieldFactory),
}

impl Model {
    pub fn resolve(&mut self, node: &SchemaNode, binding: &Binding, args: &Args) -> Result<Resolution> {
        match node {
            SchemaNode::Layout(n) => self.instantiate(ComponentKind::Layout, n, binding, args),
            SchemaNode::Field(n) => self.instantiate(ComponentKind::Field, n, binding, args),
            SchemaNode::Static(n) => self.instantiate(ComponentKind::Static, n, binding, args),
            SchemaNode::Attribute(n) => self.resolve_attribute(n, binding),
            SchemaNode::Template(n) => self.resolve_template(n, binding),
            SchemaNode::Projection(n) => {
                self.instantiate(ComponentKind::Static, &n.as_link(), binding, args)
            }
            SchemaNode::Property(n) => Ok(Resolution::Property(
                binding.concept.property(&n.name).unwrap_or_default(),
            )),
        }
    }

    /// Parses and resolves a raw JSON node.
    pub fn resolve_value(&mut self, json: &Json, binding: &Binding) -> Result<Resolution> {
        let node = SchemaNode::from_value(json)?;
        self.resolve(&node, binding, &Args::new())
    }

    fn instantiate(
        &mut self,
        kind: ComponentKind,
        node: &ComponentNode,
        binding: &Binding,
        args: &Args,
    ) -> Result<Resolution> {
        let node = node.with_args(args);
        let factory = match kind {
            ComponentKind::Layout => self
                .factories
                .layout(&node.kind)
                .map(Factory::Plain)
                .ok_or_else(|| SchemaError::UnknownLayoutKind(node.kind.clone())),
            ComponentKind::Field => self
                .factories
                .field(&node.kind)
                .map(Factory::Field)
                .ok_or_else(|| SchemaError::UnknownFieldKind(node.kind.clone())),
            ComponentKind::Static => self
                .factories
                .static_(&node.kind)
                .map(Factory::Plain)
                .ok_or_else(|| SchemaError::UnknownStaticKind(node.kind.clone())),
        }?;

        let id = self.registry.reserve(kind);
        let core = crate::ComponentCore::new(id, &node, binding);
        let built = match factory {
            Factory::Plain(f) => f(core, &node).map(Built::Plain),
            Factory::Field(f) => f(core, &node).map(Built::Field),
        };
        let mut built = match built {
            Ok(built) => built,
            Err(e) => {
                self.registry.release(id);
                return Err(e.into());
            }
        };

        match self.mount(&mut built, binding) {
            Ok(element) => {
                self.registry.restore(id, built);
                self.registry.bind_handle(element, id);
                self.settle(id);
                log::trace!("{id} ({}) rendered", node.kind);
                Ok(Resolution::Component {
                    component: id,
                    element,
                })
            }
            Err(e) => {
                let c = built.component_mut();
                let children: Vec<Child> = c.core_mut().children.drain(..).collect();
                for child in children {
                    self.discard(child);
                }
                if let Some(element) = c.core().element {
                    self.target.remove(element);
                }
                self.timers.cancel_owned(id);
                self.registry.release(id);
                Err(e)
            }
        }
    }

    fn mount(&mut self, built: &mut Built, binding: &Binding) -> Result<VisualHandle> {
        self.observe(binding.projection, &binding.concept);
        let c = built.component_mut();
        c.init(self)?;
        let element = c.render(self)?;
        let core = c.core_mut();
        core.element = Some(element);
        core.state = Lifecycle::Rendered;
        if let Some(help) = &core.help {
            self.target.set_attribute(element, "title", help);
        }
        Ok(element)
    }

    fn resolve_attribute(&mut self, node: &AttributeNode, binding: &Binding) -> Result<Resolution> {
        let concept = &binding.concept;
        let Some(attribute) = concept.attribute(&node.name) else {
            return Ok(self.binding_error(format!(
                "`{}` has no attribute `{}`",
                concept.name(),
                node.name
            )));
        };
        match attribute.target {
            Some(target) => self.resolve_projection(target, node.tag.as_deref(), binding.parent),
            None if attribute.optional => {
                let label = node.placeholder.clone().unwrap_or_else(|| {
                    format!("{}{}", self.config.placeholder_prefix, node.name)
                });
                let mut activator = ComponentNode::new("activator")
                    .with("attribute", node.name.clone())
                    .with("content", label);
                if let Some(tag) = &node.tag {
                    activator = activator.with("tag", tag.clone());
                }
                self.instantiate(ComponentKind::Static, &activator, binding, &Args::new())
            }
            None => Ok(self.binding_error(format!(
                "required attribute `{}` of `{}` is missing",
                node.name,
                concept.name()
            ))),
        }
    }

    /// Creates and renders a projection of `concept`; a missing schema is a
    /// binding error and yields a placeholder.
    pub fn resolve_projection(
        &mut self,
        concept: ConceptRef,
        tag: Option<&str>,
        parent: Option<ComponentRef>,
    ) -> Result<Resolution> {
        let Some(id) = self.create_projection(concept.clone(), tag, parent) else {
            let message = match tag {
                Some(tag) => format!("no projection of `{}` tagged `{tag}`", concept.name()),
                None => format!("no projection of `{}`", concept.name()),
            };
            return Ok(self.binding_error(message));
        };
        match self.render_projection(id) {
            Ok(element) => Ok(Resolution::Projection {
                projection: id,
                element,
            }),
            Err(e) => {
                self.drop_projection(id);
                Err(e)
            }
        }
    }

    fn resolve_template(&mut self, node: &TemplateNode, binding: &Binding) -> Result<Resolution> {
        let template = self
            .templates
            .get(&node.name)
            .ok_or_else(|| SchemaError::MissingTemplate(node.name.clone()))?;
        let nodes = template.instantiate(&node.param)?;
        let mut parts = Vec::with_capacity(nodes.len());
        for n in &nodes {
            match self.resolve(n, binding, &Args::new()) {
                Ok(part) => parts.push(part),
                Err(e) => {
                    for part in parts {
                        self.release_resolution(&part);
                    }
                    return Err(e);
                }
            }
        }
        Ok(Resolution::Fragment(parts))
    }

    /// Undoes a resolution that will not be attached anywhere.
    pub fn release_resolution(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Component { component, .. } => self.destroy(*component),
            Resolution::Projection { projection, .. } => self.drop_projection(*projection),
            Resolution::Fragment(parts) => {
                for part in parts {
                    self.release_resolution(part);
                }
            }
            Resolution::Placeholder(element) => self.target.remove(*element),
            Resolution::Property(_) => {}
        }
    }

    fn binding_error(&mut self, message: String) -> Resolution {
        log::warn!("{message}");
        self.env.notify(&message, Severity::Warning);
        let element = self
            .target
            .create(Primitive::new(PrimitiveKind::Placeholder).class("binding-error"));
        Resolution::Placeholder(element)
    }

    /// Elements to attach for a resolution, creating text for property reads.
    pub fn materialize(&mut self, resolution: &Resolution) -> Vec<VisualHandle> {
        match resolution {
            Resolution::Component { element, .. }
            | Resolution::Projection { element, .. }
            | Resolution::Placeholder(element) => vec![*element],
            Resolution::Fragment(parts) => {
                let mut elements = Vec::new();
                for part in parts {
                    elements.extend(self.materialize(part));
                }
                elements
            }
            Resolution::Property(value) => {
                vec![self.target.create(
                    Primitive::text_node(value.to_display()).class("property"),
                )]
            }
        }
    }
}
