//! Spatial composition. Every layout arranges the items of its disposition
//! inside one container element and answers arrow keys among them; the four
//! kinds differ in how they arrange and how they navigate.

pub mod flex;
pub mod stack;
pub mod table;
pub mod wrap;

use projector_core::{
    Args, Component, ComponentCore, ComponentNode, Direction, Disposition, DispositionItem,
    EngineError, Flags, Focus, Model, Orientation, Primitive, SchemaError, VisualHandle,
    direct_child,
};
use serde::Deserialize;
use serde_json::Value as Json;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub orientation: Orientation,
    pub focusable: bool,
    pub collapsible: bool,
    pub collapsed: bool,
    /// Flex only: items flow onto further lines.
    pub wrap: bool,
    /// Table only: rows of disposition items.
    pub rows: Vec<Vec<Json>>,
    #[serde(flatten)]
    pub disposition: Disposition,
}

/// How a layout arranges its items and moves focus between them.
#[derive(Clone, Debug)]
pub enum Arrangement {
    Stack,
    Wrap,
    Flex,
    /// Row containers, each holding one cell container per item.
    Table { rows: Vec<VisualHandle> },
}

pub struct Layout {
    core: ComponentCore,
    config: LayoutConfig,
    arrangement: Arrangement,
}

impl Layout {
    pub(crate) fn build(
        core: ComponentCore,
        node: &ComponentNode,
        arrangement: Arrangement,
    ) -> Result<Box<dyn Component>, SchemaError> {
        let config: LayoutConfig = node.config()?;
        // surface bad references before anything renders
        config.disposition.items()?;
        for row in &config.rows {
            for item in row {
                config.disposition.item(item)?;
            }
        }
        Ok(Box::new(Layout {
            core,
            config,
            arrangement,
        }))
    }

    fn kind_class(&self) -> &'static str {
        match self.arrangement {
            Arrangement::Stack => "stack",
            Arrangement::Wrap => "wrap",
            Arrangement::Flex => "flex",
            Arrangement::Table { .. } => "table",
        }
    }

    fn is_collapsed(&self) -> bool {
        self.core.flags.contains(Flags::COLLAPSED)
    }

    fn set_collapsed(&mut self, model: &mut Model, collapsed: bool) {
        self.core.flags.set(Flags::COLLAPSED, collapsed);
        if let Some(element) = self.core.element {
            model.target_mut().set_class(element, "collapsed", collapsed);
        }
    }
}

/// Resolves disposition items into `container`, recording owned children.
pub(crate) fn render_items(
    model: &mut Model,
    core: &mut ComponentCore,
    container: VisualHandle,
    items: &[DispositionItem],
) -> Result<(), EngineError> {
    let binding = core.child_binding();
    for item in items {
        match item {
            DispositionItem::Node(node) => {
                let resolution = model.resolve(node, &binding, &Args::new())?;
                for element in model.materialize(&resolution) {
                    model.target_mut().append(container, element);
                }
                core.children.extend(resolution.children());
            }
            DispositionItem::Text(text) => {
                let label = model
                    .target_mut()
                    .create(Primitive::text_node(text.clone()).class("label"));
                model.target_mut().append(container, label);
            }
        }
    }
    Ok(())
}

/// Focuses the first focusable sibling after (or before) `origin` in
/// document order.
pub(crate) fn focus_in_order(
    model: &mut Model,
    container: VisualHandle,
    origin: VisualHandle,
    forward: bool,
) -> bool {
    let siblings = model.target().children(container);
    let Some(from) = direct_child(model.target(), container, origin)
        .and_then(|child| siblings.iter().position(|s| *s == child))
    else {
        return false;
    };
    let candidates: Vec<VisualHandle> = if forward {
        siblings[from + 1..].to_vec()
    } else {
        siblings[..from].iter().rev().copied().collect()
    };
    candidates
        .into_iter()
        .any(|candidate| model.focus_element(candidate))
}

impl Component for Layout {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn init(&mut self, _model: &mut Model) -> Result<(), EngineError> {
        let flags = &mut self.core.flags;
        flags.set(Flags::FOCUSABLE, self.config.focusable || self.config.collapsible);
        flags.set(Flags::COLLAPSIBLE, self.config.collapsible);
        flags.set(Flags::COLLAPSED, self.config.collapsible && self.config.collapsed);
        Ok(())
    }

    fn render(&mut self, model: &mut Model) -> Result<VisualHandle, EngineError> {
        if let Some(element) = self.core.element {
            return Ok(element);
        }
        let mut primitive = Primitive::container()
            .class("layout")
            .class(self.kind_class())
            .class(self.config.orientation.class());
        if self.is_collapsed() {
            primitive = primitive.class("collapsed");
        }
        let element = model.target_mut().create(primitive);
        let result = match self.arrangement {
            Arrangement::Table { .. } => table::render_rows(self, model, element),
            _ => {
                let items = self.config.disposition.items()?;
                render_items(model, &mut self.core, element, &items)
            }
        };
        if let Err(e) = result {
            model.target_mut().remove(element);
            return Err(e);
        }
        Ok(element)
    }

    fn focus(&mut self, model: &mut Model, _target: Option<VisualHandle>) -> Focus {
        if self.core.is_focusable() {
            return Focus::Accept;
        }
        if self.is_collapsed() {
            return Focus::Reject;
        }
        model
            .first_focusable(&self.core.children)
            .map_or(Focus::Reject, Focus::Delegate)
    }

    fn space_handler(&mut self, model: &mut Model, target: Option<VisualHandle>) -> bool {
        if !self.core.flags.contains(Flags::COLLAPSIBLE) {
            return projector_core::unhandled(&self.core, "space");
        }
        let collapsed = !self.is_collapsed();
        self.set_collapsed(model, collapsed);
        // focus must not stay on something that just disappeared
        if collapsed && !self.core.is_self_target(target) {
            model.claim_focus(self);
        }
        true
    }

    fn enter_handler(&mut self, model: &mut Model, target: Option<VisualHandle>) -> bool {
        if !self.core.is_self_target(target) || self.is_collapsed() {
            return projector_core::unhandled(&self.core, "enter");
        }
        match model.first_focusable(&self.core.children) {
            Some(first) => model.focus(first, None),
            None => false,
        }
    }

    fn arrow_handler(
        &mut self,
        model: &mut Model,
        dir: Direction,
        target: Option<VisualHandle>,
    ) -> bool {
        let (Some(element), Some(origin)) = (self.core.element, target) else {
            return false;
        };
        if origin == element || self.is_collapsed() {
            return false;
        }
        match &self.arrangement {
            Arrangement::Stack => stack::navigate(model, element, origin, dir),
            Arrangement::Wrap => wrap::navigate(model, element, origin, dir),
            Arrangement::Flex => flex::navigate(model, element, origin, dir, &self.config),
            Arrangement::Table { rows } => table::navigate(model, rows, origin, dir),
        }
    }

    fn describe(&self) -> Option<String> {
        self.is_collapsed().then(|| "collapsed".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layout_config_defaults() {
        let node = ComponentNode::new("stack");
        let config: LayoutConfig = node.config().unwrap();
        assert_eq!(config.orientation, Orientation::Vertical);
        assert!(!config.focusable && !config.collapsible && !config.wrap);
        assert!(config.disposition.items().unwrap().is_empty());
    }

    #[test]
    fn test_layout_config_reads_disposition_and_rows() {
        let node = ComponentNode::new("table")
            .with("orientation", "horizontal")
            .with("disposition", json!(["Title", "#[a]"]))
            .with("elements", json!({ "a": { "type": "property", "name": "label" } }))
            .with("rows", json!([["#[a]"], []]));
        let config: LayoutConfig = node.config().unwrap();

        assert_eq!(config.orientation, Orientation::Horizontal);
        assert_eq!(config.rows.len(), 2);
        let items = config.disposition.items().unwrap();
        assert!(matches!(&items[0], DispositionItem::Text(t) if t == "Title"));
        assert!(matches!(items[1], DispositionItem::Node(_)));
    }

    #[test]
    fn test_unknown_row_reference_is_a_schema_error() {
        let node = ComponentNode::new("table").with("rows", json!([["#[missing]"]]));
        let config: LayoutConfig = node.config().unwrap();
        let err = config.disposition.item(&config.rows[0][0]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownElement(k) if k == "missing"));
    }
}
