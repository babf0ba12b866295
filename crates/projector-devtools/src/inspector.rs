use std::fmt::Write;

use projector_core::{Child, ComponentRef, Model, ProjectionId};

/// Text and JSON views of the live component tree.
#[derive(Default)]
pub struct Inspector {
    /// Include lifecycle states in dumps.
    pub show_state: bool,
}

impl Inspector {
    pub fn new() -> Self {
        Self { show_state: true }
    }

    /// Indented dump of a projection: one line per component, nested
    /// projections inline.
    pub fn dump(&self, model: &Model, projection: ProjectionId) -> String {
        let mut out = String::new();
        self.projection(model, projection, 0, &mut out);
        out
    }

    pub fn outline_json(&self, model: &Model, projection: ProjectionId) -> serde_json::Value {
        serde_json::to_value(model.projection_outline(projection)).unwrap_or_default()
    }

    fn projection(&self, model: &Model, id: ProjectionId, depth: usize, out: &mut String) {
        let Some(p) = model.projection(id) else {
            return;
        };
        let _ = writeln!(
            out,
            "{}projection {} ({}) view {}",
            "  ".repeat(depth),
            p.concept.name(),
            p.concept.id(),
            p.index
        );
        for root in &p.roots {
            self.child(model, *root, depth + 1, out);
        }
    }

    fn child(&self, model: &Model, child: Child, depth: usize, out: &mut String) {
        match child {
            Child::Component(r) => self.component(model, r, depth, out),
            Child::Projection(id) => self.projection(model, id, depth, out),
        }
    }

    fn component(&self, model: &Model, r: ComponentRef, depth: usize, out: &mut String) {
        let Some(c) = model.component(r) else {
            let _ = writeln!(out, "{}{r} <gone>", "  ".repeat(depth));
            return;
        };
        let core = c.core();
        let mut line = format!("{}{} {}", "  ".repeat(depth), r.kind().name(), core.variant);
        if self.show_state {
            let _ = write!(line, " [{}]", format!("{:?}", core.state).to_lowercase());
        }
        if let Some(value) = r.as_field().and_then(|id| model.value(id)) {
            let _ = write!(line, " = {value:?}");
        }
        if let Some(state) = c.describe() {
            let _ = write!(line, " ({state})");
        }
        let _ = writeln!(out, "{line}");
        for child in &core.children {
            self.child(model, *child, depth + 1, out);
        }
    }
}
