#![allow(dead_code)]

use std::rc::Rc;

use projector_core::{
    Child, ComponentRef, ConceptRef, FieldId, Model, ProjectionId, ProjectionSchema, Resolution,
    VisualHandle,
};
use projector_devtools::{FocusLog, HeadlessTarget, MemoryConcept, Notices, RecordingEnvironment};
use serde_json::Value as Json;

pub struct Harness {
    pub model: Model,
    pub notices: Notices,
    pub focus_log: FocusLog,
}

impl Harness {
    pub fn new() -> Self {
        let target = HeadlessTarget::new();
        let focus_log = target.focus_log();
        let env = RecordingEnvironment::new();
        let notices = env.notices();
        let mut model = Model::new(Box::new(target), Box::new(env));
        projector_ui::install(&mut model);
        Self {
            model,
            notices,
            focus_log,
        }
    }

    pub fn view(&mut self, concept: &str, content: Json) {
        self.model
            .register_projection(concept, ProjectionSchema::new(content));
    }

    pub fn tagged_view(&mut self, concept: &str, tag: &str, content: Json) {
        self.model
            .register_projection(concept, ProjectionSchema::new(content).tagged(tag));
    }

    /// Projects `concept` as a root and returns the projection with its
    /// container element.
    pub fn project(&mut self, concept: &Rc<MemoryConcept>) -> (ProjectionId, VisualHandle) {
        let concept: ConceptRef = concept.clone();
        match self.model.project(concept, None).unwrap() {
            Resolution::Projection {
                projection,
                element,
            } => (projection, element),
            other => panic!("expected a projection, got {other:?}"),
        }
    }

    /// Every live component under `projection`, depth first, nested
    /// projections included.
    pub fn components(&self, projection: ProjectionId) -> Vec<ComponentRef> {
        let mut out = Vec::new();
        if let Some(p) = self.model.projection(projection) {
            for root in &p.roots {
                self.collect(*root, &mut out);
            }
        }
        out
    }

    fn collect(&self, child: Child, out: &mut Vec<ComponentRef>) {
        for r in self.model.child_components(child) {
            out.push(r);
            if let Some(c) = self.model.component(r) {
                for grandchild in &c.core().children {
                    self.collect(*grandchild, out);
                }
            }
        }
    }

    /// Components of `variant` under `projection`, in document order.
    pub fn all(&self, projection: ProjectionId, variant: &str) -> Vec<ComponentRef> {
        self.components(projection)
            .into_iter()
            .filter(|r| {
                self.model
                    .component(*r)
                    .is_some_and(|c| c.core().variant == variant)
            })
            .collect()
    }

    pub fn find(&self, projection: ProjectionId, variant: &str) -> ComponentRef {
        self.all(projection, variant)
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("no `{variant}` component"))
    }

    pub fn field(&self, projection: ProjectionId, variant: &str) -> FieldId {
        self.find(projection, variant).as_field().unwrap()
    }

    pub fn element(&self, r: ComponentRef) -> VisualHandle {
        self.model.component(r).unwrap().core().element.unwrap()
    }

    pub fn dump(&self, handle: VisualHandle) -> String {
        projector_devtools::dump(self.model.target(), handle)
    }

    pub fn text(&self, handle: VisualHandle) -> String {
        projector_devtools::text_content(self.model.target(), handle)
    }

    pub fn has_class(&self, handle: VisualHandle, class: &str) -> bool {
        self.model.target().has_class(handle, class)
    }

    pub fn attribute(&self, handle: VisualHandle, name: &str) -> Option<String> {
        self.model.target().attribute(handle, name)
    }

    pub fn children(&self, handle: VisualHandle) -> Vec<VisualHandle> {
        self.model.target().children(handle)
    }
}

pub fn item(id: &str) -> Rc<MemoryConcept> {
    MemoryConcept::builder(id, "item").property("label", id).build()
}

/// A collection of `item` concepts labelled by their ids.
pub fn items(id: &str, ids: &[&str]) -> Rc<MemoryConcept> {
    ids.iter()
        .fold(MemoryConcept::builder(id, "list").collection_of("item"), |b, e| {
            b.element(item(e))
        })
        .build()
}
