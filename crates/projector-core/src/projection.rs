use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::{Child, ComponentRef, ConceptId, ConceptRef, EventChannel, ProjectionId, VisualHandle};

/// One view of a concept: its content node and the tags it answers to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSchema {
    #[serde(default)]
    pub tags: Vec<String>,
    pub content: Json,
}

impl ProjectionSchema {
    pub fn new(content: Json) -> Self {
        Self {
            tags: Vec::new(),
            content,
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The live tree for the active view of one concept, plus its event channel.
pub struct Projection {
    pub id: ProjectionId,
    pub concept: ConceptRef,
    pub views: Vec<ProjectionSchema>,
    pub index: usize,
    pub channel: EventChannel,
    pub roots: Vec<Child>,
    pub element: Option<VisualHandle>,
    /// Component the projection is nested in; `None` for a root projection.
    pub parent: Option<ComponentRef>,
    pub(crate) observed: Vec<ConceptRef>,
    pub(crate) displayed: bool,
}

impl Projection {
    pub(crate) fn new(
        id: ProjectionId,
        concept: ConceptRef,
        views: Vec<ProjectionSchema>,
        parent: Option<ComponentRef>,
    ) -> Self {
        Self {
            id,
            concept,
            views,
            index: 0,
            channel: EventChannel::default(),
            roots: Vec::new(),
            element: None,
            parent,
            observed: Vec::new(),
            displayed: false,
        }
    }

    pub fn active(&self) -> Option<&ProjectionSchema> {
        self.views.get(self.index)
    }

    pub fn view_with_tag(&self, tag: &str) -> Option<usize> {
        self.views.iter().position(|v| v.has_tag(tag))
    }

    pub fn is_observing(&self, id: &ConceptId) -> bool {
        self.observed.iter().any(|c| &c.id() == id)
    }

    pub fn snapshot(&self) -> SchemaSnapshot {
        SchemaSnapshot {
            concept: self.concept.id(),
            name: self.concept.name().to_string(),
            active: self.index,
            views: self.views.clone(),
        }
    }
}

/// Serializable record of a live projection, for the host to persist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub concept: ConceptId,
    pub name: String,
    pub active: usize,
    pub views: Vec<ProjectionSchema>,
}
