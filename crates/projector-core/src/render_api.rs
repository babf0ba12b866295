//! Boundary to the rendering target. How a host draws a container, a toggle
//! or a run of text is its own business; the engine only creates primitives,
//! arranges them and queries their geometry through these traits.

use slotmap::new_key_type;

use crate::{Direction, Rect, focus};

new_key_type! {
    /// Opaque reference to a rendered element, owned by its component.
    pub struct VisualHandle;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Container,
    Text,
    Input,
    Toggle,
    Button,
    Link,
    Placeholder,
}

/// Description of an element to create.
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub attributes: Vec<(String, String)>,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            classes: Vec::new(),
            text: None,
            attributes: Vec::new(),
        }
    }

    pub fn container() -> Self {
        Self::new(PrimitiveKind::Container)
    }

    pub fn text_node(text: impl Into<String>) -> Self {
        Self::new(PrimitiveKind::Text).text(text)
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }
}

/// Geometry queries used by directional focus navigation.
pub trait SpatialIndex {
    fn parent(&self, handle: VisualHandle) -> Option<VisualHandle>;
    fn children(&self, handle: VisualHandle) -> Vec<VisualHandle>;
    fn bounds(&self, handle: VisualHandle) -> Option<Rect>;
    /// False when the element or an ancestor is hidden or collapsed.
    fn is_visible(&self, handle: VisualHandle) -> bool;

    fn nearest_in_direction(
        &self,
        container: VisualHandle,
        origin: VisualHandle,
        dir: Direction,
    ) -> Option<VisualHandle> {
        focus::rank_in_direction(self, container, origin, dir)
            .into_iter()
            .next()
    }
}

pub trait RenderTarget: SpatialIndex {
    fn create(&mut self, primitive: Primitive) -> VisualHandle;
    fn append(&mut self, parent: VisualHandle, child: VisualHandle);
    /// Inserts at `index` among the parent's children, appending when out of range.
    fn insert(&mut self, parent: VisualHandle, index: usize, child: VisualHandle);
    /// Destroys the element and its subtree. Unknown handles are ignored.
    fn remove(&mut self, handle: VisualHandle);
    /// Puts `new` where `old` is and destroys `old`.
    fn replace(&mut self, old: VisualHandle, new: VisualHandle);
    /// Exchanges the positions of two siblings.
    fn swap(&mut self, a: VisualHandle, b: VisualHandle);
    fn position(&self, handle: VisualHandle) -> Option<usize>;

    fn set_text(&mut self, handle: VisualHandle, text: &str);
    fn text(&self, handle: VisualHandle) -> Option<String>;
    fn set_attribute(&mut self, handle: VisualHandle, name: &str, value: &str);
    fn attribute(&self, handle: VisualHandle, name: &str) -> Option<String>;
    fn set_class(&mut self, handle: VisualHandle, class: &str, on: bool);
    fn has_class(&self, handle: VisualHandle, class: &str) -> bool;
    /// Current description of an element, reflecting later edits.
    fn primitive(&self, handle: VisualHandle) -> Option<Primitive>;

    /// Moves the host's input focus to the element.
    fn focus(&mut self, handle: VisualHandle);
}
