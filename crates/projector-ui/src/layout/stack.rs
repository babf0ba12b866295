//! Stack: items in one line along the orientation axis. Arrows are answered
//! geometrically, so a horizontal stack inside a vertical one navigates the
//! way it looks.

use projector_core::{Component, ComponentCore, ComponentNode, Direction, Model, SchemaError, VisualHandle};

use super::{Arrangement, Layout};

pub fn create(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Component>, SchemaError> {
    Layout::build(core, node, Arrangement::Stack)
}

pub(crate) fn navigate(
    model: &mut Model,
    container: VisualHandle,
    origin: VisualHandle,
    dir: Direction,
) -> bool {
    model.focus_nearest(container, Some(origin), dir)
}
