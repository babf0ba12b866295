//! Wrap: items flow in reading order and break onto new lines. Left and right
//! walk the reading order, so moving past the end of a line lands on the
//! start of the next; up and down stay geometric.

use projector_core::{Component, ComponentCore, ComponentNode, Direction, Model, SchemaError, VisualHandle};

use super::{Arrangement, Layout, focus_in_order};

pub fn create(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Component>, SchemaError> {
    Layout::build(core, node, Arrangement::Wrap)
}

pub(crate) fn navigate(
    model: &mut Model,
    container: VisualHandle,
    origin: VisualHandle,
    dir: Direction,
) -> bool {
    match dir {
        Direction::Left => focus_in_order(model, container, origin, false),
        Direction::Right => focus_in_order(model, container, origin, true),
        Direction::Up | Direction::Down => model.focus_nearest(container, Some(origin), dir),
    }
}
