use projector_core::{
    Component, ComponentCore, ComponentNode, Direction, Model, SchemaError, Step, VisualHandle,
};

use super::{Arrangement, Layout, LayoutConfig, focus_in_order};

pub fn create(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Component>, SchemaError> {
    Layout::build(core, node, Arrangement::Flex)
}

/// A wrapping flex walks its main axis in item order; everything else is
/// geometric.
pub(crate) fn navigate(
    model: &mut Model,
    container: VisualHandle,
    origin: VisualHandle,
    dir: Direction,
    config: &LayoutConfig,
) -> bool {
    if config.wrap
        && let Some(step) = config.orientation.step(dir)
    {
        return focus_in_order(model, container, origin, step == Step::Forward);
    }
    model.focus_nearest(container, Some(origin), dir)
}
