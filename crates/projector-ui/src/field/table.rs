//! Table field: a collection rendered as rows under a header, one cell per
//! configured column. Up and down follow row order; left and right move
//! between the cells of a row.

use projector_core::{ComponentCore, ComponentNode, Field, Model, Primitive, SchemaError, VisualHandle};

use super::FieldConfig;
use super::list::{CollectionField, Presentation};
use super::reconcile::ItemShape;

pub fn create(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Field>, SchemaError> {
    let config: FieldConfig = node.config()?;
    for column in &config.columns {
        // fail at construction, not when the first row shows up
        projector_core::SchemaNode::from_value(&column.content)?;
    }
    let shape = ItemShape::Row {
        columns: config.columns.clone(),
    };
    Ok(Box::new(CollectionField::new(core, config, Presentation::Table, shape)))
}

/// Creates the table frame: header row and the body the rows go into.
pub(crate) fn render_frame(field: &mut CollectionField, model: &mut Model) -> VisualHandle {
    let target = model.target_mut();
    let element = target.create(Primitive::container().class("field").class("table"));
    let header = target.create(
        Primitive::container()
            .class("header")
            .class("row")
            .class("horizontal"),
    );
    for column in &field.config.columns {
        let cell = target.create(Primitive::text_node(column.header.clone()).class("heading"));
        target.append(header, cell);
    }
    target.append(element, header);
    let body = target.create(Primitive::container().class("rows").class("vertical"));
    target.append(element, body);
    field.items.attach(body);
    element
}
