//! Table: a grid of cells given as `rows`, each a list of disposition items.
//! Without `rows` every disposition item gets a row of its own. Arrows move
//! by cell; moving vertically keeps the column and skips cells with nothing
//! to focus.

use projector_core::{
    Component, ComponentCore, ComponentNode, Direction, EngineError, Model, Primitive,
    SchemaError, VisualHandle, direct_child, is_within,
};

use super::{Arrangement, Layout, render_items};

pub fn create(core: ComponentCore, node: &ComponentNode) -> Result<Box<dyn Component>, SchemaError> {
    Layout::build(core, node, Arrangement::Table { rows: Vec::new() })
}

pub(crate) fn render_rows(
    layout: &mut Layout,
    model: &mut Model,
    container: VisualHandle,
) -> Result<(), EngineError> {
    let disposition = &layout.config.disposition;
    let grid = if layout.config.rows.is_empty() {
        disposition.items()?.into_iter().map(|item| vec![item]).collect()
    } else {
        layout
            .config
            .rows
            .iter()
            .map(|row| row.iter().map(|item| disposition.item(item)).collect())
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut rows = Vec::with_capacity(grid.len());
    for items in grid {
        let row = model
            .target_mut()
            .create(Primitive::container().class("row").class("horizontal"));
        model.target_mut().append(container, row);
        rows.push(row);
        for item in items {
            let cell = model.target_mut().create(Primitive::container().class("cell"));
            model.target_mut().append(row, cell);
            render_items(model, &mut layout.core, cell, std::slice::from_ref(&item))?;
        }
    }
    layout.arrangement = Arrangement::Table { rows };
    Ok(())
}

/// Row and column of the cell holding `origin`.
fn locate(model: &Model, rows: &[VisualHandle], origin: VisualHandle) -> Option<(usize, usize)> {
    let target = model.target();
    let row = rows.iter().position(|r| is_within(target, *r, origin))?;
    let cell = direct_child(target, rows[row], origin)?;
    let col = target.children(rows[row]).iter().position(|c| *c == cell)?;
    Some((row, col))
}

pub(crate) fn navigate(
    model: &mut Model,
    rows: &[VisualHandle],
    origin: VisualHandle,
    dir: Direction,
) -> bool {
    let Some((row, col)) = locate(model, rows, origin) else {
        return false;
    };
    match dir {
        Direction::Left | Direction::Right => {
            let cells = model.target().children(rows[row]);
            let candidates: Vec<VisualHandle> = if dir == Direction::Right {
                cells[col + 1..].to_vec()
            } else {
                cells[..col].iter().rev().copied().collect()
            };
            candidates.into_iter().any(|cell| model.focus_element(cell))
        }
        Direction::Up | Direction::Down => {
            let order: Vec<usize> = if dir == Direction::Down {
                (row + 1..rows.len()).collect()
            } else {
                (0..row).rev().collect()
            };
            order.into_iter().any(|r| {
                let cells = model.target().children(rows[r]);
                // ragged rows: fall back to their last cell
                match cells.get(col).or(cells.last()) {
                    Some(cell) => model.focus_element(*cell),
                    None => false,
                }
            })
        }
    }
}
