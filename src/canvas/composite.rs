//! Layer compositing.
//!
//! Layers are folded in input order onto a blank canvas. A painted cell from
//! a later layer replaces whatever is underneath; blank and absent cells are
//! transparent and never erase earlier paint.

use std::borrow::Borrow;

use super::grid::{Cell, Grid};

/// Merge `layers` into one `width` x `height` grid, painting them in order.
///
/// Layers may be borrowed or produced lazily; each one is consumed as soon as
/// it has been painted.
pub fn composite<I>(width: usize, height: usize, layers: I) -> Grid
where
    I: IntoIterator,
    I::Item: Borrow<Grid>,
{
    layers
        .into_iter()
        .fold(Grid::filled(width, height, Cell::Blank), |mut acc, layer| {
            paint_over(&mut acc, layer.borrow());
            acc
        })
}

/// Paint one layer over `target`.
pub fn paint_over(target: &mut Grid, layer: &Grid) {
    if target.width() == layer.width() && target.height() == layer.height() {
        for (current, cell) in target.cells_mut().iter_mut().zip(layer.cells()) {
            merge_cell(current, cell);
        }
        return;
    }

    // Mismatched sizes only happen for hand-built layers; align by coordinate.
    for row in 0..target.height() {
        for col in 0..target.width() {
            let Some(cell) = layer.get(row, col) else {
                continue;
            };
            let mut current = target.get(row, col).cloned().unwrap_or_default();
            merge_cell(&mut current, cell);
            target.set(row, col, current);
        }
    }
}

fn merge_cell(current: &mut Cell, incoming: &Cell) {
    if incoming.is_blank() && !current.is_blank() {
        return;
    }
    *current = match incoming {
        Cell::Symbol(_) => incoming.clone(),
        Cell::Absent | Cell::Blank => Cell::Blank,
    };
}
