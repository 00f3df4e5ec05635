//! Rectangle compositing engine.
//!
//! A batch of [`RectSpec`]s is turned into text in four steps: compute the
//! bounding grid, rasterize every spec onto its own layer, fold the layers in
//! input order, then serialize the merged grid. Every step is pure; the
//! functions here can be called concurrently from any number of threads.

pub mod composite;
pub mod grid;
pub mod raster;
pub mod spec;

pub use composite::composite;
pub use grid::{Cell, Grid};
pub use raster::rasterize;
pub use spec::{RectSpec, Symbol};

use crate::{Error, Result};

/// Default cap on `width * height` of a single drawing.
pub const MAX_CANVAS_CELLS: usize = 4 * 1024 * 1024;

/// Default cap on the cells rasterized for one batch (specs x canvas cells).
pub const MAX_BATCH_CELLS: usize = 16 * MAX_CANVAS_CELLS;

/// Cells the parallel path may hold in unmerged layers at any one time.
pub const PARALLEL_LAYER_CELLS: usize = 2 * MAX_CANVAS_CELLS;

/// Work and memory bounds for one drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Upper bound on `width * height` of the drawing
    pub max_canvas_cells: usize,
    /// Upper bound on `width * height` times the number of drawn specs
    pub max_batch_cells: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_canvas_cells: MAX_CANVAS_CELLS,
            max_batch_cells: MAX_BATCH_CELLS,
        }
    }
}

/// Size of the smallest grid anchored at the origin that holds every spec.
///
/// Degenerate specs (zero width or height) take no space.
pub fn bounding_box(specs: &[RectSpec]) -> (usize, usize) {
    specs
        .iter()
        .filter(|s| !s.is_degenerate())
        .fold((0, 0), |(w, h), s| (w.max(s.right_edge()), h.max(s.bottom_edge())))
}

/// Rasterize and composite `specs` and return the serialized drawing.
///
/// # Errors
///
/// [`Error::EmptyInput`] when `specs` is empty, [`Error::CanvasTooLarge`] or
/// [`Error::BatchTooLarge`] when the default [`Limits`] are exceeded.
///
/// # Examples
///
/// ```
/// use sketchgrid::canvas::{draw, RectSpec};
///
/// let specs = [RectSpec::new(2, 0, 3, 3).with_fill('+').with_outline('@')];
/// assert_eq!(draw(&specs).unwrap(), "  @@@\n  @+@\n  @@@");
/// ```
pub fn draw(specs: &[RectSpec]) -> Result<String> {
    draw_with_limits(specs, Limits::default())
}

/// [`draw`] with custom limits.
pub fn draw_with_limits(specs: &[RectSpec], limits: Limits) -> Result<String> {
    render(specs, limits).map(|grid| grid.to_text())
}

/// Produce the merged grid without serializing it.
pub fn render(specs: &[RectSpec], limits: Limits) -> Result<Grid> {
    let (width, height) = checked_bounds(specs, limits)?;
    let layers = specs.iter().map(|spec| rasterize(spec, width, height));
    Ok(composite(width, height, layers))
}

/// Like [`draw_with_limits`], but rasterizes layers on up to `threads` scoped
/// threads.
///
/// Specs are taken in windows of at most [`layers_in_flight`] layers; each
/// window is rasterized concurrently and folded into the result in input
/// order before the next one starts, so the output is identical to the
/// sequential path and memory stays bounded regardless of batch size.
pub fn draw_parallel(specs: &[RectSpec], threads: usize, limits: Limits) -> Result<String> {
    let (width, height) = checked_bounds(specs, limits)?;
    let window = layers_in_flight(threads, width, height).min(specs.len());
    if window == 1 {
        return Ok(render(specs, limits)?.to_text());
    }

    let mut merged = Grid::filled(width, height, Cell::Blank);
    for chunk in specs.chunks(window) {
        let layers: Vec<Grid> = std::thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|spec| scope.spawn(move || rasterize(spec, width, height)))
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(layer) => layer,
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect()
        });
        for layer in &layers {
            composite::paint_over(&mut merged, layer);
        }
    }
    Ok(merged.to_text())
}

/// Number of full-size layers the parallel paths rasterize at once: at most
/// `threads`, and never more than fit in [`PARALLEL_LAYER_CELLS`].
pub fn layers_in_flight(threads: usize, width: usize, height: usize) -> usize {
    let cells = width.saturating_mul(height).max(1);
    (PARALLEL_LAYER_CELLS / cells).clamp(1, threads.max(1))
}

/// Validate the batch against `limits` and compute its bounding box.
pub(crate) fn checked_bounds(specs: &[RectSpec], limits: Limits) -> Result<(usize, usize)> {
    if specs.is_empty() {
        return Err(Error::EmptyInput);
    }
    let (width, height) = bounding_box(specs);
    let cells = match width.checked_mul(height) {
        Some(cells) if cells <= limits.max_canvas_cells => cells,
        _ => return Err(Error::CanvasTooLarge { width, height }),
    };
    let drawn = specs.iter().filter(|s| !s.is_degenerate()).count();
    match drawn.checked_mul(cells) {
        Some(total) if total <= limits.max_batch_cells => Ok((width, height)),
        _ => Err(Error::BatchTooLarge { specs: drawn, cells }),
    }
}
