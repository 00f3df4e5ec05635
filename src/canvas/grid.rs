//! Character-cell grid storage.
//!
//! Cells are stored row-major in one contiguous buffer: `index = row * width + col`.

use std::fmt;

use super::spec::Symbol;
use crate::{Error, Result};

/// Contents of one grid position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    /// Never written by the layer that owns the grid.
    #[default]
    Absent,
    /// Explicitly written as a space.
    Blank,
    /// A painted symbol.
    Symbol(Symbol),
}

impl Cell {
    /// Cell for an optional symbol: `None` and whitespace-only symbols are blank.
    pub fn paint(symbol: Option<&Symbol>) -> Self {
        match symbol {
            Some(s) if !s.is_blank() => Cell::Symbol(s.clone()),
            _ => Cell::Blank,
        }
    }

    pub fn from_char(c: char) -> Self {
        Cell::paint(Some(&Symbol::from(c)))
    }

    /// Absent and blank cells are both transparent when layers are merged.
    pub fn is_blank(&self) -> bool {
        !matches!(self, Cell::Symbol(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Cell::Absent | Cell::Blank => " ",
            Cell::Symbol(s) => s.as_str(),
        }
    }
}

/// A `height` x `width` grid of cells, origin at the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with every cell absent, rejecting sizes whose cell count
    /// does not fit in `usize`.
    pub fn try_new(width: usize, height: usize) -> Result<Self> {
        match width.checked_mul(height) {
            Some(_) => Ok(Self::new(width, height)),
            None => Err(Error::CanvasTooLarge { width, height }),
        }
    }

    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Cell::Absent)
    }

    /// Callers size the grid from a bounding box that has already been
    /// checked. An overflowing product saturates, so the allocation fails
    /// loudly instead of producing a short buffer.
    pub(crate) fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![cell; width.saturating_mul(height)],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.height && col < self.width).then(|| row * self.width + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    /// Write a cell; out-of-bounds writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = cell;
        }
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.width;
        Some(&self.cells[start..start + self.width])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        (0..self.height).filter_map(move |r| self.row(r))
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Serialize the grid: cells concatenated per row, rows joined by `\n`,
    /// no trailing newline.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height);
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for cell in row {
                out.push_str(cell.as_str());
            }
        }
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
