/// Rectangle descriptions consumed by the rasterizer

use std::fmt;
use std::sync::Arc;

/// A single display symbol painted into one cell.
///
/// The engine does not check the display width of the symbol; a multi-byte
/// sequence is emitted verbatim wherever it is painted. Cloning is a
/// reference-count bump, so painting a cell never allocates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Wrap a symbol. Returns `None` for the empty string, which cannot be
    /// painted.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Symbol(Arc::from(value)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A symbol made only of spaces paints blank cells.
    pub fn is_blank(&self) -> bool {
        self.0.chars().all(|c| c == ' ')
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol(Arc::from(c.to_string()))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One rectangle to draw.
///
/// `fill` paints the interior (or the whole rectangle when there is no
/// outline); `outline` paints the border. `None` means "not painted" and
/// renders as blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectSpec {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub fill: Option<Symbol>,
    pub outline: Option<Symbol>,
}

impl RectSpec {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill: None,
            outline: None,
        }
    }

    pub fn with_fill(mut self, fill: impl Into<Symbol>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn with_outline(mut self, outline: impl Into<Symbol>) -> Self {
        self.outline = Some(outline.into());
        self
    }

    /// Exclusive right edge (`x + width`).
    pub fn right_edge(&self) -> usize {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge (`y + height`).
    pub fn bottom_edge(&self) -> usize {
        self.y.saturating_add(self.height)
    }

    /// A rectangle with no area draws nothing and takes no space.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn is_top_row(&self, row: usize) -> bool {
        row == self.y
    }

    pub fn is_bottom_row(&self, row: usize) -> bool {
        !self.is_degenerate() && row == self.bottom_edge() - 1
    }

    pub fn is_side_column(&self, col: usize) -> bool {
        !self.is_degenerate() && (col == self.x || col == self.right_edge() - 1)
    }

    pub fn covers_row(&self, row: usize) -> bool {
        row >= self.y && row < self.bottom_edge()
    }

    pub fn covers_column(&self, col: usize) -> bool {
        col >= self.x && col < self.right_edge()
    }

    /// Outline symbol, if the rectangle has a visible border.
    pub fn outline_symbol(&self) -> Option<&Symbol> {
        self.outline.as_ref()
    }

    /// Fill symbol, if the rectangle paints its interior.
    pub fn fill_symbol(&self) -> Option<&Symbol> {
        self.fill.as_ref()
    }
}
