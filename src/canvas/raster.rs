/// Rasterizes a single rectangle into its own full-size layer

use super::grid::{Cell, Grid};
use super::spec::RectSpec;

/// Rasterize `spec` onto a fresh `width` x `height` layer.
///
/// Rows outside the rectangle stay absent. On the rectangle's rows, columns
/// left of it are padded with blank, columns right of it stay absent. Inside
/// the rectangle the border takes the outline symbol when one is set and
/// everything else takes the fill (blank without a fill).
pub fn rasterize(spec: &RectSpec, width: usize, height: usize) -> Grid {
    let mut layer = Grid::new(width, height);
    if spec.is_degenerate() {
        return layer;
    }

    let rows = spec.y.min(height)..spec.bottom_edge().min(height);
    let padding = spec.x.min(width);
    let cols = padding..spec.right_edge().min(width);

    for row in rows {
        for col in 0..padding {
            layer.set(row, col, Cell::Blank);
        }
        for col in cols.clone() {
            layer.set(row, col, classify(spec, row, col));
        }
    }
    layer
}

fn classify(spec: &RectSpec, row: usize, col: usize) -> Cell {
    match spec.outline_symbol() {
        Some(outline)
            if spec.is_top_row(row) || spec.is_side_column(col) || spec.is_bottom_row(row) =>
        {
            Cell::paint(Some(outline))
        }
        _ => Cell::paint(spec.fill_symbol()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_outside_rect_stay_absent() {
        let spec = RectSpec::new(0, 1, 1, 1).with_fill('*');
        let layer = rasterize(&spec, 1, 2);
        assert_eq!(layer.get(0, 0), Some(&Cell::Absent));
        assert_eq!(layer.get(1, 0), Some(&Cell::from_char('*')));
    }

    #[test]
    fn active_rows_are_padded_left_and_absent_right() {
        let spec = RectSpec::new(2, 0, 1, 1).with_fill('*');
        let layer = rasterize(&spec, 5, 1);
        let row = layer.row(0).unwrap();
        assert_eq!(row[0], Cell::Blank);
        assert_eq!(row[1], Cell::Blank);
        assert_eq!(row[2], Cell::from_char('*'));
        assert_eq!(row[3], Cell::Absent);
        assert_eq!(row[4], Cell::Absent);
    }

    #[test]
    fn outline_wins_on_border_and_fill_inside() {
        let spec = RectSpec::new(0, 0, 3, 3).with_fill('+').with_outline('@');
        assert_eq!(rasterize(&spec, 3, 3).to_text(), "@@@\n@+@\n@@@");
    }

    #[test]
    fn fill_covers_everything_without_outline() {
        let spec = RectSpec::new(0, 0, 2, 2).with_fill('#');
        assert_eq!(rasterize(&spec, 2, 2).to_text(), "##\n##");
    }

    #[test]
    fn missing_fill_with_outline_leaves_blank_interior() {
        let spec = RectSpec::new(0, 0, 3, 3).with_outline('X');
        let layer = rasterize(&spec, 3, 3);
        assert_eq!(layer.get(1, 1), Some(&Cell::Blank));
    }

    #[test]
    fn degenerate_rect_is_all_absent() {
        let spec = RectSpec::new(0, 0, 0, 2).with_fill('#');
        let layer = rasterize(&spec, 2, 2);
        assert!(layer.rows().all(|r| r.iter().all(|c| *c == Cell::Absent)));
    }

    #[test]
    fn rect_without_symbols_paints_only_blank() {
        let spec = RectSpec::new(0, 0, 2, 1);
        let layer = rasterize(&spec, 2, 1);
        assert!(layer.rows().all(|r| r.iter().all(Cell::is_blank)));
    }

    #[test]
    fn rect_larger_than_target_is_clipped() {
        let spec = RectSpec::new(1, 1, 10, 10).with_fill('o');
        assert_eq!(rasterize(&spec, 3, 2).to_text(), "   \n oo");
    }
}
