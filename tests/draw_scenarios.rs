//! End-to-end drawing scenarios through the public engine API

use pretty_assertions::assert_eq;
use sketchgrid::canvas::{draw, RectSpec};
use sketchgrid::{DrawRequests, Error};

/// Right-pad every line to `width` cells and join with newlines.
fn canvas(width: usize, lines: &[&str]) -> String {
    lines
        .iter()
        .map(|l| format!("{l:<width$}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn draw_json(json: &str) -> String {
    let requests = DrawRequests::from_json(json).expect("valid json");
    requests.validate(false).expect("valid requests");
    draw(&requests.to_specs()).expect("drawable")
}

#[test]
fn single_cell() {
    assert_eq!(draw(&[RectSpec::new(0, 0, 1, 1).with_fill('*')]).unwrap(), "*");
}

#[test]
fn single_cell_offset_right() {
    assert_eq!(draw(&[RectSpec::new(1, 0, 1, 1).with_fill('*')]).unwrap(), " *");
}

#[test]
fn single_cell_offset_down() {
    assert_eq!(draw(&[RectSpec::new(0, 1, 1, 1).with_fill('*')]).unwrap(), " \n*");
}

#[test]
fn filled_blocks() {
    assert_eq!(draw(&[RectSpec::new(0, 0, 2, 1).with_fill('*')]).unwrap(), "**");
    assert_eq!(draw(&[RectSpec::new(0, 0, 1, 2).with_fill('*')]).unwrap(), "*\n*");
    assert_eq!(draw(&[RectSpec::new(0, 0, 2, 2).with_fill('*')]).unwrap(), "**\n**");
}

#[test]
fn neighbours_side_by_side() {
    let specs = [
        RectSpec::new(0, 0, 1, 1).with_fill('*'),
        RectSpec::new(1, 0, 1, 1).with_fill('+'),
    ];
    assert_eq!(draw(&specs).unwrap(), "*+");
}

#[test]
fn gap_between_rectangles_is_blank() {
    let specs = [
        RectSpec::new(0, 0, 1, 2).with_fill('*'),
        RectSpec::new(2, 0, 1, 1).with_fill('+'),
    ];
    assert_eq!(draw(&specs).unwrap(), "* +\n*  ");
}

#[test]
fn stacked_rectangles() {
    let specs = [
        RectSpec::new(0, 0, 1, 1).with_fill('*'),
        RectSpec::new(0, 1, 1, 1).with_fill('+'),
    ];
    assert_eq!(draw(&specs).unwrap(), "*\n+");
}

#[test]
fn later_spec_overwrites_overlap() {
    let specs = [
        RectSpec::new(0, 0, 3, 3).with_fill('🔥'),
        RectSpec::new(0, 2, 3, 1).with_fill('💧'),
    ];
    assert_eq!(draw(&specs).unwrap(), "🔥🔥🔥\n🔥🔥🔥\n💧💧💧");
}

#[test]
fn outline_with_fill() {
    let specs = [RectSpec::new(2, 0, 3, 3).with_fill('+').with_outline('@')];
    assert_eq!(draw(&specs).unwrap(), "  @@@\n  @+@\n  @@@");
}

#[test]
fn outline_without_fill_has_blank_interior() {
    let specs = [RectSpec::new(2, 0, 5, 3).with_outline('X')];
    assert_eq!(draw(&specs).unwrap(), "  XXXXX\n  X   X\n  XXXXX");
}

#[test]
fn none_fill_from_json() {
    let got = draw_json(r#"[{"x":2,"width":5,"height":3,"fill":"none","outline":"X"}]"#);
    assert_eq!(got, "  XXXXX\n  X   X\n  XXXXX");
}

#[test]
fn offset_fill_block() {
    let got = draw_json(r#"[{"x":14,"y":0,"width":7,"height":6,"fill":"."}]"#);
    let expected = vec!["              ......."; 6].join("\n");
    assert_eq!(got, expected);
}

#[test]
fn offset_outlined_block() {
    let got = draw_json(r#"[{"x":10,"y":3,"width":14,"height":6,"fill":"O","outline":"X"}]"#);
    let expected = canvas(
        24,
        &[
            "",
            "",
            "",
            "          XXXXXXXXXXXXXX",
            "          XOOOOOOOOOOOOX",
            "          XOOOOOOOOOOOOX",
            "          XOOOOOOOOOOOOX",
            "          XOOOOOOOOOOOOX",
            "          XXXXXXXXXXXXXX",
        ],
    );
    assert_eq!(got, expected);
}

#[test]
fn two_outlined_rectangles() {
    let got = draw_json(
        r#"[
            {"x":3,"y":2,"width":5,"height":3,"fill":"X","outline":"@"},
            {"x":10,"y":3,"width":14,"height":6,"fill":"O","outline":"X"}
        ]"#,
    );
    let expected = canvas(
        24,
        &[
            "",
            "",
            "   @@@@@",
            "   @XXX@  XXXXXXXXXXXXXX",
            "   @@@@@  XOOOOOOOOOOOOX",
            "          XOOOOOOOOOOOOX",
            "          XOOOOOOOOOOOOX",
            "          XOOOOOOOOOOOOX",
            "          XXXXXXXXXXXXXX",
        ],
    );
    assert_eq!(got, expected);
}

#[test]
fn three_overlapping_rectangles() {
    let got = draw_json(
        r#"[
            {"x":14,"y":0,"width":7,"height":6,"outline":"none","fill":"."},
            {"x":0,"y":3,"width":8,"height":4,"outline":"O","fill":"none"},
            {"x":5,"y":5,"width":5,"height":3,"outline":"X","fill":"X"}
        ]"#,
    );
    let expected = canvas(
        21,
        &[
            "              .......",
            "              .......",
            "              .......",
            "OOOOOOOO      .......",
            "O      O      .......",
            "O    XXXXX    .......",
            "OOOOOXXXXX",
            "     XXXXX",
        ],
    );
    assert_eq!(got, expected);
}

#[test]
fn blank_interior_does_not_erase_earlier_paint() {
    let specs = [
        RectSpec::new(0, 0, 5, 5).with_fill('#'),
        RectSpec::new(0, 0, 5, 5).with_outline('o'),
    ];
    let expected = ["ooooo", "o###o", "o###o", "o###o", "ooooo"].join("\n");
    assert_eq!(draw(&specs).unwrap(), expected);
}

#[test]
fn empty_input_is_an_error() {
    assert!(matches!(draw(&[]), Err(Error::EmptyInput)));
}
