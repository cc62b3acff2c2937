use crate::{LineIndex, Pos};

#[test]
fn first_offset_is_line_one_column_one() {
    let index = LineIndex::new("print(1)\n");
    assert_eq!(index.pos_at(0), Pos::new(1, 1));
}

#[test]
fn positions_after_newlines() {
    let index = LineIndex::new("main\n  x = 1\nend\n");
    assert_eq!(index.pos_at(0), Pos::new(1, 1));
    assert_eq!(index.pos_at(5), Pos::new(2, 1));
    assert_eq!(index.pos_at(7), Pos::new(2, 3));
    assert_eq!(index.pos_at(13), Pos::new(3, 1));
}

#[test]
fn offset_past_end_clamps() {
    let index = LineIndex::new("ab");
    assert_eq!(index.pos_at(100), Pos::new(1, 3));
}

#[test]
fn empty_text_is_one_line() {
    let index = LineIndex::new("");
    assert_eq!(index.line_count(), 1);
    assert_eq!(index.pos_at(0), Pos::new(1, 1));
}

#[test]
fn line_range_excludes_newline() {
    let index = LineIndex::new("one\ntwo\n");
    assert_eq!(index.line_range(1), Some((0, 3)));
    assert_eq!(index.line_range(2), Some((4, 7)));
    assert_eq!(index.line_range(9), None);
}
