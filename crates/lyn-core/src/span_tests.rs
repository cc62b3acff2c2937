use crate::{Pos, Span};

#[test]
fn cover_merges_ranges() {
    let a = Span::new(4, 9);
    let b = Span::new(12, 20);
    assert_eq!(a.cover(b), Span::new(4, 20));
    assert_eq!(b.cover(a), Span::new(4, 20));
}

#[test]
fn contains_is_half_open() {
    let span = Span::new(3, 6);
    assert!(!span.contains(2));
    assert!(span.contains(3));
    assert!(span.contains(5));
    assert!(!span.contains(6));
}

#[test]
fn empty_span_has_no_width() {
    let span = Span::empty(7);
    assert!(span.is_empty());
    assert_eq!(span.len(), 0);
}

#[test]
fn range_round_trip() {
    let span = Span::from(2usize..11usize);
    assert_eq!(std::ops::Range::<usize>::from(span), 2..11);
}

#[test]
fn pos_displays_line_colon_column() {
    assert_eq!(Pos::new(3, 14).to_string(), "3:14");
}
