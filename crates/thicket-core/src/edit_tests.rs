use crate::Edit;

#[test]
fn splice_replaces_range() {
    let (edit, text) = Edit::splice("if a then b", 3..4, "xyz").unwrap();

    assert_eq!(text, "if xyz then b");
    assert_eq!(edit, Edit::new(3, 4, 6));
    assert_eq!(edit.delta(), 2);
}

#[test]
fn splice_rejects_out_of_bounds() {
    assert!(Edit::splice("abc", 2..5, "x").is_none());
    assert!(Edit::splice("héllo", 2..3, "x").is_none());
}

#[test]
fn map_offset_shifts_after_edit() {
    let edit = Edit::new(4, 6, 10);

    assert_eq!(edit.map_offset(2), 2);
    assert_eq!(edit.map_offset(5), 10);
    assert_eq!(edit.map_offset(6), 10);
    assert_eq!(edit.map_offset(9), 13);
}

#[test]
fn new_text_len_validates_bounds() {
    let edit = Edit::new(2, 5, 3);

    assert_eq!(edit.new_text_len(10), Some(8));
    assert_eq!(edit.new_text_len(4), None);
    assert_eq!(Edit::new(5, 2, 6).new_text_len(10), None);
}

#[test]
fn touches_is_inclusive() {
    let insert = Edit::new(4, 4, 6);

    assert!(insert.touches(0, 4));
    assert!(insert.touches(4, 8));
    assert!(!insert.touches(0, 3));
    assert!(!insert.touches(5, 8));
}
