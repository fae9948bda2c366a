use crate::Colors;

#[test]
fn new_picks_the_palette() {
    assert_eq!(Colors::new(true), Colors::ON);
    assert_eq!(Colors::new(false), Colors::OFF);
}

#[test]
fn off_formats_as_plain_text() {
    let c = Colors::OFF;
    let line = format!("{}stmt{} {}0..4{}", c.blue, c.reset, c.dim, c.reset);
    assert_eq!(line, "stmt 0..4");
}
