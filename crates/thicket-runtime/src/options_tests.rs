use crate::ParseOptions;

#[test]
fn defaults() {
    let options = ParseOptions::default();
    assert_eq!(options.get_max_heads(), 6);
    assert_eq!(options.get_max_insertions(), 3);
    assert_eq!(options.get_exec_fuel(), None);
    assert_eq!(options, ParseOptions::new());
}

#[test]
fn builder_sets_limits() {
    let options = ParseOptions::new()
        .max_heads(2)
        .max_insertions(0)
        .exec_fuel(500);
    assert_eq!(options.get_max_heads(), 2);
    assert_eq!(options.get_max_insertions(), 0);
    assert_eq!(options.get_exec_fuel(), Some(500));
}

#[test]
fn head_cap_is_at_least_one() {
    assert_eq!(ParseOptions::new().max_heads(0).get_max_heads(), 1);
}
