use super::{Edit, EditPlan};

#[test]
fn test_replace_single_span() {
    let source = "see img.png here";
    let mut plan = EditPlan::default();
    plan.push(Edit::replace(4..11, "a.b.img.png"));

    assert_eq!(plan.render(source, 0..source.len()), "see a.b.img.png here");
}

#[test]
fn test_wrap_drops_delimiters() {
    let source = "say **value** now";
    let mut plan = EditPlan::default();
    plan.push(Edit::wrap(4..13, 6..11, "{{c1:: ", "}}"));

    assert_eq!(plan.render(source, 0..source.len()), "say {{c1:: value}} now");
}

#[test]
fn test_nested_edit_inside_wrap() {
    // "- look ![x](p.png)" with the whole item content wrapped and the path rewritten
    let source = "- look ![x](p.png)";
    let mut plan = EditPlan::default();
    plan.push(Edit::replace(12..17, "deck.p.png"));
    plan.push(Edit::wrap(2..18, 2..18, "{{c1:: ", "}}"));

    assert_eq!(
        plan.render(source, 0..source.len()),
        "- {{c1:: look ![x](deck.p.png)}}"
    );
}

#[test]
fn test_edits_outside_range_are_ignored() {
    let source = "one **two** three **four**";
    let mut plan = EditPlan::default();
    plan.push(Edit::wrap(4..11, 6..9, "{{c1:: ", "}}"));
    plan.push(Edit::wrap(18..26, 20..24, "{{c2:: ", "}}"));

    assert_eq!(plan.render(source, 0..12), "one {{c1:: two}} ");
}

#[test]
fn test_partial_overlap_is_dropped() {
    let source = "abcdefgh";
    let mut plan = EditPlan::default();
    plan.push(Edit::replace(1..4, "X"));
    plan.push(Edit::replace(3..6, "Y"));

    assert_eq!(plan.render(source, 0..source.len()), "aXefgh");
}
