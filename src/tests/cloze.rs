use super::{select, select_and_mark, SpanKind};
use crate::edit_plan::EditPlan;
use crate::render::Renderer;
use crate::section::{ScopeMode, Section};
use crate::tree::RenderedTree;

fn render(text: &str) -> RenderedTree {
    Renderer::new().unwrap().render(text).unwrap()
}

/// Marks the first heading's section and returns (count, serialized text scope).
fn mark(text: &str) -> (usize, String) {
    let tree = render(text);
    let section = Section::extract(&tree, 0, ScopeMode::Nested).unwrap();
    let mut plan = EditPlan::default();
    let count = select_and_mark(&section.text, &tree.source, tree.has_math, &mut plan);
    (count, plan.render_blocks(&tree.source, &section.text))
}

#[test]
fn test_single_strong_span() {
    let (count, text) = mark("## Term\n\n**value**\n");

    assert_eq!(count, 1);
    assert_eq!(text, "{{c1:: value}}");
}

#[test]
fn test_numbering_follows_document_order() {
    let (count, text) = mark("## Term\n\n**a** and **b**\n\n- item **c**\n");

    assert_eq!(count, 3);
    assert_eq!(text, "{{c1:: a}} and {{c2:: b}}\n\n- item {{c3:: c}}");
}

#[test]
fn test_tight_list_items_when_no_emphasis() {
    let (count, text) = mark("## Colours\n\n- red\n- green\n");

    assert_eq!(count, 2);
    assert_eq!(text, "- {{c1:: red}}\n- {{c2:: green}}");
}

#[test]
fn test_loose_list_paragraphs_when_no_emphasis() {
    let (count, text) = mark("## Colours\n\n- red\n\n- green\n");

    assert_eq!(count, 2);
    assert!(text.contains("- {{c1:: red}}"));
    assert!(text.contains("- {{c2:: green}}"));
}

#[test]
fn test_emphasis_wins_over_list_items() {
    let tree = render("## Mixed\n\n- plain\n- with **bold**\n");
    let section = Section::extract(&tree, 0, ScopeMode::Nested).unwrap();

    let spans = select(&section.text, &tree.source, false);

    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].kind, SpanKind::Emphasis);
}

#[test]
fn test_strong_with_nested_structure_is_rejected() {
    let (count, _) = mark("## Term\n\n**a *b* c**\n");

    assert_eq!(count, 0);
}

#[test]
fn test_quoted_emphasis_is_never_selected() {
    let tree = render("## Term\n\n> **hidden**\n\nplain\n");
    let section = Section::extract(&tree, 0, ScopeMode::Nested).unwrap();
    let mut plan = EditPlan::default();

    let count = select_and_mark(&section.text, &tree.source, false, &mut plan);

    assert_eq!(count, 0);
    assert!(plan.is_empty());
}

#[test]
fn test_math_block_gets_display_delimiters() {
    let (count, text) = mark("## Formula\n\n**area** is\n\n$$\n\\pi r^2\n$$\n");

    assert_eq!(count, 2);
    assert_eq!(text, "{{c1:: area}} is\n\n\\[\n{{c2:: \\pi r^2 }}\n\\]");
}

#[test]
fn test_table_cells_are_the_last_fallback() {
    let (count, text) = mark("## Capitals\n\n| Country | Capital |\n| --- | --- |\n| France | Paris |\n");

    assert_eq!(count, 2);
    assert!(text.contains("{{c1:: France}}"));
    assert!(text.contains("{{c2:: Paris}}"));
    assert!(text.contains("| Country | Capital |"));
}
