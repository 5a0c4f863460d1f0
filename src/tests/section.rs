use super::{root_trail, segment, ScopeMode, Section};
use crate::render::Renderer;
use crate::tree::{BlockKind, RenderedTree};

const DOC: &str = "\
# Chapter

intro

## Section

body **one**

> quoted

### Sub

deep

---

after the break

## Other

last
";

fn render(text: &str) -> RenderedTree {
    Renderer::new().unwrap().render(text).unwrap()
}

fn heading_index(tree: &RenderedTree, label: &str) -> usize {
    tree.blocks
        .iter()
        .position(|block| matches!(&block.kind, BlockKind::Heading(h) if h.label == label))
        .unwrap()
}

#[test]
fn test_root_trail_follows_ancestors() {
    let tree = render(DOC);

    let labels: Vec<String> = root_trail(&tree, heading_index(&tree, "Sub"))
        .into_iter()
        .map(|entry| entry.label)
        .collect();

    assert_eq!(labels, vec!["Chapter", "Section", "Sub"]);
}

#[test]
fn test_trail_skips_missing_levels() {
    let tree = render("# A\n\n## B\n\n# C\n\n### D\n\ntext\n");

    let section = Section::extract(&tree, heading_index(&tree, "D"), ScopeMode::Nested).unwrap();

    assert_eq!(section.trail_string("."), "C.D");
    assert_eq!(section.level(), 3);
}

#[test]
fn test_scope_stops_at_rule() {
    let tree = render(DOC);

    let section = Section::extract(&tree, heading_index(&tree, "Sub"), ScopeMode::Nested).unwrap();

    assert_eq!(section.text.len(), 1);
    assert_eq!(tree.text(&section.text[0].trimmed_range(&tree.source)), "deep");
    assert!(section.extra.is_empty());
}

#[test]
fn test_nested_scope_keeps_subsections() {
    let tree = render(DOC);

    let section =
        Section::extract(&tree, heading_index(&tree, "Section"), ScopeMode::Nested).unwrap();

    // paragraph, sub heading, deep paragraph; the quote goes to extra
    assert_eq!(section.text.len(), 3);
    assert_eq!(section.extra.len(), 1);
    assert_eq!(
        tree.text(&section.extra[0].trimmed_range(&tree.source)),
        "> quoted"
    );
}

#[test]
fn test_flat_scope_stops_at_any_heading() {
    let tree = render(DOC);

    let section =
        Section::extract(&tree, heading_index(&tree, "Section"), ScopeMode::Flat).unwrap();

    assert_eq!(section.text.len(), 1);
    assert_eq!(section.extra.len(), 1);
}

#[test]
fn test_empty_section_is_still_yielded() {
    let tree = render("## Empty\n\n## Full\n\ntext\n");

    let sections: Vec<_> = segment(&tree, |level| level == 2, ScopeMode::Nested).collect();

    assert_eq!(sections.len(), 2);
    assert!(sections[0].is_empty());
    assert_eq!(sections[1].label(), "Full");
}

#[test]
fn test_segment_filters_levels_and_restarts() {
    let tree = render(DOC);

    let first: Vec<String> = segment(&tree, |level| level <= 2, ScopeMode::Nested)
        .map(|section| section.label().to_string())
        .collect();
    let again = segment(&tree, |level| level <= 2, ScopeMode::Nested).count();

    assert_eq!(first, vec!["Chapter", "Section", "Other"]);
    assert_eq!(again, 3);
}

#[test]
fn test_marker_comments_are_not_text() {
    let tree = render("## Term\n\n<!-- NoteId: 1700000000000 -->\n\n**value**\n");

    let section = Section::extract(&tree, 0, ScopeMode::Nested).unwrap();

    assert_eq!(section.text.len(), 1);
}
