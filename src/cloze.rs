//! Cloze span selection and rewriting.
//!
//! Spans are gathered from a section's text scope in a fallback chain: strong emphasis first,
//! then paragraphs of loose list items, then tight list items, then table body cells. The first
//! category with an accepted span wins. Display math is added on top whenever the document uses
//! math at all. Accepted spans are numbered `c1`, `c2`, … in document order and rewritten through
//! the section's [`EditPlan`]; the tree and the source buffer stay untouched.

use crate::edit_plan::{Edit, EditPlan};
use crate::tree::{trim_range, Block, BlockKind, Inline, InlineKind, ListItem};
use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Categories of cloze-eligible spans, in fallback order.
pub enum SpanKind {
    /// `**strong**` emphasis.
    Emphasis,
    /// A paragraph inside a loose list item.
    ListParagraph,
    /// A tight list item.
    ListItem,
    /// A table body cell.
    TableCell,
    /// A `$$ … $$` block.
    Math,
}

const FALLBACK_CHAIN: [SpanKind; 4] = [
    SpanKind::Emphasis,
    SpanKind::ListParagraph,
    SpanKind::ListItem,
    SpanKind::TableCell,
];

#[derive(Clone, Debug, PartialEq, Eq)]
/// A candidate span inside a text scope.
pub struct ClozeSpan {
    /// Category the span was found in.
    pub kind: SpanKind,
    /// Span replaced by the rewrite.
    pub outer: Range<usize>,
    /// Span whose text goes inside the deletion marker.
    pub content: Range<usize>,
    /// Number of child nodes; more than one means embedded structure.
    pub children: usize,
}

impl ClozeSpan {
    #[must_use]
    /// Whether the span has text and no embedded structure.
    pub fn is_eligible(&self, source: &str) -> bool {
        self.children <= 1 && !source[self.content.clone()].trim().is_empty()
    }

    #[must_use]
    /// The rewrite turning this span into deletion number `number`.
    pub fn edit(&self, number: usize) -> Edit {
        match self.kind {
            SpanKind::Math => Edit::wrap(
                self.outer.clone(),
                self.content.clone(),
                format!("\\[\n{{{{c{number}:: "),
                " }}\n\\]",
            ),
            _ => Edit::wrap(
                self.outer.clone(),
                self.content.clone(),
                format!("{{{{c{number}:: "),
                "}}",
            ),
        }
    }
}

#[must_use]
/// Candidate spans of one category, in document order.
pub fn candidates(scope: &[&Block], source: &str, kind: SpanKind) -> Vec<ClozeSpan> {
    let mut out = Vec::new();
    for block in scope {
        collect_block(block, source, kind, &mut out);
    }
    out
}

#[must_use]
/// Picks the spans to mark: the first fallback category with an accepted span, plus math.
pub fn select(scope: &[&Block], source: &str, math: bool) -> Vec<ClozeSpan> {
    let mut selected: Vec<ClozeSpan> = FALLBACK_CHAIN
        .iter()
        .map(|kind| {
            candidates(scope, source, *kind)
                .into_iter()
                .filter(|span| span.is_eligible(source))
                .collect::<Vec<_>>()
        })
        .find(|spans| !spans.is_empty())
        .unwrap_or_default();

    if math {
        for span in candidates(scope, source, SpanKind::Math) {
            let overlaps = selected.iter().any(|other| {
                span.outer.start < other.outer.end && other.outer.start < span.outer.end
            });
            if span.is_eligible(source) && !overlaps {
                selected.push(span);
            }
        }
    }

    selected.sort_by_key(|span| span.outer.start);
    selected
}

/// Selects spans in a text scope and records their rewrites, numbered from 1.
///
/// Returns the number of spans marked; zero means the section has nothing to ask.
pub fn select_and_mark(scope: &[&Block], source: &str, math: bool, plan: &mut EditPlan) -> usize {
    let spans = select(scope, source, math);
    for (i, span) in spans.iter().enumerate() {
        plan.push(span.edit(i + 1));
    }
    spans.len()
}

fn collect_block(block: &Block, source: &str, kind: SpanKind, out: &mut Vec<ClozeSpan>) {
    match &block.kind {
        BlockKind::Paragraph(inlines) => {
            if kind == SpanKind::Emphasis {
                collect_strong(inlines, out);
            }
        }
        BlockKind::Math { inner } => {
            if kind == SpanKind::Math {
                out.push(ClozeSpan {
                    kind,
                    outer: block.trimmed_range(source),
                    content: trim_range(source, inner),
                    children: 1,
                });
            }
        }
        BlockKind::List(items) => {
            for item in items {
                collect_item(item, source, kind, out);
            }
        }
        BlockKind::Table(table) => {
            if kind == SpanKind::Emphasis {
                for cell in table.header.iter().chain(table.rows.iter().flatten()) {
                    collect_strong(&cell.children, out);
                }
            } else if kind == SpanKind::TableCell {
                for cell in table.rows.iter().flatten() {
                    out.push(ClozeSpan {
                        kind,
                        outer: cell.range.clone(),
                        content: cell.range.clone(),
                        children: cell.children.len(),
                    });
                }
            }
        }
        // quoted content is never asked, even when nested
        BlockKind::Quote(_)
        | BlockKind::Heading(_)
        | BlockKind::Code
        | BlockKind::Comment(_)
        | BlockKind::Rule
        | BlockKind::Other => {}
    }
}

fn collect_item(item: &ListItem, source: &str, kind: SpanKind, out: &mut Vec<ClozeSpan>) {
    match kind {
        SpanKind::ListParagraph if item.loose => {
            for block in &item.blocks {
                if let BlockKind::Paragraph(inlines) = &block.kind {
                    let range = block.trimmed_range(source);
                    out.push(ClozeSpan {
                        kind,
                        outer: range.clone(),
                        content: range,
                        children: inlines.len(),
                    });
                }
            }
        }
        SpanKind::ListItem if !item.loose => {
            if let (Some(first), Some(last)) = (item.blocks.first(), item.blocks.last()) {
                let range = first.trimmed_range(source).start..last.trimmed_range(source).end;
                out.push(ClozeSpan {
                    kind,
                    outer: range.clone(),
                    content: range,
                    children: item_children(item),
                });
            }
        }
        _ => {}
    }
    // nested lists and strong spans are searched whatever the item looks like
    for block in &item.blocks {
        collect_block(block, source, kind, out);
    }
}

/// Child count of a tight item, as if its paragraph were unwrapped.
fn item_children(item: &ListItem) -> usize {
    item.blocks
        .iter()
        .map(|block| match &block.kind {
            BlockKind::Paragraph(inlines) => inlines.len(),
            _ => 1,
        })
        .sum()
}

fn collect_strong(inlines: &[Inline], out: &mut Vec<ClozeSpan>) {
    for inline in inlines {
        match &inline.kind {
            InlineKind::Strong { content, children } => out.push(ClozeSpan {
                kind: SpanKind::Emphasis,
                outer: inline.range.clone(),
                content: content.clone(),
                children: children.len(),
            }),
            other => collect_strong(other.children(), out),
        }
    }
}

#[cfg(test)]
#[path = "tests/cloze.rs"]
mod tests;
