//! The edit plan collects span rewrites for one section and applies them on serialization.
//!
//! Cloze marking and media localization never touch the rendered tree or the source buffer.
//! They record edits against byte ranges of the rendered snapshot, and the plan replays them
//! whenever a scope is serialized back to markup. Edits may nest: a list item wrapped in a cloze
//! marker can still contain an image whose path is rewritten.

use crate::tree::Block;
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Replaces `outer` with `prefix`, the (recursively edited) `inner` text, then `suffix`.
pub struct Edit {
    /// Span removed from the output.
    pub outer: Range<usize>,
    /// Span inside `outer` whose text is kept.
    pub inner: Range<usize>,
    /// Text emitted before the kept span.
    pub prefix: String,
    /// Text emitted after the kept span.
    pub suffix: String,
}

impl Edit {
    #[must_use]
    /// Keeps `inner`, drops the rest of `outer`, and surrounds the kept text.
    pub fn wrap(
        outer: Range<usize>,
        inner: Range<usize>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            outer,
            inner,
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    #[must_use]
    /// Swaps a span for new text.
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            inner: range.end..range.end,
            outer: range,
            prefix: text.into(),
            suffix: String::new(),
        }
    }

    fn contains(&self, other: &Edit) -> bool {
        self != other && self.inner.start <= other.outer.start && other.outer.end <= self.inner.end
    }
}

#[derive(Clone, Debug, Default)]
/// Ordered collection of edits against one source snapshot.
pub struct EditPlan {
    /// Individual span rewrites; order of insertion does not matter.
    pub edits: Vec<Edit>,
}

impl EditPlan {
    /// Records an edit.
    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    #[must_use]
    /// Number of recorded edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    #[must_use]
    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    #[must_use]
    /// Source text of `range` with every edit inside it applied.
    ///
    /// Edits partially overlapping an earlier one are dropped.
    pub fn render(&self, source: &str, range: Range<usize>) -> String {
        let mut edits: Vec<&Edit> = self
            .edits
            .iter()
            .filter(|edit| range.start <= edit.outer.start && edit.outer.end <= range.end)
            .collect();
        edits.sort_by(|a, b| {
            a.outer
                .start
                .cmp(&b.outer.start)
                .then(b.outer.end.cmp(&a.outer.end))
        });
        render_range(source, range, &edits)
    }

    #[must_use]
    /// Serializes blocks back to markup, separated by blank lines.
    pub fn render_blocks(&self, source: &str, blocks: &[&Block]) -> String {
        blocks
            .iter()
            .map(|block| self.render(source, block.range.clone()))
            .map(|text| text.trim_end().to_string())
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn render_range(source: &str, range: Range<usize>, edits: &[&Edit]) -> String {
    let mut out = String::new();
    let mut pos = range.start;
    for (i, edit) in edits.iter().enumerate() {
        if edit.outer.start < pos {
            if edit.outer.end > pos {
                tracing::debug!(
                    "Dropping edit {:?} overlapping an earlier rewrite",
                    edit.outer
                );
            }
            continue;
        }
        out.push_str(&source[pos..edit.outer.start]);
        out.push_str(&edit.prefix);
        let nested: Vec<&Edit> = edits[i + 1..]
            .iter()
            .copied()
            .filter(|other| edit.contains(other))
            .collect();
        out.push_str(&render_range(source, edit.inner.clone(), &nested));
        out.push_str(&edit.suffix);
        pos = edit.outer.end;
    }
    out.push_str(&source[pos..range.end]);
    out
}

#[cfg(test)]
#[path = "tests/edit_plan.rs"]
mod tests;
