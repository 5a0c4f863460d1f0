//! Section extraction from a rendered document.
//!
//! A section is the content owned by one heading: the sibling blocks after it, up to the next
//! heading of equal or higher priority or a thematic break. Direct block quotes become the
//! "extra" scope and everything else the "text" scope. The root trail names the heading together
//! with its ancestors so a record can be traced back to its place in the document.

use crate::tree::{Block, BlockKind, RenderedTree};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Where a section's scope ends.
pub enum ScopeMode {
    /// At the next heading of equal or higher priority; subsections stay in scope.
    #[default]
    Nested,
    /// At the next heading of any level.
    Flat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One step of a root trail.
pub struct TrailEntry {
    /// Heading level of this step.
    pub level: u8,
    /// Heading text.
    pub label: String,
}

#[derive(Clone, Debug)]
/// The content owned by one heading.
pub struct Section<'t> {
    /// Index of the originating heading in the tree's block list.
    pub heading_index: usize,
    /// The originating heading block.
    pub heading: &'t Block,
    /// Ancestor headings followed by the section's own heading.
    pub trail: Vec<TrailEntry>,
    /// Blocks that are not quotes.
    pub text: Vec<&'t Block>,
    /// Block quotes directly in scope.
    pub extra: Vec<&'t Block>,
}

impl<'t> Section<'t> {
    #[must_use]
    /// Computes the section of the heading at `heading_index`.
    ///
    /// Returns `None` when that block is not a heading.
    pub fn extract(tree: &'t RenderedTree, heading_index: usize, mode: ScopeMode) -> Option<Self> {
        let heading = tree.blocks.get(heading_index)?;
        let BlockKind::Heading(own) = &heading.kind else {
            return None;
        };

        let mut text = Vec::new();
        let mut extra = Vec::new();
        for block in &tree.blocks[heading_index + 1..] {
            match &block.kind {
                BlockKind::Heading(next) if mode == ScopeMode::Flat || next.level <= own.level => {
                    break;
                }
                BlockKind::Rule => break,
                BlockKind::Quote(_) => extra.push(block),
                BlockKind::Comment(_) => {}
                _ => text.push(block),
            }
        }

        Some(Self {
            heading_index,
            heading,
            trail: root_trail(tree, heading_index),
            text,
            extra,
        })
    }

    #[must_use]
    /// Heading level of the section.
    pub fn level(&self) -> u8 {
        self.trail.last().map_or(0, |entry| entry.level)
    }

    #[must_use]
    /// The section's own heading text.
    pub fn label(&self) -> &str {
        self.trail.last().map_or("", |entry| entry.label.as_str())
    }

    #[must_use]
    /// Trail labels joined with a separator.
    pub fn trail_string(&self, separator: &str) -> String {
        self.trail
            .iter()
            .map(|entry| entry.label.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    #[must_use]
    /// Whether neither scope holds any block.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.extra.is_empty()
    }
}

#[must_use]
/// Ancestor labels of the heading at `index`, ending with its own label.
///
/// Walks backwards through preceding siblings; each heading more significant than every one
/// collected so far is an ancestor. Levels with no heading are skipped.
pub fn root_trail(tree: &RenderedTree, index: usize) -> Vec<TrailEntry> {
    let Some(own) = tree.heading(index) else {
        return Vec::new();
    };
    let mut trail = vec![TrailEntry {
        level: own.level,
        label: own.label.clone(),
    }];
    let mut bound = own.level;
    for block in tree.blocks[..index].iter().rev() {
        if bound <= 1 {
            break;
        }
        if let BlockKind::Heading(heading) = &block.kind {
            if heading.level < bound {
                bound = heading.level;
                trail.push(TrailEntry {
                    level: heading.level,
                    label: heading.label.clone(),
                });
            }
        }
    }
    trail.reverse();
    trail
}

/// Lazy sequence of the sections of one rendered document.
pub struct Segments<'t, F> {
    tree: &'t RenderedTree,
    wanted: F,
    mode: ScopeMode,
    next: usize,
}

impl<'t, F: Fn(usize) -> bool> Iterator for Segments<'t, F> {
    type Item = Section<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.tree.blocks.len() {
            let index = self.next;
            self.next += 1;
            match self.tree.heading(index) {
                Some(heading) if (self.wanted)(usize::from(heading.level)) => {
                    return Section::extract(self.tree, index, self.mode);
                }
                _ => {}
            }
        }
        None
    }
}

/// Sections for every heading whose level satisfies `wanted`, in document order.
///
/// Calling it again restarts from the top of the document.
pub fn segment<F: Fn(usize) -> bool>(
    tree: &RenderedTree,
    wanted: F,
    mode: ScopeMode,
) -> Segments<'_, F> {
    Segments {
        tree,
        wanted,
        mode,
        next: 0,
    }
}

#[cfg(test)]
#[path = "tests/section.rs"]
mod tests;
