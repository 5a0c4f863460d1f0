//! Idempotency markers written back into source documents.
//!
//! A heading that has been turned into a record is followed by a comment of the form
//! `<!-- NoteId: 1234567890123 -->`. A comment at the very top of a document may declare the
//! record type for the whole file with `<!-- NoteType: cloze -->`.

use crate::document::SourceDocument;
use crate::error::{Error, Result};
use crate::store::NoteId;
use crate::tree::{Block, BlockKind, RenderedTree};
use regex::Regex;
use std::sync::LazyLock;

static NOTE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*NoteId:\s*(?P<id>[0-9]{13})\s*$").expect("valid NoteId pattern")
});

static NOTE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*NoteType:\s*(?P<name>\S.*?)\s*$").expect("valid NoteType pattern")
});

#[must_use]
/// Parses the inner text of a comment as a record marker.
pub fn parse_note_id(comment: &str) -> Option<NoteId> {
    let captures = NOTE_ID.captures(comment)?;
    captures["id"].parse().ok().map(NoteId)
}

#[must_use]
/// Identifier recorded for the heading at `heading_index`, if it was imported before.
///
/// Only the block directly after the heading is inspected.
pub fn already_imported(tree: &RenderedTree, heading_index: usize) -> Option<NoteId> {
    let BlockKind::Comment(comment) = &tree.blocks.get(heading_index + 1)?.kind else {
        return None;
    };
    let id = parse_note_id(comment);
    if id.is_none() && comment.to_lowercase().contains("noteid") {
        tracing::warn!("Ignoring malformed marker comment `{comment}`");
    }
    id
}

#[must_use]
/// Record type declared by the document's leading comment.
pub fn note_type(tree: &RenderedTree) -> Option<String> {
    let BlockKind::Comment(comment) = &tree.blocks.first()?.kind else {
        return None;
    };
    let name = NOTE_TYPE
        .captures(comment)
        .map(|captures| captures["name"].to_string());
    if name.is_none() && comment.to_lowercase().contains("notetype") {
        tracing::warn!("Ignoring malformed record type declaration `{comment}`");
    }
    name
}

#[must_use]
/// The comment line recording `id`.
pub fn marker_comment(id: NoteId) -> String {
    format!("<!-- NoteId: {id} -->")
}

/// Writes the marker for `id` below a heading block of the rendered snapshot.
///
/// The heading is located by its snapshot line, shifted by anything already inserted above it.
///
/// # Errors
///
/// Returns [`Error::Document`] if the line found there no longer holds the heading label.
pub fn mark_imported(
    doc: &mut SourceDocument,
    heading: &Block,
    label: &str,
    id: NoteId,
) -> Result<()> {
    // A setext label spans several lines; each must still sit on its own line.
    let current = doc.current_line(heading.line);
    for (offset, part) in label.lines().enumerate() {
        let found = doc.line(current + offset).unwrap_or_default();
        if !found.contains(part.trim()) {
            return Err(Error::Document {
                path: doc.path().to_path_buf(),
                message: format!(
                    "expected heading `{}` at line {}, found `{found}`",
                    part.trim(),
                    current + offset + 1
                ),
            });
        }
    }

    let next_blank = doc
        .line(doc.current_line(heading.end_line) + 1)
        .is_none_or(|line| line.trim().is_empty());
    let mut lines = vec![String::new(), marker_comment(id)];
    if !next_blank {
        lines.push(String::new());
    }
    doc.insert_after(heading.end_line, &lines)
}

#[cfg(test)]
#[path = "tests/marker.rs"]
mod tests;
