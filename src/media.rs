//! Media localization: copying referenced images into the collection under flattened names.
//!
//! Images are looked up relative to the document that references them. Each file is stored once
//! under the deck segments and its basename joined together, so `a/b/fig.png` next to a note in
//! deck `a::b` becomes `a.b.fig.png`. The reference itself is rewritten to the flattened name
//! every time, whether or not the copy was new.

use crate::edit_plan::{Edit, EditPlan};
use crate::error::{Error, Result};
use crate::input::DeckPath;
use crate::store::CollectionStore;
use crate::tree::{Block, BlockKind, Inline, InlineKind};
use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tempfile::TempDir;

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid scheme pattern"));

#[must_use]
/// Whether a destination points outside the filesystem.
pub fn is_external(destination: &str) -> bool {
    let lower = destination.to_ascii_lowercase();
    SCHEME.is_match(destination) || lower.starts_with("data:") || lower.starts_with("mailto:")
}

#[must_use]
/// Byte spans of every image destination in the blocks, at any depth.
pub fn image_destinations(blocks: &[&Block]) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    for block in blocks {
        collect_block(block, &mut out);
    }
    out
}

fn collect_block(block: &Block, out: &mut Vec<Range<usize>>) {
    match &block.kind {
        BlockKind::Paragraph(inlines) => collect_inlines(inlines, out),
        BlockKind::Quote(blocks) => blocks.iter().for_each(|b| collect_block(b, out)),
        BlockKind::List(items) => items
            .iter()
            .flat_map(|item| &item.blocks)
            .for_each(|b| collect_block(b, out)),
        BlockKind::Table(table) => table
            .header
            .iter()
            .chain(table.rows.iter().flatten())
            .for_each(|cell| collect_inlines(&cell.children, out)),
        _ => {}
    }
}

fn collect_inlines(inlines: &[Inline], out: &mut Vec<Range<usize>>) {
    for inline in inlines {
        match &inline.kind {
            InlineKind::Image {
                destination: Some(range),
            } => out.push(range.clone()),
            other => collect_inlines(other.children(), out),
        }
    }
}

/// Where references are resolved and how stored names are built.
pub struct Localizer<'a> {
    /// Directory of the referencing document.
    pub doc_dir: &'a Path,
    /// Deck of the referencing document.
    pub deck: &'a DeckPath,
    /// Joins deck segments and the basename.
    pub separator: &'a str,
}

impl Localizer<'_> {
    #[must_use]
    /// Stored name for a file referenced from this document.
    pub fn flattened_name(&self, file: &Path) -> Option<String> {
        let base = file.file_name()?.to_str()?;
        let mut parts: Vec<&str> = self.deck.segments().iter().map(String::as_str).collect();
        parts.push(base);
        Some(parts.join(self.separator))
    }

    fn resolve(&self, destination: &str) -> PathBuf {
        self.doc_dir.join(destination)
    }

    /// Copies the images referenced in `blocks` into the store and records path rewrites.
    ///
    /// Missing files and failed copies are logged and left as they are. Returns the number of
    /// assets newly added to the store.
    pub fn localize<S: CollectionStore + ?Sized>(
        &self,
        blocks: &[&Block],
        source: &str,
        store: &mut S,
        plan: &mut EditPlan,
    ) -> usize {
        let mut copied = 0;
        for range in image_destinations(blocks) {
            let raw = source[range.clone()].trim();
            let destination = raw
                .strip_prefix('<')
                .and_then(|inner| inner.strip_suffix('>'))
                .unwrap_or(raw);
            if destination.is_empty() || is_external(destination) {
                continue;
            }
            let file = self.resolve(destination);
            if !file.is_file() {
                tracing::warn!("Image {} not found, leaving reference as is", file.display());
                continue;
            }
            let Some(name) = self.flattened_name(&file) else {
                tracing::warn!("Image {} has no usable file name", file.display());
                continue;
            };
            if !store.has_asset(&name) {
                match copy_into(store, &file, &name) {
                    Ok(()) => copied += 1,
                    Err(err) => {
                        tracing::warn!("Could not store image {}: {err}", file.display());
                        continue;
                    }
                }
            }
            let rewritten = if name.contains(char::is_whitespace) {
                format!("<{name}>")
            } else {
                name
            };
            plan.push(Edit::replace(range, rewritten));
        }
        copied
    }
}

/// Stages a copy named `name` in a temporary directory and hands it to the store.
fn copy_into<S: CollectionStore + ?Sized>(
    store: &mut S,
    file: &Path,
    name: &str,
) -> Result<()> {
    let staging = TempDir::new().map_err(|e| Error::io(std::env::temp_dir(), e))?;
    let staged = staging.path().join(name);
    fs::copy(file, &staged).map_err(|e| Error::io(file, e))?;
    store.add_asset(&staged)?;
    tracing::debug!("Stored image {} as {name}", file.display());
    Ok(())
}

#[cfg(test)]
#[path = "tests/media.rs"]
mod tests;
