//! The raw source buffer of one document during a synchronization pass.
//!
//! The rendered tree is computed once from a snapshot of this buffer, so its line numbers go
//! stale as soon as a marker is inserted. We keep track of the cumulative number of lines added
//! above each position so that later insertions land at the right offset without re-rendering.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A mutable text buffer tied to a file on disk.
pub struct SourceDocument {
    path: PathBuf,
    text: String,
    /// Lines inserted after each original (snapshot) line.
    inserted: BTreeMap<usize, usize>,
    dirty: bool,
}

impl SourceDocument {
    /// Read a document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8 text.
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::from_text(path, text))
    }

    #[must_use]
    /// Wrap text that came from `path`.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            inserted: BTreeMap::new(),
            dirty: false,
        }
    }

    #[must_use]
    /// File the buffer belongs to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    /// Current buffer contents.
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    /// Whether the buffer differs from what was read.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    /// Calculates where a snapshot line sits now, after earlier insertions.
    ///
    /// Sums the lines inserted after every snapshot line above `line`.
    pub fn current_line(&self, line: usize) -> usize {
        line + self.inserted.range(..line).map(|(_, count)| count).sum::<usize>()
    }

    #[must_use]
    /// Text of a line in the current buffer, without its terminator.
    pub fn line(&self, current: usize) -> Option<&str> {
        self.text.split('\n').nth(current)
    }

    /// Insert lines after snapshot line `line`.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has fewer lines than `line`.
    pub fn insert_after(&mut self, line: usize, lines: &[String]) -> Result<()> {
        let current = self.current_line(line);
        let mut offset = self.offset_after(current).ok_or_else(|| Error::Document {
            path: self.path.clone(),
            message: format!("line {} is past the end of the document", line + 1),
        })?;
        if offset == self.text.len() && !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
            offset = self.text.len();
        }
        let mut block = String::new();
        for inserted in lines {
            block.push_str(inserted);
            block.push('\n');
        }
        self.text.insert_str(offset, &block);
        *self.inserted.entry(line).or_default() += lines.len();
        self.dirty = true;
        Ok(())
    }

    /// Write the buffer back to disk if it changed.
    ///
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn flush(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        fs::write(&self.path, &self.text).map_err(|e| Error::io(&self.path, e))?;
        self.dirty = false;
        Ok(true)
    }

    /// Byte offset just past the terminator of line `current`.
    fn offset_after(&self, current: usize) -> Option<usize> {
        let mut start = 0;
        for _ in 0..current {
            start += self.text[start..].find('\n')? + 1;
        }
        if start > self.text.len() {
            return None;
        }
        Some(match self.text[start..].find('\n') {
            Some(newline) => start + newline + 1,
            None => self.text.len(),
        })
    }
}

#[cfg(test)]
#[path = "tests/document.rs"]
mod tests;
