//! Locating the documents of a source tree.
//!
//! A source tree is a directory carrying a sentinel entry (`.root` by default). Documents are
//! found depth-first in lexical order, hidden entries are pruned together with their subtrees,
//! and each document is paired with the deck derived from its directory.

use crate::config::Config;
use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Separator between deck segments in rendered deck names.
pub const DECK_SEPARATOR: &str = "::";

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Deck derived from a directory's position below the source tree root.
pub struct DeckPath(Vec<String>);

impl DeckPath {
    #[must_use]
    /// The deck of a directory given relative to the root.
    pub fn from_relative(dir: &Path) -> Self {
        Self(
            dir.components()
                .map(|part| part.as_os_str().to_string_lossy().into_owned())
                .collect(),
        )
    }

    #[must_use]
    /// Directory names from the root down.
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for DeckPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(DECK_SEPARATOR))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One document to synchronize.
pub struct ImportTask {
    /// Document path.
    pub path: PathBuf,
    /// Deck its records go to.
    pub deck: DeckPath,
}

/// Checks that `root` is a source tree root.
///
/// # Errors
///
/// Returns [`Error::NotSourceTree`] if the sentinel entry is missing.
pub fn check_root(root: &Path, marker: &str) -> Result<()> {
    if root.join(marker).exists() {
        Ok(())
    } else {
        Err(Error::NotSourceTree {
            root: root.to_path_buf(),
            marker: marker.to_string(),
        })
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

/// Find the documents under `root`, in lexical depth-first order.
///
/// Files in directories shallower than `config.min_depth` are passed over. Entries that cannot
/// be read are logged and skipped.
///
/// # Errors
///
/// Returns [`Error::NotSourceTree`] if `root` lacks the sentinel entry.
pub fn find_documents(root: &Path, config: &Config) -> Result<Vec<ImportTask>> {
    check_root(root, &config.root_marker)?;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy()));

    let mut tasks = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("Skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_extension(entry.path(), &config.file_extensions) {
            continue;
        }
        // the file itself sits one level below its directory
        if entry.depth() <= config.min_depth {
            tracing::debug!("Not importing {} (above minimum depth)", entry.path().display());
            continue;
        }
        let Some(dir) = entry
            .path()
            .parent()
            .and_then(|parent| parent.strip_prefix(root).ok())
        else {
            continue;
        };
        tasks.push(ImportTask {
            path: entry.path().to_path_buf(),
            deck: DeckPath::from_relative(dir),
        });
    }
    Ok(tasks)
}

#[cfg(test)]
#[path = "tests/input.rs"]
mod tests;
