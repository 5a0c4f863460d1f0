//! Configuration to acknowledge knowledge-base conventions as well as set defaults.
//!
//! Specifically, we try to find a kbjoin.toml, and if present we load settings from there.
//! This provides trigger heading levels, directory depth rules, marker names and separators.
//! The resulting value is handed to the synchronizer explicitly; nothing reads it globally.

use crate::error::{Error, Result};
use facet::Facet;
use std::fs;
use std::path::Path;

/// File looked up in the working directory by [`Config::load`].
pub const CONFIG_FILE: &str = "kbjoin.toml";

#[derive(Facet, Clone, Debug)]
/// Conversion preferences loaded from kbjoin.toml or falling back to defaults.
pub struct Config {
    #[facet(default = vec![1, 2, 3])]
    /// Heading levels whose sections become records.
    pub trigger_levels: Vec<usize>,
    #[facet(default = 2)]
    /// Directories shallower than this (relative to the root) never import their own files.
    pub min_depth: usize,
    #[facet(default = ".root".to_string())]
    /// Entry that must exist directly under a valid source tree root.
    pub root_marker: String,
    #[facet(default = vec!["md".to_string()])]
    /// File suffixes to match when scanning directories.
    pub file_extensions: Vec<String>,
    #[facet(default = ".".to_string())]
    /// Joins the labels of a root trail into the `root` field.
    pub trail_separator: String,
    #[facet(default = ".".to_string())]
    /// Joins deck segments and the basename into a flattened media name.
    pub media_separator: String,
    #[facet(default = vec!["⭐".to_string(), ":star:".to_string()])]
    /// Leading tokens on a heading label that flag the record as marked.
    pub marked_glyphs: Vec<String>,
    #[facet(default = "marked".to_string())]
    /// Tag given to records whose trail carries a marking glyph.
    pub marked_tag: String,
    #[facet(default = "cloze".to_string())]
    /// Record type used when a document declares none; empty disables the fallback.
    pub default_note_type: String,
    #[facet(default = false)]
    /// Stop every section at the next heading of any level.
    pub flat_sections: bool,
}

impl Default for Config {
    fn default() -> Self {
        facet_toml::from_str::<Self>("").expect("empty configuration uses field defaults")
    }
}

impl Config {
    #[must_use]
    /// Load configuration from kbjoin.toml if present.
    ///
    /// An unreadable or malformed file falls back to the defaults; use [`Config::from_file`]
    /// when a broken file should be reported instead.
    pub fn load() -> Self {
        if let Ok(contents) = fs::read_to_string(CONFIG_FILE) {
            if let Ok(config) = Self::parse(&contents) {
                return config;
            }
            tracing::warn!("Ignoring malformed {CONFIG_FILE}, using defaults");
        }
        Self::default()
    }

    /// Load configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid configuration.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&contents).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the parser diagnostic if the text is not valid configuration.
    pub fn parse(contents: &str) -> std::result::Result<Self, String> {
        facet_toml::from_str::<Self>(contents).map_err(|e| e.to_string())
    }

    #[must_use]
    /// Whether headings of this level produce records.
    pub fn triggers(&self, level: usize) -> bool {
        self.trigger_levels.contains(&level)
    }

    #[must_use]
    /// Whether a label begins with one of the marking glyphs.
    pub fn is_marked(&self, label: &str) -> bool {
        let label = label.trim_start();
        self.marked_glyphs
            .iter()
            .any(|glyph| !glyph.is_empty() && label.starts_with(glyph.as_str()))
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
