//! Record-type variants: how a section turns into the fields of a record.
//!
//! Each variant names its record type and field list, decides whether a section is worth a
//! record, and builds the field values from the section's scopes. A document picks its variant
//! from a `NoteType` declaration, a `[cloze]`-style tag in its file name, or the configured
//! default, in that order.

use crate::cloze;
use crate::config::Config;
use crate::edit_plan::EditPlan;
use crate::section::Section;
use crate::tree::RenderedTree;
use std::path::Path;

/// Trace fields of the cloze record type, one per heading level.
const TRACE_FIELDS: [&str; 6] = [
    "Chapter",
    "Section",
    "Subsection",
    "Subsubsection",
    "Paragraph",
    "Subparagraph",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A way of turning sections into records.
pub enum Joint {
    /// Fill-in-the-blank records with a trace back to the heading.
    Cloze,
    /// Plain question/answer records: the trail asks, the section answers.
    Oneside,
}

impl Joint {
    /// Every variant, in detection priority order.
    pub const ALL: [Self; 2] = [Self::Cloze, Self::Oneside];

    #[must_use]
    /// Short name used in declarations and file name tags.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cloze => "cloze",
            Self::Oneside => "oneside",
        }
    }

    #[must_use]
    /// Record type created in the collection.
    pub fn record_type(self) -> &'static str {
        match self {
            Self::Cloze => "Cloze (traceable)",
            Self::Oneside => "Oneside",
        }
    }

    #[must_use]
    /// Field names of the record type.
    pub fn fields(self) -> Vec<&'static str> {
        match self {
            Self::Cloze => ["root", "Text", "Extra"]
                .into_iter()
                .chain(TRACE_FIELDS)
                .collect(),
            Self::Oneside => vec!["Front", "Back"],
        }
    }

    #[must_use]
    /// Whether the record type is cloze-style.
    pub fn is_cloze(self) -> bool {
        self == Self::Cloze
    }

    #[must_use]
    /// Whether a declared type name refers to this variant.
    pub fn matches(self, declared: &str) -> bool {
        let declared = declared.trim();
        declared.eq_ignore_ascii_case(self.name())
            || declared.eq_ignore_ascii_case(self.record_type())
    }

    #[must_use]
    /// Variant named by a declaration.
    pub fn from_name(declared: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|joint| joint.matches(declared))
    }

    #[must_use]
    /// Variant tagged in a file name such as `notes[oneside].md`.
    pub fn from_file_name(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let tag = stem.strip_suffix(']')?.rsplit_once('[')?.1;
        Self::from_name(tag)
    }

    #[must_use]
    /// Variant for a document: its declaration, then its file name, then the default.
    ///
    /// Returns `None` when nothing applies, so the document is not imported.
    pub fn for_document(path: &Path, declared: Option<&str>, default: &str) -> Option<Self> {
        if let Some(declared) = declared {
            match Self::from_name(declared) {
                Some(joint) => return Some(joint),
                None => tracing::warn!(
                    "{}: unknown NoteType `{declared}`, looking further",
                    path.display()
                ),
            }
        }
        Self::from_file_name(path).or_else(|| {
            if default.is_empty() {
                None
            } else {
                Self::from_name(default)
            }
        })
    }

    /// Decides whether a section becomes a record, recording any rewrites it needs.
    ///
    /// For cloze records this selects and marks the deletions; a section without any is skipped.
    pub fn prepare(self, section: &Section, tree: &RenderedTree, plan: &mut EditPlan) -> bool {
        match self {
            Self::Cloze => {
                cloze::select_and_mark(&section.text, &tree.source, tree.has_math, plan) > 0
            }
            Self::Oneside => !section.text.is_empty(),
        }
    }

    #[must_use]
    /// Field values for a prepared section, in the order of [`Joint::fields`].
    pub fn field_values(
        self,
        section: &Section,
        tree: &RenderedTree,
        plan: &EditPlan,
        config: &Config,
    ) -> Vec<String> {
        let root = section.trail_string(&config.trail_separator);
        let text = plan.render_blocks(&tree.source, &section.text);
        let extra = plan.render_blocks(&tree.source, &section.extra);
        match self {
            Self::Cloze => {
                let mut values = vec![root, text, extra];
                values.extend((1..=TRACE_FIELDS.len()).map(|level| {
                    section
                        .trail
                        .iter()
                        .find(|entry| usize::from(entry.level) == level)
                        .map(|entry| entry.label.clone())
                        .unwrap_or_default()
                }));
                values
            }
            Self::Oneside => {
                let back = [text, extra]
                    .into_iter()
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                vec![root, back]
            }
        }
    }
}

#[must_use]
/// Tags for a section's record: the marked tag when any trail label starts with a marking glyph.
pub fn tags(section: &Section, config: &Config) -> Vec<String> {
    let marked = section.trail.iter().any(|entry| config.is_marked(&entry.label));
    if marked && !config.marked_tag.is_empty() {
        vec![config.marked_tag.clone()]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
#[path = "tests/joint.rs"]
mod tests;
