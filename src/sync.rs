//! The synchronization pass over a whole source tree.
//!
//! Documents are processed one at a time. For each, the text is rendered once; then every
//! trigger heading is checked for a marker, converted into a record if it has something to ask,
//! and marked in the source buffer right after the record is stored. The buffer is written back
//! once, after its last heading.

use crate::config::Config;
use crate::document::SourceDocument;
use crate::edit_plan::EditPlan;
use crate::error::{Error, Result};
use crate::input::{self, ImportTask};
use crate::joint::{self, Joint};
use crate::marker;
use crate::media::Localizer;
use crate::render::Renderer;
use crate::section::{self, ScopeMode};
use crate::store::{CollectionStore, DeckId, RecordTypeId};
use crate::tree::RenderedTree;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Lock file created in the root while a pass is running.
pub const LOCK_FILE: &str = ".kbjoin.lock";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Counts accumulated over a pass.
pub struct SyncReport {
    /// Records created.
    pub created: usize,
    /// Documents looked at.
    pub files_scanned: usize,
    /// Documents whose text was written back.
    pub files_updated: usize,
    /// Media files newly copied into the collection.
    pub assets_copied: usize,
}

impl SyncReport {
    #[must_use]
    /// The line shown to the user at the end of a pass.
    pub fn summary(&self) -> String {
        format!("{} notes imported.", self.created)
    }

    fn merge(&mut self, other: Self) {
        self.created += other.created;
        self.files_scanned += other.files_scanned;
        self.files_updated += other.files_updated;
        self.assets_copied += other.assets_copied;
    }
}

/// Whatever shows the outcome of a pass to the user.
pub trait Frontend {
    /// Displays the end-of-pass summary.
    fn show_summary(&mut self, summary: &str);
    /// Signals that the deck list may have changed.
    fn refresh_decks(&mut self);
}

/// Holds the lock file of a source tree for the lifetime of a pass.
struct RunGuard {
    path: PathBuf,
}

impl RunGuard {
    fn acquire(root: &Path) -> Result<Self> {
        let path = root.join(LOCK_FILE);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                writeln!(file, "{}", std::process::id()).map_err(|e| Error::io(&path, e))?;
                Ok(Self { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(Error::RunInProgress(path)),
            Err(e) => Err(Error::io(path, e)),
        }
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            tracing::warn!("Could not remove {}: {err}", self.path.display());
        }
    }
}

/// Runs passes over source trees into one collection.
pub struct Synchronizer<'a, S: CollectionStore + ?Sized> {
    config: &'a Config,
    store: &'a mut S,
    renderer: Renderer,
    dry_run: bool,
}

impl<'a, S: CollectionStore + ?Sized> Synchronizer<'a, S> {
    /// Prepare a synchronizer writing into `store`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Renderer`] if the markdown renderer cannot be built.
    pub fn new(config: &'a Config, store: &'a mut S) -> Result<Self> {
        Ok(Self {
            config,
            store,
            renderer: Renderer::new()?,
            dry_run: false,
        })
    }

    #[must_use]
    /// Leave source documents untouched; markers are computed but never written.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Synchronize every document under `root`.
    ///
    /// Documents that fail are logged and skipped; the rest of the pass carries on.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a source tree or another pass is running on it.
    pub fn run(&mut self, root: &Path) -> Result<SyncReport> {
        input::check_root(root, &self.config.root_marker)?;
        let _guard = RunGuard::acquire(root)?;
        let tasks = input::find_documents(root, self.config)?;
        tracing::info!("Found {} documents under {}", tasks.len(), root.display());

        let mut report = SyncReport::default();
        for task in &tasks {
            report.files_scanned += 1;
            match self.sync_file(task) {
                Ok(file_report) => report.merge(file_report),
                Err(err) => tracing::error!("Skipping {}: {err}", task.path.display()),
            }
        }
        tracing::info!(
            "Created {} records from {} documents ({} updated, {} images copied)",
            report.created,
            report.files_scanned,
            report.files_updated,
            report.assets_copied
        );
        Ok(report)
    }

    /// Synchronize one document, writing its markers back if any were added.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read, rendered or written, or the store fails.
    /// Markers for records created before a store failure are still written.
    pub fn sync_file(&mut self, task: &ImportTask) -> Result<SyncReport> {
        let mut doc = SourceDocument::open(&task.path)?;
        let tree = self.renderer.render(doc.text())?;
        let mut report = SyncReport::default();

        let declared = marker::note_type(&tree);
        let Some(joint) = Joint::for_document(
            &task.path,
            declared.as_deref(),
            &self.config.default_note_type,
        ) else {
            tracing::debug!("{}: no record type applies", task.path.display());
            return Ok(report);
        };

        let outcome = self.convert(task, &tree, joint, &mut doc, &mut report);
        if self.dry_run {
            if doc.is_dirty() {
                report.files_updated += 1;
                tracing::debug!("Would write markers into {}", task.path.display());
            }
        } else if doc.flush()? {
            report.files_updated += 1;
            tracing::debug!("Wrote markers into {}", task.path.display());
        }
        outcome.map(|()| report)
    }

    fn convert(
        &mut self,
        task: &ImportTask,
        tree: &RenderedTree,
        joint: Joint,
        doc: &mut SourceDocument,
        report: &mut SyncReport,
    ) -> Result<()> {
        let config = self.config;
        let mode = if config.flat_sections {
            ScopeMode::Flat
        } else {
            ScopeMode::Nested
        };
        let localizer = Localizer {
            doc_dir: task.path.parent().unwrap_or_else(|| Path::new(".")),
            deck: &task.deck,
            separator: &config.media_separator,
        };
        let mut handles: Option<(RecordTypeId, DeckId)> = None;

        for section in section::segment(tree, |level| config.triggers(level), mode) {
            let trail = section.trail_string(&config.trail_separator);
            if let Some(id) = marker::already_imported(tree, section.heading_index) {
                tracing::debug!("`{trail}` already imported as {id}");
                continue;
            }
            let mut plan = EditPlan::default();
            if !joint.prepare(&section, tree, &mut plan) {
                tracing::debug!("`{trail}` has nothing to ask, skipping");
                continue;
            }
            for scope in [&section.text, &section.extra] {
                report.assets_copied +=
                    localizer.localize(scope, &tree.source, &mut *self.store, &mut plan);
            }

            let (record_type, deck) = match handles {
                Some(handles) => handles,
                None => {
                    let record_type = self.store.find_or_create_record_type(
                        joint.record_type(),
                        &joint.fields(),
                        joint.is_cloze(),
                    )?;
                    let deck = self.store.ensure_deck(&task.deck.to_string())?;
                    *handles.insert((record_type, deck))
                }
            };
            let id = self.store.create_record(
                record_type,
                deck,
                joint.field_values(&section, tree, &plan, config),
                joint::tags(&section, config),
            )?;
            report.created += 1;
            tracing::debug!("`{trail}` imported as {id}");

            if let Err(err) = marker::mark_imported(doc, section.heading, section.label(), id) {
                tracing::error!("Record {id} created but its marker was not written: {err}");
            }
        }
        Ok(())
    }
}

/// Runs one pass and reports its outcome to `frontend`.
///
/// # Errors
///
/// Returns an error if the pass cannot start; see [`Synchronizer::run`].
pub fn run<S, F>(
    root: &Path,
    config: &Config,
    store: &mut S,
    frontend: &mut F,
) -> Result<SyncReport>
where
    S: CollectionStore + ?Sized,
    F: Frontend + ?Sized,
{
    let report = Synchronizer::new(config, store)?.run(root)?;
    frontend.show_summary(&report.summary());
    frontend.refresh_decks();
    Ok(report)
}

#[cfg(test)]
#[path = "tests/sync.rs"]
mod tests;
