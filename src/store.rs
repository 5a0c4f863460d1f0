//! The flashcard collection the synchronizer writes into.
//!
//! The host application's store is reached only through [`CollectionStore`]. Two backends ship
//! with the crate: [`memory::MemoryCollection`] keeps everything in memory (tests and dry runs),
//! and [`json::JsonCollection`] keeps a `collection.json` file plus a media folder on disk.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod json;
pub mod memory;

/// Smallest identifier with the required 13 digits.
const MIN_NOTE_ID: i64 = 1_000_000_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier of a created record: a 13-digit creation time in milliseconds.
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:013}", self.0)
    }
}

impl NoteId {
    #[must_use]
    /// An identifier from the current time, strictly after `last`.
    pub fn after(last: Option<Self>) -> Self {
        let now = chrono::Utc::now().timestamp_millis().max(MIN_NOTE_ID);
        match last {
            Some(Self(previous)) if previous >= now => Self(previous + 1),
            _ => Self(now),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Handle to a record type in a collection.
pub struct RecordTypeId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Handle to a deck in a collection.
pub struct DeckId(pub u64);

/// Failures reported by a collection backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing files failed.
    #[error("collection I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The collection file could not be encoded or decoded.
    #[error("collection file {} is corrupt: {source}", path.display())]
    Format {
        /// Collection file path.
        path: PathBuf,
        /// Decoder diagnostic.
        #[source]
        source: serde_json::Error,
    },
    /// A handle did not refer to anything in this collection.
    #[error("unknown {kind} handle {id}")]
    UnknownHandle {
        /// Which kind of handle.
        kind: &'static str,
        /// Raw handle value.
        id: u64,
    },
    /// A record was given the wrong number of fields for its type.
    #[error("record type `{record_type}` has {expected} fields, got {got}")]
    FieldCount {
        /// Record type name.
        record_type: String,
        /// Fields the type declares.
        expected: usize,
        /// Fields supplied.
        got: usize,
    },
    /// An asset path has no usable file name.
    #[error("asset {} has no file name", .0.display())]
    AssetName(PathBuf),
}

impl StoreError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Operations the synchronizer needs from the host's collection.
pub trait CollectionStore {
    /// Handle of the record type called `name`, creating it with `fields` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist a new record type.
    fn find_or_create_record_type(
        &mut self,
        name: &str,
        fields: &[&str],
        cloze: bool,
    ) -> Result<RecordTypeId, StoreError>;

    /// Handle of the deck at `path` (segments joined with `::`), creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist a new deck.
    fn ensure_deck(&mut self, path: &str) -> Result<DeckId, StoreError>;

    /// Creates and persists one record, returning its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown, the field count is wrong, or persisting fails.
    fn create_record(
        &mut self,
        record_type: RecordTypeId,
        deck: DeckId,
        fields: Vec<String>,
        tags: Vec<String>,
    ) -> Result<NoteId, StoreError>;

    /// Whether an asset of this name is already registered.
    fn has_asset(&self, name: &str) -> bool;

    /// Registers the file at `file` under its own file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or stored.
    fn add_asset(&mut self, file: &Path) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A named set of fields records are made of.
pub struct RecordType {
    /// Handle.
    pub id: RecordTypeId,
    /// Display name, unique within the collection.
    pub name: String,
    /// Field names in order.
    pub fields: Vec<String>,
    /// Whether records of this type are cloze-style.
    pub cloze: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A deck records are placed in.
pub struct Deck {
    /// Handle.
    pub id: DeckId,
    /// Full path, segments joined with `::`.
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One flashcard record.
pub struct Record {
    /// Identifier, also written into the source marker.
    pub id: NoteId,
    /// Record type handle.
    pub record_type: RecordTypeId,
    /// Deck handle.
    pub deck: DeckId,
    /// Field values, in the record type's order.
    pub fields: Vec<String>,
    /// Tags.
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Contents of a collection, shared by the backends.
pub struct Collection {
    /// Known record types.
    pub record_types: Vec<RecordType>,
    /// Known decks.
    pub decks: Vec<Deck>,
    /// Records in creation order.
    pub records: Vec<Record>,
    /// Names of registered media assets.
    pub assets: BTreeSet<String>,
}

impl Collection {
    /// Looks up or appends a record type; the boolean is true when it was created.
    pub fn record_type(&mut self, name: &str, fields: &[&str], cloze: bool) -> (RecordTypeId, bool) {
        if let Some(existing) = self.record_types.iter().find(|rt| rt.name == name) {
            return (existing.id, false);
        }
        let id = RecordTypeId(self.record_types.len() as u64 + 1);
        self.record_types.push(RecordType {
            id,
            name: name.to_string(),
            fields: fields.iter().map(ToString::to_string).collect(),
            cloze,
        });
        (id, true)
    }

    /// Looks up or appends a deck; the boolean is true when it was created.
    pub fn deck(&mut self, name: &str) -> (DeckId, bool) {
        if let Some(existing) = self.decks.iter().find(|deck| deck.name == name) {
            return (existing.id, false);
        }
        let id = DeckId(self.decks.len() as u64 + 1);
        self.decks.push(Deck {
            id,
            name: name.to_string(),
        });
        (id, true)
    }

    /// Appends a record after checking its handles and field count.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is unknown or the field count does not match the type.
    pub fn add_record(
        &mut self,
        record_type: RecordTypeId,
        deck: DeckId,
        fields: Vec<String>,
        tags: Vec<String>,
    ) -> Result<NoteId, StoreError> {
        let rt = self
            .record_types
            .iter()
            .find(|rt| rt.id == record_type)
            .ok_or(StoreError::UnknownHandle {
                kind: "record type",
                id: record_type.0,
            })?;
        if rt.fields.len() != fields.len() {
            return Err(StoreError::FieldCount {
                record_type: rt.name.clone(),
                expected: rt.fields.len(),
                got: fields.len(),
            });
        }
        if !self.decks.iter().any(|d| d.id == deck) {
            return Err(StoreError::UnknownHandle {
                kind: "deck",
                id: deck.0,
            });
        }
        let last = self.records.iter().map(|record| record.id).max();
        let id = NoteId::after(last);
        self.records.push(Record {
            id,
            record_type,
            deck,
            fields,
            tags,
        });
        Ok(id)
    }

    #[must_use]
    /// The record with identifier `id`.
    pub fn record(&self, id: NoteId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    #[must_use]
    /// Name of a deck handle.
    pub fn deck_name(&self, id: DeckId) -> Option<&str> {
        self.decks
            .iter()
            .find(|deck| deck.id == id)
            .map(|deck| deck.name.as_str())
    }

    #[must_use]
    /// The record type behind a handle.
    pub fn record_type_by_id(&self, id: RecordTypeId) -> Option<&RecordType> {
        self.record_types.iter().find(|rt| rt.id == id)
    }
}

/// File name an asset is registered under.
pub(crate) fn asset_name(file: &Path) -> Result<String, StoreError> {
    file.file_name()
        .and_then(|name| name.to_str())
        .map(ToString::to_string)
        .ok_or_else(|| StoreError::AssetName(file.to_path_buf()))
}

#[cfg(test)]
#[path = "tests/store.rs"]
mod tests;
