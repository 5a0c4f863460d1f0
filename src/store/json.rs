//! A collection stored as a JSON file with a media folder next to it.
//!
//! Every mutation rewrites `collection.json` through a temporary file in the same directory that
//! is then renamed over the old one, so a record is on disk before its marker reaches the source.

use super::{
    asset_name, Collection, CollectionStore, DeckId, NoteId, RecordTypeId, StoreError,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the collection file inside the collection directory.
pub const COLLECTION_FILE: &str = "collection.json";
/// Name of the media folder inside the collection directory.
pub const MEDIA_DIR: &str = "media";

#[derive(Debug)]
/// File-backed backend rooted at one directory.
pub struct JsonCollection {
    dir: PathBuf,
    collection: Collection,
}

impl JsonCollection {
    /// Open the collection in `dir`, creating the directory layout if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the collection file is unreadable.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        let media = dir.join(MEDIA_DIR);
        fs::create_dir_all(&media).map_err(|e| StoreError::io(&media, e))?;
        let path = dir.join(COLLECTION_FILE);
        let collection = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            serde_json::from_str(&text).map_err(|source| StoreError::Format {
                path: path.clone(),
                source,
            })?
        } else {
            Collection::default()
        };
        tracing::debug!(
            "Opened collection at {} with {} records",
            dir.display(),
            collection.records.len()
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            collection,
        })
    }

    #[must_use]
    /// Collection contents as last persisted.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    #[must_use]
    /// Folder holding registered assets.
    pub fn media_dir(&self) -> PathBuf {
        self.dir.join(MEDIA_DIR)
    }

    /// Atomically replaces the collection file with the current contents.
    fn persist(&self) -> Result<(), StoreError> {
        let path = self.dir.join(COLLECTION_FILE);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, &self.collection).map_err(|source| {
            StoreError::Format {
                path: path.clone(),
                source,
            }
        })?;
        tmp.write_all(b"\n").map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;
        Ok(())
    }
}

impl CollectionStore for JsonCollection {
    fn find_or_create_record_type(
        &mut self,
        name: &str,
        fields: &[&str],
        cloze: bool,
    ) -> Result<RecordTypeId, StoreError> {
        let (id, created) = self.collection.record_type(name, fields, cloze);
        if created {
            self.persist()?;
        }
        Ok(id)
    }

    fn ensure_deck(&mut self, path: &str) -> Result<DeckId, StoreError> {
        let (id, created) = self.collection.deck(path);
        if created {
            self.persist()?;
        }
        Ok(id)
    }

    fn create_record(
        &mut self,
        record_type: RecordTypeId,
        deck: DeckId,
        fields: Vec<String>,
        tags: Vec<String>,
    ) -> Result<NoteId, StoreError> {
        let id = self.collection.add_record(record_type, deck, fields, tags)?;
        if let Err(err) = self.persist() {
            self.collection.records.pop();
            return Err(err);
        }
        Ok(id)
    }

    fn has_asset(&self, name: &str) -> bool {
        self.collection.assets.contains(name)
    }

    fn add_asset(&mut self, file: &Path) -> Result<(), StoreError> {
        let name = asset_name(file)?;
        let target = self.media_dir().join(&name);
        fs::copy(file, &target).map_err(|e| StoreError::io(file, e))?;
        self.collection.assets.insert(name);
        self.persist()
    }
}
