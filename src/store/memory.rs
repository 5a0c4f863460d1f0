//! A collection held entirely in memory.

use super::{
    asset_name, Collection, CollectionStore, DeckId, NoteId, RecordTypeId, StoreError,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
/// In-memory backend; asset bytes are kept alongside the collection.
pub struct MemoryCollection {
    /// Collection contents.
    pub collection: Collection,
    /// Registered asset bytes by name.
    pub media: BTreeMap<String, Vec<u8>>,
}

impl MemoryCollection {
    #[must_use]
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectionStore for MemoryCollection {
    fn find_or_create_record_type(
        &mut self,
        name: &str,
        fields: &[&str],
        cloze: bool,
    ) -> Result<RecordTypeId, StoreError> {
        Ok(self.collection.record_type(name, fields, cloze).0)
    }

    fn ensure_deck(&mut self, path: &str) -> Result<DeckId, StoreError> {
        Ok(self.collection.deck(path).0)
    }

    fn create_record(
        &mut self,
        record_type: RecordTypeId,
        deck: DeckId,
        fields: Vec<String>,
        tags: Vec<String>,
    ) -> Result<NoteId, StoreError> {
        self.collection.add_record(record_type, deck, fields, tags)
    }

    fn has_asset(&self, name: &str) -> bool {
        self.collection.assets.contains(name)
    }

    fn add_asset(&mut self, file: &Path) -> Result<(), StoreError> {
        let name = asset_name(file)?;
        let bytes = fs::read(file).map_err(|e| StoreError::io(file, e))?;
        self.collection.assets.insert(name.clone());
        self.media.insert(name, bytes);
        Ok(())
    }
}
