//! kbjoin: synchronize a markdown knowledge base into a flashcard collection.
//!
//! Headings in the documents of a source tree become cloze records. The source documents stay the
//! record of truth: after a heading is converted, a `<!-- NoteId: … -->` comment is written below
//! it, and later passes skip every heading that carries one.
pub mod cloze;
pub mod config;
pub mod document;
pub mod edit_plan;
pub mod error;
pub mod formats;
pub mod input;
pub mod joint;
pub mod marker;
pub mod media;
pub mod render;
pub mod section;
pub mod store;
pub mod sync;
pub mod tree;

pub use error::{Error, Result};
