//! Format trait and implementations for different document types.
//!
//! This module defines the `Format` trait which abstracts over document formats by providing
//! the tree-sitter language and the query that locates heading nodes in it.

pub mod markdown;

/// Tree-sitter grammar and heading query for one document format.
pub trait Format {
    /// Block-level grammar used to parse documents of this format.
    fn language(&self) -> tree_sitter::Language;
    /// Query capturing every heading node as `@heading`.
    fn section_query(&self) -> &str;
    /// Heading level encoded by a heading node, if it is one.
    fn heading_level(&self, node: &tree_sitter::Node) -> Option<u8>;
}
