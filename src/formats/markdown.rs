//! Markdown format implementation using tree-sitter-md.
//!
//! This module provides tree-sitter queries for parsing markdown documents and extracting
//! heading structure from ATX-style (# syntax) and setext-style (underlined) headings.

use crate::formats::Format;

/// Tree-sitter queries for markdown headings.
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_md::LANGUAGE.into()
    }

    fn section_query(&self) -> &'static str {
        "[(atx_heading) (setext_heading)] @heading"
    }

    fn heading_level(&self, node: &tree_sitter::Node) -> Option<u8> {
        let mut cursor = node.walk();
        let level = node.children(&mut cursor).find_map(|child| match child.kind() {
            "atx_h1_marker" | "setext_h1_underline" => Some(1),
            "atx_h2_marker" | "setext_h2_underline" => Some(2),
            "atx_h3_marker" => Some(3),
            "atx_h4_marker" => Some(4),
            "atx_h5_marker" => Some(5),
            "atx_h6_marker" => Some(6),
            _ => None,
        });
        level
    }
}
