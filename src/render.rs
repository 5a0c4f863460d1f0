//! Renderer adapter: markdown text in, [`RenderedTree`] out.
//!
//! Parsing uses tree-sitter-md's two-grammar parser. The block tree gives headings, paragraphs,
//! lists, quotes, tables and HTML blocks; each paragraph's `inline` node has its own inline tree
//! carrying emphasis, images and code spans. Text between inline nodes is not represented by
//! tree-sitter, so it is recovered from the gaps between child byte ranges.

use crate::error::{Error, Result};
use crate::formats::markdown::MarkdownFormat;
use crate::formats::Format;
use crate::tree::{
    trim_range, Block, BlockKind, Cell, Heading, Inline, InlineKind, ListItem, RenderedTree, Table,
};
use std::collections::HashMap;
use std::ops::Range;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};
use tree_sitter_md::{MarkdownParser, MarkdownTree};

/// Parses markdown into rendered trees.
pub struct Renderer {
    parser: MarkdownParser,
    heading_query: Query,
    format: MarkdownFormat,
}

impl Renderer {
    /// Build the parser and compile the heading query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Renderer`] if the grammar rejects the heading query; nothing can be
    /// converted without it.
    pub fn new() -> Result<Self> {
        let format = MarkdownFormat;
        let language = format.language();
        let heading_query = Query::new(&language, format.section_query())
            .map_err(|e| Error::Renderer(e.to_string()))?;
        Ok(Self {
            parser: MarkdownParser::default(),
            heading_query,
            format,
        })
    }

    /// Render a snapshot of document text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Renderer`] if tree-sitter gives up on the input.
    pub fn render(&mut self, text: &str) -> Result<RenderedTree> {
        let md_tree = self
            .parser
            .parse(text.as_bytes(), None)
            .ok_or_else(|| Error::Renderer("parser returned no tree".to_string()))?;
        let root = md_tree.block_tree().root_node();
        let headings = self.collect_headings(root, text);

        let builder = TreeBuilder {
            source: text,
            md_tree: &md_tree,
            headings: &headings,
        };
        let mut blocks = Vec::new();
        builder.push_blocks(root, &mut blocks);

        Ok(RenderedTree {
            source: text.to_string(),
            blocks,
            has_math: text.contains('$'),
        })
    }

    fn collect_headings(&self, root: Node, text: &str) -> HashMap<usize, Heading> {
        let mut headings = HashMap::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.heading_query, root, text.as_bytes());
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let node = capture.node;
                let Some(level) = self.format.heading_level(&node) else {
                    continue;
                };
                headings.insert(
                    node.id(),
                    Heading {
                        level,
                        label: heading_label(node, text),
                    },
                );
            }
        }
        headings
    }
}

/// Heading text with markers, closing hashes and surrounding whitespace removed.
fn heading_label(node: Node, text: &str) -> String {
    let mut cursor = node.walk();
    let content = node
        .children(&mut cursor)
        .find(|child| matches!(child.kind(), "inline" | "paragraph"));
    let Some(content) = content else {
        return String::new();
    };
    let raw = content.utf8_text(text.as_bytes()).unwrap_or_default().trim();
    strip_closing_hashes(raw).to_string()
}

fn strip_closing_hashes(label: &str) -> &str {
    let without = label.trim_end_matches('#');
    if without.len() == label.len() {
        return label;
    }
    if without.is_empty() {
        return without;
    }
    if without.ends_with(char::is_whitespace) {
        without.trim_end()
    } else {
        label
    }
}

fn last_line(node: Node) -> usize {
    let start = node.start_position();
    let end = node.end_position();
    if end.column == 0 && end.row > start.row {
        end.row - 1
    } else {
        end.row
    }
}

struct TreeBuilder<'a> {
    source: &'a str,
    md_tree: &'a MarkdownTree,
    headings: &'a HashMap<usize, Heading>,
}

impl TreeBuilder<'_> {
    fn named_children<'n>(node: Node<'n>) -> Vec<Node<'n>> {
        let mut cursor = node.walk();
        let children = node.named_children(&mut cursor).collect();
        children
    }

    /// Appends the blocks found under a container, flattening `section` nodes.
    fn push_blocks(&self, node: Node, out: &mut Vec<Block>) {
        for child in Self::named_children(node) {
            match child.kind() {
                "section" => self.push_blocks(child, out),
                kind if is_structural(kind) => {}
                _ => out.push(self.block(child)),
            }
        }
    }

    fn block(&self, node: Node) -> Block {
        let kind = match node.kind() {
            "atx_heading" | "setext_heading" => match self.headings.get(&node.id()) {
                Some(heading) => BlockKind::Heading(heading.clone()),
                None => BlockKind::Other,
            },
            "paragraph" => self.paragraph(node),
            "block_quote" => {
                let mut blocks = Vec::new();
                self.push_blocks(node, &mut blocks);
                BlockKind::Quote(blocks)
            }
            "list" => BlockKind::List(self.list_items(node)),
            "pipe_table" => BlockKind::Table(self.table(node)),
            "fenced_code_block" | "indented_code_block" => BlockKind::Code,
            "thematic_break" => BlockKind::Rule,
            "html_block" => {
                let html = node.utf8_text(self.source.as_bytes()).unwrap_or_default();
                match comment_text(html) {
                    Some(inner) => BlockKind::Comment(inner.to_string()),
                    None => BlockKind::Other,
                }
            }
            _ => BlockKind::Other,
        };
        Block {
            kind,
            range: node.byte_range(),
            line: node.start_position().row,
            end_line: last_line(node),
        }
    }

    fn paragraph(&self, node: Node) -> BlockKind {
        let range = trim_range(self.source, &node.byte_range());
        let text = &self.source[range.clone()];
        if text.len() >= 4 && text.starts_with("$$") && text.ends_with("$$") {
            return BlockKind::Math {
                inner: range.start + 2..range.end - 2,
            };
        }
        let mut inlines = Vec::new();
        for child in Self::named_children(node) {
            if child.kind() == "inline" {
                inlines.extend(self.inline_content(child));
            }
        }
        BlockKind::Paragraph(inlines)
    }

    /// Inline nodes for a block-level node that owns an inline tree.
    fn inline_content(&self, node: Node) -> Vec<Inline> {
        let range = trim_range(self.source, &node.byte_range());
        match self.md_tree.inline_tree(&node) {
            Some(tree) => {
                let root = tree.root_node();
                if root.kind() == "inline" {
                    self.inlines_between(root, range)
                } else {
                    self.inlines_from(vec![root], range)
                }
            }
            None => text_node(self.source, range).into_iter().collect(),
        }
    }

    fn inlines_between(&self, node: Node, range: Range<usize>) -> Vec<Inline> {
        self.inlines_from(Self::named_children(node), range)
    }

    /// Converts inline nodes, filling the gaps between them with text nodes.
    fn inlines_from(&self, nodes: Vec<Node>, range: Range<usize>) -> Vec<Inline> {
        let mut out = Vec::new();
        let mut pos = range.start;
        for child in nodes {
            if child.kind().ends_with("_delimiter") {
                continue;
            }
            let child_range = child.byte_range();
            if child_range.end <= pos || child_range.start >= range.end {
                continue;
            }
            if child_range.start > pos {
                out.extend(text_node(self.source, pos..child_range.start));
            }
            out.push(self.inline(child));
            pos = child_range.end;
        }
        if pos < range.end {
            out.extend(text_node(self.source, pos..range.end));
        }
        out
    }

    fn inline(&self, node: Node) -> Inline {
        let range = node.byte_range();
        let kind = match node.kind() {
            "strong_emphasis" => {
                let content = delimited_content(node, 2);
                InlineKind::Strong {
                    children: self.inlines_between(node, content.clone()),
                    content,
                }
            }
            "emphasis" => {
                let content = delimited_content(node, 1);
                InlineKind::Emphasis {
                    children: self.inlines_between(node, content),
                }
            }
            "code_span" => InlineKind::Code,
            "image" => InlineKind::Image {
                destination: Self::named_children(node)
                    .into_iter()
                    .find(|child| child.kind() == "link_destination")
                    .map(|child| child.byte_range()),
            },
            "latex_block" => InlineKind::Math,
            "html_tag" => InlineKind::Html,
            _ => InlineKind::Other,
        };
        Inline { kind, range }
    }

    fn list_items(&self, node: Node) -> Vec<ListItem> {
        let mut items: Vec<ListItem> = Self::named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "list_item")
            .map(|item| {
                let mut blocks = Vec::new();
                self.push_blocks(item, &mut blocks);
                let loose = blocks.windows(2).any(|pair| {
                    blank_line_between(self.source, &pair[0].range, pair[1].range.start)
                });
                ListItem {
                    range: item.byte_range(),
                    blocks,
                    loose,
                }
            })
            .collect();

        let gaps: Vec<bool> = items
            .windows(2)
            .map(|pair| blank_line_between(self.source, &pair[0].range, pair[1].range.start))
            .collect();
        if gaps.iter().any(|gap| *gap) {
            for item in &mut items {
                item.loose = true;
            }
        }
        items
    }

    fn table(&self, node: Node) -> Table {
        let mut table = Table::default();
        for row in Self::named_children(node) {
            let cells: Vec<Cell> = Self::named_children(row)
                .into_iter()
                .filter(|cell| cell.kind() == "pipe_table_cell")
                .map(|cell| Cell {
                    range: trim_range(self.source, &cell.byte_range()),
                    children: self.inline_content(cell),
                })
                .collect();
            match row.kind() {
                "pipe_table_header" => table.header = cells,
                "pipe_table_row" => table.rows.push(cells),
                _ => {}
            }
        }
        table
    }
}

/// Marker and continuation nodes carry no content of their own.
fn is_structural(kind: &str) -> bool {
    kind == "block_continuation"
        || kind == "block_quote_marker"
        || kind.starts_with("list_marker")
        || kind.starts_with("task_list_marker")
}

/// Span between the opening and closing delimiters of an emphasis node.
///
/// The parser emits one `emphasis_delimiter` per character, and a bare `**x**` has all four
/// delimiters adjacent, so each side takes at most `width` of them.
fn delimited_content(node: Node, width: usize) -> Range<usize> {
    let children = TreeBuilder::named_children(node);
    let leading = children
        .iter()
        .take_while(is_delimiter)
        .take(width)
        .last()
        .map_or(node.start_byte(), Node::end_byte);
    let trailing = children
        .iter()
        .rev()
        .take_while(is_delimiter)
        .take(width)
        .last()
        .map_or(node.end_byte(), Node::start_byte);
    if leading <= trailing {
        leading..trailing
    } else {
        node.byte_range()
    }
}

fn is_delimiter(child: &&Node) -> bool {
    child.kind().ends_with("_delimiter")
}

fn text_node(source: &str, range: Range<usize>) -> Option<Inline> {
    if source[range.clone()].trim().is_empty() {
        return None;
    }
    Some(Inline {
        kind: InlineKind::Text,
        range,
    })
}

/// Whether an empty line sits between the end of `before` and `next_start`.
fn blank_line_between(source: &str, before: &Range<usize>, next_start: usize) -> bool {
    let end = trim_range(source, before).end;
    if end >= next_start {
        return false;
    }
    source[end..next_start].matches('\n').count() >= 2
}

/// Inner text of an HTML block that consists of a single comment.
#[must_use]
pub fn comment_text(html: &str) -> Option<&str> {
    let trimmed = html.trim();
    let inner = trimmed.strip_prefix("<!--")?.strip_suffix("-->")?;
    if inner.contains("-->") {
        return None;
    }
    Some(inner.trim())
}

#[cfg(test)]
#[path = "tests/render.rs"]
mod tests;
