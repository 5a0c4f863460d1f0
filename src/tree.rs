//! The rendered view of one markdown document.
//!
//! tree-sitter-md nests headings into `section` nodes; the renderer flattens them so that a
//! document becomes a plain sequence of sibling blocks, the way an HTML body reads. Every node
//! keeps its byte range in the source snapshot it was rendered from, so any part of the tree can
//! be serialized back to markup by slicing that snapshot.

use std::ops::Range;

/// Flat block sequence rendered from a snapshot of a source document.
pub struct RenderedTree {
    /// Text the tree was rendered from; all ranges index into it.
    pub source: String,
    /// Top-level blocks in document order.
    pub blocks: Vec<Block>,
    /// Whether the document contains math delimiters at all.
    pub has_math: bool,
}

/// A block-level node.
#[derive(Clone, Debug)]
pub struct Block {
    /// What kind of block this is.
    pub kind: BlockKind,
    /// Byte span in the source snapshot.
    pub range: Range<usize>,
    /// Zero-based line the block starts on.
    pub line: usize,
    /// Zero-based line the block ends on (inclusive).
    pub end_line: usize,
}

/// Block variants distinguished by the segmenter and the cloze selector.
#[derive(Clone, Debug)]
pub enum BlockKind {
    /// A leveled heading.
    Heading(Heading),
    /// Running text.
    Paragraph(Vec<Inline>),
    /// A `$$ … $$` display math paragraph; `inner` spans the formula.
    Math {
        /// Formula between the delimiters.
        inner: Range<usize>,
    },
    /// A block quote and its nested blocks.
    Quote(Vec<Block>),
    /// A bullet or ordered list.
    List(Vec<ListItem>),
    /// A pipe table.
    Table(Table),
    /// Fenced or indented code.
    Code,
    /// An HTML comment block, holding the text between `<!--` and `-->`.
    Comment(String),
    /// A thematic break, which also ends a section.
    Rule,
    /// Anything else, kept verbatim.
    Other,
}

/// Heading attributes.
#[derive(Clone, Debug)]
pub struct Heading {
    /// Priority from 1 (most significant) to 6.
    pub level: u8,
    /// Heading text without markup symbols.
    pub label: String,
}

/// One list entry.
#[derive(Clone, Debug)]
pub struct ListItem {
    /// Byte span including the list marker.
    pub range: Range<usize>,
    /// Blocks nested in the item.
    pub blocks: Vec<Block>,
    /// Whether blank lines separate this item from its neighbours or its own blocks.
    pub loose: bool,
}

/// A pipe table split into header and body cells.
#[derive(Clone, Debug, Default)]
pub struct Table {
    /// Cells of the header row.
    pub header: Vec<Cell>,
    /// Body rows.
    pub rows: Vec<Vec<Cell>>,
}

/// One table cell.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Byte span of the cell text, without surrounding pipes or padding.
    pub range: Range<usize>,
    /// Inline content.
    pub children: Vec<Inline>,
}

/// An inline node.
#[derive(Clone, Debug)]
pub struct Inline {
    /// What kind of inline this is.
    pub kind: InlineKind,
    /// Byte span in the source snapshot, delimiters included.
    pub range: Range<usize>,
}

/// Inline variants.
#[derive(Clone, Debug)]
pub enum InlineKind {
    /// Plain text between other nodes.
    Text,
    /// `**strong**` emphasis; `content` excludes the delimiters.
    Strong {
        /// Span between the delimiters.
        content: Range<usize>,
        /// Nested inline nodes.
        children: Vec<Inline>,
    },
    /// `*emphasis*`.
    Emphasis {
        /// Nested inline nodes.
        children: Vec<Inline>,
    },
    /// A code span.
    Code,
    /// An image reference.
    Image {
        /// Span of the link destination, when present.
        destination: Option<Range<usize>>,
    },
    /// Inline math.
    Math,
    /// Raw inline HTML.
    Html,
    /// Links, escapes and anything else, kept verbatim.
    Other,
}

impl RenderedTree {
    #[must_use]
    /// Source text covered by a range.
    pub fn text(&self, range: &Range<usize>) -> &str {
        &self.source[range.clone()]
    }

    #[must_use]
    /// Heading attributes of the block at `index`, if it is a heading.
    pub fn heading(&self, index: usize) -> Option<&Heading> {
        match self.blocks.get(index).map(|block| &block.kind) {
            Some(BlockKind::Heading(heading)) => Some(heading),
            _ => None,
        }
    }

    /// Indices of headings whose level satisfies `wanted`, in document order.
    pub fn heading_indices<'t>(
        &'t self,
        wanted: impl Fn(usize) -> bool + 't,
    ) -> impl Iterator<Item = usize> + 't {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(move |(index, block)| match &block.kind {
                BlockKind::Heading(heading) if wanted(usize::from(heading.level)) => Some(index),
                _ => None,
            })
    }
}

impl Block {
    #[must_use]
    /// Byte span without trailing whitespace.
    pub fn trimmed_range(&self, source: &str) -> Range<usize> {
        trim_range(source, &self.range)
    }
}

impl InlineKind {
    #[must_use]
    /// Nested inline nodes, for the kinds that carry any.
    pub fn children(&self) -> &[Inline] {
        match self {
            Self::Strong { children, .. } | Self::Emphasis { children } => children,
            _ => &[],
        }
    }
}

#[must_use]
/// Shrinks a range so it neither starts nor ends with whitespace.
pub fn trim_range(source: &str, range: &Range<usize>) -> Range<usize> {
    let text = &source[range.clone()];
    let start = range.start + (text.len() - text.trim_start().len());
    let end = range.start + text.trim_end().len();
    start..end.max(start)
}
