//! Markdown structure detection.
//!
//! Prompts are often written in Markdown. The success predictor counts code
//! samples, list items, headings, and tables with a real CommonMark parser
//! rather than regexes, so fences inside lists or indented blocks are
//! handled the same way a renderer would.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

/// Structural elements found in a prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkdownStructure {
    /// Fenced code blocks (```` ``` ```` or `~~~`).
    pub fenced_code_blocks: usize,
    /// Indented code blocks.
    pub indented_code_blocks: usize,
    /// List items, ordered or not.
    pub list_items: usize,
    /// Headings of any level.
    pub headings: usize,
    /// Tables.
    pub tables: usize,
}

impl MarkdownStructure {
    /// Whether the prompt contains any code sample.
    pub const fn has_code_sample(&self) -> bool {
        self.fenced_code_blocks + self.indented_code_blocks > 0
    }
}

/// Scan text for Markdown structure.
#[tracing::instrument(skip_all, fields(input_len = text.len()))]
pub fn scan_structure(text: &str) -> MarkdownStructure {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut structure = MarkdownStructure::default();

    for event in Parser::new_ext(text, options) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                structure.fenced_code_blocks += 1;
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Indented)) => {
                structure.indented_code_blocks += 1;
            }
            Event::Start(Tag::Item) => structure.list_items += 1,
            Event::Start(Tag::Heading { .. }) => structure.headings += 1,
            Event::Start(Tag::Table(_)) => structure.tables += 1,
            _ => {}
        }
    }

    structure
}
