//! Convert local markdown documents into Notion pages, repartitioning the
//! content to fit the service's per-block character limit and per-page block
//! limit while preserving document order, list nesting and speaker
//! continuity.
//!
//! The conversion pipeline (`parse` → `map` → `split`) is pure and
//! synchronous; only the [`notion`] client talks to the network.

mod block;
pub mod config;
mod format;
mod mapper;
pub mod notion;
mod parser;
mod splitter;

pub use block::{AbstractBlock, BlockKind, NativeBlock, PageGroup, RichTextRun};
pub use splitter::Limits;

/// Parse markdown text into a vector of abstract blocks.
pub fn parse(markdown: &str) -> Vec<AbstractBlock> {
    parser::parse(markdown)
}

/// Convert raw text with inline markers into styled rich-text runs.
pub fn format_inline(raw: &str) -> Vec<RichTextRun> {
    format::format(raw)
}

/// Convert a markdown document into page-sized groups of Notion blocks.
///
/// This is the single entry point of the conversion core: deterministic,
/// infallible over any input text, and independent of the uploader. Each
/// returned group fits in one page-creation or append call under the given
/// limits.
pub fn parse_and_partition(markdown: &str, limits: &Limits) -> Vec<PageGroup> {
    let blocks = parser::parse(markdown)
        .into_iter()
        .map(mapper::map)
        .collect();
    splitter::split(blocks, limits)
}
