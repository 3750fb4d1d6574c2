use once_cell::sync::Lazy;
use regex::Regex;

use crate::block::{AbstractBlock, BlockKind, NativeBlock, RichTextRun};
use crate::format::format;

/// `Name: rest` prefix on a paragraph or list item: a capitalized short label
/// followed by colon-space and non-empty content. This is a best-effort
/// continuity hint for page splitting, not a correctness guarantee — prose
/// like "Note: see above" matches too.
static SPEAKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Za-z0-9 .'-]{0,30}):\s+\S").unwrap());

/// Map an abstract block to the Notion-shaped block it uploads as.
///
/// Total over the variant set: heading, paragraph and list text goes through
/// the inline formatter, code text stays a single verbatim run.
pub fn map(block: AbstractBlock) -> NativeBlock {
    match block {
        AbstractBlock::Heading { level, text } => {
            NativeBlock::new(BlockKind::Heading { level }, format(&text))
        }
        AbstractBlock::Paragraph { text } => {
            let mut native = NativeBlock::new(BlockKind::Paragraph, format(&text));
            native.speaker_label = detect_speaker(&text);
            native
        }
        AbstractBlock::BulletItem { text, depth } => {
            let mut native = NativeBlock::new(BlockKind::BulletItem { depth }, format(&text));
            native.speaker_label = detect_speaker(&text);
            native
        }
        AbstractBlock::NumberedItem { text, depth, index } => {
            let mut native =
                NativeBlock::new(BlockKind::NumberedItem { depth, index }, format(&text));
            native.speaker_label = detect_speaker(&text);
            native
        }
        AbstractBlock::CodeBlock { text, language } => {
            NativeBlock::new(BlockKind::Code { language }, vec![RichTextRun::plain(text)])
        }
    }
}

fn detect_speaker(text: &str) -> Option<String> {
    SPEAKER_PATTERN
        .captures(text)
        .map(|caps| caps[1].to_string())
}
