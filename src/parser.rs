use crate::block::AbstractBlock;

/// How many columns a tab occupies when measuring list indentation.
const TAB_WIDTH: usize = 4;
/// Columns of indentation per list nesting level.
const INDENT_PER_DEPTH: usize = 2;
/// Notion supports heading_1 through heading_3; deeper headings are coalesced
/// here so downstream stages never see a larger level.
const MAX_HEADING_LEVEL: usize = 3;

/// Parse markdown text into an ordered list of abstract blocks.
///
/// This is a single-pass line classification scan, not a full markdown
/// grammar. Unrecognized syntax degrades to paragraph text; nothing here can
/// fail.
pub fn parse(document: &str) -> Vec<AbstractBlock> {
    let lines: Vec<&str> = document.lines().collect();
    let mut blocks = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    // Per-depth counters for numbered items, cleared whenever a list run ends.
    let mut numbering: Vec<usize> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let content = line.trim_start();

        if content.is_empty() {
            flush_paragraph(&mut blocks, &mut paragraph);
            numbering.clear();
            i += 1;
            continue;
        }

        if let Some(fence_rest) = content.strip_prefix("```") {
            flush_paragraph(&mut blocks, &mut paragraph);
            numbering.clear();
            let language = match fence_rest.trim() {
                "" => None,
                tag => Some(tag.to_string()),
            };
            let mut body: Vec<&str> = Vec::new();
            i += 1;
            // An unterminated fence consumes the rest of the document.
            while i < lines.len() && lines[i].trim() != "```" {
                body.push(lines[i]);
                i += 1;
            }
            if i < lines.len() {
                i += 1; // skip the closing fence
            }
            blocks.push(AbstractBlock::CodeBlock {
                text: body.join("\n"),
                language,
            });
            continue;
        }

        if let Some((level, text)) = parse_heading(content) {
            flush_paragraph(&mut blocks, &mut paragraph);
            numbering.clear();
            blocks.push(AbstractBlock::Heading { level, text });
            i += 1;
            continue;
        }

        let depth = indent_width(line) / INDENT_PER_DEPTH;

        if let Some(text) = parse_bullet(content) {
            flush_paragraph(&mut blocks, &mut paragraph);
            // A bullet restarts numbering at its depth and below.
            numbering.truncate(depth);
            blocks.push(AbstractBlock::BulletItem { text, depth });
            i += 1;
            continue;
        }

        if let Some(text) = parse_numbered(content) {
            flush_paragraph(&mut blocks, &mut paragraph);
            numbering.truncate(depth + 1);
            if numbering.len() <= depth {
                numbering.resize(depth + 1, 0);
            }
            numbering[depth] += 1;
            blocks.push(AbstractBlock::NumberedItem {
                text,
                depth,
                index: numbering[depth],
            });
            i += 1;
            continue;
        }

        // Anything else is paragraph text; consecutive lines soft-wrap.
        numbering.clear();
        paragraph.push(content.trim_end().to_string());
        i += 1;
    }

    flush_paragraph(&mut blocks, &mut paragraph);
    blocks
}

fn flush_paragraph(blocks: &mut Vec<AbstractBlock>, paragraph: &mut Vec<String>) {
    if !paragraph.is_empty() {
        blocks.push(AbstractBlock::Paragraph {
            text: std::mem::take(paragraph).join(" "),
        });
    }
}

/// `#`-prefixed heading line. Levels beyond 3 are coalesced to 3; a marker
/// with no text yields an empty heading rather than being dropped.
fn parse_heading(content: &str) -> Option<(u8, String)> {
    let hashes = content.chars().take_while(|&c| c == '#').count();
    if hashes == 0 {
        return None;
    }
    let rest = &content[hashes..];
    if !(rest.is_empty() || rest.starts_with(' ')) {
        return None;
    }
    let level = hashes.min(MAX_HEADING_LEVEL) as u8;
    Some((level, rest.trim().to_string()))
}

fn parse_bullet(content: &str) -> Option<String> {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = content.strip_prefix(marker) {
            return Some(rest.trim().to_string());
        }
    }
    None
}

fn parse_numbered(content: &str) -> Option<String> {
    let digits = content.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    content[digits..]
        .strip_prefix(". ")
        .map(|rest| rest.trim().to_string())
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += TAB_WIDTH,
            _ => break,
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels_one_through_three() {
        let blocks = parse("# One\n## Two\n### Three");
        assert_eq!(
            blocks,
            vec![
                AbstractBlock::Heading {
                    level: 1,
                    text: "One".into()
                },
                AbstractBlock::Heading {
                    level: 2,
                    text: "Two".into()
                },
                AbstractBlock::Heading {
                    level: 3,
                    text: "Three".into()
                },
            ]
        );
    }

    #[test]
    fn deep_headings_coalesce_to_level_three() {
        let blocks = parse("##### Deep");
        assert_eq!(
            blocks,
            vec![AbstractBlock::Heading {
                level: 3,
                text: "Deep".into()
            }]
        );
    }

    #[test]
    fn bare_heading_marker_keeps_an_empty_heading() {
        let blocks = parse("##");
        assert_eq!(
            blocks,
            vec![AbstractBlock::Heading {
                level: 2,
                text: String::new()
            }]
        );
    }

    #[test]
    fn hashes_without_a_space_are_paragraph_text() {
        let blocks = parse("#hashtag");
        assert_eq!(
            blocks,
            vec![AbstractBlock::Paragraph {
                text: "#hashtag".into()
            }]
        );
    }

    #[test]
    fn soft_wrapped_lines_join_into_one_paragraph() {
        let blocks = parse("first line\nsecond line\n\nnext paragraph");
        assert_eq!(
            blocks,
            vec![
                AbstractBlock::Paragraph {
                    text: "first line second line".into()
                },
                AbstractBlock::Paragraph {
                    text: "next paragraph".into()
                },
            ]
        );
    }

    #[test]
    fn bullet_markers_and_nesting_depth() {
        let blocks = parse("- top\n  - nested\n    - deeper\n+ plus\n* star");
        assert_eq!(
            blocks,
            vec![
                AbstractBlock::BulletItem {
                    text: "top".into(),
                    depth: 0
                },
                AbstractBlock::BulletItem {
                    text: "nested".into(),
                    depth: 1
                },
                AbstractBlock::BulletItem {
                    text: "deeper".into(),
                    depth: 2
                },
                AbstractBlock::BulletItem {
                    text: "plus".into(),
                    depth: 0
                },
                AbstractBlock::BulletItem {
                    text: "star".into(),
                    depth: 0
                },
            ]
        );
    }

    #[test]
    fn numbered_items_are_reindexed_per_depth() {
        let blocks = parse("3. a\n7. b\n  1. inner\n9. c");
        assert_eq!(
            blocks,
            vec![
                AbstractBlock::NumberedItem {
                    text: "a".into(),
                    depth: 0,
                    index: 1
                },
                AbstractBlock::NumberedItem {
                    text: "b".into(),
                    depth: 0,
                    index: 2
                },
                AbstractBlock::NumberedItem {
                    text: "inner".into(),
                    depth: 1,
                    index: 1
                },
                AbstractBlock::NumberedItem {
                    text: "c".into(),
                    depth: 0,
                    index: 3
                },
            ]
        );
    }

    #[test]
    fn blank_line_resets_numbered_indexes() {
        let blocks = parse("1. a\n\n1. b");
        assert_eq!(
            blocks,
            vec![
                AbstractBlock::NumberedItem {
                    text: "a".into(),
                    depth: 0,
                    index: 1
                },
                AbstractBlock::NumberedItem {
                    text: "b".into(),
                    depth: 0,
                    index: 1
                },
            ]
        );
    }

    #[test]
    fn fenced_code_with_language_tag() {
        let blocks = parse("```rust\nfn main() {}\n```\nafter");
        assert_eq!(
            blocks,
            vec![
                AbstractBlock::CodeBlock {
                    text: "fn main() {}".into(),
                    language: Some("rust".into())
                },
                AbstractBlock::Paragraph {
                    text: "after".into()
                },
            ]
        );
    }

    #[test]
    fn code_fence_content_is_verbatim() {
        let blocks = parse("```\n# not a heading\n- not a list\n```");
        assert_eq!(
            blocks,
            vec![AbstractBlock::CodeBlock {
                text: "# not a heading\n- not a list".into(),
                language: None
            }]
        );
    }

    #[test]
    fn unterminated_fence_consumes_the_rest_of_the_document() {
        let blocks = parse("before\n```\nline one\nline two");
        assert_eq!(
            blocks,
            vec![
                AbstractBlock::Paragraph {
                    text: "before".into()
                },
                AbstractBlock::CodeBlock {
                    text: "line one\nline two".into(),
                    language: None
                },
            ]
        );
    }

    #[test]
    fn tabs_count_as_four_columns_of_indent() {
        let blocks = parse("- top\n\t- nested");
        assert_eq!(
            blocks,
            vec![
                AbstractBlock::BulletItem {
                    text: "top".into(),
                    depth: 0
                },
                AbstractBlock::BulletItem {
                    text: "nested".into(),
                    depth: 2
                },
            ]
        );
    }

    #[test]
    fn empty_document_yields_no_blocks() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n\n").is_empty());
    }
}
