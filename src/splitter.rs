use crate::block::{NativeBlock, PageGroup, RichTextRun};

/// Capacity limits for the target service, passed explicitly so the pipeline
/// can be exercised with smaller numbers in tests.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum blocks per created or appended page.
    pub page_block_limit: usize,
    /// Maximum characters of text per block.
    pub block_char_limit: usize,
    /// How many blocks to search backward for a speaker change before giving
    /// up and cutting a page at the hard limit.
    pub speaker_lookback: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            page_block_limit: 100,
            block_char_limit: 1800,
            speaker_lookback: 20,
        }
    }
}

/// Repartition blocks to satisfy both capacity constraints: first split any
/// block whose text exceeds the per-block character limit into siblings, then
/// batch the flat sequence into page-sized groups.
///
/// Pure and total; an empty input yields no groups.
pub fn split(blocks: Vec<NativeBlock>, limits: &Limits) -> Vec<PageGroup> {
    let blocks = split_oversized(blocks, limits.block_char_limit);
    group_blocks(blocks, limits)
}

/// Pass 1: character splitting. Each oversized block is replaced in place by
/// sibling blocks of the same kind carrying consecutive chunks of its text.
fn split_oversized(blocks: Vec<NativeBlock>, char_limit: usize) -> Vec<NativeBlock> {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        if block.char_len() <= char_limit {
            out.push(block);
            continue;
        }
        let NativeBlock {
            kind,
            rich_text,
            speaker_label,
        } = block;
        for chunk in chunk_runs(rich_text, char_limit) {
            out.push(NativeBlock {
                kind: kind.clone(),
                rich_text: chunk,
                // Every sibling keeps the label so continuity survives the cut.
                speaker_label: speaker_label.clone(),
            });
        }
    }
    out
}

/// Cut a run sequence into consecutive chunks of at most `char_limit`
/// characters. Cuts prefer the nearest whitespace before the limit and never
/// land inside a multi-byte character; a run split in two keeps its style on
/// both sides. Concatenating the chunks reproduces the input exactly.
fn chunk_runs(runs: Vec<RichTextRun>, char_limit: usize) -> Vec<Vec<RichTextRun>> {
    debug_assert!(char_limit > 0);
    let mut chunks = Vec::new();
    let mut current: Vec<RichTextRun> = Vec::new();
    let mut current_len = 0;

    for run in runs {
        let mut rest = run;
        loop {
            let rest_len = rest.text.chars().count();
            if current_len + rest_len <= char_limit {
                if rest_len > 0 {
                    current.push(rest);
                    current_len += rest_len;
                }
                break;
            }
            let budget = char_limit - current_len;
            if budget == 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            let cut = cut_index(&rest.text, budget);
            let tail = rest.text.split_off(cut);
            let head = std::mem::replace(&mut rest.text, tail);
            current.push(RichTextRun {
                text: head,
                bold: rest.bold,
                italic: rest.italic,
                code: rest.code,
            });
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Byte index at which to cut `text` so the head is at most `budget`
/// characters: just after the last whitespace within budget, or at the hard
/// character boundary when the head contains none.
fn cut_index(text: &str, budget: usize) -> usize {
    let mut hard = text.len();
    let mut last_whitespace = None;
    for (count, (pos, c)) in text.char_indices().enumerate() {
        if count == budget {
            hard = pos;
            break;
        }
        if c.is_whitespace() {
            last_whitespace = Some(pos + c.len_utf8());
        }
    }
    last_whitespace.unwrap_or(hard)
}

/// Pass 2: block-count splitting with smart speaker boundaries.
fn group_blocks(blocks: Vec<NativeBlock>, limits: &Limits) -> Vec<PageGroup> {
    let mut groups = Vec::new();
    let mut current: PageGroup = Vec::new();

    for block in blocks {
        if current.len() == limits.page_block_limit {
            let cut = boundary(&current, block.speaker_label.as_deref(), limits);
            let carried = current.split_off(cut);
            groups.push(std::mem::take(&mut current));
            current = carried;
        }
        current.push(block);
    }

    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Choose where to close a full group before `next_label` arrives.
///
/// When the hard cut would land inside a run of blocks sharing the upcoming
/// block's speaker label, back up (within the lookback window) to just after
/// the most recent block with a different label, so one speaker's remarks stay
/// on a single page. If the whole window belongs to that speaker the limit
/// wins and the cut stays at the hard boundary.
fn boundary(group: &[NativeBlock], next_label: Option<&str>, limits: &Limits) -> usize {
    let hard = group.len();
    let Some(next_label) = next_label else {
        return hard;
    };
    let last_label = group.last().and_then(|b| b.speaker_label.as_deref());
    if last_label != Some(next_label) {
        return hard;
    }
    let window_start = hard.saturating_sub(limits.speaker_lookback);
    for i in (window_start..hard).rev() {
        if group[i].speaker_label.as_deref() != Some(next_label) {
            return i + 1;
        }
    }
    hard
}
