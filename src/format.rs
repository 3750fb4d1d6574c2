use crate::block::RichTextRun;

/// Convert a run of raw text containing `**bold**`, `*italic*` and `` `code` ``
/// markers into an ordered sequence of styled runs.
///
/// Unmatched or unterminated markers fall through as literal characters, so
/// this never fails on malformed markup. Code span contents are taken
/// verbatim and are not re-scanned for `*` markers.
pub fn format(raw: &str) -> Vec<RichTextRun> {
    let chars: Vec<char> = raw.chars().collect();
    let mut runs: Vec<RichTextRun> = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if let Some(end) = find_closing(&chars, i + 2, &['*', '*']) {
                    flush_literal(&mut runs, &mut literal);
                    push_run(
                        &mut runs,
                        RichTextRun {
                            text: chars[i + 2..end].iter().collect(),
                            bold: true,
                            italic: false,
                            code: false,
                        },
                    );
                    i = end + 2;
                } else {
                    literal.push_str("**");
                    i += 2;
                }
            }
            '*' => {
                if let Some(end) = find_closing(&chars, i + 1, &['*']) {
                    flush_literal(&mut runs, &mut literal);
                    push_run(
                        &mut runs,
                        RichTextRun {
                            text: chars[i + 1..end].iter().collect(),
                            bold: false,
                            italic: true,
                            code: false,
                        },
                    );
                    i = end + 1;
                } else {
                    literal.push('*');
                    i += 1;
                }
            }
            '`' => {
                if let Some(end) = find_closing(&chars, i + 1, &['`']) {
                    flush_literal(&mut runs, &mut literal);
                    push_run(
                        &mut runs,
                        RichTextRun {
                            text: chars[i + 1..end].iter().collect(),
                            bold: false,
                            italic: false,
                            code: true,
                        },
                    );
                    i = end + 1;
                } else {
                    literal.push('`');
                    i += 1;
                }
            }
            c => {
                literal.push(c);
                i += 1;
            }
        }
    }

    flush_literal(&mut runs, &mut literal);
    runs
}

/// Find the start of the next occurrence of `marker` at or after `from`.
fn find_closing(chars: &[char], from: usize, marker: &[char]) -> Option<usize> {
    if chars.len() < marker.len() {
        return None;
    }
    (from..=chars.len() - marker.len()).find(|&j| &chars[j..j + marker.len()] == marker)
}

fn flush_literal(runs: &mut Vec<RichTextRun>, literal: &mut String) {
    if !literal.is_empty() {
        push_run(runs, RichTextRun::plain(std::mem::take(literal)));
    }
}

/// Append a run, merging it into the previous one when the styles match so
/// the output is the minimal run sequence.
fn push_run(runs: &mut Vec<RichTextRun>, run: RichTextRun) {
    if run.text.is_empty() {
        return;
    }
    if let Some(last) = runs.last_mut() {
        if last.style() == run.style() {
            last.text.push_str(&run.text);
            return;
        }
    }
    runs.push(run);
}
