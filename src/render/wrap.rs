//! Width-aware text layout. All measurements are in terminal columns, not bytes.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub(crate) const ELLIPSIS: &str = "…";

pub(crate) fn width(text: &str) -> usize {
    text.width()
}

/// Breaks `text` into lines no wider than `max`. Explicit newlines are kept,
/// runs of whitespace collapse, and words wider than `max` are split.
pub(crate) fn wrap(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut out = Vec::new();

    for paragraph in text.lines() {
        let mut cur = String::new();

        for word in paragraph.split_whitespace() {
            let word_width = word.width();

            if cur.is_empty() && word_width <= max {
                cur.push_str(word);
                continue;
            }

            if !cur.is_empty() && cur.width() + 1 + word_width <= max {
                cur.push(' ');
                cur.push_str(word);
                continue;
            }

            if !cur.is_empty() {
                out.push(std::mem::take(&mut cur));
            }

            if word_width <= max {
                cur.push_str(word);
            } else {
                let mut pieces = split_word(word, max);

                cur = pieces.pop().unwrap_or_default();
                out.extend(pieces);
            }
        }

        out.push(cur);
    }

    // Drop trailing blank lines, keep interior ones
    while out.len() > 1 && out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }

    if out.is_empty() {
        out.push(String::new());
    }

    out
}

fn split_word(word: &str, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut w = 0usize;

    for ch in word.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);

        if w + cw > max && !cur.is_empty() {
            out.push(std::mem::take(&mut cur));
            w = 0;
        }

        cur.push(ch);
        w += cw;
    }

    if !cur.is_empty() {
        out.push(cur);
    }

    out
}

/// Shortens `text` to at most `max` columns, marking the cut with an ellipsis
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }

    let ell_w = ELLIPSIS.width();

    if max <= ell_w {
        return ELLIPSIS.chars().take(max).collect();
    }

    let mut out = String::new();
    let mut w = 0usize;

    for ch in text.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);

        if w + cw + ell_w > max {
            break;
        }

        out.push(ch);
        w += cw;
    }

    out.push_str(ELLIPSIS);
    out
}
