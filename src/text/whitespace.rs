// Whitespace handling: collapsing, chomping, indentation, wrapping and the
// final blank-line normalization of a converted document.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n\r\x0C]+").expect("valid whitespace pattern"));

/// Collapse every run of ASCII whitespace to a single space.
///
/// Idempotent: collapsing an already collapsed run changes nothing.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// A text run split into a surrounding space and its trimmed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chomped<'a> {
    /// `" "` when the run started with a space.
    pub prefix: &'static str,
    /// `" "` when the run ended with a space.
    pub suffix: &'static str,
    pub text: &'a str,
}

/// Split the leading and trailing space off `text`, so inline markup can
/// wrap the trimmed content and keep the spacing outside the markers.
pub fn chomp(text: &str) -> Chomped<'_> {
    Chomped {
        prefix: if text.starts_with(' ') { " " } else { "" },
        suffix: if text.ends_with(' ') { " " } else { "" },
        text: text.trim(),
    }
}

/// Prefix every non-empty line with `level` tabs.
pub fn indent(text: &str, level: usize) -> String {
    let prefix = "\t".repeat(level);
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Greedy word wrap, line by line. Words longer than `width` are never
/// split; a trailing two-space hard break is kept on its line.
pub fn wrap_lines(text: &str, width: usize) -> String {
    text.split('\n')
        .map(|line| {
            let hard_break = line.ends_with("  ");
            let mut wrapped = String::with_capacity(line.len());
            let mut column = 0;
            for word in line.split(' ').filter(|w| !w.is_empty()) {
                let len = word.chars().count();
                if column > 0 && column + 1 + len > width {
                    wrapped.push('\n');
                    column = 0;
                } else if column > 0 {
                    wrapped.push(' ');
                    column += 1;
                }
                wrapped.push_str(word);
                column += len;
            }
            if hard_break {
                wrapped.push_str("  ");
            }
            wrapped
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Find the longest consecutive run of backticks in a string.
pub fn longest_backtick_run(s: &str) -> usize {
    let mut max = 0;
    let mut current = 0;
    for c in s.chars() {
        if c == '`' {
            current += 1;
            max = max.max(current);
        } else {
            current = 0;
        }
    }
    max
}

/// Backtick fence long enough not to be closed by `body`; at least three.
pub fn code_fence(body: &str) -> String {
    "`".repeat((longest_backtick_run(body) + 1).max(3))
}

fn leading_newlines(text: &str) -> usize {
    text.len() - text.trim_start_matches('\n').len()
}

fn trailing_newlines(text: &str) -> usize {
    text.len() - text.trim_end_matches('\n').len()
}

/// Append `piece` to `out`, merging the newlines where the two meet so that
/// at most one blank line separates them.
///
/// Newline runs that already exceed a blank line on one side are left as
/// they are; only the join itself is shortened.
pub fn push_joined(out: &mut String, piece: &str) {
    let trailing = trailing_newlines(out);
    let leading = leading_newlines(piece);
    if trailing == 0 || leading == 0 || trailing + leading <= 2 {
        out.push_str(piece);
        return;
    }
    let keep = 2usize.saturating_sub(trailing);
    out.push_str(&piece[leading - keep.min(leading)..]);
}

/// Document finalization: the newline runs at the start and end of the
/// document are cut down to at most one blank line. Everything between them
/// is already spaced by the walker and is left untouched.
pub fn finalize(text: &str) -> String {
    let leading = leading_newlines(text);
    if leading == text.len() {
        return String::new();
    }
    let trailing = trailing_newlines(text);
    let body = &text[leading..text.len() - trailing];
    let mut out = String::with_capacity(body.len() + 4);
    out.extend(std::iter::repeat_n('\n', leading.min(2)));
    out.push_str(body);
    out.extend(std::iter::repeat_n('\n', trailing.min(2)));
    out
}
