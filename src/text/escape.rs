// Markdown escaping for text runs.
//
// Inline markers are escaped wherever they appear; block markers (`#`, `>`,
// list bullets, `1.`) only when they sit at the start of a line, where they
// would actually open a block. `<` and entity-like `&` are escaped so decoded
// text never turns back into HTML.

use std::sync::LazyLock;

use regex::Regex;

use crate::options::ConversionOptions;

static BACKSLASH_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([!-/:-@\[-`{-~])").expect("valid escape pattern"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]{0,31}|#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6});")
        .expect("valid entity pattern")
});

/// Escape Markdown-significant characters in `text` according to the
/// escaping toggles in `options`.
pub fn escape(text: &str, options: &ConversionOptions) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        escape_line(line, options, &mut out);
    }
    out
}

/// Remove backslash escapes in front of ASCII punctuation.
pub fn unescape(text: &str) -> String {
    BACKSLASH_ESCAPE.replace_all(text, "$1").into_owned()
}

fn escape_line(line: &str, options: &ConversionOptions, out: &mut String) {
    let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
    let (indent, mut rest) = line.split_at(indent_len);
    out.push_str(indent);
    if options.escape_misc {
        rest = escape_block_marker(rest, options, out);
    }

    let mut chars = rest.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '*' if options.escape_asterisks => out.push_str("\\*"),
            '_' if options.escape_underscores => out.push_str("\\_"),
            // `<` could open raw HTML or an autolink.
            '\\' | '`' | '[' | ']' | '<' if options.escape_misc => {
                out.push('\\');
                out.push(c);
            }
            '&' if options.escape_misc && ENTITY.is_match(&rest[i..]) => out.push_str("\\&"),
            // Only `~~` opens strikethrough; a lone tilde stays.
            '~' if options.escape_misc && matches!(chars.peek(), Some((_, '~'))) => {
                chars.next();
                out.push_str("\\~~");
            }
            _ => out.push(c),
        }
    }
}

/// Escape a block marker at the start of `line`. Returns the part of the
/// line still to be processed.
fn escape_block_marker<'a>(line: &'a str, options: &ConversionOptions, out: &mut String) -> &'a str {
    let bytes = line.as_bytes();
    let ends_marker = |i: usize| bytes.get(i).is_none_or(|b| *b == b' ' || *b == b'\t');

    match bytes.first() {
        Some(b'#') => {
            let hashes = bytes.iter().take_while(|b| **b == b'#').count();
            if hashes <= 6 && ends_marker(hashes) {
                out.push('\\');
            }
            line
        }
        Some(b'>') => {
            out.push('\\');
            line
        }
        Some(b'-' | b'+') if ends_marker(1) => {
            out.push('\\');
            line
        }
        // With asterisk escaping on, the inline pass already covers it.
        Some(b'*') if !options.escape_asterisks && ends_marker(1) => {
            out.push('\\');
            line
        }
        Some(b'0'..=b'9') => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits <= 9 && matches!(bytes.get(digits), Some(b'.' | b')')) && ends_marker(digits + 1)
            {
                out.push_str(&line[..digits]);
                out.push('\\');
                &line[digits..]
            } else {
                line
            }
        }
        _ => line,
    }
}
