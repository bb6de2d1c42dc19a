// Shipped rules for inline markup, blocks and lists.
//
// Every rule receives the element, the converted text of its children and
// the context as it was before the element was entered.

use crate::dom::NodeRef;
use crate::error::ConvertError;
use crate::options::{HeadingStyle, NewlineStyle};
use crate::text::{chomp, code_fence, indent, longest_backtick_run, unescape, wrap_lines};
use crate::walk::{is_block, Context, ListKind};

type RuleResult = Result<String, ConvertError>;

/// The children's text, unchanged.
pub fn passthrough(_node: NodeRef<'_>, text: &str, _cx: &Context<'_>) -> RuleResult {
    Ok(text.to_string())
}

/// Block elements laid out by the surrounding document or table rather
/// than by their own spacing.
const STRUCTURAL_BLOCKS: &[&str] = &["html", "head", "body", "thead", "tbody", "tfoot"];

/// Fallback for tags without a rule. Generic block containers (`div`,
/// `section`, `dd`, ...) are set off by a blank line on each side; inline
/// elements, and anything inside a heading, cell or `<pre>`, pass their
/// text through.
pub fn container(node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    let spaced = is_block(&node)
        && !cx.is_inline()
        && !cx.in_literal()
        && !node.tag().is_some_and(|tag| STRUCTURAL_BLOCKS.contains(&tag));
    if !spaced {
        return Ok(text.to_string());
    }
    let text = text.trim();
    if text.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("\n\n{text}\n\n"))
}

/// `<script>`, `<style>`: nothing.
pub fn drop_content(_node: NodeRef<'_>, _text: &str, _cx: &Context<'_>) -> RuleResult {
    Ok(String::new())
}

/// Wrap `text` in `marker` on both sides, keeping surrounding spaces
/// outside the markers.
fn inline_markup(text: &str, marker: &str, cx: &Context<'_>) -> String {
    if cx.in_code() {
        return text.to_string();
    }
    let chomped = chomp(text);
    if chomped.text.is_empty() {
        return String::new();
    }
    format!(
        "{}{marker}{}{marker}{}",
        chomped.prefix, chomped.text, chomped.suffix
    )
}

pub fn strong(_node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    let marker = cx.options().strong_em_symbol.to_string().repeat(2);
    Ok(inline_markup(text, &marker, cx))
}

pub fn emphasis(_node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    let marker = cx.options().strong_em_symbol.to_string();
    Ok(inline_markup(text, &marker, cx))
}

pub fn strikethrough(_node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    Ok(inline_markup(text, "~~", cx))
}

pub fn subscript(_node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    Ok(inline_markup(text, &cx.options().sub_symbol, cx))
}

pub fn superscript(_node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    Ok(inline_markup(text, &cx.options().sup_symbol, cx))
}

/// `<code>`, `<kbd>`, `<samp>` as a code span. Inside `<pre>` the text is
/// returned as is; the block rule fences it.
pub fn code(_node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    if cx.in_code() {
        return Ok(text.to_string());
    }
    let chomped = chomp(text);
    if chomped.text.is_empty() {
        return Ok(String::new());
    }
    let delimiter = "`".repeat(longest_backtick_run(chomped.text) + 1);
    let pad = if chomped.text.starts_with('`') || chomped.text.ends_with('`') {
        " "
    } else {
        ""
    };
    Ok(format!(
        "{}{delimiter}{pad}{}{pad}{delimiter}{}",
        chomped.prefix, chomped.text, chomped.suffix
    ))
}

fn quote_title(title: &str) -> String {
    if title.is_empty() {
        String::new()
    } else {
        format!(" \"{}\"", title.replace('"', "\\\""))
    }
}

pub fn link(node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    let chomped = chomp(text);
    if chomped.text.is_empty() {
        return Ok(String::new());
    }
    let Some(raw_href) = node.attr("href").filter(|href| !href.is_empty()) else {
        return Ok(text.to_string());
    };
    let options = cx.options();
    let title = node.attr("title").unwrap_or_default();

    if options.autolinks
        && title.is_empty()
        && !options.default_title
        && unescape(chomped.text) == raw_href
    {
        return Ok(format!(
            "{}<{}>{}",
            chomped.prefix,
            cx.resolve_url(raw_href),
            chomped.suffix
        ));
    }

    let href = cx.resolve_url(raw_href);
    let title = if title.is_empty() && options.default_title {
        href.as_str()
    } else {
        title
    };
    Ok(format!(
        "{}[{}]({href}{}){}",
        chomped.prefix,
        chomped.text,
        quote_title(title),
        chomped.suffix
    ))
}

/// `![alt](src "title")`. Inside headings and table cells only the alt text
/// is kept, unless the parent tag is listed in `keep_inline_images_in`.
pub fn image(node: NodeRef<'_>, _text: &str, cx: &Context<'_>) -> RuleResult {
    let alt = node.attr("alt").unwrap_or_default();
    let options = cx.options();

    if cx.is_inline() {
        let keep = node.parent_tag().is_some_and(|parent| {
            options
                .keep_inline_images_in
                .iter()
                .any(|tag| tag.eq_ignore_ascii_case(parent))
        });
        if !keep {
            return Ok(alt.to_string());
        }
    }

    let src = match node.attr("src").unwrap_or_default() {
        "" => String::new(),
        src => cx.resolve_url(src),
    };
    let title = quote_title(node.attr("title").unwrap_or_default());
    let alt = if options.escape_misc {
        alt.replace('[', "\\[").replace(']', "\\]")
    } else {
        alt.to_string()
    };
    Ok(format!("![{alt}]({src}{title})"))
}

pub fn paragraph(_node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    if cx.is_inline() {
        return Ok(text.to_string());
    }
    let text = text.trim_matches(' ');
    if text.is_empty() {
        return Ok(String::new());
    }
    let options = cx.options();
    if options.wrap {
        return Ok(format!("{}\n\n", wrap_lines(text, options.wrap_width)));
    }
    Ok(format!("{text}\n\n"))
}

pub fn heading(node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    if cx.is_inline() {
        return Ok(text.to_string());
    }
    let text = text.trim();
    if text.is_empty() {
        return Ok(String::new());
    }
    let level = node
        .tag()
        .and_then(|tag| tag.strip_prefix('h'))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, 6);

    let style = cx.options().heading_style;
    if style == HeadingStyle::Underlined && level <= 2 {
        let line = if level == 1 { "=" } else { "-" };
        return Ok(format!("{text}\n{}\n\n", line.repeat(text.chars().count())));
    }
    let hashes = "#".repeat(level);
    if style == HeadingStyle::AtxClosed {
        return Ok(format!("{hashes} {text} {hashes}\n\n"));
    }
    Ok(format!("{hashes} {text}\n\n"))
}

pub fn blockquote(_node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    if cx.is_inline() {
        return Ok(text.to_string());
    }
    let text = text.trim();
    if text.is_empty() {
        return Ok(String::new());
    }
    let quoted = text
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    Ok(format!("\n{quoted}\n\n"))
}

pub fn line_break(_node: NodeRef<'_>, _text: &str, cx: &Context<'_>) -> RuleResult {
    if cx.is_inline() {
        return Ok(String::new());
    }
    Ok(match cx.options().newline_style {
        NewlineStyle::Spaces => "  \n",
        NewlineStyle::Backslash => "\\\n",
    }
    .to_string())
}

pub fn thematic_break(_node: NodeRef<'_>, _text: &str, _cx: &Context<'_>) -> RuleResult {
    Ok("\n\n---\n\n".to_string())
}

/// `<pre>` as a fenced block. The language comes from the callback, then
/// `code_language`.
pub fn preformatted(node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    let body = text.trim_end_matches('\n');
    if body.is_empty() {
        return Ok(String::new());
    }
    let options = cx.options();
    let language = options
        .code_language_callback
        .as_ref()
        .and_then(|callback| callback(node))
        .unwrap_or_else(|| options.code_language.clone());
    let fence = code_fence(body);
    Ok(format!("\n{fence}{language}\n{body}\n{fence}\n"))
}

/// `<ul>`, `<ol>`. A list nested in a list item is indented one level
/// under it.
pub fn list(node: NodeRef<'_>, text: &str, _cx: &Context<'_>) -> RuleResult {
    if node.has_ancestor("li") {
        return Ok(format!("\n{}", indent(text, 1).trim_end()));
    }
    let before_paragraph = node
        .following_siblings()
        .find(|n| !n.is_whitespace_text())
        .is_some_and(|n| !n.is_tag("ul") && !n.is_tag("ol"));
    if before_paragraph {
        return Ok(format!("{text}\n"));
    }
    Ok(text.to_string())
}

pub fn list_item(_node: NodeRef<'_>, text: &str, cx: &Context<'_>) -> RuleResult {
    let bullet = match cx.current_list() {
        Some(frame) if frame.kind == ListKind::Ordered => format!("{}.", frame.number()),
        _ => {
            let bullets: Vec<char> = cx.options().bullets.chars().collect();
            if bullets.is_empty() {
                "*".to_string()
            } else {
                let depth = cx.unordered_depth() + bullets.len() - 1;
                bullets[depth % bullets.len()].to_string()
            }
        }
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(format!("{bullet}\n"));
    }
    Ok(format!("{bullet} {text}\n"))
}

/// Confluence-style `ac:structured-macro` code block.
///
/// Language and title come from the first descendants carrying
/// `ac:name="language"` / `ac:name="title"`; the body is the trimmed text of
/// the first `ac:plain-text-body`. The block's own parts are looked up
/// without entering nested blocks of the same tag, and nested blocks are
/// rendered after it. A block with no body of its own takes its parts from
/// the nested blocks instead. The children's converted text is not used.
/// Not registered by default.
pub fn code_macro(node: NodeRef<'_>, _text: &str, cx: &Context<'_>) -> RuleResult {
    let Some(tag) = node.tag() else {
        return Ok(String::new());
    };
    let own_body = node.find_within(tag, |n| n.is_tag("ac:plain-text-body"));
    let lookup = |pred: &dyn Fn(&NodeRef<'_>) -> bool| match own_body {
        Some(_) => node.find_within(tag, |n| pred(n)),
        None => node.find(|n| pred(n)),
    };

    let language = lookup(&|n: &NodeRef<'_>| n.attr("ac:name") == Some("language"))
        .map(|param| param.text().trim().to_string())
        .unwrap_or_else(|| cx.options().code_language.clone());
    let title = lookup(&|n: &NodeRef<'_>| n.attr("ac:name") == Some("title"))
        .map(|param| format!("**{}**\n", param.text().trim()))
        .unwrap_or_default();
    let body = lookup(&|n: &NodeRef<'_>| n.is_tag("ac:plain-text-body"))
        .map(|body| body.text())
        .unwrap_or_default();
    let body = body.trim();
    let fence = code_fence(body);
    let mut out = format!("\n{title}{fence}{language}\n{body}\n{fence}\n");

    if own_body.is_some() {
        for nested in node.outermost(tag) {
            out.push_str(&code_macro(nested, "", cx)?);
        }
    }
    Ok(out)
}
