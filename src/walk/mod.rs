// Tree walker / dispatcher.
//
// Depth-first, post-order: an element's children are converted first, then
// its rule is applied to their concatenated output. Text nodes go through
// the escaping engine, and sibling output is joined so that blocks are
// separated by a single blank line. Context changes made on entering an
// element are undone by the `Scope` guard when the element is left.

pub(crate) mod context;

use crate::dom::{NodeKind, NodeRef};
use crate::error::ConvertError;
use crate::rules::RuleSet;
use crate::text::{collapse_whitespace, escape, push_joined};

pub use context::{Context, ListFrame, ListKind};

/// Elements that lay out as blocks. Whitespace-only text next to them (or at
/// the edges of them) carries no meaning and is dropped.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "head", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre",
    "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

pub(crate) fn is_block(node: &NodeRef<'_>) -> bool {
    node.tag().is_some_and(|tag| BLOCK_TAGS.contains(&tag))
}

pub(crate) struct Walker<'r> {
    rules: &'r RuleSet,
}

impl<'r> Walker<'r> {
    pub(crate) fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Convert `node` and everything below it.
    pub(crate) fn walk(&self, node: NodeRef<'_>, cx: &mut Context<'_>) -> Result<String, ConvertError> {
        match node.kind() {
            NodeKind::Document => self.children(node, cx),
            NodeKind::Text(raw) => Ok(process_text(node, raw, cx)),
            NodeKind::Element(el) => self.element(node, el.tag(), cx),
        }
    }

    /// Convert all children of a node and concatenate them in document order.
    /// Outside literal regions, adjacent blocks end up one blank line apart.
    fn children(&self, node: NodeRef<'_>, cx: &mut Context<'_>) -> Result<String, ConvertError> {
        let mut out = String::new();
        for child in node.children() {
            if cx.in_literal() {
                out.push_str(&self.walk(child, cx)?);
                continue;
            }
            if is_droppable_whitespace(&child) {
                continue;
            }
            push_joined(&mut out, &self.walk(child, cx)?);
        }
        Ok(out)
    }

    fn element(&self, node: NodeRef<'_>, tag: &str, cx: &mut Context<'_>) -> Result<String, ConvertError> {
        #[cfg(feature = "tracing")]
        tracing::trace!(tag, inline = cx.is_inline(), "converting element");

        let mut scope = cx.enter(node);
        let text = self.children(node, &mut scope)?;
        scope.restore_flags();

        if !scope.options().should_convert_tag(tag) {
            return Ok(text);
        }
        self.rules.resolve(tag).apply(node, &text, &scope)
    }
}

/// Whitespace-only text whose parent is a block container and which sits at
/// an edge or next to another block.
fn is_droppable_whitespace(node: &NodeRef<'_>) -> bool {
    if !node.is_whitespace_text() {
        return false;
    }
    let parent_is_block = node
        .parent()
        .is_some_and(|p| p.is_document() || is_block(&p));
    if !parent_is_block {
        return false;
    }
    let beside_block = |sibling: Option<NodeRef<'_>>| sibling.is_none_or(|s| is_block(&s));
    beside_block(node.previous_sibling()) || beside_block(node.next_sibling())
}

/// Text node → Markdown text: collapse whitespace outside `<pre>`, escape
/// outside code, and drop trailing space that would end up before a list
/// item's line break.
fn process_text(node: NodeRef<'_>, raw: &str, cx: &Context<'_>) -> String {
    let mut text = if cx.in_literal() {
        raw.to_string()
    } else {
        collapse_whitespace(raw)
    };
    if !cx.in_code() {
        text = escape(&text, cx.options());
    }

    if node.parent().is_some_and(|p| p.is_tag("li")) {
        let next = node.following_siblings().find(|n| !n.is_whitespace_text());
        if next.is_none_or(|n| n.is_tag("ul") || n.is_tag("ol")) {
            text.truncate(text.trim_end().len());
        }
    }
    text
}
