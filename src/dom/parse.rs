// HTML string → Document.
//
// Parses with html5ever into an RcDom, then copies elements and text into
// the arena. Comments, doctypes and processing instructions are dropped.

use std::borrow::Cow;
use std::sync::LazyLock;

use html5ever::parse_document as parse_rcdom;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever::QualName;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::{Captures, Regex};

use super::{Document, NodeId, NodeKind};

/// html5ever only honours CDATA inside foreign content; in HTML content it
/// becomes a bogus comment cut at the first `>`. Rewriting the section into
/// escaped text keeps its body intact.
static CDATA_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("valid CDATA pattern"));

pub(crate) fn parse_document(html: &str) -> Document {
    let dom = parse_html(html);
    let mut doc = Document::new();
    let root = doc.root_id();
    copy_children(&mut doc, root, &dom.document);
    doc
}

pub(crate) fn parse_fragment(html: &str) -> Document {
    let dom = parse_html(html);
    let mut doc = Document::new();
    let root = doc.root_id();
    // Unwrap <html>, then <head> and <body>, keeping their content in order.
    for child in dom.document.children.borrow().iter() {
        if !is_element_named(child, "html") {
            continue;
        }
        for section in child.children.borrow().iter() {
            if is_element_named(section, "head") || is_element_named(section, "body") {
                copy_children(&mut doc, root, section);
            } else {
                copy_one(&mut doc, root, section);
            }
        }
    }
    doc
}

/// Parse an HTML string into an html5ever RcDom.
fn parse_html(html: &str) -> RcDom {
    let html = recover_cdata(html);
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_rcdom(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}

fn recover_cdata(html: &str) -> Cow<'_, str> {
    CDATA_SECTION.replace_all(html, |caps: &Captures<'_>| {
        caps[1]
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    })
}

/// Copy the children of `handle` under `parent`.
///
/// Iterative so that deeply nested input cannot exhaust the stack here.
fn copy_children(doc: &mut Document, parent: NodeId, handle: &Handle) {
    let mut stack: Vec<(Handle, NodeId)> = handle
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), parent))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        if let Some(id) = copy_one(doc, parent, &handle) {
            let children = handle.children.borrow();
            stack.extend(children.iter().rev().map(|child| (child.clone(), id)));
        }
    }
}

/// Copy a single node (without its children). Returns the new id when the
/// node is an element whose children should follow.
fn copy_one(doc: &mut Document, parent: NodeId, handle: &Handle) -> Option<NodeId> {
    match &handle.data {
        NodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            let attrs: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|attr| (qualified(&attr.name), attr.value.to_string()))
                .collect();
            Some(doc.append_element(parent, &qualified(name), attrs))
        }
        NodeData::Text { ref contents } => {
            let text = contents.borrow();
            if !text.is_empty() {
                append_or_merge_text(doc, parent, &text);
            }
            None
        }
        _ => None,
    }
}

/// Adjacent text (e.g. around a recovered CDATA section) is kept as one node.
fn append_or_merge_text(doc: &mut Document, parent: NodeId, text: &str) {
    if let Some(&last) = doc.nodes[parent.0].children.last() {
        if let NodeKind::Text(ref mut existing) = doc.nodes[last.0].kind {
            existing.push_str(text);
            return;
        }
    }
    doc.append_text(parent, text);
}

/// `prefix:local` when html5ever split a namespaced name, `local` otherwise.
fn qualified(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

fn is_element_named(handle: &Handle, tag: &str) -> bool {
    matches!(&handle.data, NodeData::Element { ref name, .. } if &*name.local == tag)
}
