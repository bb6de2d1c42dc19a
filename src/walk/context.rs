// Conversion context threaded through the walk.
//
// One `Context` per conversion call. Entering an element goes through
// `Context::enter`, which returns a `Scope` guard; dropping the guard undoes
// everything the entry changed, including when a rule fails or panics.

use std::ops::{Deref, DerefMut};

use url::Url;

use crate::dom::NodeRef;
use crate::options::ConversionOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// One open `<ul>`/`<ol>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFrame {
    pub kind: ListKind,
    /// First number of an ordered list (`start` attribute, default 1).
    pub start: i64,
    /// List items entered so far, the current one included.
    pub items: usize,
}

impl ListFrame {
    /// Number of the current item in an ordered list. Saturates instead of
    /// wrapping for `start` values near the `i64` limits.
    pub fn number(&self) -> i64 {
        let offset = i64::try_from(self.items.saturating_sub(1)).unwrap_or(i64::MAX);
        self.start.saturating_add(offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flags {
    inline: bool,
    literal: bool,
    code: bool,
}

/// State visible to rules: options, inline flag, literal regions and the
/// stack of open lists.
#[derive(Debug)]
pub struct Context<'a> {
    options: &'a ConversionOptions,
    base_url: Option<Url>,
    flags: Flags,
    lists: Vec<ListFrame>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(options: &'a ConversionOptions, base_url: Option<Url>) -> Self {
        Self {
            options,
            base_url,
            flags: Flags {
                inline: false,
                literal: false,
                code: false,
            },
            lists: Vec::new(),
        }
    }

    pub fn options(&self) -> &'a ConversionOptions {
        self.options
    }

    /// Whether the element being converted sits inside a heading or table
    /// cell, where block syntax cannot appear.
    pub fn is_inline(&self) -> bool {
        self.flags.inline
    }

    /// Inside `<pre>`: whitespace is kept as is.
    pub fn in_literal(&self) -> bool {
        self.flags.literal
    }

    /// Inside `<pre>`, `<code>`, `<kbd>` or `<samp>`: text is not escaped.
    pub fn in_code(&self) -> bool {
        self.flags.code
    }

    pub fn list_depth(&self) -> usize {
        self.lists.len()
    }

    /// Innermost open list.
    pub fn current_list(&self) -> Option<&ListFrame> {
        self.lists.last()
    }

    /// Number of open unordered lists.
    pub fn unordered_depth(&self) -> usize {
        self.lists
            .iter()
            .filter(|frame| frame.kind == ListKind::Unordered)
            .count()
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Resolve a URL against the base URL, if any.
    pub fn resolve_url(&self, raw: &str) -> String {
        if let Some(base) = &self.base_url {
            if let Ok(resolved) = base.join(raw) {
                return resolved.to_string();
            }
        }
        raw.to_string()
    }

    /// Enter `node`. The returned guard restores the previous state on drop.
    pub(crate) fn enter<'c>(&'c mut self, node: NodeRef<'_>) -> Scope<'c, 'a> {
        let saved = self.flags;
        let pushed_list = self.apply_entry(node);
        Scope {
            cx: self,
            saved,
            pushed_list,
        }
    }

    /// Rebuild the state a walk from the document root would have when
    /// reaching `node`, so a subtree converts as it would in place.
    pub(crate) fn seed_from_ancestors(&mut self, node: NodeRef<'_>) {
        let mut ancestors: Vec<NodeRef<'_>> = node.ancestors().collect();
        ancestors.reverse();
        for ancestor in ancestors {
            self.align_list_items(ancestor);
            self.apply_entry(ancestor);
        }
        self.align_list_items(node);
    }

    /// Before entering an `<li>`, count the items that precede it.
    fn align_list_items(&mut self, node: NodeRef<'_>) {
        if !node.is_tag("li") {
            return;
        }
        if let Some(frame) = self.lists.last_mut() {
            frame.items = node.preceding_siblings().filter(|n| n.is_tag("li")).count();
        }
    }

    /// Apply the state change for entering `node`. Returns whether a list
    /// frame was pushed.
    fn apply_entry(&mut self, node: NodeRef<'_>) -> bool {
        let Some(tag) = node.tag() else {
            return false;
        };
        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "td" | "th" => self.flags.inline = true,
            "pre" => {
                self.flags.literal = true;
                self.flags.code = true;
            }
            "code" | "kbd" | "samp" => self.flags.code = true,
            "ul" => {
                self.lists.push(ListFrame {
                    kind: ListKind::Unordered,
                    start: 1,
                    items: 0,
                });
                return true;
            }
            "ol" => {
                let start = node
                    .attr("start")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(1);
                self.lists.push(ListFrame {
                    kind: ListKind::Ordered,
                    start,
                    items: 0,
                });
                return true;
            }
            "li" => {
                if let Some(frame) = self.lists.last_mut() {
                    frame.items += 1;
                }
            }
            _ => {}
        }
        false
    }
}

/// Guard returned by [`Context::enter`].
pub(crate) struct Scope<'c, 'a> {
    cx: &'c mut Context<'a>,
    saved: Flags,
    pushed_list: bool,
}

impl Scope<'_, '_> {
    /// Put the inline/literal/code flags back to their values on entry, so
    /// the element's own rule sees its parent's state. The list frame stays
    /// until the guard drops.
    pub(crate) fn restore_flags(&mut self) {
        self.cx.flags = self.saved;
    }
}

impl<'a> Deref for Scope<'_, 'a> {
    type Target = Context<'a>;

    fn deref(&self) -> &Self::Target {
        self.cx
    }
}

impl DerefMut for Scope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cx
    }
}

impl Drop for Scope<'_, '_> {
    fn drop(&mut self) {
        self.cx.flags = self.saved;
        if self.pushed_list {
            self.cx.lists.pop();
        }
    }
}
