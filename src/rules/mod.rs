// Tag rule registry.
//
// A string-keyed table from tag name to rule. Keys are plain strings, so
// namespaced tags (`ac:structured-macro`) are ordinary entries. The shipped
// rule for any tag stays reachable through `base_rule` after it has been
// overridden, which is how an override delegates to the default behaviour.

mod handlers;
mod table;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dom::NodeRef;
use crate::error::ConvertError;
use crate::walk::Context;

pub use handlers::{
    blockquote, code, code_macro, container, drop_content, emphasis, heading, image,
    line_break, link, list, list_item, paragraph, passthrough, preformatted, strikethrough,
    strong, subscript, superscript, thematic_break,
};
pub use table::{caption, cell, figcaption, row, table};

type RuleFn = dyn Fn(NodeRef<'_>, &str, &Context<'_>) -> Result<String, ConvertError> + Send + Sync;
type RulePtr = fn(NodeRef<'_>, &str, &Context<'_>) -> Result<String, ConvertError>;

/// A formatting rule: element, its already-converted children, context →
/// Markdown fragment.
#[derive(Clone)]
pub struct Rule(Arc<RuleFn>);

impl Rule {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(NodeRef<'_>, &str, &Context<'_>) -> Result<String, ConvertError>
            + Send
            + Sync
            + 'static,
    {
        Rule(Arc::new(f))
    }

    pub fn apply(
        &self,
        node: NodeRef<'_>,
        text: &str,
        cx: &Context<'_>,
    ) -> Result<String, ConvertError> {
        (self.0)(node, text, cx)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rule(..)")
    }
}

/// Tags with a shipped rule.
pub const SHIPPED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "caption", "code", "del", "em", "figcaption", "h1", "h2",
    "h3", "h4", "h5", "h6", "hr", "i", "img", "kbd", "li", "ol", "p", "pre", "s", "samp",
    "script", "strong", "style", "sub", "sup", "table", "td", "th", "tr", "ul",
];

/// The shipped rule for `tag`, independent of any registry.
///
/// Stays available after the tag has been overridden, so an override can
/// call it and extend its output.
pub fn base_rule(tag: &str) -> Option<Rule> {
    let f: RulePtr = match tag.to_ascii_lowercase().as_str() {
        "a" => link,
        "b" | "strong" => strong,
        "em" | "i" => emphasis,
        "del" | "s" => strikethrough,
        "sub" => subscript,
        "sup" => superscript,
        "code" | "kbd" | "samp" => code,
        "pre" => preformatted,
        "p" => paragraph,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => heading,
        "blockquote" => blockquote,
        "br" => line_break,
        "hr" => thematic_break,
        "img" => image,
        "ul" | "ol" => list,
        "li" => list_item,
        "table" => table,
        "caption" => caption,
        "figcaption" => figcaption,
        "tr" => row,
        "td" | "th" => cell,
        "script" | "style" => drop_content,
        _ => return None,
    };
    Some(Rule::new(f))
}

/// Tag → rule table with a fallback for everything else.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: HashMap<String, Rule>,
    fallback: Rule,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSet {
    /// Registry holding every shipped rule, with [`container`] as fallback.
    pub fn new() -> Self {
        let mut set = Self::empty();
        for tag in SHIPPED_TAGS {
            if let Some(rule) = base_rule(tag) {
                set.rules.insert((*tag).to_string(), rule);
            }
        }
        set
    }

    /// Registry with no rules: every element goes through [`container`].
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            fallback: Rule::new(container),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&Rule> {
        self.rules.get(&tag.to_ascii_lowercase())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    /// The rule for `tag`, or the fallback.
    pub fn resolve(&self, tag: &str) -> &Rule {
        self.get(tag).unwrap_or(&self.fallback)
    }

    /// Register `f` for `tag`, returning the rule it replaces.
    pub fn insert<F>(&mut self, tag: &str, f: F) -> Option<Rule>
    where
        F: Fn(NodeRef<'_>, &str, &Context<'_>) -> Result<String, ConvertError>
            + Send
            + Sync
            + 'static,
    {
        self.insert_rule(tag, Rule::new(f))
    }

    /// Register an existing rule for `tag`, returning the rule it replaces.
    pub fn insert_rule(&mut self, tag: &str, rule: Rule) -> Option<Rule> {
        #[cfg(feature = "tracing")]
        tracing::debug!(tag, "registering rule");
        self.rules.insert(tag.to_ascii_lowercase(), rule)
    }

    pub fn remove(&mut self, tag: &str) -> Option<Rule> {
        self.rules.remove(&tag.to_ascii_lowercase())
    }

    pub fn fallback(&self) -> &Rule {
        &self.fallback
    }

    /// Replace the rule used for tags without an entry.
    pub fn set_fallback(&mut self, rule: Rule) {
        self.fallback = rule;
    }

    /// Registered tags, in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}
