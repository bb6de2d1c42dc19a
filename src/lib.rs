// tagmark — HTML to Markdown through per-tag rules.
//
// Architecture:
//   HTML string → html5ever parse → Document arena → walker (post-order) →
//   tag rule per element → Markdown text → finalize
//
// The walker converts an element's children first and hands their
// concatenated output to the element's rule. Rules live in a string-keyed
// registry, so callers can override any tag or add namespaced ones such as
// `ac:structured-macro`, and still reach the shipped rule through
// `rules::base_rule`.

//! HTML to Markdown conversion driven by a per-tag rule registry.
//!
//! ```
//! let md = tagmark::convert("<h2>Hello</h2><p>A <b>bold</b> move.</p>").unwrap();
//! assert_eq!(md, "Hello\n-----\n\nA **bold** move.\n\n");
//! ```
//!
//! # Custom rules
//!
//! A rule receives the element, the Markdown already produced for its
//! children and the conversion [`Context`]. Overrides can delegate to the
//! shipped rule:
//!
//! ```
//! use tagmark::{rules, Converter};
//!
//! let converter = Converter::default()
//!     .rule("ac:structured-macro", rules::code_macro)
//!     .rule("del", |node, text, cx| {
//!         let base = rules::base_rule("del").expect("shipped rule");
//!         Ok(format!("[removed: {}]", base.apply(node, text, cx)?))
//!     });
//!
//! let md = converter.convert_fragment("<del>old</del>").unwrap();
//! assert_eq!(md, "[removed: ~~old~~]");
//! ```
//!
//! # Recursion
//!
//! Conversion recurses once per level of element nesting and has no depth
//! limit of its own. Extremely deep input (tens of thousands of levels) can
//! exhaust the stack; run such conversions on a thread with a larger stack.

mod converter;
mod dom;
mod error;
mod options;
pub mod rules;
pub mod text;
mod walk;

pub use converter::Converter;
pub use dom::{Descendants, Document, Element, NodeId, NodeKind, NodeRef};
pub use error::{ConvertError, OptionsError};
pub use options::{CodeLanguageCallback, ConversionOptions, HeadingStyle, NewlineStyle};
pub use rules::{base_rule, Rule, RuleSet};
pub use walk::{Context, ListFrame, ListKind};

/// Convert an HTML document to Markdown using default options.
///
/// # Examples
///
/// ```
/// let md = tagmark::convert("<ul><li>one</li><li>two</li></ul>").unwrap();
/// assert_eq!(md, "* one\n* two\n");
/// ```
pub fn convert(html: &str) -> Result<String, ConvertError> {
    Converter::default().convert(html)
}

/// Convert an HTML document to Markdown with custom options.
///
/// # Examples
///
/// ```
/// use tagmark::{convert_with, ConversionOptions, HeadingStyle};
///
/// let options = ConversionOptions::new().with_heading_style(HeadingStyle::Atx);
/// let md = convert_with("<h1>Hello</h1>", &options).unwrap();
/// assert_eq!(md, "# Hello\n\n");
/// ```
pub fn convert_with(html: &str, options: &ConversionOptions) -> Result<String, ConvertError> {
    Converter::new(options.clone())?.convert(html)
}

/// Convert an HTML fragment without document finalization.
///
/// ```
/// use tagmark::ConversionOptions;
///
/// let md = tagmark::convert_fragment("<b>test</b>", &ConversionOptions::default()).unwrap();
/// assert_eq!(md, "**test**");
/// ```
pub fn convert_fragment(html: &str, options: &ConversionOptions) -> Result<String, ConvertError> {
    Converter::new(options.clone())?.convert_fragment(html)
}
