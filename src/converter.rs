// Converter facade: options + rules, and the conversion entry points.

use url::Url;

use crate::dom::{Document, NodeRef};
use crate::error::ConvertError;
use crate::options::ConversionOptions;
use crate::rules::RuleSet;
use crate::text::finalize;
use crate::walk::{Context, Walker};

/// Validated options plus a rule registry.
///
/// A `Converter` holds no per-conversion state; it is `Send + Sync` and can
/// be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConversionOptions,
    rules: RuleSet,
}

impl Converter {
    /// Create a converter with the shipped rules. Fails if `options` do not
    /// validate.
    pub fn new(options: ConversionOptions) -> Result<Self, ConvertError> {
        options.validate()?;
        Ok(Self {
            options,
            rules: RuleSet::new(),
        })
    }

    /// Replace the whole rule registry.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Register (or override) the rule for `tag`.
    ///
    /// ```
    /// use tagmark::{rules, Converter};
    ///
    /// let converter = Converter::default().rule("img", |node, text, cx| {
    ///     let base = rules::image(node, text, cx)?;
    ///     Ok(base + "\n\n")
    /// });
    /// let md = converter.convert(r#"<img src="/a.png" alt="A">"#).unwrap();
    /// assert_eq!(md, "![A](/a.png)\n\n");
    /// ```
    pub fn rule<F>(mut self, tag: &str, f: F) -> Self
    where
        F: Fn(NodeRef<'_>, &str, &Context<'_>) -> Result<String, ConvertError>
            + Send
            + Sync
            + 'static,
    {
        self.rules.insert(tag, f);
        self
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    /// Parse `html` as a document and convert it.
    pub fn convert(&self, html: &str) -> Result<String, ConvertError> {
        self.convert_document(&Document::parse(html))
    }

    /// Convert a whole document. The newline runs at its start and end are
    /// cut down to one blank line.
    pub fn convert_document(&self, doc: &Document) -> Result<String, ConvertError> {
        let markdown = self.convert_node(doc.root())?;
        Ok(finalize(&markdown))
    }

    /// Parse `html` as a fragment and convert it without document
    /// finalization.
    pub fn convert_fragment(&self, html: &str) -> Result<String, ConvertError> {
        self.convert_node(Document::parse_fragment(html).root())
    }

    /// Convert `node` and its subtree exactly as the rules produce it.
    ///
    /// Context is rebuilt from the node's ancestors first, so a list item or
    /// table cell converts the same as it would in place.
    pub fn convert_node(&self, node: NodeRef<'_>) -> Result<String, ConvertError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(node = ?node.id(), tag = node.tag(), "converting");

        let base_url = self.base_url(node.document());
        let mut cx = Context::new(&self.options, base_url);
        cx.seed_from_ancestors(node);
        Walker::new(&self.rules).walk(node, &mut cx)
    }

    /// `base_url` from the options, with a `<base href>` in the document
    /// resolved against it.
    fn base_url(&self, doc: &Document) -> Option<Url> {
        let configured = self.options.base_url.clone();
        let Some(href) = doc
            .root()
            .find_tag("base")
            .and_then(|base| base.attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
        else {
            return configured;
        };
        let resolved = match &configured {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        resolved.ok().or(configured)
    }
}
