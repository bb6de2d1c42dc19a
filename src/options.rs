// Conversion options.
//
// A closed record: every field has a documented default and a `with_*`
// builder. `set` offers the same fields through string keys and rejects
// anything it does not know. Values meant for caller-defined rules live in
// `extras` and are never interpreted by the shipped rules.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::dom::NodeRef;
use crate::error::OptionsError;

/// Heading style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// `# Heading`.
    Atx,
    /// `# Heading #`.
    AtxClosed,
    /// Underlined with `=`/`-` for h1/h2 (default); falls back to ATX for h3–h6.
    #[default]
    Underlined,
}

/// How `<br>` is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewlineStyle {
    /// Two trailing spaces (default).
    #[default]
    Spaces,
    /// A trailing backslash.
    Backslash,
}

/// Picks the fence language for a `<pre>` element. `None` falls back to
/// [`ConversionOptions::code_language`].
pub type CodeLanguageCallback = Arc<dyn Fn(NodeRef<'_>) -> Option<String> + Send + Sync>;

/// Conversion options.
#[derive(Clone)]
pub struct ConversionOptions {
    pub heading_style: HeadingStyle,
    /// Unordered list markers, cycled by nesting depth. Default: `"*+-"`.
    pub bullets: String,
    /// `*` (default) or `_`, doubled for strong.
    pub strong_em_symbol: char,
    /// Wrapper for `<sub>` content. Default: empty (plain text).
    pub sub_symbol: String,
    /// Wrapper for `<sup>` content. Default: empty (plain text).
    pub sup_symbol: String,
    pub newline_style: NewlineStyle,
    /// Fence language used when nothing more specific is known. Default: empty.
    pub code_language: String,
    pub code_language_callback: Option<CodeLanguageCallback>,
    /// Write `<a href="x">x</a>` as `<x>`. Default: `true`.
    pub autolinks: bool,
    /// Use the href as link title when the link has none. Default: `false`.
    pub default_title: bool,
    /// Default: `true`.
    pub escape_asterisks: bool,
    /// Default: `true`.
    pub escape_underscores: bool,
    /// Escape backslashes, backticks, brackets, `~~` and line-start block
    /// markers. Default: `true`.
    pub escape_misc: bool,
    /// Parent tags whose images stay images inside headings and table cells.
    pub keep_inline_images_in: Vec<String>,
    /// Tags whose rule is skipped (content kept). Exclusive with `convert`.
    pub strip: Option<Vec<String>>,
    /// Only these tags get their rule applied. Exclusive with `strip`.
    pub convert: Option<Vec<String>>,
    /// Wrap paragraphs at `wrap_width` columns. Default: `false`.
    pub wrap: bool,
    /// Default: `80`.
    pub wrap_width: usize,
    /// Base for relative `href`/`src` values. A `<base href>` in the
    /// document is resolved against it.
    pub base_url: Option<Url>,
    /// Caller-supplied values for caller-defined rules, stored untouched.
    pub extras: BTreeMap<String, String>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::default(),
            bullets: "*+-".to_string(),
            strong_em_symbol: '*',
            sub_symbol: String::new(),
            sup_symbol: String::new(),
            newline_style: NewlineStyle::default(),
            code_language: String::new(),
            code_language_callback: None,
            autolinks: true,
            default_title: false,
            escape_asterisks: true,
            escape_underscores: true,
            escape_misc: true,
            keep_inline_images_in: Vec::new(),
            strip: None,
            convert: None,
            wrap: false,
            wrap_width: 80,
            base_url: None,
            extras: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for ConversionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOptions")
            .field("heading_style", &self.heading_style)
            .field("bullets", &self.bullets)
            .field("strong_em_symbol", &self.strong_em_symbol)
            .field("sub_symbol", &self.sub_symbol)
            .field("sup_symbol", &self.sup_symbol)
            .field("newline_style", &self.newline_style)
            .field("code_language", &self.code_language)
            .field(
                "code_language_callback",
                &self.code_language_callback.as_ref().map(|_| "<fn>"),
            )
            .field("autolinks", &self.autolinks)
            .field("default_title", &self.default_title)
            .field("escape_asterisks", &self.escape_asterisks)
            .field("escape_underscores", &self.escape_underscores)
            .field("escape_misc", &self.escape_misc)
            .field("keep_inline_images_in", &self.keep_inline_images_in)
            .field("strip", &self.strip)
            .field("convert", &self.convert)
            .field("wrap", &self.wrap)
            .field("wrap_width", &self.wrap_width)
            .field("base_url", &self.base_url)
            .field("extras", &self.extras)
            .finish()
    }
}

impl ConversionOptions {
    /// Create a new ConversionOptions with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the whole record. Called by [`crate::Converter::new`], so bad
    /// values are reported before any conversion starts.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.strip.is_some() && self.convert.is_some() {
            return Err(OptionsError::ConflictingTagFilters);
        }
        if self.bullets.is_empty() {
            return Err(OptionsError::invalid("bullets", "a non-empty string", ""));
        }
        if !matches!(self.strong_em_symbol, '*' | '_') {
            return Err(OptionsError::invalid(
                "strong_em_symbol",
                "one of \"*\", \"_\"",
                self.strong_em_symbol,
            ));
        }
        if self.wrap && self.wrap_width == 0 {
            return Err(OptionsError::invalid("wrap_width", "greater than 0", 0));
        }
        Ok(())
    }

    /// Whether the rule for `tag` should run, according to `strip`/`convert`.
    pub fn should_convert_tag(&self, tag: &str) -> bool {
        let listed = |tags: &Vec<String>| tags.iter().any(|t| t.eq_ignore_ascii_case(tag));
        match (&self.strip, &self.convert) {
            (Some(strip), _) => !listed(strip),
            (None, Some(convert)) => listed(convert),
            (None, None) => true,
        }
    }

    /// Value stored under `key` in `extras`.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    /// Set an option from string key and value.
    ///
    /// Keys are the field names. Unknown keys are rejected with
    /// [`OptionsError::UnknownKey`]; use [`ConversionOptions::set_extra`] for
    /// values consumed by caller-defined rules. List-valued fields take a
    /// comma-separated string.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), OptionsError> {
        match key {
            "heading_style" => {
                self.heading_style = match value.to_ascii_lowercase().as_str() {
                    "atx" => HeadingStyle::Atx,
                    "atx_closed" => HeadingStyle::AtxClosed,
                    "underlined" => HeadingStyle::Underlined,
                    _ => {
                        return Err(OptionsError::invalid(
                            key,
                            "one of \"atx\", \"atx_closed\", \"underlined\"",
                            value,
                        ))
                    }
                }
            }
            "newline_style" => {
                self.newline_style = match value.to_ascii_lowercase().as_str() {
                    "spaces" => NewlineStyle::Spaces,
                    "backslash" => NewlineStyle::Backslash,
                    _ => {
                        return Err(OptionsError::invalid(
                            key,
                            "one of \"spaces\", \"backslash\"",
                            value,
                        ))
                    }
                }
            }
            "bullets" => self.bullets = value.to_string(),
            "strong_em_symbol" => self.strong_em_symbol = parse_char(key, value, &['*', '_'])?,
            "sub_symbol" => self.sub_symbol = value.to_string(),
            "sup_symbol" => self.sup_symbol = value.to_string(),
            "code_language" => self.code_language = value.to_string(),
            "autolinks" => self.autolinks = parse_bool(key, value)?,
            "default_title" => self.default_title = parse_bool(key, value)?,
            "escape_asterisks" => self.escape_asterisks = parse_bool(key, value)?,
            "escape_underscores" => self.escape_underscores = parse_bool(key, value)?,
            "escape_misc" => self.escape_misc = parse_bool(key, value)?,
            "keep_inline_images_in" => self.keep_inline_images_in = parse_list(value),
            "strip" => self.strip = Some(parse_list(value)),
            "convert" => self.convert = Some(parse_list(value)),
            "wrap" => self.wrap = parse_bool(key, value)?,
            "wrap_width" => {
                self.wrap_width = value
                    .trim()
                    .parse()
                    .map_err(|_| OptionsError::invalid(key, "a non-negative integer", value))?
            }
            "base_url" => {
                self.base_url = Some(
                    Url::parse(value)
                        .map_err(|_| OptionsError::invalid(key, "an absolute URL", value))?,
                )
            }
            _ => return Err(OptionsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Store a value for caller-defined rules.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extras.insert(key.into(), value.into());
    }

    pub fn with_heading_style(mut self, style: HeadingStyle) -> Self {
        self.heading_style = style;
        self
    }

    pub fn with_bullets(mut self, bullets: impl Into<String>) -> Self {
        self.bullets = bullets.into();
        self
    }

    pub fn with_strong_em_symbol(mut self, symbol: char) -> Self {
        self.strong_em_symbol = symbol;
        self
    }

    pub fn with_sub_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.sub_symbol = symbol.into();
        self
    }

    pub fn with_sup_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.sup_symbol = symbol.into();
        self
    }

    pub fn with_newline_style(mut self, style: NewlineStyle) -> Self {
        self.newline_style = style;
        self
    }

    pub fn with_code_language(mut self, language: impl Into<String>) -> Self {
        self.code_language = language.into();
        self
    }

    /// Choose the fence language per `<pre>` element.
    pub fn with_code_language_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(NodeRef<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.code_language_callback = Some(Arc::new(callback));
        self
    }

    pub fn with_autolinks(mut self, autolinks: bool) -> Self {
        self.autolinks = autolinks;
        self
    }

    pub fn with_default_title(mut self, default_title: bool) -> Self {
        self.default_title = default_title;
        self
    }

    pub fn with_escape_asterisks(mut self, escape: bool) -> Self {
        self.escape_asterisks = escape;
        self
    }

    pub fn with_escape_underscores(mut self, escape: bool) -> Self {
        self.escape_underscores = escape;
        self
    }

    pub fn with_escape_misc(mut self, escape: bool) -> Self {
        self.escape_misc = escape;
        self
    }

    pub fn with_keep_inline_images_in<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep_inline_images_in = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strip<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strip = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_convert<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.convert = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    pub fn with_base_url(mut self, base: Url) -> Self {
        self.base_url = Some(base);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_extra(key, value);
        self
    }
}

fn parse_char(field: &str, value: &str, allowed: &[char]) -> Result<char, OptionsError> {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if chars.next().is_none() && allowed.contains(&c) => Ok(c),
        _ => Err(OptionsError::invalid(
            field,
            &format!(
                "one of {}",
                allowed
                    .iter()
                    .map(|c| format!("\"{c}\""))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            value,
        )),
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, OptionsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(OptionsError::invalid(field, "a boolean", value)),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ConversionOptions::default();
        assert_eq!(options.heading_style, HeadingStyle::Underlined);
        assert_eq!(options.bullets, "*+-");
        assert_eq!(options.strong_em_symbol, '*');
        assert_eq!(options.newline_style, NewlineStyle::Spaces);
        assert_eq!(options.code_language, "");
        assert!(options.autolinks);
        assert!(!options.default_title);
        assert!(options.escape_asterisks && options.escape_underscores && options.escape_misc);
        assert!(!options.wrap);
        assert_eq!(options.wrap_width, 80);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_builder() {
        let options = ConversionOptions::new()
            .with_heading_style(HeadingStyle::Atx)
            .with_bullets("-")
            .with_strong_em_symbol('_')
            .with_code_language("rust");

        assert_eq!(options.heading_style, HeadingStyle::Atx);
        assert_eq!(options.bullets, "-");
        assert_eq!(options.strong_em_symbol, '_');
        assert_eq!(options.code_language, "rust");
    }

    #[test]
    fn test_conflicting_filters_rejected() {
        let options = ConversionOptions::new().with_strip(["a"]).with_convert(["b"]);
        assert_eq!(options.validate(), Err(OptionsError::ConflictingTagFilters));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let options = ConversionOptions::new().with_strong_em_symbol('+');
        assert!(matches!(
            options.validate(),
            Err(OptionsError::InvalidOption { ref field, .. }) if field == "strong_em_symbol"
        ));

        let options = ConversionOptions::new().with_bullets("");
        assert!(options.validate().is_err());

        let options = ConversionOptions::new().with_wrap(true).with_wrap_width(0);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_set_known_keys() {
        let mut options = ConversionOptions::new();
        options.set("heading_style", "ATX_CLOSED").unwrap();
        options.set("escape_underscores", "false").unwrap();
        options.set("strip", "a, img").unwrap();
        options.set("wrap_width", "40").unwrap();
        options.set("base_url", "https://example.com/docs/").unwrap();

        assert_eq!(options.heading_style, HeadingStyle::AtxClosed);
        assert!(!options.escape_underscores);
        assert_eq!(options.strip, Some(vec!["a".to_string(), "img".to_string()]));
        assert_eq!(options.wrap_width, 40);
        assert_eq!(options.base_url.unwrap().as_str(), "https://example.com/docs/");
    }

    #[test]
    fn test_set_rejects_unknown_keys() {
        let mut options = ConversionOptions::new();
        assert_eq!(
            options.set("macro_language", "java"),
            Err(OptionsError::UnknownKey("macro_language".to_string()))
        );
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut options = ConversionOptions::new();
        assert!(options.set("strong_em_symbol", "**").is_err());
        assert!(options.set("autolinks", "maybe").is_err());
        assert!(options.set("base_url", "not a url").is_err());
        assert!(options.set("heading_style", "fancy").is_err());
    }

    #[test]
    fn test_extras_are_stored_untouched() {
        let options = ConversionOptions::new().with_extra("macro_language", " Java ");
        assert_eq!(options.extra("macro_language"), Some(" Java "));
        assert_eq!(options.extra("missing"), None);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_should_convert_tag() {
        let strip = ConversionOptions::new().with_strip(["A"]);
        assert!(!strip.should_convert_tag("a"));
        assert!(strip.should_convert_tag("b"));

        let convert = ConversionOptions::new().with_convert(["b"]);
        assert!(convert.should_convert_tag("B"));
        assert!(!convert.should_convert_tag("a"));
    }
}
