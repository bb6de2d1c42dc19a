// Shared test helpers for tagmark.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tagmark::{rules, ConversionOptions, Converter};

/// Settings read from a fixture's optional `index.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Convert as a fragment (no document finalization).
    pub fragment: bool,
    /// Option key → value, applied through `ConversionOptions::set`.
    pub options: BTreeMap<String, String>,
    /// Tags that get the structured code macro rule.
    pub rules: Vec<String>,
}

pub struct Fixture {
    pub html: String,
    pub expected_md: String,
    pub config: FixtureConfig,
}

impl Fixture {
    pub fn converter(&self) -> Converter {
        let mut options = ConversionOptions::default();
        for (key, value) in &self.config.options {
            options
                .set(key, value)
                .unwrap_or_else(|e| panic!("bad fixture option {key}: {e}"));
        }
        let mut converter = Converter::new(options).expect("valid fixture options");
        for tag in &self.config.rules {
            converter.rules_mut().insert(tag, rules::code_macro);
        }
        converter
    }

    pub fn convert(&self) -> String {
        let converter = self.converter();
        let result = if self.config.fragment {
            converter.convert_fragment(&self.html)
        } else {
            converter.convert(&self.html)
        };
        result.expect("fixture converts")
    }
}

/// Names of every fixture directory, sorted.
pub fn fixture_names() -> Vec<String> {
    let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("test-fixtures");
    let mut names: Vec<String> = fs::read_dir(&base)
        .expect("test-fixtures directory")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}

/// Load a test fixture's input HTML, expected Markdown, and config.
///
/// Fixture directories contain `index.html`, `index.md`, and optionally `index.json`.
pub fn load_fixture(name: &str) -> Fixture {
    let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("test-fixtures").join(name);
    let html = fs::read_to_string(base.join("index.html"))
        .unwrap_or_else(|_| panic!("Missing fixture: {}/index.html", name));
    let expected_md = fs::read_to_string(base.join("index.md"))
        .unwrap_or_else(|_| panic!("Missing fixture: {}/index.md", name));

    let config = match fs::read_to_string(base.join("index.json")) {
        Ok(json) => serde_json::from_str(&json)
            .unwrap_or_else(|e| panic!("Bad fixture config {}/index.json: {e}", name)),
        Err(_) => FixtureConfig::default(),
    };

    Fixture { html, expected_md, config }
}
