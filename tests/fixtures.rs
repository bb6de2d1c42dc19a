// Fixture tests — golden input/output pairs under test-fixtures/.
//
// Each fixture directory contains:
//   index.html — HTML input
//   index.md   — expected Markdown output
//   index.json — optional: options, extra rules, fragment mode
//
// These tests run the full pipeline: HTML string → Document → rules → Markdown.

mod common;

use pretty_assertions::assert_eq;

fn fixture_test(name: &str) {
    let f = common::load_fixture(name);
    assert_eq!(f.convert(), f.expected_md, "fixture: {}", name);
}

#[test]
fn fixture_base_url() { fixture_test("base-url"); }

#[test]
fn fixture_blockquote() { fixture_test("blockquote"); }

#[test]
fn fixture_code() { fixture_test("code"); }

#[test]
fn fixture_escaping() { fixture_test("escaping"); }

#[test]
fn fixture_fragment() { fixture_test("fragment"); }

#[test]
fn fixture_heading() { fixture_test("heading"); }

#[test]
fn fixture_heading_atx() { fixture_test("heading-atx"); }

#[test]
fn fixture_links_images() { fixture_test("links-images"); }

#[test]
fn fixture_list() { fixture_test("list"); }

#[test]
fn fixture_paragraph() { fixture_test("paragraph"); }

#[test]
fn fixture_strip() { fixture_test("strip"); }

#[test]
fn fixture_structured_macro() { fixture_test("structured-macro"); }

#[test]
fn fixture_table() { fixture_test("table"); }

#[test]
fn fixture_whitespace() { fixture_test("whitespace"); }

/// Every fixture converts to the same Markdown as a fragment as it does as a
/// document.
#[test]
fn fragment_matches_document() {
    for name in common::fixture_names() {
        let f = common::load_fixture(&name);
        let converter = f.converter();
        assert_eq!(
            converter.convert_fragment(&f.html).unwrap(),
            converter.convert(&f.html).unwrap(),
            "fixture: {}",
            name
        );
    }
}
