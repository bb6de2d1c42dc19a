// Regression tests — every bug found becomes a test case here.
// Never delete a test from this file.

use pretty_assertions::assert_eq;

fn md(html: &str) -> String {
    tagmark::convert(html).unwrap()
}

/// Image alt text containing `]` must be escaped to prevent premature bracket
/// close in the `![alt](url)` syntax.
#[test]
fn image_alt_with_bracket() {
    assert_eq!(md(r#"<img src="foo.png" alt="a]b">"#), "![a\\]b](foo.png)");
}

/// Link text is escaped like any other text, so `]` cannot close the label.
#[test]
fn link_text_with_bracket() {
    assert_eq!(
        md(r#"<a href="http://example.com">foo]bar</a>"#),
        "[foo\\]bar](http://example.com)"
    );
}

/// Double-tilde in text must be escaped to prevent accidental strikethrough.
#[test]
fn double_tilde_escape_in_phrasing() {
    assert_eq!(md("<p>foo ~~bar~~ baz</p>"), "foo \\~~bar\\~~ baz\n\n");
}

/// A single tilde should NOT be escaped (it's not strikethrough syntax alone).
#[test]
fn single_tilde_not_escaped() {
    assert_eq!(md("<p>~/.bashrc</p>"), "~/.bashrc\n\n");
}

/// Pipe characters in table cells must be escaped to prevent breaking table structure.
#[test]
fn pipe_in_table_cell_escaped() {
    let md = md("<table><tr><th>Header</th></tr><tr><td>a|b</td></tr></table>");
    assert!(
        md.contains("a\\|b"),
        "pipe in table cell should be escaped: {md:?}"
    );
}

/// Pipe escaping should not apply outside of tables.
#[test]
fn pipe_not_escaped_outside_table() {
    assert_eq!(md("<p>a|b</p>"), "a|b\n\n");
}

/// Trailing space before a nested list must not end up after the bullet text.
#[test]
fn list_item_text_before_nested_list_trimmed() {
    assert_eq!(
        md("<ul><li>parent <ul><li>child</li></ul></li></ul>"),
        "* parent\n\t+ child\n"
    );
}

/// A `<br>` inside a heading would split the heading line.
#[test]
fn line_break_in_heading_dropped() {
    assert_eq!(md("<h3>one<br>two</h3>"), "### onetwo\n\n");
}

/// The inline flag set for a heading must not leak into what follows it.
#[test]
fn inline_flag_does_not_leak_past_heading() {
    assert_eq!(md("<h3>T</h3><p>a<br>b</p>"), "### T\n\na  \nb\n\n");
}

/// Underscores in code inside table cells stay unescaped.
#[test]
fn code_in_table_cell_not_escaped() {
    let md = md("<table><tr><th><code>a_b</code></th></tr></table>");
    assert_eq!(md, "\n\n| `a_b` |\n| --- |\n\n");
}

/// Entities decode to text that is escaped like literal text, so decoded
/// markup stays text instead of turning back into HTML.
#[test]
fn decoded_entities_are_escaped() {
    assert_eq!(md("<p>&lt;tag&gt; &amp; 2&#42;3</p>"), "\\<tag> & 2\\*3\n\n");
    assert_eq!(md("<p>&amp;copy; &amp;#60;</p>"), "\\&copy; \\&#60;\n\n");
}

/// Deeply nested HTML converts without a depth limit when the stack is large
/// enough.
#[test]
fn deep_nesting_converts_fully() {
    let html = "<div>".repeat(2000) + "deep text" + &"</div>".repeat(2000);
    let md = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || tagmark::convert(&html).unwrap())
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(md, "\n\ndeep text\n\n");
}

/// Generic block containers are set off from their neighbours instead of
/// running into them.
#[test]
fn div_siblings_are_separated() {
    assert_eq!(md("<div>a</div><div>b</div>"), "\n\na\n\nb\n\n");
    assert_eq!(md("<p>x</p><section>y</section><p>z</p>"), "x\n\ny\n\nz\n\n");
}

/// A `<pre>` body containing its own fence line keeps every blank line that
/// follows it.
#[test]
fn pre_with_inner_fence_keeps_blank_lines() {
    let html = "<pre>```\n\n\n\nx</pre>";
    let expected = "\n````\n```\n\n\n\nx\n````\n";
    assert_eq!(md(html), expected);
    let fragment = tagmark::convert_fragment(html, &tagmark::ConversionOptions::default());
    assert_eq!(fragment.unwrap(), expected);
}

/// An ordered list starting at the largest representable number saturates
/// instead of overflowing.
#[test]
fn huge_ordered_list_start() {
    assert_eq!(
        md(r#"<ol start="9223372036854775807"><li>a</li><li>b</li></ol>"#),
        "9223372036854775807. a\n9223372036854775807. b\n"
    );
}
