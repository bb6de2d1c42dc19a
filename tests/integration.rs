// End-to-end API tests for tagmark.

use pretty_assertions::assert_eq;
use tagmark::{
    convert, convert_fragment, convert_with, ConversionOptions, Converter, Document, HeadingStyle,
    NewlineStyle,
};

/// Render Markdown back to HTML with pulldown-cmark.
fn render(md: &str) -> String {
    use pulldown_cmark::{html, Options, Parser};

    let parser = Parser::new_ext(md, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

#[test]
fn test_empty_input() {
    assert_eq!(convert("").unwrap(), "");
}

#[test]
fn test_plain_text() {
    assert_eq!(convert("Hello, world!").unwrap(), "Hello, world!");
}

#[test]
fn test_options_are_applied() {
    let options = ConversionOptions::new()
        .with_heading_style(HeadingStyle::Atx)
        .with_bullets("-")
        .with_newline_style(NewlineStyle::Backslash);
    let result = convert_with("<h1>Title</h1><ul><li>a<br>b</li></ul>", &options).unwrap();
    assert_eq!(result, "# Title\n\n- a\\\nb\n");
}

#[test]
fn test_options_from_string_keys() {
    let mut options = ConversionOptions::new();
    options.set("heading_style", "atx_closed").unwrap();
    options.set("strong_em_symbol", "_").unwrap();
    let result = convert_with("<h2>A <b>b</b></h2>", &options).unwrap();
    assert_eq!(result, "## A __b__ ##\n\n");
}

#[test]
fn test_fragment_entry_point() {
    let options = ConversionOptions::default();
    assert_eq!(convert_fragment("<b>test</b>", &options).unwrap(), "**test**");
}

#[test]
fn test_document_collapses_blank_lines() {
    let html = "<p>a</p><p></p><hr><hr><p>b</p>";
    let md = convert(html).unwrap();
    assert_eq!(md, "a\n\n---\n\n---\n\nb\n\n");
    assert_eq!(convert_fragment(html, &ConversionOptions::default()).unwrap(), md);
}

#[test]
fn test_shared_converter_across_threads() {
    let converter = std::sync::Arc::new(Converter::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let converter = converter.clone();
            std::thread::spawn(move || converter.convert(&format!("<p>n{i}</p>")).unwrap())
        })
        .collect();
    let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, ["n0\n\n", "n1\n\n", "n2\n\n", "n3\n\n"]);
}

#[test]
fn test_hand_built_document() {
    let mut doc = Document::new();
    let root = doc.root_id();
    let p = doc.append_element(root, "p", Vec::<(String, String)>::new());
    doc.append_text(p, "built ");
    let em = doc.append_element(p, "em", Vec::<(String, String)>::new());
    doc.append_text(em, "by hand");

    let md = Converter::default().convert_document(&doc).unwrap();
    assert_eq!(md, "built *by hand*\n\n");
}

#[test]
fn test_escaped_text_renders_literally() {
    let md = convert("<p>*not emphasis* and _not either_ and [not a link]</p>").unwrap();
    assert_eq!(
        render(&md),
        "<p>*not emphasis* and _not either_ and [not a link]</p>\n"
    );
}

#[test]
fn test_decoded_markup_renders_as_text() {
    let md = convert("<p>&lt;script&gt;alert(1)&lt;/script&gt; &lt;b&gt;x&lt;/b&gt; &amp;amp;</p>")
        .unwrap();
    assert_eq!(
        render(&md),
        "<p>&lt;script&gt;alert(1)&lt;/script&gt; &lt;b&gt;x&lt;/b&gt; &amp;amp;</p>\n"
    );
}

#[test]
fn test_escaped_block_markers_render_as_paragraphs() {
    let md = convert("<p># one</p><p>- two</p><p>3. three</p><p>&gt; four</p>").unwrap();
    assert_eq!(
        render(&md),
        "<p># one</p>\n<p>- two</p>\n<p>3. three</p>\n<p>&gt; four</p>\n"
    );
}

#[test]
fn test_markup_renders_back() {
    let html = "<p><strong>bold</strong>, <em>em</em>, <del>gone</del>, <code>x</code></p>";
    let md = convert(html).unwrap();
    assert_eq!(
        render(&md),
        "<p><strong>bold</strong>, <em>em</em>, <del>gone</del>, <code>x</code></p>\n"
    );
}

#[test]
fn test_table_renders_back() {
    let html = "<table><tr><th>a</th><th>b</th></tr><tr><td>1</td><td>2</td></tr></table>";
    let rendered = render(&convert(html).unwrap());
    assert!(rendered.contains("<th>a</th>"), "{rendered}");
    assert!(rendered.contains("<td>2</td>"), "{rendered}");
}

#[test]
fn test_code_block_renders_back() {
    let md = convert("<pre>let x = a * b;\n</pre>").unwrap();
    assert_eq!(render(&md), "<pre><code>let x = a * b;\n</code></pre>\n");
}
