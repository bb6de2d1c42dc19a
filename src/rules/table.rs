// Table rules: pipe tables built row by row.
//
// Cells are rendered inline (the walker sets the inline flag under td/th).
// A row decides on its own whether it is the header row and, if so, emits
// the `| --- |` separator after itself; a first row that is not a header
// gets an empty header above it.

use crate::dom::NodeRef;
use crate::error::ConvertError;
use crate::walk::Context;

type RuleResult = Result<String, ConvertError>;

pub fn table(_node: NodeRef<'_>, text: &str, _cx: &Context<'_>) -> RuleResult {
    if text.trim().is_empty() {
        return Ok(String::new());
    }
    Ok(format!("\n\n{text}\n"))
}

pub fn caption(_node: NodeRef<'_>, text: &str, _cx: &Context<'_>) -> RuleResult {
    Ok(format!("{text}\n"))
}

pub fn figcaption(_node: NodeRef<'_>, text: &str, _cx: &Context<'_>) -> RuleResult {
    Ok(format!("\n\n{text}\n\n"))
}

fn colspan(node: &NodeRef<'_>) -> usize {
    node.attr("colspan")
        .and_then(|span| span.trim().parse::<usize>().ok())
        .filter(|span| *span > 0)
        .unwrap_or(1)
}

/// `<td>`, `<th>`: `" text |"`, with one extra `|` per spanned column.
/// Pipes in the content are escaped.
pub fn cell(node: NodeRef<'_>, text: &str, _cx: &Context<'_>) -> RuleResult {
    let content = text.trim().replace('\n', " ").replace('|', "\\|");
    Ok(format!(" {content}{}", " |".repeat(colspan(&node))))
}

fn separator(columns: usize, cell: &str) -> String {
    format!("| {} |\n", vec![cell; columns].join(" | "))
}

pub fn row(node: NodeRef<'_>, text: &str, _cx: &Context<'_>) -> RuleResult {
    let cells: Vec<NodeRef<'_>> = node
        .children()
        .filter(|child| child.is_tag("td") || child.is_tag("th"))
        .collect();
    let first = node.previous_element().is_none();
    let parent = node.parent();
    let parent_is = |tag: &str| parent.is_some_and(|p| p.is_tag(tag));
    let table_has_thead = || {
        parent
            .and_then(|tbody| tbody.parent())
            .is_some_and(|table| table.children().any(|c| c.is_tag("thead")))
    };

    let is_head_row = cells.iter().all(|cell| cell.is_tag("th"))
        || (first && !parent_is("tbody"))
        || (first && parent_is("tbody") && !table_has_thead());

    let mut out = String::new();
    if !first {
        out.push('|');
        out.push_str(text);
        out.push('\n');
        return Ok(out);
    }

    if is_head_row {
        let columns = cells.iter().map(colspan).sum();
        out.push('|');
        out.push_str(text);
        out.push('\n');
        out.push_str(&separator(columns, "---"));
        return Ok(out);
    }

    let opens_table = parent_is("table")
        || (parent_is("tbody") && parent.is_some_and(|tbody| tbody.previous_element().is_none()));
    if opens_table {
        out.push_str(&separator(cells.len(), ""));
        out.push_str(&separator(cells.len(), "---"));
    }
    out.push('|');
    out.push_str(text);
    out.push('\n');
    Ok(out)
}
