// Read-only document tree consumed by the converter.
//
// A `Document` is an arena: it owns every node, children are ordered lists
// of ids and the parent link is a plain id. `NodeRef` is a borrowed cursor
// used for all structural queries. Nothing here is reference counted, so a
// parsed document is `Send + Sync` and can be shared between threads.

pub(crate) mod parse;

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element: lowercase tag name plus attributes in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    /// Lowercase tag name, namespaced names included (`ac:structured-macro`).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    /// Look up an attribute by name (ASCII case-insensitive).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The root of a document or fragment. Converts its children only.
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed (or hand-built) HTML tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only its root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse a full HTML document. The tree keeps html5ever's implied
    /// `html`/`head`/`body` wrappers.
    pub fn parse(html: &str) -> Self {
        parse::parse_document(html)
    }

    /// Parse an HTML fragment. The root's children are the parsed content
    /// without any `html`/`head`/`body` wrappers.
    pub fn parse_fragment(html: &str) -> Self {
        parse::parse_fragment(html)
    }

    /// Id of the root node.
    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            doc: self,
            id: self.root_id(),
        }
    }

    /// Get a cursor for `id`, if it belongs to this document.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { doc: self, id })
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// Append an element as the last child of `parent`.
    ///
    /// The tag name is stored lowercase. Panics if `parent` is not a node of
    /// this document.
    pub fn append_element<I, K, V>(&mut self, parent: NodeId, tag: &str, attrs: I) -> NodeId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let element = Element {
            tag: tag.to_ascii_lowercase(),
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        };
        self.push(parent, NodeKind::Element(element))
    }

    /// Append a text node as the last child of `parent`.
    ///
    /// Panics if `parent` is not a node of this document.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push(parent, NodeKind::Text(text.into()))
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }
}

/// A borrowed cursor into a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.doc.data(self.id).kind
    }

    pub fn element(&self) -> Option<&'a Element> {
        match self.kind() {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind(), NodeKind::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind(), NodeKind::Text(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self.kind(), NodeKind::Document)
    }

    /// Raw content of a text node.
    pub fn as_text(&self) -> Option<&'a str> {
        match self.kind() {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// A text node made only of whitespace (or empty).
    pub fn is_whitespace_text(&self) -> bool {
        self.as_text().is_some_and(|t| t.trim().is_empty())
    }

    /// Lowercase tag name for elements.
    pub fn tag(&self) -> Option<&'a str> {
        self.element().map(Element::tag)
    }

    /// Whether this is an element named `tag` (ASCII case-insensitive).
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag().is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element().and_then(|el| el.attr(name))
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.doc
            .data(self.id)
            .parent
            .map(|id| NodeRef { doc: self.doc, id })
    }

    /// Tag of the parent element, if the parent is an element.
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent().and_then(|p| p.tag())
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        doc.data(self.id)
            .children
            .iter()
            .map(move |&id| NodeRef { doc, id })
    }

    pub fn child_count(&self) -> usize {
        self.doc.data(self.id).children.len()
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.ancestors().any(|n| n.is_tag(tag))
    }

    /// Position among the parent's children.
    pub fn index(&self) -> Option<usize> {
        let parent = self.doc.data(self.id).parent?;
        self.doc
            .data(parent)
            .children
            .iter()
            .position(|&id| id == self.id)
    }

    fn siblings(&self) -> &'a [NodeId] {
        match self.doc.data(self.id).parent {
            Some(parent) => &self.doc.data(parent).children,
            None => &[],
        }
    }

    /// Siblings before this node, nearest first.
    pub fn preceding_siblings(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        let siblings = self.siblings();
        let end = self.index().unwrap_or(0);
        siblings[..end]
            .iter()
            .rev()
            .map(move |&id| NodeRef { doc, id })
    }

    /// Siblings after this node, nearest first.
    pub fn following_siblings(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        let siblings = self.siblings();
        let start = self.index().map_or(siblings.len(), |i| i + 1);
        siblings[start..].iter().map(move |&id| NodeRef { doc, id })
    }

    pub fn previous_sibling(&self) -> Option<NodeRef<'a>> {
        self.preceding_siblings().next()
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.following_siblings().next()
    }

    /// Nearest preceding sibling that is an element.
    pub fn previous_element(&self) -> Option<NodeRef<'a>> {
        self.preceding_siblings().find(NodeRef::is_element)
    }

    /// Nearest following sibling that is an element.
    pub fn next_element(&self) -> Option<NodeRef<'a>> {
        self.following_siblings().find(NodeRef::is_element)
    }

    /// All descendants in document order, excluding this node.
    pub fn descendants(&self) -> Descendants<'a> {
        let mut stack: Vec<NodeId> = self.doc.data(self.id).children.clone();
        stack.reverse();
        Descendants {
            doc: self.doc,
            stack,
        }
    }

    /// First descendant, in document order, matching `pred`.
    ///
    /// The search is rooted at this node: ancestors and siblings are never
    /// visited.
    pub fn find<P>(&self, mut pred: P) -> Option<NodeRef<'a>>
    where
        P: FnMut(&NodeRef<'a>) -> bool,
    {
        self.descendants().find(|n| pred(n))
    }

    /// First descendant element named `tag`.
    pub fn find_tag(&self, tag: &str) -> Option<NodeRef<'a>> {
        self.find(|n| n.is_tag(tag))
    }

    /// First descendant element whose attribute `name` equals `value`.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeRef<'a>> {
        self.find(|n| n.attr(name) == Some(value))
    }

    /// Like [`find`](Self::find), but elements named `boundary` are neither
    /// matched nor searched.
    pub fn find_within<P>(&self, boundary: &str, mut pred: P) -> Option<NodeRef<'a>>
    where
        P: FnMut(&NodeRef<'a>) -> bool,
    {
        let mut stack: Vec<NodeId> = self.doc.data(self.id).children.clone();
        stack.reverse();
        while let Some(id) = stack.pop() {
            let node = NodeRef { doc: self.doc, id };
            if node.is_tag(boundary) {
                continue;
            }
            if pred(&node) {
                return Some(node);
            }
            stack.extend(self.doc.data(id).children.iter().rev().copied());
        }
        None
    }

    /// Descendant elements named `tag` that do not sit inside another
    /// descendant named `tag`, in document order.
    pub fn outermost(&self, tag: &str) -> Vec<NodeRef<'a>> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.doc.data(self.id).children.clone();
        stack.reverse();
        while let Some(id) = stack.pop() {
            let node = NodeRef { doc: self.doc, id };
            if node.is_tag(tag) {
                found.push(node);
                continue;
            }
            stack.extend(self.doc.data(id).children.iter().rev().copied());
        }
        found
    }

    /// Every descendant element named `tag`, in document order.
    pub fn find_all(&self, tag: &'a str) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.descendants().filter(move |n| n.is_tag(tag))
    }

    /// Concatenated raw text of this node and all its descendants.
    pub fn text(&self) -> String {
        if let Some(text) = self.as_text() {
            return text.to_string();
        }
        self.descendants().filter_map(|n| n.as_text()).collect()
    }
}

/// Pre-order iterator returned by [`NodeRef::descendants`].
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.data(id).children.iter().rev().copied());
        Some(NodeRef { doc: self.doc, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root_id();
        let ul = doc.append_element(root, "UL", [("class", "nav")]);
        let first = doc.append_element(ul, "li", Vec::<(String, String)>::new());
        doc.append_text(first, "one");
        doc.append_text(ul, "\n  ");
        let second = doc.append_element(ul, "li", [("ac:name", "language")]);
        doc.append_text(second, "two");
        (doc, ul, second)
    }

    #[test]
    fn test_tags_are_lowercased() {
        let (doc, ul, _) = sample();
        let ul = doc.get(ul).unwrap();
        assert_eq!(ul.tag(), Some("ul"));
        assert!(ul.is_tag("UL"));
        assert_eq!(ul.attr("CLASS"), Some("nav"));
    }

    #[test]
    fn test_sibling_queries() {
        let (doc, _, second) = sample();
        let second = doc.get(second).unwrap();
        assert!(second.previous_sibling().unwrap().is_whitespace_text());
        assert_eq!(second.previous_element().unwrap().text(), "one");
        assert!(second.next_sibling().is_none());
        assert_eq!(second.index(), Some(2));
    }

    #[test]
    fn test_namespaced_attribute_lookup() {
        let (doc, _, second) = sample();
        let found = doc.root().find_by_attr("ac:name", "language").unwrap();
        assert_eq!(found.id(), second);
    }

    #[test]
    fn test_text_concatenates_descendants() {
        let (doc, ul, _) = sample();
        assert_eq!(doc.get(ul).unwrap().text(), "one\n  two");
    }

    #[test]
    fn test_descendants_in_document_order() {
        let (doc, _, _) = sample();
        let tags: Vec<_> = doc.root().descendants().filter_map(|n| n.tag()).collect();
        assert_eq!(tags, ["ul", "li", "li"]);
    }

    #[test]
    fn test_scoped_searches_skip_nested_boundary() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let outer = doc.append_element(root, "section", Vec::<(String, String)>::new());
        let inner = doc.append_element(outer, "section", Vec::<(String, String)>::new());
        doc.append_element(inner, "em", Vec::<(String, String)>::new());
        let deeper = doc.append_element(inner, "section", Vec::<(String, String)>::new());
        let own = doc.append_element(outer, "em", Vec::<(String, String)>::new());
        let sibling = doc.append_element(outer, "section", Vec::<(String, String)>::new());

        let outer = doc.get(outer).unwrap();
        assert_eq!(outer.find_within("section", |n| n.is_tag("em")).unwrap().id(), own);
        assert_eq!(outer.find_tag("em").unwrap().id(), NodeId(3));
        let ids: Vec<_> = outer.outermost("section").iter().map(|n| n.id()).collect();
        assert_eq!(ids, [inner, sibling]);
        assert!(!ids.contains(&deeper));
    }

    #[test]
    fn test_ancestors() {
        let (doc, _, second) = sample();
        let second = doc.get(second).unwrap();
        assert!(second.has_ancestor("ul"));
        assert_eq!(second.ancestors().count(), 2);
        assert!(second.ancestors().last().unwrap().is_document());
    }

    #[test]
    fn test_get_rejects_foreign_ids() {
        let doc = Document::new();
        assert!(doc.get(NodeId(5)).is_none());
        assert!(doc.is_empty());
    }
}
