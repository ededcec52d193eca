//! Lossless document tree.
//!
//! Every node keeps the exact source text it was built from, so rendering an
//! unmodified tree gives back the original input byte for byte. Passes edit
//! the tree in place and only the edited nodes change on output.

use std::fmt;

use super::lexer::{Lexer, Token};

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Value part of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrValue {
    /// Raw text between the name and the value, including `=`
    pub separator: String,
    /// Quote character, `None` for unquoted values
    pub quote: Option<char>,
    /// Raw value text without quotes
    pub text: String,
}

/// A single attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Whitespace preceding the attribute
    pub space: String,
    /// Attribute name as written
    pub name: String,
    /// Value, absent for boolean attributes
    pub value: Option<AttrValue>,
}

impl Attribute {
    pub(crate) fn from_parts(space: String, name: String, value: Option<AttrValue>) -> Self {
        Self { space, name, value }
    }

    /// Create a canonical ` name="value"` attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            space: " ".to_string(),
            name: name.into(),
            value: Some(AttrValue {
                separator: "=".to_string(),
                quote: Some('"'),
                text: value.into(),
            }),
        }
    }

    /// Check the attribute name, ignoring ASCII case.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Raw value text, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_ref().map(|v| v.text.as_str())
    }

    /// Replace the value, keeping the quote style where it stays valid.
    pub fn set_value(&mut self, text: impl Into<String>) {
        let text = text.into();
        match &mut self.value {
            Some(value) => {
                let unquoted_ok = !text.is_empty()
                    && !text.contains(|c: char| c.is_ascii_whitespace() || "\"'=<>`".contains(c));
                if value.quote.is_none() && !unquoted_ok {
                    value.quote = Some('"');
                }
                value.text = text;
            }
            None => {
                self.value = Some(AttrValue {
                    separator: "=".to_string(),
                    quote: Some('"'),
                    text,
                });
            }
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.space, self.name)?;
        if let Some(value) = &self.value {
            f.write_str(&value.separator)?;
            match value.quote {
                Some(q) => write!(f, "{}{}{}", q, value.text, q)?,
                None => f.write_str(&value.text)?,
            }
        }
        Ok(())
    }
}

/// An opening tag with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Tag name as written
    pub name: String,
    /// Attributes in source order
    pub attrs: Vec<Attribute>,
    /// Whitespace between the last attribute and `>` (or `/>`)
    pub trailing: String,
    /// Written as `<name ... />`
    pub self_closing: bool,
}

impl StartTag {
    pub(crate) fn from_parts(
        name: String,
        attrs: Vec<Attribute>,
        trailing: String,
        self_closing: bool,
    ) -> Self {
        Self {
            name,
            attrs,
            trailing,
            self_closing,
        }
    }

    /// Lowercase tag name.
    pub fn local_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Check the tag name, ignoring ASCII case.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// First attribute with the given name.
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.is(name))
    }

    /// Mutable access to the first attribute with the given name.
    pub fn attr_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attrs.iter_mut().find(|a| a.is(name))
    }

    /// Value of the first attribute with the given name.
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(Attribute::value)
    }

    /// Check whether the class list contains `token`.
    pub fn has_class(&self, token: &str) -> bool {
        self.attr_value("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == token))
    }

    /// Remove every attribute named in `names`. Returns how many were removed.
    pub fn remove_attrs(&mut self, names: &[&str]) -> usize {
        let before = self.attrs.len();
        self.attrs.retain(|a| !names.iter().any(|n| a.is(n)));
        before - self.attrs.len()
    }

    /// Append a canonical ` name="value"` attribute.
    pub fn push_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.push(Attribute::new(name, value));
    }

    /// Single space before the first attribute, nothing before `>`.
    pub fn tidy_spacing(&mut self) {
        if let Some(first) = self.attrs.first_mut() {
            first.space = " ".to_string();
        }
        self.trailing.clear();
    }
}

impl fmt::Display for StartTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for attr in &self.attrs {
            write!(f, "{}", attr)?;
        }
        f.write_str(&self.trailing)?;
        if self.self_closing {
            f.write_str("/")?;
        }
        f.write_str(">")
    }
}

/// An element: start tag, children and optional end tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Opening tag
    pub start: StartTag,
    /// Child nodes
    pub children: Vec<Node>,
    /// Raw end tag; `None` for void elements and implicitly closed ones
    pub end: Option<String>,
}

impl Element {
    /// Create an element with no children and no end tag.
    pub fn new(start: StartTag) -> Self {
        Self {
            start,
            children: Vec::new(),
            end: None,
        }
    }

    /// Whether the element has an explicit end tag.
    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// Whether the element can never have content.
    pub fn is_void(&self) -> bool {
        self.start.self_closing || VOID_ELEMENTS.contains(&self.start.local_name().as_str())
    }

    /// Serialized children.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            out.push_str(&child.to_string());
        }
        out
    }

    /// Concatenated character data of all descendants, whitespace collapsed.
    pub fn text_content(&self) -> String {
        fn collect(nodes: &[Node], out: &mut String) {
            for node in nodes {
                match node {
                    Node::Text(text) => out.push_str(text),
                    Node::Element(e) => collect(&e.children, out),
                    Node::Raw(_) => {}
                }
            }
        }

        let mut raw = String::new();
        collect(&self.children, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Replace the children with the parse of `html`.
    pub fn set_inner_html(&mut self, html: &str) {
        self.children = Document::parse(html).nodes;
    }

    /// Remove descendants matching `pred`, at any depth. Returns the count.
    pub fn remove_descendants<F>(&mut self, pred: &F) -> usize
    where
        F: Fn(&Element) -> bool,
    {
        remove_elements(&mut self.children, pred)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        if let Some(end) = &self.end {
            f.write_str(end)?;
        }
        Ok(())
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Character data
    Text(String),
    /// Comment, doctype or unmatched end tag, kept verbatim
    Raw(String),
    /// Element with children
    Element(Element),
}

impl Node {
    /// The element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(s) | Node::Raw(s) => f.write_str(s),
            Node::Element(e) => write!(f, "{}", e),
        }
    }
}

/// Remove elements matching `pred` from `nodes` and their descendants.
pub fn remove_elements<F>(nodes: &mut Vec<Node>, pred: &F) -> usize
where
    F: Fn(&Element) -> bool,
{
    let before = nodes.len();
    nodes.retain(|node| !matches!(node, Node::Element(e) if pred(e)));
    let mut removed = before - nodes.len();
    for node in nodes.iter_mut() {
        if let Node::Element(e) = node {
            removed += remove_elements(&mut e.children, pred);
        }
    }
    removed
}

/// A parsed markup document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level nodes
    pub nodes: Vec<Node>,
}

impl Document {
    /// Parse markup into a tree.
    ///
    /// End tags close the nearest open element with the same name, closing
    /// anything opened after it implicitly. End tags with no open match are
    /// kept as raw nodes. Elements still open at the end of input stay
    /// without an end tag.
    pub fn parse(src: &str) -> Self {
        let mut root = Vec::new();
        let mut open: Vec<Element> = Vec::new();

        for token in Lexer::new(src) {
            match token {
                Token::Text(text) => attach(&mut open, &mut root, Node::Text(text.to_string())),
                Token::Raw(raw) => attach(&mut open, &mut root, Node::Raw(raw.to_string())),
                Token::StartTag(tag) => {
                    let element = Element::new(tag);
                    if element.is_void() {
                        attach(&mut open, &mut root, Node::Element(element));
                    } else {
                        open.push(element);
                    }
                }
                Token::EndTag { name, raw } => {
                    match open.iter().rposition(|e| e.start.is(&name)) {
                        Some(idx) => {
                            while open.len() > idx + 1 {
                                if let Some(unclosed) = open.pop() {
                                    attach(&mut open, &mut root, Node::Element(unclosed));
                                }
                            }
                            if let Some(mut element) = open.pop() {
                                element.end = Some(raw.to_string());
                                attach(&mut open, &mut root, Node::Element(element));
                            }
                        }
                        None => attach(&mut open, &mut root, Node::Raw(raw.to_string())),
                    }
                }
            }
        }

        while let Some(unclosed) = open.pop() {
            attach(&mut open, &mut root, Node::Element(unclosed));
        }

        Self { nodes: root }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

/// Append `node` to the innermost open element, merging adjacent text.
fn attach(open: &mut [Element], root: &mut Vec<Node>, node: Node) {
    let siblings = match open.last_mut() {
        Some(parent) => &mut parent.children,
        None => root,
    };
    if let (Node::Text(text), Some(Node::Text(prev))) = (&node, siblings.last_mut()) {
        prev.push_str(text);
        return;
    }
    siblings.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(src: &str) {
        assert_eq!(Document::parse(src).to_string(), src);
    }

    #[test]
    fn test_roundtrip_is_lossless() {
        roundtrip("<!DOCTYPE html>\n<html>\n<body>\n  <p class = 'a'  >x</p >\n</body>\n</html>\n");
        roundtrip("<section class=\"page\"><div>unclosed</section>");
        roundtrip("stray </div> end <br/> and <img src=x.png>");
        roundtrip("<p>a < b</p><!-- c -->");
        roundtrip("<ul><li>one<li>two</ul>");
        roundtrip("");
    }

    #[test]
    fn test_nesting() {
        let doc = Document::parse("<div><div>inner</div>outer</div>");
        assert_eq!(doc.nodes.len(), 1);
        let outer = doc.nodes[0].as_element().unwrap();
        assert_eq!(outer.children.len(), 2);
        let inner = outer.children[0].as_element().unwrap();
        assert_eq!(inner.inner_html(), "inner");
        assert!(inner.is_closed());
        assert_eq!(outer.inner_html(), "<div>inner</div>outer");
    }

    #[test]
    fn test_end_tag_closes_intermediate() {
        let doc = Document::parse("<section><div>a</section>");
        let section = doc.nodes[0].as_element().unwrap();
        assert!(section.is_closed());
        let div = section.children[0].as_element().unwrap();
        assert!(!div.is_closed());
    }

    #[test]
    fn test_void_elements_have_no_children() {
        let doc = Document::parse("<p><img class=\"fig\">text</p>");
        let p = doc.nodes[0].as_element().unwrap();
        assert_eq!(p.children.len(), 2);
        assert!(p.children[0].as_element().unwrap().is_void());
    }

    #[test]
    fn test_unmatched_end_tag_is_raw() {
        let doc = Document::parse("a</p>b");
        assert_eq!(doc.nodes[1], Node::Raw("</p>".to_string()));
    }

    #[test]
    fn test_attribute_editing() {
        let doc = Document::parse("<p  id=\"old\" class=\"x\"   data-para=\"9\" >t</p>");
        let mut p = doc.nodes[0].as_element().unwrap().clone();
        assert_eq!(p.start.remove_attrs(&["id", "data-para"]), 2);
        p.start.tidy_spacing();
        p.start.push_attr("id", "p1-1");
        assert_eq!(p.to_string(), "<p class=\"x\" id=\"p1-1\">t</p>");
    }

    #[test]
    fn test_set_value_keeps_quote() {
        let doc = Document::parse("<img alt='old'>");
        let mut img = doc.nodes[0].as_element().unwrap().clone();
        img.start.attr_mut("alt").unwrap().set_value("new");
        assert_eq!(img.to_string(), "<img alt='new'>");
    }

    #[test]
    fn test_set_value_quotes_unquoted_when_needed() {
        let doc = Document::parse("<img alt=old>");
        let mut img = doc.nodes[0].as_element().unwrap().clone();
        img.start.attr_mut("alt").unwrap().set_value("two words");
        assert_eq!(img.to_string(), "<img alt=\"two words\">");
    }

    #[test]
    fn test_remove_descendants() {
        let doc = Document::parse("<div><span class=\"n\">1</span><p><span class=\"n\">2</span>x</p></div>");
        let mut div = doc.nodes[0].as_element().unwrap().clone();
        let removed = div.remove_descendants(&|e: &Element| e.start.has_class("n"));
        assert_eq!(removed, 2);
        assert_eq!(div.to_string(), "<div><p>x</p></div>");
    }
}
