//! Owned document tree: produced by the parser adapter, rewritten by stages and overrides.

mod html;

use serde::Serialize;

/// A node of the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text(String),
    /// Math literal recognized by the parser, not yet typeset.
    Math { tex: String, display: bool },
    /// Markup produced by a stage and sanitized there (never parser input).
    Raw(String),
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants. Math contributes its source.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Math { tex, .. } => out.push_str(tex),
            Node::Raw(_) => {}
            Node::Element(el) => match el.attr(TEX_ATTR) {
                Some(tex) => out.push_str(tex),
                None => el.children.iter().for_each(|c| c.push_text(out)),
            },
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

/// Attribute carrying the LaTeX source of a typeset math element.
pub const TEX_ATTR: &str = "data-tex";

/// An element with ordered attributes and children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value with the same name.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.children.iter().for_each(|c| c.push_text(&mut out));
        out
    }
}

/// Rendered document: the top-level node list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Serialize to HTML. Text and attributes are escaped; only `Raw` nodes pass through.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        html::write_nodes(&mut out, &self.children);
        out
    }

    /// Text of the document with one line per block. Math is rendered as its source.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        html::write_plain(&mut out, &self.children);
        out.trim_end().to_string()
    }

    /// Every element, depth-first.
    pub fn elements(&self) -> Vec<&Element> {
        fn collect<'a>(nodes: &'a [Node], out: &mut Vec<&'a Element>) {
            for node in nodes {
                if let Node::Element(el) = node {
                    out.push(el);
                    collect(&el.children, out);
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.children, &mut out);
        out
    }

    /// Elements with the given tag, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        self.elements()
            .into_iter()
            .filter(|el| el.tag == tag)
            .collect()
    }
}
