//! HTML and plain-text serialization of the document tree.

use pulldown_cmark_escape::{FmtWriter, escape_href, escape_html};

use super::{Node, TEX_ATTR};

/// Elements written without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

/// Elements followed by a newline in HTML and separated by one in plain text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "pre",
    "blockquote",
    "ul",
    "ol",
    "li",
    "table",
    "thead",
    "tbody",
    "tr",
    "hr",
    "div",
    "section",
];

/// Attributes holding URLs; written with href escaping.
const URL_ATTRS: &[&str] = &["href", "src"];

fn push_escaped(out: &mut String, s: &str) {
    // Writing into a String cannot fail.
    let _ = escape_html(FmtWriter(&mut *out), s);
}

fn push_escaped_url(out: &mut String, s: &str) {
    let _ = escape_href(FmtWriter(&mut *out), s);
}

pub(super) fn write_nodes(out: &mut String, nodes: &[Node]) {
    for node in nodes {
        write_node(out, node);
    }
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => push_escaped(out, text),
        Node::Raw(html) => out.push_str(html),
        Node::Math { tex, display } => {
            let class = if *display {
                "math math-display"
            } else {
                "math math-inline"
            };
            out.push_str("<span class=\"");
            out.push_str(class);
            out.push_str("\">");
            push_escaped(out, tex);
            out.push_str("</span>");
        }
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                if URL_ATTRS.contains(&name.as_str()) {
                    push_escaped_url(out, value);
                } else {
                    push_escaped(out, value);
                }
                out.push('"');
            }
            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                out.push_str(" />");
            } else {
                out.push('>');
                write_nodes(out, &el.children);
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
            if BLOCK_ELEMENTS.contains(&el.tag.as_str()) {
                out.push('\n');
            }
        }
    }
}

pub(super) fn write_plain(out: &mut String, nodes: &[Node]) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Math { tex, .. } => out.push_str(tex),
            Node::Raw(_) => {}
            Node::Element(el) => {
                if let Some(tex) = el.attr(TEX_ATTR) {
                    out.push_str(tex);
                    continue;
                }
                match el.tag.as_str() {
                    "br" => out.push('\n'),
                    "img" => {
                        if let Some(alt) = el.attr("alt") {
                            out.push_str(alt);
                        }
                    }
                    _ => write_plain(out, &el.children),
                }
                if BLOCK_ELEMENTS.contains(&el.tag.as_str()) && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
    }
}
