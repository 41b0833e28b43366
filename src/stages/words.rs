//! Word splitting for incremental reveal animation.

use crate::document::{Element, Node, TEX_ATTR};

/// Class on every word span.
pub const WORD_CLASS: &str = "word";

/// Attribute holding a word's position in the document, counting from 0.
pub const WORD_INDEX_ATTR: &str = "data-word-index";

/// Elements whose text is left whole.
const SKIP_TAGS: &[&str] = &["code", "pre"];

/// Elements a word may run through, as in `foo**bar**`.
const INLINE_TAGS: &[&str] = &["a", "em", "strong", "del", "span", "sup", "sub"];

/// Wrap every whitespace-delimited run of text in a numbered span. A word cut
/// by inline markup is wrapped piecewise, and every piece shares one index.
/// Returns the number of words wrapped.
pub(super) fn split_words(nodes: &mut Vec<Node>) -> usize {
    let mut splitter = Splitter::default();
    splitter.split_nodes(nodes);
    splitter.next
}

#[derive(Default)]
struct Splitter {
    next: usize,
    /// The last piece emitted was a word with nothing between it and here.
    joined: bool,
}

impl Splitter {
    fn split_nodes(&mut self, nodes: &mut Vec<Node>) {
        let old = std::mem::take(nodes);
        for node in old {
            match node {
                Node::Text(text) => self.split_text(&text, nodes),
                Node::Element(mut el) => {
                    if is_opaque(&el) {
                        self.joined = false;
                    } else if INLINE_TAGS.contains(&el.tag.as_str()) {
                        self.split_nodes(&mut el.children);
                    } else {
                        self.joined = false;
                        self.split_nodes(&mut el.children);
                        self.joined = false;
                    }
                    nodes.push(el.into());
                }
                other => {
                    self.joined = false;
                    nodes.push(other);
                }
            }
        }
    }

    fn split_text(&mut self, text: &str, out: &mut Vec<Node>) {
        let mut rest = text;
        while !rest.is_empty() {
            let space = rest.len() - rest.trim_start().len();
            if space > 0 {
                out.push(Node::text(&rest[..space]));
                rest = &rest[space..];
                self.joined = false;
                continue;
            }
            let word_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let index = if self.joined {
                self.next - 1
            } else {
                self.next += 1;
                self.next - 1
            };
            out.push(
                Element::new("span")
                    .with_attr("class", WORD_CLASS)
                    .with_attr(WORD_INDEX_ATTR, index.to_string())
                    .with_child(Node::text(&rest[..word_len]))
                    .into(),
            );
            self.joined = true;
            rest = &rest[word_len..];
        }
    }
}

/// Code, typeset math and already-split words keep their text as is.
fn is_opaque(el: &Element) -> bool {
    SKIP_TAGS.contains(&el.tag.as_str())
        || el.attr(TEX_ATTR).is_some()
        || el.attr(WORD_INDEX_ATTR).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn words(doc: &Document) -> Vec<(String, String)> {
        doc.find_all("span")
            .into_iter()
            .filter(|el| el.attr("class") == Some(WORD_CLASS))
            .map(|el| {
                (
                    el.attr(WORD_INDEX_ATTR).unwrap_or_default().to_string(),
                    el.text_content(),
                )
            })
            .collect()
    }

    #[test]
    fn split_numbers_words_across_elements() {
        let mut doc = Document::new(vec![
            Element::new("p").with_child(Node::text("Hello  big")).into(),
            Element::new("p")
                .with_child(Element::new("strong").with_child(Node::text("world")))
                .into(),
        ]);
        assert_eq!(split_words(&mut doc.children), 3);
        assert_eq!(
            words(&doc),
            [
                ("0".to_string(), "Hello".to_string()),
                ("1".to_string(), "big".to_string()),
                ("2".to_string(), "world".to_string()),
            ]
        );
    }

    #[test]
    fn split_keeps_whitespace_as_text() {
        let mut nodes = vec![Node::text(" a\nb ")];
        split_words(&mut nodes);
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes[0], Node::text(" "));
        assert_eq!(nodes[2], Node::text("\n"));
        assert_eq!(nodes[4], Node::text(" "));
    }

    #[test]
    fn split_skips_code() {
        let mut nodes = vec![
            Element::new("pre")
                .with_child(Element::new("code").with_child(Node::text("let x = 1;")))
                .into(),
            Element::new("code").with_child(Node::text("a b")).into(),
        ];
        let before = nodes.clone();
        assert_eq!(split_words(&mut nodes), 0);
        assert_eq!(nodes, before);
    }

    #[test]
    fn split_twice_does_not_nest_spans() {
        let mut nodes = vec![Node::text("one two")];
        split_words(&mut nodes);
        let once = nodes.clone();
        split_words(&mut nodes);
        assert_eq!(nodes, once);
    }

    #[test]
    fn split_handles_unicode_words() {
        let mut nodes = vec![Node::text("héllo wörld")];
        assert_eq!(split_words(&mut nodes), 2);
        let html = Document::new(nodes).to_html();
        assert!(html.contains(">héllo</span>"));
    }

    #[test]
    fn word_cut_by_emphasis_keeps_one_index() {
        let mut doc = Document::new(vec![
            Element::new("p")
                .with_child(Node::text("foo"))
                .with_child(Element::new("strong").with_child(Node::text("bar")))
                .with_child(Node::text(" baz"))
                .into(),
        ]);
        assert_eq!(split_words(&mut doc.children), 2);
        let indices: Vec<_> = words(&doc).into_iter().map(|(index, _)| index).collect();
        assert_eq!(indices, ["0", "0", "1"]);
    }

    #[test]
    fn block_boundary_starts_a_new_word() {
        let mut nodes = vec![
            Element::new("p").with_child(Node::text("end")).into(),
            Element::new("p").with_child(Node::text("start")).into(),
        ];
        assert_eq!(split_words(&mut nodes), 2);
    }
}
