//! Markdown parsing: drive pulldown-cmark and fold its events into a [`Document`].

use std::sync::OnceLock;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;

use crate::document::{Document, Element, Node};

/// Extensions enabled on every parse, whatever the caller passes.
pub const ALWAYS_ON: Options = Options::ENABLE_TABLES
    .union(Options::ENABLE_STRIKETHROUGH)
    .union(Options::ENABLE_GFM)
    .union(Options::ENABLE_MATH);

/// Deepest element nesting kept in the tree. Tags opened below it are dropped
/// and their content joins the innermost kept element.
pub const MAX_DEPTH: usize = 128;

/// Elements whose text is never turned into autolinks.
const NO_AUTOLINK: &[&str] = &["a", "code", "pre"];

/// Always-on extensions plus the caller's pass-through options.
pub fn extensions(extra: Options) -> Options {
    ALWAYS_ON | extra
}

/// Parse markdown into a document tree. Total over all input.
pub fn parse(markdown: &str, extra: Options) -> Document {
    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(markdown, extensions(extra)) {
        builder.event(event);
    }
    let mut children = builder.finish();
    link_literals(&mut children);
    Document::new(children)
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Element>,
    alignments: Vec<Alignment>,
    in_table_head: bool,
    cell_index: usize,
    /// Open tags dropped for exceeding [`MAX_DEPTH`]; their ends are dropped too.
    suppressed: usize,
}

impl TreeBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.push(Node::text(&*text)),
            Event::Code(code) => {
                let el = Element::new("code").with_child(Node::text(&*code));
                self.push(el.into());
            }
            Event::InlineMath(tex) => self.push(Node::Math {
                tex: tex.to_string(),
                display: false,
            }),
            Event::DisplayMath(tex) => self.push(Node::Math {
                tex: tex.to_string(),
                display: true,
            }),
            // Raw HTML is shown, never interpreted.
            Event::Html(html) | Event::InlineHtml(html) => self.push(Node::text(&*html)),
            Event::FootnoteReference(label) => {
                let link = Element::new("a")
                    .with_attr("href", format!("#fn-{label}"))
                    .with_child(Node::text(&*label));
                self.push(
                    Element::new("sup")
                        .with_attr("class", "footnote-reference")
                        .with_child(link)
                        .into(),
                );
            }
            Event::SoftBreak => self.push(Node::text("\n")),
            Event::HardBreak => self.push(Element::new("br").into()),
            Event::Rule => self.push(Element::new("hr").into()),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if checked {
                    input.set_attr("checked", "");
                }
                self.push(input.into());
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        if self.suppressed > 0 || self.stack.len() >= MAX_DEPTH {
            if self.suppressed == 0 {
                log::debug!("nesting deeper than {} levels flattened", MAX_DEPTH);
            }
            self.suppressed += 1;
            return;
        }
        let el = match tag {
            Tag::Paragraph => Element::new("p"),
            Tag::Heading { level, id, .. } => {
                let mut el = Element::new(heading_tag(level));
                if let Some(id) = id {
                    el.set_attr("id", &*id);
                }
                el
            }
            Tag::BlockQuote(kind) => {
                let mut el = Element::new("blockquote");
                if let Some(kind) = kind {
                    let kind = format!("{kind:?}").to_lowercase();
                    el.set_attr("class", format!("markdown-alert markdown-alert-{kind}"));
                }
                el
            }
            Tag::CodeBlock(kind) => {
                let mut el = Element::new("code");
                if let CodeBlockKind::Fenced(info) = kind
                    && let Some(lang) = info.split_whitespace().next()
                {
                    el.set_attr("class", format!("language-{lang}"));
                }
                el
            }
            Tag::List(Some(start)) => {
                let mut el = Element::new("ol");
                if start != 1 {
                    el.set_attr("start", start.to_string());
                }
                el
            }
            Tag::List(None) => Element::new("ul"),
            Tag::Item => Element::new("li"),
            Tag::FootnoteDefinition(label) => Element::new("div")
                .with_attr("class", "footnote-definition")
                .with_attr("id", format!("fn-{label}")),
            Tag::Table(alignments) => {
                self.alignments = alignments;
                Element::new("table")
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell_index = 0;
                self.stack.push(Element::new("thead"));
                Element::new("tr")
            }
            Tag::TableRow => {
                self.cell_index = 0;
                Element::new("tr")
            }
            Tag::TableCell => {
                let mut el = Element::new(if self.in_table_head { "th" } else { "td" });
                if let Some(align) = self.alignments.get(self.cell_index).and_then(align_css) {
                    el.set_attr("style", format!("text-align: {align}"));
                }
                el
            }
            Tag::Emphasis => Element::new("em"),
            Tag::Strong => Element::new("strong"),
            Tag::Strikethrough => Element::new("del"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut el = Element::new("a").with_attr("href", &*dest_url);
                if !title.is_empty() {
                    el.set_attr("title", &*title);
                }
                el
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut el = Element::new("img").with_attr("src", &*dest_url);
                if !title.is_empty() {
                    el.set_attr("title", &*title);
                }
                el
            }
            _ => Element::new("div"),
        };
        self.stack.push(el);
    }

    fn end_tag(&mut self, tag: TagEnd) {
        // Events nest, so while any start is dropped this end belongs to one.
        if self.suppressed > 0 {
            self.suppressed -= 1;
            return;
        }
        match tag {
            TagEnd::CodeBlock => {
                if let Some(code) = self.stack.pop() {
                    self.push(Element::new("pre").with_child(code).into());
                }
            }
            TagEnd::TableHead => {
                self.close();
                self.close();
                self.in_table_head = false;
            }
            TagEnd::TableCell => {
                self.close();
                self.cell_index += 1;
            }
            TagEnd::Table => {
                self.close();
                self.alignments.clear();
            }
            TagEnd::Image => {
                if let Some(mut img) = self.stack.pop() {
                    // Alt text arrives as child events; flatten it into the attribute.
                    let alt = img.text_content();
                    img.children.clear();
                    img.set_attr("alt", alt);
                    self.push(img.into());
                }
            }
            _ => self.close(),
        }
    }

    fn close(&mut self) {
        if let Some(el) = self.stack.pop() {
            self.push(el.into());
        }
    }

    /// Append to the innermost open element, merging adjacent text.
    fn push(&mut self, node: Node) {
        let children = match self.stack.last_mut() {
            Some(el) => &mut el.children,
            None => &mut self.root,
        };
        if let (Node::Text(new), Some(Node::Text(prev))) = (&node, children.last_mut()) {
            prev.push_str(new);
            return;
        }
        children.push(node);
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.stack.is_empty() {
            self.close();
        }
        self.root
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn align_css(align: &Alignment) -> Option<&'static str> {
    match align {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}

static LINK_LITERAL: OnceLock<Regex> = OnceLock::new();

fn link_literal_pattern() -> &'static Regex {
    LINK_LITERAL.get_or_init(|| {
        Regex::new(r"(?:https?://|www\.)[^\s<>]+").expect("link literal pattern is a valid regex")
    })
}

/// Turn bare `http(s)://` and `www.` URLs in text into anchors.
fn link_literals(nodes: &mut Vec<Node>) {
    let old = std::mem::take(nodes);
    for node in old {
        match node {
            Node::Text(text) => nodes.extend(split_link_literals(&text)),
            Node::Element(mut el) => {
                if !NO_AUTOLINK.contains(&el.tag.as_str()) {
                    link_literals(&mut el.children);
                }
                nodes.push(el.into());
            }
            other => nodes.push(other),
        }
    }
}

fn split_link_literals(text: &str) -> Vec<Node> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in link_literal_pattern().find_iter(text) {
        let url = trim_link_literal(m.as_str());
        if url.is_empty() || url == "www." {
            continue;
        }
        let start = m.start();
        if start > last {
            out.push(Node::text(&text[last..start]));
        }
        let href = if url.starts_with("www.") {
            format!("http://{url}")
        } else {
            url.to_string()
        };
        out.push(Element::new("a").with_attr("href", href).with_child(Node::text(url)).into());
        last = start + url.len();
    }
    if last < text.len() {
        out.push(Node::text(&text[last..]));
    }
    out
}

/// Drop trailing punctuation and unbalanced closing parentheses.
fn trim_link_literal(url: &str) -> &str {
    let mut url = url;
    loop {
        let Some(last) = url.chars().last() else {
            return url;
        };
        let trimmed = match last {
            '.' | ',' | ':' | ';' | '!' | '?' | '\'' | '"' | '*' | '_' | '~' => true,
            ')' => url.matches(')').count() > url.matches('(').count(),
            _ => false,
        };
        if !trimmed {
            return url;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(markdown: &str) -> String {
        parse(markdown, Options::empty()).to_html()
    }

    fn depth(nodes: &[Node]) -> usize {
        nodes
            .iter()
            .filter_map(Node::as_element)
            .map(|el| 1 + depth(&el.children))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn parse_empty_is_empty_document() {
        assert!(parse("", Options::empty()).is_empty());
    }

    #[test]
    fn parse_paragraph_and_emphasis() {
        assert_eq!(
            html("Hello **bold** and *it* ~~gone~~"),
            "<p>Hello <strong>bold</strong> and <em>it</em> <del>gone</del></p>\n"
        );
    }

    #[test]
    fn parse_display_math_literal() {
        let doc = parse("$$x^2$$", Options::empty());
        let p = doc.children[0].as_element().expect("paragraph");
        assert_eq!(
            p.children,
            vec![Node::Math {
                tex: "x^2".into(),
                display: true
            }]
        );
    }

    #[test]
    fn parse_inline_math_literal() {
        let doc = parse("a $b$ c", Options::empty());
        let p = doc.children[0].as_element().expect("paragraph");
        assert!(p.children.contains(&Node::Math {
            tex: "b".into(),
            display: false
        }));
    }

    #[test]
    fn parse_fenced_code_block_with_language() {
        assert_eq!(
            html("```rust\nlet x = 1;\n```"),
            "<pre><code class=\"language-rust\">let x = 1;\n</code></pre>\n"
        );
    }

    #[test]
    fn parse_table_with_head_and_alignment() {
        let out = html("| a | b |\n|:--|--:|\n| 1 | 2 |");
        assert!(out.contains("<thead><tr><th style=\"text-align: left\">a</th>"));
        assert!(out.contains("<td style=\"text-align: right\">2</td>"));
    }

    #[test]
    fn parse_image_alt_becomes_attribute() {
        let doc = parse("![a *cat*](cat.png)", Options::empty());
        let img = doc.find_all("img")[0];
        assert_eq!(img.attr("alt"), Some("a cat"));
        assert_eq!(img.attr("src"), Some("cat.png"));
        assert!(img.children.is_empty());
    }

    #[test]
    fn parse_raw_html_is_escaped_text() {
        let out = html("<script>alert(1)</script>");
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
    }

    #[test]
    fn parse_task_list() {
        let out = parse("- [x] done", Options::ENABLE_TASKLISTS).to_html();
        assert!(out.contains("<input type=\"checkbox\" disabled=\"\" checked=\"\" />"));
    }

    #[test]
    fn parse_ordered_list_start() {
        assert!(html("3. three\n4. four").starts_with("<ol start=\"3\">"));
    }

    #[test]
    fn adjacent_text_is_merged() {
        let doc = parse("a [b c", Options::empty());
        let p = doc.children[0].as_element().expect("paragraph");
        assert_eq!(p.children, vec![Node::text("a [b c")]);
    }

    #[test]
    fn link_literal_becomes_anchor() {
        let doc = parse("see https://example.com/a_(b). ok", Options::empty());
        let a = doc.find_all("a")[0];
        assert_eq!(a.attr("href"), Some("https://example.com/a_(b)"));
        assert_eq!(a.text_content(), "https://example.com/a_(b)");
        assert!(doc.to_plain_text().ends_with(". ok"));
    }

    #[test]
    fn www_literal_gets_scheme() {
        let doc = parse("go to www.example.com.", Options::empty());
        assert_eq!(doc.find_all("a")[0].attr("href"), Some("http://www.example.com"));
    }

    #[test]
    fn link_literals_skip_code_and_links() {
        let doc = parse("`https://a.example` [x](https://b.example)", Options::empty());
        assert_eq!(doc.find_all("a").len(), 1);
    }

    #[test]
    fn trim_link_literal_keeps_balanced_parens() {
        assert_eq!(trim_link_literal("https://x.org/(a)"), "https://x.org/(a)");
        assert_eq!(trim_link_literal("https://x.org/a)"), "https://x.org/a");
        assert_eq!(trim_link_literal("https://x.org/a?!"), "https://x.org/a");
    }

    #[test]
    fn deep_blockquotes_are_capped() {
        let doc = parse(&">".repeat(100_000), Options::empty());
        assert!(depth(&doc.children) <= MAX_DEPTH + 1);
    }

    #[test]
    fn deep_blockquotes_keep_their_text() {
        let doc = parse(&format!("{}deep", ">".repeat(100_000)), Options::empty());
        assert!(depth(&doc.children) <= MAX_DEPTH + 1);
        assert_eq!(doc.to_plain_text().trim(), "deep");
        assert!(doc.to_html().contains("<blockquote><blockquote>"));
    }

    #[test]
    fn content_after_capped_nesting_is_kept_in_order() {
        let deep = format!("{}inner", "> ".repeat(MAX_DEPTH + 10));
        let doc = parse(&format!("{deep}\n\nafter *em*"), Options::empty());
        let last = doc.children.last().and_then(Node::as_element).expect("paragraph");
        assert_eq!(last.tag, "p");
        assert_eq!(last.text_content(), "after em");
        assert_eq!(doc.find_all("em").len(), 1);
    }
}
