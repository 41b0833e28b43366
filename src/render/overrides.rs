//! Element overrides: anchors through a link-trust wrapper, images through an image component.

use crate::document::{Element, Node};

/// Rel value for every link that leaves the document.
pub const OUTBOUND_REL: &str = "noopener noreferrer";

/// Verdict of a link-trust evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credibility {
    Trusted,
    Unverified,
    Untrusted,
}

impl Credibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Credibility::Trusted => "trusted",
            Credibility::Unverified => "unverified",
            Credibility::Untrusted => "untrusted",
        }
    }
}

/// Judges a link target. Reputation logic lives with the caller.
pub trait LinkEvaluator {
    fn evaluate(&self, href: &str) -> Credibility;
}

/// Evaluator with no opinion: every link is [`Credibility::Unverified`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvaluator;

impl LinkEvaluator for NoEvaluator {
    fn evaluate(&self, _href: &str) -> Credibility {
        Credibility::Unverified
    }
}

impl<F> LinkEvaluator for F
where
    F: Fn(&str) -> Credibility,
{
    fn evaluate(&self, href: &str) -> Credibility {
        self(href)
    }
}

/// What an anchor override receives.
#[derive(Debug, Clone)]
pub struct LinkProps {
    pub href: String,
    pub title: Option<String>,
    pub children: Vec<Node>,
    pub check_credibility: bool,
}

pub trait LinkComponent {
    fn render(&self, props: LinkProps) -> Node;
}

/// What an image override receives. `alt` is empty when the source has none.
#[derive(Debug, Clone)]
pub struct ImageProps {
    pub src: String,
    pub alt: String,
    pub title: Option<String>,
}

pub trait ImageComponent {
    fn render(&self, props: ImageProps) -> Node;
}

/// Default anchor: outbound links open in a new, non-opener, non-referrer
/// context and, when asked, carry the evaluator's verdict.
#[derive(Debug, Clone, Default)]
pub struct CredibilityLink<E> {
    evaluator: E,
}

impl<E: LinkEvaluator> CredibilityLink<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }
}

impl<E: LinkEvaluator> LinkComponent for CredibilityLink<E> {
    fn render(&self, props: LinkProps) -> Node {
        let mut a = Element::new("a").with_attr("href", props.href.as_str());
        if let Some(title) = props.title {
            a.set_attr("title", title);
        }
        // In-document anchors (footnotes) stay in place and need no verdict.
        if !props.href.starts_with('#') {
            a.set_attr("target", "_blank");
            a.set_attr("rel", OUTBOUND_REL);
            if props.check_credibility {
                let verdict = self.evaluator.evaluate(&props.href);
                a.set_attr("data-credibility", verdict.as_str());
                if verdict == Credibility::Untrusted {
                    a.set_attr("class", "link-untrusted");
                }
            }
        }
        a.with_children(props.children).into()
    }
}

/// Default image: a lazily loaded `<img>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainImage;

impl ImageComponent for PlainImage {
    fn render(&self, props: ImageProps) -> Node {
        let mut img = Element::new("img")
            .with_attr("src", props.src)
            .with_attr("alt", props.alt);
        if let Some(title) = props.title {
            img.set_attr("title", title);
        }
        img.with_attr("loading", "lazy").into()
    }
}

/// The override map handed to the renderer.
pub struct Overrides {
    pub link: Box<dyn LinkComponent>,
    pub image: Box<dyn ImageComponent>,
}

impl Overrides {
    pub fn new(
        link: impl LinkComponent + 'static,
        image: impl ImageComponent + 'static,
    ) -> Self {
        Self {
            link: Box::new(link),
            image: Box::new(image),
        }
    }
}

impl Default for Overrides {
    fn default() -> Self {
        Self::new(CredibilityLink::new(NoEvaluator), PlainImage)
    }
}

impl std::fmt::Debug for Overrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overrides").finish_non_exhaustive()
    }
}

/// Schemes that never reach an `href` or `src`.
const BLOCKED_SCHEMES: &[&str] = &["javascript", "vbscript", "data"];

/// Whether a URL may be emitted. `data:image/...` is allowed for images only.
pub fn is_safe_url(url: &str, image: bool) -> bool {
    let url = url.trim_start();
    let Some((scheme, rest)) = url.split_once(':') else {
        return true;
    };
    // A ':' after a path, query or fragment start is not a scheme separator.
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    let scheme = scheme.trim().to_ascii_lowercase();
    if image && scheme == "data" {
        return rest.trim_start().to_ascii_lowercase().starts_with("image/");
    }
    !BLOCKED_SCHEMES.contains(&scheme.as_str())
}

/// Replace anchors and images bottom-up. Replacements are not revisited.
pub(super) fn apply(nodes: &mut Vec<Node>, overrides: &Overrides, check_credibility: bool) {
    let old = std::mem::take(nodes);
    for node in old {
        match node {
            Node::Element(mut el) => {
                apply(&mut el.children, overrides, check_credibility);
                let replaced = if el.tag == "a" {
                    override_link(el, overrides, check_credibility)
                } else if el.tag == "img" {
                    override_image(el, overrides)
                } else {
                    el.into()
                };
                nodes.push(replaced);
            }
            other => nodes.push(other),
        }
    }
}

fn override_link(el: Element, overrides: &Overrides, check_credibility: bool) -> Node {
    let href = el.attr("href").unwrap_or_default();
    let href = if is_safe_url(href, false) {
        href.to_string()
    } else {
        log::debug!("dropping unsafe link target {:?}", href);
        "#".to_string()
    };
    let title = el.attr("title").map(str::to_string);
    overrides.link.render(LinkProps {
        href,
        title,
        children: el.children,
        check_credibility,
    })
}

fn override_image(el: Element, overrides: &Overrides) -> Node {
    let src = el.attr("src").unwrap_or_default().to_string();
    let alt = el.attr("alt").unwrap_or_default().to_string();
    if !is_safe_url(&src, true) {
        log::debug!("dropping image with unsafe source {:?}", src);
        return Node::Text(alt);
    }
    let title = el.attr("title").map(str::to_string);
    let image = overrides.image.render(ImageProps {
        src: src.clone(),
        alt,
        title,
    });
    Element::new("a")
        .with_attr("href", src)
        .with_attr("target", "_blank")
        .with_attr("rel", OUTBOUND_REL)
        .with_child(image)
        .into()
}
