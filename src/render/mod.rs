//! Renderer facade: normalize, parse, run stages, substitute overrides, attach copy.

mod overrides;

use std::time::Duration;

use pulldown_cmark::Options;

pub use overrides::{
    Credibility, CredibilityLink, ImageComponent, ImageProps, LinkComponent, LinkEvaluator,
    LinkProps, NoEvaluator, OUTBOUND_REL, Overrides, PlainImage, is_safe_url,
};

use crate::copy::{ClipboardBackend, CopyController, DEFAULT_ACK_WINDOW, SystemClipboard};
use crate::document::{Document, Node};
use crate::normalize::normalize;
use crate::parse;
use crate::stages::compose_stages;

/// Per-render options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Wrap words in addressable spans for reveal animation.
    pub animated: bool,
    /// Forwarded to the link override so untrusted links can be flagged.
    pub check_link_credibility: bool,
    /// Attach a copy controller bound to the original content.
    pub enable_copy: bool,
    /// Extra parser options, added to the always-on extensions.
    pub extensions: Options,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            animated: false,
            check_link_credibility: false,
            enable_copy: false,
            extensions: Options::empty(),
        }
    }
}

/// Output of one render: the document and, when enabled, its copy control.
#[derive(Debug)]
pub struct Rendered<B> {
    pub document: Document,
    pub copy: Option<CopyController<B>>,
}

impl<B: ClipboardBackend> Rendered<B> {
    /// Document HTML followed by the copy button, if any.
    pub fn to_html(&self) -> String {
        let mut html = self.document.to_html();
        if let Some(copy) = &self.copy {
            let button = Document::new(vec![Node::Element(copy.affordance())]);
            html.push_str(&button.to_html());
        }
        html
    }
}

/// Renders content with a fixed set of overrides. Cheap to reuse across renders;
/// nothing derived from content is cached.
#[derive(Debug)]
pub struct Renderer<B = SystemClipboard> {
    overrides: Overrides,
    clipboard: B,
    ack_window: Duration,
}

impl Renderer<SystemClipboard> {
    pub fn new(overrides: Overrides) -> Self {
        Self::with_clipboard(overrides, SystemClipboard::default())
    }
}

impl<B: ClipboardBackend + Clone> Renderer<B> {
    pub fn with_clipboard(overrides: Overrides, clipboard: B) -> Self {
        Self {
            overrides,
            clipboard,
            ack_window: DEFAULT_ACK_WINDOW,
        }
    }

    /// How long copy controllers show the success glyph.
    #[must_use]
    pub fn ack_window(mut self, window: Duration) -> Self {
        self.ack_window = window;
        self
    }

    /// Render `content`. Absent content renders as an empty document.
    pub fn render(&self, content: Option<&str>, options: &RenderOptions) -> Rendered<B> {
        let normalized = normalize(content).unwrap_or_default();
        let mut document = parse::parse(&normalized, options.extensions);

        let pipeline = compose_stages(options.animated);
        pipeline.run(&mut document);

        overrides::apply(
            &mut document.children,
            &self.overrides,
            options.check_link_credibility,
        );

        // Copy reproduces what the caller passed in, not the normalized text.
        let copy = match content {
            Some(original) if options.enable_copy => Some(
                CopyController::new(original, self.clipboard.clone())
                    .with_ack_window(self.ack_window),
            ),
            _ => None,
        };
        Rendered { document, copy }
    }
}
