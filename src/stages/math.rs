//! Math typesetting: TeX literals to sanitized MathML.

use pulldown_latex::config::{DisplayMode, RenderConfig};
use pulldown_latex::mathml::push_mathml;
use pulldown_latex::{Parser, Storage};
use thiserror::Error;

use super::mathml::sanitize;
use crate::document::{Element, Node, TEX_ATTR};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("invalid TeX: {0}")]
    Parse(String),
    #[error("MathML output failed: {0}")]
    Write(String),
}

/// Typeset TeX (delimiters already removed) as a MathML fragment that is safe
/// to embed in HTML.
pub fn to_mathml(tex: &str, display: bool) -> Result<String, MathError> {
    let storage = Storage::new();
    let events: Vec<_> = Parser::new(tex, &storage).collect();

    let problems: Vec<String> = events
        .iter()
        .filter_map(|event| event.as_ref().err())
        .map(ToString::to_string)
        .collect();
    if !problems.is_empty() {
        return Err(MathError::Parse(problems.join("; ")));
    }

    let config = RenderConfig {
        display_mode: if display {
            DisplayMode::Block
        } else {
            DisplayMode::Inline
        },
        ..Default::default()
    };
    let mut raw = String::new();
    push_mathml(&mut raw, events.into_iter(), config)
        .map_err(|e| MathError::Write(e.to_string()))?;
    Ok(sanitize(&raw))
}

/// Replace every math literal with a typeset span. Returns how many were typeset.
pub(super) fn typeset(nodes: &mut [Node]) -> usize {
    let mut count = 0;
    for node in nodes.iter_mut() {
        match node {
            Node::Math { tex, display } => {
                let span = typeset_one(tex, *display);
                *node = Node::Element(span);
                count += 1;
            }
            Node::Element(el) => count += typeset(&mut el.children),
            Node::Text(_) | Node::Raw(_) => {}
        }
    }
    count
}

fn typeset_one(tex: &str, display: bool) -> Element {
    let mode_class = if display {
        "math-display"
    } else {
        "math-inline"
    };
    match to_mathml(tex, display) {
        Ok(mathml) => Element::new("span")
            .with_attr("class", format!("math {mode_class}"))
            .with_attr(TEX_ATTR, tex)
            .with_child(Node::Raw(mathml)),
        // Bad TeX shows its source instead of failing the render.
        Err(err) => {
            log::debug!("math typeset failed for {:?}: {}", tex, err);
            Element::new("span")
                .with_attr("class", format!("math math-error {mode_class}"))
                .with_attr("title", err.to_string())
                .with_attr(TEX_ATTR, tex)
                .with_child(Element::new("code").with_child(Node::text(tex)))
        }
    }
}
