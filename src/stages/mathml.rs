//! MathML re-emission. pulldown-latex copies TeX text into its output verbatim,
//! so its markup is re-tokenized and only balanced MathML tags survive.

use std::sync::OnceLock;

use regex::Regex;

const ELEMENTS: &[&str] = &[
    "math",
    "semantics",
    "annotation",
    "mrow",
    "mi",
    "mn",
    "mo",
    "ms",
    "mtext",
    "mspace",
    "mfrac",
    "msqrt",
    "mroot",
    "msub",
    "msup",
    "msubsup",
    "munder",
    "mover",
    "munderover",
    "mmultiscripts",
    "mprescripts",
    "none",
    "mtable",
    "mtr",
    "mlabeledtr",
    "mtd",
    "mstyle",
    "mpadded",
    "mphantom",
    "menclose",
    "merror",
];

const ATTRIBUTES: &[&str] = &[
    "xmlns",
    "display",
    "class",
    "style",
    "encoding",
    "mathvariant",
    "mathcolor",
    "mathbackground",
    "mathsize",
    "displaystyle",
    "scriptlevel",
    "form",
    "fence",
    "separator",
    "stretchy",
    "symmetric",
    "largeop",
    "movablelimits",
    "accent",
    "accentunder",
    "lspace",
    "rspace",
    "minsize",
    "maxsize",
    "linethickness",
    "width",
    "height",
    "depth",
    "voffset",
    "notation",
    "columnalign",
    "columnlines",
    "columnspacing",
    "columnspan",
    "rowalign",
    "rowlines",
    "rowspacing",
    "rowspan",
    "frame",
    "framespacing",
    "equalrows",
    "equalcolumns",
];

static TAG: OnceLock<Regex> = OnceLock::new();
static ATTR: OnceLock<Regex> = OnceLock::new();
static ENTITY: OnceLock<Regex> = OnceLock::new();

fn tag_pattern() -> &'static Regex {
    TAG.get_or_init(|| {
        Regex::new(r#"^<(/?)([a-z][a-z0-9]*)((?:\s+[a-zA-Z][a-zA-Z0-9:-]*="[^"<>]*")*)\s*(/?)>"#)
            .expect("tag pattern is a valid regex")
    })
}

fn attr_pattern() -> &'static Regex {
    ATTR.get_or_init(|| {
        Regex::new(r#"([a-zA-Z][a-zA-Z0-9:-]*)="([^"<>]*)""#).expect("attr pattern is a valid regex")
    })
}

fn entity_pattern() -> &'static Regex {
    ENTITY.get_or_init(|| {
        Regex::new(r"^&(?:#[0-9]+|#x[0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);")
            .expect("entity pattern is a valid regex")
    })
}

/// Keep well-formed, balanced MathML tags carrying known attributes; escape
/// every other `<`, `>` and bare `&`. Elements left open are closed.
pub(super) fn sanitize(mathml: &str) -> String {
    let mut out = String::with_capacity(mathml.len());
    let mut open: Vec<&str> = Vec::new();
    let mut rest = mathml;
    while let Some(c) = rest.chars().next() {
        match c {
            '<' => {
                if let Some(len) = accept_tag(rest, &mut open) {
                    out.push_str(&rest[..len]);
                    rest = &rest[len..];
                    continue;
                }
                out.push_str("&lt;");
            }
            '>' => out.push_str("&gt;"),
            '&' => match entity_pattern().find(rest) {
                Some(entity) => {
                    out.push_str(entity.as_str());
                    rest = &rest[entity.end()..];
                    continue;
                }
                None => out.push_str("&amp;"),
            },
            _ => out.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }
    while let Some(name) = open.pop() {
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
    out
}

/// Length of the tag at the start of `rest` if it may be emitted as markup.
fn accept_tag<'a>(rest: &'a str, open: &mut Vec<&'a str>) -> Option<usize> {
    let caps = tag_pattern().captures(rest)?;
    let name = caps.get(2)?.as_str();
    if !ELEMENTS.contains(&name) {
        return None;
    }
    let closing = !caps[1].is_empty();
    let self_closing = !caps[4].is_empty();
    let attrs = &caps[3];
    if closing {
        // A close must match the innermost open element; stray closes are text.
        if self_closing || !attrs.trim().is_empty() || open.last() != Some(&name) {
            return None;
        }
        open.pop();
    } else {
        if !attr_pattern()
            .captures_iter(attrs)
            .all(|attr| allowed_attr(&attr[1], &attr[2]))
        {
            return None;
        }
        if !self_closing {
            open.push(name);
        }
    }
    Some(caps.get(0)?.end())
}

fn allowed_attr(name: &str, value: &str) -> bool {
    ATTRIBUTES.contains(&name) && (name != "style" || !value.contains(['(', '\\', '&']))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_markup_passes_through() {
        let mathml = r#"<math display="block"><mfrac><mi>a</mi><mi>b</mi></mfrac><mspace width="1em"/></math>"#;
        assert_eq!(sanitize(mathml), mathml);
    }

    #[test]
    fn operator_text_is_escaped() {
        assert_eq!(
            sanitize("<math><mi>a</mi><mo><</mo><mo>></mo><mo>&</mo></math>"),
            "<math><mi>a</mi><mo>&lt;</mo><mo>&gt;</mo><mo>&amp;</mo></math>"
        );
    }

    #[test]
    fn foreign_elements_are_escaped() {
        let out = sanitize("<math><mtext><img src=x onerror=alert(1)></mtext></math>");
        assert_eq!(
            out,
            "<math><mtext>&lt;img src=x onerror=alert(1)&gt;</mtext></math>"
        );
    }

    #[test]
    fn unknown_attributes_are_escaped() {
        let out = sanitize(r#"<math><mi onclick="x">a</mi></math>"#);
        assert!(out.starts_with("<math>&lt;mi onclick"), "{out}");
        assert!(out.ends_with("a&lt;/mi&gt;</math>"), "{out}");
    }

    #[test]
    fn stray_close_cannot_end_the_math_element() {
        let out = sanitize("<math><mi></math><script></mi></math>");
        assert_eq!(out, "<math><mi>&lt;/math&gt;&lt;script&gt;</mi></math>");
    }

    #[test]
    fn unclosed_elements_are_closed() {
        assert_eq!(sanitize("<math><mrow><mi>x"), "<math><mrow><mi>x</mi></mrow></math>");
    }

    #[test]
    fn entities_are_kept() {
        assert_eq!(sanitize("<mi>&#x3B1;&amp;</mi>"), "<mi>&#x3B1;&amp;</mi>");
    }
}
