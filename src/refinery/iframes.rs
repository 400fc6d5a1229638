// * Iframe discovery and inlining
// * Iframes are swapped for <div class="iframe-content"> holding the framed body

use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

static SELECTOR_IFRAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("iframe").unwrap());
static SELECTOR_BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// One iframe in document order
#[derive(Debug, Clone, PartialEq)]
pub struct IframeRef {
    pub index: usize,
    /// `src` resolved against the page URL (http/https only)
    pub src: Option<String>,
    pub srcdoc: Option<String>,
}

pub fn collect_iframes(html: &str, base_url: &str) -> Vec<IframeRef> {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    document
        .select(&SELECTOR_IFRAME)
        .enumerate()
        .map(|(index, frame)| {
            let src = frame.value().attr("src").and_then(|raw| {
                let resolved = match &base {
                    Some(base) => base.join(raw.trim()).ok()?,
                    None => Url::parse(raw.trim()).ok()?,
                };
                matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
            });

            IframeRef {
                index,
                src,
                srcdoc: frame.value().attr("srcdoc").map(str::to_string),
            }
        })
        .collect()
}

// * Inner markup of a framed document's <body>
pub fn iframe_body(document_html: &str) -> String {
    let document = Html::parse_document(document_html);
    document
        .select(&SELECTOR_BODY)
        .next()
        .map(|body| body.inner_html())
        .unwrap_or_default()
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

// * Replaces iframes (by index) with their resolved body markup.
// * Iframes without an entry are left in place.
pub fn inline_iframes(html: &str, bodies: &HashMap<usize, String>) -> String {
    if bodies.is_empty() {
        return html.to_string();
    }

    let document = Html::parse_document(html);
    let mut serialized = document.root_element().html();

    // * Outer markup comes from the same parse as `serialized`, so it matches verbatim.
    // * Replacing in document order keeps duplicates aligned with their index.
    let mut cursor = 0;
    for (index, frame) in document.select(&SELECTOR_IFRAME).enumerate() {
        let outer = frame.html();
        let Some(found) = serialized[cursor..].find(&outer) else {
            continue;
        };
        let start = cursor + found;

        match bodies.get(&index) {
            Some(body) => {
                let src = frame.value().attr("src").unwrap_or_default();
                let replacement = format!(
                    r#"<div class="iframe-content" data-iframe-src="{}">{}</div>"#,
                    escape_attr(src),
                    body
                );
                serialized.replace_range(start..start + outer.len(), &replacement);
                cursor = start + replacement.len();
            }
            None => cursor = start + outer.len(),
        }
    }

    serialized
}
