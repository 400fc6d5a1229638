// * Link inventory split into same-site and cross-site

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::engine::normalization::{is_external, normalize_url};

static SELECTOR_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Normalized absolute URL
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub internal: Vec<Link>,
    pub external: Vec<Link>,
}

// * First occurrence of each normalized URL wins. Non-http(s) links are skipped.
// * With `exclude_external` set the external list stays empty.
pub fn collect_links(document: &Html, base_url: &str, exclude_external: bool) -> Links {
    let mut seen = HashSet::new();
    let mut links = Links::default();

    for anchor in document.select(&SELECTOR_LINK) {
        let Some(raw) = anchor.value().attr("href") else {
            continue;
        };
        let Some(href) = normalize_url(raw, base_url) else {
            continue;
        };
        if !seen.insert(href.clone()) {
            continue;
        }

        let text = anchor
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let link = Link { href, text };

        if is_external(raw, base_url) {
            if !exclude_external {
                links.external.push(link);
            }
        } else {
            links.internal.push(link);
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<html><body>
        <a href="/tech">Tech   news</a>
        <a href="/tech#top">Tech again</a>
        <a href="https://shop.example.com/deal?utm_source=x">Deals</a>
        <a href="https://other.org/">Other</a>
        <a href="mailto:tips@example.com">Email</a>
    </body></html>"#;

    #[test]
    fn test_links_are_split_and_deduplicated() {
        let links = collect_links(&Html::parse_document(HTML), "https://www.example.com/", false);

        assert_eq!(links.internal.len(), 2);
        assert_eq!(links.internal[0].href, "https://www.example.com/tech");
        assert_eq!(links.internal[0].text, "Tech news");
        assert_eq!(links.internal[1].href, "https://shop.example.com/deal");
        assert_eq!(links.external.len(), 1);
        assert_eq!(links.external[0].href, "https://other.org/");
    }

    #[test]
    fn test_external_list_empty_when_excluded() {
        let links = collect_links(&Html::parse_document(HTML), "https://www.example.com/", true);
        assert!(links.external.is_empty());
        assert_eq!(links.internal.len(), 2);
    }
}
