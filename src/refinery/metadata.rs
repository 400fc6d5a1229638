// * Page metadata: <title>, named meta tags, Open Graph, document language
// * Fallback: first <h1> when there is no <title>

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static SELECTOR_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static SELECTOR_H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static SELECTOR_META: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta[content]").unwrap());
static SELECTOR_HTML: LazyLock<Selector> = LazyLock::new(|| Selector::parse("html[lang]").unwrap());

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub keywords: Vec<String>,
    pub language: Option<String>,
    /// og:* properties keyed without the prefix
    pub open_graph: BTreeMap<String, String>,
}

impl PageMetadata {
    pub fn extract(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut metadata = PageMetadata::default();

        for meta in document.select(&SELECTOR_META) {
            let element = meta.value();
            let Some(content) = element.attr("content").map(str::trim).filter(|c| !c.is_empty()) else {
                continue;
            };

            if let Some(property) = element.attr("property") {
                if let Some(key) = property.strip_prefix("og:") {
                    metadata
                        .open_graph
                        .entry(key.to_string())
                        .or_insert_with(|| content.to_string());
                }
                continue;
            }

            match element.attr("name").map(|n| n.to_ascii_lowercase()).as_deref() {
                Some("description") => {
                    metadata.description.get_or_insert_with(|| content.to_string());
                }
                Some("author") => {
                    metadata.author.get_or_insert_with(|| content.to_string());
                }
                Some("keywords") if metadata.keywords.is_empty() => {
                    metadata.keywords = content
                        .split(',')
                        .map(str::trim)
                        .filter(|k| !k.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                _ => {}
            }
        }

        metadata.title = first_text(&document, &SELECTOR_TITLE)
            .or_else(|| metadata.open_graph.get("title").cloned())
            .or_else(|| first_text(&document, &SELECTOR_H1));

        if metadata.description.is_none() {
            metadata.description = metadata.open_graph.get("description").cloned();
        }

        metadata.language = document
            .select(&SELECTOR_HTML)
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(str::to_string);

        metadata
    }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_and_open_graph() {
        let html = r#"
            <html lang="en-US">
            <head>
                <title> AI News  | NBC </title>
                <meta name="description" content="Latest on artificial intelligence">
                <meta name="Keywords" content="ai, models, , policy">
                <meta name="author" content="Newsroom">
                <meta property="og:title" content="AI News">
                <meta property="og:image" content="https://example.com/og.png">
            </head>
            <body><h1>Ignored</h1></body>
            </html>
        "#;

        let metadata = PageMetadata::extract(html);

        assert_eq!(metadata.title.as_deref(), Some("AI News | NBC"));
        assert_eq!(metadata.description.as_deref(), Some("Latest on artificial intelligence"));
        assert_eq!(metadata.keywords, vec!["ai", "models", "policy"]);
        assert_eq!(metadata.author.as_deref(), Some("Newsroom"));
        assert_eq!(metadata.language.as_deref(), Some("en-US"));
        assert_eq!(metadata.open_graph.get("image").map(String::as_str), Some("https://example.com/og.png"));
    }

    #[test]
    fn test_title_falls_back_to_heading() {
        let metadata = PageMetadata::extract("<html><body><h1>Only <em>Heading</em></h1></body></html>");
        assert_eq!(metadata.title.as_deref(), Some("Only Heading"));
        assert!(metadata.description.is_none());
    }

    #[test]
    fn test_og_description_fallback() {
        let html = r#"<html><head><meta property="og:description" content="From OG"></head></html>"#;
        assert_eq!(PageMetadata::extract(html).description.as_deref(), Some("From OG"));
    }
}
