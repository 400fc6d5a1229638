// * DOM pruning ahead of markdown generation
// * Excluded tags -> overlays -> external links -> short text blocks

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::CrawlerRunConfig;
use crate::engine::normalization::is_external;
use crate::refinery::links::{collect_links, Links};

// * Candidate popups, modals and consent layers. Substring hits are narrowed
// * to whole class/id words by `is_overlay`.
static SELECTOR_OVERLAY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"[role="dialog"], [role="alertdialog"], [aria-modal="true"],
           [class*="modal" i], [id*="modal" i],
           [class*="popup" i], [id*="popup" i],
           [class*="overlay" i], [class*="lightbox" i],
           [class*="cookie" i], [id*="cookie" i],
           [class*="consent" i], [id*="consent" i]"#,
    )
    .unwrap()
});

// * An overlay never wraps the main content or the page headline
static SELECTOR_MAIN_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"article, main, [role="main"], h1"#).unwrap());

static SELECTOR_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

static SELECTOR_BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

// * Elements that hold a run of prose
static SELECTOR_TEXT_BLOCK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p, li, blockquote, dd, dt, figcaption, div, section").unwrap()
});

// * Blocks containing any of these are never pruned for being short
static SELECTOR_EXEMPT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, pre, code, img, picture, video, table").unwrap()
});

const TEXT_BLOCK_TAGS: &[&str] = &["p", "li", "blockquote", "dd", "dt", "figcaption", "div", "section"];

const OVERLAY_WORDS: &[&str] = &["modal", "popup", "overlay", "lightbox", "cookie", "consent"];

// * Leading words that turn a class into a state flag (`no-overlay`, `has-modal`)
const STATE_PREFIXES: &[&str] = &["no", "not", "non", "has", "is", "with", "without"];

/// What each pass removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningStats {
    pub excluded_tags: usize,
    pub overlays: usize,
    pub external_links: usize,
    pub short_blocks: usize,
}

/// Result of the cleaning pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanedHtml {
    /// Serialized `<body>` after pruning
    pub html: String,
    pub word_count: usize,
    /// Links left after tag exclusion and overlay removal
    pub links: Links,
    pub stats: CleaningStats,
}

/// Prunes a document according to a run configuration
pub struct ContentCleaner {
    excluded: Vec<Selector>,
    word_count_threshold: usize,
    remove_overlays: bool,
    exclude_external_links: bool,
}

impl ContentCleaner {
    pub fn new(config: &CrawlerRunConfig) -> Self {
        let excluded = config
            .all_excluded_tags()
            .iter()
            .filter_map(|tag| match Selector::parse(tag) {
                Ok(selector) => Some(selector),
                Err(_) => {
                    warn!("Ignoring unparsable excluded tag '{}'", tag);
                    None
                }
            })
            .collect();

        Self {
            excluded,
            word_count_threshold: config.word_count_threshold,
            remove_overlays: config.remove_overlay_elements,
            exclude_external_links: config.exclude_external_links,
        }
    }

    pub fn clean(&self, html: &str, base_url: &str) -> CleanedHtml {
        let mut document = Html::parse_document(html);
        let mut stats = CleaningStats::default();

        for selector in &self.excluded {
            stats.excluded_tags += detach_matching(&mut document, selector, |_| true);
        }

        if self.remove_overlays {
            stats.overlays = detach_matching(&mut document, &SELECTOR_OVERLAY, is_overlay);
        }

        let links = collect_links(&document, base_url, self.exclude_external_links);

        if self.exclude_external_links {
            stats.external_links = detach_matching(&mut document, &SELECTOR_LINK, |el| {
                el.value()
                    .attr("href")
                    .is_some_and(|href| is_external(href, base_url))
            });
        }

        stats.short_blocks = detach_matching(&mut document, &SELECTOR_TEXT_BLOCK, |el| {
            is_leaf_block(el)
                && el.select(&SELECTOR_EXEMPT).next().is_none()
                && count_words(el) < self.word_count_threshold
        });

        let (html, word_count) = match document.select(&SELECTOR_BODY).next() {
            Some(body) => (body.html(), count_words(body)),
            None => {
                let root = document.root_element();
                (root.html(), count_words(root))
            }
        };

        debug!(
            "Cleaned document: {} words kept, removed {:?}",
            word_count, stats
        );

        CleanedHtml {
            html,
            word_count,
            links,
            stats,
        }
    }
}

// * Detaches every element matching `selector` for which `predicate` holds.
// * Returns how many elements were removed.
fn detach_matching<F>(document: &mut Html, selector: &Selector, predicate: F) -> usize
where
    F: Fn(ElementRef<'_>) -> bool,
{
    let ids: Vec<_> = document
        .select(selector)
        .filter(|el| predicate(*el))
        .map(|el| el.id())
        .collect();

    let mut removed = 0;
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
            removed += 1;
        }
    }
    removed
}

// * Dialog roles count as they are. Class and id hits must name an overlay as a
// * whole word, and nothing holding the main content is removed.
fn is_overlay(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if matches!(el.name(), "html" | "body") {
        return false;
    }
    if element.select(&SELECTOR_MAIN_CONTENT).next().is_some() {
        return false;
    }

    let dialog = matches!(el.attr("role"), Some("dialog" | "alertdialog"))
        || el.attr("aria-modal") == Some("true");
    if dialog {
        return true;
    }

    el.classes()
        .chain(el.id())
        .any(names_overlay)
}

// * `cookie-banner`, `CookieBanner`, `popups` yes; `no-overlay`, `has-modal` no
fn names_overlay(token: &str) -> bool {
    let words = token_words(token);
    if words.first().is_some_and(|first| STATE_PREFIXES.contains(&first.as_str())) {
        return false;
    }

    words.iter().any(|word| {
        let singular = word.strip_suffix('s').unwrap_or(word);
        OVERLAY_WORDS.contains(&word.as_str()) || OVERLAY_WORDS.contains(&singular)
    })
}

// * Splits on `-`, `_` and lower-to-upper case changes, lowercased
fn token_words(token: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in token.chars() {
        if c == '-' || c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

// * A text block with no text blocks nested inside it
fn is_leaf_block(element: ElementRef<'_>) -> bool {
    !element.descendants().skip(1).any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| TEXT_BLOCK_TAGS.contains(&el.name()))
    })
}

pub fn count_words(element: ElementRef<'_>) -> usize {
    element.text().map(|t| t.unicode_words().count()).sum()
}
