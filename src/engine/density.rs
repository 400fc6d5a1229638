// * Density Metric Calculator
// * Scores a plain-HTTP body to decide whether it needs a browser render (auto mode)

use scraper::{Html, Selector};
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

// * Scores below this escalate to the browser
const RENDER_THRESHOLD: f64 = 0.48;

// * Weight factors for density calculation
const TEXT_DENSITY_WEIGHT: f64 = 0.4;
const LINK_DENSITY_WEIGHT: f64 = 0.2;
const TAG_SCORE_WEIGHT: f64 = 0.2;

// * Tag score values
const HIGH_VALUE_TAG_SCORE: f64 = 1.5;
const LOW_VALUE_TAG_SCORE: f64 = 0.5;

// * Assumed average characters of markup per word of text
const CHARS_PER_WORD: f64 = 10.0;

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").unwrap());
static ARTICLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article, main, [role='main']").unwrap());
static APP_ROOT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("#root, #app, #__next, [data-reactroot], [ng-app]").unwrap()
});

// * Where the final HTML should come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDecision {
    // * The HTTP body is good enough
    UseHttp,
    // * Content is likely script-rendered
    RenderInBrowser,
}

#[derive(Debug, Clone)]
pub struct DensityMetrics {
    pub text_density: f64,
    pub link_density: f64,
    pub tag_score: f64,
    pub final_score: f64,
    pub decision: RenderDecision,
}

impl DensityMetrics {
    pub fn compute(html: &str) -> Self {
        let document = Html::parse_document(html);

        let text_density = text_density(&document);
        let link_density = link_density(&document);
        let tag_score = tag_score(&document);

        // * Score = 0.4 * text + 0.2 * link + 0.2 * tag
        let final_score = (TEXT_DENSITY_WEIGHT * text_density)
            + (LINK_DENSITY_WEIGHT * link_density)
            + (TAG_SCORE_WEIGHT * tag_score);

        // * An empty single-page-app shell always needs a render
        let empty_app_shell = document.select(&APP_ROOT_SELECTOR).next().is_some()
            && text_density < 0.05;

        let decision = if final_score < RENDER_THRESHOLD || empty_app_shell {
            RenderDecision::RenderInBrowser
        } else {
            RenderDecision::UseHttp
        };

        Self {
            text_density,
            link_density,
            tag_score,
            final_score,
            decision,
        }
    }

    pub fn needs_browser(html: &str) -> bool {
        Self::compute(html).decision == RenderDecision::RenderInBrowser
    }
}

fn body_text<'a>(document: &'a Html) -> impl Iterator<Item = &'a str> + 'a {
    document.select(&BODY_SELECTOR).flat_map(|el| el.text())
}

// * Words of visible text relative to markup size, clamped to 0-1
fn text_density(document: &Html) -> f64 {
    let words: usize = body_text(document).map(|t| t.unicode_words().count()).sum();
    let html_len = document.root_element().html().len();

    if html_len == 0 {
        return 0.0;
    }

    ((words as f64 * CHARS_PER_WORD) / html_len as f64).min(1.0)
}

// * 1 - (link text / all text); whitespace is ignored
fn link_density(document: &Html) -> f64 {
    let total_len: usize = body_text(document).map(|s| s.trim().len()).sum();
    let link_len: usize = document
        .select(&LINK_SELECTOR)
        .flat_map(|el| el.text())
        .map(|s| s.trim().len())
        .sum();

    if total_len == 0 {
        return 0.0;
    }

    1.0 - (link_len as f64 / total_len as f64).min(1.0)
}

fn tag_score(document: &Html) -> f64 {
    if document.select(&ARTICLE_SELECTOR).next().is_some() {
        HIGH_VALUE_TAG_SCORE
    } else {
        LOW_VALUE_TAG_SCORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_page_stays_on_http() {
        let html = r#"
            <html>
            <body>
                <article>
                    <h1>Article Title</h1>
                    <p>This is a well-structured article with substantial text content.
                    It contains multiple paragraphs of meaningful information that would
                    be valuable to readers. The content is rich and informative.</p>
                    <p>Another paragraph with more valuable content that adds to the
                    overall quality and density of the page.</p>
                </article>
            </body>
            </html>
        "#;

        let metrics = DensityMetrics::compute(html);
        assert_eq!(metrics.tag_score, HIGH_VALUE_TAG_SCORE);
        assert!(metrics.text_density > 0.0);
        assert_eq!(metrics.decision, RenderDecision::UseHttp);
    }

    #[test]
    fn test_link_heavy_page_scores_low() {
        let html = r#"
            <html><body>
                <a href="/1">Link 1</a>
                <a href="/2">Link 2</a>
                <a href="/3">Link 3</a>
            </body></html>
        "#;

        assert!(DensityMetrics::compute(html).link_density < 0.5);
    }

    #[test]
    fn test_empty_page_needs_browser() {
        let metrics = DensityMetrics::compute("<html><body></body></html>");
        assert_eq!(metrics.decision, RenderDecision::RenderInBrowser);
    }

    #[test]
    fn test_app_shell_needs_browser() {
        let html = r#"<html><body><div id="root"></div><script>app.init()</script></body></html>"#;
        assert!(DensityMetrics::needs_browser(html));
    }

    #[test]
    fn test_plain_div_gets_low_tag_score() {
        let metrics = DensityMetrics::compute("<html><body><div>Just a div</div></body></html>");
        assert_eq!(metrics.tag_score, LOW_VALUE_TAG_SCORE);
    }
}
