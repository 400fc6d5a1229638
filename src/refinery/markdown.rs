// * HTML -> markdown via html2md, plus citation-style link rewriting

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").unwrap());

// * `[text](href "title")`, optionally preceded by `!` for images
static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(!?)\[([^\]]*)\]\(([^)\s]+)(?:\s+"[^"]*")?\)"#).unwrap()
});

/// Markdown renditions of one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkdownResult {
    pub raw_markdown: String,
    /// Links replaced by `text⟨n⟩` markers
    pub markdown_with_citations: String,
    /// `## References` section matching the markers
    pub references_markdown: String,
}

impl MarkdownResult {
    // * Citation body followed by its reference list
    pub fn with_references(&self) -> String {
        format!("{}{}", self.markdown_with_citations, self.references_markdown)
    }
}

impl fmt::Display for MarkdownResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_markdown)
    }
}

pub fn html_to_markdown(html: &str) -> String {
    let markdown = html2md::parse_html(html);
    let collapsed = EXCESS_NEWLINES.replace_all(&markdown, "\n\n");
    collapsed
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// * Rewrites links into numbered citations. Each distinct absolute URL gets one
// * number, in order of first appearance. Images are left untouched.
pub fn add_citations(markdown: &str, base_url: &str) -> (String, String) {
    let base = Url::parse(base_url).ok();
    let mut numbers: HashMap<String, usize> = HashMap::new();
    let mut references: Vec<(String, String)> = Vec::new();

    let cited = MARKDOWN_LINK.replace_all(markdown, |caps: &Captures<'_>| {
        if &caps[1] == "!" {
            return caps[0].to_string();
        }

        let text = caps[2].trim();
        let href = &caps[3];
        let absolute = base
            .as_ref()
            .and_then(|b| b.join(href).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| href.to_string());

        let number = *numbers.entry(absolute.clone()).or_insert_with(|| {
            references.push((absolute.clone(), text.to_string()));
            references.len()
        });

        format!("{}⟨{}⟩", text, number)
    });

    if references.is_empty() {
        return (cited.into_owned(), String::new());
    }

    let lines: Vec<String> = references
        .iter()
        .enumerate()
        .map(|(i, (url, text))| {
            if text.is_empty() {
                format!("⟨{}⟩ {}", i + 1, url)
            } else {
                format!("⟨{}⟩ {}: {}", i + 1, url, text)
            }
        })
        .collect();

    (
        cited.into_owned(),
        format!("\n\n## References\n\n{}\n", lines.join("\n")),
    )
}

pub struct MarkdownGenerator {
    citations: bool,
}

impl MarkdownGenerator {
    pub fn new(citations: bool) -> Self {
        Self { citations }
    }

    pub fn generate(&self, cleaned_html: &str, base_url: &str) -> MarkdownResult {
        let raw_markdown = html_to_markdown(cleaned_html);

        let (markdown_with_citations, references_markdown) = if self.citations {
            add_citations(&raw_markdown, base_url)
        } else {
            (raw_markdown.clone(), String::new())
        };

        MarkdownResult {
            raw_markdown,
            markdown_with_citations,
            references_markdown,
        }
    }
}
