use page_scribe::engine::normalization::{base_domain, is_external, normalize_url};

// * URL normalization

#[test]
fn test_basic_normalization() {
    assert_eq!(normalize_url("page", "https://example.com").unwrap(), "https://example.com/page");
}

#[test]
fn test_strip_fragment() {
    assert_eq!(
        normalize_url("page#section1", "https://example.com").unwrap(),
        "https://example.com/page"
    );
}

#[test]
fn test_lowercase_host() {
    assert_eq!(normalize_url("/page", "https://EXAMPLE.com").unwrap(), "https://example.com/page");
}

#[test]
fn test_tracking_params_dropped_and_query_sorted() {
    let normalized = normalize_url(
        "/search?sort=asc&utm_source=google&id=123&gclid=xyz",
        "https://example.com",
    )
    .unwrap();
    assert_eq!(normalized, "https://example.com/search?id=123&sort=asc");
}

#[test]
fn test_non_http_targets_skipped() {
    assert_eq!(normalize_url("mailto:a@example.com", "https://example.com"), None);
    assert_eq!(normalize_url("javascript:void(0)", "https://example.com"), None);
}

#[test]
fn test_invalid_base() {
    assert_eq!(normalize_url("page", "not_a_url"), None);
}

// * Site membership

#[test]
fn test_base_domain() {
    assert_eq!(base_domain("www.nbcnews.com"), "nbcnews.com");
    assert_eq!(base_domain("video.news.bbc.co.uk"), "bbc.co.uk");
    assert_eq!(base_domain("localhost"), "localhost");
    assert_eq!(base_domain("127.0.0.1"), "127.0.0.1");
}

#[test]
fn test_subdomains_are_internal() {
    let base = "https://www.nbcnews.com/artificial-intelligence";
    assert!(!is_external("/tech", base));
    assert!(!is_external("https://nbcnews.com/politics", base));
    assert!(!is_external("https://video.nbcnews.com/clip", base));
}

#[test]
fn test_other_sites_are_external() {
    let base = "https://www.nbcnews.com/artificial-intelligence";
    assert!(is_external("https://twitter.com/nbcnews", base));
    assert!(is_external("//cdn.other.net/app.js", base));
}

#[test]
fn test_non_http_links_are_not_external() {
    let base = "https://www.nbcnews.com/";
    assert!(!is_external("mailto:tips@nbcnews.com", base));
    assert!(!is_external("tel:+15555550100", base));
}
