use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use url::Url;

// * Tracking parameters stripped from every link
static TRACKING_PARAMS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "utm_source", "utm_medium", "utm_campaign", "utm_term", "utm_content",
        "gclid", "fbclid", "ref", "yclid", "_ga",
    ]
    .into()
});

// * Resolves `href` against `base_url` and returns a canonical form:
// * no fragment, lowercase host, tracking params dropped, query sorted by key.
// * Returns None for unparsable input and for non-http(s) targets.
pub fn normalize_url(href: &str, base_url: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    let mut url = base.join(href.trim()).ok()?;

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    url.set_fragment(None);

    if let Some(host) = url.host_str() {
        let lower_host = host.to_lowercase();
        if url.set_host(Some(&lower_host)).is_err() {
            return None;
        }
    }

    // * BTreeMap keeps keys sorted; original casing is preserved
    let clean_pairs: BTreeMap<String, String> = url
        .query_pairs()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(k.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if clean_pairs.is_empty() {
        url.set_query(None);
    } else {
        let mut serializer = url.query_pairs_mut();
        serializer.clear();
        for (k, v) in &clean_pairs {
            serializer.append_pair(k, v);
        }
    }

    Some(url.to_string())
}

// * Two-label public suffixes where the registrable domain spans three labels
const SECOND_LEVEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "com.au", "net.au", "org.au",
    "co.nz", "co.jp", "co.in", "com.br", "com.cn", "co.za",
];

// * Registrable domain of a host: "video.nbcnews.com" -> "nbcnews.com".
// * IP addresses and single-label hosts are returned as-is.
pub fn base_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    if host.parse::<std::net::IpAddr>().is_ok() || host.starts_with('[') {
        return host;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host;
    }

    let last_two = labels[labels.len() - 2..].join(".");
    let keep = if SECOND_LEVEL_SUFFIXES.contains(&last_two.as_str()) { 3 } else { 2 };
    labels[labels.len() - keep..].join(".")
}

// * True when `href` points at a different site than `base_url`.
// * Sites are compared by registrable domain, so subdomains count as internal.
// * Unresolvable and non-http(s) links are never external.
pub fn is_external(href: &str, base_url: &str) -> bool {
    let Ok(base) = Url::parse(base_url) else {
        return false;
    };
    let Ok(target) = base.join(href.trim()) else {
        return false;
    };

    if !matches!(target.scheme(), "http" | "https") {
        return false;
    }

    match (base.host_str(), target.host_str()) {
        (Some(base_host), Some(target_host)) => base_domain(base_host) != base_domain(target_host),
        // * A base without a host (file:, raw:) has no notion of "same site"
        (None, Some(_)) => true,
        _ => false,
    }
}
