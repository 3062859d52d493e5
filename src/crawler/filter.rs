use std::collections::HashSet;
use url::{Position, Url};

/// Scheme every visited key is rewritten to, so http and https collapse.
const CANONICAL_SCHEME: &str = "https";

/// Decides, exactly once per normalized url, whether a page gets crawled.
///
/// The filter is owned by the crawl coordinator and never shared with workers.
pub struct Filter {
    base_domain: String,
    visited: HashSet<String>,
}

impl Filter {
    pub fn new(base: &Url) -> Self {
        Self {
            base_domain: base_domain(base).to_string(),
            visited: HashSet::new(),
        }
    }

    /// Marks `url` as visited and returns true, or returns false when it was
    /// seen before or lives outside the base domain.
    ///
    /// Queries and fragments are part of a page's identity (`/blog?page=2` is
    /// not `/blog`), a single trailing slash is not.
    pub fn visit(&mut self, url: &Url) -> bool {
        let key = normalize(url);

        if self.visited.contains(&key) {
            return false;
        }

        if base_domain(url) != self.base_domain {
            return false;
        }

        self.visited.insert(key)
    }

    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Builds the identity key of a url: canonical scheme, one trailing slash
/// trimmed from the path, everything else kept verbatim.
///
/// Done on the serialized form because `Url` refuses an empty path for
/// http(s), so `set_path("")` would put the slash right back.
fn normalize(url: &Url) -> String {
    let authority = &url[Position::BeforeUsername..Position::AfterPort];
    let path = url.path();
    let path = path.strip_suffix('/').unwrap_or(path);
    let rest = &url[Position::AfterPath..];

    format!("{CANONICAL_SCHEME}://{authority}{path}{rest}")
}

/// Second-to-last label of the host, `sub.example.com` -> `example`.
/// Single-label hosts return themselves, hostless urls return "".
///
/// Not public-suffix aware: `foo.co.uk` and `bar.co.uk` both yield `co`.
fn base_domain(url: &Url) -> &str {
    let host = url.host_str().unwrap_or_default();
    let mut labels = host.rsplit('.');
    let last = labels.next().unwrap_or_default();
    labels.next().unwrap_or(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    /// Filter that has already admitted the seed, a subdomain root and /news
    fn seeded_filter() -> Filter {
        let base = url("https://example.com");
        let mut filter = Filter::new(&base);
        assert!(filter.visit(&base));
        assert!(filter.visit(&url("https://sub.example.com/")));
        assert!(filter.visit(&url("https://example.com/news")));
        filter
    }

    #[test]
    fn test_visit_table() {
        let table = [
            ("trailing slash of visited root", "https://example.com/", false),
            ("same path on a subdomain", "https://sub.example.com/news", true),
            ("subdomain root already visited", "https://sub.example.com", false),
            ("different base domain", "https://google.com", false),
            ("different protocol", "http://example.com/news", false),
            ("not visited yet", "https://example.com/products", true),
        ];

        for (name, input, expected) in table {
            let mut filter = seeded_filter();
            assert_eq!(filter.visit(&url(input)), expected, "{name}: {input}");
        }
    }

    #[test]
    fn test_second_visit_is_rejected() {
        let mut filter = Filter::new(&url("https://example.com"));
        let page = url("https://example.com/about");
        assert!(filter.visit(&page));
        assert!(!filter.visit(&page));
        assert_eq!(filter.visited_count(), 1);
    }

    #[test]
    fn test_trailing_slash_equivalence() {
        let mut filter = Filter::new(&url("https://example.com"));
        assert!(filter.visit(&url("https://example.com/")));
        assert!(!filter.visit(&url("https://example.com")));
        assert!(filter.visit(&url("https://example.com/blog/")));
        assert!(!filter.visit(&url("https://example.com/blog")));
    }

    #[test]
    fn test_only_one_trailing_slash_is_trimmed() {
        let mut filter = Filter::new(&url("https://example.com"));
        assert!(filter.visit(&url("https://example.com/blog")));
        assert!(filter.visit(&url("https://example.com/blog//")));
    }

    #[test]
    fn test_scheme_is_normalized() {
        let mut filter = Filter::new(&url("https://example.com"));
        assert!(filter.visit(&url("https://example.com/news")));
        assert!(!filter.visit(&url("http://example.com/news")));
    }

    #[test]
    fn test_cross_domain_never_admitted() {
        let mut filter = Filter::new(&url("https://example.com"));
        assert!(!filter.visit(&url("https://other.com")));
        assert!(!filter.visit(&url("https://other.com")));
        assert!(filter.visit(&url("https://sub.example.com/x")));
        assert_eq!(filter.visited_count(), 1);
    }

    #[test]
    fn test_queries_are_distinct_pages() {
        let mut filter = Filter::new(&url("https://example.com"));
        assert!(filter.visit(&url("https://example.com/blog?page=2")));
        assert!(filter.visit(&url("https://example.com/blog?page=3")));
        assert!(filter.visit(&url("https://example.com/blog")));
        assert!(!filter.visit(&url("https://example.com/blog/?page=2")));
    }

    #[test]
    fn test_fragments_are_kept() {
        let mut filter = Filter::new(&url("https://example.com"));
        assert!(filter.visit(&url("https://example.com/guide#install")));
        assert!(filter.visit(&url("https://example.com/guide#usage")));
    }

    #[test]
    fn test_base_domain_heuristic() {
        assert_eq!(base_domain(&url("https://sub.example.com/x")), "example");
        assert_eq!(base_domain(&url("http://localhost:8080/")), "localhost");
        assert_eq!(base_domain(&url("mailto:a@example.com")), "");
        // known limitation, not public-suffix aware
        assert_eq!(base_domain(&url("https://foo.co.uk")), base_domain(&url("https://bar.co.uk")));
    }

    #[test]
    fn test_hostless_links_are_rejected() {
        let mut filter = Filter::new(&url("https://example.com"));
        assert!(!filter.visit(&url("mailto:someone@example.com")));
        assert!(!filter.visit(&url("javascript:void(0)")));
    }

    #[test]
    fn test_normalize_keeps_port_and_query() {
        assert_eq!(
            normalize(&url("http://example.com:8080/a/?q=1#top")),
            "https://example.com:8080/a?q=1#top"
        );
        assert_eq!(normalize(&url("https://example.com/")), "https://example.com");
    }
}
