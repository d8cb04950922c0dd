use std::sync::Arc;

use itertools::Itertools;

use crate::{
    configuration::Settings,
    domain::{
        html_tag::{extract_domain, extract_redirect_target},
        DiscoveryCandidate, DiscoveryStrategy,
    },
};

use super::{extract_links_from_search, Fetcher, SearchResult};

const MIN_VARIANT_LEN: usize = 2;

/// Guesses a company's official website, first by probing common domain
/// patterns and then by scraping search results.
pub struct DomainScraper {
    fetcher: Arc<dyn Fetcher>,
    settings: Arc<Settings>,
}

impl DomainScraper {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: Arc<Settings>) -> Self {
        DomainScraper { fetcher, settings }
    }

    pub async fn discover(&self, company_name: &str) -> Option<DiscoveryCandidate> {
        log::info!("Searching website for: {}", company_name);

        let candidate = match self.probe_domain_patterns(company_name).await {
            Some(candidate) => Some(candidate),
            None => self.search_web(company_name).await,
        };

        match candidate {
            Some(ref c) => log::info!("Found {} via {}", c.url, c.strategy),
            None => log::warn!("Could not find website for {}", company_name),
        }
        candidate
    }

    pub async fn probe_domain_patterns(&self, company_name: &str) -> Option<DiscoveryCandidate> {
        let discovery = &self.settings.discovery;
        let timeout = self.settings.scraping.request_timeout();

        for variant in name_variants(company_name) {
            for url in build_candidate_urls(&discovery.domain_patterns, &variant) {
                match self.fetcher.get(&url, timeout).await {
                    Ok(res) if res.status == 200 && res.len() > discovery.min_body_bytes => {
                        if is_parked(&res.text(), &discovery.parked_indicators) {
                            log::debug!("Domain {} looks parked", url);
                            continue;
                        }
                        return Some(DiscoveryCandidate {
                            url,
                            strategy: DiscoveryStrategy::PatternProbe { variant },
                        });
                    }
                    Ok(res) => {
                        log::debug!("Domain {} rejected, status {} size {}", url, res.status, res.len())
                    }
                    Err(e) => log::debug!("Domain {} failed: {}", url, e),
                }
            }
        }

        None
    }

    pub async fn search_web(&self, company_name: &str) -> Option<DiscoveryCandidate> {
        let discovery = &self.settings.discovery;

        let links = match extract_links_from_search(
            self.fetcher.as_ref(),
            discovery,
            company_name,
            self.settings.scraping.request_timeout(),
        )
        .await
        {
            SearchResult::Links(links) => links,
            SearchResult::NotFound | SearchResult::Failed => return None,
        };

        links
            .iter()
            .filter_map(|tag| extract_redirect_target(tag, &discovery.redirect_param))
            .find(|url| {
                is_likely_company_website(
                    url,
                    company_name,
                    &discovery.skip_domains,
                    discovery.min_token_len,
                )
            })
            .map(|url| DiscoveryCandidate {
                url,
                strategy: DiscoveryStrategy::WebSearch,
            })
    }
}

/// Domain-safe spellings of a company name, most specific first.
pub fn name_variants(company_name: &str) -> Vec<String> {
    let lower = company_name.to_lowercase();

    let alphanumeric: String = lower.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let stripped = lower.replace([' ', '.', ','], "");
    let first_word = match company_name.contains(' ') {
        true => lower.split_whitespace().next().unwrap_or_default().to_string(),
        false => lower.clone(),
    };

    [alphanumeric, stripped, first_word]
        .into_iter()
        .unique()
        .filter(|v| v.chars().count() >= MIN_VARIANT_LEN)
        .collect()
}

pub fn build_candidate_urls(patterns: &[String], variant: &str) -> Vec<String> {
    patterns
        .iter()
        .map(|pattern| pattern.replace("{company}", variant))
        .collect()
}

pub fn is_parked(page_text: &str, indicators: &[String]) -> bool {
    let content = page_text.to_lowercase();
    indicators
        .iter()
        .any(|indicator| content.contains(&indicator.to_lowercase()))
}

pub fn is_likely_company_website(
    url: &str,
    company_name: &str,
    skip_domains: &[String],
    min_token_len: usize,
) -> bool {
    let Some(domain) = extract_domain(url) else {
        return false;
    };

    if skip_domains
        .iter()
        .any(|skip_domain| domain.contains(skip_domain.as_str()))
    {
        return false;
    }

    let domain_clean: String = domain.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let company_name = company_name.to_lowercase();

    company_name
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().count() >= min_token_len)
        .any(|word| domain_clean.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{build_search_query, build_search_url, FetchResponse};
    use crate::testing::{landing_page, test_settings, MockFetcher};

    fn scraper(fetcher: Arc<MockFetcher>) -> DomainScraper {
        DomainScraper::new(fetcher, Arc::new(test_settings()))
    }

    fn search_url(company_name: &str) -> String {
        let settings = test_settings();
        let query = build_search_query(company_name, &settings.discovery.search_query_suffix);
        build_search_url(&settings.discovery.search_url, &query).unwrap()
    }

    fn search_page(hrefs: &[&str]) -> FetchResponse {
        let anchors: String = hrefs
            .iter()
            .map(|h| format!(r#"<a class="result__a" href="{}">result</a>"#, h))
            .collect();
        FetchResponse::new(200, format!("<html><body>{}</body></html>", anchors))
    }

    #[test]
    fn name_variants_dedup_and_order() {
        assert_eq!(name_variants("Acme Corp."), vec!["acmecorp", "acme"]);
        assert_eq!(name_variants("AT&T"), vec!["att", "at&t"]);
        assert_eq!(name_variants("Stripe"), vec!["stripe"]);
        assert!(name_variants("X").is_empty());
    }

    #[test]
    fn candidate_urls_follow_pattern_order() {
        let settings = test_settings();
        let urls = build_candidate_urls(&settings.discovery.domain_patterns, "acme");

        assert_eq!(
            urls,
            vec![
                "https://www.acme.com",
                "https://acme.com",
                "https://www.acme.io",
                "https://acme.io",
                "https://www.acme.co",
                "https://acme.co",
                "https://www.acme.net",
                "https://acme.net",
                "https://www.acme.org",
                "https://acme.org",
            ]
        );
    }

    #[test]
    fn is_likely_company_website_filters() {
        let skip = test_settings().discovery.skip_domains;

        assert!(is_likely_company_website("https://www.acme-widgets.com/", "Acme Widgets", &skip, 4));
        assert!(!is_likely_company_website("https://www.linkedin.com/company/acme", "Acme", &skip, 4));
        assert!(!is_likely_company_website("https://example.org", "Acme", &skip, 4));
        // tokens of three characters or fewer never match
        assert!(!is_likely_company_website("https://bigco.net", "Big Co", &skip, 4));
        assert!(!is_likely_company_website("not a url", "Acme", &skip, 4));
    }

    #[tokio::test]
    async fn probe_stops_at_first_accepted_candidate() {
        let fetcher = Arc::new(
            MockFetcher::new()
                .with_response("https://acme.com", landing_page("Acme"))
                .with_response("https://www.acme.io", landing_page("Acme io")),
        );

        let candidate = scraper(fetcher.clone()).discover("Acme").await.unwrap();

        assert_eq!(candidate.url, "https://acme.com");
        assert_eq!(
            candidate.strategy,
            DiscoveryStrategy::PatternProbe {
                variant: "acme".to_string()
            }
        );
        assert_eq!(fetcher.urls(), vec!["https://www.acme.com", "https://acme.com"]);
        assert_eq!(fetcher.call_count("https://www.acme.io"), 0);
    }

    #[tokio::test]
    async fn probe_rejects_parked_small_and_non_200_pages() {
        let parked = FetchResponse::new(
            200,
            format!("<html><body>This is a Parked Domain {}</body></html>", "x".repeat(2000)),
        );
        let fetcher = Arc::new(
            MockFetcher::new()
                .with_response("https://www.acme.com", parked)
                .with_response("https://acme.com", FetchResponse::new(200, "x".repeat(1000)))
                .with_response("https://www.acme.io", FetchResponse::new(404, "x".repeat(5000)))
                .with_response("https://acme.io", landing_page("Acme")),
        );

        let candidate = scraper(fetcher.clone())
            .probe_domain_patterns("Acme")
            .await
            .unwrap();

        assert_eq!(candidate.url, "https://acme.io");
        assert_eq!(fetcher.calls().len(), 4);
    }

    #[tokio::test]
    async fn search_fallback_takes_first_plausible_link() {
        let name = "Acme Widgets";
        let fetcher = Arc::new(MockFetcher::new().with_response(
            search_url(name),
            search_page(&[
                "//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.linkedin.com%2Fcompany%2Facme-widgets",
                "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.org%2F",
                "//duckduckgo.com/l/?uddg=https%3A%2F%2Facme-widgets.com%2F&rut=abc",
                "//duckduckgo.com/l/?uddg=https%3A%2F%2Facmewidgets.io%2F",
            ]),
        ));

        let candidate = scraper(fetcher.clone()).discover(name).await.unwrap();

        assert_eq!(candidate.url, "https://acme-widgets.com/");
        assert_eq!(candidate.strategy, DiscoveryStrategy::WebSearch);
        // two name variants, ten patterns each, then one search
        assert_eq!(fetcher.calls().len(), 21);
    }

    #[tokio::test]
    async fn discover_miss_is_none() {
        let name = "Obscure Holdings";
        let fetcher = Arc::new(MockFetcher::new().with_response(
            search_url(name),
            search_page(&["//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.facebook.com%2Fobscure"]),
        ));

        assert_eq!(scraper(fetcher).discover(name).await, None);
    }
}
