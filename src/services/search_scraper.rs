use std::time::Duration;

use scraper::{Html, Selector};
use url::Url;

use crate::{configuration::DiscoverySettings, domain::html_tag::HtmlTag};

use super::Fetcher;

pub enum SearchResult {
    NotFound,
    Links(Vec<HtmlTag>),
    Failed,
}

pub fn build_search_query(company_name: &str, suffix: &str) -> String {
    format!("{} {}", company_name.trim(), suffix).trim().to_string()
}

pub fn build_search_url(search_url: &str, query: &str) -> Option<String> {
    Url::parse_with_params(search_url, &[("q", query)])
        .map(|u| u.to_string())
        .ok()
}

pub async fn extract_links_from_search(
    fetcher: &dyn Fetcher,
    settings: &DiscoverySettings,
    company_name: &str,
    timeout: Duration,
) -> SearchResult {
    let query = build_search_query(company_name, &settings.search_query_suffix);
    let Some(url) = build_search_url(&settings.search_url, &query) else {
        log::error!("Invalid search url configured: {}", settings.search_url);
        return SearchResult::Failed;
    };

    match fetcher.get(&url, timeout).await {
        Ok(res) if res.status == 200 => {
            let links = extract_anchor_tags(&res.text());
            log::info!("Found {} links on search page for: {}", links.len(), query);

            match links.is_empty() {
                true => SearchResult::NotFound,
                false => SearchResult::Links(links),
            }
        }
        Ok(res) => {
            log::error!("Search page returned status {} for: {}", res.status, query);
            SearchResult::Failed
        }
        Err(e) => {
            log::error!("Web search failed for {}: {}", company_name, e);
            SearchResult::Failed
        }
    }
}

fn extract_anchor_tags(html_content: &str) -> Vec<HtmlTag> {
    let Ok(a_tag_selector) = Selector::parse("a[href]") else {
        return vec![];
    };
    let html_document = Html::parse_document(html_content);

    html_document
        .select(&a_tag_selector)
        .filter_map(|tag| tag.value().attr("href").map(|url| url.to_string()))
        .map(HtmlTag::ATag)
        .collect()
}
