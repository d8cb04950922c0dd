use url::Url;

/// Base used to resolve the relative hrefs search result pages emit.
const SEARCH_HREF_BASE: &str = "https://duckduckgo.com/";

#[derive(Debug, PartialEq, Clone)]
pub enum HtmlTag {
    ATag(String),
}

/// Recovers the destination a search engine wraps behind its redirect link,
/// e.g. `//duckduckgo.com/l/?uddg=https%3A%2F%2Facme.com%2F&rut=..`.
pub fn extract_redirect_target(tag: &HtmlTag, param: &str) -> Option<String> {
    match tag {
        HtmlTag::ATag(href) => {
            if !href.contains(&format!("{}=", param)) {
                return None;
            }
            let base = Url::parse(SEARCH_HREF_BASE).ok()?;
            match base.join(href) {
                Ok(parsed_url) => parsed_url
                    .query_pairs()
                    .find(|(key, _)| key == param)
                    .map(|(_, value)| value.into_owned())
                    .filter(|target| !target.is_empty()),
                Err(_) => None,
            }
        }
    }
}

/// Lowercased host of `url`, ports excluded.
pub fn extract_domain(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed_url) => match parsed_url.host_str() {
            Some("") | None => None,
            Some(host) => Some(host.to_lowercase()),
        },
        Err(_) => None,
    }
}
