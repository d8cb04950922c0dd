use std::sync::Arc;

use itertools::Itertools;
use scraper::{Html, Selector};

use crate::{
    configuration::{ScrapingSettings, Settings},
    domain::truncate_chars,
};

use super::{FetchError, Fetcher};

pub struct ContentExtractor {
    fetcher: Arc<dyn Fetcher>,
    settings: Arc<Settings>,
}

impl ContentExtractor {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: Arc<Settings>) -> Self {
        ContentExtractor { fetcher, settings }
    }

    /// Salient page text, or an empty string when the page could not be
    /// fetched or nothing on it was long enough to keep.
    pub async fn extract(&self, url: &str) -> String {
        log::info!("Scraping content from: {}", url);

        match self.fetch_page(url).await {
            Ok(html) => {
                let content = extract_text(&html, &self.settings.scraping);
                log::info!("Scraped {} characters of content", content.chars().count());
                content
            }
            Err(e) => {
                log::error!("Error scraping {}: {}", url, e);
                String::new()
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let res = self
            .fetcher
            .get(url, self.settings.scraping.request_timeout())
            .await?
            .ensure_success()?;

        Ok(res.text())
    }
}

pub fn extract_text(html: &str, scraping: &ScrapingSettings) -> String {
    let mut document = Html::parse_document(html);
    remove_elements(&mut document, &scraping.remove_elements);

    // Html::select also visits detached nodes, so walk from the root instead
    let root = document.root_element();

    let mut content_areas: Vec<String> = vec![];
    for selector in scraping.content_selectors.iter() {
        let Ok(parsed) = Selector::parse(selector) else {
            log::debug!("Skipping invalid content selector: {}", selector);
            continue;
        };

        for element in root.select(&parsed) {
            let text = element
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .join(" ");
            if text.chars().count() > scraping.min_content_length {
                content_areas.push(text);
            }
        }
    }

    let full_text = content_areas.iter().flat_map(|t| t.split_whitespace()).join(" ");

    truncate_chars(&full_text, scraping.max_content_length)
}

fn remove_elements(document: &mut Html, elements: &[String]) {
    let root = document.root_element();
    let node_ids: Vec<_> = elements
        .iter()
        .filter_map(|e| Selector::parse(e).ok())
        .flat_map(|selector| {
            root.select(&selector)
                .map(|element| element.id())
                .collect::<Vec<_>>()
        })
        .collect();

    for node_id in node_ids {
        if let Some(mut node) = document.tree.get_mut(node_id) {
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FetchResponse;
    use crate::testing::{test_settings, MockFetcher};

    const LONG_ABOUT: &str =
        "Acme builds widgets for factories and has done so for more than forty years.";

    fn paragraph_only() -> ScrapingSettings {
        ScrapingSettings {
            content_selectors: vec!["p".to_string()],
            ..ScrapingSettings::default()
        }
    }

    #[test]
    fn boilerplate_is_removed_before_selection() {
        let html = format!(
            r#"<html><body>
                <nav><p>Navigation menu with enough words to pass the length threshold easily.</p></nav>
                <script>var tracking = "a script that is long enough to be collected if left";</script>
                <p>{}</p>
                <footer><p>Footer copyright notice long enough to pass the length threshold too.</p></footer>
            </body></html>"#,
            LONG_ABOUT
        );

        assert_eq!(extract_text(&html, &paragraph_only()), LONG_ABOUT);
    }

    #[test]
    fn boilerplate_is_removed_with_default_selectors() {
        let html = format!(
            r#"<html><body>
                <header><h1>Acme Holdings, the home of industrial widgets since 1948</h1></header>
                <footer><p>Copyright 2024 Acme Holdings, all rights reserved worldwide.</p></footer>
                <aside><section>Related reading about widgets and factories you may enjoy.</section></aside>
                <main>{}</main>
            </body></html>"#,
            LONG_ABOUT
        );

        assert_eq!(extract_text(&html, &ScrapingSettings::default()), LONG_ABOUT);
    }

    #[test]
    fn page_with_only_boilerplate_is_empty() {
        let html = "<html><body><footer><p>Copyright 2024 Acme Holdings, all rights reserved worldwide.</p></footer></body></html>";

        assert_eq!(extract_text(html, &ScrapingSettings::default()), "");
    }

    #[test]
    fn threshold_counts_the_space_between_text_nodes() {
        let settings = paragraph_only();
        let split = format!("<p>{}<b>{}</b></p>", "x".repeat(25), "y".repeat(25));
        let exact = format!("<p>{}</p>", "z".repeat(50));

        // 25 + 1 + 25 chars passes, a bare 50 does not
        assert_eq!(
            extract_text(&split, &settings),
            format!("{} {}", "x".repeat(25), "y".repeat(25))
        );
        assert_eq!(extract_text(&exact, &settings), "");
    }

    #[test]
    fn short_regions_are_skipped() {
        let html = "<html><body><p>Too short.</p><h1>Welcome</h1></body></html>";

        assert_eq!(extract_text(html, &ScrapingSettings::default()), "");
    }

    #[test]
    fn regions_in_selector_priority_order() {
        let html = format!(
            r#"<html><body>
                <p>{}</p>
                <div class="hero">   Industrial   widgets,
                    engineered for the toughest factory floors.  </div>
            </body></html>"#,
            LONG_ABOUT
        );
        let settings = ScrapingSettings {
            content_selectors: vec![".hero".to_string(), "p".to_string()],
            ..ScrapingSettings::default()
        };

        assert_eq!(
            extract_text(&html, &settings),
            format!(
                "Industrial widgets, engineered for the toughest factory floors. {}",
                LONG_ABOUT
            )
        );
    }

    #[test]
    fn invalid_selector_does_not_abort() {
        let html = format!("<html><body><p>{}</p></body></html>", LONG_ABOUT);
        let settings = ScrapingSettings {
            content_selectors: vec!["[[broken".to_string(), "p".to_string()],
            ..ScrapingSettings::default()
        };

        assert_eq!(extract_text(&html, &settings), LONG_ABOUT);
    }

    #[test]
    fn content_truncated_to_4000_chars() {
        let paragraphs = format!("<p>{}</p>", LONG_ABOUT).repeat(100);
        let html = format!("<html><body>{}</body></html>", paragraphs);

        let text = extract_text(&html, &paragraph_only());

        assert_eq!(text.chars().count(), 4000);
    }

    #[tokio::test]
    async fn failed_fetch_yields_empty_text() {
        let fetcher = Arc::new(
            MockFetcher::new()
                .with_response("https://down.example", FetchResponse::new(500, "<p>error</p>")),
        );
        let extractor = ContentExtractor::new(fetcher.clone(), Arc::new(test_settings()));

        assert_eq!(extractor.extract("https://down.example").await, "");
        assert_eq!(extractor.extract("https://unreachable.example").await, "");
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn extract_fetches_and_cleans_page() {
        let html = format!("<html><body><article><p>{}</p></article></body></html>", LONG_ABOUT);
        let fetcher =
            Arc::new(MockFetcher::new().with_response("https://acme.com", FetchResponse::new(200, html)));
        let extractor = ContentExtractor::new(fetcher, Arc::new(test_settings()));

        // the article and its paragraph both match a selector
        assert_eq!(
            extractor.extract("https://acme.com").await,
            format!("{} {}", LONG_ABOUT, LONG_ABOUT)
        );
    }
}
