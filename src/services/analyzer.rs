use std::sync::Arc;

use async_openai::error::OpenAIError;
use thiserror::Error;

use crate::{configuration::Settings, domain::AnalysisResult};

use super::{FetchError, Fetcher, GeminiClient, OpenaiClient};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("No api key configured for {0}")]
    MissingApiKey(&'static str),
    #[error(transparent)]
    Transport(#[from] FetchError),
    #[error("Could not build request: {0}")]
    Request(String),
    #[error("Unexpected response body: {0}")]
    Envelope(String),
    #[error("Response contained no text")]
    NoContent,
}

impl From<OpenAIError> for ProviderError {
    fn from(e: OpenAIError) -> Self {
        ProviderError::Request(e.to_string())
    }
}

pub fn render_prompt(template: &str, company_name: &str, website_content: &str) -> String {
    template
        .replace("{company_name}", company_name)
        .replace("{website_content}", website_content)
}

/// Runs the primary provider and falls back to the secondary one whenever
/// the primary produced no summary. Provider failures never escape; they
/// surface as an empty [`AnalysisResult`].
pub struct LlmAnalyzer {
    primary: OpenaiClient,
    secondary: GeminiClient,
}

impl LlmAnalyzer {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: Arc<Settings>) -> Self {
        LlmAnalyzer {
            primary: OpenaiClient::new(fetcher.clone(), settings.clone()),
            secondary: GeminiClient::new(fetcher, settings),
        }
    }

    pub async fn analyze(&self, company_name: &str, website_content: &str) -> AnalysisResult {
        let analysis = self.analyze_primary(company_name, website_content).await;
        if !analysis.is_empty() {
            return analysis;
        }

        log::info!("Groq analysis failed for {}, trying Gemini...", company_name);
        self.analyze_secondary(company_name, website_content).await
    }

    pub async fn analyze_primary(&self, company_name: &str, website_content: &str) -> AnalysisResult {
        let result = self
            .primary
            .analyze_company(company_name, website_content)
            .await;
        settle(result, "Groq", company_name)
    }

    pub async fn analyze_secondary(
        &self,
        company_name: &str,
        website_content: &str,
    ) -> AnalysisResult {
        let result = self
            .secondary
            .analyze_company(company_name, website_content)
            .await;
        settle(result, "Gemini", company_name)
    }
}

fn settle(
    result: Result<AnalysisResult, ProviderError>,
    provider: &str,
    company_name: &str,
) -> AnalysisResult {
    match result {
        Ok(analysis) => analysis,
        Err(ProviderError::MissingApiKey(_)) => {
            log::warn!("No valid {} API key, skipping {}", provider, company_name);
            AnalysisResult::default()
        }
        Err(e) => {
            log::error!("{} API error for {}: {}", provider, company_name, e);
            AnalysisResult::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FetchResponse;
    use crate::testing::{gemini_reply, gemini_url, groq_reply, test_settings, MockFetcher};

    const VALID_JSON: &str =
        r#"{"summary":"Acme builds widgets.","industry":"Manufacturing","automation_pitch":"Automate QA."}"#;

    #[test]
    fn render_prompt_fills_placeholders() {
        assert_eq!(
            render_prompt("{company_name}: {website_content} ({company_name})", "Acme", "text"),
            "Acme: text (Acme)"
        );
    }

    #[tokio::test]
    async fn primary_success_skips_secondary() {
        let settings = test_settings();
        let gemini = gemini_url(&settings);
        let fetcher = Arc::new(
            MockFetcher::new()
                .with_response(settings.groq.url.clone(), groq_reply(VALID_JSON))
                .with_response(gemini.clone(), gemini_reply(VALID_JSON)),
        );
        let analyzer = LlmAnalyzer::new(fetcher.clone(), Arc::new(settings));

        let result = analyzer.analyze("Acme", "content").await;

        assert_eq!(result.industry, "Manufacturing");
        assert_eq!(fetcher.call_count(&gemini), 0);
    }

    #[tokio::test]
    async fn empty_primary_summary_falls_back_once() {
        let settings = test_settings();
        let groq = settings.groq.url.clone();
        let gemini = gemini_url(&settings);
        let fetcher = Arc::new(
            MockFetcher::new()
                .with_response(groq.clone(), groq_reply(r#"{"summary":"","industry":"Tech"}"#))
                .with_response(gemini.clone(), gemini_reply(VALID_JSON)),
        );
        let analyzer = LlmAnalyzer::new(fetcher.clone(), Arc::new(settings));

        let result = analyzer.analyze("Acme", "scraped text").await;

        assert_eq!(result.summary, "Acme builds widgets.");
        assert_eq!(fetcher.call_count(&groq), 1);
        assert_eq!(fetcher.call_count(&gemini), 1);

        let prompt = fetcher.calls()[1].body.clone().unwrap()["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(prompt.contains("Company Name: Acme"));
        assert!(prompt.contains("Website Content: scraped text"));
    }

    #[tokio::test]
    async fn both_providers_failing_is_empty_not_error() {
        let settings = test_settings();
        let fetcher = Arc::new(
            MockFetcher::new()
                .with_response(settings.groq.url.clone(), FetchResponse::new(503, ""))
                .with_response(gemini_url(&settings), FetchResponse::new(200, "not json")),
        );
        let analyzer = LlmAnalyzer::new(fetcher.clone(), Arc::new(settings));

        assert_eq!(analyzer.analyze("Acme", "content").await, AnalysisResult::default());
        assert_eq!(fetcher.calls().len(), 2);
    }
}
