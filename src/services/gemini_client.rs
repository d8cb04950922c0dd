use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::{
    configuration::Settings,
    domain::{truncate_chars, AnalysisResult},
};

use super::{parse_llm_response, render_prompt, Fetcher, ProviderError};

pub struct GeminiClient {
    fetcher: Arc<dyn Fetcher>,
    settings: Arc<Settings>,
}

#[derive(Deserialize)]
struct GenerateContentEnvelope {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Text lives under `parts` directly, or under `content.parts` as the live
/// API returns it.
#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    parts: Vec<Part>,
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: Arc<Settings>) -> Self {
        GeminiClient { fetcher, settings }
    }

    pub async fn analyze_company(
        &self,
        company_name: &str,
        website_content: &str,
    ) -> Result<AnalysisResult, ProviderError> {
        let api_key = self
            .settings
            .api_keys
            .gemini()
            .ok_or(ProviderError::MissingApiKey("gemini"))?;
        log::info!("Analyzing {} with Gemini AI (fallback)...", company_name);

        let gemini = &self.settings.gemini;
        let url = Url::parse_with_params(&gemini.url, &[("key", api_key)])
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let prompt = render_prompt(
            &self.settings.prompts.gemini_template,
            company_name,
            &truncate_chars(website_content, gemini.content_limit),
        );
        let body = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "temperature": gemini.temperature,
                "maxOutputTokens": gemini.max_output_tokens
            }
        });

        let res = self
            .fetcher
            .post_json(url.as_str(), &[], body.to_string(), gemini.timeout())
            .await?
            .ensure_success()?;

        let text = first_candidate_text(&res.body)?;
        Ok(parse_llm_response(&text))
    }
}

fn first_candidate_text(body: &[u8]) -> Result<String, ProviderError> {
    let envelope: GenerateContentEnvelope =
        serde_json::from_slice(body).map_err(|e| ProviderError::Envelope(e.to_string()))?;

    let candidate = envelope
        .candidates
        .into_iter()
        .next()
        .ok_or(ProviderError::NoContent)?;

    let parts = match candidate.parts.is_empty() {
        true => candidate.content.map(|c| c.parts).unwrap_or_default(),
        false => candidate.parts,
    };

    parts
        .into_iter()
        .next()
        .and_then(|part| part.text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(ProviderError::NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FetchResponse;
    use crate::testing::{gemini_reply, gemini_url, test_settings, MockFetcher};

    #[tokio::test]
    async fn request_shape_and_key_param() {
        let settings = test_settings();
        let url = gemini_url(&settings);
        let fetcher = Arc::new(MockFetcher::new().with_response(
            url.clone(),
            gemini_reply("Summary: Acme makes widgets\nIndustry: Manufacturing"),
        ));
        let content = "y".repeat(2500);

        let result = GeminiClient::new(fetcher.clone(), Arc::new(settings))
            .analyze_company("Acme", &content)
            .await
            .unwrap();

        assert_eq!(result.summary, "Acme makes widgets");
        assert_eq!(result.industry, "Manufacturing");

        let calls = fetcher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, url);
        assert!(calls[0].headers.is_empty());

        let body = calls[0].body.clone().unwrap();
        assert_eq!(body["generationConfig"]["temperature"], 0.3);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Company Name: Acme"));
        assert!(prompt.contains(&"y".repeat(2000)));
        assert!(!prompt.contains(&"y".repeat(2001)));
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let settings = test_settings();
        let fetcher = Arc::new(
            MockFetcher::new().with_response(gemini_url(&settings), FetchResponse::new(500, "")),
        );

        let result = GeminiClient::new(fetcher, Arc::new(settings))
            .analyze_company("Acme", "content")
            .await;

        assert!(result.is_err());
    }

    #[test]
    fn candidate_text_from_either_shape() {
        let flat = br#"{"candidates":[{"parts":[{"text":" flat "}]}]}"#;
        let nested = br#"{"candidates":[{"content":{"parts":[{"text":"nested"}],"role":"model"}}]}"#;

        assert_eq!(first_candidate_text(flat).unwrap(), "flat");
        assert_eq!(first_candidate_text(nested).unwrap(), "nested");
        assert!(matches!(
            first_candidate_text(br#"{"candidates":[]}"#),
            Err(ProviderError::NoContent)
        ));
        assert!(matches!(
            first_candidate_text(br#"{"promptFeedback":{"blockReason":"SAFETY"}}"#),
            Err(ProviderError::NoContent)
        ));
    }
}
