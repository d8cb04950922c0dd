use std::sync::Arc;

use async_openai::types::{
    ChatChoice, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use serde::Deserialize;

use crate::{
    configuration::Settings,
    domain::{truncate_chars, AnalysisResult},
};

use super::{parse_llm_response, render_prompt, Fetcher, ProviderError};

/// Client for an OpenAI compatible chat completions endpoint (Groq).
pub struct OpenaiClient {
    fetcher: Arc<dyn Fetcher>,
    settings: Arc<Settings>,
}

/// Only `choices` is read, so OpenAI compatible servers that omit `id`,
/// `created` or `usage` still parse.
#[derive(Deserialize)]
struct ChatCompletionEnvelope {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

impl OpenaiClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: Arc<Settings>) -> Self {
        OpenaiClient { fetcher, settings }
    }

    pub async fn analyze_company(
        &self,
        company_name: &str,
        website_content: &str,
    ) -> Result<AnalysisResult, ProviderError> {
        let api_key = self
            .settings
            .api_keys
            .groq()
            .ok_or(ProviderError::MissingApiKey("groq"))?;
        log::info!("Analyzing {} with Groq AI...", company_name);

        let body = self.build_request_body(company_name, website_content)?;
        let headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", api_key),
        )];

        let groq = &self.settings.groq;
        let res = self
            .fetcher
            .post_json(&groq.url, &headers, body, groq.timeout())
            .await?
            .ensure_success()?;
        log::info!("Groq API response received for {}", company_name);

        let content = first_choice_content(&res.body)?;
        log::debug!("Raw Groq response: {}", truncate_chars(&content, 200));

        Ok(parse_llm_response(&content))
    }

    fn build_request_body(
        &self,
        company_name: &str,
        website_content: &str,
    ) -> Result<String, ProviderError> {
        let groq = &self.settings.groq;
        let prompt = render_prompt(
            &self.settings.prompts.groq_template,
            company_name,
            &truncate_chars(website_content, groq.content_limit),
        );

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.settings.prompts.groq_system.as_str())
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(groq.model.as_str())
            .messages(messages)
            .temperature(groq.temperature)
            .max_tokens(groq.max_tokens)
            .top_p(groq.top_p)
            .stream(false)
            .build()?;

        serde_json::to_string(&request).map_err(|e| ProviderError::Request(e.to_string()))
    }
}

fn first_choice_content(body: &[u8]) -> Result<String, ProviderError> {
    let envelope: ChatCompletionEnvelope =
        serde_json::from_slice(body).map_err(|e| ProviderError::Envelope(e.to_string()))?;

    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(ProviderError::NoContent)
}
