//! Test doubles for exercising the enrichment pipeline without network access.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::configuration::Settings;
use crate::services::{FetchError, FetchResponse, Fetcher};

#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    Get,
    Post,
}

/// Record of a call made to the mock fetcher.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

/// Fetcher returning scripted outcomes keyed by exact url. Unscripted urls
/// fail with a network error, the way an unregistered domain would.
#[derive(Default)]
pub struct MockFetcher {
    routes: HashMap<String, Result<FetchResponse, FetchError>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: impl Into<String>, response: FetchResponse) -> Self {
        self.routes.insert(url.into(), Ok(response));
        self
    }

    pub fn with_error(mut self, url: impl Into<String>, error: FetchError) -> Self {
        self.routes.insert(url.into(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.url == url).count()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.url).collect()
    }

    fn respond(&self, call: MockCall) -> Result<FetchResponse, FetchError> {
        let outcome = self
            .routes
            .get(&call.url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Network(format!("no route for {}", call.url))));
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        outcome
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<FetchResponse, FetchError> {
        self.respond(MockCall {
            method: Method::Get,
            url: url.to_string(),
            headers: vec![],
            body: None,
        })
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: String,
        _timeout: Duration,
    ) -> Result<FetchResponse, FetchError> {
        self.respond(MockCall {
            method: Method::Post,
            url: url.to_string(),
            headers: headers.to_vec(),
            body: serde_json::from_str(&body).ok(),
        })
    }
}

pub const GROQ_TEST_KEY: &str = "gsk_test";
pub const GEMINI_TEST_KEY: &str = "gemini_test";

/// Production settings with test api keys and no pacing delay.
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.api_keys.groq = Some(GROQ_TEST_KEY.to_string());
    settings.api_keys.gemini = Some(GEMINI_TEST_KEY.to_string());
    settings.scraping.request_delay_ms = 0;
    settings
}

pub fn gemini_url(settings: &Settings) -> String {
    format!("{}?key={}", settings.gemini.url, GEMINI_TEST_KEY)
}

/// A page big enough to pass the probe size check.
pub fn landing_page(text: &str) -> FetchResponse {
    let filler = "<div class=\"spacer\"></div>".repeat(60);
    FetchResponse::new(
        200,
        format!(
            "<html><head><title>Home</title></head><body><main><p>{}</p></main>{}</body></html>",
            text, filler
        ),
    )
}

pub fn groq_reply(content: &str) -> FetchResponse {
    let body = serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    });
    FetchResponse::new(200, body.to_string())
}

pub fn gemini_reply(text: &str) -> FetchResponse {
    let body = serde_json::json!({
        "candidates": [{"parts": [{"text": text}]}]
    });
    FetchResponse::new(200, body.to_string())
}
