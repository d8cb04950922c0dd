use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use thiserror::Error;

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected status code {0}")]
    Status(u16),
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.is_timeout() {
            true => FetchError::Timeout,
            false => match e.is_builder() {
                true => FetchError::InvalidUrl(e.to_string()),
                false => FetchError::Network(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        FetchResponse {
            status,
            body: body.into(),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn ensure_success(self) -> Result<Self, FetchError> {
        match self.is_success() {
            true => Ok(self),
            false => Err(FetchError::Status(self.status)),
        }
    }
}

/// Single-shot HTTP access. Implementations never retry; a non 2xx status is
/// still an `Ok` response so callers can decide what it means for them.
/// `post_json` takes an already serialized JSON document.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError>;

    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: String,
        timeout: Duration,
    ) -> Result<FetchResponse, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchResponse, FetchError> {
        let res = self.client.get(url).timeout(timeout).send().await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?;

        Ok(FetchResponse::new(status, body.to_vec()))
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: String,
        timeout: Duration,
    ) -> Result<FetchResponse, FetchError> {
        let mut req = self
            .client
            .post(url)
            .timeout(timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        for (name, value) in headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let res = req.send().await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?;

        Ok(FetchResponse::new(status, body.to_vec()))
    }
}
