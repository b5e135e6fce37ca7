/// HTTP text generation provider
///
/// Posts `{"prompt": ...}` to the configured endpoint and expects
/// `{"text": ...}` back. Authentication is a bearer key when one is set.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    services::providers::TextGenerator,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    text: String,
}

#[derive(Clone)]
pub struct HttpTextGenerator {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
}

impl HttpTextGenerator {
    pub fn new(api_url: String, api_key: Option<String>) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_url,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let mut request = self
            .http_client
            .post(&self.api_url)
            .json(&GenerateRequest { prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Text generation request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Text API returned status {}: {}",
                status, body
            )));
        }

        let body: GenerateResponse = response.json().await?;
        tracing::debug!(chars = body.text.len(), "Received generated text");

        Ok(body.text)
    }

    fn name(&self) -> &'static str {
        "http-text"
    }
}
