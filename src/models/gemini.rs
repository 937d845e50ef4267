//! Google Gemini `generateContent` provider.

use async_trait::async_trait;
use anyhow::Context;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{GenerateResponse, ModelProvider};

/// Default base URL of the Generative Language API.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model requested when the config does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Generation method a model must support to be usable here.
pub const GENERATE_METHOD: &str = "generateContent";

/// One entry of the `models.list` reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-2.5-flash`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_METHOD)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Provider that talks to the Gemini REST API.
pub struct GeminiProvider {
    api_key: String,
    endpoint: String,
    client: Client,
    /// Model name placed in the request path (e.g. "gemini-2.5-flash").
    model: String,
}

impl GeminiProvider {
    /// Create a provider with explicit configuration.
    ///
    /// Fails only if the underlying HTTP client cannot be built (e.g. the
    /// TLS backend fails to initialise).
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build Gemini HTTP client")?;
        Ok(Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            client,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full `generateContent` URL for the configured model.
    pub fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    /// List every model that supports `generateContent`, following
    /// pagination to the end.
    pub async fn list_models(&self) -> anyhow::Result<Vec<ModelInfo>> {
        let url = format!("{}/v1beta/models", self.endpoint.trim_end_matches('/'));
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self.client.get(&url).header("x-goog-api-key", &self.api_key);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token)]);
            }
            let resp = req.send().await?;

            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                anyhow::bail!("Gemini API returned {status}: {text}");
            }

            let page: ModelList = resp
                .json()
                .await
                .context("malformed model list from Gemini endpoint")?;
            models.extend(
                page.models
                    .into_iter()
                    .filter(ModelInfo::supports_generate_content),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(models)
    }

    /// JSON body carrying `prompt` as a single user turn.
    pub fn request_body(prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        })
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_content(&self, prompt: &str) -> Result<GenerateResponse, anyhow::Error> {
        let resp = self
            .client
            .post(self.request_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(prompt))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API returned {status}: {text}");
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .context("malformed response from Gemini endpoint")?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_endpoint_and_model() {
        let p = GeminiProvider::new("key", "http://localhost:1234/", "gemini-2.5-flash").unwrap();
        assert_eq!(
            p.request_url(),
            "http://localhost:1234/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(p.model(), "gemini-2.5-flash");
    }

    #[test]
    fn body_wraps_prompt_as_single_user_part() {
        let body = GeminiProvider::request_body("user: A\n\nUser: B\nAssistant:");
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "user: A\n\nUser: B\nAssistant:");
    }
}
