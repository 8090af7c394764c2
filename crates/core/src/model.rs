use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::{config::ModelConfig, error::ModelError, types::Source};

#[derive(Clone, Debug)]
pub struct ModelRequest {
    pub prompt: String,
    pub temperature: f32,
    /// Let the model ground its answer with web search.
    pub web_search: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ModelResponse {
    pub text: String,
    pub sources: Vec<Source>,
}

/// A generative text model reachable over the network.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(
        &self,
        credential: &str,
        request: &ModelRequest,
    ) -> Result<ModelResponse, ModelError>;
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &ModelConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(request: &ModelRequest) -> Value {
        let mut body = serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": &request.prompt }],
                },
            ],
            "generationConfig": {
                "temperature": request.temperature,
            },
        });
        if request.web_search {
            body["tools"] = serde_json::json!([{ "google_search": {} }]);
        }
        body
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(
        &self,
        credential: &str,
        request: &ModelRequest,
    ) -> Result<ModelResponse, ModelError> {
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        debug!(
            model = %self.model,
            prompt_chars = request.prompt.chars().count(),
            web_search = request.web_search,
            "sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", credential)
            .json(&Self::request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload = response.json::<Value>().await?;
        Ok(parse_generate_response(&payload))
    }
}

/// Pull the text and grounding citations out of a `generateContent` payload.
///
/// Missing candidates produce an empty text; missing grounding metadata
/// produces an empty source list.
pub fn parse_generate_response(payload: &Value) -> ModelResponse {
    let candidate = &payload["candidates"][0];

    let text = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let sources = candidate["groundingMetadata"]["groundingChunks"]
        .as_array()
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| {
                    let web = chunk.get("web")?;
                    Some(Source {
                        uri: web["uri"].as_str()?.to_string(),
                        title: web["title"].as_str().unwrap_or_default().to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    ModelResponse { text, sources }
}

/// Run a model call under a deadline, mapping expiry to [`ModelError::Timeout`].
pub async fn generate_with_timeout(
    client: &dyn ModelClient,
    credential: &str,
    request: &ModelRequest,
    limit: Duration,
) -> Result<ModelResponse, ModelError> {
    tokio::time::timeout(limit, client.generate(credential, request))
        .await
        .map_err(|_| ModelError::Timeout(limit))?
}
