use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::backend::{BackendError, EmbeddingModel, GenerativeModel};
use crate::config::GeminiConfig;

/// Blocking client for the Gemini `generateContent` and `embedContent` endpoints.
pub struct GeminiClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    model: String,
    embedding_model: String,
}

impl GeminiClient {
    pub fn from_config(config: &GeminiConfig) -> Result<Self, BackendError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(BackendError::MissingCredentials)?;
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout())
            .user_agent(concat!("retention-agent/", env!("CARGO_PKG_VERSION")))
            .build();

        Ok(Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.base_url,
            model.trim_start_matches("models/"),
            method
        )
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: Value,
    ) -> Result<T, BackendError> {
        let response = self
            .agent
            .post(endpoint)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .set("x-goog-api-key", &self.api_key)
            .send_json(payload)
            .map_err(backend_error_from_ureq)?;

        response
            .into_json::<T>()
            .map_err(|err| BackendError::MalformedResponse(err.to_string()))
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .finish_non_exhaustive()
    }
}

impl GenerativeModel for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let payload = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.0 },
        });
        let endpoint = self.endpoint(&self.model, "generateContent");
        let response: GenerateContentResponse = self.post_json(&endpoint, payload)?;
        response.into_text()
    }
}

impl EmbeddingModel for GeminiClient {
    fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let model = format!(
            "models/{}",
            self.embedding_model.trim_start_matches("models/")
        );
        let payload = json!({
            "model": model,
            "content": { "parts": [{ "text": text }] },
        });
        let endpoint = self.endpoint(&self.embedding_model, "embedContent");
        let response: EmbedContentResponse = self.post_json(&endpoint, payload)?;
        response.into_values()
    }
}

fn backend_error_from_ureq(err: ureq::Error) -> BackendError {
    match err {
        ureq::Error::Status(429, response) => {
            BackendError::Quota(response.into_string().unwrap_or_default())
        }
        ureq::Error::Status(status, response) => BackendError::Status {
            status,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => BackendError::Transport(transport.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, BackendError> {
        let content = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .ok_or_else(|| BackendError::MalformedResponse("no candidates returned".into()))?;

        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.is_empty() {
            return Err(BackendError::MalformedResponse(
                "candidate carried no text parts".into(),
            ));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    #[serde(default)]
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

impl EmbedContentResponse {
    fn into_values(self) -> Result<Vec<f32>, BackendError> {
        match self.embedding {
            Some(embedding) if !embedding.values.is_empty() => Ok(embedding.values),
            _ => Err(BackendError::MalformedResponse(
                "embedding values missing".into(),
            )),
        }
    }
}
