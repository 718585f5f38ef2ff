//! Google Gemini `generateContent` backend.

use crate::{api_error, http_client, Error, Provider, Request, Response, Role, Usage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini API client.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl Gemini {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Create a client from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| Error::NoApiKey)?;
        Ok(Self::new(api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_api_request(&self, request: &Request) -> ApiRequest {
        let contents = request
            .messages
            .iter()
            .map(|m| ApiContent {
                role: Some(
                    match m.role {
                        Role::User => "user",
                        Role::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![ApiPart { text: m.text.clone() }],
            })
            .collect();

        ApiRequest {
            system_instruction: request.system.as_ref().map(|s| ApiContent {
                role: None,
                parts: vec![ApiPart { text: s.clone() }],
            }),
            contents,
            generation_config: ApiGenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        }
    }
}

#[async_trait]
impl Provider for Gemini {
    async fn complete(&self, request: Request) -> Result<Response, Error> {
        if self.api_key.is_empty() {
            return Err(Error::NoApiKey);
        }
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let api_request = self.build_api_request(&request);

        tracing::debug!(%model, contents = api_request.contents.len(), "gemini request");

        let response = self
            .client
            .post(format!("{}/models/{model}:generateContent", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        parse_response(model, api_response)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn parse_response(model: String, api_response: ApiResponse) -> Result<Response, Error> {
    let candidate = api_response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::Parse("No candidates in response".to_string()))?;

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(Error::Parse(format!("Candidate has no text (finish reason: {reason})")));
    }

    Ok(Response {
        model,
        text,
        usage: api_response.usage_metadata.map(|u| Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        }),
    })
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiContent>,
    contents: Vec<ApiContent>,
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct ApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize)]
struct ApiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiCandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidateContent {
    #[serde(default)]
    parts: Vec<ApiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;

    #[test]
    fn test_assistant_maps_to_model_role() {
        let client = Gemini::new("test-key");
        let request = Request::new(vec![Message::user("hi"), Message::assistant("hello")])
            .with_system("be brief")
            .with_max_tokens(64);

        let json = serde_json::to_value(client.build_api_request(&request)).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 64);
    }

    #[test]
    fn test_parse_response_joins_parts() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Long ago, "}, {"text": "a lamp."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 9, "candidatesTokenCount": 4}
        }"#;
        let api: ApiResponse = serde_json::from_str(body).unwrap();
        let response = parse_response(DEFAULT_MODEL.to_string(), api).unwrap();
        assert_eq!(response.text, "Long ago, a lamp.");
        assert_eq!(response.usage.map(|u| u.input_tokens), Some(9));
    }

    #[test]
    fn test_parse_blocked_candidate() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let api: ApiResponse = serde_json::from_str(body).unwrap();
        let err = parse_response(DEFAULT_MODEL.to_string(), api).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_empty_key_rejected_before_network() {
        let client = Gemini::new("");
        let result = client.complete(Request::new(vec![Message::user("hi")])).await;
        assert!(matches!(result, Err(Error::NoApiKey)));
    }
}
