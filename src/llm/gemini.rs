use crate::error::AskError;
use crate::llm::{interpret_reply, prompt, Generation, SqlGenerator};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini `generateContent` client.
pub struct GeminiClient {
    api_base: String,
    api_key: SecretString,
    model: String,
    max_output_tokens: u32,
    client: Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(
        api_base: String,
        api_key: SecretString,
        model: String,
        max_output_tokens: u32,
    ) -> Self {
        let client = Client::new();
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
            max_output_tokens,
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn map_http_error(status: u16, body: &str) -> AskError {
        let snippet: String = body.chars().take(200).collect();
        match status {
            401 | 403 => AskError::Llm {
                message: "invalid API key or insufficient permissions".to_string(),
            },
            404 => AskError::Config {
                message: "model not found".to_string(),
            },
            429 => AskError::Llm {
                message: "rate limited by the model provider".to_string(),
            },
            _ => AskError::Llm {
                message: format!("HTTP error {}: {}", status, snippet),
            },
        }
    }
}

impl SqlGenerator for GeminiClient {
    async fn generate(&self, question: &str, schema: &str) -> Result<Generation, AskError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![RequestPart {
                    text: prompt::build_prompt(question, schema),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: 0.0,
            },
        };

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| AskError::Llm {
                message: format!("request failed: {}", e),
            })?;

        let status_code = resp.status();
        let body = resp.text().await.map_err(|e| AskError::Llm {
            message: format!("failed to read response: {}", e),
        })?;

        if !status_code.is_success() {
            return Err(Self::map_http_error(status_code.as_u16(), &body));
        }

        parse_generate_response(&body)
    }
}

/// Interpret a `generateContent` response body.
///
/// No candidates means the model declined, which is treated like the sentinel.
pub fn parse_generate_response(body: &str) -> Result<Generation, AskError> {
    let response: GenerateResponse = serde_json::from_str(body).map_err(|e| AskError::Llm {
        message: format!("failed to parse response: {}", e),
    })?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Ok(Generation::Unanswerable);
    };

    let text = candidate
        .content
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .ok_or_else(|| AskError::Llm {
            message: "candidate contained no text".to_string(),
        })?;

    Ok(interpret_reply(&text))
}
