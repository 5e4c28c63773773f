use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{GenerationError, TextGenerator};
use crate::config::GeminiConfig;

// A wrapper for the Gemini generateContent REST API
pub struct GeminiModel {
    config: GeminiConfig,
    client: Client,
}

impl GeminiModel {
    pub fn new(config: GeminiConfig) -> anyhow::Result<Self> {
        info!(
            "Initializing Gemini client for model {} at {}",
            config.model, config.api_base
        );

        Ok(Self {
            config,
            client: Client::builder().build()?,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body(&self, segments: &[String]) -> GenerateContentRequest {
        let sampling = GenerationConfig {
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };
        let generation_config = if sampling.temperature.is_some() || sampling.top_p.is_some() {
            Some(sampling)
        } else {
            None
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: segments
                    .iter()
                    .map(|text| Part { text: Some(text.clone()) })
                    .collect(),
            }],
            generation_config,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiModel {
    async fn generate(&self, segments: &[String]) -> Result<String, GenerationError> {
        let payload = self.request_body(segments);
        debug!("Sending {} segment(s) to {}", segments.len(), self.config.model);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let text = extract_text(parse_response(&body)?)?;
        info!("Response length: {} characters", text.len());
        Ok(text)
    }
}

fn parse_response(body: &str) -> Result<GenerateContentResponse, GenerationError> {
    serde_json::from_str(body).map_err(|e| GenerationError::MalformedResponse(e.to_string()))
}

fn extract_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GenerationError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return match candidate.finish_reason.as_deref() {
            Some("SAFETY") | Some("PROHIBITED_CONTENT") => {
                Err(GenerationError::ContentFiltered)
            }
            _ => Err(GenerationError::EmptyResponse),
        };
    }

    Ok(text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}
