//! AI metadata generation.
//!
//! Calls an external Gemini inference endpoint to produce a short bookmark
//! description plus suggested tags. The call fails closed when no API key is
//! configured. The model reply is free text; the expected JSON object is
//! recovered from a markdown code fence when present.

use serde_json::{json, Value};

use crate::types::errors::AiError;
use crate::types::metadata::AiMetadata;

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// AI-suggested tag lists are capped at this many entries.
const MAX_TAGS: usize = 5;
const MAX_DESCRIPTION_LEN: usize = 200;

/// Service wrapping the external inference endpoint.
#[derive(Clone)]
pub struct AiMetadataService {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl AiMetadataService {
    /// Reads the API key from the environment; absent means fail-closed.
    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok())
    }

    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            endpoint: GEMINI_ENDPOINT.to_string(),
        }
    }

    /// Overrides the inference endpoint. Used by tests.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generates a description and tags for the given bookmark.
    pub async fn generate(&self, url: &str, title: &str) -> Result<AiMetadata, AiError> {
        let api_key = self.api_key.as_ref().ok_or(AiError::MissingCredential)?;

        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(url, title) }] }]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Provider(format!("endpoint returned {}", status)));
        }

        let reply: Value = response
            .json()
            .await
            .map_err(|e| AiError::Provider(e.to_string()))?;

        let text = reply
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AiError::InvalidResponse("missing candidate text".to_string()))?;

        parse_model_reply(text)
    }
}

fn build_prompt(url: &str, title: &str) -> String {
    format!(
        "You are a helpful assistant that generates bookmark metadata.\n\n\
         Given this bookmark:\n- URL: {}\n- Title: {}\n\n\
         Generate the following in JSON format:\n\
         1. A concise description (1-2 sentences, max 150 characters) that summarizes what this bookmark is about\n\
         2. An array of 3-5 relevant tags (single words or short phrases, lowercase)\n\n\
         Return ONLY a valid JSON object with this exact structure:\n\
         {{\n  \"description\": \"your description here\",\n  \"tags\": [\"tag1\", \"tag2\", \"tag3\"]\n}}\n\n\
         Important:\n\
         - Description should be informative and concise\n\
         - Tags should be relevant, searchable keywords\n\
         - Return ONLY the JSON object, no additional text",
        url, title
    )
}

/// Parses the model's free-text reply into validated metadata.
///
/// Tags are lowercased, trimmed, and capped at five; descriptions longer
/// than 200 characters are truncated to 197 plus "...".
pub fn parse_model_reply(text: &str) -> Result<AiMetadata, AiError> {
    let json_text = extract_json_block(text).unwrap_or_else(|| text.trim().to_string());
    let value: Value = serde_json::from_str(&json_text)
        .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

    let description = value
        .get("description")
        .and_then(|v| v.as_str())
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AiError::InvalidResponse("missing description".to_string()))?;

    let raw_tags = value
        .get("tags")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AiError::InvalidResponse("tags is not an array".to_string()))?;

    let tags: Vec<String> = raw_tags
        .iter()
        .filter_map(|t| t.as_str())
        .map(|t| t.to_lowercase().trim().to_string())
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .collect();

    Ok(AiMetadata {
        description: truncate_description(description),
        tags,
    })
}

/// Recovers a JSON object from free text: a fenced ```json block when
/// present, otherwise the outermost brace pair.
pub fn extract_json_block(text: &str) -> Option<String> {
    if let Some(fence_start) = text.find("```") {
        let after = &text[fence_start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(fence_end) = after.find("```") {
            let inner = &after[..fence_end];
            if let (Some(open), Some(close)) = (inner.find('{'), inner.rfind('}')) {
                if open < close {
                    return Some(inner[open..=close].to_string());
                }
            }
        }
    }

    let open = text.find('{')?;
    let close = text.rfind('}')?;
    (open < close).then(|| text[open..=close].to_string())
}

fn truncate_description(s: &str) -> String {
    if s.chars().count() > MAX_DESCRIPTION_LEN {
        let head: String = s.chars().take(MAX_DESCRIPTION_LEN - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
