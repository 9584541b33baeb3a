//! Drafting a raw schema document from a free-text request.
//!
//! The drafter's output is untrusted: the orchestrator always passes it
//! through the normalizer before anything is emitted.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const INSTRUCTIONS: &str = r#"You are AppArchitect, an expert system that converts user requests into a structured JSON description of a web application.

Analyze the user's request and answer with a complete application description using this JSON structure:

{
  "name": "application name",
  "description": "application description",
  "entities": [
    {
      "name": "entity name, singular (user, post, order)",
      "displayName": "human readable name",
      "columns": [
        {
          "name": "field name",
          "type": "text|number|date|boolean|email|url|textarea",
          "required": true,
          "unique": false,
          "primaryKey": false
        }
      ]
    }
  ],
  "pages": [
    {
      "name": "page name",
      "type": "list|form|detail|dashboard|kanban",
      "entity": "entity name",
      "title": "page title",
      "description": "page description"
    }
  ]
}

Rules:
1. Every entity has an "id" field as its primary key.
2. Pick field types like this:
   - names, titles, short descriptions -> text
   - amounts, quantities, ages -> number
   - points in time -> date
   - yes/no flags -> boolean
   - email addresses -> email
   - web addresses -> url
   - long text, notes -> textarea
3. Give every entity a list, a form and a detail page.
4. Add a dashboard page only when the application calls for one.
5. Answer with valid JSON only, no other text.

Example request: "subscription spending tracker, fields: name text, amount number, cycle text"
"#;

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("drafter request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("drafter returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("drafter returned an empty response")]
    EmptyResponse,

    #[error("drafter returned malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("no API key: pass one explicitly or set OPENAI_API_KEY")]
    MissingApiKey,
}

/// Turns a free-text request into a raw schema document.
pub trait SchemaDrafter {
    fn draft(&self, prompt: &str) -> Result<Value, DraftError>;
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Chat-completions drafter. One request per draft, never retried.
#[derive(Debug)]
pub struct OpenAiDrafter {
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f32,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiDrafter {
    /// Falls back to `OPENAI_API_KEY` when the config carries no key.
    pub fn new(config: OpenAiConfig) -> Result<Self, DraftError> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()))
            .ok_or(DraftError::MissingApiKey)?;

        Ok(Self {
            api_key,
            model: config.model,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            temperature: config.temperature,
            client: reqwest::blocking::Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": INSTRUCTIONS},
                {"role": "user", "content": prompt},
            ],
            "response_format": {"type": "json_object"},
            "temperature": self.temperature,
        })
    }
}

impl SchemaDrafter for OpenAiDrafter {
    fn draft(&self, prompt: &str) -> Result<Value, DraftError> {
        info!(model = %self.model, "drafting schema from prompt");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(DraftError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(bytes = text.len(), "drafter responded");
        parse_response(&text)
    }
}

/// Pull the first choice's content out of a chat-completions body and parse
/// it as a JSON document.
fn parse_response(body: &str) -> Result<Value, DraftError> {
    let resp: ChatResponse = serde_json::from_str(body).map_err(DraftError::MalformedJson)?;
    let content = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(DraftError::EmptyResponse)?;
    serde_json::from_str(&content).map_err(DraftError::MalformedJson)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drafter() -> OpenAiDrafter {
        OpenAiDrafter::new(OpenAiConfig {
            api_key: Some("sk-test".into()),
            base_url: "http://localhost:9999/v1/".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_and_defaults() {
        let d = drafter();
        assert_eq!(d.endpoint(), "http://localhost:9999/v1/chat/completions");
        assert_eq!(d.model(), "gpt-4-turbo-preview");
    }

    #[test]
    fn test_request_body_shape() {
        let body = drafter().request_body("a todo list");
        assert_eq!(body["model"], "gpt-4-turbo-preview");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "a todo list");
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        let system = body["messages"][0]["content"].as_str().unwrap();
        assert!(system.contains("text|number|date|boolean|email|url|textarea"));
    }

    #[test]
    fn test_parse_response_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"name\":\"Todo\",\"entities\":[]}"}}]}"#;
        let doc = parse_response(body).unwrap();
        assert_eq!(doc["name"], "Todo");
    }

    #[test]
    fn test_parse_response_empty() {
        assert!(matches!(
            parse_response(r#"{"choices":[]}"#),
            Err(DraftError::EmptyResponse)
        ));
        assert!(matches!(
            parse_response(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(DraftError::EmptyResponse)
        ));
    }

    #[test]
    fn test_parse_response_malformed_content() {
        let body = r#"{"choices":[{"message":{"content":"not json"}}]}"#;
        assert!(matches!(parse_response(body), Err(DraftError::MalformedJson(_))));
        assert!(matches!(parse_response("<html>"), Err(DraftError::MalformedJson(_))));
    }

    #[test]
    fn test_unreachable_server_is_http_error() {
        let d = OpenAiDrafter::new(OpenAiConfig {
            api_key: Some("sk-test".into()),
            base_url: "http://127.0.0.1:1".into(),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(d.draft("anything"), Err(DraftError::Http(_))));
    }
}
