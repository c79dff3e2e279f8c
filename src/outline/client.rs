//! Chat-completion client used to request outlines.
//!
//! The only assumed wire contract: a bearer-authorized JSON POST answered with a body whose
//! `choices[0].message.content` holds the model reply.

use serde::{Deserialize, Serialize};

use super::{Outline, OutlineError, build_prompt, parse_outline};

/// Everything one outline request needs. Credentials and endpoint come from the caller.
#[derive(Debug, Clone)]
pub struct OutlineRequest<'a> {
    pub text: &'a str,
    pub guidance: &'a str,
    pub api_key: &'a str,
    pub api_url: &'a str,
    pub model: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Thin async wrapper over a shared `reqwest::Client`.
///
/// One POST per call, no timeout, no retry: a slow upstream holds the calling request.
#[derive(Debug, Clone, Default)]
pub struct LlmClient {
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new() -> Self {
        Self { http: reqwest::Client::new() }
    }

    /// Build the prompt, send it, and parse the reply into an [`Outline`].
    ///
    /// # Errors
    ///
    /// [`OutlineError::Upstream`] on a non-success status, [`OutlineError::Transport`] when no
    /// response arrives, [`OutlineError::MalformedResponse`] when the body is not a chat
    /// completion and [`OutlineError::Parse`] when the reply is not a JSON outline.
    pub async fn request_outline(&self, request: &OutlineRequest<'_>) -> Result<Outline, OutlineError> {
        let prompt = build_prompt(request.text, request.guidance);
        let reply = self
            .complete(request.api_url, request.api_key, request.model, &prompt)
            .await?;
        let outline = parse_outline(&reply)?;
        log::info!("Model {} returned an outline with {} slides", request.model, outline.len());
        Ok(outline)
    }

    /// Send a single user message and return the assistant content.
    pub async fn complete(
        &self,
        api_url: &str,
        api_key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<String, OutlineError> {
        let body = ChatRequest {
            model,
            messages: [ChatMessage { role: "user", content: prompt }],
        };

        log::debug!("POST {api_url} model={model} prompt_chars={}", prompt.len());
        let resp = self
            .http
            .post(api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            log::warn!("LLM endpoint {api_url} answered {status}");
            return Err(OutlineError::Upstream { status: status.as_u16(), body: text });
        }

        extract_content(&text)
    }
}

/// Read `choices[0].message.content` out of a chat-completion body.
fn extract_content(body: &str) -> Result<String, OutlineError> {
    let completion: ChatCompletion =
        serde_json::from_str(body).map_err(|_| OutlineError::MalformedResponse(body.to_string()))?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| OutlineError::MalformedResponse(body.to_string()))
}
