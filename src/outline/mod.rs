//! Outline stage: turn raw text into an ordered list of titled, bulleted slide specs
//! by asking a chat-completion LLM endpoint.

pub mod client;
pub mod normalize;
pub mod prompt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub use client::{LlmClient, OutlineRequest};
pub use normalize::{extract_json_payload, parse_outline};
pub use prompt::build_prompt;

/// One outline entry. Missing or `null` fields deserialize to empty values so the
/// materializer never has to branch on presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

impl SlideSpec {
    pub fn new(title: impl Into<String>, bullets: Vec<String>) -> Self {
        Self { title: title.into(), bullets }
    }
}

/// Ordered slide specs. Entry 0 is the title slide; serializes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outline(Vec<SlideSpec>);

impl Outline {
    pub fn new(slides: Vec<SlideSpec>) -> Self {
        Self(slides)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn slides(&self) -> &[SlideSpec] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn title_slide(&self) -> Option<&SlideSpec> {
        self.0.first()
    }

    /// Every entry after the title slide.
    pub fn content_slides(&self) -> &[SlideSpec] {
        self.0.get(1..).unwrap_or(&[])
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Failures of the outline stage.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// The LLM endpoint answered with a non-success status.
    #[error("LLM request failed: {status} - {body}")]
    Upstream { status: u16, body: String },

    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("LLM request could not be completed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not a chat completion with `choices[0].message.content`.
    #[error("LLM response has no choices[0].message.content: {0}")]
    MalformedResponse(String),

    /// The model reply is not a JSON outline. `raw` is the full reply text.
    #[error("Failed to parse JSON: {message}")]
    Parse { raw: String, message: String },
}
