use askama::Template;

use super::PageContext;
use crate::outline::SlideSpec;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub ctx: PageContext,
    pub default_api_url: String,
    pub default_model: String,
}

/// Outline preview. Carries the original inputs so the outline can be regenerated
/// without re-entering credentials, and the outline as editable JSON for generation.
#[derive(Template)]
#[template(path = "preview.html")]
pub struct PreviewTemplate {
    pub ctx: PageContext,
    pub slides: Vec<SlideSpec>,
    pub slides_json: String,
    pub text: String,
    pub guidance: String,
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub max_upload_mb: usize,
}
