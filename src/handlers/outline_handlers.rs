use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::errors::{AppError, render};
use crate::outline::OutlineRequest;
use crate::state::AppState;
use crate::templates_structs::{IndexTemplate, PageContext, PreviewTemplate};

#[derive(Deserialize)]
pub struct ParseForm {
    pub text: String,
    #[serde(default)]
    pub guidance: String,
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

pub async fn index(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let tmpl = IndexTemplate {
        ctx: PageContext::new("New deck"),
        default_api_url: state.config.default_api_url.clone(),
        default_model: state.config.default_model.clone(),
    };
    render(tmpl)
}

pub async fn parse(
    state: web::Data<AppState>,
    form: web::Form<ParseForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    log::info!(
        "Outline requested from {} ({}), {} chars of text",
        form.api_url,
        form.model,
        form.text.chars().count()
    );

    let outline = state
        .llm
        .request_outline(&OutlineRequest {
            text: &form.text,
            guidance: &form.guidance,
            api_key: &form.api_key,
            api_url: &form.api_url,
            model: &form.model,
        })
        .await?;

    let slides_json = outline.to_json_pretty()?;
    let tmpl = PreviewTemplate {
        ctx: PageContext::new("Outline preview"),
        slides: outline.slides().to_vec(),
        slides_json,
        text: form.text,
        guidance: form.guidance,
        api_key: form.api_key,
        api_url: form.api_url,
        model: form.model,
        max_upload_mb: state.config.max_upload_bytes / (1024 * 1024),
    };
    render(tmpl)
}
