use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::text::Text;
use actix_web::HttpResponse;

use crate::deck::{self, PPTX_CONTENT_TYPE};
use crate::errors::AppError;
use crate::outline::Outline;

pub const DOWNLOAD_NAME: &str = "generated.pptx";

/// Template upload plus the (possibly hand-edited) outline JSON from the preview page.
#[derive(MultipartForm)]
pub struct GenerateForm {
    pub ppt_template: TempFile,
    pub slides: Text<String>,
}

pub async fn generate(MultipartForm(form): MultipartForm<GenerateForm>) -> Result<HttpResponse, AppError> {
    let outline = Outline::from_json(&form.slides).map_err(AppError::OutlineJson)?;
    // the spooled file is removed when `form` drops at the end of the request
    let template = std::fs::read(form.ppt_template.file.path())?;
    log::info!(
        "Generating deck from {} ({} bytes) with {} slides",
        form.ppt_template.file_name.as_deref().unwrap_or("unnamed template"),
        template.len(),
        outline.len()
    );

    let bytes = deck::materialize(&template, &outline)?;

    Ok(HttpResponse::Ok()
        .content_type(PPTX_CONTENT_TYPE)
        .insert_header(("Content-Disposition", format!("attachment; filename=\"{DOWNLOAD_NAME}\"")))
        .body(bytes))
}
