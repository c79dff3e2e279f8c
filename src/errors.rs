use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use std::fmt;

use crate::deck::DeckError;
use crate::outline::OutlineError;
use crate::templates_structs::{PageContext, ParseErrorTemplate};

#[derive(Debug)]
pub enum AppError {
    Outline(OutlineError),
    Deck(DeckError),
    /// The `slides` field of a generate request is not an outline.
    OutlineJson(serde_json::Error),
    /// Reading the spooled template upload failed.
    Upload(std::io::Error),
    Json(serde_json::Error),
    Template(askama::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Outline(e) => write!(f, "{e}"),
            AppError::Deck(e) => write!(f, "Error in generate: {e}"),
            AppError::OutlineJson(e) => write!(f, "Error in generate: invalid slides JSON: {e}"),
            AppError::Upload(e) => write!(f, "Error in generate: could not read template upload: {e}"),
            AppError::Json(e) => write!(f, "JSON error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        log::error!("{self}");
        match self {
            AppError::Outline(OutlineError::Parse { raw, message }) => {
                let page = ParseErrorTemplate {
                    ctx: PageContext::new("Outline error"),
                    raw: raw.clone(),
                    message: message.clone(),
                };
                match page.render() {
                    Ok(html) => HttpResponse::InternalServerError()
                        .content_type("text/html; charset=utf-8")
                        .body(html),
                    Err(e) => {
                        log::error!("Template error: {e}");
                        plain_text(format!("Failed to parse JSON: {message}\n\n{raw}"))
                    },
                }
            },
            AppError::Json(_) | AppError::Template(_) => plain_text("Internal Server Error".to_string()),
            _ => plain_text(self.to_string()),
        }
    }
}

fn plain_text(body: String) -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type("text/plain; charset=utf-8")
        .body(body)
}

impl From<OutlineError> for AppError {
    fn from(e: OutlineError) -> Self {
        AppError::Outline(e)
    }
}

impl From<DeckError> for AppError {
    fn from(e: DeckError) -> Self {
        AppError::Deck(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Upload(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

/// Render a page into a 200 HTML response.
pub fn render(tmpl: impl Template) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(tmpl.render()?))
}
