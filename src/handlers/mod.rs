pub mod deck_handlers;
pub mod outline_handlers;

use actix_web::{HttpRequest, HttpResponse, web};

use crate::errors::AppError;
use crate::templates_structs::{NotFoundTemplate, PageContext};

/// Route table shared by `main` and the integration tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(outline_handlers::index))
        .route("/parse", web::post().to(outline_handlers::parse))
        .route("/generate", web::post().to(deck_handlers::generate));
}

/// Default service: must be registered last.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    use askama::Template;

    let tmpl = NotFoundTemplate {
        ctx: PageContext::new("Not Found"),
        path: req.path().to_string(),
    };
    Ok(HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(tmpl.render()?))
}
