use askama::Template;

use super::PageContext;

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub ctx: PageContext,
    pub path: String,
}

/// Shown when the model reply could not be read as an outline.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ParseErrorTemplate {
    pub ctx: PageContext,
    pub raw: String,
    pub message: String,
}
