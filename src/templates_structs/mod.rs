// Template context structures for Askama templates, one struct per page.
// All types are re-exported: `use textdeck::templates_structs::*`

mod common;
mod outline;

pub use common::*;
pub use outline::*;

pub const APP_NAME: &str = "TextDeck";

/// Context shared by every page through `base.html`.
pub struct PageContext {
    pub app_name: String,
    pub page_title: String,
}

impl PageContext {
    pub fn new(page_title: &str) -> Self {
        Self { app_name: APP_NAME.to_string(), page_title: page_title.to_string() }
    }
}
