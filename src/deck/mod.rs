//! Deck materialization: an outline rendered onto the layouts of a PresentationML template.
//!
//! The template package is held in memory, its slides are stripped, and one slide is added
//! per outline entry from a single selected layout. The first entry becomes a title slide
//! (text in the layout's title placeholder); every later entry gets a title text box and a
//! bullet text box at fixed positions.

pub mod content_types;
pub mod layout;
pub mod package;
pub mod presentation;
pub mod rels;
pub mod slide;
mod xml;

use crate::outline::{Outline, SlideSpec};

pub use layout::{Layout, select_layout, select_layout_index};
pub use presentation::Presentation;
pub use slide::SlideBuilder;

use slide::{BULLET_BOX, BULLET_STYLE, TITLE_BOX, TITLE_BOX_STYLE, TITLE_SLIDE_STYLE};

/// MIME type of the generated document.
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("template is not a valid presentation: {0}")]
    TemplateLoad(String),
    #[error("template defines no slide layouts")]
    NoLayoutAvailable,
    #[error("failed to write presentation: {0}")]
    Serialization(String),
}

/// Which of the two slide shapes an outline entry is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKind {
    Title,
    Content,
}

/// Build the shapes of one generated slide.
pub fn build_slide(layout: &Layout, spec: &SlideSpec, kind: SlideKind) -> SlideBuilder {
    let mut slide = SlideBuilder::new();
    match kind {
        SlideKind::Title => {
            let placed = slide.clone_placeholders(layout, Some((spec.title.as_str(), TITLE_SLIDE_STYLE)));
            if !placed {
                log::debug!("Layout {:?} has no title placeholder; title slide left untitled", layout.name);
            }
        },
        SlideKind::Content => {
            slide.clone_placeholders(layout, None);
            slide.text_box(TITLE_BOX, [spec.title.as_str()], TITLE_BOX_STYLE);
            slide.text_box(BULLET_BOX, spec.bullets.iter().map(String::as_str), BULLET_STYLE);
        },
    }
    slide
}

/// Render `outline` onto `template` and return the serialized `.pptx`.
pub fn materialize(template: &[u8], outline: &Outline) -> Result<Vec<u8>, DeckError> {
    let mut presentation = Presentation::open(template)?;

    let existing = presentation.slide_count();
    presentation.clear_slides();

    let layouts = presentation.layouts()?;
    let layout = select_layout(&layouts).ok_or(DeckError::NoLayoutAvailable)?;
    log::info!(
        "Materializing {} slides on layout {:?} ({} template slides removed)",
        outline.len(),
        layout.name,
        existing
    );

    if let Some(spec) = outline.title_slide() {
        presentation.add_slide(layout, &build_slide(layout, spec, SlideKind::Title));
    }
    for spec in outline.content_slides() {
        presentation.add_slide(layout, &build_slide(layout, spec, SlideKind::Content));
    }

    presentation.save()
}
