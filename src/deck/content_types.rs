//! `[Content_Types].xml`: extension defaults plus per-part overrides.

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::DeckError;
use super::xml::{XML_DECL, attr, escape, load_err};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const CT_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

pub const CT_PRESENTATION_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub const CT_TEMPLATE_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
pub const CT_SLIDESHOW_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml";
pub const CT_MACRO_PRESENTATION_MAIN: &str = "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
pub const CT_MACRO_TEMPLATE_MAIN: &str = "application/vnd.ms-powerpoint.template.macroEnabledTemplate.main+xml";
pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// Main-part content types accepted as a template.
pub const PRESENTATION_MAIN_TYPES: [&str; 5] = [
    CT_PRESENTATION_MAIN,
    CT_TEMPLATE_MAIN,
    CT_SLIDESHOW_MAIN,
    CT_MACRO_PRESENTATION_MAIN,
    CT_MACRO_TEMPLATE_MAIN,
];

#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// Lower-cased extension -> content type.
    defaults: BTreeMap<String, String>,
    /// Part name (no leading slash) -> content type.
    overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    pub fn parse(xml: &[u8]) -> Result<Self, DeckError> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut types = Self::default();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"Default" => {
                        if let (Some(ext), Some(ct)) =
                            (attr(&reader, &e, b"Extension"), attr(&reader, &e, b"ContentType"))
                        {
                            types.defaults.insert(ext.to_ascii_lowercase(), ct);
                        }
                    },
                    b"Override" => {
                        if let (Some(name), Some(ct)) =
                            (attr(&reader, &e, b"PartName"), attr(&reader, &e, b"ContentType"))
                        {
                            types.overrides.insert(name.trim_start_matches('/').to_string(), ct);
                        }
                    },
                    _ => {},
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(load_err(CONTENT_TYPES_PART, e)),
                _ => {},
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Content type of `part`: its override, else the default for its extension.
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        if let Some(ct) = self.overrides.get(part) {
            return Some(ct);
        }
        let ext = part.rsplit_once('.')?.1.to_ascii_lowercase();
        self.defaults.get(&ext).map(String::as_str)
    }

    pub fn set_override(&mut self, part: &str, content_type: &str) {
        self.overrides.insert(part.to_string(), content_type.to_string());
    }

    pub fn remove_override(&mut self, part: &str) {
        self.overrides.remove(part);
    }

    /// Serialize, keeping only overrides for which `keep` returns true.
    pub fn to_xml<F: Fn(&str) -> bool>(&self, keep: F) -> String {
        let mut xml = String::with_capacity(256 + self.overrides.len() * 140);
        xml.push_str(XML_DECL);
        let _ = write!(xml, r#"<Types xmlns="{CT_NS}">"#);
        for (ext, ct) in &self.defaults {
            let _ = write!(xml, r#"<Default Extension="{}" ContentType="{}"/>"#, escape(ext), escape(ct));
        }
        for (part, ct) in self.overrides.iter().filter(|(part, _)| keep(part)) {
            let _ = write!(xml, r#"<Override PartName="/{}" ContentType="{}"/>"#, escape(part), escape(ct));
        }
        xml.push_str("</Types>");
        xml
    }
}
