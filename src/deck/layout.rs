//! Slide layouts: enumeration from the first slide master and title-layout selection.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::DeckError;
use super::xml::{attr, attr_local, load_err};

/// A placeholder declared by a layout (`<p:ph>` inside a `<p:sp>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholder {
    /// Shape name from `cNvPr`.
    pub name: String,
    /// `type` attribute; absent means an object/body placeholder.
    pub kind: Option<String>,
    pub idx: Option<String>,
    pub orient: Option<String>,
    pub sz: Option<String>,
}

impl Placeholder {
    pub fn is_title(&self) -> bool {
        matches!(self.kind.as_deref(), Some("title" | "ctrTitle"))
    }

    /// Date, footer and slide-number placeholders are not copied onto new slides.
    pub fn is_cloneable(&self) -> bool {
        !matches!(self.kind.as_deref(), Some("dt" | "ftr" | "sldNum"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Part name, e.g. `ppt/slideLayouts/slideLayout1.xml`.
    pub part: String,
    /// `cSld/@name`, empty when the layout is unnamed.
    pub name: String,
    pub placeholders: Vec<Placeholder>,
}

impl Layout {
    /// Read name and placeholders out of a layout part.
    pub fn parse(part: &str, xml: &[u8]) -> Result<Self, DeckError> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut name = String::new();
        let mut placeholders = Vec::new();
        let mut current: Option<(Placeholder, bool)> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"cSld" => name = attr(&reader, &e, b"name").unwrap_or_default(),
                    b"sp" => current = Some((Placeholder::default(), false)),
                    b"cNvPr" => set_shape_name(&mut current, attr(&reader, &e, b"name")),
                    b"ph" => mark_placeholder(&mut current, &reader, &e),
                    _ => {},
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"cSld" => name = attr(&reader, &e, b"name").unwrap_or_default(),
                    b"cNvPr" => set_shape_name(&mut current, attr(&reader, &e, b"name")),
                    b"ph" => mark_placeholder(&mut current, &reader, &e),
                    _ => {},
                },
                Ok(Event::End(e)) if e.local_name().as_ref() == b"sp" => {
                    if let Some((placeholder, true)) = current.take() {
                        placeholders.push(placeholder);
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(load_err(part, e)),
                _ => {},
            }
            buf.clear();
        }

        Ok(Self { part: part.to_string(), name, placeholders })
    }

    pub fn title_placeholder(&self) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.is_title())
    }
}

fn set_shape_name(current: &mut Option<(Placeholder, bool)>, name: Option<String>) {
    if let (Some((placeholder, _)), Some(name)) = (current.as_mut(), name) {
        placeholder.name = name;
    }
}

fn mark_placeholder<R>(
    current: &mut Option<(Placeholder, bool)>,
    reader: &Reader<R>,
    e: &quick_xml::events::BytesStart<'_>,
) {
    if let Some((placeholder, is_ph)) = current.as_mut() {
        *is_ph = true;
        placeholder.kind = attr_local(reader, e, b"type");
        placeholder.idx = attr_local(reader, e, b"idx");
        placeholder.orient = attr_local(reader, e, b"orient");
        placeholder.sz = attr_local(reader, e, b"sz");
    }
}

/// Index of the first name containing "title" (ASCII case-insensitive), else 0.
/// `None` only when there are no layouts.
pub fn select_layout_index<S: AsRef<str>>(names: &[S]) -> Option<usize> {
    if names.is_empty() {
        return None;
    }
    let found = names
        .iter()
        .position(|name| name.as_ref().to_ascii_lowercase().contains("title"));
    Some(found.unwrap_or(0))
}

/// Pick the layout every generated slide is built from.
pub fn select_layout(layouts: &[Layout]) -> Option<&Layout> {
    let names: Vec<&str> = layouts.iter().map(|l| l.name.as_str()).collect();
    select_layout_index(&names).map(|i| &layouts[i])
}
