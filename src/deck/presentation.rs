//! The presentation part of a package: slide list, masters and layouts.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use super::DeckError;
use super::content_types::{
    CONTENT_TYPES_PART, CT_MACRO_PRESENTATION_MAIN, CT_MACRO_TEMPLATE_MAIN, CT_PRESENTATION_MAIN,
    CT_SLIDE, CT_SLIDESHOW_MAIN, CT_TEMPLATE_MAIN, ContentTypes, PRESENTATION_MAIN_TYPES,
};
use super::layout::Layout;
use super::package::{PACKAGE_SOURCE, Package};
use super::rels::{
    RT_SLIDE, RT_SLIDE_LAYOUT, Relationships, is_type, rels_part_for, relative_target, resolve_target,
};
use super::slide::SlideBuilder;
use super::xml::{attr, load_err, rel_id, write_err};

const OFFICE_DOCUMENT: &str = "officeDocument";

const RELATIONSHIPS_NS: [&str; 2] = [
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
    "http://purl.oclc.org/ooxml/officeDocument/relationships",
];

/// Slide ids start here; lower values are reserved.
const MIN_SLIDE_ID: u32 = 256;

/// `p:ext` carrying the section list, which names slides by id.
const SECTION_EXT_URI: &str = "{521415D9-36F7-43E2-AB2F-B90AF26B5E84}";

/// Direct children of `p:presentation` that come after `p:sldIdLst` in schema order.
const AFTER_SLIDE_LIST: [&[u8]; 11] = [
    b"sldSz",
    b"notesSz",
    b"smartTags",
    b"embeddedFontLst",
    b"custShowLst",
    b"photoAlbum",
    b"custDataLst",
    b"kinsoku",
    b"defaultTextStyle",
    b"modifyVerifier",
    b"extLst",
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct SlideEntry {
    id: u32,
    rel_id: String,
}

/// A loaded presentation package ready to have its slides replaced.
#[derive(Debug)]
pub struct Presentation {
    package: Package,
    content_types: ContentTypes,
    main_part: String,
    main_rels: Relationships,
    slides: Vec<SlideEntry>,
}

impl Presentation {
    /// Load a `.pptx` (or `.potx` / macro-enabled / slideshow) package.
    pub fn open(bytes: &[u8]) -> Result<Self, DeckError> {
        let package = Package::open(bytes)?;
        let content_types = ContentTypes::parse(package.require(CONTENT_TYPES_PART)?)?;

        let package_rels = package.rels_of(PACKAGE_SOURCE)?;
        let main_rel = package_rels
            .first_of_type(OFFICE_DOCUMENT)
            .ok_or_else(|| DeckError::TemplateLoad("package has no main document".to_string()))?;
        let main_part = resolve_target(PACKAGE_SOURCE, &main_rel.target);

        let content_type = content_types.content_type_of(&main_part).unwrap_or_default();
        if !PRESENTATION_MAIN_TYPES.contains(&content_type) {
            return Err(DeckError::TemplateLoad(format!(
                "main part {main_part} has content type {content_type:?}, not a presentation"
            )));
        }

        let slides = read_slide_list(&main_part, package.require(&main_part)?)?;
        let main_rels = package.rels_of(&main_part)?;

        Ok(Self { package, content_types, main_part, main_rels, slides })
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Remove every slide, last to first, together with its part and relationships.
    pub fn clear_slides(&mut self) {
        while let Some(entry) = self.slides.pop() {
            self.drop_slide_rel(&entry.rel_id);
        }
        // slide relationships that never made it into sldIdLst
        let stray: Vec<String> = self
            .main_rels
            .iter()
            .filter(|r| is_type(&r.rel_type, "slide"))
            .map(|r| r.id.clone())
            .collect();
        for id in stray {
            self.drop_slide_rel(&id);
        }
    }

    fn drop_slide_rel(&mut self, rel_id: &str) {
        if let Some(rel) = self.main_rels.remove(rel_id) {
            let part = resolve_target(&self.main_part, &rel.target);
            self.package.remove(&rels_part_for(&part));
            self.package.remove(&part);
            self.content_types.remove_override(&part);
        }
    }

    /// Layouts of the first slide master, in the master's `sldLayoutIdLst` order.
    pub fn layouts(&self) -> Result<Vec<Layout>, DeckError> {
        let main_xml = self.package.require(&self.main_part)?;
        let master_rel = ids_of(&self.main_part, main_xml, b"sldMasterId")?
            .into_iter()
            .find_map(|id| self.main_rels.get(&id))
            .or_else(|| self.main_rels.first_of_type("slideMaster"));
        let Some(master_rel) = master_rel else {
            return Ok(Vec::new());
        };

        let master_part = resolve_target(&self.main_part, &master_rel.target);
        let master_xml = self.package.require(&master_part)?;
        let master_rels = self.package.rels_of(&master_part)?;

        let mut layout_rel_ids = ids_of(&master_part, master_xml, b"sldLayoutId")?;
        if layout_rel_ids.is_empty() {
            layout_rel_ids = master_rels
                .iter()
                .filter(|r| is_type(&r.rel_type, "slideLayout"))
                .map(|r| r.id.clone())
                .collect();
        }

        let mut layouts = Vec::with_capacity(layout_rel_ids.len());
        for id in layout_rel_ids {
            let Some(rel) = master_rels.get(&id) else {
                log::warn!("{master_part}: layout reference {id} has no relationship");
                continue;
            };
            let part = resolve_target(&master_part, &rel.target);
            layouts.push(Layout::parse(&part, self.package.require(&part)?)?);
        }
        Ok(layouts)
    }

    /// Append a slide built on `layout`.
    pub fn add_slide(&mut self, layout: &Layout, slide: &SlideBuilder) {
        let part = self.next_slide_part();

        let mut slide_rels = Relationships::default();
        slide_rels.add(RT_SLIDE_LAYOUT, &relative_target(&part, &layout.part));
        self.package.insert(rels_part_for(&part), slide_rels.to_xml().into_bytes());
        self.package.insert(part.clone(), slide.to_xml().into_bytes());
        self.content_types.set_override(&part, CT_SLIDE);

        let rel_id = self.main_rels.add(RT_SLIDE, &relative_target(&self.main_part, &part));
        let id = self
            .slides
            .iter()
            .map(|s| s.id + 1)
            .max()
            .unwrap_or(MIN_SLIDE_ID)
            .max(MIN_SLIDE_ID);
        self.slides.push(SlideEntry { id, rel_id });
    }

    fn next_slide_part(&self) -> String {
        let dir = match self.main_part.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/slides"),
            None => "slides".to_string(),
        };
        (1..)
            .map(|n| format!("{dir}/slide{n}.xml"))
            .find(|candidate| !self.package.contains(candidate))
            .unwrap_or_default()
    }

    /// Serialize the package with the current slide list.
    pub fn save(mut self) -> Result<Vec<u8>, DeckError> {
        let main_xml = self.package.require(&self.main_part).map_err(|e| write_err(&self.main_part, e))?;
        let rewritten = rewrite_slide_list(&self.main_part, main_xml, &self.slides)?;
        self.package.insert(self.main_part.clone(), rewritten);
        self.package
            .insert(rels_part_for(&self.main_part), self.main_rels.to_xml().into_bytes());

        // generated files are plain presentations even when the template was not
        let retyped = match self.content_types.content_type_of(&self.main_part) {
            Some(CT_TEMPLATE_MAIN | CT_SLIDESHOW_MAIN) => Some(CT_PRESENTATION_MAIN),
            Some(CT_MACRO_TEMPLATE_MAIN) => Some(CT_MACRO_PRESENTATION_MAIN),
            _ => None,
        };
        if let Some(content_type) = retyped {
            self.content_types.set_override(&self.main_part, content_type);
        }

        self.package.write(&self.content_types)
    }
}

/// `(id, r:id)` of every `p:sldId` in the presentation part.
fn read_slide_list(part: &str, xml: &[u8]) -> Result<Vec<SlideEntry>, DeckError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut slides = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sldId" => {
                let id = attr(&reader, &e, b"id").and_then(|v| v.parse::<u32>().ok());
                if let (Some(id), Some(rel_id)) = (id, rel_id(&reader, &e)) {
                    slides.push(SlideEntry { id, rel_id });
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(load_err(part, e)),
            _ => {},
        }
        buf.clear();
    }
    Ok(slides)
}

/// Relationship ids of every element named `local`, in document order.
fn ids_of(part: &str, xml: &[u8], local: &[u8]) -> Result<Vec<String>, DeckError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut ids = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == local => {
                if let Some(id) = rel_id(&reader, &e) {
                    ids.push(id);
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(load_err(part, e)),
            _ => {},
        }
        buf.clear();
    }
    Ok(ids)
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{prefix}:{local}")
    }
}

/// Namespace prefixes the root binds for PresentationML and relationships.
fn root_prefixes<R>(reader: &Reader<R>, root: &BytesStart<'_>) -> (String, String) {
    let p = root
        .name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
        .unwrap_or_default();
    let r = root
        .attributes()
        .flatten()
        .find(|a| {
            a.key.as_ref().starts_with(b"xmlns:")
                && a.decode_and_unescape_value(reader.decoder())
                    .is_ok_and(|v| RELATIONSHIPS_NS.contains(&&*v))
        })
        .map(|a| String::from_utf8_lossy(a.key.local_name().as_ref()).into_owned())
        .unwrap_or_else(|| "r".to_string());
    (p, r)
}

fn write_slide_list<W: std::io::Write>(
    writer: &mut Writer<W>,
    p: &str,
    r: &str,
    slides: &[SlideEntry],
) -> std::io::Result<()> {
    let list = qualified(p, "sldIdLst");
    if slides.is_empty() {
        return writer.write_event(Event::Empty(BytesStart::new(list.as_str())));
    }
    writer.write_event(Event::Start(BytesStart::new(list.as_str())))?;
    let item = qualified(p, "sldId");
    let rel_attr = qualified(r, "id");
    for slide in slides {
        let mut e = BytesStart::new(item.as_str());
        e.push_attribute(("id", slide.id.to_string().as_str()));
        e.push_attribute((rel_attr.as_str(), slide.rel_id.as_str()));
        writer.write_event(Event::Empty(e))?;
    }
    writer.write_event(Event::End(BytesEnd::new(list.as_str())))
}

/// Subtrees that reference removed slides and are dropped rather than left dangling.
fn is_dropped<R>(reader: &Reader<R>, e: &BytesStart<'_>, depth: usize) -> bool {
    let local = e.local_name();
    (depth == 2 && local.as_ref() == b"custShowLst")
        || (local.as_ref() == b"ext" && attr(reader, e, b"uri").as_deref() == Some(SECTION_EXT_URI))
}

/// Stream the presentation part through, replacing `sldIdLst` with `slides`.
/// Depth counts the root element as 1.
fn rewrite_slide_list(part: &str, xml: &[u8], slides: &[SlideEntry]) -> Result<Vec<u8>, DeckError> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    let mut depth = 0usize;
    let mut skip = 0usize;
    let mut list_written = false;
    let mut prefixes = ("p".to_string(), "r".to_string());

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf).map_err(|e| write_err(part, e))?;

        if skip > 0 {
            match event {
                Event::Start(_) => skip += 1,
                Event::End(_) => skip -= 1,
                Event::Eof => break,
                _ => {},
            }
            continue;
        }

        match event {
            Event::Start(e) => {
                if depth == 0 {
                    prefixes = root_prefixes(&reader, &e);
                }
                let level = depth + 1;
                if level == 2 && e.local_name().as_ref() == b"sldIdLst" {
                    write_slide_list(&mut writer, &prefixes.0, &prefixes.1, slides)
                        .map_err(|e| write_err(part, e))?;
                    list_written = true;
                    skip = 1;
                    continue;
                }
                if level == 2 && !list_written && AFTER_SLIDE_LIST.contains(&e.local_name().as_ref()) {
                    write_slide_list(&mut writer, &prefixes.0, &prefixes.1, slides)
                        .map_err(|e| write_err(part, e))?;
                    list_written = true;
                }
                if is_dropped(&reader, &e, level) {
                    skip = 1;
                    continue;
                }
                depth = level;
                writer.write_event(Event::Start(e)).map_err(|e| write_err(part, e))?;
            },
            Event::Empty(e) => {
                let level = depth + 1;
                if level == 2 && e.local_name().as_ref() == b"sldIdLst" {
                    write_slide_list(&mut writer, &prefixes.0, &prefixes.1, slides)
                        .map_err(|e| write_err(part, e))?;
                    list_written = true;
                    continue;
                }
                if level == 2 && !list_written && AFTER_SLIDE_LIST.contains(&e.local_name().as_ref()) {
                    write_slide_list(&mut writer, &prefixes.0, &prefixes.1, slides)
                        .map_err(|e| write_err(part, e))?;
                    list_written = true;
                }
                if is_dropped(&reader, &e, level) {
                    continue;
                }
                writer.write_event(Event::Empty(e)).map_err(|e| write_err(part, e))?;
            },
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(e)).map_err(|e| write_err(part, e))?;
            },
            Event::Eof => break,
            other => writer.write_event(other).map_err(|e| write_err(part, e))?,
        }
    }

    if !list_written {
        return Err(write_err(part, "no place for the slide list"));
    }
    Ok(writer.into_inner().into_inner())
}
