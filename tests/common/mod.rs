//! Shared test infrastructure for deck and handler tests.
//!
//! - `TemplateBuilder` writes a minimal but well-formed PresentationML package in memory:
//!   one slide master, any number of named layouts, optional pre-existing slides.
//! - `read_slides()` / `shapes()` read a generated deck back in presentation order.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use textdeck::deck::package::Package;
use textdeck::deck::rels::{Relationships, resolve_target};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

pub const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub const CT_TEMPLATE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";

const NS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);
const RT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const SECTION_EXT: &str = "{521415D9-36F7-43E2-AB2F-B90AF26B5E84}";

// ============================================================================
// TEMPLATE BUILDER
// ============================================================================

struct LayoutSpec {
    name: String,
    title_placeholder: bool,
}

/// Builds a `.pptx` (or `.potx`) template.
pub struct TemplateBuilder {
    layouts: Vec<LayoutSpec>,
    existing_slides: usize,
    main_content_type: &'static str,
    sections: bool,
    slide_size: bool,
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self {
            layouts: Vec::new(),
            existing_slides: 0,
            main_content_type: CT_PRESENTATION,
            sections: false,
            slide_size: true,
        }
    }

    /// A layout with a title placeholder and a body placeholder.
    pub fn layout(mut self, name: &str) -> Self {
        self.layouts.push(LayoutSpec { name: name.to_string(), title_placeholder: true });
        self
    }

    /// A layout with only a body placeholder.
    pub fn untitled_layout(mut self, name: &str) -> Self {
        self.layouts.push(LayoutSpec { name: name.to_string(), title_placeholder: false });
        self
    }

    pub fn existing_slides(mut self, count: usize) -> Self {
        self.existing_slides = count;
        self
    }

    /// Mark the package as a `.potx` template.
    pub fn as_potx(mut self) -> Self {
        self.main_content_type = CT_TEMPLATE;
        self
    }

    /// Add a section list naming the existing slides.
    pub fn with_sections(mut self) -> Self {
        self.sections = true;
        self
    }

    /// Leave out `sldSz` and `notesSz`, so nothing follows the master list.
    pub fn without_slide_size(mut self) -> Self {
        self.slide_size = false;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut files: Vec<(String, String)> = Vec::new();

        // [Content_Types].xml
        let mut types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
        );
        types.push_str(&format!(
            r#"<Override PartName="/ppt/presentation.xml" ContentType="{}"/>"#,
            self.main_content_type
        ));
        types.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
        for i in 1..=self.layouts.len() {
            types.push_str(&format!(
                r#"<Override PartName="/ppt/slideLayouts/slideLayout{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#
            ));
        }
        for i in 1..=self.existing_slides {
            types.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            ));
        }
        types.push_str("</Types>");
        files.push(("[Content_Types].xml".into(), types));

        files.push((
            "_rels/.rels".into(),
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
        ));

        // presentation part: rId1 is the master, rId2.. the existing slides
        let mut presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#
        );
        if self.existing_slides > 0 {
            presentation.push_str("<p:sldIdLst>");
            for i in 0..self.existing_slides {
                presentation.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2));
            }
            presentation.push_str("</p:sldIdLst>");
        }
        if self.slide_size {
            presentation.push_str(r#"<p:sldSz cx="9144000" cy="6858000" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/>"#);
        }
        if self.sections {
            presentation.push_str(&format!(
                r#"<p:extLst><p:ext uri="{SECTION_EXT}"><p14:sectionLst xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main"><p14:section name="Intro" id="{{00000000-0000-0000-0000-000000000001}}"><p14:sldIdLst>"#
            ));
            for i in 0..self.existing_slides {
                presentation.push_str(&format!(r#"<p14:sldId id="{}"/>"#, 256 + i));
            }
            presentation.push_str("</p14:sldIdLst></p14:section></p14:sectionLst></p:ext></p:extLst>");
        }
        presentation.push_str("</p:presentation>");
        files.push((PRESENTATION_PART.into(), presentation));

        let mut presentation_rels = vec![(
            "rId1".to_string(),
            "slideMaster".to_string(),
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        for i in 1..=self.existing_slides {
            presentation_rels.push((format!("rId{}", i + 1), "slide".into(), format!("slides/slide{i}.xml")));
        }
        files.push(("ppt/_rels/presentation.xml.rels".into(), rels_owned(&presentation_rels)));

        // slide master
        let mut master = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#
        );
        master.push_str("<p:sldLayoutIdLst>");
        for i in 0..self.layouts.len() {
            master.push_str(&format!(r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#, 2147483649u64 + i as u64, i + 1));
        }
        master.push_str("</p:sldLayoutIdLst></p:sldMaster>");
        files.push(("ppt/slideMasters/slideMaster1.xml".into(), master));

        let master_rels: Vec<(String, String, String)> = (1..=self.layouts.len())
            .map(|i| (format!("rId{i}"), "slideLayout".to_string(), format!("../slideLayouts/slideLayout{i}.xml")))
            .collect();
        files.push(("ppt/slideMasters/_rels/slideMaster1.xml.rels".into(), rels_owned(&master_rels)));

        for (i, layout) in self.layouts.iter().enumerate() {
            let n = i + 1;
            files.push((format!("ppt/slideLayouts/slideLayout{n}.xml"), layout_xml(layout)));
            files.push((
                format!("ppt/slideLayouts/_rels/slideLayout{n}.xml.rels"),
                rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
            ));
        }

        for i in 1..=self.existing_slides {
            files.push((
                format!("ppt/slides/slide{i}.xml"),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Old"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>Old slide {i}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
                ),
            ));
            files.push((
                format!("ppt/slides/_rels/slide{i}.xml.rels"),
                rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
            ));
        }

        zip_files(&files)
    }
}

fn layout_xml(layout: &LayoutSpec) -> String {
    let mut shapes = String::new();
    let mut id = 2;
    if layout.title_placeholder {
        shapes.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Title {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>Click to edit title</a:t></a:r></a:p></p:txBody></p:sp>"#,
            id - 1
        ));
        id += 1;
    }
    shapes.push_str(&format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Content Placeholder {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>Click to edit text</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id - 1
    ));
    id += 1;
    shapes.push_str(&format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Slide Number Placeholder {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="sldNum" sz="quarter" idx="12"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#,
        id - 1
    ));

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {NS} preserve="1"><p:cSld name="{}"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        layout.name
    )
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let owned: Vec<(String, String, String)> = entries
        .iter()
        .map(|(id, kind, target)| (id.to_string(), kind.to_string(), target.to_string()))
        .collect();
    rels_owned(&owned)
}

fn rels_owned(entries: &[(String, String, String)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in entries {
        xml.push_str(&format!(r#"<Relationship Id="{id}" Type="{RT}/{kind}" Target="{target}"/>"#));
    }
    xml.push_str("</Relationships>");
    xml
}

pub fn zip_files(files: &[(String, String)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in files {
        zip.start_file(name.as_str(), SimpleFileOptions::default()).expect("Failed to start zip entry");
        zip.write_all(body.as_bytes()).expect("Failed to write zip entry");
    }
    zip.finish().expect("Failed to finish zip").into_inner()
}

// ============================================================================
// DECK READERS
// ============================================================================

/// Part as UTF-8 text.
pub fn part_text(package: &Package, name: &str) -> String {
    String::from_utf8(package.require(name).expect("Missing part").to_vec()).expect("Part is not UTF-8")
}

/// Slide part names and XML, in `sldIdLst` order.
pub fn read_slides(deck: &[u8]) -> Vec<(String, String)> {
    let package = Package::open(deck).expect("Generated deck does not open");
    let presentation = part_text(&package, PRESENTATION_PART);
    let rels = package.rels_of(PRESENTATION_PART).expect("Presentation rels");

    let mut reader = Reader::from_str(&presentation);
    let mut slides = Vec::new();
    loop {
        match reader.read_event().expect("Presentation XML") {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"p:sldId" => {
                let rel_id = attr(&e, b"r:id").expect("sldId without r:id");
                let rel = rels.get(&rel_id).expect("sldId points at a missing relationship");
                let part = resolve_target(PRESENTATION_PART, &rel.target);
                let xml = part_text(&package, &part);
                slides.push((part, xml));
            },
            Event::Eof => break,
            _ => {},
        }
    }
    slides
}

/// The `sldId/@id` values in order.
pub fn slide_ids(deck: &[u8]) -> Vec<u32> {
    let package = Package::open(deck).expect("Generated deck does not open");
    let presentation = part_text(&package, PRESENTATION_PART);
    let mut reader = Reader::from_str(&presentation);
    let mut ids = Vec::new();
    loop {
        match reader.read_event().expect("Presentation XML") {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"p:sldId" => {
                ids.push(attr(&e, b"id").and_then(|v| v.parse().ok()).expect("sldId/@id"));
            },
            Event::Eof => break,
            _ => {},
        }
    }
    ids
}

/// The layout part a slide is built on.
pub fn slide_layout(deck: &[u8], slide_part: &str) -> String {
    let package = Package::open(deck).expect("Generated deck does not open");
    let rels: Relationships = package.rels_of(slide_part).expect("Slide rels");
    let rel = rels.first_of_type("slideLayout").expect("Slide has no layout");
    resolve_target(slide_part, &rel.target)
}

/// A shape of a generated slide as the tests see it.
#[derive(Debug, Default, Clone)]
pub struct Shape {
    pub name: String,
    pub text_box: bool,
    /// `Some("title")`, `Some("obj")` for untyped placeholders, `None` for plain shapes.
    pub placeholder: Option<String>,
    /// Text of every paragraph that holds at least one run; `<a:br>` becomes `\n`.
    pub paragraphs: Vec<String>,
    /// Font sizes in hundredths of a point, one per run.
    pub run_sizes: Vec<u32>,
    pub run_bold: Vec<bool>,
    pub offset: Option<(i64, i64)>,
}

pub fn shapes(slide_xml: &str) -> Vec<Shape> {
    let mut reader = Reader::from_str(slide_xml);
    let mut shapes = Vec::new();
    let mut current: Option<Shape> = None;
    let mut paragraph: Option<(String, bool)> = None;
    let mut in_text = false;

    loop {
        let event = reader.read_event().expect("Slide XML");
        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"sp" if !empty => current = Some(Shape::default()),
                    b"cNvPr" => {
                        if let Some(shape) = current.as_mut() {
                            shape.name = attr(e, b"name").unwrap_or_default();
                        }
                    },
                    b"cNvSpPr" => {
                        if let Some(shape) = current.as_mut() {
                            shape.text_box = attr(e, b"txBox").as_deref() == Some("1");
                        }
                    },
                    b"ph" => {
                        if let Some(shape) = current.as_mut() {
                            shape.placeholder = Some(attr(e, b"type").unwrap_or_else(|| "obj".to_string()));
                        }
                    },
                    b"off" => {
                        if let Some(shape) = current.as_mut() {
                            let x = attr(e, b"x").and_then(|v| v.parse().ok()).unwrap_or_default();
                            let y = attr(e, b"y").and_then(|v| v.parse().ok()).unwrap_or_default();
                            shape.offset = Some((x, y));
                        }
                    },
                    b"p" if !empty => paragraph = Some((String::new(), false)),
                    b"r" => {
                        if let Some((_, has_run)) = paragraph.as_mut() {
                            *has_run = true;
                        }
                    },
                    b"rPr" => {
                        if let Some(shape) = current.as_mut() {
                            shape.run_sizes.push(attr(e, b"sz").and_then(|v| v.parse().ok()).unwrap_or_default());
                            shape.run_bold.push(attr(e, b"b").as_deref() == Some("1"));
                        }
                    },
                    b"br" => {
                        if let Some((text, _)) = paragraph.as_mut() {
                            text.push('\n');
                        }
                    },
                    b"t" if !empty => in_text = true,
                    _ => {},
                }
            },
            Event::Text(t) if in_text => {
                if let Some((text, _)) = paragraph.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&**t));
                }
            },
            Event::GeneralRef(r) if in_text => {
                if let Some((text, _)) = paragraph.as_mut() {
                    text.push_str(match &**r {
                        b"amp" => "&",
                        b"lt" => "<",
                        b"gt" => ">",
                        b"quot" => "\"",
                        b"apos" => "'",
                        _ => "",
                    });
                }
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let (Some((text, true)), Some(shape)) = (paragraph.take(), current.as_mut()) {
                        shape.paragraphs.push(text);
                    }
                },
                b"sp" => {
                    if let Some(shape) = current.take() {
                        shapes.push(shape);
                    }
                },
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
    }
    shapes
}

pub fn text_boxes(slide_xml: &str) -> Vec<Shape> {
    shapes(slide_xml).into_iter().filter(|s| s.text_box).collect()
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}
