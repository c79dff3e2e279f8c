//! Slide part XML: cloned layout placeholders and programmatic text boxes.

use std::fmt::Write as FmtWrite;

use super::layout::{Layout, Placeholder};
use super::xml::{XML_DECL, escape};

pub const EMU_PER_INCH: i64 = 914_400;

/// A shape rectangle in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    pub const fn inches(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x: x * EMU_PER_INCH,
            y: y * EMU_PER_INCH,
            cx: width * EMU_PER_INCH,
            cy: height * EMU_PER_INCH,
        }
    }
}

/// Title text box on content slides.
pub const TITLE_BOX: Rect = Rect::inches(1, 1, 8, 1);
/// Bullet text box on content slides, directly below the title box.
pub const BULLET_BOX: Rect = Rect::inches(1, 2, 8, 5);

/// Character formatting applied to every run written into a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStyle {
    pub size_pt: u32,
    pub bold: bool,
}

pub const TITLE_SLIDE_STYLE: RunStyle = RunStyle { size_pt: 36, bold: true };
pub const TITLE_BOX_STYLE: RunStyle = RunStyle { size_pt: 28, bold: true };
pub const BULLET_STYLE: RunStyle = RunStyle { size_pt: 20, bold: false };

const NS_DECLS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

/// Accumulates the shape tree of one new slide.
#[derive(Debug)]
pub struct SlideBuilder {
    shapes: String,
    next_id: u32,
}

impl Default for SlideBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SlideBuilder {
    pub fn new() -> Self {
        // id 1 is the group shape of the tree itself
        Self { shapes: String::new(), next_id: 2 }
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Copy the layout's placeholders onto the slide, empty. When `title` is given the first
    /// title placeholder receives it; returns whether one did.
    pub fn clone_placeholders(&mut self, layout: &Layout, title: Option<(&str, RunStyle)>) -> bool {
        let mut title = title;
        let mut placed = false;
        for placeholder in layout.placeholders.iter().filter(|p| p.is_cloneable()) {
            let text = if placeholder.is_title() { title.take() } else { None };
            placed |= text.is_some();
            self.placeholder(placeholder, text);
        }
        placed
    }

    fn placeholder(&mut self, placeholder: &Placeholder, text: Option<(&str, RunStyle)>) {
        let id = self.take_id();
        let name = if placeholder.name.is_empty() {
            format!("Placeholder {}", id - 1)
        } else {
            placeholder.name.clone()
        };

        let xml = &mut self.shapes;
        let _ = write!(
            xml,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph"#,
            escape(&name)
        );
        for (key, value) in [
            ("type", &placeholder.kind),
            ("orient", &placeholder.orient),
            ("sz", &placeholder.sz),
            ("idx", &placeholder.idx),
        ] {
            if let Some(value) = value {
                let _ = write!(xml, r#" {key}="{}""#, escape(value));
            }
        }
        xml.push_str("/></p:nvPr></p:nvSpPr><p:spPr/>");
        xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
        match text {
            Some((text, style)) => push_paragraph(xml, text, style),
            None => xml.push_str("<a:p/>"),
        }
        xml.push_str("</p:txBody></p:sp>");
    }

    /// Add a free-standing text box holding one paragraph per entry of `paragraphs`, each at
    /// level 0. Zero paragraphs still leave the single empty `<a:p>` a text body requires.
    pub fn text_box<'a, I>(&mut self, rect: Rect, paragraphs: I, style: RunStyle)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let id = self.take_id();
        let xml = &mut self.shapes;
        let _ = write!(
            xml,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            id - 1
        );
        let _ = write!(
            xml,
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
            rect.x, rect.y, rect.cx, rect.cy
        );
        xml.push_str(r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:noAutofit/></a:bodyPr><a:lstStyle/>"#);

        let mut wrote_any = false;
        for text in paragraphs {
            push_paragraph(xml, text, style);
            wrote_any = true;
        }
        if !wrote_any {
            let _ = write!(xml, r#"<a:p><a:endParaRPr lang="en-US" sz="{}" dirty="0"/></a:p>"#, style.size_pt * 100);
        }
        xml.push_str("</p:txBody></p:sp>");
    }

    /// The complete slide part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512 + self.shapes.len());
        xml.push_str(XML_DECL);
        let _ = write!(xml, "<p:sld {NS_DECLS}>");
        xml.push_str("<p:cSld><p:spTree>");
        xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
        xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);
        xml.push_str(&self.shapes);
        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        xml
    }
}

/// One `<a:p>`. Line feeds inside `text` become `<a:br>` breaks within the paragraph.
fn push_paragraph(xml: &mut String, text: &str, style: RunStyle) {
    let mut rpr = format!(r#"lang="en-US" sz="{}""#, style.size_pt * 100);
    if style.bold {
        rpr.push_str(r#" b="1""#);
    }
    rpr.push_str(r#" dirty="0""#);

    xml.push_str("<a:p>");
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            let _ = write!(xml, "<a:br><a:rPr {rpr}/></a:br>");
        }
        let line = xml_safe(line.trim_end_matches('\r'));
        let _ = write!(xml, "<a:r><a:rPr {rpr}/><a:t>{}</a:t></a:r>", escape(&line));
    }
    xml.push_str("</a:p>");
}

/// Drop control characters XML 1.0 cannot carry.
fn xml_safe(s: &str) -> String {
    s.chars().filter(|&c| c == '\t' || !c.is_control()).collect()
}
