//! OPC relationship parts (`_rels/*.rels`) and part-name arithmetic.

use std::fmt::Write as FmtWrite;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::DeckError;
use super::xml::{XML_DECL, attr, escape, load_err};

const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub const RT_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const RT_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

/// True when `rel_type` ends in `/suffix`, so both transitional and strict URIs match.
pub fn is_type(rel_type: &str, suffix: &str) -> bool {
    rel_type
        .rsplit_once('/')
        .is_some_and(|(_, last)| last == suffix)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// The relationships of one source part, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn parse(part: &str, xml: &[u8]) -> Result<Self, DeckError> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Vec::new();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let id = attr(&reader, &e, b"Id").unwrap_or_default();
                        let rel_type = attr(&reader, &e, b"Type").unwrap_or_default();
                        let target = attr(&reader, &e, b"Target").unwrap_or_default();
                        let external = attr(&reader, &e, b"TargetMode").as_deref() == Some("External");
                        rels.push(Relationship { id, rel_type, target, external });
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(load_err(part, e)),
                _ => {},
            }
            buf.clear();
        }

        Ok(Self { rels })
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(128 + self.rels.len() * 160);
        xml.push_str(XML_DECL);
        let _ = write!(xml, r#"<Relationships xmlns="{RELS_NS}">"#);
        for rel in &self.rels {
            let _ = write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape(&rel.id),
                escape(&rel.rel_type),
                escape(&rel.target)
            );
            if rel.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.id == id)
    }

    pub fn first_of_type(&self, suffix: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| is_type(&r.rel_type, suffix))
    }

    /// Add an internal relationship under the lowest free `rIdN` and return that id.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = (1..)
            .map(|n| format!("rId{n}"))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or_default();
        self.rels.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.rels.iter().position(|r| r.id == id)?;
        Some(self.rels.remove(pos))
    }
}

/// Part names are stored without a leading slash: `ppt/slides/slide1.xml`.
/// The package itself is the empty string.
pub fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, name)) => format!("{dir}/_rels/{name}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

fn dir_of(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve a relationship target against its source part into a package part name.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let target = target.split(['#', '?']).next().unwrap_or(target);
    let base = match target.strip_prefix('/') {
        Some(_) => Vec::new(),
        None => dir_of(source_part).split('/').filter(|s| !s.is_empty()).collect(),
    };
    normalize_segments(base, target.trim_start_matches('/')).join("/")
}

fn normalize_segments<'a>(mut segments: Vec<&'a str>, path: &'a str) -> Vec<&'a str> {
    for segment in path.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }
    segments
}

/// Relative reference from `source_part` to `target_part`, as written in a `.rels` Target.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let from: Vec<&str> = dir_of(source_part).split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = target_part.split('/').collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count()
        .min(to.len().saturating_sub(1));

    let mut out: Vec<&str> = std::iter::repeat_n("..", from.len() - common).collect();
    out.extend_from_slice(&to[common..]);
    out.join("/")
}
