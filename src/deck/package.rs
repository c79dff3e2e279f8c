//! In-memory OPC package: every zip entry held as bytes, keyed by part name.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::DeckError;
use super::content_types::{CONTENT_TYPES_PART, ContentTypes};
use super::rels::{Relationships, rels_part_for, resolve_target};
use super::xml::{load_err, write_err};

/// Package-level relationships live at `_rels/.rels`; the package source is the empty name.
pub const PACKAGE_SOURCE: &str = "";

/// Largest inflated size accepted for a single part.
pub const MAX_PART_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    /// Read every file entry of a zip container.
    pub fn open(bytes: &[u8]) -> Result<Self, DeckError> {
        Self::open_with_limit(bytes, MAX_PART_BYTES)
    }

    /// Sizes recorded in the archive are not trusted; each entry is read up to `limit` bytes.
    fn open_with_limit(bytes: &[u8], limit: u64) -> Result<Self, DeckError> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| load_err("zip container", e))?;

        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| load_err("zip entry", e))?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().trim_start_matches('/').to_string();
            let mut data = Vec::new();
            (&mut entry)
                .take(limit + 1)
                .read_to_end(&mut data)
                .map_err(|e| load_err(&name, e))?;
            if data.len() as u64 > limit {
                return Err(load_err(&name, format!("part larger than {limit} bytes")));
            }
            parts.insert(name, data);
        }

        let package = Self { parts };
        package.require(CONTENT_TYPES_PART)?;
        package.require(&rels_part_for(PACKAGE_SOURCE))?;
        Ok(package)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    /// Like [`part`](Self::part) but a missing part is a template error.
    pub fn require(&self, name: &str) -> Result<&[u8], DeckError> {
        self.part(name)
            .ok_or_else(|| DeckError::TemplateLoad(format!("missing part {name}")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.parts.insert(name.into(), data);
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.parts.remove(name)
    }

    /// Relationships of `source`; a part without a rels part has none.
    pub fn rels_of(&self, source: &str) -> Result<Relationships, DeckError> {
        let rels_part = rels_part_for(source);
        match self.part(&rels_part) {
            Some(xml) => Relationships::parse(&rels_part, xml),
            None => Ok(Relationships::default()),
        }
    }

    /// Parts reachable from the package relationships through internal relationships.
    pub fn reachable_parts(&self) -> Result<BTreeSet<String>, DeckError> {
        let mut seen = BTreeSet::new();
        let mut pending = vec![PACKAGE_SOURCE.to_string()];

        while let Some(source) = pending.pop() {
            for rel in self.rels_of(&source)?.iter().filter(|r| !r.external) {
                let target = resolve_target(&source, &rel.target);
                if self.contains(&target) && seen.insert(target.clone()) {
                    pending.push(target);
                }
            }
        }

        Ok(seen)
    }

    /// Serialize to zip bytes. Only reachable parts (and their rels) are written, so parts
    /// orphaned by relationship removal disappear along with their content-type overrides.
    pub fn write(&self, content_types: &ContentTypes) -> Result<Vec<u8>, DeckError> {
        let reachable = self.reachable_parts().map_err(|e| write_err("relationships", e))?;

        let mut names: Vec<&str> = vec![CONTENT_TYPES_PART];
        let package_rels = rels_part_for(PACKAGE_SOURCE);
        let mut rels_names = vec![package_rels];
        for part in &reachable {
            let rels = rels_part_for(part);
            if self.contains(&rels) {
                rels_names.push(rels);
            }
        }
        names.extend(rels_names.iter().map(String::as_str));
        names.extend(reachable.iter().map(String::as_str));

        let content_types_xml = content_types.to_xml(|part| reachable.contains(part));

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for name in names {
            let data = if name == CONTENT_TYPES_PART {
                content_types_xml.as_bytes()
            } else {
                self.require(name).map_err(|e| write_err(name, e))?
            };
            zip.start_file(name, options).map_err(|e| write_err(name, e))?;
            zip.write_all(data).map_err(|e| write_err(name, e))?;
        }

        let cursor = zip.finish().map_err(|e| write_err("zip container", e))?;
        log::debug!("Wrote package with {} parts", reachable.len());
        Ok(cursor.into_inner())
    }
}
