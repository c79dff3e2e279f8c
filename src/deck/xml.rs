//! Small quick-xml helpers shared by the package readers and writers.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::BytesStart;

use super::DeckError;

pub(crate) const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Escape text or attribute content.
pub(crate) fn escape(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}

/// Decoded value of the attribute whose qualified name is `key` (e.g. `b"r:id"`).
pub(crate) fn attr<R>(reader: &Reader<R>, e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.decode_and_unescape_value(reader.decoder()).ok())
        .map(|v| v.into_owned())
}

/// Decoded value of the attribute whose local name is `local`, ignoring its prefix.
pub(crate) fn attr_local<R>(reader: &Reader<R>, e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.decode_and_unescape_value(reader.decoder()).ok())
        .map(|v| v.into_owned())
}

/// The relationship reference of an element (`r:id` under whatever prefix the part binds).
pub(crate) fn rel_id<R>(reader: &Reader<R>, e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.prefix().is_some() && a.key.local_name().as_ref() == b"id")
        .and_then(|a| a.decode_and_unescape_value(reader.decoder()).ok())
        .map(|v| v.into_owned())
}

/// Map a parse failure in `part` to a template load error.
pub(crate) fn load_err(part: &str, e: impl std::fmt::Display) -> DeckError {
    DeckError::TemplateLoad(format!("{part}: {e}"))
}

/// Map a write failure in `part` to a serialization error.
pub(crate) fn write_err(part: &str, e: impl std::fmt::Display) -> DeckError {
    DeckError::Serialization(format!("{part}: {e}"))
}
