pub mod legacy;
pub mod modern;

use crate::clipboard::Schematic;
use lodestone_common::error::LodestoneError;
use lodestone_common::types::Result;
use lodestone_nbt::{IndexMap, Tag};
use std::io::Cursor;

/// One of the two mutually incompatible schematic encodings.
///
/// Legacy files predate the modern dialect and both remain in circulation;
/// reads accept either, writes always produce Modern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Modern,
    Legacy,
}

/// Determines which dialect a byte stream is, from its structure alone.
///
/// The root compound is decoded once and classified by the keys it carries;
/// a reader failure is never used as the selection mechanism, so a corrupt
/// stream reports as unsupported instead of silently selecting a dialect.
pub fn identify(bytes: &[u8]) -> Result<Dialect> {
    let (_, root) = decode_root(bytes)?;
    classify(&root).ok_or_else(unsupported_shape)
}

/// Decodes a schematic byte stream into a normalized clipboard, regardless of
/// which dialect produced it.
pub fn read_schematic(bytes: &[u8]) -> Result<Schematic> {
    let (_, root) = decode_root(bytes)?;
    match classify(&root) {
        Some(Dialect::Modern) => modern::read(&root),
        Some(Dialect::Legacy) => legacy::read(&root),
        None => Err(unsupported_shape()),
    }
}

fn decode_root(bytes: &[u8]) -> Result<(String, Tag)> {
    Tag::read_named_gzip(&mut Cursor::new(bytes)).map_err(|e| {
        LodestoneError::UnsupportedFormat(format!("not a gzip-compressed tag stream: {}", e))
    })
}

fn classify(root: &Tag) -> Option<Dialect> {
    let entries = root.as_compound()?;
    if entries.contains_key("Palette") && entries.contains_key("BlockData") {
        return Some(Dialect::Modern);
    }
    if entries.contains_key("Blocks") && entries.contains_key("Data") {
        return Some(Dialect::Legacy);
    }
    None
}

fn unsupported_shape() -> LodestoneError {
    LodestoneError::UnsupportedFormat(
        "this schematic format is not recognised or supported".to_owned(),
    )
}

pub(crate) fn malformed(dialect: &str, reason: String) -> LodestoneError {
    LodestoneError::UnsupportedFormat(format!("malformed {} schematic: {}", dialect, reason))
}

pub(crate) fn require<'a>(
    entries: &'a IndexMap<String, Tag>,
    dialect: &str,
    key: &str,
) -> Result<&'a Tag> {
    entries
        .get(key)
        .ok_or_else(|| malformed(dialect, format!("missing {}", key)))
}

pub(crate) fn require_dimension(
    entries: &IndexMap<String, Tag>,
    dialect: &str,
    key: &str,
) -> Result<u16> {
    let raw = require(entries, dialect, key)?
        .as_i16()
        .ok_or_else(|| malformed(dialect, format!("{} is not a short", key)))?;
    if raw < 0 {
        return Err(malformed(dialect, format!("{} is negative", key)));
    }
    Ok(raw as u16)
}
