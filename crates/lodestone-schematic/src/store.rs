//! File persistence for schematics: a configured directory of `.schem` /
//! `.schematic` files, gzip-compressed tag streams inside.

use crate::clipboard::Schematic;
use crate::format;
use lodestone_common::error::LodestoneError;
use lodestone_common::types::Result;
use lodestone_logger::log::log;
use lodestone_logger::severity::LogSeverity::Error;
use lodestone_nbt::Tag;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Name of the root tag in every persisted schematic.
pub const ROOT_TAG_NAME: &str = "Schematic";

pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["schem", "schematic"];

pub fn has_accepted_extension(name: &str) -> bool {
    ACCEPTED_EXTENSIONS
        .iter()
        .any(|ext| name.len() > ext.len() + 1 && name.ends_with(ext) && name[..name.len() - ext.len()].ends_with('.'))
}

/// Resolves a schematic name inside a directory, defaulting the extension.
pub fn resolve_named(dir: &Path, name: &str) -> PathBuf {
    if has_accepted_extension(name) {
        dir.join(name)
    } else {
        dir.join(format!("{}.schem", name))
    }
}

/// Writes a tag as a gzip stream at the given path, creating parent
/// directories and overwriting any existing file.
pub fn write_tag(path: &Path, tag: &Tag) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    tag.write_named_gzip(&mut writer, ROOT_TAG_NAME)?;
    writer.flush()
}

/// Loads a schematic file. A missing file and an unreadable file both come
/// back as `None` (the latter after logging); an unrecognised format is a
/// checked failure.
pub fn load_file(path: &Path) -> Result<Option<Schematic>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log(format!("failed to read {}: {}", path.display(), e), Error);
            return Ok(None);
        }
    };
    match format::read_schematic(&bytes) {
        Ok(schematic) => Ok(Some(schematic)),
        Err(err @ LodestoneError::UnsupportedFormat(_)) => Err(err),
        Err(e) => {
            log(format!("failed to decode {}: {}", path.display(), e), Error);
            Ok(None)
        }
    }
}

/// Resolves a name inside the schematics directory and loads it, creating
/// the directory on first use.
pub fn load_named(dir: &Path, name: &str) -> Result<Option<Schematic>> {
    fs::create_dir_all(dir)?;
    load_file(&resolve_named(dir, name))
}

/// Names of every schematic file in the directory, sorted.
pub fn schematic_names(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            if let Some(name) = entry.file_name().to_str() {
                if has_accepted_extension(name) {
                    names.push(name.to_owned());
                }
            }
        }
    }
    names.sort();
    names
}
