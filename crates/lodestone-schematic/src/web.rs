//! Byte payloads exchanged with the schematic web service. The transport
//! itself lives outside this crate; only the payloads are built and parsed
//! here.

use crate::store::ROOT_TAG_NAME;
use lodestone_common::error::LodestoneError;
use lodestone_common::types::Result;
use lodestone_logger::log::log;
use lodestone_logger::severity::LogSeverity::Error;
use lodestone_nbt::Tag;
use std::io;
use uuid::Uuid;

/// Query string for the list endpoint of one owner's saves.
pub fn list_query(owner: &Uuid) -> String {
    format!("list.php?{}", owner)
}

/// Parses the list endpoint's response: a JSON array of schematic names.
pub fn parse_save_list(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| {
        log(format!("failed to parse saves list: {} | {}", e, raw), Error);
        LodestoneError::Io(io::Error::new(io::ErrorKind::InvalidData, e))
    })
}

/// Builds the gzip-compressed tag stream the upload endpoint accepts.
/// An empty tag has nothing to upload and is rejected.
pub fn upload_payload(tag: &Tag) -> Result<Vec<u8>> {
    let empty = tag.as_compound().map(|c| c.is_empty()).unwrap_or(true);
    if empty {
        return Err(LodestoneError::Validation(
            "cannot upload an empty tag".to_owned(),
        ));
    }
    let mut payload = Vec::new();
    tag.write_named_gzip(&mut payload, ROOT_TAG_NAME)?;
    Ok(payload)
}
