//! Reader for the legacy schematic dialect.
//!
//! Blocks are flat numeric id/data byte arrays in x -> z -> y order. The
//! dialect predates biome storage, so decoded clipboards keep the default
//! biome grid. Read-only: writes always use the modern dialect.

use super::{malformed, require, require_dimension};
use crate::clipboard::{Clipboard, Schematic};
use lodestone_common::block::BlockState;
use lodestone_common::types::Result;
use lodestone_nbt::Tag;

const DIALECT: &str = "legacy";

pub fn read(root: &Tag) -> Result<Schematic> {
    let entries = root
        .as_compound()
        .ok_or_else(|| malformed(DIALECT, "root is not a compound".to_owned()))?;

    if let Some(materials) = entries.get("Materials").and_then(|t| t.as_string()) {
        if materials != "Alpha" && materials != "Classic" {
            return Err(malformed(
                DIALECT,
                format!("unknown materials table {:?}", materials),
            ));
        }
    }

    let width = require_dimension(entries, DIALECT, "Width")?;
    let height = require_dimension(entries, DIALECT, "Height")?;
    let length = require_dimension(entries, DIALECT, "Length")?;
    let volume = width as usize * height as usize * length as usize;

    let blocks = require(entries, DIALECT, "Blocks")?
        .as_byte_array()
        .ok_or_else(|| malformed(DIALECT, "Blocks is not a byte array".to_owned()))?;
    let data = require(entries, DIALECT, "Data")?
        .as_byte_array()
        .ok_or_else(|| malformed(DIALECT, "Data is not a byte array".to_owned()))?;

    if blocks.len() != volume {
        return Err(malformed(
            DIALECT,
            format!("Blocks holds {} cells, dimensions need {}", blocks.len(), volume),
        ));
    }
    if data.len() != volume {
        return Err(malformed(
            DIALECT,
            format!("Data holds {} cells, dimensions need {}", data.len(), volume),
        ));
    }

    let mut clipboard = Clipboard::new(width, height, length);
    let (width, length) = (width as usize, length as usize);
    for cell in 0..volume {
        let x = cell % width;
        let z = (cell / width) % length;
        let y = cell / (width * length);
        clipboard.set_block(
            x,
            y,
            z,
            BlockState::from_legacy(blocks[cell] as u8, data[cell] as u8),
        );
    }

    Ok(Schematic::new(clipboard))
}
