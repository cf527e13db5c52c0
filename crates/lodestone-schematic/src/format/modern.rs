//! Reader and writer for the modern, palette-backed schematic dialect.
//!
//! Block cells are varint indices into a palette compound, packed in
//! x -> z -> y order. Biomes use the same scheme over the horizontal plane.

use super::{malformed, require, require_dimension};
use crate::clipboard::{Clipboard, Schematic};
use lodestone_common::block::{Biome, BlockState};
use lodestone_common::types::Result;
use lodestone_nbt::{IndexMap, Tag};

const DIALECT: &str = "modern";
const VERSION: i32 = 2;
const DATA_VERSION: i32 = 2230;

pub fn read(root: &Tag) -> Result<Schematic> {
    let entries = root
        .as_compound()
        .ok_or_else(|| malformed(DIALECT, "root is not a compound".to_owned()))?;

    let width = require_dimension(entries, DIALECT, "Width")?;
    let height = require_dimension(entries, DIALECT, "Height")?;
    let length = require_dimension(entries, DIALECT, "Length")?;

    let palette = read_palette(require(entries, DIALECT, "Palette")?, "Palette")?;
    let data = require(entries, DIALECT, "BlockData")?
        .as_byte_array()
        .ok_or_else(|| malformed(DIALECT, "BlockData is not a byte array".to_owned()))?;

    let mut clipboard = Clipboard::new(width, height, length);
    let volume = width as usize * height as usize * length as usize;
    let indices = unpack_varints(data, volume, "BlockData")?;

    let (width, length) = (width as usize, length as usize);
    for (cell, index) in indices.into_iter().enumerate() {
        let name = palette
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| malformed(DIALECT, format!("block index {} not in palette", index)))?;
        let x = cell % width;
        let z = (cell / width) % length;
        let y = cell / (width * length);
        clipboard.set_block(x, y, z, BlockState::new(name.clone()));
    }

    read_biomes(entries, &mut clipboard, width, length)?;

    Ok(Schematic::new(clipboard))
}

fn read_biomes(
    entries: &IndexMap<String, Tag>,
    clipboard: &mut Clipboard,
    width: usize,
    length: usize,
) -> Result<()> {
    let (palette_tag, data_tag) = match (entries.get("BiomePalette"), entries.get("BiomeData")) {
        (Some(palette), Some(data)) => (palette, data),
        // Biomes are optional; the grid keeps its defaults.
        _ => return Ok(()),
    };

    let palette = read_palette(palette_tag, "BiomePalette")?;
    let data = data_tag
        .as_byte_array()
        .ok_or_else(|| malformed(DIALECT, "BiomeData is not a byte array".to_owned()))?;
    let indices = unpack_varints(data, width * length, "BiomeData")?;

    for (cell, index) in indices.into_iter().enumerate() {
        let name = palette
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| malformed(DIALECT, format!("biome index {} not in palette", index)))?;
        clipboard.set_biome(cell % width, cell / width, Biome::new(name.clone()));
    }
    Ok(())
}

/// Inverts a palette compound (name -> index) into an index -> name table.
fn read_palette(tag: &Tag, key: &str) -> Result<Vec<Option<String>>> {
    let entries = tag
        .as_compound()
        .ok_or_else(|| malformed(DIALECT, format!("{} is not a compound", key)))?;

    let mut by_index: Vec<Option<String>> = vec![None; entries.len()];
    for (name, value) in entries {
        let index = value
            .as_i32()
            .ok_or_else(|| malformed(DIALECT, format!("{} entry {} is not an int", key, name)))?;
        if index < 0 || index as usize >= by_index.len() {
            return Err(malformed(
                DIALECT,
                format!("{} entry {} has index {} out of range", key, name, index),
            ));
        }
        by_index[index as usize] = Some(name.clone());
    }
    Ok(by_index)
}

/// Encodes a clipboard as a modern-dialect compound, ready for the tag codec.
pub fn write(clipboard: &Clipboard) -> Tag {
    let (width, height, length) = clipboard.dimensions();

    let mut palette: IndexMap<String, Tag> = IndexMap::new();
    let mut data = Vec::new();
    for y in 0..height as usize {
        for z in 0..length as usize {
            for x in 0..width as usize {
                let block = clipboard
                    .full_block(x, y, z)
                    .expect("clipboard cell inside its own dimensions");
                let index = intern(&mut palette, block.as_str());
                pack_varint(&mut data, index);
            }
        }
    }

    let mut biome_palette: IndexMap<String, Tag> = IndexMap::new();
    let mut biome_data = Vec::new();
    for z in 0..length as usize {
        for x in 0..width as usize {
            let biome = clipboard
                .biome(x, z)
                .expect("clipboard column inside its own dimensions");
            let index = intern(&mut biome_palette, biome.as_str());
            pack_varint(&mut biome_data, index);
        }
    }

    let mut entries = IndexMap::new();
    entries.insert("Version".to_owned(), Tag::Int(VERSION));
    entries.insert("DataVersion".to_owned(), Tag::Int(DATA_VERSION));
    entries.insert("Width".to_owned(), Tag::Short(width as i16));
    entries.insert("Height".to_owned(), Tag::Short(height as i16));
    entries.insert("Length".to_owned(), Tag::Short(length as i16));
    entries.insert("PaletteMax".to_owned(), Tag::Int(palette.len() as i32));
    entries.insert("Palette".to_owned(), Tag::Compound(palette));
    entries.insert("BlockData".to_owned(), Tag::ByteArray(data));
    entries.insert("BiomePalette".to_owned(), Tag::Compound(biome_palette));
    entries.insert("BiomeData".to_owned(), Tag::ByteArray(biome_data));
    Tag::Compound(entries)
}

fn intern(palette: &mut IndexMap<String, Tag>, name: &str) -> u32 {
    if let Some(Tag::Int(index)) = palette.get(name) {
        return *index as u32;
    }
    let index = palette.len() as u32;
    palette.insert(name.to_owned(), Tag::Int(index as i32));
    index
}

fn pack_varint(out: &mut Vec<i8>, mut value: u32) {
    while (value & !0x7F) != 0 {
        out.push(((value & 0x7F) as u8 | 0x80) as i8);
        value >>= 7;
    }
    out.push(value as i8);
}

fn unpack_varints(data: &[i8], expected: usize, key: &str) -> Result<Vec<u32>> {
    let mut values = Vec::with_capacity(expected);
    let mut bytes = data.iter().map(|&b| b as u8);
    while values.len() < expected {
        let mut value: u32 = 0;
        let mut shift = 0;
        loop {
            let byte = bytes
                .next()
                .ok_or_else(|| malformed(DIALECT, format!("{} ends mid-value", key)))?;
            value |= ((byte & 0x7F) as u32) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift > 28 {
                return Err(malformed(DIALECT, format!("{} value overflows", key)));
            }
        }
        values.push(value);
    }
    if bytes.next().is_some() {
        return Err(malformed(
            DIALECT,
            format!("{} holds more than {} values", key, expected),
        ));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lodestone_common::error::LodestoneError;

    fn checkered_clipboard() -> Clipboard {
        let mut clipboard = Clipboard::new(3, 2, 3);
        for y in 0..2 {
            for z in 0..3 {
                for x in 0..3 {
                    if (x + y + z) % 2 == 0 {
                        clipboard.set_block(x, y, z, BlockState::new("minecraft:stone"));
                    }
                }
            }
        }
        clipboard.set_biome(2, 2, Biome::new("minecraft:desert"));
        clipboard
    }

    #[test]
    fn write_then_read_preserves_every_cell() {
        let original = checkered_clipboard();
        let schematic = read(&write(&original)).unwrap();
        let decoded = schematic.clipboard();

        assert_eq!(decoded.dimensions(), original.dimensions());
        for y in 0..2 {
            for z in 0..3 {
                for x in 0..3 {
                    assert_eq!(decoded.full_block(x, y, z), original.full_block(x, y, z));
                }
            }
        }
        assert_eq!(decoded.biome(2, 2).unwrap().as_str(), "minecraft:desert");
        assert_eq!(decoded.biome(0, 0).unwrap(), &Biome::default());
    }

    #[test]
    fn palette_is_shared_across_identical_blocks() {
        let tag = write(&checkered_clipboard());
        let entries = tag.as_compound().unwrap();
        let palette = entries.get("Palette").unwrap().as_compound().unwrap();
        // Only air and stone appear, no matter how many cells hold them.
        assert_eq!(palette.len(), 2);
        assert_eq!(entries.get("PaletteMax"), Some(&Tag::Int(2)));
    }

    #[test]
    fn blocks_pack_in_x_z_y_order() {
        let mut clipboard = Clipboard::new(2, 1, 2);
        clipboard.set_block(1, 0, 0, BlockState::new("minecraft:stone"));
        let tag = write(&clipboard);
        let data = tag
            .as_compound()
            .unwrap()
            .get("BlockData")
            .unwrap()
            .as_byte_array()
            .unwrap();
        // Palette assigns air=0 first, stone=1 on the second cell.
        assert_eq!(data, &[0, 1, 0, 0]);
    }

    #[test]
    fn an_index_outside_the_palette_is_malformed() {
        let mut clipboard = Clipboard::new(1, 1, 1);
        clipboard.set_block(0, 0, 0, BlockState::new("minecraft:stone"));
        let tag = write(&clipboard);

        let mut entries = tag.as_compound().unwrap().clone();
        entries.insert("BlockData".to_owned(), Tag::ByteArray(vec![9]));
        let result = read(&Tag::Compound(entries));
        assert_matches!(result, Err(LodestoneError::UnsupportedFormat(_)));
    }

    #[test]
    fn truncated_block_data_is_malformed() {
        let tag = write(&checkered_clipboard());
        let mut entries = tag.as_compound().unwrap().clone();
        entries.insert("BlockData".to_owned(), Tag::ByteArray(vec![0, 0]));
        assert_matches!(
            read(&Tag::Compound(entries)),
            Err(LodestoneError::UnsupportedFormat(_))
        );
    }

    #[test]
    fn missing_dimension_is_malformed() {
        let tag = write(&checkered_clipboard());
        let mut entries = tag.as_compound().unwrap().clone();
        entries.shift_remove("Height");
        assert_matches!(
            read(&Tag::Compound(entries)),
            Err(LodestoneError::UnsupportedFormat(_))
        );
    }

    #[test]
    fn varints_round_trip_across_the_length_boundary() {
        let mut packed = Vec::new();
        for value in [0u32, 1, 127, 128, 300, 16383, 16384] {
            pack_varint(&mut packed, value);
        }
        let values = unpack_varints(&packed, 7, "BlockData").unwrap();
        assert_eq!(values, vec![0, 1, 127, 128, 300, 16383, 16384]);
    }
}
