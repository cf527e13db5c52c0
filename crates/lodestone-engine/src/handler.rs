use crate::chunk_task::DEFAULT_THROTTLE;
use crate::paste::paste_into;
use crate::queue::BlockQueue;
use crate::source::{BlockSource, PasteTarget};
use async_trait::async_trait;
use lodestone_common::types::{BlockPos, CuboidRegion, WORLD_HEIGHT};
use lodestone_logger::log::log;
use lodestone_logger::severity::LogSeverity::Error;
use lodestone_nbt::Tag;
use lodestone_schematic::format::modern;
use lodestone_schematic::store;
use lodestone_schematic::{Clipboard, Schematic};
use std::path::Path;

/// Capability set for schematic work against one world. Constructed once at
/// process start and passed to callers explicitly.
#[async_trait]
pub trait SchematicHandler: Send + Sync {
    /// Pastes a schematic into the destination region at the given offset.
    /// The outcome is reported through the return value; a failed validation
    /// issues no writes.
    async fn paste(
        &self,
        schematic: &Schematic,
        target: &PasteTarget,
        offset: BlockPos,
        auto_height: bool,
        queue: &mut dyn BlockQueue,
    ) -> bool;

    /// Captures the region's bounding cuboid as a compound tag. `None` when
    /// the region holds nothing worth exporting.
    async fn capture(&self, region: &CuboidRegion) -> Option<Tag>;

    /// Persists a tag as a schematic file, creating parent directories and
    /// overwriting an existing file. Failures are logged, not raised.
    async fn save(&self, tag: &Tag, path: &Path) -> bool;

    /// Re-anchors a tile-entity compound at the given coordinates and queues
    /// it. Non-compound input is rejected.
    fn restore_tile(&self, queue: &mut dyn BlockQueue, tag: &Tag, x: i32, y: i32, z: i32) -> bool;
}

/// The one concrete handler, reading world state through an injected
/// `BlockSource`.
pub struct WorldSchematicHandler<S> {
    source: S,
    throttle: usize,
}

impl<S: BlockSource> WorldSchematicHandler<S> {
    pub fn new(source: S) -> Self {
        Self::with_throttle(source, DEFAULT_THROTTLE)
    }

    /// Overrides how many chunk slices a paste processes per scheduling
    /// quantum.
    pub fn with_throttle(source: S, throttle: usize) -> Self {
        WorldSchematicHandler { source, throttle }
    }
}

#[async_trait]
impl<S: BlockSource> SchematicHandler for WorldSchematicHandler<S> {
    async fn paste(
        &self,
        schematic: &Schematic,
        target: &PasteTarget,
        offset: BlockPos,
        auto_height: bool,
        queue: &mut dyn BlockQueue,
    ) -> bool {
        paste_into(
            schematic,
            target,
            offset,
            auto_height,
            self.throttle,
            &self.source,
            queue,
        )
        .await
    }

    async fn capture(&self, region: &CuboidRegion) -> Option<Tag> {
        let width = region.width();
        let height = region.height().min(WORLD_HEIGHT);
        let length = region.length();
        if width > u16::MAX as i32 || length > u16::MAX as i32 {
            return None;
        }

        let mut clipboard = Clipboard::new(width as u16, height as u16, length as u16);
        for y in 0..height {
            for z in 0..length {
                for x in 0..width {
                    let block = self.source.block_at(
                        region.min.x + x,
                        region.min.y + y,
                        region.min.z + z,
                    );
                    clipboard.set_block(x as usize, y as usize, z as usize, block);
                }
            }
        }
        for z in 0..length {
            for x in 0..width {
                let biome = self.source.biome_at(region.min.x + x, region.min.z + z);
                clipboard.set_biome(x as usize, z as usize, biome);
            }
        }

        if clipboard.is_empty() {
            return None;
        }
        Some(modern::write(&clipboard))
    }

    async fn save(&self, tag: &Tag, path: &Path) -> bool {
        match store::write_tag(path, tag) {
            Ok(()) => true,
            Err(e) => {
                log(format!("failed to save {}: {}", path.display(), e), Error);
                false
            }
        }
    }

    fn restore_tile(&self, queue: &mut dyn BlockQueue, tag: &Tag, x: i32, y: i32, z: i32) -> bool {
        if tag.as_compound().is_none() {
            return false;
        }
        let mut anchored = tag.clone();
        if let Tag::Compound(entries) = &mut anchored {
            entries.insert("x".to_owned(), Tag::Int(x));
            entries.insert("y".to_owned(), Tag::Int(y));
            entries.insert("z".to_owned(), Tag::Int(z));
        }
        queue.set_tile(x, y, z, anchored);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestone_common::block::{Biome, BlockState};
    use lodestone_nbt::IndexMap;

    struct SingleBlockWorld;

    impl BlockSource for SingleBlockWorld {
        fn block_at(&self, x: i32, y: i32, z: i32) -> BlockState {
            if (x, y, z) == (1, 0, 1) {
                BlockState::new("minecraft:gold_block")
            } else {
                BlockState::air()
            }
        }

        fn biome_at(&self, _x: i32, _z: i32) -> Biome {
            Biome::new("minecraft:desert")
        }

        fn highest_block_at(&self, _x: i32, _z: i32) -> i32 {
            0
        }
    }

    struct EmptyWorld;

    impl BlockSource for EmptyWorld {
        fn block_at(&self, _x: i32, _y: i32, _z: i32) -> BlockState {
            BlockState::air()
        }

        fn biome_at(&self, _x: i32, _z: i32) -> Biome {
            Biome::default()
        }

        fn highest_block_at(&self, _x: i32, _z: i32) -> i32 {
            0
        }
    }

    #[derive(Default)]
    struct TileRecorder {
        tiles: Vec<(i32, i32, i32, Tag)>,
    }

    impl BlockQueue for TileRecorder {
        fn set_block(&mut self, _x: i32, _y: i32, _z: i32, _block: &BlockState) {}
        fn set_biome(&mut self, _x: i32, _z: i32, _biome: &Biome) {}
        fn set_tile(&mut self, x: i32, y: i32, z: i32, tag: Tag) {
            self.tiles.push((x, y, z, tag));
        }
        fn flush(&mut self) {}
    }

    #[test]
    fn capture_reads_blocks_and_biomes_from_the_source() {
        let handler = WorldSchematicHandler::new(SingleBlockWorld);
        let region = CuboidRegion::new(BlockPos::new(0, 0, 0), BlockPos::new(2, 1, 2));

        let tag = tokio_test::block_on(handler.capture(&region)).expect("occupied region");
        let entries = tag.as_compound().unwrap();
        assert_eq!(entries.get("Width"), Some(&Tag::Short(3)));
        assert_eq!(entries.get("Height"), Some(&Tag::Short(2)));
        assert_eq!(entries.get("Length"), Some(&Tag::Short(3)));

        let palette = entries.get("Palette").unwrap().as_compound().unwrap();
        assert!(palette.contains_key("minecraft:gold_block"));
        let biome_palette = entries.get("BiomePalette").unwrap().as_compound().unwrap();
        assert!(biome_palette.contains_key("minecraft:desert"));
    }

    #[test]
    fn capturing_an_empty_region_yields_nothing() {
        let handler = WorldSchematicHandler::new(EmptyWorld);
        let region = CuboidRegion::new(BlockPos::new(0, 0, 0), BlockPos::new(4, 4, 4));
        assert!(tokio_test::block_on(handler.capture(&region)).is_none());
    }

    #[test]
    fn restore_tile_re_anchors_the_compound() {
        let handler = WorldSchematicHandler::new(EmptyWorld);
        let mut queue = TileRecorder::default();

        let mut entries = IndexMap::new();
        entries.insert("id".to_owned(), Tag::String("minecraft:chest".to_owned()));
        entries.insert("x".to_owned(), Tag::Int(-7));
        entries.insert("y".to_owned(), Tag::Int(3));
        entries.insert("z".to_owned(), Tag::Int(12));
        let tag = Tag::Compound(entries);

        assert!(handler.restore_tile(&mut queue, &tag, 100, 64, -20));
        let (x, y, z, anchored) = &queue.tiles[0];
        assert_eq!((*x, *y, *z), (100, 64, -20));
        let anchored = anchored.as_compound().unwrap();
        assert_eq!(anchored.get("x"), Some(&Tag::Int(100)));
        assert_eq!(anchored.get("y"), Some(&Tag::Int(64)));
        assert_eq!(anchored.get("z"), Some(&Tag::Int(-20)));
        assert_eq!(
            anchored.get("id"),
            Some(&Tag::String("minecraft:chest".to_owned()))
        );
    }

    #[test]
    fn restore_tile_rejects_non_compounds() {
        let handler = WorldSchematicHandler::new(EmptyWorld);
        let mut queue = TileRecorder::default();
        assert!(!handler.restore_tile(&mut queue, &Tag::Int(1), 0, 0, 0));
        assert!(queue.tiles.is_empty());
    }
}
