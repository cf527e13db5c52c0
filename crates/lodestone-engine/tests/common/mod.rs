use lodestone_common::block::{Biome, BlockState};
use lodestone_engine::{BlockQueue, BlockSource};
use lodestone_nbt::Tag;
use std::collections::HashMap;

/// World backed by a map of explicitly placed blocks; everything else is air.
pub struct MemoryWorld {
    blocks: HashMap<(i32, i32, i32), BlockState>,
    biome: Biome,
}

impl MemoryWorld {
    pub fn new() -> Self {
        MemoryWorld {
            blocks: HashMap::new(),
            biome: Biome::new("minecraft:savanna"),
        }
    }

    pub fn place(&mut self, x: i32, y: i32, z: i32, name: &str) {
        self.blocks.insert((x, y, z), BlockState::new(name));
    }
}

impl BlockSource for MemoryWorld {
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockState {
        self.blocks
            .get(&(x, y, z))
            .cloned()
            .unwrap_or_else(BlockState::air)
    }

    fn biome_at(&self, _x: i32, _z: i32) -> Biome {
        self.biome.clone()
    }

    fn highest_block_at(&self, x: i32, z: i32) -> i32 {
        self.blocks
            .keys()
            .filter(|&&(bx, _, bz)| bx == x && bz == z)
            .map(|&(_, y, _)| y)
            .max()
            .unwrap_or(0)
    }
}

/// Queue that records every write instead of applying it.
#[derive(Default)]
pub struct RecordingQueue {
    pub blocks: Vec<(i32, i32, i32, String)>,
    pub biomes: Vec<(i32, i32, String)>,
    pub tiles: Vec<(i32, i32, i32, Tag)>,
    pub flushes: usize,
}

impl RecordingQueue {
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Option<&str> {
        self.blocks
            .iter()
            .find(|&&(bx, by, bz, _)| (bx, by, bz) == (x, y, z))
            .map(|(_, _, _, name)| name.as_str())
    }
}

impl BlockQueue for RecordingQueue {
    fn set_block(&mut self, x: i32, y: i32, z: i32, block: &BlockState) {
        self.blocks.push((x, y, z, block.as_str().to_owned()));
    }

    fn set_biome(&mut self, x: i32, z: i32, biome: &Biome) {
        self.biomes.push((x, z, biome.as_str().to_owned()));
    }

    fn set_tile(&mut self, x: i32, y: i32, z: i32, tag: Tag) {
        self.tiles.push((x, y, z, tag));
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}
