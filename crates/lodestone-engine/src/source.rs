use lodestone_common::block::{Biome, BlockState};
use lodestone_common::types::CuboidRegion;

/// Read side of the world storage engine, used by capture and by
/// terrain-dependent height resolution.
pub trait BlockSource: Send + Sync {
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockState;

    fn biome_at(&self, x: i32, z: i32) -> Biome;

    /// Highest occupied layer of the column, 0 for an empty one.
    fn highest_block_at(&self, x: i32, z: i32) -> i32;
}

/// How the destination area's floor is determined when auto-height is
/// requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Floor {
    /// The area has a known fixed floor at this height.
    Fixed(i32),
    /// The floor follows the terrain; sample the world near the region's
    /// minimum corner.
    Terrain,
}

/// Destination of a paste: the region's bounding cuboid plus its floor rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasteTarget {
    pub region: CuboidRegion,
    pub floor: Floor,
}

impl PasteTarget {
    pub fn new(region: CuboidRegion, floor: Floor) -> Self {
        PasteTarget { region, floor }
    }
}
