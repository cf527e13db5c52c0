//! Partitioning of a destination span into 16x16 chunk-aligned slices, and
//! the throttled runner that walks them without monopolizing the scheduler.

use lodestone_common::types::{BlockPos, ChunkPos, CHUNK_SIZE};

/// Slices processed per scheduling quantum when the caller does not say
/// otherwise.
pub const DEFAULT_THROTTLE: usize = 10;

/// The intersection of one world chunk with a destination span, in world
/// coordinates. Bounds are inclusive and already clipped to the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSlice {
    pub chunk: ChunkPos,
    pub min_x: i32,
    pub max_x: i32,
    pub min_z: i32,
    pub max_z: i32,
}

/// Every chunk-aligned slice intersecting the span between `min` and `max`
/// (inclusive, horizontal axes only).
pub fn chunk_slices(min: BlockPos, max: BlockPos) -> Vec<ChunkSlice> {
    let low = ChunkPos::of_block(min.x, min.z);
    let high = ChunkPos::of_block(max.x, max.z);

    let mut slices = Vec::new();
    for cx in low.x..=high.x {
        for cz in low.z..=high.z {
            let chunk = ChunkPos { x: cx, z: cz };
            slices.push(ChunkSlice {
                chunk,
                min_x: chunk.min_block_x().max(min.x),
                max_x: (chunk.min_block_x() + CHUNK_SIZE - 1).min(max.x),
                min_z: chunk.min_block_z().max(min.z),
                max_z: (chunk.min_block_z() + CHUNK_SIZE - 1).min(max.z),
            });
        }
    }
    slices
}

/// Walks every slice of the span, yielding back to the scheduler after each
/// batch of `throttle` slices so a large span never runs in one quantum.
pub async fn run_chunk_task<F>(min: BlockPos, max: BlockPos, throttle: usize, mut on_slice: F)
where
    F: FnMut(&ChunkSlice),
{
    let throttle = throttle.max(1);
    for (index, slice) in chunk_slices(min, max).iter().enumerate() {
        if index > 0 && index % throttle == 0 {
            tokio::task::yield_now().await;
        }
        on_slice(slice);
    }
}
