//! The chunked paste engine: validates that a destination can hold a
//! clipboard, resolves the placement offset, then streams the copy one
//! chunk slice at a time through the throttled runner.

use crate::chunk_task::run_chunk_task;
use crate::queue::BlockQueue;
use crate::source::{BlockSource, Floor, PasteTarget};
use lodestone_common::types::{BlockPos, MAX_BLOCK_Y, WORLD_HEIGHT};
use lodestone_logger::log::log;
use lodestone_logger::severity::LogSeverity::Warning;
use lodestone_schematic::Schematic;

pub(crate) async fn paste_into<S>(
    schematic: &Schematic,
    target: &PasteTarget,
    offset: BlockPos,
    auto_height: bool,
    throttle: usize,
    source: &S,
    queue: &mut dyn BlockQueue,
) -> bool
where
    S: BlockSource + ?Sized,
{
    let clipboard = schematic.clipboard();
    let (width, height, length) = clipboard.dimensions();
    let (width, height, length) = (width as i32, height as i32, length as i32);
    let region = &target.region;

    // Reject before anything reaches the queue.
    if offset.x < 0
        || offset.z < 0
        || region.width() - offset.x < width
        || region.length() - offset.z < length
        || height > WORLD_HEIGHT
    {
        log(
            format!(
                "schematic is too large: ({},{},{}) does not fit ({},{},{}) at offset ({},{})",
                width,
                length,
                height,
                region.width(),
                region.length(),
                WORLD_HEIGHT,
                offset.x,
                offset.z
            ),
            Warning,
        );
        return false;
    }

    // A clipboard spanning the full world height is pinned to the supplied
    // offset; otherwise the floor rule lifts it.
    let y_origin = if auto_height && height < WORLD_HEIGHT {
        match target.floor {
            Floor::Fixed(floor) => offset.y + floor,
            Floor::Terrain => {
                offset.y + 1 + source.highest_block_at(region.min.x + 1, region.min.z + 1)
            }
        }
    } else {
        offset.y
    };

    let origin = BlockPos::new(region.min.x + offset.x, y_origin, region.min.z + offset.z);
    let far = origin.offset(width - 1, height - 1, length - 1);
    let layers = height.min(WORLD_HEIGHT);

    run_chunk_task(origin, far, throttle, |slice| {
        for ry in 0..layers {
            let yy = y_origin + ry;
            if yy < 0 || yy > MAX_BLOCK_Y {
                continue;
            }
            for rz in (slice.min_z - origin.z)..=(slice.max_z - origin.z) {
                for rx in (slice.min_x - origin.x)..=(slice.max_x - origin.x) {
                    let xx = origin.x + rx;
                    let zz = origin.z + rz;
                    if let Some(block) = clipboard.full_block(rx as usize, ry as usize, rz as usize)
                    {
                        queue.set_block(xx, yy, zz, block);
                    }
                    if ry == 0 {
                        if let Some(biome) = clipboard.biome(rx as usize, rz as usize) {
                            queue.set_biome(xx, zz, biome);
                        }
                    }
                }
            }
        }
    })
    .await;

    queue.flush();
    true
}
