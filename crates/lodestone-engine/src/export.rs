//! The batch export sequencer: drains a worklist of regions strictly one at
//! a time, capturing and persisting each in turn. A single-flight guard
//! keeps a second batch from starting while one is running.

use crate::handler::SchematicHandler;
use lodestone_common::types::{CuboidRegion, PlotId};
use lodestone_logger::log::log;
use lodestone_logger::severity::LogSeverity::{Error, Info, Warning};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// One region waiting to be exported. Consumed when its tag reaches disk or
/// the item is skipped.
#[derive(Debug, Clone)]
pub struct ExportItem {
    pub plot: PlotId,
    pub area: String,
    pub region: CuboidRegion,
    pub owner: Option<Uuid>,
}

/// Maps an owner identity to a display name.
pub trait OwnerResolver: Send + Sync {
    fn name_of(&self, owner: &Uuid) -> Option<String>;
}

impl OwnerResolver for HashMap<Uuid, String> {
    fn name_of(&self, owner: &Uuid) -> Option<String> {
        self.get(owner).cloned()
    }
}

/// Substitutes the recognized placeholders into the naming pattern, or falls
/// back to the default `x;y,area,owner` scheme.
fn resolve_name(item: &ExportItem, owner_name: &str, pattern: Option<&str>) -> String {
    match pattern {
        Some(pattern) => pattern
            .replace("%owner%", owner_name)
            .replace("%idx%", &item.plot.x.to_string())
            .replace("%idy%", &item.plot.y.to_string())
            .replace("%id%", &item.plot.to_string())
            .replace("%world%", &item.area),
        None => format!("{},{},{}", item.plot, item.area, owner_name),
    }
}

pub struct BatchExporter {
    active: Arc<AtomicBool>,
}

impl BatchExporter {
    pub fn new() -> Self {
        BatchExporter {
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Starts draining the worklist on a worker task. Returns `false` with
    /// no state change when a run is already active or the worklist is
    /// empty; otherwise `true`, and `on_done` fires once the worklist is
    /// exhausted.
    pub fn export_all(
        &self,
        handler: Arc<dyn SchematicHandler>,
        items: Vec<ExportItem>,
        resolver: Arc<dyn OwnerResolver>,
        output_dir: PathBuf,
        naming_pattern: Option<String>,
        on_done: impl FnOnce() + Send + 'static,
    ) -> bool {
        if items.is_empty() {
            return false;
        }
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let active = Arc::clone(&self.active);
        tokio::spawn(async move {
            // Capture is expensive; one region at a time is the
            // backpressure policy.
            for item in items {
                let owner = item
                    .owner
                    .as_ref()
                    .and_then(|o| resolver.name_of(o))
                    .unwrap_or_else(|| "unknown".to_owned());
                let name = resolve_name(&item, &owner, naming_pattern.as_deref());

                match handler.capture(&item.region).await {
                    None => log(format!("- skipped plot {}", item.plot), Warning),
                    Some(tag) => {
                        log(format!("exporting {}", item.plot), Info);
                        let path = output_dir.join(format!("{}.schem", name));
                        if handler.save(&tag, &path).await {
                            log(format!("- success: {}", item.plot), Info);
                        } else {
                            log(format!("- failed to save {}", item.plot), Error);
                        }
                    }
                }
            }
            active.store(false, Ordering::SeqCst);
            on_done();
        });
        true
    }
}

impl Default for BatchExporter {
    fn default() -> Self {
        BatchExporter::new()
    }
}
