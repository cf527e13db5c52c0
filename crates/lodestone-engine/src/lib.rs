pub mod chunk_task;
pub mod export;
pub mod handler;
pub mod paste;
pub mod queue;
pub mod source;

// Re-export commonly used items
pub use export::{BatchExporter, ExportItem, OwnerResolver};
pub use handler::{SchematicHandler, WorldSchematicHandler};
pub use queue::BlockQueue;
pub use source::{BlockSource, Floor, PasteTarget};
