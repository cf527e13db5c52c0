pub mod block;
pub mod error;
pub mod types;

pub use block::{Biome, BlockState};
pub use error::LodestoneError;
pub use types::Result;
