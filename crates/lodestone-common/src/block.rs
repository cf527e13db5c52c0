use serde::{Deserialize, Serialize};
use std::fmt;

const AIR: &str = "minecraft:air";
const DEFAULT_BIOME: &str = "minecraft:plains";

/// Full identifier of a block, e.g. `minecraft:chest[facing=north]`.
/// Legacy numeric pairs are carried as `legacy:<id>:<data>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState(String);

impl BlockState {
    pub fn new(name: impl Into<String>) -> Self {
        BlockState(name.into())
    }

    pub fn air() -> Self {
        BlockState(AIR.to_owned())
    }

    pub fn from_legacy(id: u8, data: u8) -> Self {
        if id == 0 {
            BlockState::air()
        } else {
            BlockState(format!("legacy:{}:{}", id, data))
        }
    }

    pub fn is_air(&self) -> bool {
        self.0 == AIR
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Biome identifier for one horizontal cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Biome(String);

impl Biome {
    pub fn new(name: impl Into<String>) -> Self {
        Biome(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Biome {
    fn default() -> Self {
        Biome(DEFAULT_BIOME.to_owned())
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
