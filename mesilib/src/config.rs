use serde::{Deserialize, Serialize};
use crate::address::Geometry;

/// L1 sets always hold two lines
pub const L1_ASSOCIATIVITY: u64 = 2;

/// The L2 is always direct mapped
pub const L2_ASSOCIATIVITY: u64 = 1;

pub const DEFAULT_L1_SIZE: u64 = 16 * 1024;
pub const DEFAULT_L2_SIZE: u64 = 128 * 1024;
pub const DEFAULT_LINE_SIZE: u64 = 32;

/// The geometry of both cache levels. Any field left out takes the default value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub l1: L1Config,
    #[serde(default)]
    pub l2: L2Config,
}

/// The configuration of each processor's L1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L1Config {
    #[serde(default = "default_l1_size")]
    pub size: u64,
    #[serde(default = "default_line_size")]
    pub line_size: u64,
}

/// The configuration of the shared L2
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L2Config {
    #[serde(default = "default_l2_size")]
    pub size: u64,
    #[serde(default = "default_line_size")]
    pub line_size: u64,
}

fn default_l1_size() -> u64 {
    DEFAULT_L1_SIZE
}

fn default_l2_size() -> u64 {
    DEFAULT_L2_SIZE
}

fn default_line_size() -> u64 {
    DEFAULT_LINE_SIZE
}

impl Default for L1Config {
    fn default() -> Self {
        Self { size: DEFAULT_L1_SIZE, line_size: DEFAULT_LINE_SIZE }
    }
}

impl Default for L2Config {
    fn default() -> Self {
        Self { size: DEFAULT_L2_SIZE, line_size: DEFAULT_LINE_SIZE }
    }
}

impl SimulatorConfig {
    /// Validates the configuration, returning the L1 and L2 geometries
    pub fn geometries(&self) -> Result<(Geometry, Geometry), String> {
        let l1 = Geometry::new(self.l1.size, L1_ASSOCIATIVITY, self.l1.line_size)
            .map_err(|e| format!("Invalid L1 configuration: {e}"))?;
        let l2 = Geometry::new(self.l2.size, L2_ASSOCIATIVITY, self.l2.line_size)
            .map_err(|e| format!("Invalid L2 configuration: {e}"))?;
        Ok((l1, l2))
    }
}
