use std::collections::HashMap;
use log::debug;
use crate::address::{Address, Geometry, Index, Tag};

/// The shared, direct mapped L2
///
/// It only tracks whether a block is present, never a coherence state. Once filled it is treated
/// as holding a valid copy that is safe to share. The L1 pair is the coherence authority
///
/// The L2 is passive: it never counts its own hits and misses, the L1 consulting it records them
pub struct L2Cache {
    geometry: Geometry,
    lines: HashMap<Index, Tag>,
    hits: u64,
    misses: u64,
}

impl L2Cache {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            lines: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// True if the block containing `address` is present
    pub fn probe(&self, address: &Address) -> bool {
        let (index, tag) = self.geometry.split(address);
        self.lines.get(&index) == Some(&tag)
    }

    /// Installs the block containing `address`, evicting whatever occupied its index
    pub fn fill(&mut self, address: &Address) {
        let (index, tag) = self.geometry.split(address);
        if let Some(previous) = self.lines.insert(index, tag) {
            if previous != tag {
                debug!("L2 fill of {address} evicted {index:?}/{previous:?}");
            }
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Gets the number of indices holding a block
    pub fn occupied_lines(&self) -> usize {
        self.lines.len()
    }
}
