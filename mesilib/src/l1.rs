use std::collections::HashMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use crate::address::{Address, Geometry, Index};
use crate::l2::L2Cache;
use crate::protocol::{CoherenceState, Op, Snoop};
use crate::set::{SetLru, StateCensus};

/// Counters kept by each L1
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct L1Stats {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

/// A private, 2-way set associative L1 running the MESI protocol
///
/// Sets are created lazily on the first fill of an index, an index without a set holds nothing.
/// Blocks are never explicitly evicted; a fill into a full set overwrites the LRU line
pub struct L1Cache {
    geometry: Geometry,
    sets: HashMap<Index, SetLru>,
    stats: L1Stats,
}

impl L1Cache {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            sets: HashMap::new(),
            stats: L1Stats::default(),
        }
    }

    pub fn stats(&self) -> &L1Stats {
        &self.stats
    }

    /// Counts the lines of every set created so far by state
    pub fn census(&self) -> StateCensus {
        let mut census = StateCensus::default();
        self.sets.values().for_each(|set| census.merge(&set.census()));
        census
    }

    fn touch(&mut self, address: &Address) {
        let (index, tag) = self.geometry.split(address);
        if let Some(set) = self.sets.get_mut(&index) {
            set.touch(tag);
        }
    }

    fn bring_block(&mut self, address: &Address, state: CoherenceState) {
        let (index, tag) = self.geometry.split(address);
        let victim = self.sets.entry(index).or_default().insert(tag, state);
        if victim.state.is_valid() && victim.tag != tag {
            debug!("Fill of {address} as {state:?} dropped a {:?} line", victim.state);
        }
    }

    /// Processes one request from this cache's processor
    ///
    /// All effects are state changes and counter updates, on this cache, on the sibling through
    /// the snoop channel, and on the shared L2
    ///
    /// # Arguments
    ///
    /// * `op`: Read or write
    /// * `address`: The address of the request
    /// * `sibling`: The other processor's L1
    /// * `l2`: The shared L2
    ///
    /// returns: ()
    pub fn process_request(&mut self, op: Op, address: &Address, sibling: &mut impl Snoop, l2: &mut L2Cache) {
        self.stats.accesses += 1;
        let state = self.state(address);
        trace!("{op:?} {address} in local state {state:?}");
        match (op, state) {
            (Op::Read, CoherenceState::Invalid) => self.read_miss(address, sibling, l2),
            (Op::Read, _) => {
                self.stats.hits += 1;
                self.touch(address);
            }
            (Op::Write, CoherenceState::Invalid) => self.write_miss(address, sibling, l2),
            (Op::Write, CoherenceState::Exclusive) => {
                self.change_state(address, CoherenceState::Modified);
                self.touch(address);
            }
            (Op::Write, CoherenceState::Shared) => {
                self.stats.invalidations += 1;
                self.change_state(address, CoherenceState::Modified);
                sibling.invalidate(address);
                debug!("Write to shared {address} invalidated the sibling copy");
                self.touch(address);
            }
            (Op::Write, CoherenceState::Modified) => self.touch(address),
        }
    }

    fn read_miss(&mut self, address: &Address, sibling: &mut impl Snoop, l2: &mut L2Cache) {
        self.stats.misses += 1;
        match sibling.state(address) {
            CoherenceState::Modified | CoherenceState::Exclusive => {
                sibling.change_state(address, CoherenceState::Shared);
                debug!("Read of {address} downgraded the sibling copy to Shared");
                self.bring_block(address, CoherenceState::Shared);
            }
            CoherenceState::Shared => self.bring_block(address, CoherenceState::Shared),
            CoherenceState::Invalid => {
                self.bring_block(address, CoherenceState::Exclusive);
                consult_l2(address, l2);
            }
        }
    }

    fn write_miss(&mut self, address: &Address, sibling: &mut impl Snoop, l2: &mut L2Cache) {
        self.stats.misses += 1;
        if sibling.state(address).is_valid() {
            self.stats.invalidations += 1;
            sibling.invalidate(address);
            debug!("Write miss on {address} invalidated the sibling copy");
        }
        self.bring_block(address, CoherenceState::Modified);
        consult_l2(address, l2);
    }
}

// The sibling couldn't supply the block, so it comes from the L2, or from memory through the L2
fn consult_l2(address: &Address, l2: &mut L2Cache) {
    if l2.probe(address) {
        l2.record_hit();
    } else {
        l2.record_miss();
        l2.fill(address);
        debug!("L2 miss on {address}, filled from memory");
    }
}

impl Snoop for L1Cache {
    fn state(&self, address: &Address) -> CoherenceState {
        let (index, tag) = self.geometry.split(address);
        self.sets.get(&index).map_or(CoherenceState::Invalid, |set| set.lookup(tag))
    }

    fn change_state(&mut self, address: &Address, state: CoherenceState) {
        let (index, tag) = self.geometry.split(address);
        if let Some(set) = self.sets.get_mut(&index) {
            set.set_state(tag, state);
        }
    }
}
