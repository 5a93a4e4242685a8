use std::fmt::{Display, Formatter};
use crate::address::Address;
use crate::config::SimulatorConfig;
use crate::l1::{L1Cache, L1Stats};
use crate::l2::L2Cache;
use crate::protocol::{CoherenceState, Request, Snoop};
use crate::set::StateCensus;

/// One of the two simulated processors
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Processor {
    Cpu1,
    Cpu2,
}

impl Processor {
    pub const ALL: [Processor; 2] = [Processor::Cpu1, Processor::Cpu2];

    /// Picks the processor for the `number`th request of a trace, counting from 1
    ///
    /// Every fourth request goes to CPU1, all others to CPU2
    ///
    /// # Examples
    ///
    /// ```
    /// use mesilib::engine::Processor;
    /// assert_eq!(Processor::for_request(3), Processor::Cpu2);
    /// assert_eq!(Processor::for_request(4), Processor::Cpu1);
    /// ```
    pub fn for_request(number: u64) -> Self {
        if number % 4 == 0 {
            Processor::Cpu1
        } else {
            Processor::Cpu2
        }
    }

    fn slot(self) -> usize {
        match self {
            Processor::Cpu1 => 0,
            Processor::Cpu2 => 1,
        }
    }
}

impl Display for Processor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Processor::Cpu1 => write!(f, "CPU1"),
            Processor::Cpu2 => write!(f, "CPU2"),
        }
    }
}

/// Both L1 controllers and the L2 they share
///
/// Neither L1 refers to the other. For each request the engine lends the handling controller
/// its sibling through the snoop channel, together with the L2
pub struct CoherenceEngine {
    processors: [L1Cache; 2],
    l2: L2Cache,
}

impl CoherenceEngine {
    pub fn new(config: &SimulatorConfig) -> Result<Self, String> {
        let (l1_geometry, l2_geometry) = config.geometries()?;
        Ok(Self {
            processors: [L1Cache::new(l1_geometry), L1Cache::new(l1_geometry)],
            l2: L2Cache::new(l2_geometry),
        })
    }

    /// Processes a request on the given processor's L1
    pub fn process_request(&mut self, processor: Processor, request: &Request) {
        let [cpu1, cpu2] = &mut self.processors;
        let (local, sibling) = match processor {
            Processor::Cpu1 => (cpu1, cpu2),
            Processor::Cpu2 => (cpu2, cpu1),
        };
        local.process_request(request.op, &request.address, sibling, &mut self.l2);
    }

    /// Gets the state of a block as seen by one processor
    pub fn state(&self, processor: Processor, address: &Address) -> CoherenceState {
        self.l1(processor).state(address)
    }

    /// True unless both processors hold the block and one of them holds it as Modified or
    /// Exclusive
    pub fn is_coherent(&self, address: &Address) -> bool {
        let first = self.state(Processor::Cpu1, address);
        let second = self.state(Processor::Cpu2, address);
        !(first.is_valid() && second.is_valid() && (first.is_owned() || second.is_owned()))
    }

    pub fn l1(&self, processor: Processor) -> &L1Cache {
        &self.processors[processor.slot()]
    }

    pub fn l2(&self) -> &L2Cache {
        &self.l2
    }

    pub fn stats(&self, processor: Processor) -> &L1Stats {
        self.l1(processor).stats()
    }

    pub fn census(&self, processor: Processor) -> StateCensus {
        self.l1(processor).census()
    }
}
