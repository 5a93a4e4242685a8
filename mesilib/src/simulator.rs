use std::time::{Duration, Instant};
use log::{info, trace};
use serde::{Deserialize, Serialize};
use crate::address::{Address, ADDRESS_WIDTH};
use crate::config::SimulatorConfig;
use crate::engine::{CoherenceEngine, Processor};
use crate::l1::L1Stats;
use crate::protocol::{Op, Request};
use crate::set::StateCensus;

const OP_OFFSET: usize = 2;
const ADDRESS_OFFSET: usize = 4;
const ADDRESS_UPPER: usize = ADDRESS_OFFSET + ADDRESS_WIDTH;

/// The simulator replays traces against a coherence engine, and collects results.
///
/// It supports calling simulate multiple times. Request numbering continues across calls, and
/// the time taken to simulate and the results are updated accordingly
pub struct Simulator {
    engine: CoherenceEngine,
    requests: u64,
    result: SimulationResult,
    simulation_time: Duration,
}

/// The result of a simulation. Can be serialised to JSON
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct SimulationResult {
    pub requests: u64,
    pub l2: LevelTwoResult,
    pub processors: [ProcessorResult; 2],
}

/// The counters of the shared L2
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct LevelTwoResult {
    pub hits: u64,
    pub misses: u64,
}

/// The result for an individual processor's L1
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ProcessorResult {
    pub name: String,
    #[serde(flatten)]
    pub stats: L1Stats,
}

impl Simulator {

    /// Creates a new simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A cache configuration, usually resulting from parsing JSON
    ///
    /// returns: Result<Simulator, String>, failing if the geometry is invalid
    pub fn new(config: &SimulatorConfig) -> Result<Self, String> {
        let engine = CoherenceEngine::new(config)?;
        let mut simulator = Self {
            engine,
            requests: 0,
            result: SimulationResult {
                requests: 0,
                l2: LevelTwoResult::default(),
                processors: Processor::ALL.map(|processor| ProcessorResult {
                    name: processor.to_string(),
                    stats: L1Stats::default(),
                }),
            },
            simulation_time: Duration::new(0, 0),
        };
        simulator.update_result();
        Ok(simulator)
    }

    /// Processes one request, routing it to a processor by its position in the trace
    pub fn process(&mut self, request: &Request) -> Processor {
        self.requests += 1;
        let processor = Processor::for_request(self.requests);
        trace!("Request {} ({:?} {}) routed to {processor}", self.requests, request.op, request.address);
        self.engine.process_request(processor, request);
        processor
    }

    /// Simulates a trace held in a byte array, one request per line.
    ///
    /// A final newline is optional. A malformed line aborts the simulation with an error naming
    /// it; the requests before it have already been applied
    ///
    /// # Arguments
    ///
    /// * `bytes`: The input byte array
    ///
    /// returns: Result<&SimulationResult, String>
    pub fn simulate(&mut self, bytes: &[u8]) -> Result<&SimulationResult, String> {
        let start = Instant::now();
        let first = self.requests;
        info!("Replaying trace of {} bytes", bytes.len());
        let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        let outcome = self.replay(body);
        self.simulation_time += Instant::now() - start;
        self.update_result();
        outcome?;
        info!("Trace exhausted after {} requests", self.requests - first);
        Ok(&self.result)
    }

    fn replay(&mut self, body: &[u8]) -> Result<(), String> {
        if body.is_empty() {
            return Ok(());
        }
        for line in body.split(|b| *b == b'\n') {
            let request = parse_request(line, self.requests + 1)?;
            self.process(&request);
        }
        Ok(())
    }

    fn update_result(&mut self) {
        self.result.requests = self.requests;
        self.result.l2 = LevelTwoResult {
            hits: self.engine.l2().hits(),
            misses: self.engine.l2().misses(),
        };
        for (processor, res) in Processor::ALL.iter().zip(self.result.processors.iter_mut()) {
            res.stats = *self.engine.stats(*processor);
        }
    }

    pub fn result(&self) -> &SimulationResult {
        &self.result
    }

    pub fn engine(&self) -> &CoherenceEngine {
        &self.engine
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of lines in each state for each processor
    pub fn get_state_censuses(&self) -> Vec<(Processor, StateCensus)> {
        Processor::ALL.iter().map(|p| (*p, self.engine.census(*p))).collect()
    }
}

/// Parses one trace line
///
/// Character 2 is the operation, `0` for a read and `1` for a write. Characters 4 to 11 are the
/// address, which is kept as text. Anything after that is ignored, as is a trailing carriage
/// return
///
/// # Arguments
///
/// * `line`: The line, without its newline
/// * `number`: The 1-indexed line number, used in error messages
///
/// returns: Result<Request, String>
///
/// # Examples
///
/// ```
/// use mesilib::protocol::Op;
/// use mesilib::simulator::parse_request;
/// let request = parse_request(b"# 1 7fff0abc 3", 1).unwrap();
/// assert_eq!(request.op, Op::Write);
/// assert_eq!(request.address.to_string(), "7fff0abc");
/// ```
pub fn parse_request(line: &[u8], number: u64) -> Result<Request, String> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.len() < ADDRESS_UPPER {
        return Err(format!(
            "Trace line {number} is {} characters long, expected at least {ADDRESS_UPPER}",
            line.len()
        ));
    }
    let op = match line[OP_OFFSET] {
        b'0' => Op::Read,
        b'1' => Op::Write,
        other => return Err(format!(
            "Trace line {number} has operation {:?}, expected '0' (read) or '1' (write)",
            other as char
        )),
    };
    let chars: [u8; ADDRESS_WIDTH] = line[ADDRESS_OFFSET..ADDRESS_UPPER]
        .try_into()
        .map_err(|e| format!("Couldn't read the address on trace line {number}: {e}"))?;
    Ok(Request { op, address: Address::new(chars) })
}
