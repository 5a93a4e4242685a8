use std::fmt::{Display, Formatter};
use crate::simulator::{ProcessorResult, SimulationResult};

const SEPARATOR_WIDTH: usize = 80;

/// Miss rates and invalidation counts derived from a simulation result
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Report {
    pub global_miss_rate: f64,
    pub l1_miss_rates: [f64; 2],
    pub invalidations: [u64; 2],
}

impl Report {
    /// Computes the report
    ///
    /// The global miss rate is L2 misses over the accesses of both processors. Fails if either
    /// processor never received a request, as its miss rate is undefined
    pub fn from_result(result: &SimulationResult) -> Result<Self, String> {
        let [cpu1, cpu2] = &result.processors;
        Ok(Self {
            global_miss_rate: result.l2.misses as f64 / (cpu1.stats.accesses + cpu2.stats.accesses) as f64,
            l1_miss_rates: [miss_rate(cpu1)?, miss_rate(cpu2)?],
            invalidations: [cpu1.stats.invalidations, cpu2.stats.invalidations],
        })
    }
}

fn miss_rate(processor: &ProcessorResult) -> Result<f64, String> {
    if processor.stats.accesses == 0 {
        return Err(format!("{} received no requests, its miss rate is undefined", processor.name));
    }
    Ok(processor.stats.misses as f64 / processor.stats.accesses as f64)
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let separator = "+".repeat(SEPARATOR_WIDTH);
        writeln!(f, "{separator}")?;
        writeln!(f, "Miss rate global:\t\t\t\t{:.5}", self.global_miss_rate)?;
        writeln!(f, "Miss rate L1 CPU1:\t\t\t\t{:.5}", self.l1_miss_rates[0])?;
        writeln!(f, "Miss rate L1 CPU2:\t\t\t\t{:.5}", self.l1_miss_rates[1])?;
        writeln!(f, "Invalidaciones por coherencia CPU1:\t\t{:5}", self.invalidations[0])?;
        writeln!(f, "Invalidaciones por coherencia CPU2:\t\t{:5}", self.invalidations[1])?;
        writeln!(f)?;
        write!(f, "{separator}")
    }
}
