//! # MesiLib
//!
//! MesiLib simulates MESI cache coherence between two processors, each with a private 2-way set
//! associative L1, sharing one direct mapped L2
//!
//! A trace of reads and writes is replayed one request at a time. The two L1 controllers snoop
//! each other to keep the MESI invariants, and consult the shared L2 when neither of them can
//! supply a block. The simulator collects miss rates and invalidation counts along the way
//!
//! Everything is single threaded and synchronous, a request is fully processed (including snoops
//! and L2 fills) before the next one is read

/// Splits trace addresses into set indices and tags for a given cache geometry
pub mod address;

/// Contains definitions for the JSON configuration format
pub mod config;

/// Contains the coherence engine, which owns both L1 controllers and the shared L2
pub mod engine;

/// Helpers for loading a trace from a file or standard input
pub mod io;

/// The per-processor L1 controller implementing the MESI protocol
pub mod l1;

/// The shared, direct mapped L2
pub mod l2;

/// MESI states, request kinds, and the snoop channel between controllers
pub mod protocol;

/// Human readable statistics report
pub mod report;

/// 2-way LRU sets and their lines
pub mod set;

/// Contains the trace driver used to replay a trace against the coherence engine
pub mod simulator;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
