use crate::address::Address;
use crate::config::{L1Config, L2Config, SimulatorConfig};
use crate::engine::{CoherenceEngine, Processor};
use crate::protocol::{CoherenceState, Op, Request};

use CoherenceState::*;
use Processor::*;

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

// 4 L1 sets and 4 L2 lines: index is characters 5 and 6, tag is character 7
fn small() -> SimulatorConfig {
    SimulatorConfig {
        l1: L1Config { size: 256, line_size: 32 },
        l2: L2Config { size: 128, line_size: 32 },
    }
}

fn engine() -> CoherenceEngine {
    CoherenceEngine::new(&SimulatorConfig::default()).unwrap()
}

fn read(engine: &mut CoherenceEngine, processor: Processor, address: &str) {
    engine.process_request(processor, &Request::read(addr(address)));
}

fn write(engine: &mut CoherenceEngine, processor: Processor, address: &str) {
    engine.process_request(processor, &Request::write(addr(address)));
}

#[test]
fn read_of_fresh_block_is_exclusive() {
    let mut engine = engine();
    read(&mut engine, Cpu2, "00000abc");
    assert_eq!(engine.state(Cpu2, &addr("00000abc")), Exclusive);
    assert_eq!(engine.state(Cpu1, &addr("00000abc")), Invalid);
    let stats = engine.stats(Cpu2);
    assert_eq!((stats.accesses, stats.hits, stats.misses), (1, 0, 1));
    assert_eq!((engine.l2().hits(), engine.l2().misses()), (0, 1));
    assert!(engine.l2().probe(&addr("00000abc")));
}

#[test]
fn read_from_exclusive_sibling_shares_without_l2() {
    let mut engine = engine();
    read(&mut engine, Cpu2, "00000abc");
    read(&mut engine, Cpu1, "00000abc");
    assert_eq!(engine.state(Cpu1, &addr("00000abc")), Shared);
    assert_eq!(engine.state(Cpu2, &addr("00000abc")), Shared);
    assert_eq!((engine.l2().hits(), engine.l2().misses()), (0, 1));
    assert_eq!(engine.stats(Cpu1).misses, 1);
    assert_eq!(engine.stats(Cpu1).invalidations, 0);
    assert_eq!(engine.stats(Cpu2).invalidations, 0);
}

#[test]
fn read_from_modified_sibling_downgrades_it() {
    let mut engine = engine();
    write(&mut engine, Cpu2, "00000abc");
    assert_eq!(engine.state(Cpu2, &addr("00000abc")), Modified);
    read(&mut engine, Cpu1, "00000abc");
    assert_eq!(engine.state(Cpu1, &addr("00000abc")), Shared);
    assert_eq!(engine.state(Cpu2, &addr("00000abc")), Shared);
    assert_eq!((engine.l2().hits(), engine.l2().misses()), (0, 1));
}

#[test]
fn read_from_shared_sibling_leaves_it_shared() {
    let mut engine = CoherenceEngine::new(&small()).unwrap();
    read(&mut engine, Cpu2, "00000ab1");
    read(&mut engine, Cpu1, "00000ab1");
    // Two more blocks in the same set push CPU1's copy out, CPU2 keeps it as Shared
    read(&mut engine, Cpu1, "00000ab2");
    read(&mut engine, Cpu1, "00000ab3");
    assert_eq!(engine.state(Cpu1, &addr("00000ab1")), Invalid);
    assert_eq!(engine.state(Cpu2, &addr("00000ab1")), Shared);
    let l2_before = (engine.l2().hits(), engine.l2().misses());
    read(&mut engine, Cpu1, "00000ab1");
    assert_eq!(engine.state(Cpu1, &addr("00000ab1")), Shared);
    assert_eq!(engine.state(Cpu2, &addr("00000ab1")), Shared);
    assert_eq!((engine.l2().hits(), engine.l2().misses()), l2_before);
    assert_eq!(engine.stats(Cpu1).misses, 4);
}

#[test]
fn write_to_shared_block_invalidates_sibling() {
    let mut engine = engine();
    read(&mut engine, Cpu2, "00000abc");
    read(&mut engine, Cpu1, "00000abc");
    write(&mut engine, Cpu1, "00000abc");
    assert_eq!(engine.state(Cpu1, &addr("00000abc")), Modified);
    assert_eq!(engine.state(Cpu2, &addr("00000abc")), Invalid);
    assert_eq!(engine.stats(Cpu1).invalidations, 1);
    assert_eq!(engine.stats(Cpu2).invalidations, 0);
    // A write hit is not a miss, and not counted as a hit either
    assert_eq!((engine.stats(Cpu1).hits, engine.stats(Cpu1).misses), (0, 1));
}

#[test]
fn write_to_exclusive_block_needs_no_snoop() {
    let mut engine = engine();
    read(&mut engine, Cpu2, "00000abc");
    write(&mut engine, Cpu2, "00000abc");
    assert_eq!(engine.state(Cpu2, &addr("00000abc")), Modified);
    assert_eq!(engine.stats(Cpu2).invalidations, 0);
    assert_eq!(engine.stats(Cpu2).misses, 1);
}

#[test]
fn write_to_modified_block_changes_no_counters() {
    let mut engine = engine();
    write(&mut engine, Cpu2, "00000abc");
    let before = *engine.stats(Cpu2);
    let l2_before = (engine.l2().hits(), engine.l2().misses());
    write(&mut engine, Cpu2, "00000abc");
    let after = *engine.stats(Cpu2);
    assert_eq!(after.accesses, before.accesses + 1);
    assert_eq!((after.hits, after.misses, after.invalidations), (before.hits, before.misses, before.invalidations));
    assert_eq!((engine.l2().hits(), engine.l2().misses()), l2_before);
    assert_eq!(engine.state(Cpu2, &addr("00000abc")), Modified);
}

#[test]
fn write_miss_invalidates_sibling_and_still_consults_l2() {
    let mut engine = engine();
    read(&mut engine, Cpu2, "00000abc");
    write(&mut engine, Cpu1, "00000abc");
    assert_eq!(engine.state(Cpu1, &addr("00000abc")), Modified);
    assert_eq!(engine.state(Cpu2, &addr("00000abc")), Invalid);
    assert_eq!(engine.stats(Cpu1).invalidations, 1);
    assert_eq!(engine.stats(Cpu1).misses, 1);
    assert_eq!((engine.l2().hits(), engine.l2().misses()), (1, 1));
}

#[test]
fn write_miss_without_sibling_copy_counts_no_invalidation() {
    let mut engine = engine();
    write(&mut engine, Cpu1, "00000abc");
    assert_eq!(engine.stats(Cpu1).invalidations, 0);
    assert_eq!((engine.l2().hits(), engine.l2().misses()), (0, 1));
}

#[test]
fn repeated_reads_only_touch_local_recency() {
    let mut engine = engine();
    read(&mut engine, Cpu2, "00000abc");
    read(&mut engine, Cpu1, "00000def");
    let l2_before = (engine.l2().hits(), engine.l2().misses());
    let sibling_before = *engine.stats(Cpu1);
    for _ in 0..5 {
        read(&mut engine, Cpu2, "00000abc");
    }
    assert_eq!(engine.state(Cpu2, &addr("00000abc")), Exclusive);
    assert_eq!(engine.state(Cpu1, &addr("00000abc")), Invalid);
    assert_eq!((engine.l2().hits(), engine.l2().misses()), l2_before);
    assert_eq!(*engine.stats(Cpu1), sibling_before);
    assert_eq!(engine.stats(Cpu2).hits, 5);
}

#[test]
fn l2_is_direct_mapped() {
    let mut engine = CoherenceEngine::new(&small()).unwrap();
    read(&mut engine, Cpu2, "00000ab1");
    read(&mut engine, Cpu2, "00000ab2");
    assert!(!engine.l2().probe(&addr("00000ab1")));
    assert!(engine.l2().probe(&addr("00000ab2")));
    assert_eq!(engine.l2().occupied_lines(), 1);
}

#[test]
fn l1_conflicts_evict_the_least_recently_used_block() {
    let mut engine = CoherenceEngine::new(&small()).unwrap();
    read(&mut engine, Cpu2, "00000ab1");
    read(&mut engine, Cpu2, "00000ab2");
    read(&mut engine, Cpu2, "00000ab1");
    read(&mut engine, Cpu2, "00000ab3");
    assert_eq!(engine.state(Cpu2, &addr("00000ab1")), Exclusive);
    assert_eq!(engine.state(Cpu2, &addr("00000ab2")), Invalid);
    assert_eq!(engine.state(Cpu2, &addr("00000ab3")), Exclusive);
}

// Small deterministic generator, so the walk below is reproducible
struct Lcg(u64);

impl Lcg {
    fn roll(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn random_walk_keeps_mesi_invariants() {
    let pool: Vec<Address> = ["00000ab1", "00000ab2", "00000ab3", "00000cd1", "00000cd2", "11111ab1"]
        .iter()
        .map(|a| addr(a))
        .collect();
    let mut engine = CoherenceEngine::new(&small()).unwrap();
    let mut rng = Lcg(42);
    for _ in 0..5000 {
        let processor = if rng.roll() % 2 == 0 { Cpu1 } else { Cpu2 };
        let address = pool[(rng.roll() % pool.len() as u64) as usize];
        let op = if rng.roll() % 3 == 0 { Op::Write } else { Op::Read };
        let before = engine.state(processor, &address);
        let stats_before = *engine.stats(processor);
        engine.process_request(processor, &Request { op, address });
        let after = engine.state(processor, &address);
        let stats = engine.stats(processor);
        assert_eq!(stats.accesses, stats_before.accesses + 1);
        if before == Invalid {
            assert_eq!(stats.misses, stats_before.misses + 1);
        } else {
            assert_eq!(stats.misses, stats_before.misses);
        }
        assert!(after.is_valid());
        if op == Op::Read && before.is_valid() {
            assert_eq!(after, before);
        }
        if op == Op::Write {
            assert_eq!(after, Modified);
        }
        for a in &pool {
            assert!(engine.is_coherent(a), "{a} held by both processors with an owner");
        }
    }
}
