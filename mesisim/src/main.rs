use std::fs::File;
use std::io::BufReader;
use std::time::Instant;
use clap::Parser;
use log::info;
use mesilib::config::SimulatorConfig;
use mesilib::io::{open_trace, read_trace};
use mesilib::report::Report;
use mesilib::simulator::Simulator;

#[derive(Parser, Debug)]
#[command(about = String::from("Two-processor MESI cache coherence simulator"))]
struct Args {
    /// Trace to replay, read from standard input when omitted
    trace: Option<String>,

    /// JSON file with the L1 and L2 geometry
    #[arg(short, long)]
    config: Option<String>,

    /// Also print the raw counters as JSON
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    /// Print the configuration and the final line states to stderr
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<(), String> {
    pretty_env_logger::init();
    let start = Instant::now();
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            let config_file = File::open(path).map_err(|e| format!("Couldn't open the config file at path {path}: {e}"))?;
            serde_json::from_reader(BufReader::new(config_file)).map_err(|e| format!("Couldn't parse the config file: {e}"))?
        }
        None => SimulatorConfig::default(),
    };
    let mut simulator = Simulator::new(&config)?;
    let trace = match &args.trace {
        Some(path) => open_trace(path)?,
        None => read_trace(std::io::stdin().lock())?,
    };
    let result = simulator.simulate(&trace)?;
    let report = Report::from_result(result)?;
    println!("{report}");
    if args.json {
        println!("{}", serde_json::to_string_pretty(result).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes reading the trace, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        eprintln!("Running the debug binary. If benchmarking, re-compile with the --release argument when using cargo run");
        eprintln!("Parsed input configuration: {config:?}");
        for (processor, census) in simulator.get_state_censuses() {
            eprintln!(
                "{processor} lines: {} modified, {} exclusive, {} shared, {} invalid",
                census.modified, census.exclusive, census.shared, census.invalid
            );
        }
        eprintln!("L2 lines filled: {}", simulator.engine().l2().occupied_lines());
    }
    info!("Done");
    Ok(())
}
