//! SMT issue queue simulator CLI.
//!
//! This binary provides the entry point for running the simulator. It
//! performs:
//! 1. **Configuration:** Built-in defaults, optionally overridden by a
//!    JSON config file.
//! 2. **Workload:** A deterministic synthetic instruction mix per thread.
//! 3. **Reporting:** Issue-side statistics, selectable by section.

use clap::{Parser, Subcommand};
use std::{fs, process};

use smtsim_core::common::reg::SeqNum;
use smtsim_core::config::Config;
use smtsim_core::core::inst::{DynInst, OpClass};
use smtsim_core::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "smtsim",
    author,
    version,
    about = "SMT out-of-order issue queue simulator",
    long_about = "Run a synthetic instruction mix through the out-of-order \
instruction queue model.\n\nConfiguration is JSON (see Config); the CLI uses \
built-in defaults when no file is given.\n\nExamples:\n  smtsim run\n  \
smtsim run --config iq.json --cycles 50000\n  smtsim run --stats summary --stats fu"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the simulator on a synthetic workload.
    Run {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<String>,

        /// Cycle budget (overrides the config).
        #[arg(long)]
        cycles: Option<u64>,

        /// Statistics sections to print (default: all).
        #[arg(long)]
        stats: Vec<String>,

        /// Enable per-instruction tracing (RUST_LOG governs the level).
        #[arg(long)]
        trace: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            config,
            cycles,
            stats,
            trace,
        }) => cmd_run(config, cycles, stats, trace),
        None => {
            eprintln!("smtsim — pass a subcommand");
            eprintln!();
            eprintln!("  smtsim run                 Synthetic workload, default config");
            eprintln!("  smtsim run -c <json>       With a config file");
            eprintln!();
            eprintln!("  smtsim --help  for full options");
            process::exit(1);
        }
    }
}

/// Loads the configuration, runs the workload, prints statistics.
fn cmd_run(config_path: Option<String>, cycles: Option<u64>, stats: Vec<String>, trace: bool) {
    let mut config = match config_path {
        Some(path) => {
            let text = fs::read_to_string(&path).unwrap_or_else(|err| {
                eprintln!("cannot read {}: {}", path, err);
                process::exit(1);
            });
            Config::from_json(&text).unwrap_or_else(|err| {
                eprintln!("cannot parse {}: {}", path, err);
                process::exit(1);
            })
        }
        None => Config::default(),
    };
    if let Some(cycles) = cycles {
        config.general.max_cycles = cycles;
    }
    if trace {
        config.general.trace = true;
    }
    if !config.core.validate() {
        eprintln!(
            "invalid configuration: num_threads {} out of range",
            config.core.num_threads
        );
        process::exit(1);
    }

    println!(
        "Configuration: {} threads, {} entries ({:?}), width {}",
        config.core.num_threads,
        config.core.num_entries,
        config.core.iq_policy,
        config.core.total_width
    );
    println!();

    let mut sim = Simulator::new(&config);
    let mut workload = Workload::new(config.core.num_threads);

    for _ in 0..config.general.max_cycles {
        workload.dispatch_some(&mut sim);
        sim.tick();
    }
    sim.drain(1000);

    sim.stats().print_sections(&stats);
}

/// Deterministic synthetic instruction stream.
///
/// A per-thread linear congruential generator picks op classes and
/// register operands, producing a plausible mix of dependent integer, FP,
/// and memory work.
struct Workload {
    next_seq: u64,
    lcg: u64,
    num_threads: usize,
}

impl Workload {
    fn new(num_threads: usize) -> Self {
        Self {
            next_seq: 1,
            lcg: 0x2545_f491_4f6c_dd1d,
            num_threads,
        }
    }

    fn next(&mut self) -> u64 {
        self.lcg = self
            .lcg
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.lcg >> 33
    }

    /// Dispatches up to four instructions per thread, stopping at `Full`.
    fn dispatch_some(&mut self, sim: &mut Simulator) {
        for tid in 0..self.num_threads {
            for _ in 0..4 {
                let r = self.next();
                let op_class = match r % 10 {
                    0..=4 => OpClass::IntAlu,
                    5 => OpClass::IntMult,
                    6 => OpClass::FloatAdd,
                    7 => OpClass::FloatMult,
                    8 => OpClass::MemRead,
                    _ => OpClass::MemWrite,
                };
                let src_a = 1 + (self.next() as usize % 63);
                let src_b = 1 + (self.next() as usize % 63);
                let dest = 1 + (self.next() as usize % 63);

                let seq = SeqNum(self.next_seq);
                let mut inst = match op_class {
                    OpClass::MemWrite => {
                        DynInst::new(seq, tid, op_class, vec![src_a, src_b], vec![])
                    }
                    OpClass::MemRead => DynInst::new(seq, tid, op_class, vec![src_a], vec![dest]),
                    _ => DynInst::new(seq, tid, op_class, vec![src_a, src_b], vec![dest]),
                };
                inst.pc = 0x1000 + 4 * seq.0;
                inst.control = op_class == OpClass::IntAlu && r % 17 == 0;

                let result = if op_class == OpClass::MemWrite {
                    sim.dispatch_non_spec(inst)
                } else {
                    sim.dispatch(inst)
                };
                match result {
                    Ok(_) => self.next_seq += 1,
                    Err(_) => break,
                }
            }
        }
    }
}
