//! Issue-side statistics collection and reporting.
//!
//! This module tracks performance metrics for the instruction queue. It
//! provides:
//! 1. **Throughput:** Instructions added and issued, with derived issue
//!    rate.
//! 2. **Issue mix:** Counts by category (integer, FP, branch, memory,
//!    miscellaneous) and a thread-by-class histogram.
//! 3. **Squash telemetry:** Instructions and operands examined, ready
//!    instructions lost, non-speculative entries removed.
//! 4. **Functional units:** Busy-cycle counts per op class with derived
//!    busy rate.
//! 5. **Distributions:** Issues per cycle, queue residency, and
//!    ready-to-issue delay.

use crate::common::constants::MAX_THREADS;
use crate::core::inst::OpClass;

/// Bucketed sample distribution with overflow tracking.
///
/// Buckets are one unit wide starting at zero; samples past the last
/// bucket are counted in `overflow`.
#[derive(Clone, Debug)]
pub struct Distribution {
    buckets: Vec<u64>,
    /// Samples larger than the largest bucket.
    pub overflow: u64,
    /// Number of recorded samples.
    pub samples: u64,
    /// Sum of all recorded samples.
    pub sum: u64,
}

impl Distribution {
    /// Creates a distribution covering values `0..=max`.
    pub fn new(max: usize) -> Self {
        Self {
            buckets: vec![0; max + 1],
            overflow: 0,
            samples: 0,
            sum: 0,
        }
    }

    /// Records one sample.
    pub fn record(&mut self, value: u64) {
        match self.buckets.get_mut(value as usize) {
            Some(bucket) => *bucket += 1,
            None => self.overflow += 1,
        }
        self.samples += 1;
        self.sum += value;
    }

    /// Count in one bucket.
    #[inline]
    pub fn bucket(&self, value: usize) -> u64 {
        self.buckets.get(value).copied().unwrap_or(0)
    }

    /// Arithmetic mean of the recorded samples, or zero if none.
    pub fn mean(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.sum as f64 / self.samples as f64
        }
    }
}

/// Two-dimensional counter table (rows x columns).
#[derive(Clone, Debug)]
pub struct Vector2d {
    cols: usize,
    data: Vec<u64>,
}

impl Vector2d {
    /// Creates a zeroed table.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// Increments one cell.
    pub fn record(&mut self, row: usize, col: usize) {
        self.data[row * self.cols + col] += 1;
    }

    /// Reads one cell.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.data[row * self.cols + col]
    }
}

/// Statistics structure tracking all issue-side metrics.
#[derive(Clone, Debug)]
pub struct IqStats {
    /// Total simulated cycles elapsed.
    pub cycles: u64,

    /// Instructions added to the queue.
    pub insts_added: u64,
    /// Non-speculative instructions added to the queue.
    pub non_spec_insts_added: u64,

    /// Instructions issued, all classes.
    pub insts_issued: u64,
    /// Integer instructions issued.
    pub int_insts_issued: u64,
    /// Floating-point instructions issued.
    pub float_insts_issued: u64,
    /// Branch instructions issued.
    pub branch_insts_issued: u64,
    /// Memory instructions issued.
    pub mem_insts_issued: u64,
    /// Miscellaneous (non-int, non-FP, non-mem) instructions issued.
    pub misc_insts_issued: u64,

    /// Squashed instructions encountered where an issue would have
    /// happened: drained from a ready queue, or completing on an FU.
    pub squashed_insts_issued: u64,
    /// Instructions examined by the squash walk.
    pub squashed_insts_examined: u64,
    /// Source operands examined by the squash walk.
    pub squashed_operands_examined: u64,
    /// Non-speculative entries removed by a squash.
    pub squashed_non_spec_removed: u64,

    /// Cycles an instruction wanted a unit of each class and none was free.
    pub fu_busy: [u64; OpClass::COUNT],

    /// Instructions issued per cycle.
    pub n_issued_dist: Distribution,
    /// Cycles between dispatch and issue.
    pub queue_res_dist: Distribution,
    /// Cycles between becoming ready and issuing.
    pub issue_delay_dist: Distribution,
    /// Issued instructions by thread and op class.
    pub issued_inst_type: Vector2d,
}

impl Default for IqStats {
    fn default() -> Self {
        Self::new(8)
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"issue_mix"`, `"squash"`,
/// `"fu"`. Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "issue_mix", "squash", "fu"];

impl IqStats {
    /// Creates a zeroed statistics block for the given issue width.
    pub fn new(total_width: usize) -> Self {
        Self {
            cycles: 0,
            insts_added: 0,
            non_spec_insts_added: 0,
            insts_issued: 0,
            int_insts_issued: 0,
            float_insts_issued: 0,
            branch_insts_issued: 0,
            mem_insts_issued: 0,
            misc_insts_issued: 0,
            squashed_insts_issued: 0,
            squashed_insts_examined: 0,
            squashed_operands_examined: 0,
            squashed_non_spec_removed: 0,
            fu_busy: [0; OpClass::COUNT],
            n_issued_dist: Distribution::new(total_width),
            queue_res_dist: Distribution::new(100),
            issue_delay_dist: Distribution::new(100),
            issued_inst_type: Vector2d::new(MAX_THREADS, OpClass::COUNT),
        }
    }

    /// Records one issued instruction in the per-class counters.
    pub fn record_issue(&mut self, tid: usize, op_class: OpClass, control: bool) {
        self.insts_issued += 1;
        if control {
            self.branch_insts_issued += 1;
        } else if op_class.is_mem() {
            self.mem_insts_issued += 1;
        } else if op_class.is_int() {
            self.int_insts_issued += 1;
        } else if op_class.is_float() {
            self.float_insts_issued += 1;
        } else {
            self.misc_insts_issued += 1;
        }
        self.issued_inst_type.record(tid, op_class.index());
    }

    /// Instructions issued per elapsed cycle.
    pub fn issue_rate(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.insts_issued as f64 / self.cycles as f64
        }
    }

    /// FU-busy events per elapsed cycle, summed over classes.
    pub fn fu_busy_rate(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.fu_busy.iter().sum::<u64>() as f64 / self.cycles as f64
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of `"summary"`,
    /// `"issue_mix"`, `"squash"`, or `"fu"`. Pass an empty slice to print
    /// all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);

        if want("summary") {
            println!("\n==========================================================");
            println!("INSTRUCTION QUEUE STATISTICS");
            println!("==========================================================");
            println!("sim_cycles               {}", self.cycles);
            println!("iq_insts_added           {}", self.insts_added);
            println!("iq_non_spec_added        {}", self.non_spec_insts_added);
            println!("iq_insts_issued          {}", self.insts_issued);
            println!("iq_issue_rate            {:.4}", self.issue_rate());
            println!(
                "iq_mean_issued_per_cycle {:.4}",
                self.n_issued_dist.mean()
            );
            println!(
                "iq_mean_queue_residency  {:.4}",
                self.queue_res_dist.mean()
            );
            println!(
                "iq_mean_issue_delay      {:.4}",
                self.issue_delay_dist.mean()
            );
            println!("----------------------------------------------------------");
        }
        if want("issue_mix") {
            let instr = if self.insts_issued == 0 {
                1
            } else {
                self.insts_issued
            };
            let pct = |n: u64| (n as f64 / instr as f64) * 100.0;
            println!("ISSUE MIX");
            println!(
                "  issued.int             {} ({:.2}%)",
                self.int_insts_issued,
                pct(self.int_insts_issued)
            );
            println!(
                "  issued.fp              {} ({:.2}%)",
                self.float_insts_issued,
                pct(self.float_insts_issued)
            );
            println!(
                "  issued.branch          {} ({:.2}%)",
                self.branch_insts_issued,
                pct(self.branch_insts_issued)
            );
            println!(
                "  issued.mem             {} ({:.2}%)",
                self.mem_insts_issued,
                pct(self.mem_insts_issued)
            );
            println!(
                "  issued.misc            {} ({:.2}%)",
                self.misc_insts_issued,
                pct(self.misc_insts_issued)
            );
            println!("----------------------------------------------------------");
        }
        if want("squash") {
            println!("SQUASH");
            println!("  squashed.examined      {}", self.squashed_insts_examined);
            println!(
                "  squashed.operands      {}",
                self.squashed_operands_examined
            );
            println!("  squashed.was_ready     {}", self.squashed_insts_issued);
            println!(
                "  squashed.non_spec      {}",
                self.squashed_non_spec_removed
            );
            println!("----------------------------------------------------------");
        }
        if want("fu") {
            println!("FUNCTIONAL UNITS");
            println!("  fu_busy_rate           {:.4}", self.fu_busy_rate());
            for op_class in OpClass::ALL {
                let busy = self.fu_busy[op_class.index()];
                if busy > 0 {
                    println!("  fu_busy.{:<14} {}", format!("{:?}", op_class), busy);
                }
            }
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
