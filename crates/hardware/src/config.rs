//! Configuration system for the issue queue simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the simulator. It provides:
//! 1. **Defaults:** Baseline hardware constants (queue capacity, widths,
//!    register file sizes, functional unit latencies).
//! 2. **Structures:** Hierarchical config for general, core, register, and
//!    functional unit pool parameters.
//! 3. **Enums:** SMT resource sharing policy selection.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or via
//! `Config::default()` for the CLI.

use serde::Deserialize;

use crate::common::constants::MAX_THREADS;
use crate::core::inst::OpClass;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in the supplied JSON.
mod defaults {
    /// Total instruction queue capacity across all threads.
    pub const NUM_IQ_ENTRIES: usize = 64;

    /// Maximum number of instructions issued per cycle.
    pub const ISSUE_WIDTH: usize = 8;

    /// Maximum number of instructions removed by a squash per cycle.
    pub const SQUASH_WIDTH: usize = 8;

    /// Number of physical integer registers.
    ///
    /// The flat physical register space places integer registers first;
    /// index 0 is the hardwired zero register.
    pub const NUM_PHYS_INT_REGS: usize = 256;

    /// Number of physical floating-point registers.
    ///
    /// Floating-point registers follow the integer registers in the flat
    /// physical register space.
    pub const NUM_PHYS_FLOAT_REGS: usize = 256;

    /// Delay in cycles for commit-stage signals to reach the issue stage.
    pub const COMMIT_TO_IEW_DELAY: usize = 1;

    /// Per-thread entry cap under the Threshold sharing policy.
    pub const IQ_THRESHOLD: usize = 32;

    /// Number of cycles a simulation runs when no limit is given.
    pub const MAX_CYCLES: u64 = 10_000;
}

/// Instruction queue resource sharing policy for SMT.
///
/// Chooses how the fixed pool of queue entries is divided among the active
/// hardware threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum IqPolicy {
    /// All entries are shared; any thread may fill the whole queue.
    #[default]
    Dynamic,
    /// Entries are split evenly among active threads; threads are isolated.
    Partitioned,
    /// Entries are shared, but each thread is capped at a fixed threshold.
    Threshold,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use smtsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.core.num_entries, 64);
/// assert_eq!(config.core.total_width, 8);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use smtsim_core::config::{Config, IqPolicy};
///
/// let json = r#"{
///     "general": { "trace": false, "max_cycles": 2000 },
///     "core": {
///         "num_threads": 2,
///         "num_entries": 32,
///         "total_width": 4,
///         "iq_policy": "Partitioned"
///     },
///     "regs": { "num_phys_int_regs": 128, "num_phys_float_regs": 128 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.core.num_threads, 2);
/// assert_eq!(config.core.iq_policy, IqPolicy::Partitioned);
/// assert_eq!(config.regs.num_phys_int_regs, 128);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Core issue parameters (capacity, widths, policy, delays).
    #[serde(default)]
    pub core: CoreConfig,
    /// Physical register file sizes.
    #[serde(default)]
    pub regs: RegConfig,
    /// Functional unit pool description.
    #[serde(default)]
    pub fu_pool: FuPoolConfig,
}

impl Config {
    /// Deserializes a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// General simulation settings and options.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Enable per-instruction tracing of insert/issue/squash decisions.
    #[serde(default)]
    pub trace: bool,

    /// Cycle budget for a CLI run.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl GeneralConfig {
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

/// Core issue parameters: queue capacity, widths, policy, and delays.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Number of active hardware threads. Must not exceed `MAX_THREADS`.
    #[serde(default = "CoreConfig::default_num_threads")]
    pub num_threads: usize,

    /// Total instruction queue capacity.
    #[serde(default = "CoreConfig::default_num_entries")]
    pub num_entries: usize,

    /// Maximum instructions issued per cycle, across all op classes.
    #[serde(default = "CoreConfig::default_total_width")]
    pub total_width: usize,

    /// Maximum instructions removed by an in-progress squash per cycle.
    #[serde(default = "CoreConfig::default_squash_width")]
    pub squash_width: usize,

    /// Entry sharing policy among SMT threads.
    #[serde(default)]
    pub iq_policy: IqPolicy,

    /// Per-thread entry cap; only meaningful under `IqPolicy::Threshold`.
    #[serde(default = "CoreConfig::default_threshold")]
    pub threshold: usize,

    /// Cycles for commit signals to travel back to the issue stage.
    #[serde(default = "CoreConfig::default_commit_to_iew_delay")]
    pub commit_to_iew_delay: usize,
}

impl CoreConfig {
    fn default_num_threads() -> usize {
        1
    }

    fn default_num_entries() -> usize {
        defaults::NUM_IQ_ENTRIES
    }

    fn default_total_width() -> usize {
        defaults::ISSUE_WIDTH
    }

    fn default_squash_width() -> usize {
        defaults::SQUASH_WIDTH
    }

    fn default_threshold() -> usize {
        defaults::IQ_THRESHOLD
    }

    fn default_commit_to_iew_delay() -> usize {
        defaults::COMMIT_TO_IEW_DELAY
    }

    /// Checks structural limits that cannot be expressed in serde.
    pub fn validate(&self) -> bool {
        self.num_threads >= 1 && self.num_threads <= MAX_THREADS
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            num_threads: 1,
            num_entries: defaults::NUM_IQ_ENTRIES,
            total_width: defaults::ISSUE_WIDTH,
            squash_width: defaults::SQUASH_WIDTH,
            iq_policy: IqPolicy::Dynamic,
            threshold: defaults::IQ_THRESHOLD,
            commit_to_iew_delay: defaults::COMMIT_TO_IEW_DELAY,
        }
    }
}

/// Physical register file sizes.
#[derive(Debug, Clone, Deserialize)]
pub struct RegConfig {
    /// Number of physical integer registers (including the zero register).
    #[serde(default = "RegConfig::default_int")]
    pub num_phys_int_regs: usize,

    /// Number of physical floating-point registers.
    #[serde(default = "RegConfig::default_float")]
    pub num_phys_float_regs: usize,
}

impl RegConfig {
    fn default_int() -> usize {
        defaults::NUM_PHYS_INT_REGS
    }

    fn default_float() -> usize {
        defaults::NUM_PHYS_FLOAT_REGS
    }

    /// Total size of the flat physical register space.
    #[inline]
    pub fn num_phys_regs(&self) -> usize {
        self.num_phys_int_regs + self.num_phys_float_regs
    }
}

impl Default for RegConfig {
    fn default() -> Self {
        Self {
            num_phys_int_regs: defaults::NUM_PHYS_INT_REGS,
            num_phys_float_regs: defaults::NUM_PHYS_FLOAT_REGS,
        }
    }
}

/// Description of one group of identical functional units.
#[derive(Debug, Clone, Deserialize)]
pub struct FuDesc {
    /// How many identical units this group contributes.
    pub count: usize,

    /// Op classes the units can execute.
    pub op_classes: Vec<OpClass>,

    /// Latency in cycles from issue to result for these units.
    pub op_latency: u64,

    /// Whether a new operation can start every cycle. A fully pipelined
    /// unit is released at issue; an unpipelined one is held until its
    /// operation completes.
    #[serde(default = "FuDesc::default_pipelined")]
    pub pipelined: bool,
}

impl FuDesc {
    fn default_pipelined() -> bool {
        true
    }
}

/// Functional unit pool description.
#[derive(Debug, Clone, Deserialize)]
pub struct FuPoolConfig {
    /// Unit groups making up the pool.
    #[serde(default = "FuPoolConfig::default_units")]
    pub units: Vec<FuDesc>,
}

impl FuPoolConfig {
    /// Default pool modeled after a wide superscalar core: six integer
    /// ALUs, shared multiply/divide, four FP pipes, and four memory ports.
    fn default_units() -> Vec<FuDesc> {
        vec![
            FuDesc {
                count: 6,
                op_classes: vec![OpClass::IntAlu],
                op_latency: 1,
                pipelined: true,
            },
            FuDesc {
                count: 2,
                op_classes: vec![OpClass::IntMult, OpClass::IntDiv],
                op_latency: 3,
                pipelined: true,
            },
            FuDesc {
                count: 4,
                op_classes: vec![OpClass::FloatAdd, OpClass::FloatCmp, OpClass::FloatCvt],
                op_latency: 2,
                pipelined: true,
            },
            FuDesc {
                count: 2,
                op_classes: vec![OpClass::FloatMult, OpClass::FloatDiv, OpClass::FloatSqrt],
                op_latency: 4,
                pipelined: false,
            },
            FuDesc {
                count: 4,
                op_classes: vec![OpClass::MemRead, OpClass::MemWrite, OpClass::InstPrefetch],
                op_latency: 1,
                pipelined: true,
            },
            FuDesc {
                count: 1,
                op_classes: vec![OpClass::IprAccess],
                op_latency: 3,
                pipelined: false,
            },
        ]
    }
}

impl Default for FuPoolConfig {
    fn default() -> Self {
        Self {
            units: Self::default_units(),
        }
    }
}
