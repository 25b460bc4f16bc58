//! Ready-queue selection: width, age order, latencies, FU contention.

use smtsim_core::config::{Config, FuDesc};
use smtsim_core::core::inst::OpClass;

use crate::common::builder::inst::{alu, InstBuilder};
use crate::common::harness::TestContext;

/// Config with a single unit group covering IntAlu.
fn int_alu_config(count: usize, op_latency: u64, pipelined: bool) -> Config {
    let mut config = Config::default();
    config.fu_pool.units = vec![FuDesc {
        count,
        op_classes: vec![OpClass::IntAlu],
        op_latency,
        pipelined,
    }];
    config
}

#[test]
fn test_simple_chain_issues_back_to_back() {
    let mut ctx = TestContext::new();
    ctx.iq.insert(alu(1, vec![1, 2], vec![3])).unwrap();
    ctx.iq.insert(alu(2, vec![3, 4], vec![5])).unwrap();

    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![1]);

    // The unit-latency completion wakes the consumer for the next cycle.
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![2]);
    assert_eq!(ctx.iq.stats.int_insts_issued, 2);
}

#[test]
fn test_cross_class_age_order() {
    let mut ctx = TestContext::new();
    ctx.iq
        .insert(
            InstBuilder::new(10)
                .op(OpClass::FloatAdd)
                .dests(vec![300])
                .build(),
        )
        .unwrap();
    ctx.iq.insert(alu(11, vec![], vec![5])).unwrap();

    let slot = ctx.cycle();
    // Both issue in one cycle, the older FP instruction first.
    assert_eq!(TestContext::issued_seqs(&slot), vec![10, 11]);
    assert_eq!(
        ctx.iq.stats.issued_inst_type.get(0, OpClass::FloatAdd.index()),
        1
    );
    assert_eq!(
        ctx.iq.stats.issued_inst_type.get(0, OpClass::IntAlu.index()),
        1
    );
}

#[test]
fn test_same_class_issues_oldest_strictly_first() {
    let mut config = Config::default();
    config.core.total_width = 1;
    let mut ctx = TestContext::with_config(&config);

    ctx.iq.insert(alu(7, vec![], vec![])).unwrap();
    ctx.iq.insert(alu(3, vec![], vec![])).unwrap();
    ctx.iq.insert(alu(5, vec![], vec![])).unwrap();

    assert_eq!(TestContext::issued_seqs(&ctx.cycle()), vec![3]);
    assert_eq!(TestContext::issued_seqs(&ctx.cycle()), vec![5]);
    assert_eq!(TestContext::issued_seqs(&ctx.cycle()), vec![7]);
}

#[test]
fn test_zero_width_never_issues() {
    let mut config = Config::default();
    config.core.total_width = 0;
    let mut ctx = TestContext::with_config(&config);

    for seq in 1..=6 {
        ctx.iq.insert(alu(seq, vec![], vec![])).unwrap();
    }
    ctx.cycles(10);
    assert_eq!(ctx.iq.stats.insts_issued, 0);
    assert!(ctx.iq.has_ready_insts());
    assert_eq!(ctx.iq.get_count(0), 6);
}

#[test]
fn test_zero_latency_unit_chains_same_cycle() {
    let mut ctx = TestContext::with_config(&int_alu_config(2, 0, true));
    ctx.iq.insert(alu(1, vec![], vec![3])).unwrap();
    ctx.iq.insert(alu(2, vec![3], vec![4])).unwrap();

    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![1, 2]);
    assert!(ctx.events.is_empty());
}

#[test]
fn test_fu_contention_spills_to_next_cycle() {
    let mut ctx = TestContext::with_config(&int_alu_config(1, 1, true));
    ctx.iq.insert(alu(1, vec![], vec![])).unwrap();
    ctx.iq.insert(alu(2, vec![], vec![])).unwrap();

    assert_eq!(TestContext::issued_seqs(&ctx.cycle()), vec![1]);
    assert!(ctx.iq.stats.fu_busy[OpClass::IntAlu.index()] >= 1);

    // The pipelined unit frees at the cycle boundary.
    assert_eq!(TestContext::issued_seqs(&ctx.cycle()), vec![2]);
}

#[test]
fn test_unpipelined_unit_blocks_until_completion() {
    let mut ctx = TestContext::with_config(&int_alu_config(1, 3, false));
    ctx.iq.insert(alu(1, vec![], vec![])).unwrap();
    ctx.iq.insert(alu(2, vec![], vec![])).unwrap();

    assert_eq!(TestContext::issued_seqs(&ctx.cycle()), vec![1]);
    // Cycles 2 and 3: the only unit is held by the first instruction.
    assert!(TestContext::issued_seqs(&ctx.cycle()).is_empty());
    assert!(TestContext::issued_seqs(&ctx.cycle()).is_empty());
    // Completion at cycle 4 frees the unit before scheduling.
    assert_eq!(TestContext::issued_seqs(&ctx.cycle()), vec![2]);
}

#[test]
fn test_no_op_class_needs_no_unit() {
    let mut ctx = TestContext::with_config(&int_alu_config(1, 1, true));
    ctx.iq
        .insert(InstBuilder::new(1).op(OpClass::NoOpClass).build())
        .unwrap();
    ctx.iq.insert(alu(2, vec![], vec![])).unwrap();

    // Both issue: the nop consumes no unit.
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![1, 2]);
    assert_eq!(ctx.iq.stats.misc_insts_issued, 1);
}

#[test]
fn test_issued_inst_leaves_ready_queues() {
    let mut ctx = TestContext::new();
    let id = ctx.iq.insert(alu(1, vec![], vec![])).unwrap();
    ctx.cycle();

    let inst = ctx.iq.get_inst(id).unwrap();
    assert!(inst.issued);
    assert!(!inst.queued);
    // Nothing is left to issue.
    assert!(TestContext::issued_seqs(&ctx.cycle()).is_empty());
    assert_eq!(ctx.iq.stats.insts_issued, 1);
}

#[test]
fn test_total_width_bounds_issue() {
    let mut config = Config::default();
    config.core.total_width = 3;
    let mut ctx = TestContext::with_config(&config);

    for seq in 1..=5 {
        ctx.iq.insert(alu(seq, vec![], vec![])).unwrap();
    }
    assert_eq!(TestContext::issued_seqs(&ctx.cycle()), vec![1, 2, 3]);
    assert_eq!(TestContext::issued_seqs(&ctx.cycle()), vec![4, 5]);
    assert_eq!(ctx.iq.stats.n_issued_dist.bucket(3), 1);
    assert_eq!(ctx.iq.stats.n_issued_dist.bucket(2), 1);
}

#[test]
fn test_branch_issue_mix() {
    let mut ctx = TestContext::new();
    ctx.iq
        .insert(InstBuilder::new(1).control().build())
        .unwrap();
    ctx.cycle();
    assert_eq!(ctx.iq.stats.branch_insts_issued, 1);
    assert_eq!(ctx.iq.stats.int_insts_issued, 0);
}
