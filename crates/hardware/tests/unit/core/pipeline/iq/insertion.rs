//! Insertion, capacity accounting, and SMT sharing policies.

use smtsim_core::common::error::IqError;
use smtsim_core::common::reg::{SeqNum, ZERO_REG};
use smtsim_core::config::{Config, IqPolicy};
use smtsim_core::core::inst::OpClass;

use crate::common::builder::inst::{alu, InstBuilder};
use crate::common::harness::TestContext;

#[test]
fn test_zero_source_inst_is_ready_at_insert() {
    let mut ctx = TestContext::new();
    let id = ctx.iq.insert(alu(1, vec![], vec![5])).unwrap();
    assert!(ctx.iq.get_inst(id).unwrap().queued);
}

#[test]
fn test_zero_register_dest_does_no_tracking() {
    let mut ctx = TestContext::new();
    ctx.iq.insert(alu(1, vec![], vec![ZERO_REG])).unwrap();
    assert!(ctx.iq.scoreboard().is_ready(ZERO_REG));
    assert!(ctx.iq.dep_graph().producer(ZERO_REG).is_none());

    // A consumer of the zero register is not parked either.
    let id = ctx.iq.insert(alu(2, vec![ZERO_REG], vec![7])).unwrap();
    assert!(ctx.iq.get_inst(id).unwrap().queued);
    assert_eq!(ctx.iq.dep_graph().live_nodes(), 0);
}

#[test]
fn test_entry_conservation_through_insert_and_issue() {
    let mut ctx = TestContext::new();
    let capacity = ctx.iq.num_free_entries();

    for seq in 1..=4 {
        ctx.iq.insert(alu(seq, vec![], vec![])).unwrap();
    }
    assert_eq!(ctx.iq.num_free_entries() + ctx.iq.get_count(0), capacity);

    ctx.cycle();
    // Entries return to the pool at issue.
    assert_eq!(ctx.iq.num_free_entries(), capacity);
    assert_eq!(ctx.iq.get_count(0), 0);
}

#[test]
fn test_insert_then_squash_restores_everything() {
    let mut ctx = TestContext::new();
    let free_before = ctx.iq.num_free_entries();

    ctx.iq.insert(alu(1, vec![1, 2], vec![3])).unwrap();
    ctx.iq.insert(alu(2, vec![3, 4], vec![5])).unwrap();
    ctx.iq.squash(0, SeqNum(0));

    assert_eq!(ctx.iq.num_free_entries(), free_before);
    assert_eq!(ctx.iq.get_count(0), 0);
    assert_eq!(ctx.iq.num_in_flight(0), 0);
    assert_eq!(ctx.iq.dep_graph().live_nodes(), 0);
    assert!(ctx.iq.dep_graph().producer(3).is_none());
    assert!(ctx.iq.dep_graph().producer(5).is_none());
    assert!(ctx.iq.scoreboard().is_ready(3));
    assert!(ctx.iq.scoreboard().is_ready(5));
}

#[test]
fn test_full_rejection_mutates_nothing() {
    let mut config = Config::default();
    config.core.num_entries = 2;
    let mut ctx = TestContext::with_config(&config);

    ctx.iq.insert(alu(1, vec![], vec![])).unwrap();
    ctx.iq.insert(alu(2, vec![], vec![])).unwrap();

    let count_before = ctx.iq.get_count(0);
    let added_before = ctx.iq.stats.insts_added;
    assert_eq!(
        ctx.iq.insert(alu(3, vec![], vec![])),
        Err(IqError::Full { tid: 0 })
    );
    assert_eq!(ctx.iq.get_count(0), count_before);
    assert_eq!(ctx.iq.stats.insts_added, added_before);
    assert_eq!(ctx.iq.num_free_entries(), 0);
}

#[test]
fn test_partitioned_smt_isolation() {
    let mut config = Config::default();
    config.core.num_threads = 2;
    config.core.num_entries = 64;
    config.core.iq_policy = IqPolicy::Partitioned;
    let mut ctx = TestContext::with_config(&config);

    assert_eq!(ctx.iq.entry_amount(2), 32);

    for seq in 1..=32 {
        ctx.iq.insert(alu(seq, vec![], vec![])).unwrap();
    }
    assert!(ctx.iq.is_full_tid(0));
    assert_eq!(
        ctx.iq.insert(alu(33, vec![], vec![])),
        Err(IqError::Full { tid: 0 })
    );

    // The other thread's partition is untouched.
    assert!(!ctx.iq.is_full_tid(1));
    ctx.iq
        .insert(InstBuilder::new(34).tid(1).build())
        .unwrap();
    assert_eq!(ctx.iq.get_count(1), 1);
}

#[test]
fn test_threshold_policy_caps_per_thread() {
    let mut config = Config::default();
    config.core.num_threads = 2;
    config.core.num_entries = 64;
    config.core.iq_policy = IqPolicy::Threshold;
    config.core.threshold = 4;
    let mut ctx = TestContext::with_config(&config);

    for seq in 1..=4 {
        ctx.iq.insert(alu(seq, vec![], vec![])).unwrap();
    }
    assert_eq!(
        ctx.iq.insert(alu(5, vec![], vec![])),
        Err(IqError::Full { tid: 0 })
    );
    assert_eq!(ctx.iq.num_free_entries(), 60);
}

#[test]
fn test_reset_entries_after_thread_change() {
    let mut config = Config::default();
    config.core.num_threads = 2;
    config.core.iq_policy = IqPolicy::Partitioned;
    let mut ctx = TestContext::with_config(&config);

    assert_eq!(ctx.iq.entry_amount(2), 32);
    ctx.iq.reset_entries(&[0]);
    for seq in 1..=64 {
        ctx.iq.insert(alu(seq, vec![], vec![])).unwrap();
    }
    assert!(ctx.iq.is_full());
}

#[test]
fn test_advance_tail_reserves_no_entry() {
    let mut ctx = TestContext::new();
    let free_before = ctx.iq.num_free_entries();
    ctx.iq.advance_tail(SeqNum(1), 0);
    ctx.iq.advance_tail(SeqNum(2), 0);
    assert_eq!(ctx.iq.num_free_entries(), free_before);
    assert_eq!(ctx.iq.num_in_flight(0), 0);

    // Dispatch resumes after the recorded tail.
    ctx.iq.insert(alu(3, vec![], vec![])).unwrap();
}

#[test]
fn test_insert_counts_by_kind() {
    let mut ctx = TestContext::new();
    ctx.iq.insert(alu(1, vec![], vec![])).unwrap();
    ctx.iq
        .insert_non_spec(InstBuilder::new(2).op(OpClass::IprAccess).build())
        .unwrap();
    assert_eq!(ctx.iq.stats.insts_added, 2);
    assert_eq!(ctx.iq.stats.non_spec_insts_added, 1);
}
