//! The non-speculative gate: commit-released scheduling and barriers.

use smtsim_core::common::error::IqError;
use smtsim_core::common::reg::SeqNum;

use crate::common::builder::inst::{alu, barrier, load, store};
use crate::common::harness::TestContext;

#[test]
fn test_non_spec_store_waits_for_commit() {
    let mut ctx = TestContext::new();
    // Operands are available from the start, but the store must not
    // appear in any ready queue until commit releases it.
    ctx.iq.insert_non_spec(store(5, vec![1, 2])).unwrap();

    for _ in 0..6 {
        assert!(ctx.cycle().insts.is_empty());
    }

    ctx.iq.schedule_non_spec(SeqNum(5)).unwrap();
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![5]);
    assert_eq!(ctx.iq.stats.mem_insts_issued, 1);
    assert_eq!(ctx.now, 7);
}

#[test]
fn test_non_spec_waits_for_operands_too() {
    let mut ctx = TestContext::new();
    ctx.iq.insert(alu(1, vec![8, 9], vec![3])).unwrap();
    ctx.iq.insert_non_spec(store(2, vec![3])).unwrap();

    // Released by commit before its operand exists: still not issuable.
    ctx.iq.schedule_non_spec(SeqNum(2)).unwrap();
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![1]);

    // The producer's completion makes it ready the normal way.
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![2]);
}

#[test]
fn test_schedule_non_spec_unknown_seq_errors() {
    let mut ctx = TestContext::new();
    assert_eq!(
        ctx.iq.schedule_non_spec(SeqNum(77)),
        Err(IqError::UnknownSeqNum { seq: SeqNum(77) })
    );
}

#[test]
fn test_barrier_orders_memory_ops() {
    let mut ctx = TestContext::new();
    ctx.iq.insert(store(1, vec![1])).unwrap();
    ctx.iq.insert_barrier(barrier(2)).unwrap();
    let after = ctx.iq.insert(load(3, 4, 20)).unwrap();

    // The load sits behind the barrier even though its operand is ready.
    assert!(!ctx.iq.get_inst(after).unwrap().queued);

    // Cycle 1: the store (older than the barrier) issues.
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![1]);
    // Cycle 2: the store completes; the barrier is still commit-gated.
    assert!(ctx.cycle().insts.is_empty());

    ctx.iq.schedule_non_spec(SeqNum(2)).unwrap();
    let slot = ctx.cycle();
    // The barrier issues, completes in place, and unblocks the load in
    // the same scheduling pass.
    assert_eq!(TestContext::issued_seqs(&slot), vec![2, 3]);
}

#[test]
fn test_barrier_waits_for_older_memory_ops() {
    let mut ctx = TestContext::new();
    // The store's operand never becomes ready, so it cannot complete.
    ctx.iq.insert(alu(1, vec![8, 9], vec![3])).unwrap();
    ctx.iq.insert(store(2, vec![3])).unwrap();
    ctx.iq.insert_barrier(barrier(3)).unwrap();
    ctx.iq.schedule_non_spec(SeqNum(3)).unwrap();

    // Producer issues; the barrier must not outrun the store.
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![1]);

    // Store wakes and issues; the barrier follows once it completes.
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![2]);
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![3]);
}
