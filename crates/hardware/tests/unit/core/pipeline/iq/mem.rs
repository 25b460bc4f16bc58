//! Memory op protocol: reschedule/replay and ordering violations.

use smtsim_core::common::reg::SeqNum;
use smtsim_core::core::inst::OpClass;

use crate::common::builder::inst::{load, store, InstBuilder};
use crate::common::harness::TestContext;

#[test]
fn test_reschedule_then_replay_is_observably_neutral() {
    let mut ctx = TestContext::new();
    let capacity = ctx.iq.num_free_entries();
    let id = ctx.iq.insert(load(1, 2, 20)).unwrap();

    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![1]);
    assert_eq!(ctx.iq.num_free_entries(), capacity);

    // The access could not proceed (e.g. blocked cache): re-issue later.
    ctx.iq.reschedule_mem_inst(id);
    assert!(!ctx.iq.get_inst(id).unwrap().issued);
    ctx.iq.replay_mem_inst(id);
    assert!(ctx.iq.get_inst(id).unwrap().queued);

    // The replayed issue must not release the entry a second time.
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![1]);
    assert_eq!(ctx.iq.num_free_entries(), capacity);
    assert_eq!(ctx.iq.stats.mem_insts_issued, 2);
}

#[test]
fn test_rescheduled_inst_ignores_stale_completion() {
    let mut ctx = TestContext::new();
    let id = ctx.iq.insert(load(1, 2, 20)).unwrap();
    ctx.iq.insert(InstBuilder::new(2).srcs(vec![20]).build()).unwrap();

    ctx.cycle();
    ctx.iq.reschedule_mem_inst(id);

    // The first issue's completion event fires now; it must not complete
    // the rescheduled load or wake its consumer.
    ctx.cycle();
    assert!(!ctx.iq.get_inst(id).unwrap().completed);
    assert!(!ctx.iq.scoreboard().is_ready(20));
}

#[test]
fn test_violation_records_prediction_and_squash_cleans_up() {
    let mut ctx = TestContext::new();

    // An older store, parked behind the commit gate so it stays
    // incomplete, and a load that speculatively issues past it.
    let st = ctx.iq.insert_non_spec(store(15, vec![1])).unwrap();
    let ld = ctx.iq.insert(load(20, 2, 30)).unwrap();

    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![20]);

    // Execute discovers the alias.
    ctx.iq.violation(st, ld);
    ctx.iq.squash(0, SeqNum(19));
    assert!(ctx.iq.find_by_seq(0, SeqNum(20)).is_none());

    // The load's in-flight completion is dropped as squashed.
    ctx.cycle();
    assert_eq!(ctx.iq.stats.squashed_insts_issued, 1);

    // The refetched load now waits for the store it collided with.
    let pc_of = |seq: u64| 0x1000 + 4 * seq;
    let ld2 = ctx
        .iq
        .insert(InstBuilder::new(21).op(OpClass::MemRead).srcs(vec![2]).dests(vec![30]).pc(pc_of(20)).build())
        .unwrap();
    assert!(!ctx.iq.get_inst(ld2).unwrap().queued);

    // Release and complete the store; the load follows.
    ctx.iq.schedule_non_spec(SeqNum(15)).unwrap();
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![15]);
    let slot = ctx.cycle();
    assert_eq!(TestContext::issued_seqs(&slot), vec![21]);
}

#[test]
fn test_independent_loads_do_not_wait() {
    let mut ctx = TestContext::new();
    ctx.iq.insert(store(1, vec![1])).unwrap();
    let ld = ctx.iq.insert(load(2, 3, 31)).unwrap();

    // No prediction between these PCs: the load is issuable at once.
    assert!(ctx.iq.get_inst(ld).unwrap().queued);
}

#[test]
fn test_complete_mem_inst_releases_followers() {
    let mut ctx = TestContext::new();
    // A store parked on a never-ready operand, and a load predicted to
    // depend on it.
    ctx.iq.insert(InstBuilder::new(1).srcs(vec![8, 9]).dests(vec![3]).build()).unwrap();
    let st = ctx
        .iq
        .insert(InstBuilder::new(2).op(OpClass::MemWrite).srcs(vec![3]).pc(0x200).build())
        .unwrap();
    ctx.iq
        .insert(InstBuilder::new(3).op(OpClass::MemRead).srcs(vec![4]).dests(vec![31]).pc(0x300).build())
        .unwrap();

    // Teach the predictor first, then refetch the load.
    ctx.iq.squash(0, SeqNum(2));
    let pre_ld = ctx
        .iq
        .insert(InstBuilder::new(4).op(OpClass::MemRead).srcs(vec![4]).dests(vec![31]).pc(0x300).build())
        .unwrap();
    ctx.iq.violation(st, pre_ld);
    ctx.iq.squash(0, SeqNum(2));

    let ld = ctx
        .iq
        .insert(InstBuilder::new(5).op(OpClass::MemRead).srcs(vec![4]).dests(vec![31]).pc(0x300).build())
        .unwrap();
    assert!(!ctx.iq.get_inst(ld).unwrap().queued);

    // Completing the store through the terminal callback releases it.
    ctx.iq.complete_mem_inst(st);
    assert!(ctx.iq.get_inst(ld).unwrap().queued);
}
