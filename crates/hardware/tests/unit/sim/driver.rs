//! End-to-end runs through the per-cycle driver.

use smtsim_core::common::reg::SeqNum;
use smtsim_core::config::{Config, IqPolicy};
use smtsim_core::core::inst::{DynInst, OpClass};
use smtsim_core::Simulator;

use crate::common::builder::inst::{alu, InstBuilder};

#[test]
fn test_commit_wire_delay_is_honored() {
    let mut config = Config::default();
    config.core.commit_to_iew_delay = 2;
    let mut sim = Simulator::new(&config);
    sim.dispatch(alu(1, vec![], vec![3])).unwrap();
    assert!(sim.drain(30));
    assert_eq!(sim.iq.num_in_flight(0), 0);
}

#[test]
fn test_two_thread_partitioned_run() {
    let mut config = Config::default();
    config.core.num_threads = 2;
    config.core.iq_policy = IqPolicy::Partitioned;
    let mut sim = Simulator::new(&config);

    let mut seq = 0;
    for round in 0..8usize {
        for tid in 0..2 {
            seq += 1;
            // Physical destinations are unique across the whole window,
            // as rename guarantees.
            let dest = 10 + round * 2 + tid;
            sim.dispatch(InstBuilder::new(seq).tid(tid).dests(vec![dest]).build())
                .unwrap();
        }
    }
    assert!(sim.drain(100));
    assert_eq!(sim.stats().insts_issued, 16);
    assert_eq!(
        sim.stats().issued_inst_type.get(0, OpClass::IntAlu.index()),
        8
    );
    assert_eq!(
        sim.stats().issued_inst_type.get(1, OpClass::IntAlu.index()),
        8
    );
}

#[test]
fn test_load_chain_through_driver() {
    let mut sim = Simulator::new(&Config::default());
    // Load feeds an add which feeds a store.
    sim.dispatch(
        InstBuilder::new(1)
            .op(OpClass::MemRead)
            .srcs(vec![2])
            .dests(vec![20])
            .build(),
    )
    .unwrap();
    sim.dispatch(alu(2, vec![20], vec![21])).unwrap();
    let mut st = DynInst::new(SeqNum(3), 0, OpClass::MemWrite, vec![21], vec![]);
    st.pc = 0x80;
    sim.dispatch_non_spec(st).unwrap();

    assert!(sim.drain(50));
    assert_eq!(sim.stats().mem_insts_issued, 2);
    assert_eq!(sim.stats().int_insts_issued, 1);
}

#[test]
fn test_issue_rate_derivation() {
    let mut sim = Simulator::new(&Config::default());
    for seq in 1..=8 {
        sim.dispatch(alu(seq, vec![], vec![])).unwrap();
    }
    assert!(sim.drain(50));
    let stats = sim.stats();
    assert_eq!(stats.insts_issued, 8);
    assert!(stats.issue_rate() > 0.0);
    assert!(stats.issue_rate() <= stats.cycles as f64);
}

#[test]
fn test_squash_mid_flight_then_refill() {
    let mut sim = Simulator::new(&Config::default());
    sim.dispatch_non_spec(DynInst::new(
        SeqNum(1),
        0,
        OpClass::IprAccess,
        vec![],
        vec![9],
    ))
    .unwrap();
    for seq in 2..=6 {
        let prev = 7 + seq as usize;
        sim.dispatch(alu(seq, vec![prev], vec![prev + 1])).unwrap();
    }

    sim.signal_squash(0, SeqNum(1));
    sim.run(3);
    assert_eq!(sim.iq.num_in_flight(0), 1);

    // New work after the squash proceeds normally.
    sim.dispatch(alu(10, vec![], vec![40])).unwrap();
    assert!(sim.drain(40));
    assert!(sim.stats().squashed_insts_examined >= 5);
}
