//! Integration test: channel arbitration.
//!
//! Validates max-wins arbitration over arbitrary request/release sequences
//! against a plain model of the requester tables.

use ecu_common::comm::config::ComStackConfig;
use ecu_common::comm::mode::{ChannelId, ComMode, RequesterId};
use ecu_common::det::DetBuffer;
use ecu_common::error::ComError;
use ecu_comstack::ChannelModeRegistry;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

fn registry() -> ChannelModeRegistry {
    let table = ComStackConfig::default_table();
    ChannelModeRegistry::new(&table.channels, Arc::new(DetBuffer::new())).unwrap()
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Request(u8, u16, ComMode),
    Release(u8, u16),
}

fn mode_strategy() -> impl Strategy<Value = ComMode> {
    prop_oneof![
        Just(ComMode::NoCommunication),
        Just(ComMode::SilentCommunication),
        Just(ComMode::FullCommunication),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6, 0u16..6, mode_strategy()).prop_map(|(c, r, m)| Op::Request(c, r, m)),
        (0u8..6, 0u16..6).prop_map(|(c, r)| Op::Release(c, r)),
    ]
}

proptest! {
    /// Current mode is always the maximum over live requesters, or
    /// NoCommunication when none remain.
    #[test]
    fn current_mode_is_max_of_requesters(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let reg = registry();
        let mut model: HashMap<u8, HashMap<u16, ComMode>> = HashMap::new();

        for op in ops {
            match op {
                Op::Request(ch, r, m) => {
                    let result = reg.request(ChannelId(ch), RequesterId(r), m);
                    if ch < 4 {
                        prop_assert!(result.is_ok());
                        model.entry(ch).or_default().insert(r, m);
                    } else {
                        prop_assert_eq!(result, Err(ComError::InvalidChannel { channel: ch }));
                    }
                }
                Op::Release(ch, r) => {
                    let result = reg.release(ChannelId(ch), RequesterId(r));
                    if ch < 4 {
                        prop_assert!(result.is_ok());
                        model.entry(ch).or_default().remove(&r);
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
            }

            for ch in 0..4u8 {
                let expected = model
                    .get(&ch)
                    .and_then(|entries| entries.values().copied().max())
                    .unwrap_or(ComMode::NoCommunication);
                prop_assert_eq!(reg.current_mode(ChannelId(ch)), Ok(expected));
            }
        }
    }

    /// A request followed by its release restores the previous mode.
    #[test]
    fn request_then_release_restores(
        seed in prop::collection::vec((0u16..4, mode_strategy()), 0..4),
        mode in mode_strategy(),
    ) {
        let reg = registry();
        let ch = ChannelId::CAN;
        for (r, m) in seed {
            reg.request(ch, RequesterId(r), m).unwrap();
        }
        let before = reg.current_mode(ch).unwrap();

        let extra = RequesterId(0x0100);
        reg.request(ch, extra, mode).unwrap();
        prop_assert_eq!(reg.release(ch, extra), Ok(before));
    }
}

#[test]
fn silent_and_full_requesters() {
    let reg = registry();
    let ch = ChannelId(0);
    reg.request(ch, RequesterId::APPLICATION, ComMode::SilentCommunication)
        .unwrap();
    reg.request(ch, RequesterId::DIAGNOSTIC, ComMode::FullCommunication)
        .unwrap();
    assert_eq!(reg.current_mode(ch), Ok(ComMode::FullCommunication));

    reg.release(ch, RequesterId::DIAGNOSTIC).unwrap();
    assert_eq!(reg.current_mode(ch), Ok(ComMode::SilentCommunication));
}

#[test]
fn concurrent_requesters_stay_consistent() {
    let reg = Arc::new(registry());
    let handles: Vec<_> = (0..4u16)
        .map(|t| {
            let reg = Arc::clone(&reg);
            std::thread::spawn(move || {
                for i in 0..200u16 {
                    let requester = RequesterId(t);
                    let mode = ComMode::from_u8((i % 3) as u8).unwrap();
                    reg.request(ChannelId::ETHERNET, requester, mode).unwrap();
                    let current = reg.current_mode(ChannelId::ETHERNET).unwrap();
                    assert!(current >= mode);
                    reg.release(ChannelId::ETHERNET, requester).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(
        reg.current_mode(ChannelId::ETHERNET),
        Ok(ComMode::NoCommunication)
    );
    assert_eq!(reg.is_active(ChannelId::ETHERNET), Ok(false));
}
