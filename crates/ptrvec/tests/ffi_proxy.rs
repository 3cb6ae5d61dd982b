//! End-to-end tests of the proxy over the real C ABI bridge.

use proptest::prelude::*;
use ptrvec::{
    Address, ArenaConfig, ContainerError, FfiBridge, NativeBridge, NestedPointerContainer,
    OpaquePtr,
};

fn p(addr: usize) -> OpaquePtr {
    OpaquePtr::from_addr(addr)
}

#[test]
fn resize_row_then_set_scenario() {
    let mut c = NestedPointerContainer::with_rows(3).unwrap();
    c.resize_row(1, 5).unwrap();
    c.set(1, 4, p(0xdead_0000)).unwrap();

    assert_eq!(c.row_len(1).unwrap(), 5);
    assert_eq!(c.get(1, 4).unwrap(), p(0xdead_0000));
    for j in 0..4 {
        assert!(c.get(1, j).unwrap().is_null());
    }
    assert_eq!(c.len().unwrap(), 3);
    assert!(c.row_is_empty(0).unwrap());
    assert!(c.row_is_empty(2).unwrap());
}

#[test]
fn wrap_of_externally_owned_container() {
    let owner = NestedPointerContainer::from_rows(&[vec![p(0x10), p(0x20)]]).unwrap();
    {
        let mut view = NestedPointerContainer::wrap(owner.address());
        assert!(!view.owns());
        assert_eq!(view.get(0, 1).unwrap(), p(0x20));
        view.set(0, 0, p(0x30)).unwrap();
    }
    // Dropping the wrap left the owner's object alive, with the write.
    assert!(owner.is_valid());
    assert_eq!(owner.to_rows().unwrap(), vec![vec![p(0x30), p(0x20)]]);
}

#[test]
fn wrap_outliving_owner_is_invalid() {
    let owner = NestedPointerContainer::with_rows(1).unwrap();
    let view = NestedPointerContainer::wrap(owner.address());
    let address = owner.address();
    drop(owner);
    assert!(!view.is_valid());
    assert_eq!(view.len(), Err(ContainerError::InvalidState { address }));
}

#[test]
fn drop_releases_native_object() {
    let c = NestedPointerContainer::with_rows(2).unwrap();
    let address = c.address();
    drop(c);
    assert_eq!(
        FfiBridge::new().len(address),
        Err(ContainerError::InvalidState { address })
    );
}

#[test]
fn released_proxy_is_invalid() {
    let mut c = NestedPointerContainer::new().unwrap();
    c.release().unwrap();
    assert_eq!(
        c.resize(2),
        Err(ContainerError::InvalidState {
            address: Address::NULL
        })
    );
}

#[test]
fn into_address_hands_over_release() {
    let c = NestedPointerContainer::with_rows(1).unwrap();
    let address = c.into_address();
    let bridge = FfiBridge::new();
    assert_eq!(bridge.len(address).unwrap(), 1);
    bridge.release(address).unwrap();
}

#[test]
fn resize_down_then_up() {
    let mut c = NestedPointerContainer::from_rows(&[
        vec![p(1)],
        vec![p(2), p(3)],
        vec![p(4), p(5), p(6)],
    ])
    .unwrap();
    c.resize(1).unwrap();
    assert_eq!(c.len().unwrap(), 1);
    c.resize(3).unwrap();
    assert_eq!(c.to_rows().unwrap(), vec![vec![p(1)], vec![], vec![]]);
}

#[test]
fn assign_copies_values_not_pointees() {
    let src = NestedPointerContainer::from_rows(&[vec![p(0x100)], vec![p(0x200), p(0x300)]]).unwrap();
    let mut dst = NestedPointerContainer::with_rows(5).unwrap();
    let dst_address = dst.address();

    dst.assign(&src).unwrap();
    assert_eq!(dst.address(), dst_address);
    assert_eq!(dst.to_rows().unwrap(), src.to_rows().unwrap());

    dst.set(1, 1, p(0x999)).unwrap();
    assert_eq!(src.get(1, 1).unwrap(), p(0x300));
}

#[test]
fn assign_to_itself_through_a_wrap() {
    let mut c = NestedPointerContainer::from_rows(&[[p(7)]]).unwrap();
    let alias = NestedPointerContainer::wrap(c.address());
    c.assign(&alias).unwrap();
    assert_eq!(c.get(0, 0).unwrap(), p(7));
}

#[test]
fn row_views_over_ffi() {
    let mut c = NestedPointerContainer::with_rows(2).unwrap();
    c.row_mut(1)
        .unwrap()
        .assign_from_slice(&[p(1), p(2), p(3)])
        .unwrap();
    let row = c.row(1).unwrap();
    assert_eq!(row.len().unwrap(), 3);
    assert_eq!(row.to_vec().unwrap(), vec![p(1), p(2), p(3)]);
    let mut buf = [OpaquePtr::NULL; 2];
    assert_eq!(
        row.read_into(&mut buf),
        Err(ContainerError::BufferTooSmall {
            needed: 3,
            capacity: 2
        })
    );
    assert!(c.row(2).is_err());
}

#[test]
fn arena_limits_surface_as_allocation_failed() {
    let config = ArenaConfig {
        segment_slots: 64,
        max_segments: 1,
        max_rows: 16,
    };
    let bridge = FfiBridge::with_config(config);
    assert_eq!(
        NestedPointerContainer::with_rows_in(17, bridge).err(),
        Some(ContainerError::AllocationFailed)
    );

    let mut c = NestedPointerContainer::with_rows_in(2, bridge).unwrap();
    c.resize_row(0, 64).unwrap();
    assert_eq!(c.resize_row(1, 1), Err(ContainerError::AllocationFailed));
    // The failed call left the container intact.
    assert_eq!(c.row_len(0).unwrap(), 64);
    assert_eq!(c.row_len(1).unwrap(), 0);
}

#[test]
fn failed_assign_leaves_receiver_intact() {
    let config = ArenaConfig {
        max_rows: 2,
        ..ArenaConfig::default()
    };
    let mut dst =
        NestedPointerContainer::from_rows_in(&[[p(0x10)], [p(0x20)]], FfiBridge::with_config(config))
            .unwrap();
    let src = NestedPointerContainer::with_rows(3).unwrap();

    assert_eq!(
        dst.assign(&src).map(|_| ()),
        Err(ContainerError::AllocationFailed)
    );
    assert_eq!(dst.to_rows().unwrap(), vec![vec![p(0x10)], vec![p(0x20)]]);

    // A retry with a source that fits succeeds.
    let small = NestedPointerContainer::from_rows(&[[p(0x30)]]).unwrap();
    dst.assign(&small).unwrap();
    assert_eq!(dst.to_rows().unwrap(), vec![vec![p(0x30)]]);
}

#[test]
fn single_pointer_container_is_cheap() {
    let c = NestedPointerContainer::from_rows(&[[p(1)]]).unwrap();
    let stats = c.stats().unwrap();
    assert_eq!(stats.slots_used, 1);
    assert!(
        stats.memory_bytes <= 1024,
        "one pointer held {} bytes",
        stats.memory_bytes
    );
}

#[test]
fn resize_to_zero_returns_storage() {
    let mut c = NestedPointerContainer::with_rows(4).unwrap();
    for row in 0..4 {
        c.resize_row(row, 100).unwrap();
    }
    assert!(c.stats().unwrap().segments > 0);
    c.resize(0).unwrap();
    assert_eq!(c.stats().unwrap().segments, 0);
}

#[test]
fn stats_reflect_storage() {
    let mut c = NestedPointerContainer::with_rows(2).unwrap();
    c.resize_row(0, 3).unwrap();
    let stats = c.stats().unwrap();
    assert_eq!(stats.rows, 2);
    assert_eq!(stats.slots_used, 3);
    assert_eq!(stats.slots_reserved, 4);
    assert_eq!(stats.segments, 1);
}

#[test]
fn try_clone_owns_a_new_object() {
    let a = NestedPointerContainer::from_rows(&[[p(1), p(2)]]).unwrap();
    let b = a.try_clone().unwrap();
    assert!(b.owns());
    assert_ne!(a.address(), b.address());
    assert_eq!(b.to_rows().unwrap(), a.to_rows().unwrap());
}

proptest! {
    #[test]
    fn with_rows_creates_empty_rows(n in 0usize..256) {
        let c = NestedPointerContainer::with_rows(n).unwrap();
        prop_assert_eq!(c.len().unwrap(), n);
        for i in 0..n {
            prop_assert!(c.row_is_empty(i).unwrap());
        }
    }

    #[test]
    fn set_then_get_round_trips(
        lens in prop::collection::vec(1usize..32, 1..8),
        picks in prop::collection::vec(
            (any::<prop::sample::Index>(), any::<prop::sample::Index>(), any::<usize>()),
            1..32,
        ),
    ) {
        let mut c = NestedPointerContainer::with_rows(lens.len()).unwrap();
        for (i, len) in lens.iter().enumerate() {
            c.resize_row(i, *len).unwrap();
        }
        for (row, column, value) in picks {
            let i = row.index(lens.len());
            let j = column.index(lens[i]);
            c.set(i, j, OpaquePtr::from_addr(value)).unwrap();
            prop_assert_eq!(c.get(i, j).unwrap(), OpaquePtr::from_addr(value));
        }
    }

    #[test]
    fn resize_preserves_surviving_rows(
        rows in prop::collection::vec(prop::collection::vec(any::<usize>(), 0..8), 0..16),
        shrink_to in 0usize..16,
        grow_to in 0usize..32,
    ) {
        let values: Vec<Vec<OpaquePtr>> = rows
            .iter()
            .map(|r| r.iter().copied().map(OpaquePtr::from_addr).collect())
            .collect();
        let mut c = NestedPointerContainer::from_rows(&values).unwrap();
        let kept = shrink_to.min(values.len());
        c.resize(kept).unwrap();
        c.resize(kept.max(grow_to)).unwrap();

        let got = c.to_rows().unwrap();
        prop_assert_eq!(&got[..kept], &values[..kept]);
        prop_assert!(got[kept..].iter().all(Vec::is_empty));
    }
}
