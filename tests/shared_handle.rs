use rc_handles::SharedHandle;
use std::cell::{Cell, RefCell};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug, PartialEq)]
struct Payload {
    id: u32,
}

#[test]
fn clone_shares_value_and_count() {
    let a = SharedHandle::new(Payload { id: 7 });
    assert!(a.is_valid());
    assert_eq!(a.use_count(), 1);

    let b = a.clone();
    assert_eq!(a.use_count(), 2);
    assert_eq!(b.use_count(), 2);
    assert_eq!(a.get().unwrap().id, 7);
    assert_eq!(b.get().unwrap().id, 7);

    drop(b);
    assert_eq!(a.use_count(), 1);
    assert_eq!(a.get().unwrap().id, 7);
}

#[test]
fn cleanup_fires_once_on_last_detach() {
    let seen: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut a = SharedHandle::with_cleanup(Payload { id: 1 }, move |p| {
        sink.borrow_mut().push(p.id);
    });
    let b = a.clone();
    assert_eq!(a.use_count(), 2);

    // Destroying A leaves B owning; the cleanup must not run yet.
    a.reset();
    assert!(!a.is_valid());
    assert!(seen.borrow().is_empty());
    assert_eq!(b.use_count(), 1);

    // Destroying the last owner runs the cleanup exactly once, with the value.
    drop(b);
    assert_eq!(*seen.borrow(), vec![1]);
}

#[test]
fn cleanup_consumes_the_value_by_move() {
    let got: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    let sink = got.clone();
    let h = SharedHandle::with_cleanup("payload".to_string(), move |s| {
        *sink.borrow_mut() = Some(s);
    });
    drop(h);
    assert_eq!(got.borrow().as_deref(), Some("payload"));
}

#[test]
fn drop_order_does_not_matter() {
    let fired = Rc::new(Cell::new(0u32));
    for order in 0..2 {
        let sink = fired.clone();
        let a = SharedHandle::with_cleanup(Payload { id: 9 }, move |_| {
            sink.set(sink.get() + 1);
        });
        let b = a.clone();
        let c = b.clone();
        let before = fired.get();
        match order {
            0 => drop((a, b, c)),
            _ => drop((c, a, b)),
        }
        assert_eq!(fired.get(), before + 1);
    }
}

#[test]
fn swap_exchanges_blocks_and_preserves_counts() {
    let mut a = SharedHandle::new(Payload { id: 1 });
    let a2 = a.clone(); // a's block at count 2
    let mut b = SharedHandle::new(Payload { id: 2 });

    a.swap(&mut b);
    assert_eq!(a.get().unwrap().id, 2);
    assert_eq!(b.get().unwrap().id, 1);
    // Counts attach to blocks, not handle identity.
    assert_eq!(a.use_count(), 1);
    assert_eq!(b.use_count(), 2);
    assert_eq!(a2.use_count(), 2);
    assert_eq!(a2.get().unwrap().id, 1);
}

#[test]
fn swap_with_empty_moves_the_attachment() {
    let mut a = SharedHandle::new(Payload { id: 3 });
    let mut e = SharedHandle::empty();
    a.swap(&mut e);
    assert!(!a.is_valid());
    assert_eq!(a.use_count(), 0);
    assert_eq!(e.get().unwrap().id, 3);
    assert_eq!(e.use_count(), 1);
}

#[test]
fn reset_is_idempotent_and_empty_is_safe() {
    let mut h: SharedHandle<Payload> = SharedHandle::empty();
    assert!(!h.is_valid());
    assert!(h.get().is_none());
    assert_eq!(h.use_count(), 0);
    h.reset();
    h.reset();
    assert!(!h.is_valid());
    assert!(h.release().is_none());
}

#[test]
fn reset_with_attaches_a_fresh_block() {
    let fired = Rc::new(Cell::new(false));
    let sink = fired.clone();
    let mut h = SharedHandle::with_cleanup(Payload { id: 4 }, move |_| sink.set(true));
    let old = h.clone();

    h.reset_with(Payload { id: 5 });
    // Old block still owned by `old`; no cleanup yet.
    assert!(!fired.get());
    assert_eq!(h.get().unwrap().id, 5);
    assert_eq!(h.use_count(), 1);
    assert_eq!(old.use_count(), 1);

    drop(old);
    assert!(fired.get());
}

#[test]
fn reset_then_get_is_identity_not_a_copy() {
    let v = Rc::new(Payload { id: 6 });
    let mut h = SharedHandle::empty();
    h.reset_with(v.clone());
    let seen = h.get().unwrap();
    assert!(Rc::ptr_eq(&v, &seen));
    drop(seen);
}

#[test]
fn release_returns_the_value_and_skips_cleanup() {
    let fired = Rc::new(Cell::new(false));
    let sink = fired.clone();
    let mut h = SharedHandle::with_cleanup(Payload { id: 8 }, move |_| sink.set(true));

    let v = h.release().expect("value out");
    assert_eq!(v, Payload { id: 8 });
    assert!(!h.is_valid());
    assert!(!fired.get());
}

#[test]
fn release_leaves_siblings_attached_and_counted() {
    let mut a = SharedHandle::new(Payload { id: 10 });
    let b = a.clone();

    let v = a.release().expect("value out");
    assert_eq!(v.id, 10);
    // The departed share stays accounted; the sibling keeps its attachment
    // but the payload now has a single owner outside the block.
    assert!(b.is_valid());
    assert_eq!(b.use_count(), 2);
    assert!(b.get().is_none());
}

#[test]
fn release_during_a_live_borrow_panics_without_aborting() {
    let mut a = SharedHandle::new(Payload { id: 12 });
    let b = a.clone();

    // A sibling's read borrow is live while the release runs; the borrow
    // conflict must surface as an ordinary, catchable panic.
    let held = b.get().unwrap();
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| a.release()));
    assert!(res.is_err(), "expected a borrow-conflict panic");
    drop(held);

    // The failed release already detached its handle and abandoned its
    // share; the value itself stays in place for the sibling.
    assert!(!a.is_valid());
    assert_eq!(b.use_count(), 2);
    assert_eq!(b.get().unwrap().id, 12);

    // The block remains fully usable afterwards.
    let w = b.downgrade();
    assert!(!w.expired());
}

#[test]
fn equality_and_hash_follow_block_identity() {
    let a = SharedHandle::new(Payload { id: 11 });
    let a2 = a.clone();
    let b = SharedHandle::new(Payload { id: 11 });

    assert_eq!(a, a2);
    assert_ne!(a, b);
    assert_eq!(SharedHandle::<Payload>::empty(), SharedHandle::empty());

    let mut h1 = DefaultHasher::new();
    a.hash(&mut h1);
    let mut h2 = DefaultHasher::new();
    a2.hash(&mut h2);
    assert_eq!(h1.finish(), h2.finish());
}

// Cyclic payloads are a documented limitation: the cycle must be broken
// manually before the last external handle drops.
struct Node {
    other: RefCell<Option<SharedHandle<Node>>>,
    _id: u32,
}

fn cyclic_pair(fired: &Rc<Cell<u32>>) -> (SharedHandle<Node>, SharedHandle<Node>) {
    let mk = |id| {
        let sink = fired.clone();
        SharedHandle::with_cleanup(
            Node {
                other: RefCell::new(None),
                _id: id,
            },
            move |_| sink.set(sink.get() + 1),
        )
    };
    let a = mk(1);
    let b = mk(2);
    *a.get().unwrap().other.borrow_mut() = Some(b.clone());
    *b.get().unwrap().other.borrow_mut() = Some(a.clone());
    (a, b)
}

#[test]
fn cycles_are_not_collected_automatically() {
    let fired = Rc::new(Cell::new(0u32));
    let (a, b) = cyclic_pair(&fired);
    drop(a);
    drop(b);
    // Both blocks keep each other at count 1; neither cleanup runs.
    assert_eq!(fired.get(), 0);
}

#[test]
fn breaking_the_cycle_releases_both_values() {
    let fired = Rc::new(Cell::new(0u32));
    let (a, b) = cyclic_pair(&fired);
    // Null one cross-reference before dropping the external handles.
    a.get().unwrap().other.borrow_mut().take();
    drop(a);
    drop(b);
    assert_eq!(fired.get(), 2);
}
