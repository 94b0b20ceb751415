//! The shared bookkeeping record behind `SharedHandle` and `WeakHandle`.
//!
//! One block is allocated per origin value and shared by every handle
//! derived from it. The block lives inside an `Rc` so its memory stays
//! reachable while any handle — strong or weak — still references it; weak
//! handles read the strong count after it reaches zero to implement
//! expiry. Logical ownership is tracked entirely by the two token counters,
//! never by the `Rc` itself.

use core::cell::RefCell;
use std::cell::Ref;
use std::rc::Rc;

use crate::count::{Counter, StrongKind, Token, WeakKind};
use crate::reentrancy::DebugReentrancy;

/// One-shot destructor invoked with the payload when the last owner detaches.
pub(crate) type Cleanup<T> = Box<dyn FnOnce(T)>;

pub(crate) struct ControlBlock<T> {
    value: RefCell<Option<T>>,
    cleanup: RefCell<Option<Cleanup<T>>>,
    strong: Counter<StrongKind>,
    weak: Counter<WeakKind>,
    reentrancy: DebugReentrancy,
}

impl<T> ControlBlock<T> {
    /// Allocate a block over `value` with strong = 1 and weak = 0; returns
    /// the block together with the first owner's token.
    pub(crate) fn new(value: T, cleanup: Option<Cleanup<T>>) -> (Rc<Self>, Token<StrongKind>) {
        let block = Rc::new(Self {
            value: RefCell::new(Some(value)),
            cleanup: RefCell::new(cleanup),
            strong: Counter::new(0),
            weak: Counter::new(0),
            reentrancy: DebugReentrancy::new(),
        });
        let token = block.strong.get();
        (block, token)
    }

    /// Acquire one owning share.
    pub(crate) fn acquire_strong(&self) -> Token<StrongKind> {
        self.reentrancy.with(|| self.strong.get())
    }

    /// Return one owning share. At the 1 -> 0 transition the payload is
    /// taken out of the block and the cleanup (if any) consumes it; both
    /// happen after the critical section, so user code running inside the
    /// callback (or the payload's own `Drop`) may freely drop or create
    /// other handles. Returns true once the block is logically dead.
    ///
    /// A panicking cleanup propagates to the caller; the count has already
    /// reached zero and the block stays dead regardless.
    pub(crate) fn release_strong(&self, token: Token<StrongKind>) -> bool {
        let finalize = self.reentrancy.with(|| {
            if self.strong.put(token) {
                // Both borrows end before any user code runs.
                let value = self.value.borrow_mut().take();
                let cleanup = self.cleanup.borrow_mut().take();
                Some((value, cleanup))
            } else {
                None
            }
        });
        match finalize {
            Some((value, cleanup)) => {
                if let (Some(value), Some(cleanup)) = (value, cleanup) {
                    cleanup(value);
                }
                true
            }
            None => false,
        }
    }

    /// Abandon one owning share without returning it: the strong count
    /// keeps the departed handle's share forever, so the block can never
    /// reach zero and the cleanup can never fire. Pairs with `take_value`.
    pub(crate) fn abandon_strong(&self, token: Token<StrongKind>) {
        self.strong.forget(token);
    }

    /// Acquire one observer share.
    pub(crate) fn acquire_weak(&self) -> Token<WeakKind> {
        self.reentrancy.with(|| self.weak.get())
    }

    /// Return one observer share. No side effects.
    pub(crate) fn release_weak(&self, token: Token<WeakKind>) {
        self.reentrancy.with(|| {
            self.weak.put(token);
        });
    }

    pub(crate) fn strong_count(&self) -> usize {
        self.strong.peek()
    }

    pub(crate) fn weak_count(&self) -> usize {
        self.weak.peek()
    }

    /// Move the payload out without touching any count.
    pub(crate) fn take_value(&self) -> Option<T> {
        self.reentrancy.with(|| self.value.borrow_mut().take())
    }

    /// Borrow the payload, if still present.
    pub(crate) fn value(&self) -> Option<Ref<'_, T>> {
        let slot = self.value.borrow();
        if slot.is_some() {
            Some(Ref::map(slot, |v| v.as_ref().expect("checked is_some above")))
        } else {
            None
        }
    }
}
