//! Linear tokens and the share counters behind the control block.
//!
//! A token is a zero-sized proof that one ownership share was acquired from
//! a counter. Dropping a token panics; the only valid way to dispose of it
//! is to return it to a counter via `Counter::put` (or deliberately abandon
//! it via `Counter::forget`). Marker types brand tokens so strong and weak
//! shares cannot be confused at compile time.

use core::cell::Cell;
use core::marker::PhantomData;

/// Marker for the strong (owning) count.
#[derive(Debug)]
pub(crate) struct StrongKind;

/// Marker for the weak (observer) count.
#[derive(Debug)]
pub(crate) struct WeakKind;

/// Zero-sized, linear token representing one share of a counter.
pub(crate) struct Token<M> {
    _kind: PhantomData<M>,
}

impl<M> Token<M> {
    #[inline]
    fn new() -> Self {
        Self { _kind: PhantomData }
    }
}

impl<M> Drop for Token<M> {
    fn drop(&mut self) {
        // Intentional fail-fast on misuse: a share must be returned via
        // Counter::put or abandoned via Counter::forget, never dropped.
        panic!("count token dropped without Counter::put");
    }
}

/// Single-threaded share counter; mints one `Token` per increment.
#[derive(Debug)]
pub(crate) struct Counter<M> {
    count: Cell<usize>,
    _kind: PhantomData<M>,
}

impl<M> Counter<M> {
    pub(crate) fn new(initial: usize) -> Self {
        Self {
            count: Cell::new(initial),
            _kind: PhantomData,
        }
    }

    /// Acquire one share and mint its token.
    #[inline]
    pub(crate) fn get(&self) -> Token<M> {
        let n = self.count.get().wrapping_add(1);
        self.count.set(n);
        if n == 0 {
            // Follow Rc semantics: abort on overflow rather than continue unsafely.
            std::process::abort();
        }
        Token::new()
    }

    /// Return (consume) a previously acquired share.
    /// Returns true if the count is now zero.
    #[inline]
    pub(crate) fn put(&self, t: Token<M>) -> bool {
        // Consume the token before the underflow check so a contract
        // violation unwinds cleanly instead of double-panicking in Drop.
        core::mem::forget(t);
        let c = self.count.get();
        assert!(c > 0, "count underflow: share returned to an empty counter");
        self.count.set(c - 1);
        c == 1
    }

    /// Abandon a share without returning it: the count keeps the share
    /// forever. Backs `SharedHandle::release`.
    #[inline]
    pub(crate) fn forget(&self, t: Token<M>) {
        core::mem::forget(t);
    }

    /// Pure read of the current count.
    #[inline]
    pub(crate) fn peek(&self) -> usize {
        self.count.get()
    }
}
