//! Debug-only reentrancy detection.
//!
//! The control block mutates its counters and payload slot in short
//! critical sections that must not be reentered by user code (cleanup
//! callbacks, payload `Drop` impls). `with` runs such a section; in debug
//! builds a nested entry panics, in release builds the check compiles away.
//! User callbacks are always invoked after the guarded section ends.

use core::cell::Cell;

/// Per-instance reentrancy tracker for single-threaded structures.
#[derive(Debug, Default)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    depth: Cell<u32>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            depth: Cell::new(0),
        }
    }

    /// Run `f` as a guarded critical section. The tracker is restored even
    /// when `f` unwinds, so a caught panic does not poison later sections.
    #[inline]
    pub(crate) fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        #[cfg(debug_assertions)]
        {
            assert!(
                self.depth.get() == 0,
                "reentrancy detected: nested entry into control block"
            );
            self.depth.set(1);
            let _reset = ResetOnDrop { depth: &self.depth };
            return f();
        }

        #[cfg(not(debug_assertions))]
        {
            f()
        }
    }
}

#[cfg(debug_assertions)]
struct ResetOnDrop<'a> {
    depth: &'a Cell<u32>,
}

#[cfg(debug_assertions)]
impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.depth.set(0);
    }
}
