//! rc-handles: ownership-tracking handles for explicit, inspectable lifetime
//! control — a unique single-slot owner, a reference-counted shared owner
//! with a deterministic cleanup callback, and a non-owning weak observer.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build the shared-ownership core in safe, verifiable layers so
//!   each piece can be reasoned about independently.
//! - Layers:
//!   - `Counter<M>` / `Token<M>`: single-threaded share counters whose
//!     increments mint linear tokens; a handle cannot decrement a count
//!     without surrendering the one token it holds, which rules out
//!     double-release structurally.
//!   - `ControlBlock<T>`: the bookkeeping record shared by all handles of
//!     one origin — payload slot, optional one-shot cleanup, strong and
//!     weak counters. Fires the cleanup exactly at the strong 1 -> 0
//!     transition.
//!   - `SharedHandle<T>` / `WeakHandle<T>`: the public capabilities over a
//!     block. Clone/Drop drive the counts; `WeakHandle::lock` is the only
//!     path that raises the strong count from observation.
//!   - `UniquePtr<T>`: nullable single-slot owner with move semantics; no
//!     block, no counts, no cleanup hook.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design (no atomics). The
//!   check-then-acquire step inside `lock` relies on it.
//! - No unsafe: block memory is kept reachable by `Rc` while any handle
//!   (strong or weak) remains, so a weak handle can still read a zeroed
//!   strong count after the value is gone; logical ownership lives entirely
//!   in the two counters.
//! - Cleanup callbacks run synchronously on the caller that drove the
//!   strong count to zero, after the block is back in a consistent state,
//!   so they may freely drop or create other handles. Cleanup panics
//!   propagate to that caller; the block stays logically dead either way.
//!
//! Why this split?
//! - Localize invariants: counters enforce no-underflow and overflow-abort;
//!   the block enforces exactly-once cleanup; handles only permute
//!   attachments.
//! - Clear failure boundaries: user code (cleanup, payload `Drop`) is never
//!   entered while block internals are transiently inconsistent; a
//!   debug-only reentrancy guard checks this.
//!
//! Known limitations
//! - No cycle detection: two shared handles whose payloads reference each
//!   other keep both blocks alive; break the cycle manually before dropping
//!   the last external handle.
//! - `SharedHandle::release` detaches without returning its ownership
//!   share, so a block with a released value never reaches strong zero and
//!   never fires its cleanup; see `release` docs.
//! - Count overflow aborts the process, matching `std::rc::Rc`.

mod control_block;
mod count;
mod reentrancy;
mod shared;
mod unique;
mod weak;

// Public surface
pub use shared::SharedHandle;
pub use unique::UniquePtr;
pub use weak::WeakHandle;
