//! `WeakHandle`: a non-owning observer of a shared block.
//!
//! Weak handles count only toward the weak count and never keep the managed
//! value alive. They read the strong count after it reaches zero — the
//! block's memory outlives the last owner for exactly as long as observers
//! remain — which is how expiry and lock failure are implemented.

use std::fmt;
use std::rc::Rc;

use crate::control_block::ControlBlock;
use crate::count::{Token, WeakKind};
use crate::shared::SharedHandle;

/// A non-owning observer that can attempt to promote itself back into an
/// owning [`SharedHandle`] while the value is still alive.
pub struct WeakHandle<T> {
    attachment: Option<Attachment<T>>,
}

struct Attachment<T> {
    block: Rc<ControlBlock<T>>,
    token: Token<WeakKind>,
}

impl<T> WeakHandle<T> {
    /// Create an empty observer, attached to nothing.
    pub fn empty() -> Self {
        Self { attachment: None }
    }

    /// Wrap an already-acquired observer share. Used by
    /// `SharedHandle::downgrade` and `Clone`.
    pub(crate) fn attach(block: Rc<ControlBlock<T>>, token: Token<WeakKind>) -> Self {
        Self {
            attachment: Some(Attachment { block, token }),
        }
    }

    /// True iff a block is attached. An attached observer may still be
    /// expired; see [`expired`](Self::expired).
    pub fn is_valid(&self) -> bool {
        self.attachment.is_some()
    }

    /// True when there is nothing left to lock: no block attached, or the
    /// attached block's strong count has reached zero.
    pub fn expired(&self) -> bool {
        self.attachment
            .as_ref()
            .map_or(true, |a| a.block.strong_count() == 0)
    }

    /// Promote this observer into a new owning handle, or `None` if the
    /// value is already gone. A successful lock raises the strong count by
    /// one; a failed lock touches nothing.
    ///
    /// Check-then-acquire is sound here: mutation is single-threaded, so no
    /// final decrement can land between the expiry check and the acquire.
    pub fn lock(&self) -> Option<SharedHandle<T>> {
        let a = self.attachment.as_ref()?;
        if a.block.strong_count() == 0 {
            return None;
        }
        Some(SharedHandle::attach(a.block.clone(), a.block.acquire_strong()))
    }

    /// Detach from the block, returning the observer share. Idempotent; a
    /// reset observer never re-attaches.
    pub fn reset(&mut self) {
        if let Some(Attachment { block, token }) = self.attachment.take() {
            block.release_weak(token);
        }
    }

    /// Strong count of the attached block, or 0 when empty.
    pub fn use_count(&self) -> usize {
        self.attachment.as_ref().map_or(0, |a| a.block.strong_count())
    }

    /// Weak count of the attached block, or 0 when empty.
    pub fn weak_count(&self) -> usize {
        self.attachment.as_ref().map_or(0, |a| a.block.weak_count())
    }
}

impl<T> Clone for WeakHandle<T> {
    /// Derive another observer of the same block (increments the weak
    /// count). Cloning an empty observer yields an empty observer.
    fn clone(&self) -> Self {
        match &self.attachment {
            Some(a) => Self::attach(a.block.clone(), a.block.acquire_weak()),
            None => Self::empty(),
        }
    }
}

impl<T> Drop for WeakHandle<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> Default for WeakHandle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for WeakHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHandle")
            .field("valid", &self.is_valid())
            .field("expired", &self.expired())
            .field("use_count", &self.use_count())
            .field("weak_count", &self.weak_count())
            .finish()
    }
}
