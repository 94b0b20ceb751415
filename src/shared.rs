//! `SharedHandle`: a reference-counted owning handle.
//!
//! Every clone of a handle counts once toward its block's strong count; the
//! managed value lives until the last owning share is returned, at which
//! point the optional cleanup callback consumes it.

use core::hash::{Hash, Hasher};
use std::cell::Ref;
use std::fmt;
use std::rc::Rc;

use crate::control_block::{Cleanup, ControlBlock};
use crate::count::{StrongKind, Token};
use crate::weak::WeakHandle;

/// An owning, reference-counted handle over a value.
///
/// A handle is either *empty* (no block attached) or *attached*; every
/// operation is a safe no-op or a "no value" result on an empty handle.
/// Dropping an attached handle returns its ownership share and, when it was
/// the last one, runs the cleanup with the value.
pub struct SharedHandle<T> {
    attachment: Option<Attachment<T>>,
}

struct Attachment<T> {
    block: Rc<ControlBlock<T>>,
    token: Token<StrongKind>,
}

impl<T> SharedHandle<T> {
    /// Create a handle owning `value` (strong count 1, no cleanup).
    pub fn new(value: T) -> Self {
        Self::build(value, None)
    }

    /// Create a handle owning `value`; `cleanup` consumes the value when
    /// the last owning handle detaches.
    pub fn with_cleanup(value: T, cleanup: impl FnOnce(T) + 'static) -> Self {
        Self::build(value, Some(Box::new(cleanup) as Cleanup<T>))
    }

    /// Create an empty handle, attached to nothing.
    pub fn empty() -> Self {
        Self { attachment: None }
    }

    fn build(value: T, cleanup: Option<Cleanup<T>>) -> Self {
        let (block, token) = ControlBlock::new(value, cleanup);
        Self {
            attachment: Some(Attachment { block, token }),
        }
    }

    /// Wrap an already-acquired share. Used by `Clone` and `WeakHandle::lock`.
    pub(crate) fn attach(block: Rc<ControlBlock<T>>, token: Token<StrongKind>) -> Self {
        Self {
            attachment: Some(Attachment { block, token }),
        }
    }

    /// True iff a block is attached. An attached handle's block always has
    /// a strong count of at least one — this handle's own share.
    pub fn is_valid(&self) -> bool {
        self.attachment.is_some()
    }

    /// Borrow the managed value. `None` when the handle is empty, or when
    /// the value was taken out by [`release`](Self::release) on a sibling.
    pub fn get(&self) -> Option<Ref<'_, T>> {
        self.attachment.as_ref()?.block.value()
    }

    /// Strong count of the attached block, or 0 when empty.
    pub fn use_count(&self) -> usize {
        self.attachment.as_ref().map_or(0, |a| a.block.strong_count())
    }

    /// Weak count of the attached block, or 0 when empty.
    pub fn weak_count(&self) -> usize {
        self.attachment.as_ref().map_or(0, |a| a.block.weak_count())
    }

    /// Detach from the block, returning this handle's ownership share and
    /// firing the cleanup if it was the last one. Idempotent: resetting an
    /// empty handle is a no-op.
    pub fn reset(&mut self) {
        if let Some(Attachment { block, token }) = self.attachment.take() {
            block.release_strong(token);
        }
    }

    /// Detach (as [`reset`](Self::reset)), then attach to a freshly
    /// allocated block owning `value`.
    pub fn reset_with(&mut self, value: T) {
        self.reset();
        *self = Self::new(value);
    }

    /// Detach, then attach to a fresh block owning `value` with `cleanup`.
    pub fn reset_with_cleanup(&mut self, value: T, cleanup: impl FnOnce(T) + 'static) {
        self.reset();
        *self = Self::with_cleanup(value, cleanup);
    }

    /// Exchange attachments with `other`. No count is touched: the set of
    /// attached handles is merely permuted, so every count stays correct.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.attachment, &mut other.attachment);
    }

    /// Detach and return the managed value *without* decrementing the
    /// strong count or running the cleanup; the caller owns the value
    /// out-of-band from here on.
    ///
    /// The departed share stays accounted in the block forever, so the
    /// cleanup can never fire for a released value and the `use_count()`
    /// observed by sibling handles stays permanently inflated by one.
    /// Siblings remain attached, but their [`get`](Self::get) reports no
    /// value: the payload has exactly one owner now. Returns `None` on an
    /// empty handle, or when a sibling already released the value.
    pub fn release(&mut self) -> Option<T> {
        let Attachment { block, token } = self.attachment.take()?;
        // Abandon the share before touching the slot so a borrow-conflict
        // panic unwinds cleanly instead of tripping the token's Drop.
        block.abandon_strong(token);
        block.take_value()
    }

    /// Derive a weak observer of this handle's block. Downgrading an empty
    /// handle yields an empty `WeakHandle`.
    pub fn downgrade(&self) -> WeakHandle<T> {
        match &self.attachment {
            Some(a) => WeakHandle::attach(a.block.clone(), a.block.acquire_weak()),
            None => WeakHandle::empty(),
        }
    }

    /// Identity of the attached block, for equality and hashing.
    fn block_ptr(&self) -> *const ControlBlock<T> {
        self.attachment
            .as_ref()
            .map_or(core::ptr::null(), |a| Rc::as_ptr(&a.block))
    }
}

impl<T> Clone for SharedHandle<T> {
    /// Derive a new owning handle over the same block (increments the
    /// strong count). Cloning an empty handle yields an empty handle.
    fn clone(&self) -> Self {
        match &self.attachment {
            Some(a) => Self::attach(a.block.clone(), a.block.acquire_strong()),
            None => Self::empty(),
        }
    }
}

impl<T> Drop for SharedHandle<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> Default for SharedHandle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Handles compare by block identity: clones of one origin are equal,
/// handles over distinct blocks are not. Empty handles equal each other.
impl<T> PartialEq for SharedHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.block_ptr() == other.block_ptr()
    }
}

impl<T> Eq for SharedHandle<T> {}

impl<T> Hash for SharedHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.block_ptr() as usize).hash(state);
    }
}

impl<T> fmt::Debug for SharedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHandle")
            .field("valid", &self.is_valid())
            .field("use_count", &self.use_count())
            .field("weak_count", &self.weak_count())
            .finish()
    }
}
