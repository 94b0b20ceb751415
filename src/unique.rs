//! `UniquePtr`: a nullable single-slot owner with move semantics.
//!
//! No control block, no counts, and — unlike `SharedHandle` — no cleanup
//! hook: a replaced or reset value is simply dropped. The single-owner
//! invariant is carried by the type system (`UniquePtr` is not `Clone`) and
//! extends to the serialization boundary: under the `serde` feature,
//! `Serialize` is implemented to fail loudly rather than silently
//! duplicating ownership.

use std::fmt;

/// A single-slot owner. Either holds one value or is empty.
pub struct UniquePtr<T> {
    slot: Option<T>,
}

impl<T> UniquePtr<T> {
    /// Create an owner holding `value`.
    pub fn new(value: T) -> Self {
        Self { slot: Some(value) }
    }

    /// Create an empty owner.
    pub fn empty() -> Self {
        Self { slot: None }
    }

    /// True iff a value is held.
    pub fn is_valid(&self) -> bool {
        self.slot.is_some()
    }

    /// Borrow the value without transferring ownership.
    pub fn get(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    /// Mutably borrow the value without transferring ownership.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.slot.as_mut()
    }

    /// Transfer the value into a new owner, leaving this one empty.
    pub fn take(&mut self) -> UniquePtr<T> {
        UniquePtr {
            slot: self.slot.take(),
        }
    }

    /// Return the value and leave this owner empty.
    pub fn release(&mut self) -> Option<T> {
        self.slot.take()
    }

    /// Drop the held value, if any. No cleanup hook runs.
    pub fn reset(&mut self) {
        self.slot = None;
    }

    /// Replace the held value, dropping the previous one, if any.
    pub fn reset_with(&mut self, value: T) {
        self.slot = Some(value);
    }
}

impl<T> Default for UniquePtr<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<T> for UniquePtr<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> fmt::Debug for UniquePtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniquePtr")
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(feature = "serde")]
impl<T> serde::Serialize for UniquePtr<T> {
    /// Always fails: writing a unique owner out would duplicate it on read
    /// back. Generic serializers reject the handle instead of cloning
    /// ownership behind the owner's back.
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(serde::ser::Error::custom(
            "UniquePtr holds unique ownership and cannot be serialized",
        ))
    }
}
