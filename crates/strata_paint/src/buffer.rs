//! Contiguous storage with an explicit growth contract
//!
//! `DynamicBuffer` tracks its own logical capacity instead of relying on
//! `Vec`'s growth policy, so the number of reallocations a path goes
//! through is predictable: whenever a write does not fit, the capacity
//! becomes `(count + additional) * GROWTH_FACTOR`.
//!
//! Every growing operation reserves first and writes second. If the
//! reservation fails the buffer is untouched and the failure is returned
//! as a [`TryReserveError`].

use std::collections::TryReserveError;
use std::ops::{Deref, DerefMut};

/// Capacity multiplier applied when a write overflows the buffer
pub const GROWTH_FACTOR: usize = 2;

/// Owned, amortized-growth contiguous storage
#[derive(Debug)]
pub struct DynamicBuffer<T> {
    data: Vec<T>,
    reserved: usize,
}

impl<T: Copy> DynamicBuffer<T> {
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            reserved: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical capacity (what the growth contract has handed out so far)
    pub fn capacity(&self) -> usize {
        self.reserved
    }

    /// Make room for `additional` more elements using the doubling rule
    pub fn reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let needed = self.data.len() + additional;
        if needed <= self.reserved {
            return Ok(());
        }
        self.reserve_exact(needed * GROWTH_FACTOR)
    }

    /// Grow the logical capacity to exactly `capacity` (no-op if already larger)
    pub fn reserve_exact(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        if capacity <= self.reserved {
            return Ok(());
        }
        self.data.try_reserve_exact(capacity - self.data.len())?;
        self.reserved = capacity;
        Ok(())
    }

    pub fn push(&mut self, value: T) -> Result<(), TryReserveError> {
        self.reserve(1)?;
        self.data.push(value);
        Ok(())
    }

    /// Bulk append. Grows to the exact size needed, like a one-shot reserve.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<(), TryReserveError> {
        self.reserve_exact(self.data.len() + values.len())?;
        self.data.extend_from_slice(values);
        Ok(())
    }

    /// Insert `values` before `index`, shifting the tail.
    ///
    /// Panics if `index > len`.
    pub fn insert_slice(&mut self, index: usize, values: &[T]) -> Result<(), TryReserveError> {
        assert!(
            index <= self.data.len(),
            "insert index {index} out of range for buffer of length {}",
            self.data.len()
        );
        self.reserve(values.len())?;
        self.data.splice(index..index, values.iter().copied());
        Ok(())
    }

    /// Remove the last element. Never shrinks the storage.
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// Drop the contents but keep the storage for reuse
    pub fn truncate_to_empty(&mut self) {
        self.data.clear();
    }

    /// Release the storage; count and capacity return to zero
    pub fn clear(&mut self) {
        self.data = Vec::new();
        self.reserved = 0;
    }

    /// Deep copy that keeps the logical capacity
    pub fn try_clone(&self) -> Result<Self, TryReserveError> {
        let mut data = Vec::new();
        data.try_reserve_exact(self.reserved)?;
        data.extend_from_slice(&self.data);
        Ok(Self {
            data,
            reserved: self.reserved,
        })
    }

    /// Replace the contents with `values`, reusing the storage when it fits
    pub fn copy_from_slice_growing(&mut self, values: &[T]) -> Result<(), TryReserveError> {
        self.reserve_exact(values.len())?;
        self.data.clear();
        self.data.extend_from_slice(values);
        Ok(())
    }
}

impl<T> Default for DynamicBuffer<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            reserved: 0,
        }
    }
}

impl<T> Deref for DynamicBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for DynamicBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: PartialEq> PartialEq for DynamicBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}
