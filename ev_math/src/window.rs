//! Fixed-capacity sliding window
//!
//! The window keeps the most recent `capacity` values in arrival order.
//! Pushing into a full window evicts the oldest value, so the window can
//! never grow past its capacity.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Bounded FIFO window of `f64` values
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl SlidingWindow {
    /// Create an empty window holding at most `capacity` values
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MathError::InvalidInput(
                "Window capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        })
    }

    /// Create a window seeded with the last `capacity` entries of `history`
    pub fn from_tail(capacity: usize, history: &[f64]) -> Result<Self> {
        let mut window = Self::new(capacity)?;
        let start = history.len().saturating_sub(capacity);
        for &value in &history[start..] {
            window.push(value);
        }
        Ok(window)
    }

    /// Append a value, returning the evicted oldest value if the window was full
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.values.len() == self.capacity {
            self.values.pop_front()
        } else {
            None
        };
        self.values.push_back(value);
        evicted
    }

    /// Value `k` steps back from the newest entry (`lag(1)` is the newest)
    pub fn lag(&self, k: usize) -> Option<f64> {
        if k == 0 || k > self.values.len() {
            return None;
        }
        self.values.get(self.values.len() - k).copied()
    }

    /// Newest value in the window
    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the window holds exactly `capacity` values
    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy the values out, oldest first
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}
