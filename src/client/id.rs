//! Request id generation.

use std::sync::atomic::{AtomicI64, Ordering};

use rand::Rng;

/// Source of wire request ids.
///
/// Ids only need to be present, not unique: responses are never matched
/// against them.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> i64;
}

/// Random signed 32-bit ids from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> i64 {
        i64::from(rand::thread_rng().gen::<i32>())
    }
}

/// Counter starting at a fixed value, for reproducible requests.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicI64,
}

impl SequentialIdGenerator {
    pub fn new(start: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}
