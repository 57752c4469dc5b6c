// Random rolls used by explore, battle, and catch.
//
// Game code goes through the `Dice` trait so tests can script outcomes.

use std::collections::VecDeque;
use std::sync::Mutex;

use rand::Rng;

pub trait Dice: Send + Sync {
    /// True with probability `percent`/100.
    fn chance(&self, percent: u8, reason: &str) -> bool;

    /// Uniform integer in `low..=high`.
    fn roll(&self, low: u32, high: u32, reason: &str) -> u32;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&self, len: usize, reason: &str) -> usize;
}

/// Dice backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDice;

impl Dice for ThreadDice {
    fn chance(&self, percent: u8, _reason: &str) -> bool {
        rand::thread_rng().gen_range(1..=100u8) <= percent
    }

    fn roll(&self, low: u32, high: u32, _reason: &str) -> u32 {
        rand::thread_rng().gen_range(low..=high)
    }

    fn pick(&self, len: usize, _reason: &str) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Dice that replay a fixed list of outcomes, for tests.
///
/// Each call consumes one value:
/// - `chance` succeeds when the value is `<= percent` (values are 1..=100),
/// - `roll` returns the value as-is, even outside the requested range,
/// - `pick` returns the value as the index.
#[derive(Debug, Default)]
pub struct ScriptedDice {
    outcomes: Mutex<VecDeque<u32>>,
}

impl ScriptedDice {
    pub fn new(outcomes: impl IntoIterator<Item = u32>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }

    /// Append more outcomes to the back of the script.
    pub fn push(&self, outcomes: impl IntoIterator<Item = u32>) {
        self.lock().extend(outcomes);
    }

    pub fn remaining(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<u32>> {
        self.outcomes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next(&self, reason: &str) -> u32 {
        match self.lock().pop_front() {
            Some(value) => {
                tracing::trace!(value, reason, "scripted roll");
                value
            }
            None => panic!("ScriptedDice exhausted! Tried to get a value for: '{reason}'"),
        }
    }
}

impl Dice for ScriptedDice {
    fn chance(&self, percent: u8, reason: &str) -> bool {
        self.next(reason) <= u32::from(percent)
    }

    fn roll(&self, _low: u32, _high: u32, reason: &str) -> u32 {
        self.next(reason)
    }

    fn pick(&self, len: usize, reason: &str) -> usize {
        let value = self.next(reason) as usize;
        assert!(value < len, "scripted {reason} pick {value} outside 0..{len}");
        value
    }
}
