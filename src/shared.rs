//! Decoder handle for edge callbacks that may run in parallel.
//!
//! Both lines usually get their own edge callback, so two evaluations can
//! race. The read-lookup-write of the state runs under one mutex; a second
//! caller either waits (`evaluate`) or drops its sample (`try_evaluate`).
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use crate::rotary::{Direction, EncoderState, PinPair, QuadratureDecoder};

#[derive(Clone, Debug, Default)]
pub struct SharedDecoder {
    inner: Arc<Mutex<QuadratureDecoder>>,
}

impl SharedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    // The state is only ever replaced by a whole table entry, so a poisoned
    // lock still guards a valid state.
    fn lock(&self) -> MutexGuard<'_, QuadratureDecoder> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Serialized evaluation, blocks while another caller holds the decoder.
    pub fn evaluate(&self, a: bool, b: bool) -> Direction {
        self.lock().evaluate(a, b)
    }

    /// Evaluate unless another caller is mid-evaluation, in which case the
    /// sample is dropped and `None` is returned.
    pub fn try_evaluate(&self, a: bool, b: bool) -> Option<Direction> {
        match self.inner.try_lock() {
            Ok(mut decoder) => Some(decoder.evaluate(a, b)),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner().evaluate(a, b)),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Evaluate and hand the result to `f` before releasing the decoder.
    ///
    /// Anything `f` folds the direction into is updated in the same order
    /// the evaluations ran.
    pub fn evaluate_then<F, R>(&self, a: bool, b: bool, f: F) -> R
    where
        F: FnOnce(PinPair, Direction) -> R,
    {
        let mut decoder = self.lock();
        let levels = PinPair::new(a, b);
        let direction = decoder.step(levels);
        f(levels, direction)
    }

    pub fn state(&self) -> EncoderState {
        self.lock().state()
    }

    pub fn reset(&self) {
        self.lock().reset();
    }
}
