//! Admission gate: a counting limiter for in-flight copy units.
//!
//! A [`Permit`] is handed out per admitted unit and gives its slot back when
//! dropped, so release happens on every exit path of the unit (early return,
//! error, panic unwinding). The gate also records the highest number of
//! permits ever held at once, which the run report exposes.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Default)]
struct GateState {
    held: usize,
    peak: usize,
}

#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    state: Mutex<GateState>,
    freed: Condvar,
}

/// One held slot of an [`AdmissionGate`].
#[must_use = "dropping the permit releases the slot immediately"]
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

impl AdmissionGate {
    /// Create a gate with `capacity` slots. A capacity of 0 is raised to 1;
    /// callers validate user input before getting here.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(GateState::default()),
            freed: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently held.
    pub fn in_flight(&self) -> usize {
        self.lock().held
    }

    /// Highest number of permits held at the same time since creation.
    pub fn peak(&self) -> usize {
        self.lock().peak
    }

    /// Block until a slot is free, then take it.
    pub fn acquire(&self) -> Permit<'_> {
        let mut state = self
            .freed
            .wait_while(self.lock(), |s| s.held >= self.capacity)
            .unwrap_or_else(PoisonError::into_inner);
        self.take_slot(&mut state);
        Permit { gate: self }
    }

    /// Take a slot if one is free right now.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        let mut state = self.lock();
        if state.held >= self.capacity {
            return None;
        }
        self.take_slot(&mut state);
        Some(Permit { gate: self })
    }

    /// Like [`acquire`](Self::acquire), but wakes every `poll` to ask
    /// `should_stop`; returns `None` once it answers true while waiting.
    pub fn acquire_unless(
        &self,
        poll: Duration,
        should_stop: impl Fn() -> bool,
    ) -> Option<Permit<'_>> {
        let mut state = self.lock();
        loop {
            if should_stop() {
                return None;
            }
            if state.held < self.capacity {
                self.take_slot(&mut state);
                return Some(Permit { gate: self });
            }
            trace!(held = state.held, capacity = self.capacity, "waiting for a free copy slot");
            state = self
                .freed
                .wait_timeout(state, poll)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
    }

    fn take_slot(&self, state: &mut GateState) {
        state.held += 1;
        debug_assert!(state.held <= self.capacity);
        state.peak = state.peak.max(state.held);
    }

    fn release(&self) {
        let mut state = self.lock();
        debug_assert!(state.held > 0, "permit released more times than acquired");
        state.held = state.held.saturating_sub(1);
        drop(state);
        self.freed.notify_one();
    }

    // The guard never outlives a gate method, so poisoned state is still consistent.
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
