//! Ticketed debouncer
//!
//! The platform owns the timer. Every change takes a new ticket and restarts
//! the timer with it; when a timer fires, only the newest ticket runs.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceTicket(u64);

impl DebounceTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    issued: u64,
    pending: Option<DebounceTicket>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            issued: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a run, superseding any pending one
    pub fn schedule(&mut self) -> DebounceTicket {
        self.issued += 1;
        let ticket = DebounceTicket(self.issued);
        self.pending = Some(ticket);
        ticket
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// A timer fired. Returns true if the ticket is still the pending one.
    pub fn fire(&mut self, ticket: DebounceTicket) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
