//! Debounce state machine for path updates
//!
//! Pure transition logic: the machine consumes snapshots and timer firings
//! and returns the events to emit plus the timer action to apply. All timing
//! and channel plumbing lives in the monitor actor, which keeps every
//! transition here unit-testable without a clock.

use wavelink_core::{ConnectivityEvent, NetworkPathSnapshot};

// ----------------------------------------------------------------------------
// Transition Output
// ----------------------------------------------------------------------------

/// What the actor should do with its debounce timer after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Leave the timer as it is
    Keep,
    /// Arm the timer for one debounce window from now
    Arm,
    /// Disarm a pending timer
    Disarm,
}

/// Result of advancing the machine by one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Events to fan out to subscribers, in order
    pub events: Vec<ConnectivityEvent>,
    /// Timer action to apply
    pub timer: TimerAction,
}

impl Step {
    fn noop() -> Self {
        Self {
            events: Vec::new(),
            timer: TimerAction::Keep,
        }
    }
}

// ----------------------------------------------------------------------------
// Path Machine
// ----------------------------------------------------------------------------

/// Debounce state machine over network path snapshots.
///
/// States are `Unknown` (no snapshot yet), `Satisfied`, and `Unsatisfied`,
/// tracked through the last-seen snapshot. A reachability drop arms the
/// debounce timer instead of reporting immediately; a recovery inside the
/// window is reported as a network switch, a timer firing without recovery
/// as an ordinary loss of connectivity.
#[derive(Debug, Default)]
pub struct PathMachine {
    /// Last snapshot seen, `None` while still in `Unknown`
    prev: Option<NetworkPathSnapshot>,
    /// Last reachability value reported to subscribers, for deduplication
    reported_reachable: Option<bool>,
    /// Set between a drop and either a quick recovery or the timer firing
    possibly_switching: bool,
    /// Mirrors whether the actor currently has a deadline armed
    timer_armed: bool,
}

impl PathMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drop is currently being debounced
    pub fn possibly_switching(&self) -> bool {
        self.possibly_switching
    }

    /// Advance the machine with a fresh snapshot
    pub fn on_snapshot(&mut self, next: NetworkPathSnapshot) -> Step {
        let Some(prev) = self.prev.take() else {
            // First observation out of Unknown: report reachability once.
            self.reported_reachable = Some(next.reachable);
            let events = vec![ConnectivityEvent::ReachabilityChanged(next.reachable)];
            self.prev = Some(next);
            return Step {
                events,
                timer: TimerAction::Keep,
            };
        };

        // Identical snapshots are a no-op.
        if prev == next {
            self.prev = Some(prev);
            return Step::noop();
        }

        let mut events = Vec::new();
        let mut timer = TimerAction::Keep;

        match (prev.reachable, next.reachable) {
            (true, false) => {
                // Don't report yet: the path may come straight back on a new
                // interface (handover). The timer decides which it was.
                self.possibly_switching = true;
                self.timer_armed = true;
                timer = TimerAction::Arm;
            }
            (false, true) => {
                if self.possibly_switching && self.timer_armed {
                    // Quick drop and recover: migration opportunity.
                    self.possibly_switching = false;
                    self.timer_armed = false;
                    timer = TimerAction::Disarm;
                    events.push(ConnectivityEvent::NetworkSwitched(next.clone()));
                }
                if self.reported_reachable != Some(true) {
                    events.push(ConnectivityEvent::ReachabilityChanged(true));
                    self.reported_reachable = Some(true);
                }
            }
            (true, true) => {
                if !prev.same_path(&next) {
                    // Interface or address change while staying reachable.
                    events.push(ConnectivityEvent::NetworkSwitched(next.clone()));
                }
            }
            (false, false) => {}
        }

        self.prev = Some(next);
        Step { events, timer }
    }

    /// The debounce timer fired without a recovery: the drop was real.
    pub fn on_timer_fired(&mut self) -> Step {
        self.possibly_switching = false;
        self.timer_armed = false;

        let mut events = Vec::new();
        if self.reported_reachable != Some(false) {
            events.push(ConnectivityEvent::ReachabilityChanged(false));
            self.reported_reachable = Some(false);
        }
        Step {
            events,
            timer: TimerAction::Keep,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
