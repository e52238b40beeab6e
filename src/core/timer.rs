//=========================================================================
// Repeating Timer
//=========================================================================
//
// Delay-then-interval timer advanced by the host loop.
//
// Timeline:
//   start ──initial_delay──► fire ──interval──► fire ──interval──► ...
//
// The timer never sleeps or blocks; the owner feeds it elapsed time via
// `advance(dt)` and runs its action once per returned fire.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::warn;

//=== Constants ===========================================================

/// Upper bound on fires reported by a single `advance` call.
///
/// A host that stalls for a long time would otherwise replay every missed
/// interval at once.
pub const MAX_FIRES_PER_ADVANCE: u32 = 32;

//=== RepeatingTimer ======================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatingTimer {
    initial_delay: f32,
    interval: f32,
    elapsed: f32,
    fired_once: bool,
    running: bool,
}

impl RepeatingTimer {
    /// Creates a running timer.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is not strictly positive or `initial_delay`
    /// is negative.
    pub fn new(initial_delay: f32, interval: f32) -> Self {
        assert!(interval > 0.0, "Timer interval must be positive, got {}", interval);
        assert!(
            initial_delay >= 0.0,
            "Timer delay must not be negative, got {}",
            initial_delay
        );

        Self {
            initial_delay,
            interval,
            elapsed: 0.0,
            fired_once: false,
            running: true,
        }
    }

    //--- Update -----------------------------------------------------------

    /// Advances the timer by `dt` seconds and returns how many times it fired.
    ///
    /// Zero, negative and non-finite steps are ignored.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.running || !(dt.is_finite() && dt > 0.0) {
            return 0;
        }

        self.elapsed += dt;
        let mut fires = 0;

        if !self.fired_once {
            if self.elapsed < self.initial_delay {
                return 0;
            }
            self.elapsed -= self.initial_delay;
            self.fired_once = true;
            fires = 1;
        }

        // Catch-up loop: several intervals may have passed during dt
        while self.elapsed >= self.interval && fires < MAX_FIRES_PER_ADVANCE {
            self.elapsed -= self.interval;
            fires += 1;
        }

        if self.elapsed >= self.interval {
            warn!(
                "Timer backlog of {:.2}s dropped after {} fires",
                self.elapsed, fires
            );
            self.elapsed %= self.interval;
        }

        fires
    }

    /// Stops the timer. Calling it again has no effect.
    pub fn stop(&mut self) {
        self.running = false;
    }

    //--- Queries ----------------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn initial_delay(&self) -> f32 {
        self.initial_delay
    }

    /// Seconds until the next fire, or `None` once stopped.
    pub fn remaining(&self) -> Option<f32> {
        if !self.running {
            return None;
        }
        let target = if self.fired_once {
            self.interval
        } else {
            self.initial_delay
        };
        Some((target - self.elapsed).max(0.0))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
