//! # Supervisor runtime configuration.
//!
//! Provides [`SupervisorConfig`], the centralized settings for a
//! [`Supervisor`](crate::Supervisor).
//!
//! ## Sentinel values
//! - `grace = 0s` → [`Supervisor::join`](crate::Supervisor::join) waits
//!   indefinitely for workers to reach a terminal state.
//! - `bus_capacity` is clamped to a minimum of 1 by the event bus.

use std::time::Duration;

/// Global configuration for a [`Supervisor`](crate::Supervisor).
///
/// ## Field semantics
/// - `grace`: maximum wait inside `join()` (`0s` = no window, wait forever)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the bus)
///
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks (`0`) across call sites.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Maximum time `join()` waits for all workers to reach a terminal state.
    ///
    /// - `Duration::ZERO` = wait indefinitely
    /// - `> 0` = return [`JoinError::GraceExceeded`](crate::JoinError::GraceExceeded)
    ///   with the list of still-running workers once the window closes
    pub grace: Duration,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events will
    /// observe `Lagged` and skip older items. Minimum value is 1.
    pub bus_capacity: usize,
}

impl SupervisorConfig {
    /// Returns the join grace window as an `Option`.
    ///
    /// - `None` → wait indefinitely
    /// - `Some(d)` → bounded wait
    #[inline]
    pub fn grace_window(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `grace = 0s` (join waits indefinitely)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            grace: Duration::ZERO,
            bus_capacity: 1024,
        }
    }
}
