//! Named simulation and real-time timers
//!
//! Names are non-unique: arming "respawn" twice yields two timers, and
//! `clear` drops both. Sim-time timers consume scaled simulation deltas and
//! stall whenever the driver holds simulation time still; real-time timers
//! consume wall-clock deltas regardless of pause or scale.

use std::time::Duration;

use tracing::debug;

use types::ActorId;

/// One armed timer
#[derive(Debug, Clone)]
pub struct TimerEntry {
    name: String,
    about: Option<ActorId>,
    remaining: f64,
    interval: f64,
    repeat: bool,
    real_time: bool,
}

impl TimerEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about(&self) -> Option<ActorId> {
        self.about
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat
    }

    pub fn is_real_time(&self) -> bool {
        self.real_time
    }

    /// Seconds left before the next expiry
    pub fn remaining(&self) -> f64 {
        self.remaining
    }
}

/// A timer that fired during an advance
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiredTimer {
    pub name: String,
    pub about: Option<ActorId>,
    /// Seconds past the deadline when the expiry was observed
    pub late: f64,
}

/// All armed timers for one manager
#[derive(Default)]
pub struct TimerSet {
    timers: Vec<TimerEntry>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer; names are not unique
    pub fn set(
        &mut self,
        name: impl Into<String>,
        about: Option<ActorId>,
        interval: Duration,
        repeat: bool,
        real_time: bool,
    ) {
        let name = name.into();
        let secs = interval.as_secs_f64();
        debug!(timer = %name, interval_s = secs, repeat, real_time, "timer armed");
        self.timers.push(TimerEntry {
            name,
            about,
            remaining: secs,
            interval: secs,
            repeat,
            real_time,
        });
    }

    /// Drop every timer with the name, returning how many were removed
    pub fn clear(&mut self, name: &str) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.name != name);
        let dropped = before - self.timers.len();
        if dropped > 0 {
            debug!(timer = %name, dropped, "timers cleared");
        }
        dropped
    }

    /// Advance every timer, collecting expirations in arming order
    ///
    /// Sim timers consume `delta_sim`, real-time timers `delta_real`. A
    /// timer fires at most once per advance; repeating timers re-arm at
    /// their full interval, one-shot timers disappear.
    pub fn advance(&mut self, delta_sim: f64, delta_real: f64) -> Vec<ExpiredTimer> {
        let mut expired = Vec::new();
        self.timers.retain_mut(|timer| {
            let delta = if timer.real_time { delta_real } else { delta_sim };
            timer.remaining -= delta;
            if timer.remaining > 0.0 {
                return true;
            }
            expired.push(ExpiredTimer {
                name: timer.name.clone(),
                about: timer.about,
                late: -timer.remaining,
            });
            if timer.repeat {
                timer.remaining = timer.interval;
                true
            } else {
                false
            }
        });
        expired
    }

    pub fn entries(&self) -> &[TimerEntry] {
        &self.timers
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_one_shot_fires_once_then_disappears() {
        let mut timers = TimerSet::new();
        timers.set("door-close", None, secs(0.5), false, false);

        assert!(timers.advance(0.4, 0.4).is_empty());
        let fired = timers.advance(0.2, 0.2);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].name, "door-close");
        assert!((fired[0].late - 0.1).abs() < 1e-9);
        assert!(timers.is_empty());
        assert!(timers.advance(10.0, 10.0).is_empty());
    }

    #[test]
    fn test_repeating_rearms_at_interval() {
        let mut timers = TimerSet::new();
        timers.set("heartbeat", None, secs(1.0), true, false);

        for _ in 0..3 {
            let fired = timers.advance(1.0, 1.0);
            assert_eq!(fired.len(), 1, "fires each interval");
        }
        assert_eq!(timers.len(), 1, "repeating timer stays armed");
    }

    #[test]
    fn test_fires_at_most_once_per_advance() {
        let mut timers = TimerSet::new();
        timers.set("spawn-wave", None, secs(0.1), true, false);

        // A frame much longer than the interval still yields one expiry.
        let fired = timers.advance(1.0, 1.0);
        assert_eq!(fired.len(), 1);
        assert!((fired[0].late - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_real_time_timer_ignores_sim_delta() {
        let mut timers = TimerSet::new();
        timers.set("lobby-countdown", None, secs(1.0), false, true);

        // Simulation paused: sim delta zero, real keeps going.
        assert!(timers.advance(0.0, 0.6).is_empty());
        let fired = timers.advance(0.0, 0.6);
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn test_sim_timer_stalls_without_sim_delta() {
        let mut timers = TimerSet::new();
        timers.set("respawn", None, secs(1.0), false, false);

        for _ in 0..10 {
            assert!(timers.advance(0.0, 1.0).is_empty());
        }
        assert_eq!(timers.advance(1.0, 0.0).len(), 1);
    }

    #[test]
    fn test_clear_removes_all_with_name() {
        let mut timers = TimerSet::new();
        let about = ActorId::new();
        timers.set("respawn", Some(about), secs(1.0), false, false);
        timers.set("respawn", None, secs(2.0), true, false);
        timers.set("other", None, secs(3.0), false, false);

        assert_eq!(timers.clear("respawn"), 2);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.entries()[0].name(), "other");
        assert_eq!(timers.clear("respawn"), 0);
    }

    #[test]
    fn test_expiry_order_follows_arming_order() {
        let mut timers = TimerSet::new();
        let a = ActorId::new();
        let b = ActorId::new();
        timers.set("first", Some(a), secs(0.5), false, false);
        timers.set("second", Some(b), secs(0.5), false, false);

        let fired = timers.advance(0.5, 0.5);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].name, "first");
        assert_eq!(fired[0].about, Some(a));
        assert_eq!(fired[1].name, "second");
    }

    #[test]
    fn test_exact_deadline_fires() {
        let mut timers = TimerSet::new();
        timers.set("exact", None, secs(0.25), false, false);
        let fired = timers.advance(0.25, 0.25);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].late, 0.0);
    }
}
