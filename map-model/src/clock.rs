use serde::{Deserialize, Serialize};

use crate::constants::MIN_SCHEDULE_ANIMATION_ZOOM;

/// How wall-clock time maps onto the schedule data's clock. These encode
/// the time range of the bundled schedule extract, they are not derived
/// from data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Length of the in-data window that is looped over, in data seconds.
    pub loop_length: f64,
    /// Data seconds that pass per wall-clock second.
    pub animation_speed: f64,
    /// Where in the data's day the loop starts, in seconds since midnight.
    pub start_offset: f64,
}

impl Default for ClockConfig {
    /// The schedule extract covers 4pm-8pm, played at 60x.
    fn default() -> Self {
        ClockConfig {
            loop_length: 14_400.0,
            animation_speed: 60.0,
            start_offset: 57_600.0,
        }
    }
}

impl ClockConfig {
    /// Wall-clock seconds one pass over the loop takes.
    pub fn loop_segments(&self) -> f64 {
        self.loop_length / self.animation_speed
    }

    /// Map elapsed wall-clock seconds to the in-data timestamp. Confined to
    /// `[start_offset, start_offset + loop_length)` and periodic with
    /// period [`loop_segments`](Self::loop_segments).
    pub fn current_time(&self, elapsed_wall_seconds: f64) -> f64 {
        let segments = self.loop_segments();
        (elapsed_wall_seconds.rem_euclid(segments) / segments) * self.loop_length
            + self.start_offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    Stopped,
}

/// The free-running animation clock. The clock itself is just state — the
/// frontend owns the frame callback, schedules a tick per animation frame
/// while the clock runs, and cancels the pending callback on
/// [`Transition::Stopped`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleClock {
    config: ClockConfig,
    running: bool,
    current_time: f64,
}

impl ScheduleClock {
    pub fn new(config: ClockConfig) -> Self {
        ScheduleClock {
            current_time: config.start_offset,
            running: false,
            config,
        }
    }

    pub fn config(&self) -> ClockConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The in-data timestamp of the last tick. Holds its value while
    /// stopped, so a restarted animation resumes where it froze.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Advance to the data time for this wall-clock instant. No-op while
    /// stopped (a frame callback can still be in flight when the stop
    /// transition lands).
    pub fn tick(&mut self, elapsed_wall_seconds: f64) -> Option<f64> {
        if !self.running {
            return None;
        }
        self.current_time = self.config.current_time(elapsed_wall_seconds);
        Some(self.current_time)
    }

    /// Request the clock to run or not; returns the transition when the
    /// state actually changes, which is the caller's cue to schedule or
    /// cancel its frame callback.
    pub fn set_running(&mut self, run: bool) -> Option<Transition> {
        if run == self.running {
            return None;
        }
        self.running = run;
        Some(if run {
            Transition::Started
        } else {
            Transition::Stopped
        })
    }

    /// Zoom-driven transitions: the animation only runs at/above the
    /// minimum animation zoom. Also applied with the starting zoom on
    /// mount.
    pub fn update_zoom(&mut self, zoom: f64) -> Option<Transition> {
        self.set_running(zoom >= MIN_SCHEDULE_ANIMATION_ZOOM)
    }
}

#[cfg(test)]
mod test {
    use super::{ClockConfig, ScheduleClock, Transition};

    #[test]
    fn current_time_stays_in_data_window() {
        let config = ClockConfig::default();
        for &elapsed in &[0.0, 0.5, 239.9, 240.0, 1_000_000.3, 86_400.0] {
            let t = config.current_time(elapsed);
            assert!(t >= 57_600.0, "t = {} for elapsed {}", t, elapsed);
            assert!(t < 72_000.0, "t = {} for elapsed {}", t, elapsed);
        }
    }

    #[test]
    fn clock_is_periodic_in_loop_segments() {
        let config = ClockConfig::default();
        assert_eq!(config.loop_segments(), 240.0);
        for &elapsed in &[0.0, 1.5, 100.25, 239.0] {
            assert_eq!(
                config.current_time(elapsed),
                config.current_time(elapsed + 240.0)
            );
        }
    }

    #[test]
    fn sixty_x_speed() {
        let config = ClockConfig::default();
        // one wall second is one data minute
        assert_eq!(config.current_time(0.0), 57_600.0);
        assert_eq!(config.current_time(1.0), 57_660.0);
        assert_eq!(config.current_time(60.0), 61_200.0);
    }

    #[test]
    fn tick_is_inert_while_stopped() {
        let mut clock = ScheduleClock::new(ClockConfig::default());
        assert_eq!(clock.tick(10.0), None);
        assert_eq!(clock.current_time(), 57_600.0);
    }

    #[test]
    fn zoom_transitions() {
        let mut clock = ScheduleClock::new(ClockConfig::default());
        // mount below the animation zoom: nothing happens
        assert_eq!(clock.update_zoom(9.0), None);
        assert!(!clock.is_running());

        assert_eq!(clock.update_zoom(11.0), Some(Transition::Started));
        assert_eq!(clock.update_zoom(12.5), None);
        assert_eq!(clock.tick(2.0), Some(57_720.0));

        assert_eq!(clock.update_zoom(10.9), Some(Transition::Stopped));
        assert_eq!(clock.tick(3.0), None);
        // frozen at the last running tick
        assert_eq!(clock.current_time(), 57_720.0);
    }

    #[test]
    fn teardown_stop_is_idempotent() {
        let mut clock = ScheduleClock::new(ClockConfig::default());
        clock.update_zoom(12.0);
        assert_eq!(clock.set_running(false), Some(Transition::Stopped));
        assert_eq!(clock.set_running(false), None);
    }
}
