use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("cannot {action} a timer that is {from}")]
    InvalidTransition {
        action: &'static str,
        from: TimerState,
    },
}

/// Wall-clock stopwatch that survives pause/resume cycles.
///
/// While running, elapsed time is `now - started_at`. Resuming re-bases
/// `started_at` so the time accumulated before the pause is kept.
/// `elapsed` is only authoritative when not running.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    state: TimerState,
    started_at: Option<Instant>,
    elapsed: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            started_at: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn start(&mut self) -> Result<(), TimerError> {
        self.start_at(Instant::now())
    }

    pub fn start_at(&mut self, now: Instant) -> Result<(), TimerError> {
        self.expect_state(TimerState::Stopped, "start")?;
        self.started_at = Some(now);
        self.state = TimerState::Running;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        self.pause_at(Instant::now())
    }

    pub fn pause_at(&mut self, now: Instant) -> Result<(), TimerError> {
        self.expect_state(TimerState::Running, "pause")?;
        self.elapsed = self.running_elapsed(now);
        self.state = TimerState::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TimerError> {
        self.resume_at(Instant::now())
    }

    pub fn resume_at(&mut self, now: Instant) -> Result<(), TimerError> {
        self.expect_state(TimerState::Paused, "resume")?;
        self.started_at = Some(now.checked_sub(self.elapsed).unwrap_or(now));
        self.state = TimerState::Running;
        Ok(())
    }

    /// Start, pause or resume depending on the current state
    pub fn toggle(&mut self) -> Result<TimerState, TimerError> {
        self.toggle_at(Instant::now())
    }

    pub fn toggle_at(&mut self, now: Instant) -> Result<TimerState, TimerError> {
        match self.state {
            TimerState::Stopped => self.start_at(now)?,
            TimerState::Running => self.pause_at(now)?,
            TimerState::Paused => self.resume_at(now)?,
            TimerState::Finished => {
                return Err(TimerError::InvalidTransition {
                    action: "toggle",
                    from: TimerState::Finished,
                })
            }
        }
        Ok(self.state)
    }

    /// Freeze the elapsed time for good. Valid from any state but Finished.
    pub fn finish(&mut self) -> Result<(), TimerError> {
        self.finish_at(Instant::now())
    }

    pub fn finish_at(&mut self, now: Instant) -> Result<(), TimerError> {
        match self.state {
            TimerState::Finished => {
                return Err(TimerError::InvalidTransition {
                    action: "finish",
                    from: TimerState::Finished,
                })
            }
            TimerState::Running => self.elapsed = self.running_elapsed(now),
            TimerState::Stopped | TimerState::Paused => {}
        }
        self.state = TimerState::Finished;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        if self.is_running() {
            self.running_elapsed(now)
        } else {
            self.elapsed
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Label for the single start/pause/resume control
    pub fn button_label(&self) -> &'static str {
        match self.state {
            TimerState::Stopped => "Start",
            TimerState::Running => "Pause",
            TimerState::Paused => "Resume",
            TimerState::Finished => "Done",
        }
    }

    fn running_elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or(self.elapsed)
    }

    fn expect_state(&self, expected: TimerState, action: &'static str) -> Result<(), TimerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(TimerError::InvalidTransition {
                action,
                from: self.state,
            })
        }
    }
}
