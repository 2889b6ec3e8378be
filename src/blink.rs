//! Caret blink state machine.
//!
//! The controller owns at most one running timer at a time. A timer is
//! represented by a guard returned from [`BlinkTimer::start`]; dropping the
//! guard cancels it. Every start is tagged with an epoch and ticks carrying
//! an older epoch are ignored, so a callback that races a cancellation can
//! never flip visibility.

use std::time::Duration;

use crate::config::BlinkMode;

/// Starts a repeating timer that calls back into
/// [`BlinkController::tick`] with the given epoch every `period`.
pub trait BlinkTimer {
    /// Keeps the timer alive. Dropping it must stop further ticks.
    type Guard;

    fn start(&mut self, period: Duration, epoch: u64) -> Self::Guard;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretState {
    SteadyVisible,
    SteadyHidden,
    BlinkOn,
    BlinkOff,
}

impl CaretState {
    pub fn is_visible(self) -> bool {
        matches!(self, CaretState::SteadyVisible | CaretState::BlinkOn)
    }
}

pub struct BlinkController<G> {
    mode: BlinkMode,
    state: CaretState,
    focused: bool,
    epoch: u64,
    timer: Option<G>,
}

impl<G> BlinkController<G> {
    /// Creates an unfocused controller. The caret stays hidden until
    /// [`focus`](Self::focus) is called.
    pub fn new(mode: BlinkMode) -> Self {
        Self {
            mode,
            state: CaretState::SteadyHidden,
            focused: false,
            epoch: 0,
            timer: None,
        }
    }

    pub fn state(&self) -> CaretState {
        self.state
    }

    pub fn mode(&self) -> BlinkMode {
        self.mode
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn focus<T: BlinkTimer<Guard = G> + ?Sized>(&mut self, timer: &mut T) {
        self.focused = true;
        self.restart(timer);
    }

    pub fn blur(&mut self) {
        self.focused = false;
        self.cancel();
        self.state = CaretState::SteadyHidden;
        tracing::debug!(epoch = self.epoch, "caret blink stopped on blur");
    }

    /// Restarts the blink cycle with the caret visible. Does nothing while
    /// unfocused.
    pub fn restart<T: BlinkTimer<Guard = G> + ?Sized>(&mut self, timer: &mut T) {
        if !self.focused {
            return;
        }
        self.cancel();
        self.state = match self.mode {
            BlinkMode::Blink(period) => {
                self.timer = Some(timer.start(period, self.epoch));
                CaretState::BlinkOn
            }
            BlinkMode::Steady => CaretState::SteadyVisible,
            BlinkMode::Hidden => CaretState::SteadyHidden,
        };
        tracing::debug!(epoch = self.epoch, state = ?self.state, "caret blink restarted");
    }

    pub fn set_mode<T: BlinkTimer<Guard = G> + ?Sized>(&mut self, mode: BlinkMode, timer: &mut T) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        if self.focused {
            self.restart(timer);
        } else {
            self.cancel();
        }
    }

    /// Advances the blink cycle. Returns the new state, or `None` when the
    /// tick belongs to a cancelled timer.
    pub fn tick(&mut self, epoch: u64) -> Option<CaretState> {
        if epoch != self.epoch || self.timer.is_none() {
            tracing::trace!(epoch, current = self.epoch, "stale blink tick");
            return None;
        }
        self.state = match self.state {
            CaretState::BlinkOn => CaretState::BlinkOff,
            CaretState::BlinkOff => CaretState::BlinkOn,
            steady => return Some(steady),
        };
        Some(self.state)
    }

    fn cancel(&mut self) {
        if self.timer.take().is_some() {
            self.epoch += 1;
        }
    }
}
