// Copyright (c) 2026 rezky_nightky

//! Suspendable easing loop.
//!
//! The animator never schedules anything itself; it asks a [`FrameScheduler`]
//! for at most one frame at a time and stops asking once `current` has
//! converged on `target`. A frame always runs in the same order: refresh
//! the target, ease, draw, then decide whether another frame is needed.

use log::trace;

use crate::scroll::lerp;

pub const DEFAULT_SPEED: f64 = 0.12;
pub const DEFAULT_SNAP_EPSILON: f64 = 0.25;

/// Per-trail animation record. Coordinates are vertical offsets in
/// viewport units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationState {
    pub current: f64,
    pub target: f64,
    pub high_water: f64,
    pub running: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
}

impl AnimationState {
    pub fn phase(&self) -> Phase {
        if self.running {
            Phase::Running
        } else {
            Phase::Idle
        }
    }

    /// Clamps every coordinate into a (possibly smaller) viewport height.
    pub fn reclamp(&mut self, height: f64) {
        let h = height.max(0.0);
        self.current = self.current.clamp(0.0, h);
        self.target = self.target.clamp(0.0, h);
        self.high_water = self.high_water.clamp(0.0, h);
    }
}

/// Host-side frame source (a display refresh, a timer, a test harness).
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Easing {
    pub speed: f64,
    pub epsilon: f64,
}

impl Default for Easing {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            epsilon: DEFAULT_SNAP_EPSILON,
        }
    }
}

impl Easing {
    pub fn effective_speed(&self, reduced_motion: bool) -> f64 {
        if reduced_motion {
            1.0
        } else {
            self.speed.clamp(0.0, 1.0)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The frame arrived while idle and did nothing.
    Skipped,
    /// Another frame was requested.
    Continue,
    /// `current` snapped onto `target`; the loop is idle again.
    Converged,
}

#[derive(Clone, Debug)]
pub struct Animator {
    easing: Easing,
    reduced_motion: bool,
}

impl Animator {
    pub fn new(easing: Easing) -> Self {
        Self {
            easing,
            reduced_motion: false,
        }
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.reduced_motion = on;
    }

    /// Idle -> Running. Returns false (and schedules nothing) when a frame
    /// is already in flight.
    pub fn wake<S>(&self, state: &mut AnimationState, sched: &mut S) -> bool
    where
        S: FrameScheduler + ?Sized,
    {
        if state.running {
            return false;
        }
        state.running = true;
        sched.request_frame();
        trace!("animator wake at current={:.2}", state.current);
        true
    }

    /// One animation frame.
    pub fn frame<R, D, S>(
        &self,
        state: &mut AnimationState,
        refresh: R,
        mut draw: D,
        sched: &mut S,
    ) -> Step
    where
        R: FnOnce(&mut AnimationState),
        D: FnMut(&AnimationState),
        S: FrameScheduler + ?Sized,
    {
        if !state.running {
            return Step::Skipped;
        }

        refresh(state);

        let speed = self.easing.effective_speed(self.reduced_motion);
        state.current = lerp(state.current, state.target, speed);
        draw(state);

        if (state.current - state.target).abs() < self.easing.epsilon {
            state.current = state.target;
            draw(state);
            state.running = false;
            trace!("animator converged at {:.2}", state.current);
            return Step::Converged;
        }

        sched.request_frame();
        Step::Continue
    }
}
