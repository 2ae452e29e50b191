// Copyright (c) 2026 rezky_nightky

use log::debug;

use crate::animator::{AnimationState, Animator, Easing, FrameScheduler, Step};
use crate::render::{TrailRenderer, TrailStyle};
use crate::scroll::{ScrollMapper, ScrollSource};
use crate::surface::Surface;
use crate::viewport::{Viewport, ViewportBinder};

/// One scroll-driven trail: its animation record, its drawing surface and
/// the two host entry points that drive them.
///
/// Until the first layout pass there is no surface; every entry point is a
/// no-op in that state.
pub struct Trail {
    state: AnimationState,
    viewport: Viewport,
    surface: Option<Surface>,
    mapper: ScrollMapper,
    animator: Animator,
    renderer: TrailRenderer,
    renders: u64,
}

impl Trail {
    pub fn new(easing: Easing, style: TrailStyle) -> Self {
        Self {
            state: AnimationState::default(),
            viewport: Viewport::new(1.0, 1.0, 1.0),
            surface: None,
            mapper: ScrollMapper::default(),
            animator: Animator::new(easing),
            renderer: TrailRenderer::new(style),
            renders: 0,
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Number of completed renders; hosts compare it to know when to present.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.animator.set_reduced_motion(on);
    }

    /// Switches colours and redraws the current state.
    pub fn set_style(&mut self, style: TrailStyle) {
        self.renderer.set_style(style);
        self.redraw();
    }

    /// Resizes the surface, re-clamps the animation into the new height,
    /// redraws, then wakes the animator.
    pub fn on_layout_changed<S>(&mut self, binder: &dyn ViewportBinder, sched: &mut S)
    where
        S: FrameScheduler + ?Sized,
    {
        self.viewport = binder.viewport();
        match self.surface.as_mut() {
            Some(surface) => surface.resize(&self.viewport),
            None => self.surface = Some(Surface::new(&self.viewport)),
        }
        self.state.reclamp(self.viewport.height);
        if let Some(surface) = self.surface.as_ref() {
            debug!(
                "layout {}x{} on a {}x{} surface (high water {:.1})",
                self.viewport.width,
                self.viewport.height,
                surface.width(),
                surface.height(),
                self.state.high_water
            );
        }
        self.redraw();
        self.animator.wake(&mut self.state, sched);
    }

    /// Wakes the animator; the target itself is refreshed inside the frame.
    pub fn on_scroll_changed<S>(&mut self, sched: &mut S)
    where
        S: FrameScheduler + ?Sized,
    {
        if self.surface.is_none() {
            return;
        }
        self.animator.wake(&mut self.state, sched);
    }

    /// Runs one scheduled frame.
    pub fn tick<S>(&mut self, scroll: &dyn ScrollSource, sched: &mut S) -> Step
    where
        S: FrameScheduler + ?Sized,
    {
        let Some(surface) = self.surface.as_mut() else {
            self.state.running = false;
            return Step::Skipped;
        };

        let height = self.viewport.height;
        let mapper = self.mapper;
        let renderer = &self.renderer;
        let viewport = &self.viewport;
        let renders = &mut self.renders;

        let step = self.animator.frame(
            &mut self.state,
            |st| mapper.update(st, scroll.scroll_position(), height),
            |st| {
                renderer.render(st, viewport, surface);
                *renders += 1;
            },
            sched,
        );
        if step == Step::Converged {
            debug!("trail settled at {:.1}", self.state.current);
        }
        step
    }

    fn redraw(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            self.renderer.render(&self.state, &self.viewport, surface);
            self.renders += 1;
        }
    }
}
