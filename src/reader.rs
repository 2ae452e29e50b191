// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use log::debug;
use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};

use crate::scroll::Page;

pub const DEFAULT_SEED: u64 = 0x5eed_d21f;

const BOTTOM_PAUSE: Duration = Duration::from_millis(2500);

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Reading { until: Instant, lines_per_sec: f64 },
    Pausing { until: Instant },
    AtBottom { until: Instant },
}

/// Scrolls a page on its own, in bursts separated by pauses, the way a
/// person skims a long article. At the bottom it waits, then starts over
/// from the top.
pub struct DemoReader {
    mt: StdRng,
    rand_burst_ms: Uniform<u64>,
    rand_pause_ms: Uniform<u64>,
    rand_speed: Uniform<f64>,
    phase: Phase,
    last: Instant,
}

impl DemoReader {
    pub fn new(seed: u64, now: Instant) -> Self {
        let mut reader = Self {
            mt: StdRng::seed_from_u64(seed),
            rand_burst_ms: Uniform::new_inclusive(600, 2500).expect("valid range"),
            rand_pause_ms: Uniform::new_inclusive(400, 1800).expect("valid range"),
            rand_speed: Uniform::new_inclusive(4.0, 14.0).expect("valid range"),
            phase: Phase::Pausing { until: now },
            last: now,
        };
        reader.phase = reader.start_burst(now);
        reader
    }

    fn start_burst(&mut self, now: Instant) -> Phase {
        let ms = self.rand_burst_ms.sample(&mut self.mt);
        Phase::Reading {
            until: now + Duration::from_millis(ms),
            lines_per_sec: self.rand_speed.sample(&mut self.mt),
        }
    }

    fn start_pause(&mut self, now: Instant) -> Phase {
        let ms = self.rand_pause_ms.sample(&mut self.mt);
        Phase::Pausing {
            until: now + Duration::from_millis(ms),
        }
    }

    /// When the reader next needs to run; while reading that is the next frame.
    pub fn deadline(&self, now: Instant, frame_period: Duration) -> Instant {
        match self.phase {
            Phase::Reading { .. } => now + frame_period,
            Phase::Pausing { until } | Phase::AtBottom { until } => until,
        }
    }

    /// Advances to `now`. `line` is the height of one line in page units.
    /// Returns whether the page offset changed.
    pub fn step(&mut self, now: Instant, page: &mut Page, line: f64) -> bool {
        let dt = now.saturating_duration_since(self.last).as_secs_f64();
        self.last = now;

        match self.phase {
            Phase::Reading {
                until,
                lines_per_sec,
            } => {
                if page.at_bottom() {
                    debug!("demo reader reached the bottom");
                    self.phase = Phase::AtBottom {
                        until: now + BOTTOM_PAUSE,
                    };
                    return false;
                }
                let moved = page.scroll_by(lines_per_sec * line * dt);
                if now >= until {
                    self.phase = self.start_pause(now);
                }
                moved
            }
            Phase::Pausing { until } => {
                if now >= until {
                    self.phase = self.start_burst(now);
                }
                false
            }
            Phase::AtBottom { until } => {
                if now < until {
                    return false;
                }
                self.phase = self.start_burst(now);
                page.scroll_to(0.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: f64 = 16.0;
    const TICK: Duration = Duration::from_millis(16);

    /// Offsets seen over `secs` seconds of 16 ms steps.
    fn run(seed: u64, secs: u64) -> Vec<f64> {
        let t0 = Instant::now();
        let mut page = Page::new(3.0, 100.0);
        let mut reader = DemoReader::new(seed, t0);
        let steps = secs * 1000 / TICK.as_millis() as u64;
        (1..=steps)
            .map(|i| {
                reader.step(t0 + TICK * i as u32, &mut page, LINE);
                page.offset()
            })
            .collect()
    }

    #[test]
    fn starts_by_reading_downwards() {
        let t0 = Instant::now();
        let mut page = Page::new(3.0, 100.0);
        let mut reader = DemoReader::new(DEFAULT_SEED, t0);
        assert!(reader.step(t0 + TICK, &mut page, LINE));
        assert!(page.offset() > 0.0);
    }

    #[test]
    fn same_seed_reads_the_same_way() {
        assert_eq!(run(7, 20), run(7, 20));
    }

    #[test]
    fn reaches_bottom_then_returns_to_top() {
        let offsets = run(DEFAULT_SEED, 120);
        let bottom = offsets.iter().position(|&o| o >= 200.0);
        let Some(bottom) = bottom else {
            panic!("never reached the bottom");
        };
        assert!(offsets[bottom..].iter().any(|&o| o == 0.0));
    }

    #[test]
    fn never_scrolls_upwards_while_reading() {
        let offsets = run(11, 30);
        for w in offsets.windows(2) {
            assert!(w[1] >= w[0] || w[1] == 0.0);
        }
    }

    #[test]
    fn deadline_is_next_frame_while_reading() {
        let t0 = Instant::now();
        let reader = DemoReader::new(1, t0);
        assert_eq!(reader.deadline(t0, TICK), t0 + TICK);
    }
}
