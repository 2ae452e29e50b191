// Copyright (c) 2026 rezky_nightky

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::{quantize, Rgb};
use crate::runtime::{ColorMode, GlyphMode};
use crate::surface::Surface;
use crate::viewport::TerminalViewport;

const HALF_BLOCK: char = '\u{2580}';
const MONO_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Below this coverage a dot counts as empty page.
const EMPTY_ALPHA: f32 = 1.0 / 255.0;

/// Averaged raster colour of one dot.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Dot {
    rgb: Rgb,
    alpha: f32,
}

/// Turns the trail surface into terminal cells.
#[derive(Clone, Copy, Debug)]
pub struct Presenter {
    mode: ColorMode,
    glyphs: GlyphMode,
    background: Rgb,
    default_background: bool,
}

impl Presenter {
    pub fn new(mode: ColorMode, glyphs: GlyphMode, background: Rgb, default_background: bool) -> Self {
        Self {
            mode,
            glyphs,
            background,
            default_background,
        }
    }

    pub fn set_background(&mut self, background: Rgb) {
        self.background = background;
    }

    /// The cell an untouched part of the page shows.
    pub fn blank_cell(&self) -> Cell {
        if self.default_background {
            Cell::blank(None)
        } else {
            Cell::blank(quantize(self.mode, self.background))
        }
    }

    pub fn present(&self, surface: &Surface, tv: &TerminalViewport, frame: &mut Frame) {
        let dots = match self.mode {
            ColorMode::Mono => 1,
            _ => self.glyphs.dots_per_cell(),
        };
        let cols = tv.cols.min(frame.width);
        let lines = tv.lines.min(frame.height);
        for cy in 0..lines {
            for cx in 0..cols {
                let cell = match dots {
                    2 => {
                        let top = self.dot(surface, tv, cx, cy, 0, 2);
                        let bottom = self.dot(surface, tv, cx, cy, 1, 2);
                        self.half_block(top, bottom)
                    }
                    _ => self.single(self.dot(surface, tv, cx, cy, 0, 1)),
                };
                frame.set(cx, cy, cell);
            }
        }
    }

    /// Dot `k` of `n` stacked vertically inside cell `(cx, cy)`.
    fn dot(&self, surface: &Surface, tv: &TerminalViewport, cx: u16, cy: u16, k: u16, n: u16) -> Dot {
        let d = surface.density();
        let cw = tv.cell.w as f64;
        let ch = tv.cell.h as f64;
        let lx0 = cx as f64 * cw;
        let ly0 = cy as f64 * ch + ch * k as f64 / n as f64;
        let ly1 = cy as f64 * ch + ch * (k + 1) as f64 / n as f64;

        let x0 = (lx0 * d).floor() as usize;
        let y0 = (ly0 * d).floor() as usize;
        let x1 = (((lx0 + cw) * d).ceil() as usize).max(x0 + 1);
        let y1 = ((ly1 * d).ceil() as usize).max(y0 + 1);

        let p = surface.average(x0, y0, x1, y1);
        let inv = 1.0 - p[3].clamp(0.0, 1.0);
        let over = |src: f32, bg: u8| (src * 255.0 + bg as f32 * inv).round().clamp(0.0, 255.0) as u8;
        Dot {
            rgb: (
                over(p[0], self.background.0),
                over(p[1], self.background.1),
                over(p[2], self.background.2),
            ),
            alpha: p[3],
        }
    }

    fn is_empty(dot: Dot) -> bool {
        dot.alpha < EMPTY_ALPHA
    }

    fn half_block(&self, top: Dot, bottom: Dot) -> Cell {
        if self.default_background && Self::is_empty(top) && Self::is_empty(bottom) {
            return Cell::blank(None);
        }
        let fg = quantize(self.mode, top.rgb);
        let bg = quantize(self.mode, bottom.rgb);
        if fg == bg {
            return Cell { ch: ' ', fg: None, bg };
        }
        Cell {
            ch: HALF_BLOCK,
            fg,
            bg,
        }
    }

    fn single(&self, dot: Dot) -> Cell {
        if self.mode == ColorMode::Mono {
            let last = MONO_RAMP.len() - 1;
            let i = (dot.alpha.clamp(0.0, 1.0) * last as f32).round() as usize;
            return Cell {
                ch: MONO_RAMP[i.min(last)],
                fg: None,
                bg: None,
            };
        }
        if self.default_background && Self::is_empty(dot) {
            return Cell::blank(None);
        }
        Cell::blank(quantize(self.mode, dot.rgb))
    }
}
