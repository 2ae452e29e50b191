// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::render::TrailStyle;
use crate::runtime::{ColorMode, ColorScheme};

pub type Rgb = (u8, u8, u8);

const WHITE: Rgb = (255, 255, 255);

/// Colours of one theme: the page the trail is drawn on plus the three
/// trail inks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub background: Rgb,
    pub fresh: Rgb,
    pub old: Rgb,
    pub droplet: Rgb,
}

impl Theme {
    pub fn trail_style(&self) -> TrailStyle {
        TrailStyle {
            fresh: self.fresh,
            old: self.old,
            droplet: self.droplet,
            highlight: WHITE,
        }
    }
}

pub fn theme(scheme: ColorScheme) -> Theme {
    match scheme {
        ColorScheme::Blood => Theme {
            background: (244, 238, 226),
            fresh: (91, 10, 10),
            old: (42, 0, 0),
            droplet: (59, 0, 0),
        },
        ColorScheme::Night => Theme {
            background: (12, 10, 14),
            fresh: (200, 24, 32),
            old: (130, 8, 14),
            droplet: (150, 12, 20),
        },
        ColorScheme::Ink => Theme {
            background: (236, 234, 228),
            fresh: (40, 44, 56),
            old: (8, 10, 16),
            droplet: (24, 26, 34),
        },
        ColorScheme::Ember => Theme {
            background: (20, 12, 8),
            fresh: (255, 140, 30),
            old: (150, 40, 0),
            droplet: (210, 90, 10),
        },
        ColorScheme::Moss => Theme {
            background: (232, 236, 222),
            fresh: (60, 110, 40),
            old: (20, 50, 16),
            droplet: (36, 80, 28),
        },
        ColorScheme::Ocean => Theme {
            background: (6, 16, 28),
            fresh: (60, 180, 255),
            old: (0, 60, 140),
            droplet: (20, 120, 200),
        },
        ColorScheme::Violet => Theme {
            background: (240, 234, 244),
            fresh: (120, 40, 160),
            old: (50, 0, 80),
            droplet: (80, 20, 120),
        },
    }
}

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let dr = (a.0 as i32) - (b.0 as i32);
    let dg = (a.1 as i32) - (b.1 as i32);
    let db = (a.2 as i32) - (b.2 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

/// Nearest xterm-256 index, choosing between the 6x6x6 cube and the grey ramp.
pub fn rgb_to_ansi256(rgb: Rgb) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| (((v as u16 * 5) + 127) / 255) as u8;
    let (r6, g6, b6) = (level(rgb.0), level(rgb.1), level(rgb.2));
    let cube = (
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((rgb.0 as u16 + rgb.1 as u16 + rgb.2 as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, (0, 0, 0)),
        239..=255 => (231, WHITE),
        _ => {
            let step = (avg - 8) / 10;
            let v = 8 + 10 * step;
            (232 + step, (v, v, v))
        }
    };

    if dist2(rgb, gray) < dist2(rgb, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

pub fn rgb_to_color16(rgb: Rgb) -> Color {
    const TABLE: [(Color, Rgb); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, c)| dist2(rgb, *c))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

/// Terminal colour for `rgb` in the given mode; `None` in mono, where the
/// presenter encodes intensity with glyphs instead.
pub fn quantize(mode: ColorMode, rgb: Rgb) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb {
            r: rgb.0,
            g: rgb.1,
            b: rgb.2,
        }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(rgb))),
        ColorMode::Color16 => Some(rgb_to_color16(rgb)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_uses_the_page_colours() {
        let t = theme(ColorScheme::Blood);
        let s = t.trail_style();
        assert_eq!(s.fresh, (91, 10, 10));
        assert_eq!(s.old, (42, 0, 0));
        assert_eq!(s.droplet, (59, 0, 0));
        assert_eq!(s.highlight, WHITE);
        assert_eq!(t.background, (244, 238, 226));
    }

    #[test]
    fn every_theme_contrasts_with_its_background() {
        for scheme in ColorScheme::ALL {
            let t = theme(scheme);
            for ink in [t.fresh, t.old, t.droplet] {
                assert!(dist2(t.background, ink) > 90 * 90, "{}", scheme.name());
            }
        }
    }

    #[test]
    fn ansi256_maps_extremes_and_greys() {
        assert_eq!(rgb_to_ansi256((0, 0, 0)), 16);
        assert_eq!(rgb_to_ansi256(WHITE), 231);
        assert_eq!(rgb_to_ansi256((255, 0, 0)), 196);
        assert_eq!(rgb_to_ansi256((128, 128, 128)), 244);
    }

    #[test]
    fn color16_picks_nearest() {
        assert_eq!(rgb_to_color16((91, 10, 10)), Color::DarkRed);
        assert_eq!(rgb_to_color16((250, 250, 250)), Color::White);
    }

    #[test]
    fn quantize_follows_mode() {
        assert_eq!(quantize(ColorMode::Mono, (1, 2, 3)), None);
        assert_eq!(
            quantize(ColorMode::TrueColor, (1, 2, 3)),
            Some(Color::Rgb { r: 1, g: 2, b: 3 })
        );
        assert_eq!(
            quantize(ColorMode::Color256, (0, 0, 0)),
            Some(Color::AnsiValue(16))
        );
    }
}
