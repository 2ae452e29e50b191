// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

/// One terminal cell. `None` colours mean the terminal default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Cell {
    pub const fn blank(bg: Option<Color>) -> Self {
        Self { ch: ' ', fg: None, bg }
    }
}
