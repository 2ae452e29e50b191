// Copyright (c) 2026 rezky_nightky

use std::str::FromStr;

/// Default logical size of one terminal cell when the terminal does not
/// report its pixel dimensions.
pub const DEFAULT_CELL: CellSize = CellSize { w: 8, h: 16 };

/// Drawing surface dimensions in logical units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_density: f64,
}

impl Viewport {
    /// Degenerate sizes are floored to 1; an unusable density falls back to 1.
    pub fn new(width: f64, height: f64, pixel_density: f64) -> Self {
        let floor1 = |v: f64| if v.is_finite() { v.floor().max(1.0) } else { 1.0 };
        let density = if pixel_density.is_finite() && pixel_density > 0.0 {
            pixel_density
        } else {
            1.0
        };
        Self {
            width: floor1(width),
            height: floor1(height),
            pixel_density: density,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }
}

/// Reports the current size of the trail's container.
pub trait ViewportBinder {
    fn viewport(&self) -> Viewport;
}

impl ViewportBinder for Viewport {
    fn viewport(&self) -> Viewport {
        *self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub w: u16,
    pub h: u16,
}

impl FromStr for CellSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| "expected: WIDTHxHEIGHT".to_string())?;
        let w: u16 = a
            .trim()
            .parse()
            .map_err(|_| "invalid cell width".to_string())?;
        let h: u16 = b
            .trim()
            .parse()
            .map_err(|_| "invalid cell height".to_string())?;
        if w == 0 || h < 2 {
            return Err("cell width must be >0 and height >=2".to_string());
        }
        Ok(Self { w, h })
    }
}

/// Maps a terminal grid onto the logical drawing space: each cell covers
/// `cell.w x cell.h` units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerminalViewport {
    pub cols: u16,
    pub lines: u16,
    pub cell: CellSize,
    pub pixel_density: f64,
}

impl TerminalViewport {
    pub fn new(cols: u16, lines: u16, cell: CellSize, pixel_density: f64) -> Self {
        Self {
            cols: cols.max(1),
            lines: lines.max(1),
            cell,
            pixel_density,
        }
    }

    /// Cell size from the terminal's reported window pixels, if it reports any.
    pub fn detect_cell(cols: u16, lines: u16, px_w: u16, px_h: u16) -> Option<CellSize> {
        if cols == 0 || lines == 0 || px_w == 0 || px_h == 0 {
            return None;
        }
        let w = px_w / cols;
        let h = px_h / lines;
        if w == 0 || h < 2 {
            return None;
        }
        Some(CellSize { w, h })
    }

    pub fn resize(&mut self, cols: u16, lines: u16) {
        self.cols = cols.max(1);
        self.lines = lines.max(1);
    }
}

impl ViewportBinder for TerminalViewport {
    fn viewport(&self) -> Viewport {
        Viewport::new(
            self.cols as f64 * self.cell.w as f64,
            self.lines as f64 * self.cell.h as f64,
            self.pixel_density,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_viewport_is_floored_to_one() {
        let v = Viewport::new(0.0, -3.0, 0.0);
        assert_eq!(v.width, 1.0);
        assert_eq!(v.height, 1.0);
        assert_eq!(v.pixel_density, 1.0);
        let v = Viewport::new(f64::NAN, 10.7, 2.0);
        assert_eq!(v.width, 1.0);
        assert_eq!(v.height, 10.0);
    }

    #[test]
    fn cell_size_parses() {
        assert_eq!("8x16".parse::<CellSize>().unwrap(), CellSize { w: 8, h: 16 });
        assert_eq!(" 9 X 18 ".parse::<CellSize>().unwrap(), CellSize { w: 9, h: 18 });
        assert!("8".parse::<CellSize>().is_err());
        assert!("0x16".parse::<CellSize>().is_err());
        assert!("8x1".parse::<CellSize>().is_err());
    }

    #[test]
    fn terminal_viewport_scales_cells() {
        let tv = TerminalViewport::new(80, 24, DEFAULT_CELL, 1.0);
        let v = tv.viewport();
        assert_eq!(v.width, 640.0);
        assert_eq!(v.height, 384.0);
        assert_eq!(v.center_x(), 320.0);
    }

    #[test]
    fn zero_sized_terminal_still_has_a_viewport() {
        let mut tv = TerminalViewport::new(0, 0, DEFAULT_CELL, 0.1);
        assert_eq!(tv.cols, 1);
        assert_eq!(tv.lines, 1);
        tv.resize(0, 3);
        assert_eq!(tv.viewport().width, 8.0);
        assert_eq!(tv.viewport().height, 48.0);
    }

    #[test]
    fn cell_detection_needs_pixel_sizes() {
        assert_eq!(TerminalViewport::detect_cell(80, 24, 0, 0), None);
        assert_eq!(
            TerminalViewport::detect_cell(80, 24, 800, 480),
            Some(CellSize { w: 10, h: 20 })
        );
    }
}
