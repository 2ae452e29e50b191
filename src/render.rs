// Copyright (c) 2026 rezky_nightky

//! Trail drawing: path, droplets and head marker, back to front.
//!
//! Nothing here keeps state between frames. Geometry is re-derived from the
//! high-water mark and the noise field on every call, so identical inputs
//! always produce identical pixels.

use agg_rust::conv_curve::ConvCurve;
use agg_rust::conv_stroke::ConvStroke;
use agg_rust::conv_transform::ConvTransform;
use agg_rust::ellipse::Ellipse;
use agg_rust::math_stroke::{LineCap, LineJoin};
use agg_rust::path_storage::PathStorage;
use agg_rust::trans_affine::TransAffine;

use crate::animator::AnimationState;
use crate::noise::noise;
use crate::paint::{rgba, GradientStop, Paint};
use crate::surface::{Shadow, Surface};
use crate::viewport::Viewport;

const TRAIL_START_Y: f64 = 10.0;
const TRAIL_STEP: f64 = 8.0;
const JITTER_FREQ: f64 = 0.08;
const JITTER_AMPLITUDE: f64 = 6.0;
const BASE_WIDTH: f64 = 3.2;
const MAX_WIDTH: f64 = 6.0;
const WIDTH_FREQ: f64 = 0.06;
const TRAIL_ALPHA: f64 = 0.95;
const TRAIL_SHADOW_BLUR: f64 = 12.0;

const DROPLET_SLOTS: usize = 10;
const DROPLET_MIN_Y: f64 = 40.0;
const DROPLET_THRESHOLD: f64 = 0.83;
const DROPLET_ALPHA: f64 = 0.65;

const HEAD_RADIUS: f64 = 6.5;
const HEAD_SHADOW_BLUR: f64 = 16.0;
const HIGHLIGHT_ALPHA: f64 = 0.35;

/// Colours used by the renderer, as RGB triples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrailStyle {
    pub fresh: (u8, u8, u8),
    pub old: (u8, u8, u8),
    pub droplet: (u8, u8, u8),
    pub highlight: (u8, u8, u8),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Droplet {
    pub x: f64,
    pub y: f64,
    pub rx: f64,
    pub ry: f64,
}

/// Per-frame trail shape derived from the high-water mark.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailGeometry {
    pub points: Vec<Point>,
    pub thickness: f64,
    pub droplets: Vec<Droplet>,
}

impl TrailGeometry {
    pub fn compute(high_water: f64, center_x: f64) -> Self {
        let mut points = Vec::new();
        let mut i = 0u32;
        loop {
            let y = TRAIL_START_Y + i as f64 * TRAIL_STEP;
            if y > high_water {
                break;
            }
            let jitter = (noise(y * JITTER_FREQ) - 0.5) * JITTER_AMPLITUDE;
            points.push(Point::new(center_x + jitter, y));
            i += 1;
        }

        let thickness = BASE_WIDTH + noise(high_water * WIDTH_FREQ) * (MAX_WIDTH - BASE_WIDTH);

        let droplets = (0..DROPLET_SLOTS)
            .filter_map(|slot| {
                let y = high_water * (slot as f64 / DROPLET_SLOTS as f64);
                if y < DROPLET_MIN_Y || noise(y * 0.13) <= DROPLET_THRESHOLD {
                    return None;
                }
                let dx = (noise(y * 0.2) - 0.5) * 10.0;
                let r = 1.2 + noise(y * 0.3) * 2.0;
                Some(Droplet {
                    x: center_x + dx,
                    y,
                    rx: r,
                    ry: r * 1.3,
                })
            })
            .collect();

        Self {
            points,
            thickness,
            droplets,
        }
    }
}

/// Closed outline of the head drop centred at `(cx, cy)`: a rounded top
/// tapering into a bulb below the centre.
pub fn head_outline(cx: f64, cy: f64, r: f64) -> PathStorage {
    let mut p = PathStorage::new();
    p.move_to(cx, cy - r);
    p.curve3(cx + r * 0.9, cy - r * 0.2, cx + r * 0.7, cy + r * 0.6);
    p.curve3(cx, cy + r * 1.7, cx - r * 0.7, cy + r * 0.6);
    p.curve3(cx - r * 0.9, cy - r * 0.2, cx, cy - r);
    p.close_polygon(0);
    p
}

#[derive(Clone, Debug)]
pub struct TrailRenderer {
    style: TrailStyle,
}

impl TrailRenderer {
    pub fn new(style: TrailStyle) -> Self {
        Self { style }
    }

    pub fn set_style(&mut self, style: TrailStyle) {
        self.style = style;
    }

    /// Clears the surface and redraws everything for `state`.
    pub fn render(&self, state: &AnimationState, viewport: &Viewport, surface: &mut Surface) {
        surface.clear();
        let geometry = TrailGeometry::compute(state.high_water, viewport.center_x());
        self.draw_path(&geometry, state.high_water, surface);
        self.draw_droplets(&geometry, surface);
        self.draw_head(viewport.center_x(), state.current, surface);
    }

    fn draw_path(&self, geometry: &TrailGeometry, high_water: f64, surface: &mut Surface) {
        // A lone point strokes to nothing, caps included.
        if geometry.points.len() < 2 {
            return;
        }
        let mut line = PathStorage::new();
        for (i, p) in geometry.points.iter().enumerate() {
            if i == 0 {
                line.move_to(p.x, p.y);
            } else {
                line.line_to(p.x, p.y);
            }
        }
        let mut stroke = ConvStroke::new(&mut line);
        stroke.set_width(geometry.thickness);
        stroke.set_line_cap(LineCap::Round);
        stroke.set_line_join(LineJoin::Round);
        stroke.set_approximation_scale(surface.density());

        let fresh = self.style.fresh;
        let paint = Paint::Linear {
            x0: 0.0,
            y0: 0.0,
            x1: 0.0,
            y1: high_water,
            stops: vec![
                GradientStop::new(0.0, rgba(fresh, 0.0)),
                GradientStop::new(0.18, rgba(fresh, 0.92)),
                GradientStop::new(1.0, rgba(self.style.old, 0.96)),
            ],
        };
        let shadow = Shadow {
            color: rgba(fresh, 0.22),
            blur: TRAIL_SHADOW_BLUR,
        };
        surface.fill(stroke, &paint.faded(TRAIL_ALPHA), Some(shadow));
    }

    fn draw_droplets(&self, geometry: &TrailGeometry, surface: &mut Surface) {
        let paint = Paint::Solid(rgba(self.style.droplet, 0.85)).faded(DROPLET_ALPHA);
        for d in &geometry.droplets {
            let mut blot = Ellipse::new(d.x, d.y, d.rx, d.ry, 0, false);
            blot.set_approximation_scale(surface.density());
            surface.fill(blot, &paint, None);
        }
    }

    fn draw_head(&self, cx: f64, cy: f64, surface: &mut Surface) {
        let r = HEAD_RADIUS;
        let mut outline = head_outline(cx, cy, r);
        let mut curve = ConvCurve::new(&mut outline);
        curve.set_approximation_scale(surface.density());
        let paint = Paint::Radial {
            fx: cx,
            fy: cy - 2.0,
            fr: 2.0,
            cx,
            cy,
            r: r * 1.8,
            stops: vec![
                GradientStop::new(0.0, rgba(self.style.fresh, 0.98)),
                GradientStop::new(1.0, rgba(self.style.old, 0.96)),
            ],
        };
        let shadow = Shadow {
            color: rgba(self.style.fresh, 0.25),
            blur: HEAD_SHADOW_BLUR,
        };
        surface.fill(curve, &paint, Some(shadow));

        let mut spot = Ellipse::new(0.0, 0.0, 1.2, 2.0, 0, false);
        spot.set_approximation_scale(surface.density());
        let mut place = TransAffine::new_rotation(0.3);
        place.multiply(&TransAffine::new_translation(cx - 1.5, cy - 2.5));
        let paint = Paint::Solid(rgba(self.style.highlight, 0.25)).faded(HIGHLIGHT_ALPHA);
        surface.fill(ConvTransform::new(spot, place), &paint, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_rust::bounding_rect::bounding_rect_single;

    const STYLE: TrailStyle = TrailStyle {
        fresh: (91, 10, 10),
        old: (42, 0, 0),
        droplet: (59, 0, 0),
        highlight: (255, 255, 255),
    };

    fn state(current: f64, high_water: f64) -> AnimationState {
        AnimationState {
            current,
            target: current,
            high_water,
            running: false,
        }
    }

    #[test]
    fn geometry_samples_every_eight_units_from_ten() {
        let g = TrailGeometry::compute(100.0, 50.0);
        let ys: Vec<f64> = g.points.iter().map(|p| p.y).collect();
        assert_eq!(ys.first(), Some(&10.0));
        assert_eq!(ys.last(), Some(&98.0));
        assert_eq!(ys.len(), 12);
        for p in &g.points {
            assert!((p.x - 50.0).abs() <= JITTER_AMPLITUDE / 2.0);
        }
    }

    #[test]
    fn short_trail_has_no_points() {
        let g = TrailGeometry::compute(9.0, 50.0);
        assert!(g.points.is_empty());
        assert!(g.droplets.is_empty());
    }

    #[test]
    fn thickness_stays_between_base_and_max() {
        for hw in [0.0, 17.0, 123.4, 480.0, 5000.0] {
            let t = TrailGeometry::compute(hw, 0.0).thickness;
            assert!((BASE_WIDTH..=MAX_WIDTH).contains(&t));
        }
    }

    #[test]
    fn droplets_are_sparse_and_deterministic() {
        let mut seen = 0;
        for hw in (0..400).map(|k| 40.0 + k as f64 * 7.3) {
            let a = TrailGeometry::compute(hw, 100.0);
            let b = TrailGeometry::compute(hw, 100.0);
            assert_eq!(a, b);
            assert!(a.droplets.len() <= DROPLET_SLOTS);
            for d in &a.droplets {
                assert!(d.y >= DROPLET_MIN_Y && d.y <= hw);
                assert!((d.x - 100.0).abs() <= 5.0);
                assert!(d.rx >= 1.2 && d.rx <= 3.2);
                assert!((d.ry - d.rx * 1.3).abs() < 1e-9);
            }
            seen += a.droplets.len();
        }
        assert!(seen < 400 * DROPLET_SLOTS / 2);
    }

    #[test]
    fn head_outline_spans_expected_extent() {
        let mut outline = head_outline(0.0, 0.0, 10.0);
        let mut curve = ConvCurve::new(&mut outline);
        let Some(bounds) = bounding_rect_single(&mut curve, 0) else {
            panic!("empty outline");
        };
        assert!((bounds.y1 + 10.0).abs() < 1e-9);
        assert!(bounds.y2 > 10.0 && bounds.y2 < 17.0);
        assert!(bounds.x1 < -5.0 && bounds.x2 > 5.0);
    }

    #[test]
    fn render_draws_head_at_current_and_trail_to_high_water() {
        let vp = Viewport::new(100.0, 300.0, 1.0);
        let mut surface = Surface::new(&vp);
        let renderer = TrailRenderer::new(STYLE);
        renderer.render(&state(150.0, 200.0), &vp, &mut surface);

        assert!(surface.pixel(50, 150).a > 230);
        let geometry = TrailGeometry::compute(200.0, vp.center_x());
        let on_trail = geometry.points.iter().find(|p| p.y == 122.0).unwrap();
        assert!(surface.pixel(on_trail.x as usize, 122).a > 128);
        assert_eq!(surface.pixel(50, 290).a, 0);
        assert_eq!(surface.pixel(2, 150).a, 0);
    }

    #[test]
    fn head_is_lit_from_straight_above() {
        let vp = Viewport::new(100.0, 300.0, 1.0);
        let mut surface = Surface::new(&vp);
        let renderer = TrailRenderer::new(STYLE);
        renderer.render(&state(150.0, 150.0), &vp, &mut surface);
        let left = surface.pixel(48, 152);
        let right = surface.pixel(51, 152);
        assert!(left.r.abs_diff(right.r) <= 3, "{:?} vs {:?}", left, right);
    }

    #[test]
    fn render_clears_previous_frame() {
        let vp = Viewport::new(100.0, 300.0, 1.0);
        let mut surface = Surface::new(&vp);
        let renderer = TrailRenderer::new(STYLE);
        renderer.render(&state(250.0, 260.0), &vp, &mut surface);
        assert!(surface.pixel(50, 250).a > 128);
        renderer.render(&state(30.0, 30.0), &vp, &mut surface);
        assert_eq!(surface.pixel(50, 250).a, 0);
    }

    #[test]
    fn render_is_deterministic() {
        let vp = Viewport::new(60.0, 200.0, 1.0);
        let renderer = TrailRenderer::new(STYLE);
        let mut a = Surface::new(&vp);
        let mut b = Surface::new(&vp);
        renderer.render(&state(120.0, 180.0), &vp, &mut a);
        renderer.render(&state(120.0, 180.0), &vp, &mut b);
        for y in 0..a.height() {
            for x in 0..a.width() {
                assert_eq!(a.pixel(x, y), b.pixel(x, y));
            }
        }
    }
}
