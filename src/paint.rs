// Copyright (c) 2026 rezky_nightky

use agg_rust::color::Rgba8;
use agg_rust::gradient_lut::GradientLut;
use agg_rust::trans_affine::TransAffine;

use crate::palette::Rgb;

/// `rgb` with a straight alpha in `[0, 1]`.
pub fn rgba(rgb: Rgb, alpha: f64) -> Rgba8 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
    Rgba8::new(rgb.0 as u32, rgb.1 as u32, rgb.2 as u32, a)
}

fn fade(c: Rgba8, k: f64) -> Rgba8 {
    let a = (c.a as f64 * k.clamp(0.0, 1.0)).round() as u32;
    Rgba8::new(c.r as u32, c.g as u32, c.b as u32, a)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba8,
}

impl GradientStop {
    pub fn new(offset: f64, color: Rgba8) -> Self {
        Self { offset, color }
    }
}

/// How a shape is coloured. Coordinates are logical viewport units.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba8),
    /// Gradient along the line `(x0, y0) -> (x1, y1)`, padded past both ends.
    Linear {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        stops: Vec<GradientStop>,
    },
    /// Gradient from the focal circle `(fx, fy, fr)` out to the circle
    /// `(cx, cy, r)`.
    Radial {
        fx: f64,
        fy: f64,
        fr: f64,
        cx: f64,
        cy: f64,
        r: f64,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// The same paint drawn at `k` opacity.
    pub fn faded(&self, k: f64) -> Paint {
        let fade_stops = |stops: &[GradientStop]| -> Vec<GradientStop> {
            stops
                .iter()
                .map(|s| GradientStop::new(s.offset, fade(s.color, k)))
                .collect()
        };
        match self {
            Paint::Solid(c) => Paint::Solid(fade(*c, k)),
            Paint::Linear {
                x0,
                y0,
                x1,
                y1,
                stops,
            } => Paint::Linear {
                x0: *x0,
                y0: *y0,
                x1: *x1,
                y1: *y1,
                stops: fade_stops(stops.as_slice()),
            },
            Paint::Radial {
                fx,
                fy,
                fr,
                cx,
                cy,
                r,
                stops,
            } => Paint::Radial {
                fx: *fx,
                fy: *fy,
                fr: *fr,
                cx: *cx,
                cy: *cy,
                r: *r,
                stops: fade_stops(stops.as_slice()),
            },
        }
    }

    /// Colour lookup table for a gradient paint. A single stop is a flat ramp.
    pub fn lut(&self) -> Option<GradientLut> {
        let stops = match self {
            Paint::Solid(_) => return None,
            Paint::Linear { stops, .. } | Paint::Radial { stops, .. } => stops,
        };
        let first = stops.first()?;
        let mut lut = GradientLut::new_default();
        if stops.len() == 1 {
            lut.add_color(0.0, first.color);
            lut.add_color(1.0, first.color);
        }
        for s in stops {
            lut.add_color(s.offset.clamp(0.0, 1.0), s.color);
        }
        lut.build_lut();
        Some(lut)
    }

    /// Raster pixel space to gradient space, where the gradient runs along
    /// +x from the origin (linear) or is centred on the origin (radial).
    pub fn pixel_to_gradient(&self, density: f64) -> TransAffine {
        let mut m = match *self {
            Paint::Solid(_) => TransAffine::new(),
            Paint::Linear { x0, y0, x1, y1, .. } => {
                let mut m = TransAffine::new_rotation((y1 - y0).atan2(x1 - x0));
                m.multiply(&TransAffine::new_translation(x0, y0));
                m
            }
            Paint::Radial { cx, cy, .. } => TransAffine::new_translation(cx, cy),
        };
        m.multiply(&TransAffine::new_scaling_uniform(density));
        m.invert();
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_rust::gradient_lut::ColorFunction;

    fn two_stop() -> Vec<GradientStop> {
        vec![
            GradientStop::new(0.0, rgba((255, 0, 0), 0.0)),
            GradientStop::new(1.0, rgba((255, 0, 0), 1.0)),
        ]
    }

    #[test]
    fn rgba_rounds_alpha_to_bytes() {
        assert_eq!(rgba((1, 2, 3), 0.5), Rgba8::new(1, 2, 3, 128));
        assert_eq!(rgba((1, 2, 3), 7.0).a, 255);
        assert_eq!(rgba((1, 2, 3), -1.0).a, 0);
    }

    #[test]
    fn faded_scales_every_alpha() {
        let p = Paint::Linear {
            x0: 0.0,
            y0: 0.0,
            x1: 0.0,
            y1: 10.0,
            stops: two_stop(),
        }
        .faded(0.5);
        let Paint::Linear { stops, .. } = p else {
            panic!("kind changed");
        };
        assert_eq!(stops[0].color.a, 0);
        assert_eq!(stops[1].color.a, 128);
        assert_eq!(stops[1].color.r, 255);
        assert_eq!(Paint::Solid(rgba((9, 9, 9), 1.0)).faded(0.0), Paint::Solid(rgba((9, 9, 9), 0.0)));
    }

    #[test]
    fn lut_runs_from_first_to_last_stop() {
        let p = Paint::Radial {
            fx: 0.0,
            fy: 0.0,
            fr: 0.0,
            cx: 0.0,
            cy: 0.0,
            r: 10.0,
            stops: two_stop(),
        };
        let lut = p.lut().unwrap();
        assert_eq!(lut.get(0).a, 0);
        assert!(lut.get(lut.size() - 1).a > 250);
        assert!(Paint::Solid(rgba((0, 0, 0), 1.0)).lut().is_none());
    }

    #[test]
    fn linear_gradient_space_follows_the_axis() {
        let p = Paint::Linear {
            x0: 10.0,
            y0: 20.0,
            x1: 10.0,
            y1: 120.0,
            stops: two_stop(),
        };
        let m = p.pixel_to_gradient(2.0);
        let (mut x, mut y) = (20.0, 140.0);
        m.transform(&mut x, &mut y);
        assert!((x - 50.0).abs() < 1e-9, "x = {}", x);
        assert!(y.abs() < 1e-9, "y = {}", y);
    }

    #[test]
    fn radial_gradient_space_is_centred() {
        let p = Paint::Radial {
            fx: 5.0,
            fy: 3.0,
            fr: 2.0,
            cx: 5.0,
            cy: 5.0,
            r: 9.0,
            stops: two_stop(),
        };
        let m = p.pixel_to_gradient(1.0);
        let (mut x, mut y) = (5.0, 5.0);
        m.transform(&mut x, &mut y);
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
    }
}
