// Copyright (c) 2026 rezky_nightky

//! RGBA raster the trail is drawn onto, backed by agg's scanline renderer.
//!
//! Shapes arrive as agg vertex sources in logical viewport units and are
//! scaled by `density` on their way into the rasterizer. The buffer starts
//! transparent and every blend is source-over, so pixels stay
//! premultiplied. Shadows are rendered into a scratch buffer of the same
//! size, recoloured, blurred and composited underneath the shape.

use agg_rust::basics::VertexSource;
use agg_rust::blur::recursive_blur_rgba32;
use agg_rust::color::Rgba8;
use agg_rust::conv_transform::ConvTransform;
use agg_rust::pixfmt_rgba::PixfmtRgba32;
use agg_rust::rasterizer_scanline_aa::RasterizerScanlineAa;
use agg_rust::renderer_base::RendererBase;
use agg_rust::renderer_scanline::{render_scanlines_aa, render_scanlines_aa_solid};
use agg_rust::rendering_buffer::RowAccessor;
use agg_rust::scanline_u::ScanlineU8;
use agg_rust::span_allocator::SpanAllocator;
use agg_rust::span_gradient::{GradientRadialFocus, GradientX, SpanGradient};
use agg_rust::span_interpolator_linear::SpanInterpolatorLinear;
use agg_rust::trans_affine::TransAffine;

use crate::paint::Paint;
use crate::viewport::Viewport;

const BPP: usize = 4;

/// Canvas-style drop shadow drawn under a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Rgba8,
    /// Blur size in logical units; the Gaussian's sigma is half of it.
    pub blur: f64,
}

/// Attaches an agg row accessor to `buf`: `h` rows of `w` pixels, `stride`
/// bytes apart.
fn rows(buf: &mut [u8], w: u32, h: u32, stride: usize) -> RowAccessor {
    assert!(h == 0 || (h as usize - 1) * stride + w as usize * BPP <= buf.len());
    let mut ra = RowAccessor::new();
    // SAFETY: the assert keeps every row inside `buf`, and callers drop the
    // accessor before touching `buf` again.
    unsafe { ra.attach(buf.as_mut_ptr(), w, h, stride as i32) };
    ra
}

/// Sweeps `ras` into `ra` with `paint`.
fn render(ras: &mut RasterizerScanlineAa, ra: &mut RowAccessor, paint: &Paint, density: f64) {
    let mut rb = RendererBase::new(PixfmtRgba32::new(ra));
    let mut sl = ScanlineU8::new();
    if let Paint::Solid(c) = paint {
        render_scanlines_aa_solid(ras, &mut sl, &mut rb, c);
        return;
    }
    let Some(lut) = paint.lut() else {
        return;
    };
    let interpolator = SpanInterpolatorLinear::new(paint.pixel_to_gradient(density));
    let mut alloc = SpanAllocator::<Rgba8>::new();
    match *paint {
        Paint::Linear { x0, y0, x1, y1, .. } => {
            let len = (x1 - x0).hypot(y1 - y0);
            if !(len > f64::EPSILON) {
                return;
            }
            let mut sg = SpanGradient::new(interpolator, GradientX, &lut, 0.0, len);
            render_scanlines_aa(ras, &mut sl, &mut rb, &mut alloc, &mut sg);
        }
        Paint::Radial {
            fx, fy, fr, cx, cy, r, ..
        } => {
            if !(r > 0.0) {
                return;
            }
            let focus = GradientRadialFocus::new(r, fx - cx, fy - cy);
            let mut sg = SpanGradient::new(interpolator, focus, &lut, fr.clamp(0.0, r), r);
            render_scanlines_aa(ras, &mut sl, &mut rb, &mut alloc, &mut sg);
        }
        Paint::Solid(_) => {}
    }
}

pub struct Surface {
    width: u32,
    height: u32,
    density: f64,
    buf: Vec<u8>,
    /// Shadow layer; all zero between draws.
    scratch: Vec<u8>,
}

impl Surface {
    pub fn new(viewport: &Viewport) -> Self {
        let mut s = Self {
            width: 0,
            height: 0,
            density: 1.0,
            buf: Vec::new(),
            scratch: Vec::new(),
        };
        s.resize(viewport);
        s
    }

    /// Reallocates for a new viewport. Contents are cleared.
    pub fn resize(&mut self, viewport: &Viewport) {
        let d = viewport.pixel_density;
        self.density = d;
        self.width = ((viewport.width * d).ceil() as u32).max(1);
        self.height = ((viewport.height * d).ceil() as u32).max(1);
        let len = self.width as usize * self.height as usize * BPP;
        self.buf.clear();
        self.buf.resize(len, 0);
        self.scratch.clear();
        self.scratch.resize(len, 0);
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    fn stride(&self) -> usize {
        self.width as usize * BPP
    }

    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// Premultiplied pixel at `(x, y)`; transparent outside the raster.
    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba8 {
        if x >= self.width() || y >= self.height() {
            return Rgba8::new(0, 0, 0, 0);
        }
        let i = y * self.stride() + x * BPP;
        let p = &self.buf[i..i + BPP];
        Rgba8::new(p[0] as u32, p[1] as u32, p[2] as u32, p[3] as u32)
    }

    /// Mean premultiplied colour of the pixels in `[x0, x1) x [y0, y1)`,
    /// channels in `[0, 1]`.
    pub fn average(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> [f32; 4] {
        let x1 = x1.min(self.width());
        let y1 = y1.min(self.height());
        if x0 >= x1 || y0 >= y1 {
            return [0.0; 4];
        }
        let mut sum = [0u32; 4];
        for y in y0..y1 {
            let row = &self.buf[y * self.stride() + x0 * BPP..y * self.stride() + x1 * BPP];
            for p in row.chunks_exact(BPP) {
                for (s, v) in sum.iter_mut().zip(p) {
                    *s += *v as u32;
                }
            }
        }
        let n = ((x1 - x0) * (y1 - y0)) as f32 * 255.0;
        sum.map(|v| v as f32 / n)
    }

    /// Fills `shape` (logical units, non-zero winding) with `paint`,
    /// optionally over a blurred shadow.
    pub fn fill<VS: VertexSource>(&mut self, shape: VS, paint: &Paint, shadow: Option<Shadow>) {
        let mut ras = RasterizerScanlineAa::new();
        let mut scaled = ConvTransform::new(shape, TransAffine::new_scaling_uniform(self.density));
        ras.add_path(&mut scaled, 0);
        if !ras.rewind_scanlines() {
            return;
        }
        if let Some(shadow) = shadow.filter(|s| s.color.a > 0) {
            self.drop_shadow(&mut ras, paint, shadow);
        }
        let (w, h, stride, density) = (self.width, self.height, self.stride(), self.density);
        let mut ra = rows(&mut self.buf, w, h, stride);
        render(&mut ras, &mut ra, paint, density);
    }

    fn drop_shadow(&mut self, ras: &mut RasterizerScanlineAa, paint: &Paint, shadow: Shadow) {
        let (w, h, stride, density) = (self.width, self.height, self.stride(), self.density);
        {
            let mut ra = rows(&mut self.scratch, w, h, stride);
            render(ras, &mut ra, paint, density);
        }

        let radius = shadow.blur.max(0.0) * density;
        let margin = (radius * 1.5).ceil() as i32 + 1;
        let x0 = (ras.min_x() - margin).max(0) as usize;
        let y0 = (ras.min_y() - margin).max(0) as usize;
        let x1 = (ras.max_x() + margin).min(w as i32 - 1);
        let y1 = (ras.max_y() + margin).min(h as i32 - 1);
        if x1 < x0 as i32 || y1 < y0 as i32 {
            return;
        }
        let (x1, y1) = (x1 as usize, y1 as usize);
        let c = shadow.color;

        for y in y0..=y1 {
            let row = &mut self.scratch[y * stride + x0 * BPP..y * stride + (x1 + 1) * BPP];
            for p in row.chunks_exact_mut(BPP) {
                let a = Rgba8::multiply(p[3], c.a);
                p.copy_from_slice(&[
                    Rgba8::multiply(c.r, a),
                    Rgba8::multiply(c.g, a),
                    Rgba8::multiply(c.b, a),
                    a,
                ]);
            }
        }

        let off = y0 * stride + x0 * BPP;
        {
            let mut region = rows(
                &mut self.scratch[off..],
                (x1 - x0 + 1) as u32,
                (y1 - y0 + 1) as u32,
                stride,
            );
            recursive_blur_rgba32(&mut region, radius);
        }

        for y in y0..=y1 {
            let span = y * stride + x0 * BPP..y * stride + (x1 + 1) * BPP;
            let src = &mut self.scratch[span.clone()];
            let dst = &mut self.buf[span];
            for (s, d) in src.chunks_exact_mut(BPP).zip(dst.chunks_exact_mut(BPP)) {
                if s[3] > 0 {
                    let inv = 255 - s[3];
                    for (dc, sc) in d.iter_mut().zip(s.iter()) {
                        *dc = sc.saturating_add(Rgba8::multiply(*dc, inv));
                    }
                }
                s.fill(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_rust::ellipse::Ellipse;
    use agg_rust::path_storage::PathStorage;

    use crate::paint::{rgba, GradientStop};

    fn surface(w: f64, h: f64) -> Surface {
        Surface::new(&Viewport::new(w, h, 1.0))
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> PathStorage {
        let mut p = PathStorage::new();
        p.move_to(x0, y0);
        p.line_to(x1, y0);
        p.line_to(x1, y1);
        p.line_to(x0, y1);
        p.close_polygon(0);
        p
    }

    fn white(a: f64) -> Paint {
        Paint::Solid(rgba((255, 255, 255), a))
    }

    #[test]
    fn degenerate_viewport_still_allocates() {
        let s = Surface::new(&Viewport::new(0.0, 0.0, 0.3));
        assert!(s.width() >= 1 && s.height() >= 1);
    }

    #[test]
    fn density_scales_the_raster_and_the_shapes() {
        let mut s = Surface::new(&Viewport::new(10.0, 20.0, 2.0));
        assert_eq!((s.width(), s.height()), (20, 40));
        assert_eq!(s.density(), 2.0);
        s.fill(rect(0.0, 0.0, 5.0, 5.0), &white(1.0), None);
        assert_eq!(s.pixel(9, 9).a, 255);
        assert_eq!(s.pixel(11, 11).a, 0);
    }

    #[test]
    fn fill_is_solid_inside_and_empty_outside() {
        let mut s = surface(20.0, 20.0);
        s.fill(rect(4.0, 4.0, 12.0, 12.0), &white(1.0), None);
        assert_eq!(s.pixel(8, 8), Rgba8::new(255, 255, 255, 255));
        assert_eq!(s.pixel(2, 2).a, 0);
        assert_eq!(s.pixel(13, 8).a, 0);
    }

    #[test]
    fn edge_pixels_are_anti_aliased() {
        let mut s = surface(20.0, 20.0);
        s.fill(rect(0.0, 0.0, 5.5, 10.0), &white(1.0), None);
        let edge = s.pixel(5, 5).a;
        assert!((100..=155).contains(&edge), "edge alpha = {}", edge);
    }

    #[test]
    fn blending_is_source_over() {
        let mut s = surface(4.0, 4.0);
        s.fill(rect(0.0, 0.0, 4.0, 4.0), &white(0.5), None);
        let once = s.pixel(1, 1).a;
        assert!((126..=130).contains(&once), "a = {}", once);
        s.fill(rect(0.0, 0.0, 4.0, 4.0), &white(0.5), None);
        let twice = s.pixel(1, 1).a;
        assert!((189..=193).contains(&twice), "a = {}", twice);
        s.clear();
        assert_eq!(s.pixel(1, 1), Rgba8::new(0, 0, 0, 0));
    }

    #[test]
    fn ellipse_respects_its_radii() {
        let mut s = surface(40.0, 40.0);
        s.fill(Ellipse::new(20.0, 20.0, 3.0, 8.0, 0, false), &white(1.0), None);
        assert_eq!(s.pixel(20, 20).a, 255);
        assert!(s.pixel(20, 26).a > 200);
        assert_eq!(s.pixel(26, 20).a, 0);
    }

    #[test]
    fn linear_gradient_follows_its_axis() {
        let mut s = surface(10.0, 100.0);
        let paint = Paint::Linear {
            x0: 0.0,
            y0: 0.0,
            x1: 0.0,
            y1: 100.0,
            stops: vec![
                GradientStop::new(0.0, rgba((255, 0, 0), 0.0)),
                GradientStop::new(1.0, rgba((255, 0, 0), 1.0)),
            ],
        };
        s.fill(rect(0.0, 0.0, 10.0, 100.0), &paint, None);
        let top = s.pixel(5, 2).a;
        let middle = s.pixel(5, 50).a;
        let bottom = s.pixel(5, 97).a;
        assert!(top < 20, "top = {}", top);
        assert!((100..=155).contains(&middle), "middle = {}", middle);
        assert!(bottom > 230, "bottom = {}", bottom);
        assert_eq!(s.pixel(1, 50).a, middle);
    }

    #[test]
    fn radial_gradient_grows_away_from_the_focus() {
        let mut s = surface(40.0, 40.0);
        let paint = Paint::Radial {
            fx: 20.0,
            fy: 18.0,
            fr: 0.0,
            cx: 20.0,
            cy: 20.0,
            r: 12.0,
            stops: vec![
                GradientStop::new(0.0, rgba((255, 255, 255), 1.0)),
                GradientStop::new(1.0, rgba((0, 0, 0), 1.0)),
            ],
        };
        s.fill(rect(0.0, 0.0, 40.0, 40.0), &paint, None);
        let near = s.pixel(20, 18).r;
        let mid = s.pixel(20, 25).r;
        let far = s.pixel(20, 35).r;
        assert!(near > 200, "near = {}", near);
        assert!(mid < near && far < mid, "{} {} {}", near, mid, far);
        assert_eq!(s.pixel(39, 39).a, 255);
    }

    #[test]
    fn shadow_spreads_outside_the_shape() {
        let mut s = surface(40.0, 40.0);
        let shadow = Shadow {
            color: rgba((0, 0, 0), 0.5),
            blur: 8.0,
        };
        s.fill(Ellipse::new(20.0, 20.0, 4.0, 4.0, 0, false), &white(1.0), Some(shadow));
        assert!(s.pixel(20, 27).a > 0);
        assert_eq!(s.pixel(20, 20), Rgba8::new(255, 255, 255, 255));
        assert!(s.scratch.iter().all(|&b| b == 0));
    }

    #[test]
    fn transparent_shadow_is_skipped() {
        let mut s = surface(40.0, 40.0);
        let shadow = Shadow {
            color: rgba((0, 0, 0), 0.0),
            blur: 8.0,
        };
        s.fill(Ellipse::new(20.0, 20.0, 4.0, 4.0, 0, false), &white(1.0), Some(shadow));
        assert_eq!(s.pixel(20, 27).a, 0);
    }

    #[test]
    fn shapes_off_the_raster_are_clipped() {
        let mut s = surface(10.0, 10.0);
        let shadow = Shadow {
            color: rgba((0, 0, 0), 0.5),
            blur: 4.0,
        };
        s.fill(rect(-20.0, -20.0, 5.0, 5.0), &white(1.0), Some(shadow));
        s.fill(rect(50.0, 50.0, 60.0, 60.0), &white(1.0), Some(shadow));
        assert_eq!(s.pixel(2, 2).a, 255);
        assert_eq!(s.pixel(9, 9).a, 0);
    }

    #[test]
    fn average_reports_mean_premultiplied_colour() {
        let mut s = surface(4.0, 2.0);
        s.fill(rect(0.0, 0.0, 2.0, 2.0), &white(1.0), None);
        let avg = s.average(0, 0, 4, 2);
        assert!((avg[3] - 0.5).abs() < 1e-6);
        assert!((avg[0] - 0.5).abs() < 1e-6);
        assert_eq!(s.average(3, 0, 3, 2), [0.0; 4]);
    }
}
