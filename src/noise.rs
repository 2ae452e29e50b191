// Copyright (c) 2026 rezky_nightky

//! Deterministic one-dimensional value noise.
//!
//! Every integer lattice point gets a pseudo-random value from a fixed hash
//! (no seed, identical across runs and processes). Values between lattice
//! points are blended with the smoothstep polynomial `3t^2 - 2t^3`, so the
//! field is continuous and has zero slope at every integer.

#[inline]
fn fract(x: f64) -> f64 {
    x - x.floor()
}

#[inline]
fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Hash of a lattice point, in `[0, 1)`.
#[inline]
pub fn lattice(n: f64) -> f64 {
    fract(n.sin() * 10_000.0)
}

/// Smoothly interpolated noise in `[0, 1]`.
///
/// Non-finite inputs yield `0.0` instead of propagating NaN into geometry.
pub fn noise(x: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    let i = x.floor();
    let t = smoothstep(x - i);
    let a = lattice(i);
    let b = lattice(i + 1.0);
    (a * (1.0 - t) + b * t).clamp(0.0, 1.0)
}
