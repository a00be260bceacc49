// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns an escape result into a color.
//!
//! The raw iteration count is an integer, and coloring by it directly
//! gives visible bands.  Instead we use the usual continuous estimate
//! `n - log2(log2(|z|))`, push it through a slowly drifting sine to
//! pick a point between the two accent colors, and then darken the
//! result for points that escaped quickly, which reads as depth.

use image::Rgba;
use num::clamp;

use crate::config::Palette;
use crate::escape::Escape;

// How fast the gradient cycles against the smoothed count, and
// against the clock.
const PHASE_SCALE: f64 = 0.15;
const PHASE_SPEED: f64 = 0.5;
const PHASE_GAMMA: f64 = 1.2;

// depth = DEPTH_FLOOR + DEPTH_RANGE * (1 - exp(-smoothed * DEPTH_FALLOFF))
const DEPTH_FLOOR: f64 = 0.4;
const DEPTH_RANGE: f64 = 0.6;
const DEPTH_FALLOFF: f64 = 0.08;

/// Clamps to the channel range and truncates.  NaN becomes zero.
#[inline]
fn channel(v: f64) -> u8 {
    clamp(v, 0.0, 255.0) as u8
}

// A channel blended with itself comes back unchanged, whatever `t` is.
#[inline]
fn blend(a: u8, b: u8, t: f64) -> u8 {
    if a == b {
        return a;
    }
    channel((1.0 - t) * f64::from(a) + t * f64::from(b))
}

/// Linear interpolation between two colors, channel by channel.  `t`
/// is clamped to `[0, 1]`.
pub fn lerp(from: Rgba<u8>, to: Rgba<u8>, t: f64) -> Rgba<u8> {
    let t = clamp(t, 0.0, 1.0);
    Rgba([
        blend(from[0], to[0], t),
        blend(from[1], to[1], t),
        blend(from[2], to[2], t),
        blend(from[3], to[3], t),
    ])
}

/// The fractional escape count.  The inner logarithm is clamped at 1
/// before the outer one is taken, so orbits that escape with
/// `|z| < 2` all smooth to the raw count.
#[inline]
pub fn smooth_iterations(escape: &Escape<f64>) -> f64 {
    let dist = escape.z.norm();
    escape.iterations as f64 - dist.log2().max(1.0).log2()
}

/// Colors an escaped point from its smoothed count.  Total over all
/// inputs: absurd or non-finite counts still land in `[0, 255]`.
pub fn shade_smoothed(smoothed: f64, time: f64, palette: &Palette) -> Rgba<u8> {
    let phase = 0.5 + 0.5 * (smoothed * PHASE_SCALE + time * PHASE_SPEED).sin();
    let t = clamp(phase.powf(PHASE_GAMMA), 0.0, 1.0);
    let base = lerp(palette.cool, palette.warm, t);

    let depth = DEPTH_FLOOR + DEPTH_RANGE * (1.0 - (-smoothed * DEPTH_FALLOFF).exp());
    Rgba([
        channel(f64::from(base[0]) * depth),
        channel(f64::from(base[1]) * depth),
        channel(f64::from(base[2]) * depth),
        base[3],
    ])
}

/// Colors one sample.  Points that never escaped get the flat
/// background, whatever their final orbit or the time.
pub fn shade(escape: &Escape<f64>, max_iterations: usize, time: f64, palette: &Palette) -> Rgba<u8> {
    if !escape.escaped(max_iterations) {
        return palette.background;
    }
    shade_smoothed(smooth_iterations(escape), time, palette)
}
