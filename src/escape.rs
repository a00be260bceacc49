// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time loop.  Given a seed and the Julia constant, square
//! and add until the orbit leaves the escape radius or we run out of
//! iterations.

use num::Float;

use crate::quaternion::Quaternion;

/// The outcome of iterating a single seed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escape<T> {
    /// How many times `z <- z*z + c` was applied.
    pub iterations: usize,
    /// Where the orbit ended up.  Outside the escape radius unless
    /// the iteration cap was reached.
    pub z: Quaternion<T>,
}

impl<T> Escape<T> {
    /// False if the orbit was still bounded when the cap was reached.
    #[inline]
    pub fn escaped(&self, max_iterations: usize) -> bool {
        self.iterations < max_iterations
    }
}

/// Iterates `z <- z*z + c` from `seed`.  Stops as soon as the squared
/// norm reaches `escape_radius_sqr`, or after `max_iterations` steps.
/// A seed that starts outside the radius is returned untouched with a
/// count of zero.
#[inline]
pub fn escape_time<T: Float>(
    seed: Quaternion<T>,
    c: Quaternion<T>,
    max_iterations: usize,
    escape_radius_sqr: T,
) -> Escape<T> {
    let mut z = seed;
    let mut iterations = 0;
    while z.norm_sqr() < escape_radius_sqr && iterations < max_iterations {
        z = z * z + c;
        iterations += 1;
    }
    Escape { iterations, z }
}
