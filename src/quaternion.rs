// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A small quaternion value type.  It plays the same role for the
//! quaternion Julia set that `num::Complex` plays for the Mandelbrot:
//! a `Copy` number with addition, the Hamilton product, and the two
//! norms we need for escape testing and smoothing.

use num::Float;
use std::fmt;
use std::ops::{Add, Mul};

/// A quaternion `w + xi + yj + zk`.  `w` is the real part.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Quaternion<T> {
    /// Real part
    pub w: T,
    /// Coefficient of i
    pub x: T,
    /// Coefficient of j
    pub y: T,
    /// Coefficient of k
    pub z: T,
}

impl<T: Float> Quaternion<T> {
    /// Constructor.
    #[inline]
    pub fn new(w: T, x: T, y: T, z: T) -> Self {
        Quaternion { w, x, y, z }
    }

    /// The additive identity.
    #[inline]
    pub fn zero() -> Self {
        Quaternion::new(T::zero(), T::zero(), T::zero(), T::zero())
    }

    /// Lifts a point on the 2D fractal plane into quaternion space.
    /// The horizontal axis becomes the real part and the vertical axis
    /// the i coefficient; j and k stay at zero, which is what makes
    /// the render a 2D slice.
    #[inline]
    pub fn from_plane(re: T, im: T) -> Self {
        Quaternion::new(re, im, T::zero(), T::zero())
    }

    /// Sum of the squares of all four components.  This is the escape
    /// test on the hot path, so no square root.
    #[inline]
    pub fn norm_sqr(&self) -> T {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Euclidean length.
    #[inline]
    pub fn norm(&self) -> T {
        self.norm_sqr().sqrt()
    }
}

impl<T: Float> Add for Quaternion<T> {
    type Output = Quaternion<T>;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Quaternion::new(
            self.w + rhs.w,
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
        )
    }
}

/// The Hamilton product.  Not commutative.
impl<T: Float> Mul for Quaternion<T> {
    type Output = Quaternion<T>;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let (a, b) = (self, rhs);
        Quaternion::new(
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
        )
    }
}

impl<T: Float + fmt::Display> fmt::Display for Quaternion<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(
                f,
                "{:.*}, {:.*}i, {:.*}j, {:.*}k",
                p, self.w, p, self.x, p, self.y, p, self.z
            ),
            None => write!(f, "{}, {}i, {}j, {}k", self.w, self.x, self.y, self.z),
        }
    }
}
