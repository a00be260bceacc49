// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a window on the fractal plane centered on the origin.  Every
//! pixel is further divided into a grid of sub-samples for
//! antialiasing; the mapper turns a pixel and a sub-sample into the
//! quaternion seed for that sample.

use itertools::iproduct;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::quaternion::Quaternion;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y of a pixel in the image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Describes the x, y of a sub-sample within a pixel, each in
/// `0..samples`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SubSample(pub usize, pub usize);

/// Maps pixels and their sub-samples onto the fractal plane.  The
/// window is `2 * zoom` tall and `2 * zoom * aspect` wide, so the
/// image is never stretched.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The right-upper hand corner of the integral cartesian plane.
    /// The left-lower is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    samples: usize,
    zoom: f64,
    aspect: f64,
}

impl PlaneMapper {
    /// Builds the mapper described by a config, rejecting configs that
    /// don't describe a usable image.
    pub fn new(config: &RenderConfig) -> Result<PlaneMapper, RenderError> {
        config.validate()?;
        Ok(PlaneMapper {
            integral_plane: IntegralPlane(config.width, config.height),
            samples: config.samples,
            zoom: config.zoom,
            aspect: config.aspect_ratio(),
        })
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Sub-samples per axis.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Every sub-sample of a pixel, row by row.
    pub fn sub_samples(&self) -> impl Iterator<Item = SubSample> {
        iproduct!(0..self.samples, 0..self.samples).map(|(sy, sx)| SubSample(sx, sy))
    }

    /// The offset of a sub-sample from its pixel's corner, in `[0, 1)`
    /// on both axes.
    pub fn offset(&self, sub: SubSample) -> (f64, f64) {
        let samples = self.samples as f64;
        (sub.0 as f64 / samples, sub.1 as f64 / samples)
    }

    /// Given a pixel and one of its sub-samples, return the seed
    /// quaternion for that sample.
    pub fn sample_to_point(&self, pixel: Pixel, sub: SubSample) -> Quaternion<f64> {
        let (dx, dy) = self.offset(sub);
        let width = self.integral_plane.0 as f64;
        let height = self.integral_plane.1 as f64;
        let re = self.zoom * (2.0 * (pixel.0 as f64 + dx) / width - 1.0) * self.aspect;
        let im = self.zoom * (2.0 * (pixel.1 as f64 + dy) / height - 1.0);
        Quaternion::from_plane(re, im)
    }

    /// The seed at the pixel's own corner.
    pub fn pixel_to_point(&self, pixel: Pixel) -> Quaternion<f64> {
        self.sample_to_point(pixel, SubSample(0, 0))
    }
}
