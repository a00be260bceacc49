// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fixed parameters of the render.  None of these change while
//! the animation runs; they're gathered here so that tests can shrink
//! the image and so nothing lives in process-wide globals.

use image::Rgba;

use crate::error::RenderError;

/// The three colors of the render: the flat color for points inside
/// the set, and the two accents the escape gradient blends between.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Palette {
    /// Color for points that never escape
    pub background: Rgba<u8>,
    /// The accent at `t = 0`
    pub cool: Rgba<u8>,
    /// The accent at `t = 1`
    pub warm: Rgba<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            background: Rgba([0x1B, 0x1B, 0x1B, 0xFF]),
            cool: Rgba([0x00, 0x80, 0x67, 0xFF]),
            warm: Rgba([0xFF, 0x90, 0x00, 0xFF]),
        }
    }
}

/// Everything the renderer needs to know about the image it produces.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Sub-samples per axis; each pixel averages `samples * samples`
    /// evaluations.
    pub samples: usize,
    /// Iteration cap.  A point that reaches it is considered inside.
    pub max_iterations: usize,
    /// Squared escape radius
    pub escape_radius_sqr: f64,
    /// Half-height of the fractal-plane window.  The half-width is
    /// this times the aspect ratio.
    pub zoom: f64,
    /// Colors
    pub palette: Palette,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 800,
            height: 450,
            samples: 2,
            max_iterations: 40,
            escape_radius_sqr: 4.0,
            zoom: 2.2,
            palette: Palette::default(),
        }
    }
}

impl RenderConfig {
    /// The default config at a different image size.
    pub fn with_size(width: usize, height: usize) -> Self {
        RenderConfig {
            width,
            height,
            ..RenderConfig::default()
        }
    }

    /// Checks that the config describes a renderable image.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        let max = u32::max_value() as usize;
        if self.width > max
            || self.height > max
            || self.width.checked_mul(self.height).and_then(|n| n.checked_mul(4)).is_none()
        {
            return Err(RenderError::ImageTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples == 0 {
            return Err(RenderError::NoSamples);
        }
        if self.max_iterations == 0 {
            return Err(RenderError::NoIterations);
        }
        if !(self.escape_radius_sqr.is_finite() && self.escape_radius_sqr > 0.0) {
            return Err(RenderError::BadEscapeRadius(self.escape_radius_sqr));
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(RenderError::BadZoom(self.zoom));
        }
        Ok(())
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// The total number of pixels in the image.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True if the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
