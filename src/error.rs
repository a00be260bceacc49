// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can go wrong before (or around) a frame.  The
//! arithmetic itself never fails; these are configuration mistakes
//! caught at construction and the rare orchestration failure.

use failure::Fail;

/// Errors raised while configuring or driving the renderer.
#[derive(Debug, Fail, PartialEq)]
pub enum RenderError {
    /// One of the image dimensions was zero.
    #[fail(display = "image dimensions must be non-zero, got {}x{}", width, height)]
    EmptyImage {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// The image would not fit in an `RgbaImage`.
    #[fail(display = "image dimensions {}x{} are too large", width, height)]
    ImageTooLarge {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// Antialiasing needs at least one sample per axis.
    #[fail(display = "antialiasing sample count must be at least 1")]
    NoSamples,

    /// The escape loop needs at least one iteration.
    #[fail(display = "iteration cap must be at least 1")]
    NoIterations,

    /// The escape threshold was zero, negative, or not finite.
    #[fail(display = "escape radius must be positive and finite, got {}", _0)]
    BadEscapeRadius(f64),

    /// The zoom factor was zero, negative, or not finite.
    #[fail(display = "zoom must be positive and finite, got {}", _0)]
    BadZoom(f64),

    /// The parallel renderer was asked to run on no threads at all.
    #[fail(display = "thread count must be at least 1")]
    NoThreads,

    /// The frame buffer handed to the renderer has the wrong shape.
    #[fail(
        display = "frame buffer is {}x{} but the renderer expects {}x{}",
        actual_width, actual_height, width, height
    )]
    FrameMismatch {
        /// Configured width
        width: usize,
        /// Configured height
        height: usize,
        /// Width of the buffer we were given
        actual_width: usize,
        /// Height of the buffer we were given
        actual_height: usize,
    },

    /// A render worker panicked; the frame is incomplete.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,
}
