// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The frame renderer.
//!
//! Every pixel is an independent little computation: split it into a
//! grid of sub-samples, map each sub-sample onto the fractal plane,
//! iterate it, color it, and average.  Rows share nothing, so the
//! parallel renderer simply hands rows out to a pool of scoped
//! threads from a shared queue.  Whichever thread ends up with a row,
//! the bytes it writes are the same, so the result doesn't depend on
//! scheduling.

use std::iter::Enumerate;
use std::slice::ChunksMut;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use image::{Rgba, RgbaImage};
use log::{debug, trace};

use crate::animation::AnimationState;
use crate::color::shade;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::escape::escape_time;
use crate::plane::{Pixel, PlaneMapper, SubSample};

type RowQueue<'a> = Arc<Mutex<Enumerate<ChunksMut<'a, u8>>>>;

const OPAQUE: u8 = 0xFF;

/// A row-major RGBA8 image, allocated once and overwritten in place
/// every frame.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    image: RgbaImage,
}

impl FrameBuffer {
    /// Allocates an opaque black buffer of the configured size.
    pub fn new(config: &RenderConfig) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(FrameBuffer {
            image: RgbaImage::from_pixel(
                config.width as u32,
                config.height as u32,
                Rgba([0, 0, 0, OPAQUE]),
            ),
        })
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.image.width() as usize
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.image.height() as usize
    }

    /// The color at `(x, y)`.  Panics if out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Rgba<u8> {
        *self.image.get_pixel(x as u32, y as u32)
    }

    /// The raw bytes, four per pixel, row-major.  This is what gets
    /// uploaded to a texture.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// The underlying image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    fn rows_mut(&mut self) -> ChunksMut<u8> {
        let stride = self.image.width() as usize * 4;
        self.image.chunks_mut(stride)
    }
}

/// Renders frames of the quaternion Julia set for a fixed config.
/// Once built, nothing about it changes; the only per-frame input is
/// the animation state.
#[derive(Debug)]
pub struct FrameRenderer {
    plane: PlaneMapper,
    config: RenderConfig,
}

impl FrameRenderer {
    /// Validates the config and builds the renderer.
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        let plane = PlaneMapper::new(&config)?;
        debug!(
            "renderer: {}x{}, {}x{} samples, {} iterations, zoom {}",
            config.width, config.height, config.samples, config.samples, config.max_iterations, config.zoom
        );
        Ok(FrameRenderer { plane, config })
    }

    /// The config this renderer was built from.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The color of a single sub-sample, before averaging.
    pub fn sample_color(&self, pixel: Pixel, sub: SubSample, state: &AnimationState) -> Rgba<u8> {
        let seed = self.plane.sample_to_point(pixel, sub);
        let escape = escape_time(
            seed,
            state.c,
            self.config.max_iterations,
            self.config.escape_radius_sqr,
        );
        shade(&escape, self.config.max_iterations, state.time, &self.config.palette)
    }

    /// The antialiased color of a pixel: the truncated mean of its
    /// sub-samples, fully opaque.
    pub fn pixel_color(&self, pixel: Pixel, state: &AnimationState) -> Rgba<u8> {
        let mut acc = [0.0f64; 3];
        for sub in self.plane.sub_samples() {
            let color = self.sample_color(pixel, sub, state);
            for (sum, channel) in acc.iter_mut().zip(color.0.iter()) {
                *sum += f64::from(*channel);
            }
        }
        let total = (self.plane.samples() * self.plane.samples()) as f64;
        Rgba([
            (acc[0] / total) as u8,
            (acc[1] / total) as u8,
            (acc[2] / total) as u8,
            OPAQUE,
        ])
    }

    fn render_row(&self, row: usize, pixels: &mut [u8], state: &AnimationState) {
        for (column, rgba) in pixels.chunks_exact_mut(4).enumerate() {
            rgba.copy_from_slice(&self.pixel_color(Pixel(column, row), state).0);
        }
    }

    fn check_frame(&self, frame: &FrameBuffer) -> Result<(), RenderError> {
        if frame.width() != self.config.width || frame.height() != self.config.height {
            return Err(RenderError::FrameMismatch {
                width: self.config.width,
                height: self.config.height,
                actual_width: frame.width(),
                actual_height: frame.height(),
            });
        }
        Ok(())
    }

    /// Renders the frame on the calling thread.
    pub fn render_single(
        &self,
        frame: &mut FrameBuffer,
        state: &AnimationState,
    ) -> Result<(), RenderError> {
        self.check_frame(frame)?;
        for (row, pixels) in frame.rows_mut().enumerate() {
            self.render_row(row, pixels, state);
        }
        Ok(())
    }

    /// Renders the frame across `threads` workers, each pulling the
    /// next unrendered row off a shared queue until none are left.
    /// Returns only once every row is written.
    pub fn render(
        &self,
        frame: &mut FrameBuffer,
        state: &AnimationState,
        threads: usize,
    ) -> Result<(), RenderError> {
        self.check_frame(frame)?;
        if threads == 0 {
            return Err(RenderError::NoThreads);
        }
        let threads = threads.min(self.config.height);
        let started = Instant::now();

        {
            let rows: RowQueue = Arc::new(Mutex::new(frame.rows_mut().enumerate()));
            crossbeam::scope(|spawner| {
                for worker in 0..threads {
                    let rows = rows.clone();
                    spawner.spawn(move |_| {
                        let mut rendered = 0;
                        loop {
                            // A poisoned queue means another worker
                            // died; the scope will report it.
                            let next = match rows.lock() {
                                Ok(mut rows) => rows.next(),
                                Err(_) => None,
                            };
                            match next {
                                Some((row, pixels)) => {
                                    self.render_row(row, pixels, state);
                                    rendered += 1;
                                }
                                None => {
                                    break;
                                }
                            }
                        }
                        trace!("worker {} rendered {} rows", worker, rendered);
                    });
                }
            })
            .map_err(|_| RenderError::WorkerPanicked)?;
        }

        debug!(
            "frame t={:.3} rendered on {} threads in {:?}",
            state.time,
            threads,
            started.elapsed()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quaternion::Quaternion;

    fn reference_state() -> AnimationState {
        AnimationState::new(0.0, Quaternion::new(-0.745, 0.113, 0.05, 0.0))
    }

    fn config(width: usize, height: usize, samples: usize) -> RenderConfig {
        RenderConfig {
            samples,
            ..RenderConfig::with_size(width, height)
        }
    }

    // 8x8, one sample per pixel, 40 iterations, c = (-0.745, 0.113, 0.05, 0)
    // at time 0.
    #[rustfmt::skip]
    const REFERENCE_ITERATIONS: [[usize; 8]; 8] = [
        [0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 1, 1, 1, 1, 1, 0],
        [0, 1, 1, 1, 2, 2, 1, 1],
        [0, 1, 2, 4, 40, 5, 3, 1],
        [0, 2, 40, 40, 40, 40, 40, 2],
        [0, 1, 3, 5, 40, 4, 2, 1],
        [0, 1, 1, 2, 2, 1, 1, 1],
        [0, 0, 1, 1, 1, 1, 1, 0],
    ];

    #[rustfmt::skip]
    const REFERENCE_RGB: [[u8; 3]; 64] = [
        [35, 48, 22], [37, 50, 23], [39, 51, 23], [41, 52, 23], [41, 52, 23], [41, 52, 23], [39, 51, 23], [37, 50, 23],
        [37, 50, 23], [40, 51, 23], [43, 53, 22], [45, 54, 23], [46, 55, 22], [45, 54, 23], [43, 53, 23], [40, 51, 23],
        [39, 51, 23], [44, 54, 22], [51, 57, 22], [56, 59, 22], [62, 62, 21], [59, 60, 21], [53, 58, 22], [45, 54, 23],
        [41, 52, 23], [52, 57, 22], [66, 64, 21], [91, 73, 17], [27, 27, 27], [107, 78, 14], [78, 68, 19], [53, 58, 22],
        [41, 52, 23], [62, 62, 21], [27, 27, 27], [27, 27, 27], [27, 27, 27], [27, 27, 27], [27, 27, 27], [62, 62, 21],
        [41, 52, 23], [53, 58, 22], [78, 68, 19], [107, 78, 14], [27, 27, 27], [91, 73, 17], [66, 64, 21], [52, 57, 22],
        [39, 51, 23], [45, 54, 23], [53, 58, 22], [59, 60, 21], [62, 62, 21], [56, 59, 22], [51, 57, 22], [44, 54, 22],
        [37, 50, 23], [40, 51, 23], [43, 53, 23], [45, 54, 23], [46, 55, 22], [45, 54, 23], [43, 53, 22], [40, 51, 23],
    ];

    #[test]
    fn reference_iteration_counts() {
        let config = config(8, 8, 1);
        let plane = PlaneMapper::new(&config).unwrap();
        let state = reference_state();
        for (y, row) in REFERENCE_ITERATIONS.iter().enumerate() {
            for (x, expected) in row.iter().enumerate() {
                let seed = plane.pixel_to_point(Pixel(x, y));
                let escape = escape_time(seed, state.c, 40, 4.0);
                assert_eq!(escape.iterations, *expected, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn reference_frame_matches_exactly() {
        let renderer = FrameRenderer::new(config(8, 8, 1)).unwrap();
        let mut frame = FrameBuffer::new(renderer.config()).unwrap();
        renderer.render(&mut frame, &reference_state(), 4).unwrap();

        let expected: Vec<u8> = REFERENCE_RGB
            .iter()
            .flat_map(|rgb| vec![rgb[0], rgb[1], rgb[2], 255])
            .collect();
        assert_eq!(frame.as_bytes(), &expected[..]);
    }

    #[test]
    fn parallel_render_is_independent_of_thread_count() {
        let renderer = FrameRenderer::new(config(37, 23, 2)).unwrap();
        let state = AnimationState::at(3.25);

        let mut single = FrameBuffer::new(renderer.config()).unwrap();
        renderer.render_single(&mut single, &state).unwrap();

        for &threads in &[1, 2, 3, 8, 64] {
            let mut frame = FrameBuffer::new(renderer.config()).unwrap();
            renderer.render(&mut frame, &state, threads).unwrap();
            assert_eq!(frame.as_bytes(), single.as_bytes(), "threads = {}", threads);
        }
    }

    #[test]
    fn repeated_renders_are_identical() {
        let renderer = FrameRenderer::new(config(16, 9, 2)).unwrap();
        let state = AnimationState::at(1.5);
        let mut frame = FrameBuffer::new(renderer.config()).unwrap();
        renderer.render(&mut frame, &state, 4).unwrap();
        let first = frame.as_bytes().to_vec();
        renderer.render(&mut frame, &state, 4).unwrap();
        assert_eq!(frame.as_bytes(), &first[..]);
    }

    #[test]
    fn every_pixel_is_opaque() {
        let renderer = FrameRenderer::new(config(12, 7, 3)).unwrap();
        let mut frame = FrameBuffer::new(renderer.config()).unwrap();
        renderer.render(&mut frame, &AnimationState::at(10.0), 2).unwrap();
        assert!(frame.as_bytes().chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn supersampling_stays_within_the_sample_spread() {
        let state = reference_state();
        let coarse = FrameRenderer::new(config(16, 16, 1)).unwrap();
        let fine = FrameRenderer::new(config(16, 16, 2)).unwrap();
        let mut coarse_frame = FrameBuffer::new(coarse.config()).unwrap();
        let mut fine_frame = FrameBuffer::new(fine.config()).unwrap();
        coarse.render(&mut coarse_frame, &state, 2).unwrap();
        fine.render(&mut fine_frame, &state, 2).unwrap();

        for y in 0..16 {
            for x in 0..16 {
                let samples: Vec<Rgba<u8>> = (0..2)
                    .flat_map(|sy| (0..2).map(move |sx| SubSample(sx, sy)))
                    .map(|sub| fine.sample_color(Pixel(x, y), sub, &state))
                    .collect();
                let before = coarse_frame.pixel(x, y);
                let after = fine_frame.pixel(x, y);
                for i in 0..3 {
                    let lo = samples.iter().map(|s| s[i]).min().unwrap();
                    let hi = samples.iter().map(|s| s[i]).max().unwrap();
                    let change = (i32::from(after[i]) - i32::from(before[i])).abs();
                    assert!(
                        change <= i32::from(hi - lo),
                        "pixel ({}, {}) channel {} moved {} with spread {}",
                        x,
                        y,
                        i,
                        change,
                        hi - lo
                    );
                }
            }
        }
    }

    #[test]
    fn interior_pixels_get_the_background() {
        let renderer = FrameRenderer::new(config(8, 8, 1)).unwrap();
        let state = AnimationState::new(0.0, Quaternion::zero());
        // Pixel (4, 4) maps to the origin, a fixed point when c = 0.
        let color = renderer.pixel_color(Pixel(4, 4), &state);
        let background = renderer.config().palette.background;
        assert_eq!(color, background);
    }

    #[test]
    fn mismatched_frames_are_rejected() {
        let renderer = FrameRenderer::new(config(8, 8, 1)).unwrap();
        let mut frame = FrameBuffer::new(&config(4, 8, 1)).unwrap();
        let expected = RenderError::FrameMismatch {
            width: 8,
            height: 8,
            actual_width: 4,
            actual_height: 8,
        };
        let state = reference_state();
        assert_eq!(renderer.render(&mut frame, &state, 2), Err(expected));
        assert!(renderer.render_single(&mut frame, &state).is_err());
    }

    #[test]
    fn zero_threads_is_an_error() {
        let renderer = FrameRenderer::new(config(8, 8, 1)).unwrap();
        let mut frame = FrameBuffer::new(renderer.config()).unwrap();
        assert_eq!(
            renderer.render(&mut frame, &reference_state(), 0),
            Err(RenderError::NoThreads)
        );
    }

    #[test]
    fn new_frames_are_opaque_black() {
        let frame = FrameBuffer::new(&config(3, 2, 1)).unwrap();
        assert_eq!((frame.width(), frame.height()), (3, 2));
        assert_eq!(frame.as_bytes().len(), 24);
        assert_eq!(frame.pixel(2, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(frame.image().dimensions(), (3, 2));
    }
}
