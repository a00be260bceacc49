// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-frame driver.
//!
//! The animation is a fixed path: the Julia constant `c` wanders
//! around a point near the boundary of the Mandelbrot set on three
//! slow sinusoids, and the palette phase drifts with the clock.  Both
//! are pure functions of elapsed time, so there's no state to carry
//! between frames beyond the frame buffer itself.
//!
//! Everything that touches a real display (the window, the texture,
//! pacing, the close button) lives behind the `Surface` trait.

use failure::Error;
use log::debug;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::quaternion::Quaternion;
use crate::render::{FrameBuffer, FrameRenderer};

/// The time and Julia constant for one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnimationState {
    /// Seconds since the animation started
    pub time: f64,
    /// The Julia constant
    pub c: Quaternion<f64>,
}

impl AnimationState {
    /// A state with an explicit constant, off the animation path.
    pub fn new(time: f64, c: Quaternion<f64>) -> Self {
        AnimationState { time, c }
    }

    /// The state of the animation `time` seconds in.  The k component
    /// of `c` stays at zero.
    pub fn at(time: f64) -> Self {
        let c = Quaternion::new(
            -0.745 + (time * 0.4).sin() * 0.08,
            0.113 + (time * 0.25).cos() * 0.06,
            0.05 * (time * 0.15).sin(),
            0.0,
        );
        AnimationState { time, c }
    }
}

/// The presentation layer: a clock, somewhere to put finished frames,
/// and a way to say we're done.
pub trait Surface {
    /// Seconds since the surface was created.  Must never go
    /// backwards.
    fn elapsed(&self) -> f64;

    /// Displays a finished frame.  Frame pacing, if any, happens here.
    fn present(&mut self, frame: &FrameBuffer, state: &AnimationState) -> Result<(), Error>;

    /// True once the animation should stop.
    fn should_close(&self) -> bool;
}

/// Owns the frame buffer and renders one frame per tick.
#[derive(Debug)]
pub struct Animator {
    renderer: FrameRenderer,
    frame: FrameBuffer,
    threads: usize,
    frames: u64,
}

impl Animator {
    /// Builds the renderer and allocates the frame buffer.  This is
    /// where a bad config is caught; once built, ticks don't fail on
    /// our side.
    pub fn new(config: RenderConfig, threads: usize) -> Result<Self, RenderError> {
        if threads == 0 {
            return Err(RenderError::NoThreads);
        }
        let frame = FrameBuffer::new(&config)?;
        let renderer = FrameRenderer::new(config)?;
        debug!("animator ready with {} threads", threads);
        Ok(Animator {
            renderer,
            frame,
            threads,
            frames: 0,
        })
    }

    /// Renders the frame for the surface's current time and presents
    /// it.  Returns the state that was rendered.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<AnimationState, Error> {
        let state = AnimationState::at(surface.elapsed());
        self.renderer.render(&mut self.frame, &state, self.threads)?;
        surface.present(&self.frame, &state)?;
        self.frames += 1;
        Ok(state)
    }

    /// Ticks until the surface asks us to stop.  Returns the number of
    /// frames presented.
    pub fn run<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<u64, Error> {
        let mut presented = 0;
        while !surface.should_close() {
            self.tick(surface)?;
            presented += 1;
        }
        Ok(presented)
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Frames presented since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The renderer.
    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use failure::err_msg;

    // A surface with a scripted clock that remembers what it was shown.
    struct ScriptedSurface {
        times: Vec<f64>,
        presented: Vec<(f64, Vec<u8>)>,
    }

    impl ScriptedSurface {
        fn new(times: &[f64]) -> Self {
            ScriptedSurface {
                times: times.to_vec(),
                presented: vec![],
            }
        }
    }

    impl Surface for ScriptedSurface {
        fn elapsed(&self) -> f64 {
            self.times[self.presented.len()]
        }

        fn present(&mut self, frame: &FrameBuffer, state: &AnimationState) -> Result<(), Error> {
            self.presented.push((state.time, frame.as_bytes().to_vec()));
            Ok(())
        }

        fn should_close(&self) -> bool {
            self.presented.len() >= self.times.len()
        }
    }

    struct BrokenSurface;

    impl Surface for BrokenSurface {
        fn elapsed(&self) -> f64 {
            0.0
        }

        fn present(&mut self, _: &FrameBuffer, _: &AnimationState) -> Result<(), Error> {
            Err(err_msg("display went away"))
        }

        fn should_close(&self) -> bool {
            false
        }
    }

    fn small() -> RenderConfig {
        RenderConfig::with_size(16, 9)
    }

    #[test]
    fn path_starts_where_expected() {
        let state = AnimationState::at(0.0);
        assert_eq!(state.time, 0.0);
        assert_eq!(state.c, Quaternion::new(-0.745, 0.173, 0.0, 0.0));
    }

    #[test]
    fn path_stays_in_its_box() {
        for i in 0..1000 {
            let c = AnimationState::at(i as f64 * 0.37).c;
            assert!((c.w + 0.745).abs() <= 0.08 + 1e-12);
            assert!((c.x - 0.113).abs() <= 0.06 + 1e-12);
            assert!(c.y.abs() <= 0.05 + 1e-12);
            assert_eq!(c.z, 0.0);
        }
    }

    #[test]
    fn tick_presents_exactly_once() {
        let mut animator = Animator::new(small(), 2).unwrap();
        let mut surface = ScriptedSurface::new(&[0.5, 1.0]);
        let state = animator.tick(&mut surface).unwrap();
        assert_eq!(state, AnimationState::at(0.5));
        assert_eq!(surface.presented.len(), 1);
        assert_eq!(animator.frames(), 1);
        assert_eq!(&surface.presented[0].1[..], animator.frame().as_bytes());
    }

    #[test]
    fn run_stops_when_the_surface_closes() {
        let mut animator = Animator::new(small(), 3).unwrap();
        let mut surface = ScriptedSurface::new(&[0.0, 0.25, 0.5, 0.75]);
        assert_eq!(animator.run(&mut surface).unwrap(), 4);
        let times: Vec<f64> = surface.presented.iter().map(|p| p.0).collect();
        assert_eq!(times, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn frames_depend_only_on_time() {
        let mut animator = Animator::new(small(), 2).unwrap();
        let mut surface = ScriptedSurface::new(&[2.0, 7.0, 2.0]);
        animator.run(&mut surface).unwrap();
        assert_eq!(surface.presented[0].1, surface.presented[2].1);
        assert_ne!(surface.presented[0].1, surface.presented[1].1);
    }

    #[test]
    fn tick_matches_a_direct_render() {
        let mut animator = Animator::new(small(), 4).unwrap();
        let mut surface = ScriptedSurface::new(&[4.2]);
        animator.tick(&mut surface).unwrap();

        let mut expected = FrameBuffer::new(&small()).unwrap();
        animator
            .renderer()
            .render_single(&mut expected, &AnimationState::at(4.2))
            .unwrap();
        assert_eq!(animator.frame().as_bytes(), expected.as_bytes());
    }

    #[test]
    fn surface_errors_stop_the_loop() {
        let mut animator = Animator::new(small(), 1).unwrap();
        let err = animator.run(&mut BrokenSurface).unwrap_err();
        assert_eq!(err.to_string(), "display went away");
        assert_eq!(animator.frames(), 0);
    }

    #[test]
    fn construction_rejects_bad_input() {
        assert_eq!(
            Animator::new(small(), 0).unwrap_err(),
            RenderError::NoThreads
        );
        assert_eq!(
            Animator::new(RenderConfig::with_size(0, 0), 1).unwrap_err(),
            RenderError::EmptyImage {
                width: 0,
                height: 0
            }
        );
    }
}
