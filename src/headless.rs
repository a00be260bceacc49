// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A surface with no window.  It keeps a wall clock, paces frames to
//! a target rate, logs the frame rate and the current constant about
//! once a second, and closes after a fixed number of frames.  Handy
//! for benchmarking the renderer and for running it where there's no
//! display.

use std::thread;
use std::time::{Duration, Instant};

use failure::Error;
use log::{debug, info};

use crate::animation::{AnimationState, Surface};
use crate::render::FrameBuffer;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// A windowless `Surface`.
#[derive(Debug)]
pub struct HeadlessSurface {
    started: Instant,
    frame_limit: u64,
    frame_interval: Option<Duration>,
    last_present: Option<Instant>,
    presented: u64,
    last_report: Instant,
    frames_since_report: u32,
    checksum: u64,
}

impl HeadlessSurface {
    /// Closes after `frame_limit` frames.  A `target_fps` of zero
    /// presents as fast as frames are rendered.
    pub fn new(frame_limit: u64, target_fps: u32) -> Self {
        let now = Instant::now();
        let frame_interval = match target_fps {
            0 => None,
            fps => Some(Duration::from_secs(1) / fps),
        };
        HeadlessSurface {
            started: now,
            frame_limit,
            frame_interval,
            last_present: None,
            presented: 0,
            last_report: now,
            frames_since_report: 0,
            checksum: 0,
        }
    }

    /// Frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// A running checksum over every presented frame's bytes, so a run
    /// can be compared against another without keeping the frames.
    pub fn checksum(&self) -> u64 {
        self.checksum
    }

    // Sleeps off whatever is left of the current frame's time slot.
    fn pace(&mut self) {
        if let (Some(interval), Some(last)) = (self.frame_interval, self.last_present) {
            let spent = last.elapsed();
            if spent < interval {
                thread::sleep(interval - spent);
            }
        }
        self.last_present = Some(Instant::now());
    }

    fn report(&mut self, state: &AnimationState) {
        self.frames_since_report += 1;
        let since = self.last_report.elapsed();
        if since < REPORT_INTERVAL {
            return;
        }
        let fps = f64::from(self.frames_since_report) / since.as_secs_f64();
        info!(
            "{:.1} fps | C: {:.3}, {:.3}i, {:.3}j",
            fps, state.c.w, state.c.x, state.c.y
        );
        self.last_report = Instant::now();
        self.frames_since_report = 0;
    }
}

impl Surface for HeadlessSurface {
    fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn present(&mut self, frame: &FrameBuffer, state: &AnimationState) -> Result<(), Error> {
        self.pace();
        // FNV-1a, folded over frames.
        self.checksum = frame.as_bytes().iter().fold(self.checksum ^ 0xcbf2_9ce4_8422_2325, |h, b| {
            (h ^ u64::from(*b)).wrapping_mul(0x100_0000_01b3)
        });
        self.presented += 1;
        debug!("presented frame {} at t={:.3}", self.presented, state.time);
        self.report(state);
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.presented >= self.frame_limit
    }
}
