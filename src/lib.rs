#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Quaternion Julia renderer
//!
//! The Julia set for a constant `c` is the set of starting points `z`
//! that stay bounded when repeatedly squared and offset by `c`.  The
//! familiar pictures use complex numbers; here `z` and `c` are
//! quaternions, which gives a four-dimensional set.  We render a flat
//! slice of it, the plane spanned by the real axis and `i`, and move
//! `c` slowly through quaternion space so the slice morphs over time.
//!
//! Each pixel is supersampled, each sample is iterated until it
//! escapes (or doesn't), and the escape count is smoothed into a
//! continuous value that picks a color and a depth.  Rows are
//! independent, so a frame is rendered by a pool of scoped threads.
//!
//! The library stops at a finished RGBA buffer.  Anything that puts
//! it on a screen implements `Surface`; `HeadlessSurface` is one that
//! doesn't need a screen at all.

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod escape;
pub mod headless;
pub mod plane;
pub mod quaternion;
pub mod render;

pub use animation::{AnimationState, Animator, Surface};
pub use config::{Palette, RenderConfig};
pub use error::RenderError;
pub use escape::{escape_time, Escape};
pub use headless::HeadlessSurface;
pub use plane::{Pixel, PlaneMapper, SubSample};
pub use quaternion::Quaternion;
pub use render::{FrameBuffer, FrameRenderer};
