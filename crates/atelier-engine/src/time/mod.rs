//! Time subsystem.
//!
//! Frame timing for the render loop. Fade tweens in the gallery advance by
//! `FrameTime::dt`; scroll smoothing is per-frame and ignores it.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
