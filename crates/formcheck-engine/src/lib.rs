//! # FormCheck-Engine
//!
//! Real-time exercise analysis over a stream of 2D body landmarks.
//!
//! ## Pipeline
//!
//! Every frame pushed into [`FormEngine`] goes through:
//!
//! 1. **Phase** - the debounced state machine classifies the movement phase
//!    and counts reps on `raising → top`
//! 2. **Posture** - torso lean, knee flexion, stance width, shoulder/hip
//!    balance (every Nth frame)
//! 3. **Movement** - elbow tuck, wrist alignment, phase-aware range of
//!    motion (every Nth frame)
//! 4. **Feedback** - items from the cycle are collected and exposed sorted
//!    by priority
//!
//! ## Degradation
//!
//! Missing landmarks never produce errors. A check whose points are absent
//! emits nothing, and a frame without the eight phase landmarks leaves the
//! phase and rep count untouched.

pub mod config;
pub mod engine;
pub mod events;
pub mod feedback;
pub mod movement;
pub mod phase;
pub mod posture;

pub use crate::config::EngineConfig;
pub use engine::*;
pub use events::*;
pub use feedback::*;
pub use movement::*;
pub use phase::*;
pub use posture::*;
