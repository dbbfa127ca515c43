//! # FormCheck-Core
//!
//! Core types and utilities for the FormCheck exercise analysis engine:
//! the 13-point landmark vocabulary, per-frame landmark sets with explicit
//! absence, exercise phases, feedback records and 2D geometry helpers.

pub mod error;
pub mod exercise;
pub mod geometry;
pub mod types;

pub use error::{Error, Result};
pub use exercise::*;
pub use geometry::*;
pub use types::*;
