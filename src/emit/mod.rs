//! # Step Emission
//!
//! Walks block chains and emits animation steps.

mod block_handlers;
mod step_emitter;

pub use block_handlers::{
    degrees_for, degrees_to_radians, radians_to_degrees, DEFAULT_ANGLE_DEGREES,
    DEFAULT_DISTANCE, DEFAULT_DURATION, DEFAULT_SCALE, DEFAULT_TIMES,
};
pub use step_emitter::*;
