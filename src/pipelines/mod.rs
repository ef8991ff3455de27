//! Render pipelines and the light uniform they share.
//!
//! - `basic` is the lit, textured, instanced model pipeline
//! - `light` holds the scene light uniform and its bind group

pub mod basic;
pub mod light;
