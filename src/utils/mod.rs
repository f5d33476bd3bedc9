//! # Utilities Module
//!
//! Grid geometry shared by the map model, the generator and the visibility
//! engine.

pub mod geometry;

pub use geometry::*;
