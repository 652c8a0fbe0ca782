//! Shared fixtures for unit tests: a synthesized .NET PE image and matching symbol data.

mod symbols;

pub use image::PeImage;
pub use symbols::*;
