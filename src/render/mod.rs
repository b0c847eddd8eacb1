//! Module for anything related to rendering.
//!
//! This module contains the shader library and the CPU-side math behind lighting, shadows,
//! transparency, post-processing and instancing.

pub mod instancing;
pub mod library;
pub mod lighting;
pub mod postprocess;
pub mod shadow;
pub mod transparency;
