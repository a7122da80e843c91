//! View derivation for the semantic map.
//!
//! # Responsibility
//! - Project the canonical dataset into the displayed subset.
//! - Shape views into plot markers for the rendering layer.

pub mod plot;
pub mod projector;
