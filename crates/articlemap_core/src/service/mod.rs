//! Session orchestration.
//!
//! # Responsibility
//! - Compose repository, projector and gateway per user action.
//! - Keep UI/FFI layers decoupled from transport details.

pub mod dispatch;
pub mod session;
pub mod session_controller;
