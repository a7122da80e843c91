//! Remote query gateway.
//!
//! # Responsibility
//! - Mediate semantic search and similarity lookup against the backend.
//! - Decode wire payloads and classify failures as values.
//!
//! # See also
//! - `service::dispatch` for how calls run off the event loop.

pub mod http;
pub mod query;
pub mod wire;
