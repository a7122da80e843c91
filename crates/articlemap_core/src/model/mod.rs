//! Article domain model.
//!
//! # Responsibility
//! - Define the article record and the id-unique collection that holds it.
//!
//! # Invariants
//! - Every article is identified by an opaque `ArticleId`.
//! - Articles are immutable values once received from the backend.

pub mod article;
pub mod collection;
