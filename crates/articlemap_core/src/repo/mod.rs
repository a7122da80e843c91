//! Repository layer for the session's article dataset.
//!
//! # Responsibility
//! - Hold the canonical, server-provided collection and its reset snapshot.
//! - Define the `ArticleSource` contract the initial load goes through.
//!
//! # Invariants
//! - The dataset is memory-resident for the session; nothing is persisted.

pub mod article_repo;
