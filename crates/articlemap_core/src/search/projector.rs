//! View projection over the canonical dataset.
//!
//! # Responsibility
//! - Derive the displayed subset from the canonical collection and the
//!   active operation.
//! - Resolve legacy text labels to article ids.
//!
//! # Invariants
//! - Every projected view is a subsequence of its source collection.
//! - `IdFilter` keeps canonical order and silently drops unknown ids.
//! - `Reset` reads the snapshot, never canonical.
//! - Projection is pure; nothing is cached between calls.

use crate::model::article::{Article, ArticleId};
use crate::model::collection::Collection;
use std::collections::HashSet;

/// Mode producing the current view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Operation {
    /// Whole canonical collection.
    #[default]
    ShowAll,
    /// Case-insensitive substring match on title or abstract.
    LocalFilter(String),
    /// Articles whose id is in the set, in canonical order.
    IdFilter(HashSet<ArticleId>),
    /// Snapshot frozen at load time.
    Reset,
}

impl Operation {
    /// Builds an id filter from ranked remote results.
    pub fn id_filter(ids: impl IntoIterator<Item = ArticleId>) -> Self {
        Self::IdFilter(ids.into_iter().collect())
    }

    /// Stable short name for log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShowAll => "show_all",
            Self::LocalFilter(_) => "local_filter",
            Self::IdFilter(_) => "id_filter",
            Self::Reset => "reset",
        }
    }
}

/// Computes the view for `operation`.
pub fn project(
    canonical: &Collection,
    snapshot: &Collection,
    operation: &Operation,
) -> Collection {
    match operation {
        Operation::ShowAll => canonical.clone(),
        Operation::Reset => snapshot.clone(),
        Operation::LocalFilter(text) => {
            let needle = text.to_lowercase();
            retain(canonical, |article| article.mentions(&needle))
        }
        Operation::IdFilter(ids) => retain(canonical, |article| ids.contains(&article.id)),
    }
}

/// Resolves legacy text labels to the ids of articles they mention.
///
/// An article matches when any non-blank label is a case-insensitive
/// substring of its title or abstract.
pub fn match_labels(canonical: &Collection, labels: &[String]) -> HashSet<ArticleId> {
    let needles = labels
        .iter()
        .map(|label| label.trim().to_lowercase())
        .filter(|label| !label.is_empty())
        .collect::<Vec<_>>();
    if needles.is_empty() {
        return HashSet::new();
    }

    canonical
        .iter()
        .filter(|article| needles.iter().any(|needle| article.mentions(needle)))
        .map(|article| article.id.clone())
        .collect()
}

fn retain(source: &Collection, keep: impl Fn(&Article) -> bool) -> Collection {
    Collection::from_unique(source.iter().filter(|article| keep(article)).cloned().collect())
}
