//! Ordered article collection with unique ids.
//!
//! # Invariants
//! - Article ids are unique within one collection.
//! - Iteration order is insertion order, which is display order for views.

use crate::model::article::{Article, ArticleId};
use std::collections::HashMap;

/// Ordered, id-unique sequence of articles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    articles: Vec<Article>,
    positions: HashMap<ArticleId, usize>,
}

impl Collection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a collection, keeping the first occurrence of each id.
    ///
    /// Returns the collection and the ids whose later duplicates were dropped.
    pub fn from_articles(articles: impl IntoIterator<Item = Article>) -> (Self, Vec<ArticleId>) {
        let mut collection = Self::default();
        let mut duplicates = Vec::new();
        for article in articles {
            if collection.positions.contains_key(&article.id) {
                duplicates.push(article.id);
                continue;
            }
            collection
                .positions
                .insert(article.id.clone(), collection.articles.len());
            collection.articles.push(article);
        }
        (collection, duplicates)
    }

    /// Builds a collection from articles already known to be id-unique.
    ///
    /// Used for subsequences of an existing collection.
    pub(crate) fn from_unique(articles: Vec<Article>) -> Self {
        let positions = articles
            .iter()
            .enumerate()
            .map(|(index, article)| (article.id.clone(), index))
            .collect();
        Self {
            articles,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn contains(&self, id: &ArticleId) -> bool {
        self.positions.contains_key(id)
    }

    pub fn get(&self, id: &ArticleId) -> Option<&Article> {
        self.positions.get(id).map(|index| &self.articles[*index])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Article> {
        self.articles.iter()
    }

    pub fn ids(&self) -> Vec<ArticleId> {
        self.articles.iter().map(|article| article.id.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Article;
    type IntoIter = std::slice::Iter<'a, Article>;

    fn into_iter(self) -> Self::IntoIter {
        self.articles.iter()
    }
}
