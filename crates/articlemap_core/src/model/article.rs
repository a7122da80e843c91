//! Article domain model.
//!
//! # Responsibility
//! - Define the immutable article record received from the backend.
//! - Decode the lenient `/raw-data` record shape into strict typed fields.
//!
//! # Invariants
//! - `ArticleId` is opaque; numeric and textual wire ids are both kept as text.
//! - `abstract_text` and `journal` are never empty after decoding.
//! - `x`/`y` are display coordinates only; core never recomputes them.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Placeholder used when a record carries no abstract.
pub const DEFAULT_ABSTRACT: &str = "No abstract available";
/// Placeholder used when a record carries no journal.
pub const DEFAULT_JOURNAL: &str = "Unknown Journal";

/// Opaque article identifier.
///
/// The backend emits integer ids, but nothing in core depends on that;
/// ids compare by their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ArticleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ArticleId {
    type Err = ArticleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ArticleIdError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<i64> for ArticleId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Rejection reasons for textual id input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleIdError {
    Empty,
}

impl Display for ArticleIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "article id cannot be empty"),
        }
    }
}

impl std::error::Error for ArticleIdError {}

/// 2^53: above this, `f64` can no longer represent every integer.
const MAX_EXACT_FLOAT_ID: f64 = 9_007_199_254_740_992.0;

/// Wire shapes accepted for an id: JSON number or JSON string.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl WireId {
    fn into_id(self) -> Option<ArticleId> {
        match self {
            Self::Int(value) => Some(ArticleId::from(value)),
            Self::UInt(value) => Some(ArticleId(value.to_string())),
            // Parquet round-trips sometimes turn integer ids into `3.0`.
            // Only floats that still hold an exact integer are accepted.
            Self::Float(value) if value.fract() == 0.0 && value.abs() < MAX_EXACT_FLOAT_ID => {
                Some(ArticleId::from(value as i64))
            }
            Self::Float(_) => None,
            Self::Text(value) => value.parse().ok(),
        }
    }
}

impl<'de> Deserialize<'de> for ArticleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        WireId::deserialize(deserializer)?
            .into_id()
            .ok_or_else(|| de::Error::custom("article id must be an integer or non-empty string"))
    }
}

/// Parses one JSON value as an article id, if it has an id shape.
pub fn id_from_json(value: &serde_json::Value) -> Option<ArticleId> {
    WireId::deserialize(value).ok().and_then(WireId::into_id)
}

/// One article positioned on the semantic map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    /// Serialized as `abstract` to match the backend record.
    #[serde(
        rename = "abstract",
        default = "default_abstract",
        deserialize_with = "deserialize_abstract"
    )]
    pub abstract_text: String,
    /// Backend emits either a list or a single author string.
    #[serde(default, deserialize_with = "deserialize_authors")]
    pub authors: Vec<String>,
    #[serde(default = "default_journal", deserialize_with = "deserialize_journal")]
    pub journal: String,
    /// `0` when the backend year is missing or unparseable.
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: i32,
    pub x: f64,
    pub y: f64,
}

impl Article {
    /// Creates an article with placeholder metadata at the given coordinates.
    pub fn new(id: impl Into<ArticleId>, title: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            abstract_text: default_abstract(),
            authors: Vec::new(),
            journal: default_journal(),
            year: 0,
            x,
            y,
        }
    }

    /// Builder-style abstract override; blank input keeps the placeholder.
    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.abstract_text = text;
        }
        self
    }

    /// Case-insensitive substring match over title and abstract.
    ///
    /// `needle_lower` must already be lowercased.
    pub fn mentions(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.abstract_text.to_lowercase().contains(needle_lower)
    }
}

fn default_abstract() -> String {
    DEFAULT_ABSTRACT.to_string()
}

fn default_journal() -> String {
    DEFAULT_JOURNAL.to_string()
}

fn deserialize_abstract<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(non_blank_or(value, DEFAULT_ABSTRACT))
}

fn deserialize_journal<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(non_blank_or(value, DEFAULT_JOURNAL))
}

fn non_blank_or(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text,
        _ => fallback.to_string(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireAuthors {
    Many(Vec<String>),
    One(String),
}

fn deserialize_authors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let authors = match Option::<WireAuthors>::deserialize(deserializer)? {
        Some(WireAuthors::Many(list)) => list,
        Some(WireAuthors::One(single)) if !single.trim().is_empty() => vec![single],
        Some(WireAuthors::One(_)) | None => Vec::new(),
    };
    Ok(authors)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireYear {
    Int(i64),
    Float(f64),
    Text(String),
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let year = match Option::<WireYear>::deserialize(deserializer) {
        Ok(Some(WireYear::Int(value))) => i32::try_from(value).unwrap_or(0),
        Ok(Some(WireYear::Float(value))) if value.is_finite() => value as i32,
        Ok(Some(WireYear::Text(text))) => text.trim().parse::<i32>().unwrap_or(0),
        // Unparseable years degrade to the placeholder instead of failing the record.
        _ => 0,
    };
    Ok(year)
}
