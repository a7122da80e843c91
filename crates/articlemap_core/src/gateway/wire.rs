//! Payload decoding for the backend wire format.
//!
//! # Responsibility
//! - Decode `/raw-data` record arrays into typed articles.
//! - Decode `{results: [...]}` envelopes into ids or legacy text labels.
//!
//! # Invariants
//! - Decoding is pure; callers map failures to `GatewayError::Response`.
//! - Result items may be bare ids or full article records.

use crate::model::article::{id_from_json, Article, ArticleId};
use serde::Deserialize;
use serde_json::Value;

/// Decoded `/raw-data` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArticles {
    pub articles: Vec<Article>,
    /// Records dropped for missing id/title or undecodable fields.
    pub skipped: usize,
}

#[derive(Deserialize)]
struct ResultsEnvelope {
    results: Vec<Value>,
}

/// Decodes a JSON array of article records.
///
/// Individual bad records are skipped and counted; a payload that is not
/// an array is an error.
pub fn decode_articles(body: &str) -> Result<DecodedArticles, String> {
    let records: Vec<Value> =
        serde_json::from_str(body).map_err(|err| format!("expected article array: {err}"))?;

    let mut articles = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for record in records {
        if !has_required_fields(&record) {
            skipped += 1;
            continue;
        }
        match serde_json::from_value::<Article>(record) {
            Ok(article) => articles.push(article),
            Err(_) => skipped += 1,
        }
    }

    Ok(DecodedArticles { articles, skipped })
}

fn has_required_fields(record: &Value) -> bool {
    let has_id = record.get("id").is_some_and(|value| !value.is_null());
    let has_title = record
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|title| !title.trim().is_empty());
    has_id && has_title
}

/// Decodes `{results: [...]}` into ranked article ids.
pub fn decode_id_results(body: &str) -> Result<Vec<ArticleId>, String> {
    let envelope = parse_envelope(body)?;
    envelope
        .results
        .iter()
        .enumerate()
        .map(|(index, item)| {
            result_item_id(item)
                .ok_or_else(|| format!("results[{index}] is neither an id nor a record with `id`"))
        })
        .collect()
}

/// Decodes `{results: [...]}` into legacy text labels.
pub fn decode_label_results(body: &str) -> Result<Vec<String>, String> {
    let envelope = parse_envelope(body)?;
    envelope
        .results
        .iter()
        .enumerate()
        .map(|(index, item)| {
            result_item_label(item).ok_or_else(|| {
                format!("results[{index}] is neither text nor a record with `title`")
            })
        })
        .collect()
}

fn parse_envelope(body: &str) -> Result<ResultsEnvelope, String> {
    serde_json::from_str(body).map_err(|err| format!("expected `{{results: [...]}}`: {err}"))
}

fn result_item_id(item: &Value) -> Option<ArticleId> {
    match item {
        Value::Object(record) => record.get("id").and_then(id_from_json),
        other => id_from_json(other),
    }
}

fn result_item_label(item: &Value) -> Option<String> {
    match item {
        Value::String(label) => Some(label.clone()),
        Value::Object(record) => record
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
