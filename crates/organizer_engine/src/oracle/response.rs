//! Tolerant decoding of oracle answers.
//!
//! Models often wrap JSON in a markdown code fence and are loose about
//! number formatting, so everything here is decoded from a generic
//! [`serde_json::Value`] rather than a strict schema.
use std::collections::BTreeMap;
use std::ops::Range;

use organizer_core::{Categorization, TagBatch};
use serde_json::Value;

use super::OracleError;

const FENCE: &str = "```";

/// Return the contents of the first fenced block, or the trimmed text when
/// there is no fence. An unterminated fence runs to the end of the text.
pub fn strip_code_fence(text: &str) -> &str {
    let Some(open) = text.find(FENCE) else {
        return text.trim();
    };
    let after_fence = &text[open + FENCE.len()..];
    let tag_len = after_fence
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after_fence.len());
    let body = &after_fence[tag_len..];
    match body.find(FENCE) {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

pub fn parse_categorization(text: &str) -> Result<Categorization, OracleError> {
    let root = parse_object(text)?;
    let categories = root
        .get("categories")
        .and_then(Value::as_object)
        .ok_or_else(|| OracleError::MalformedResponse("missing \"categories\" object".into()))?;

    let mut result = BTreeMap::new();
    for (label, indices) in categories {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        let indices: Vec<usize> = match indices {
            Value::Array(items) => items.iter().filter_map(as_index).collect(),
            single => as_index(single).into_iter().collect(),
        };
        result
            .entry(label.to_string())
            .or_insert_with(Vec::new)
            .extend(indices);
    }

    Ok(Categorization { categories: result })
}

/// Decode one tag batch. Keys outside `expected` belong to another batch
/// and are dropped.
pub fn parse_tag_batch(text: &str, expected: Range<usize>) -> Result<TagBatch, OracleError> {
    let root = parse_object(text)?;
    let tags = root
        .get("tags")
        .and_then(Value::as_object)
        .ok_or_else(|| OracleError::MalformedResponse("missing \"tags\" object".into()))?;

    let mut batch = TagBatch::default();
    for (key, value) in tags {
        let Some(index) = key_index(key, &expected) else {
            continue;
        };
        let list = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Value::String(single) => vec![single.clone()],
            _ => Vec::new(),
        };
        batch.tags.insert(index, list);
    }

    if let Some(descriptions) = root.get("descriptions").and_then(Value::as_object) {
        for (key, value) in descriptions {
            if let (Some(index), Some(text)) = (key_index(key, &expected), value.as_str()) {
                batch.descriptions.insert(index, text.to_string());
            }
        }
    }

    Ok(batch)
}

fn parse_object(text: &str) -> Result<serde_json::Map<String, Value>, OracleError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(OracleError::EmptyResponse);
    }
    match serde_json::from_str(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(OracleError::MalformedResponse("expected a JSON object".into())),
        Err(err) => Err(OracleError::MalformedResponse(err.to_string())),
    }
}

fn as_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn key_index(key: &str, expected: &Range<usize>) -> Option<usize> {
    key.trim()
        .parse::<usize>()
        .ok()
        .filter(|index| expected.contains(index))
}
