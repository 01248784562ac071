//! Turning free-form model output into a normalized [`AiAnalysis`].

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::idea::{AiAnalysis, Recommendation};

const DEFAULT_SCORE: u8 = 5;

/// Opening braces tried before giving up on a response.
const MAX_OBJECT_CANDIDATES: usize = 32;

/// Normalized analysis plus the model's own summary, if it gave one.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnalysis {
    pub analysis: AiAnalysis,
    pub summary: Option<String>,
}

/// First well-formed JSON object in `text`. Prose and markdown fences around it are ignored.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let starts = text
        .char_indices()
        .filter(|&(_, c)| c == '{')
        .take(MAX_OBJECT_CANDIDATES);
    for (start, _) in starts {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(map))) = stream.next() {
            return Some(map);
        }
    }
    None
}

/// A 1-10 score. Missing, non-numeric or out-of-range values fall back to 5.
/// The range check applies to the raw value; only accepted values are rounded.
fn score(value: Option<&Value>) -> u8 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if (1.0..=10.0).contains(&n) => n.round() as u8,
        _ => DEFAULT_SCORE,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Normalize an extracted object. `raw` is the full response, used when no summary is given.
pub fn normalize(object: &Map<String, Value>, raw: &str, analyzed_at: DateTime<Utc>) -> ParsedAnalysis {
    let summary = non_empty_string(object.get("summary"));
    let recommendation = object
        .get("recommendation")
        .and_then(Value::as_str)
        .and_then(|r| r.parse::<Recommendation>().ok())
        .unwrap_or(Recommendation::NeedsWork);

    let analysis = AiAnalysis {
        feasibility: score(object.get("feasibility")),
        market_potential: score(object.get("marketPotential")),
        technical_complexity: score(object.get("technicalComplexity")),
        pros: string_list(object.get("pros")),
        cons: string_list(object.get("cons")),
        risks: string_list(object.get("risks")),
        recommendation,
        suggestions: string_list(object.get("suggestions")),
        full_analysis: summary.clone().unwrap_or_else(|| raw.to_string()),
        analyzed_at,
    };
    ParsedAnalysis { analysis, summary }
}

/// Extract and normalize. `UpstreamParse` carries the raw text when there is no object.
pub fn parse_analysis(raw: &str, analyzed_at: DateTime<Utc>) -> Result<ParsedAnalysis, AppError> {
    let object = extract_json_object(raw).ok_or_else(|| AppError::UpstreamParse { raw: raw.to_string() })?;
    Ok(normalize(&object, raw, analyzed_at))
}
