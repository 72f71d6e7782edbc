//! Built-in data tools
//!
//! Pure data-processing tools seeded into the catalog at startup. Each
//! descriptor has a matching [`ToolHandler`] registered under the same id.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use itagent_core::{Timestamp, Tool, ToolCategory, ToolParamType, ToolParameter};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Failure raised inside a tool handler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ToolHandlerError(pub String);

impl ToolHandlerError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

type HandlerResult = Result<JsonValue, ToolHandlerError>;

/// Executes one tool. `params` has already passed schema validation and
/// has declared defaults applied.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, params: JsonValue) -> HandlerResult;
}

/// Adapter for synchronous handler functions.
struct FnHandler(fn(&JsonValue) -> HandlerResult);

#[async_trait]
impl ToolHandler for FnHandler {
    async fn call(&self, params: JsonValue) -> HandlerResult {
        (self.0)(&params)
    }
}

pub type HandlerRegistry = HashMap<String, Arc<dyn ToolHandler>>;

// ============================================================================
// REGISTRY
// ============================================================================

/// Handlers for every built-in tool, keyed by tool id.
pub fn builtin_handlers() -> HandlerRegistry {
    let table: [(&str, fn(&JsonValue) -> HandlerResult); 7] = [
        ("data-parse-json", parse_json),
        ("data-stringify-json", stringify_json),
        ("data-format-date", format_date),
        ("data-calculate-stats", calculate_stats),
        ("data-get-object-value", get_object_value),
        ("data-csv-to-json", csv_to_json),
        ("data-json-to-csv", json_to_csv),
    ];
    table
        .into_iter()
        .map(|(id, f)| (id.to_string(), Arc::new(FnHandler(f)) as Arc<dyn ToolHandler>))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn builtin(
    id: &str,
    name: &str,
    description: &str,
    tags: &[&str],
    parameters: Vec<ToolParameter>,
    return_type: &str,
    example: &str,
    now: Timestamp,
) -> Tool {
    Tool {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category: ToolCategory::Analysis,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        is_builtin: true,
        enabled: true,
        parameters,
        return_type: Some(return_type.to_string()),
        examples: vec![example.to_string()],
        created_at: now,
        updated_at: now,
    }
}

/// Catalog descriptors for the built-in tools.
pub fn builtin_tools(now: Timestamp) -> Vec<Tool> {
    use ToolParamType as P;

    vec![
        builtin(
            "data-parse-json",
            "Parse JSON",
            "Parse a JSON string into a value",
            &["json", "parse", "data"],
            vec![ToolParameter::required("jsonString", P::String, "JSON text")],
            "Parsed value",
            r#"{"jsonString": "{\"name\":\"Ada\",\"age\":36}"}"#,
            now,
        ),
        builtin(
            "data-stringify-json",
            "Stringify JSON",
            "Serialize a value to a JSON string",
            &["json", "stringify", "data"],
            vec![
                ToolParameter::required("data", P::Object, "Value to serialize"),
                ToolParameter::optional("pretty", P::Boolean, "Indent the output", Some(json!(false))),
            ],
            "JSON string",
            r#"{"data": {"name": "Ada"}, "pretty": true}"#,
            now,
        ),
        builtin(
            "data-format-date",
            "Format date",
            "Format a date using YYYY, MM, DD, HH, mm and ss tokens",
            &["date", "format", "data"],
            vec![
                ToolParameter::required("date", P::String, "RFC 3339 timestamp or YYYY-MM-DD date"),
                ToolParameter::optional(
                    "format",
                    P::String,
                    "Pattern such as \"YYYY-MM-DD HH:mm:ss\"",
                    Some(json!("YYYY-MM-DD")),
                ),
            ],
            "Formatted date string",
            r#"{"date": "2024-04-01", "format": "DD/MM/YYYY"}"#,
            now,
        ),
        builtin(
            "data-calculate-stats",
            "Calculate statistics",
            "Basic statistics over an array of numbers",
            &["statistics", "math", "analysis"],
            vec![ToolParameter::required("arr", P::Array, "Numbers")],
            "count, sum, mean, median, min, max, range and stdDev",
            r#"{"arr": [1, 2, 3, 4, 5]}"#,
            now,
        ),
        builtin(
            "data-get-object-value",
            "Get object value",
            "Read a nested value by dotted path",
            &["object", "path", "data"],
            vec![
                ToolParameter::required("obj", P::Object, "Object to read"),
                ToolParameter::required("path", P::String, "Dotted path such as \"user.profile.name\""),
                ToolParameter::optional("defaultValue", P::String, "Returned when the path is absent", None),
            ],
            "Value at the path, or the default",
            r#"{"obj": {"user": {"name": "Ada"}}, "path": "user.name"}"#,
            now,
        ),
        builtin(
            "data-csv-to-json",
            "CSV to JSON",
            "Convert CSV text into an array of objects keyed by the header row",
            &["csv", "json", "convert"],
            vec![
                ToolParameter::required("csvString", P::String, "CSV text with a header row"),
                ToolParameter::optional("delimiter", P::String, "Field delimiter", Some(json!(","))),
            ],
            "Array of objects",
            r#"{"csvString": "name,age\nAda,36\nAlan,41"}"#,
            now,
        ),
        builtin(
            "data-json-to-csv",
            "JSON to CSV",
            "Convert an array of objects into CSV text",
            &["json", "csv", "convert"],
            vec![
                ToolParameter::required("data", P::Array, "Array of objects"),
                ToolParameter::optional("delimiter", P::String, "Field delimiter", Some(json!(","))),
            ],
            "CSV text",
            r#"{"data": [{"name": "Ada", "age": 36}]}"#,
            now,
        ),
    ]
}

// ============================================================================
// HANDLERS
// ============================================================================

fn str_param<'a>(params: &'a JsonValue, name: &str) -> Result<&'a str, ToolHandlerError> {
    params
        .get(name)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| ToolHandlerError::new(format!("Parameter '{}' must be a string", name)))
}

fn delimiter(params: &JsonValue) -> Result<String, ToolHandlerError> {
    let delimiter = params.get("delimiter").and_then(JsonValue::as_str).unwrap_or(",");
    if delimiter.is_empty() {
        return Err(ToolHandlerError::new("Delimiter cannot be empty"));
    }
    Ok(delimiter.to_string())
}

fn parse_json(params: &JsonValue) -> HandlerResult {
    let raw = str_param(params, "jsonString")?;
    serde_json::from_str(raw)
        .map_err(|e| ToolHandlerError::new(format!("JSON parse failed: {}", e)))
}

fn stringify_json(params: &JsonValue) -> HandlerResult {
    let data = params.get("data").unwrap_or(&JsonValue::Null);
    let pretty = params.get("pretty").and_then(JsonValue::as_bool).unwrap_or(false);
    let text = if pretty {
        serde_json::to_string_pretty(data)
    } else {
        serde_json::to_string(data)
    }
    .map_err(|e| ToolHandlerError::new(format!("JSON stringify failed: {}", e)))?;
    Ok(JsonValue::String(text))
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn format_date(params: &JsonValue) -> HandlerResult {
    let raw = str_param(params, "date")?;
    let pattern = params
        .get("format")
        .and_then(JsonValue::as_str)
        .unwrap_or("YYYY-MM-DD");
    let date = parse_date(raw).ok_or_else(|| ToolHandlerError::new(format!("Invalid date: {}", raw)))?;

    // Each token is replaced once, in this order.
    let tokens = [
        ("YYYY", date.format("%Y").to_string()),
        ("MM", date.format("%m").to_string()),
        ("DD", date.format("%d").to_string()),
        ("HH", date.format("%H").to_string()),
        ("mm", date.format("%M").to_string()),
        ("ss", date.format("%S").to_string()),
    ];
    let formatted = tokens
        .iter()
        .fold(pattern.to_string(), |acc, (token, value)| acc.replacen(token, value, 1));
    Ok(JsonValue::String(formatted))
}

fn calculate_stats(params: &JsonValue) -> HandlerResult {
    let values = params
        .get("arr")
        .and_then(JsonValue::as_array)
        .filter(|arr| !arr.is_empty())
        .ok_or_else(|| ToolHandlerError::new("Input must be a non-empty array"))?
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| ToolHandlerError::new("Array must contain only numbers"))
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let count = values.len() as f64;
    let sum: f64 = values.iter().sum();
    let mean = sum / count;
    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;

    Ok(json!({
        "count": values.len(),
        "sum": sum,
        "mean": mean,
        "median": median,
        "min": min,
        "max": max,
        "range": max - min,
        "stdDev": variance.sqrt(),
    }))
}

fn get_object_value(params: &JsonValue) -> HandlerResult {
    let path = str_param(params, "path")?;
    let fallback = params.get("defaultValue").cloned().unwrap_or(JsonValue::Null);
    let mut current = params.get("obj").unwrap_or(&JsonValue::Null);
    for key in path.split('.') {
        match current.get(key) {
            Some(next) if !next.is_null() => current = next,
            _ => return Ok(fallback),
        }
    }
    Ok(current.clone())
}

fn csv_to_json(params: &JsonValue) -> HandlerResult {
    let raw = str_param(params, "csvString")?;
    let delimiter = delimiter(params)?;
    let mut lines = raw.lines();
    let headers: Vec<String> = lines
        .next()
        .map(|header| header.split(delimiter.as_str()).map(|h| h.trim().to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();
    if headers.is_empty() || rows.is_empty() {
        return Err(ToolHandlerError::new(
            "CSV needs a header row and at least one data row",
        ));
    }

    let records = rows
        .into_iter()
        .map(|line| {
            let values: Vec<&str> = line.split(delimiter.as_str()).collect();
            let record: Map<String, JsonValue> = headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = values.get(i).map(|v| v.trim()).unwrap_or("");
                    (header.clone(), JsonValue::String(value.to_string()))
                })
                .collect();
            JsonValue::Object(record)
        })
        .collect();
    Ok(JsonValue::Array(records))
}

fn csv_cell(value: Option<&JsonValue>, delimiter: &str) -> String {
    let text = match value {
        None | Some(JsonValue::Null) => return String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if text.contains(delimiter) || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

fn json_to_csv(params: &JsonValue) -> HandlerResult {
    let delimiter = delimiter(params)?;
    let rows = params
        .get("data")
        .and_then(JsonValue::as_array)
        .filter(|arr| !arr.is_empty())
        .ok_or_else(|| ToolHandlerError::new("Input must be a non-empty array"))?;

    let mut headers: Vec<&str> = Vec::new();
    for row in rows {
        let object = row
            .as_object()
            .ok_or_else(|| ToolHandlerError::new("Array must contain only objects"))?;
        for key in object.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let mut lines = vec![headers.join(&delimiter)];
    lines.extend(rows.iter().map(|row| {
        headers
            .iter()
            .map(|h| csv_cell(row.get(*h), &delimiter))
            .collect::<Vec<_>>()
            .join(&delimiter)
    }));
    Ok(JsonValue::String(lines.join("\n")))
}
