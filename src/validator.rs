//! Decode-then-validate boundary for analysis payloads coming back from the
//! generative backend.
//!
//! The raw text is parsed as JSON, walked against the contract schema generated
//! from [`AnalysisResult`], decoded into the typed value and finally re-checked.
//! The first violation wins; nothing partial is ever returned.

use crate::error::{AdvisorError, Result};
use crate::schema::AnalysisResult;
use log::debug;
use serde_json::{Map, Value};

pub fn validate(raw: &str) -> Result<AnalysisResult> {
    let body = strip_fence(raw);
    if body.is_empty() {
        return Err(AdvisorError::schema_violation("$", "payload is empty"));
    }

    // Only prose-wrapped replies fall back to the outer object span. Anything
    // that already parses is validated as-is, whatever its root type.
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            let object = extract_object(body).ok_or_else(|| not_json(&e))?;
            serde_json::from_str(object).map_err(|_| not_json(&e))?
        }
    };

    validate_value(&value)
}

fn not_json(e: &serde_json::Error) -> AdvisorError {
    AdvisorError::schema_violation("$", format!("not valid JSON: {}", e))
}

pub fn validate_value(value: &Value) -> Result<AnalysisResult> {
    let schema = AnalysisResult::json_schema();
    check_node(value, &schema, "$")?;

    let result: AnalysisResult = serde_json::from_value(value.clone())
        .map_err(|e| AdvisorError::schema_violation("$", e.to_string()))?;
    result.check_invariants()?;

    debug!(
        "Validated analysis: score {}, {} risks, {} recommendations, {} trend / {} forecast samples",
        result.health_score,
        result.risks.len(),
        result.recommendations.len(),
        result.trend_data.len(),
        result.forecast_data.len()
    );

    Ok(result)
}

/// Strips a surrounding markdown code fence and its optional language tag.
/// Text without a fence is returned trimmed.
pub fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let inner = match rest.rfind("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    inner.trim()
}

/// The outermost `{ ... }` span, for replies that wrap the object in prose.
pub fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

fn child_path(path: &str, key: &str) -> String {
    if path == "$" {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn check_node(value: &Value, schema: &Value, path: &str) -> Result<()> {
    let Some(schema) = schema.as_object() else {
        return Ok(());
    };

    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        check_type(value, expected, path)?;
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            let options: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
            return Err(AdvisorError::schema_violation(
                path,
                format!("{} is not one of [{}]", value, options.join(", ")),
            ));
        }
    }

    if let Some(number) = value.as_f64() {
        check_bounds(number, schema, path)?;
    }

    match value {
        Value::Object(fields) => check_object(fields, schema, path),
        Value::Array(items) => check_array(items, schema, path),
        _ => Ok(()),
    }
}

fn check_type(value: &Value, expected: &str, path: &str) -> Result<()> {
    let matches = match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    };

    if matches {
        Ok(())
    } else {
        Err(AdvisorError::schema_violation(
            path,
            format!("expected {}, found {}", expected, type_name(value)),
        ))
    }
}

fn check_bounds(number: f64, schema: &Map<String, Value>, path: &str) -> Result<()> {
    if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
        if number < min {
            return Err(AdvisorError::schema_violation(
                path,
                format!("{} is below the minimum of {}", number, min),
            ));
        }
    }
    if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
        if number > max {
            return Err(AdvisorError::schema_violation(
                path,
                format!("{} is above the maximum of {}", number, max),
            ));
        }
    }
    Ok(())
}

fn check_object(fields: &Map<String, Value>, schema: &Map<String, Value>, path: &str) -> Result<()> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            match fields.get(key) {
                None | Some(Value::Null) => {
                    return Err(AdvisorError::schema_violation(
                        child_path(path, key),
                        "required field is missing",
                    ))
                }
                Some(_) => {}
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, property_schema) in properties {
            if let Some(field) = fields.get(key) {
                check_node(field, property_schema, &child_path(path, key))?;
            }
        }
    }

    Ok(())
}

fn check_array(items: &[Value], schema: &Map<String, Value>, path: &str) -> Result<()> {
    if let Some(min_items) = schema.get("minItems").and_then(Value::as_u64) {
        if (items.len() as u64) < min_items {
            return Err(AdvisorError::schema_violation(
                path,
                format!(
                    "expected at least {} item(s), found {}",
                    min_items,
                    items.len()
                ),
            ));
        }
    }

    if let Some(item_schema) = schema.get("items") {
        for (idx, item) in items.iter().enumerate() {
            check_node(item, item_schema, &format!("{}[{}]", path, idx))?;
        }
    }

    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(period: &str) -> Value {
        json!({ "period": period, "revenue": 90000.0, "expenses": 70000.0, "profit": 20000.0 })
    }

    fn valid_payload() -> Value {
        json!({
            "healthScore": 72,
            "summary": "Healthy growth with slowing inventory turnover.",
            "metrics": {
                "grossMargin": "41.7%",
                "netProfitMargin": "12.5%",
                "currentRatio": "1.33",
                "debtToEquity": "0.45"
            },
            "risks": [
                { "severity": "medium", "title": "Inventory", "description": "Turnover is slowing." }
            ],
            "recommendations": [
                { "category": "cost", "title": "Renegotiate", "action": "Renegotiate supplier terms." }
            ],
            "trendData": [sample("Jan"), sample("Feb")],
            "forecastData": [sample("Mar")]
        })
    }

    fn violation_field(result: Result<AnalysisResult>) -> String {
        match result {
            Err(AdvisorError::SchemaViolation { field, .. }) => field,
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_valid_payload() {
        let result = validate(&valid_payload().to_string()).unwrap();
        assert_eq!(result.health_score, 72.0);
        assert_eq!(result.trend_data.len(), 2);
        assert_eq!(result.trend_data[1].period, "Feb");
    }

    #[test]
    fn test_accepts_fenced_payload() {
        let fenced = format!("```json\n{}\n```", valid_payload());
        assert!(validate(&fenced).is_ok());

        let one_line = format!("```{}```", valid_payload());
        assert!(validate(&one_line).is_ok());

        let tagged_one_line = format!("```json {}```", valid_payload());
        assert!(validate(&tagged_one_line).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert_eq!(violation_field(validate("{\"healthScore\": 72,")), "$");
        assert_eq!(violation_field(validate("   ")), "$");
    }

    #[test]
    fn test_rejects_non_object_root() {
        let wrapped = format!("[{}]", valid_payload());
        assert_eq!(violation_field(validate(&wrapped)), "$");

        let fenced = format!("```json\n[{}]\n```", valid_payload());
        assert_eq!(violation_field(validate(&fenced)), "$");

        assert_eq!(violation_field(validate("\"72\"")), "$");
    }

    #[test]
    fn test_accepts_prose_wrapped_payload() {
        let wrapped = format!("Here is the analysis:\n{}\nLet me know.", valid_payload());
        assert_eq!(validate(&wrapped).unwrap().health_score, 72.0);
    }

    #[test]
    fn test_rejects_score_out_of_range() {
        let mut payload = valid_payload();
        payload["healthScore"] = json!(150);
        assert_eq!(violation_field(validate(&payload.to_string())), "healthScore");

        payload["healthScore"] = json!(-1);
        assert_eq!(violation_field(validate(&payload.to_string())), "healthScore");
    }

    #[test]
    fn test_score_bounds_are_inclusive() {
        let mut payload = valid_payload();
        payload["healthScore"] = json!(0);
        assert!(validate(&payload.to_string()).is_ok());
        payload["healthScore"] = json!(100);
        assert!(validate(&payload.to_string()).is_ok());
    }

    #[test]
    fn test_rejects_missing_field() {
        let mut payload = valid_payload();
        payload["metrics"].as_object_mut().unwrap().remove("currentRatio");
        assert_eq!(
            violation_field(validate(&payload.to_string())),
            "metrics.currentRatio"
        );

        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("summary");
        assert_eq!(violation_field(validate(&payload.to_string())), "summary");
    }

    #[test]
    fn test_rejects_wrong_primitive_type() {
        let mut payload = valid_payload();
        payload["healthScore"] = json!("72");
        assert_eq!(violation_field(validate(&payload.to_string())), "healthScore");

        let mut payload = valid_payload();
        payload["trendData"][1]["revenue"] = json!("85k");
        assert_eq!(
            violation_field(validate(&payload.to_string())),
            "trendData[1].revenue"
        );
    }

    #[test]
    fn test_rejects_unknown_enum_values() {
        let mut payload = valid_payload();
        payload["risks"][0]["severity"] = json!("critical");
        assert_eq!(
            violation_field(validate(&payload.to_string())),
            "risks[0].severity"
        );

        let mut payload = valid_payload();
        payload["recommendations"][0]["category"] = json!("marketing");
        assert_eq!(
            violation_field(validate(&payload.to_string())),
            "recommendations[0].category"
        );
    }

    #[test]
    fn test_rejects_empty_series() {
        let mut payload = valid_payload();
        payload["trendData"] = json!([]);
        assert_eq!(violation_field(validate(&payload.to_string())), "trendData");

        let mut payload = valid_payload();
        payload["forecastData"] = json!([]);
        assert_eq!(violation_field(validate(&payload.to_string())), "forecastData");
    }

    #[test]
    fn test_empty_risk_lists_are_allowed() {
        let mut payload = valid_payload();
        payload["risks"] = json!([]);
        payload["recommendations"] = json!([]);
        assert!(validate(&payload.to_string()).is_ok());
    }

    #[test]
    fn test_strip_fence() {
        assert_eq!(strip_fence("```json\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(strip_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_fence("```json {\"a\":1} ```"), "{\"a\":1}");
        assert_eq!(strip_fence("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_extract_object() {
        assert_eq!(extract_object("prefix {\"a\":1} suffix"), Some("{\"a\":1}"));
        assert_eq!(extract_object("no braces here"), None);
        assert_eq!(extract_object("} backwards {"), None);
    }
}
