use crate::error::{AdvisorError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Version of the analysis contract. Bump on any field addition or removal.
pub const SCHEMA_VERSION: u32 = 1;

pub const HEALTH_SCORE_MIN: f64 = 0.0;
pub const HEALTH_SCORE_MAX: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    #[schemars(
        description = "Label of the time bucket (e.g., 'Jan', '2024-03'). Samples are listed in chronological order."
    )]
    pub period: String,

    #[schemars(description = "Total revenue for the period in the currency of the source data")]
    pub revenue: f64,

    #[schemars(description = "Total expenses for the period")]
    pub expenses: f64,

    #[schemars(description = "Revenue minus expenses for the period")]
    pub profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    #[schemars(description = "How serious the risk is for the business")]
    pub severity: Severity,

    #[schemars(description = "Short headline for the risk")]
    pub title: String,

    #[schemars(description = "Explanation of the risk and where it shows up in the data")]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Cost,
    Revenue,
    Banking,
}

impl RecommendationCategory {
    pub const ALL: [RecommendationCategory; 3] = [
        RecommendationCategory::Cost,
        RecommendationCategory::Revenue,
        RecommendationCategory::Banking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationCategory::Cost => "cost",
            RecommendationCategory::Revenue => "revenue",
            RecommendationCategory::Banking => "banking",
        }
    }
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[schemars(description = "Area the recommendation targets")]
    pub category: RecommendationCategory,

    #[schemars(description = "Short headline for the recommendation")]
    pub title: String,

    #[schemars(description = "Concrete action the business owner can take")]
    pub action: String,
}

/// Presentation-ready ratios. Values are formatted strings such as "41.7%" or "1.33",
/// not raw numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[schemars(description = "Gross margin formatted for display, e.g. '41.7%'")]
    pub gross_margin: String,

    #[schemars(description = "Net profit margin formatted for display, e.g. '12.5%'")]
    pub net_profit_margin: String,

    #[schemars(description = "Current ratio formatted for display, e.g. '1.33'")]
    pub current_ratio: String,

    #[schemars(description = "Debt to equity ratio formatted for display, e.g. '0.45'")]
    pub debt_to_equity: String,
}

/// The financial-health report produced from one piece of raw financial text.
///
/// Values of this type only come out of the validator, so the score range and
/// the non-empty series hold for every instance a caller sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[schemars(description = "A score from 0 to 100 indicating financial health.")]
    #[schemars(range(min = 0, max = 100))]
    pub health_score: f64,

    #[schemars(description = "Executive summary of the financial status.")]
    pub summary: String,

    pub metrics: Metrics,

    pub risks: Vec<Risk>,

    pub recommendations: Vec<Recommendation>,

    #[schemars(
        description = "Historical monthly figures in chronological order. Extracted from the data when available, otherwise interpolated from totals."
    )]
    #[schemars(length(min = 1))]
    pub trend_data: Vec<MetricSample>,

    #[schemars(
        description = "Six forecast periods following the last trend period, in chronological order."
    )]
    #[schemars(length(min = 1))]
    pub forecast_data: Vec<MetricSample>,
}

impl AnalysisResult {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisResult)
    }

    /// The contract as a self-contained JSON Schema with every `$ref` inlined.
    pub fn json_schema() -> Value {
        let root = serde_json::to_value(Self::generate_json_schema()).unwrap_or(Value::Null);
        let definitions = root
            .get("definitions")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut inlined = inline_refs(&root, &definitions);
        if let Value::Object(map) = &mut inlined {
            map.remove("definitions");
        }
        inlined
    }

    /// The contract in the dialect accepted by the Gemini `responseSchema` field.
    pub fn response_schema() -> Value {
        to_backend_schema(&Self::json_schema())
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::json_schema())
    }

    /// Re-checks the invariants the schema alone cannot express for a typed value.
    pub fn check_invariants(&self) -> Result<()> {
        if !self.health_score.is_finite()
            || !(HEALTH_SCORE_MIN..=HEALTH_SCORE_MAX).contains(&self.health_score)
        {
            return Err(AdvisorError::schema_violation(
                "healthScore",
                format!(
                    "{} is outside [{}, {}]",
                    self.health_score, HEALTH_SCORE_MIN, HEALTH_SCORE_MAX
                ),
            ));
        }

        if self.trend_data.is_empty() {
            return Err(AdvisorError::schema_violation(
                "trendData",
                "must contain at least one sample",
            ));
        }

        if self.forecast_data.is_empty() {
            return Err(AdvisorError::schema_violation(
                "forecastData",
                "must contain at least one sample",
            ));
        }

        Ok(())
    }
}

fn inline_refs(node: &Value, definitions: &Map<String, Value>) -> Value {
    match node {
        Value::Object(map) => {
            let mut base = Map::new();

            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                let name = reference.trim_start_matches("#/definitions/");
                if let Some(Value::Object(resolved)) =
                    definitions.get(name).map(|d| inline_refs(d, definitions))
                {
                    base = resolved;
                }
            }

            // schemars wraps a documented struct field as `allOf: [{ $ref }]`
            if let Some(Value::Array(all_of)) = map.get("allOf") {
                if all_of.len() == 1 {
                    if let Value::Object(resolved) = inline_refs(&all_of[0], definitions) {
                        base.extend(resolved);
                    }
                }
            }

            for (key, value) in map {
                if key == "$ref" || (key == "allOf" && base.contains_key("type")) {
                    continue;
                }
                base.insert(key.clone(), inline_refs(value, definitions));
            }

            Value::Object(base)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| inline_refs(item, definitions))
                .collect(),
        ),
        other => other.clone(),
    }
}

const BACKEND_UNSUPPORTED_KEYS: [&str; 5] =
    ["$schema", "title", "format", "additionalProperties", "definitions"];

fn to_backend_schema(schema: &Value) -> Value {
    let Value::Object(map) = schema else {
        return schema.clone();
    };

    let mut out = Map::new();
    for (key, value) in map {
        if BACKEND_UNSUPPORTED_KEYS.contains(&key.as_str()) {
            continue;
        }

        let converted = match key.as_str() {
            "type" => match value {
                Value::String(t) => Value::String(t.to_uppercase()),
                other => other.clone(),
            },
            // property names are data, not keywords
            "properties" => match value {
                Value::Object(props) => Value::Object(
                    props
                        .iter()
                        .map(|(name, prop)| (name.clone(), to_backend_schema(prop)))
                        .collect(),
                ),
                other => other.clone(),
            },
            "items" => to_backend_schema(value),
            _ => value.clone(),
        };
        out.insert(key.clone(), converted);
    }

    Value::Object(out)
}
