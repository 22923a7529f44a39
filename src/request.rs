use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language the advisor writes prose in. Structural keys are always English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
        }
    }

    /// Sentence telling the backend which language to answer in.
    pub fn directive(&self) -> String {
        match self {
            Language::English => "Respond in English.".to_string(),
            other => format!(
                "Respond in {} where appropriate, but keep keys in English.",
                other.name()
            ),
        }
    }
}

impl FromStr for Language {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "hi" | "hindi" => Ok(Language::Hindi),
            other => Err(AdvisorError::InvalidRequest(format!(
                "Unsupported language '{}'. Expected 'en' or 'hi'",
                other
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Industries the analysis prompt is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Industry {
    Retail,
    Manufacturing,
    Services,
    Agriculture,
    Logistics,
    #[serde(rename = "E-commerce")]
    ECommerce,
}

impl Industry {
    pub const ALL: [Industry; 6] = [
        Industry::Retail,
        Industry::Manufacturing,
        Industry::Services,
        Industry::Agriculture,
        Industry::Logistics,
        Industry::ECommerce,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Industry::Retail => "Retail",
            Industry::Manufacturing => "Manufacturing",
            Industry::Services => "Services",
            Industry::Agriculture => "Agriculture",
            Industry::Logistics => "Logistics",
            Industry::ECommerce => "E-commerce",
        }
    }

    /// Case-insensitive lookup by label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|industry| industry.label().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs for one analysis call.
///
/// `industry` is kept as free text: labels outside [`Industry::ALL`] are passed
/// through to the backend unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub raw_text: String,
    pub industry: String,
    pub language: Language,
}

impl AnalysisRequest {
    pub fn new(raw_text: impl Into<String>, industry: impl Into<String>, language: Language) -> Self {
        Self {
            raw_text: raw_text.into(),
            industry: industry.into(),
            language,
        }
    }

    pub fn known_industry(&self) -> Option<Industry> {
        Industry::from_label(&self.industry)
    }
}
