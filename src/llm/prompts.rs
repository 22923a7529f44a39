// Prompt text for the analysis request and the advisor chat.

use crate::error::Result;
use crate::request::{Industry, Language};
use crate::schema::AnalysisResult;
use log::warn;

pub const FORECAST_PERIODS: usize = 6;

const ADVISOR_PERSONA: &str =
    "You are a helpful and expert financial advisor for Small and Medium Enterprises (SMEs).";

const GROUNDED_DIRECTIVE: &str = "You have access to the user's financial data context provided below. \
Base every answer on that data, quote the relevant figures, and say so plainly when the data does not cover a question.";

const GENERAL_DIRECTIVE: &str = "No financial analysis has been provided yet. \
Answer general questions about small-business finance, cash flow, costs and banking, \
and suggest uploading financial data for advice tailored to the business.";

const STYLE_DIRECTIVE: &str = "Answer questions concisely and provide actionable advice.";

/// The six things every analysis must cover, in the order the backend sees them.
pub fn analysis_requirements() -> [String; 6] {
    [
        "A health score (0-100).".to_string(),
        "Key financial metrics (Gross Margin, Net Profit Margin, Current Ratio, Debt to Equity), formatted for display.".to_string(),
        "Identified risks with severity (low, medium or high).".to_string(),
        "Actionable recommendations for cost optimization, revenue growth and banking.".to_string(),
        "Extract historical trend data (monthly) from the text if available, otherwise estimate/interpolate plausible monthly data based on totals. List months in chronological order.".to_string(),
        format!(
            "Generate a {}-month forecast based on the trends, in chronological order.",
            FORECAST_PERIODS
        ),
    ]
}

/// Builds the single-shot analysis prompt.
///
/// `industry` should be one of [`Industry::ALL`]; anything else is passed to
/// the backend verbatim.
pub fn build_analysis_prompt(raw_text: &str, industry: &str, language: Language) -> String {
    if Industry::from_label(industry).is_none() {
        warn!(
            "Industry '{}' is not one of the supported industries; passing it through",
            industry
        );
    }

    let requirements = analysis_requirements()
        .iter()
        .enumerate()
        .map(|(idx, req)| format!("{}. {}", idx + 1, req))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze the following financial data for a(n) {} business.\n\
         {}\n\
         Provide a detailed assessment including:\n\
         {}\n\n\
         Financial Data:\n\
         {}",
        industry,
        language.directive(),
        requirements,
        raw_text
    )
}

/// Serializes an analysis the way it is embedded in the chat directive.
pub fn context_json(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Builds the advisor's system directive, grounded in `context` when present.
pub fn build_chat_system_prompt(context: Option<&AnalysisResult>) -> Result<String> {
    match context {
        Some(result) => Ok(format!(
            "{}\n{}\n{}\n\nContext:\n```json\n{}\n```",
            ADVISOR_PERSONA,
            GROUNDED_DIRECTIVE,
            STYLE_DIRECTIVE,
            context_json(result)?
        )),
        None => Ok(format!(
            "{}\n{}\n{}",
            ADVISOR_PERSONA, GENERAL_DIRECTIVE, STYLE_DIRECTIVE
        )),
    }
}
