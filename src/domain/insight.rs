// Insight domain models
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_PLACEHOLDER: &str = "Loading AI insights...";

/// Text shown in the insights card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum InsightText {
    /// Shown until the first successful analysis response
    Placeholder(String),
    Summary(String),
    /// A successful response that carried no `ai_summary`
    Absent,
}

impl InsightText {
    pub fn display(&self) -> &str {
        match self {
            InsightText::Placeholder(text) | InsightText::Summary(text) => text,
            InsightText::Absent => "",
        }
    }
}

/// What the dashboard keeps from an analysis response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResponse {
    pub ai_summary: Option<String>,
}

impl AnalysisResponse {
    /// Any JSON shape is accepted. Only a string `ai_summary` on an object
    /// counts as a summary; everything else is absent.
    pub fn from_body(body: &Value) -> Self {
        Self {
            ai_summary: body
                .get("ai_summary")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    pub fn into_insight(self) -> InsightText {
        match self.ai_summary {
            Some(text) => InsightText::Summary(text),
            None => InsightText::Absent,
        }
    }
}
