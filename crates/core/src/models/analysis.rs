use serde::{Deserialize, Serialize};

/// Likelihood of a significant (3–5%) intraday move, as judged by the AI service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbabilityRating {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for ProbabilityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbabilityRating::High => write!(f, "High"),
            ProbabilityRating::Medium => write!(f, "Medium"),
            ProbabilityRating::Low => write!(f, "Low"),
        }
    }
}

/// Structured stock analysis returned by the AI gateway.
///
/// Field names on the wire are camelCase, matching the JSON the model is asked to emit.
/// The content is not validated beyond its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub stock: String,
    pub news_summary: String,
    pub technical_signals: String,
    pub probability: ProbabilityRating,
    pub trader_note: String,
}

/// A web page the model cited while producing an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

impl GroundingSource {
    /// Build a source, rejecting anything that is not an absolute http(s) URL.
    pub fn parse(uri: impl Into<String>, title: impl Into<String>) -> Option<Self> {
        let uri = uri.into();
        let rest = uri
            .strip_prefix("https://")
            .or_else(|| uri.strip_prefix("http://"))?;
        let host = rest.split(['/', '?', '#']).next().unwrap_or("");
        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return None;
        }
        let title = title.into();
        let title = if title.trim().is_empty() {
            host.to_string()
        } else {
            title
        };
        Some(Self { uri, title })
    }
}

/// One successful `analyze` call: the analysis plus its ordered sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: Analysis,
    pub sources: Vec<GroundingSource>,
}
