use serde::{Deserialize, Serialize};

use super::analysis::AnalysisResponse;

/// Which dashboard view is selected. Price refresh only runs on `Portfolio`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Analysis,
    Portfolio,
}

/// What the analysis view shows: the last good result and/or an error message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisState {
    /// Last successful analysis. A failed request leaves it as it was.
    pub result: Option<AnalysisResponse>,

    /// User-facing message from the last request, cleared on success.
    pub error: Option<String>,
}
