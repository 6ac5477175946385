use log::{debug, error};

use crate::errors::CoreError;
use crate::models::analysis::AnalysisResponse;
use crate::providers::traits::AnalysisProvider;

/// Runs free-text stock queries against the AI gateway.
///
/// Does not touch the portfolio store.
pub struct AnalysisService;

impl AnalysisService {
    pub fn new() -> Self {
        Self
    }

    /// Validate the query, then ask the provider.
    ///
    /// A blank query fails with `ValidationError` before any remote call.
    pub async fn analyze(
        &self,
        provider: &dyn AnalysisProvider,
        query: &str,
    ) -> Result<AnalysisResponse, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CoreError::ValidationError("Query cannot be empty.".into()));
        }

        debug!("Requesting analysis from {} for '{query}'", provider.name());
        provider.analyze(query).await.map_err(|e| {
            error!("Analysis request to {} failed: {e}", provider.name());
            e
        })
    }
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new()
    }
}
