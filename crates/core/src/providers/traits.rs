use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::analysis::AnalysisResponse;
use crate::models::price::PriceMap;

/// The AI gateway the dashboard core depends on.
///
/// The hosted model does both jobs: free-text stock analysis and current-price
/// lookup. Scheduling and merge logic only see this trait, so tests drive them
/// with scripted fakes and the remote implementation can be swapped freely.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Analyze a free-text stock query.
    ///
    /// Either the whole `Analysis` parses or the call fails with
    /// `CoreError::Remote`/`CoreError::Network`; partial data is never returned.
    async fn analyze(&self, query: &str) -> Result<AnalysisResponse, CoreError>;

    /// Fetch current prices for a set of distinct tickers.
    ///
    /// The map may be incomplete: a missing ticker means "no update available".
    /// An empty but well-formed answer is returned as `Ok` with an empty map;
    /// deciding that this is a soft failure is the caller's job.
    async fn fetch_prices(&self, tickers: &[String]) -> Result<PriceMap, CoreError>;
}
