use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Valuation of the whole book (all clients) at the last known prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Number of clients in the store
    pub client_count: usize,

    /// Sum of every client's invested amount
    pub total_invested: f64,

    /// Sum of every client's market value (priced holdings only)
    pub total_value: f64,

    /// Invested amount of the holdings that have a price, so gain/loss compares like with like
    pub priced_invested: f64,

    /// total_value - priced_invested
    pub total_gain_loss: f64,

    /// (total_gain_loss / priced_invested) * 100, or 0 when nothing is priced
    pub total_return_pct: f64,

    /// Per-client breakdown, in store order
    pub clients: Vec<ClientSummary>,
}

/// Valuation of a single client's holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub client_id: Uuid,
    pub name: String,

    /// quantity × buying price, summed over all holdings
    pub total_invested: f64,

    /// quantity × current price, summed over holdings that have a price
    pub total_value: f64,

    /// Invested amount restricted to priced holdings
    pub priced_invested: f64,

    pub gain_loss: f64,

    pub return_pct: f64,

    /// Holdings still waiting for their first price
    pub unpriced_holdings: usize,

    pub holdings: Vec<HoldingPerformance>,
}

/// Performance of one lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingPerformance {
    pub holding_id: Uuid,
    pub ticker: String,
    pub quantity: f64,
    pub buying_price: f64,
    pub current_price: Option<f64>,
    pub invested: f64,
    pub market_value: Option<f64>,
    pub gain_loss: Option<f64>,
    pub return_pct: Option<f64>,
}
