use uuid::Uuid;

use crate::models::analytics::{ClientSummary, HoldingPerformance, PortfolioSummary};
use crate::models::client::{Client, Holding};
use crate::models::portfolio::Portfolio;

/// Computes valuation figures from the prices already stored on holdings.
///
/// No fetching happens here: holdings without a price count towards the
/// invested amount but not towards market value or gain/loss.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Summary of every client plus book-wide totals.
    pub fn get_portfolio_summary(&self, portfolio: &Portfolio) -> PortfolioSummary {
        let clients: Vec<ClientSummary> = portfolio
            .clients
            .iter()
            .map(|c| self.summarize_client(c))
            .collect();

        let total_invested = clients.iter().map(|c| c.total_invested).sum();
        let total_value = clients.iter().map(|c| c.total_value).sum();
        let priced_invested = clients.iter().map(|c| c.priced_invested).sum();
        let total_gain_loss = total_value - priced_invested;

        PortfolioSummary {
            client_count: clients.len(),
            total_invested,
            total_value,
            priced_invested,
            total_gain_loss,
            total_return_pct: pct(total_gain_loss, priced_invested),
            clients,
        }
    }

    /// Summary for one client, or `None` if the id is unknown.
    pub fn get_client_summary(&self, portfolio: &Portfolio, client_id: Uuid) -> Option<ClientSummary> {
        portfolio
            .clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| self.summarize_client(c))
    }

    fn summarize_client(&self, client: &Client) -> ClientSummary {
        let holdings: Vec<HoldingPerformance> = client.holdings.iter().map(performance).collect();

        let total_invested = holdings.iter().map(|h| h.invested).sum();
        let total_value = holdings.iter().filter_map(|h| h.market_value).sum();
        let priced_invested = holdings
            .iter()
            .filter(|h| h.market_value.is_some())
            .map(|h| h.invested)
            .sum();
        let gain_loss = total_value - priced_invested;

        ClientSummary {
            client_id: client.id,
            name: client.name.clone(),
            total_invested,
            total_value,
            priced_invested,
            gain_loss,
            return_pct: pct(gain_loss, priced_invested),
            unpriced_holdings: holdings.iter().filter(|h| h.current_price.is_none()).count(),
            holdings,
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}

fn performance(holding: &Holding) -> HoldingPerformance {
    let invested = holding.invested();
    let gain_loss = holding.gain_loss();
    HoldingPerformance {
        holding_id: holding.id,
        ticker: holding.ticker.clone(),
        quantity: holding.quantity,
        buying_price: holding.buying_price,
        current_price: holding.current_price,
        invested,
        market_value: holding.market_value(),
        gain_loss,
        return_pct: gain_loss.map(|g| pct(g, invested)),
    }
}

/// Percentage of `part` over `base`; zero when the base is zero.
fn pct(part: f64, base: f64) -> f64 {
    if base.abs() > f64::EPSILON {
        part / base * 100.0
    } else {
        0.0
    }
}
