use std::collections::HashSet;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::client::{Client, Holding};
use crate::models::portfolio::Portfolio;
use crate::models::price::PriceMap;

/// Operations on the portfolio store: edits, price merges, ticker collection.
///
/// Works on a borrowed `Portfolio`; locking is the caller's job.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Replace the client with the same id, in place.
    ///
    /// Returns `Ok(false)` when no client has that id (nothing changes).
    /// Holdings are validated before anything is replaced.
    pub fn update_client(&self, portfolio: &mut Portfolio, client: Client) -> Result<bool, CoreError> {
        for holding in &client.holdings {
            Self::validate_holding(holding)?;
        }
        match portfolio.clients.iter_mut().find(|c| c.id == client.id) {
            Some(slot) => {
                *slot = client;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace one holding of one client, matched by ids.
    ///
    /// Returns `Ok(false)` when either id is unknown.
    pub fn update_holding(
        &self,
        portfolio: &mut Portfolio,
        client_id: Uuid,
        holding: Holding,
    ) -> Result<bool, CoreError> {
        Self::validate_holding(&holding)?;
        let slot = portfolio
            .clients
            .iter_mut()
            .find(|c| c.id == client_id)
            .and_then(|c| c.holdings.iter_mut().find(|h| h.id == holding.id));
        match slot {
            Some(slot) => {
                *slot = holding;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Append a new client with no holdings. Returns its id.
    pub fn add_client(&self, portfolio: &mut Portfolio, name: &str) -> Result<Uuid, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError(
                "Client name cannot be empty.".into(),
            ));
        }
        let client = Client::new(name);
        let id = client.id;
        portfolio.clients.push(client);
        Ok(id)
    }

    /// Append a new lot to a client. Returns the holding id.
    pub fn add_holding(
        &self,
        portfolio: &mut Portfolio,
        client_id: Uuid,
        ticker: &str,
        quantity: f64,
        buying_price: f64,
    ) -> Result<Uuid, CoreError> {
        let holding = Holding::new(ticker.trim(), quantity, buying_price);
        Self::validate_holding(&holding)?;

        let client = portfolio
            .clients
            .iter_mut()
            .find(|c| c.id == client_id)
            .ok_or_else(|| CoreError::ClientNotFound(client_id.to_string()))?;
        let id = holding.id;
        client.holdings.push(holding);
        Ok(id)
    }

    /// Replace the whole client list (e.g. after an import).
    /// All clients are validated first; on any error the store is left unchanged.
    pub fn replace_clients(&self, portfolio: &mut Portfolio, clients: Vec<Client>) -> Result<(), CoreError> {
        let mut ids = HashSet::new();
        for client in &clients {
            if !ids.insert(client.id) {
                return Err(CoreError::ValidationError(format!(
                    "Duplicate client id {}",
                    client.id
                )));
            }
            let mut holding_ids = HashSet::new();
            for holding in &client.holdings {
                if !holding_ids.insert(holding.id) {
                    return Err(CoreError::ValidationError(format!(
                        "Duplicate holding id {} for client {}",
                        holding.id, client.name
                    )));
                }
                Self::validate_holding(holding)?;
            }
        }
        portfolio.clients = clients;
        Ok(())
    }

    /// Merge fetched prices into every holding of every client.
    ///
    /// Each holding looks up `prices[uppercase(ticker)]`: a hit replaces
    /// `current_price`, a miss leaves the previous value (or `None`) untouched.
    /// Returns how many holdings received a price. Applying the same map twice
    /// is the same as applying it once.
    pub fn apply_price_updates(&self, portfolio: &mut Portfolio, prices: &PriceMap) -> usize {
        let mut updated = 0;
        for holding in portfolio
            .clients
            .iter_mut()
            .flat_map(|c| c.holdings.iter_mut())
        {
            if let Some(&price) = prices.get(&holding.ticker.trim().to_uppercase()) {
                holding.current_price = Some(price);
                updated += 1;
            }
        }
        updated
    }

    /// Every stored ticker across all clients, deduplicated exactly as stored
    /// ("infy" and "INFY" are two entries), in first-seen order.
    pub fn list_distinct_tickers(&self, portfolio: &Portfolio) -> Vec<String> {
        let mut seen = HashSet::new();
        portfolio
            .clients
            .iter()
            .flat_map(|c| c.holdings.iter())
            .filter(|h| !h.ticker.trim().is_empty())
            .filter(|h| seen.insert(h.ticker.as_str()))
            .map(|h| h.ticker.clone())
            .collect()
    }

    /// Validate a holding before it enters the store.
    ///
    /// Rules:
    /// - Ticker must not be blank
    /// - Quantity must be finite and non-negative
    /// - Buying price must be finite and positive
    /// - A current price, if present, must be finite and positive
    fn validate_holding(holding: &Holding) -> Result<(), CoreError> {
        if holding.ticker.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Ticker cannot be empty.".into(),
            ));
        }
        if !holding.quantity.is_finite() || holding.quantity < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Quantity for {} must be zero or more, got {}",
                holding.ticker, holding.quantity
            )));
        }
        if !holding.buying_price.is_finite() || holding.buying_price <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Buying price for {} must be positive, got {}",
                holding.ticker, holding.buying_price
            )));
        }
        if let Some(price) = holding.current_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Current price for {} must be positive, got {price}",
                    holding.ticker
                )));
            }
        }
        Ok(())
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
