use serde::{Deserialize, Serialize};

use super::client::Client;

/// The portfolio store: every client account the desk manages.
///
/// This is the single source of truth for holdings. It is only mutated through
/// `PortfolioService`; the price refresh only annotates `current_price`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Clients in display order.
    pub clients: Vec<Client>,
}

impl Portfolio {
    pub fn new(clients: Vec<Client>) -> Self {
        Self { clients }
    }

    /// Total number of holdings across all clients.
    #[must_use]
    pub fn holding_count(&self) -> usize {
        self.clients.iter().map(|c| c.holdings.len()).sum()
    }
}
