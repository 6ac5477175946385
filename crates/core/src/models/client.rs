use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single position (one lot) inside a client's portfolio.
///
/// The same ticker may appear in several holdings of one client when it was
/// bought in separate lots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Assigned at creation, never reassigned.
    pub id: Uuid,

    /// Exchange symbol as entered (e.g. "TCS", "infy"). Matched case-insensitively
    /// when prices are merged.
    pub ticker: String,

    /// Number of shares held (non-negative).
    pub quantity: f64,

    /// Cost basis per share (positive).
    pub buying_price: f64,

    /// Last successfully fetched market price. `None` until the first refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, quantity: f64, buying_price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: ticker.into(),
            quantity,
            buying_price,
            current_price: None,
        }
    }

    /// Amount paid for this lot: quantity × buying price.
    #[must_use]
    pub fn invested(&self) -> f64 {
        self.quantity * self.buying_price
    }

    /// Value at the last known market price, if one has been fetched.
    #[must_use]
    pub fn market_value(&self) -> Option<f64> {
        self.current_price.map(|p| p * self.quantity)
    }

    #[must_use]
    pub fn gain_loss(&self) -> Option<f64> {
        self.market_value().map(|v| v - self.invested())
    }
}

/// A client account and its ordered list of holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            holdings: Vec::new(),
        }
    }

    /// Builder-style helper used by seed data and tests.
    pub fn with_holding(mut self, holding: Holding) -> Self {
        self.holdings.push(holding);
        self
    }
}
