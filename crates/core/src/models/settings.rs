use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Default Gemini model used for both analysis and price lookups.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default period between automatic price refreshes.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// Runtime configuration for the dashboard core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Key for the hosted model. Without one, only fake/injected providers can be used.
    pub gemini_api_key: Option<String>,

    /// Model name passed to `generateContent`.
    pub model: String,

    /// Seconds between automatic refreshes while the portfolio view is open.
    pub refresh_interval_secs: u64,

    /// Trading session used to gate refreshes.
    pub market_hours: MarketHours,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            market_hours: MarketHours::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults overlaid with environment variables:
    /// `GEMINI_API_KEY` (or `API_KEY`), `POONJI_MODEL`, `POONJI_REFRESH_SECS`.
    pub fn from_env() -> Result<Self, CoreError> {
        let mut settings = Settings::default();

        settings.gemini_api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());

        if let Ok(model) = std::env::var("POONJI_MODEL") {
            if !model.trim().is_empty() {
                settings.model = model.trim().to_string();
            }
        }

        if let Ok(secs) = std::env::var("POONJI_REFRESH_SECS") {
            settings.refresh_interval_secs = secs.trim().parse().map_err(|_| {
                CoreError::Config(format!("POONJI_REFRESH_SECS must be a whole number, got '{secs}'"))
            })?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Check the values that cannot be expressed in the type system.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.refresh_interval_secs == 0 {
            return Err(CoreError::Config(
                "refresh_interval_secs must be greater than zero".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(CoreError::Config("model must not be empty".into()));
        }
        self.market_hours.validate()
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_interval_secs)
    }
}

/// Weekly trading session in exchange-local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketHours {
    /// IANA timezone name of the exchange.
    pub timezone: String,

    /// Session open, "HH:MM", inclusive.
    pub open: String,

    /// Session close, "HH:MM", exclusive.
    pub close: String,

    pub trading_days: Vec<Weekday>,

    /// Exchange holidays (local dates) on which the market stays closed.
    pub holidays: Vec<NaiveDate>,
}

impl Default for MarketHours {
    /// NSE cash market: Mon–Fri 09:15–15:30 IST.
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
            open: "09:15".to_string(),
            close: "15:30".to_string(),
            trading_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            holidays: Vec::new(),
        }
    }
}

impl MarketHours {
    pub fn validate(&self) -> Result<(), CoreError> {
        crate::services::market_clock::MarketClock::new(self).map(|_| ())
    }
}
