pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::{Arc, RwLock};
use uuid::Uuid;

use errors::CoreError;
use models::{
    analytics::{ClientSummary, PortfolioSummary},
    client::{Client, Holding},
    portfolio::Portfolio,
    seed::initial_clients,
    settings::Settings,
    view::{AnalysisState, Tab},
};
use providers::{gemini::GeminiProvider, traits::AnalysisProvider};
use services::{
    analysis_service::AnalysisService,
    analytics_service::AnalyticsService,
    market_clock::{MarketClock, MarketStatus},
    portfolio_service::PortfolioService,
    refresh_service::{
        read_lock, write_lock, PriceRefresher, RefreshOutcome, RefreshScheduler, RefreshStatus,
        SharedPortfolio,
    },
};

/// Main entry point for the dashboard core.
///
/// Owns the portfolio store, the AI gateway, the tab selection and the
/// refresh timer. A UI shell forwards user intents to it and reads state back.
#[must_use]
pub struct Dashboard {
    settings: Settings,
    portfolio: SharedPortfolio,
    provider: Arc<dyn AnalysisProvider>,
    market: Arc<dyn MarketStatus>,
    portfolio_service: PortfolioService,
    analysis_service: AnalysisService,
    analytics_service: AnalyticsService,
    refresher: PriceRefresher,
    scheduler: RefreshScheduler,
    active_tab: Tab,
    analysis: AnalysisState,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("provider", &self.provider.name())
            .field("clients", &read_lock(&self.portfolio).clients.len())
            .field("active_tab", &self.active_tab)
            .field("refresh_active", &self.scheduler.is_active())
            .finish()
    }
}

impl Dashboard {
    /// Build a dashboard backed by Gemini and the configured market hours,
    /// seeded with the starting client book.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        let api_key = settings
            .gemini_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CoreError::Config("a Gemini API key is required".into()))?;
        let provider = Arc::new(GeminiProvider::new(api_key, settings.model.clone()));
        let market = Arc::new(MarketClock::new(&settings.market_hours)?);
        Self::with_provider(settings, provider, market, initial_clients())
    }

    /// Build a dashboard around any gateway and market status (fakes in tests,
    /// alternative backends in production).
    pub fn with_provider(
        settings: Settings,
        provider: Arc<dyn AnalysisProvider>,
        market: Arc<dyn MarketStatus>,
        clients: Vec<Client>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;

        let portfolio_service = PortfolioService::new();
        let mut portfolio = Portfolio::default();
        portfolio_service.replace_clients(&mut portfolio, clients)?;
        let portfolio: SharedPortfolio = Arc::new(RwLock::new(portfolio));

        let refresher = PriceRefresher::new(
            Arc::clone(&portfolio),
            Arc::clone(&provider),
            Arc::clone(&market),
        );
        let scheduler = RefreshScheduler::new(settings.refresh_interval());

        Ok(Self {
            settings,
            portfolio,
            provider,
            market,
            portfolio_service,
            analysis_service: AnalysisService::new(),
            analytics_service: AnalyticsService::new(),
            refresher,
            scheduler,
            active_tab: Tab::default(),
            analysis: AnalysisState::default(),
        })
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Switch views. Selecting `Portfolio` starts the refresh timer (one
    /// immediate cycle, then one per period); leaving it stops the timer.
    ///
    /// Must be called from within a tokio runtime when selecting `Portfolio`.
    pub fn select_tab(&mut self, tab: Tab) -> Result<(), CoreError> {
        match tab {
            Tab::Portfolio => self.scheduler.activate(self.refresher.clone())?,
            Tab::Analysis => self.scheduler.deactivate(),
        }
        self.active_tab = tab;
        Ok(())
    }

    #[must_use]
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// `true` while the periodic refresh task is running.
    #[must_use]
    pub fn is_refresh_timer_active(&self) -> bool {
        self.scheduler.is_active()
    }

    // ── Analysis ────────────────────────────────────────────────────

    /// Submit a free-text stock query.
    ///
    /// The outcome is also recorded in `analysis_state()`: on success the new
    /// result replaces the old one; on failure the old result is kept and a
    /// user-facing message is set.
    pub async fn submit_query(&mut self, query: &str) -> Result<(), CoreError> {
        match self
            .analysis_service
            .analyze(self.provider.as_ref(), query)
            .await
        {
            Ok(response) => {
                self.analysis.result = Some(response);
                self.analysis.error = None;
                Ok(())
            }
            Err(e) => {
                self.analysis.error = Some(match &e {
                    CoreError::ValidationError(msg) => msg.clone(),
                    other => format!("Failed to get analysis: {other}"),
                });
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn analysis_state(&self) -> &AnalysisState {
        &self.analysis
    }

    // ── Portfolio edits ─────────────────────────────────────────────

    /// Replace a client (matched by id). Unknown ids are ignored (`Ok(false)`).
    pub fn edit_client(&mut self, client: Client) -> Result<bool, CoreError> {
        let mut portfolio = write_lock(&self.portfolio);
        self.portfolio_service.update_client(&mut portfolio, client)
    }

    /// Replace one holding (matched by client and holding id).
    pub fn edit_holding(&mut self, client_id: Uuid, holding: Holding) -> Result<bool, CoreError> {
        let mut portfolio = write_lock(&self.portfolio);
        self.portfolio_service
            .update_holding(&mut portfolio, client_id, holding)
    }

    pub fn add_client(&mut self, name: &str) -> Result<Uuid, CoreError> {
        let mut portfolio = write_lock(&self.portfolio);
        self.portfolio_service.add_client(&mut portfolio, name)
    }

    pub fn add_holding(
        &mut self,
        client_id: Uuid,
        ticker: &str,
        quantity: f64,
        buying_price: f64,
    ) -> Result<Uuid, CoreError> {
        let mut portfolio = write_lock(&self.portfolio);
        self.portfolio_service
            .add_holding(&mut portfolio, client_id, ticker, quantity, buying_price)
    }

    /// Replace the whole client book. All-or-nothing.
    pub fn set_clients(&mut self, clients: Vec<Client>) -> Result<(), CoreError> {
        let mut portfolio = write_lock(&self.portfolio);
        self.portfolio_service.replace_clients(&mut portfolio, clients)
    }

    // ── Portfolio reads ─────────────────────────────────────────────

    /// Snapshot of all clients in display order.
    #[must_use]
    pub fn clients(&self) -> Vec<Client> {
        read_lock(&self.portfolio).clients.clone()
    }

    #[must_use]
    pub fn get_client(&self, client_id: Uuid) -> Option<Client> {
        read_lock(&self.portfolio)
            .clients
            .iter()
            .find(|c| c.id == client_id)
            .cloned()
    }

    /// Distinct tickers as stored, across all clients.
    #[must_use]
    pub fn distinct_tickers(&self) -> Vec<String> {
        self.portfolio_service
            .list_distinct_tickers(&read_lock(&self.portfolio))
    }

    #[must_use]
    pub fn portfolio_summary(&self) -> PortfolioSummary {
        self.analytics_service
            .get_portfolio_summary(&read_lock(&self.portfolio))
    }

    #[must_use]
    pub fn client_summary(&self, client_id: Uuid) -> Option<ClientSummary> {
        self.analytics_service
            .get_client_summary(&read_lock(&self.portfolio), client_id)
    }

    // ── Prices ──────────────────────────────────────────────────────

    /// Run one refresh cycle now, regardless of the timer.
    pub async fn manual_refresh(&self) -> RefreshOutcome {
        self.refresher.run_cycle().await
    }

    #[must_use]
    pub fn refresh_status(&self) -> RefreshStatus {
        self.refresher.status()
    }

    #[must_use]
    pub fn is_market_open(&self) -> bool {
        self.market.is_market_open()
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all clients (with holdings and last prices) as JSON.
    pub fn export_clients_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&read_lock(&self.portfolio).clients)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize clients to JSON: {e}")))
    }

    /// Replace the client book from JSON. Returns the number of clients imported.
    pub fn import_clients_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let clients: Vec<Client> = serde_json::from_str(json)?;
        let count = clients.len();
        self.set_clients(clients)?;
        Ok(count)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}
