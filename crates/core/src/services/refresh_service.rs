use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;
use crate::models::price::normalize_price_map;
use crate::providers::traits::AnalysisProvider;
use crate::services::market_clock::MarketStatus;
use crate::services::portfolio_service::PortfolioService;

/// Message shown when the gateway answers but has no prices at all.
pub const EMPTY_PRICES_MESSAGE: &str = "AI did not return any price data. Please try again.";

/// The portfolio store, shared between the facade and the refresh task.
///
/// The lock is never held across an `.await`.
pub type SharedPortfolio = Arc<RwLock<Portfolio>>;

/// Where the refresh workflow currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RefreshState {
    #[default]
    Idle,
    CheckingMarket,
    Fetching,
    /// Last cycle failed; the next tick or a manual refresh retries.
    Error(String),
}

/// Snapshot of the refresh workflow for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStatus {
    pub state: RefreshState,

    /// When prices were last merged into the store.
    pub last_updated: Option<DateTime<Utc>>,

    /// User-facing message of the last failure, cleared when a fetch starts.
    pub last_error: Option<String>,
}

impl RefreshStatus {
    /// `true` while a gateway call is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state == RefreshState::Fetching
    }
}

/// Result of one refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Market closed: nothing fetched, nothing reported.
    MarketClosed,
    /// The store holds no tickers.
    NoTickers,
    /// Prices were merged; `holdings_updated` holdings received a price.
    Updated { holdings_updated: usize },
    /// Gateway failure or empty result; the store is unchanged.
    Failed(CoreError),
}

/// Runs single price-refresh cycles against the shared store.
///
/// Cheap to clone: all fields are shared handles, so the scheduler task and
/// the facade's manual refresh drive the same state.
#[derive(Clone)]
pub struct PriceRefresher {
    portfolio: SharedPortfolio,
    status: Arc<RwLock<RefreshStatus>>,
    provider: Arc<dyn AnalysisProvider>,
    market: Arc<dyn MarketStatus>,
    portfolio_service: Arc<PortfolioService>,
}

impl PriceRefresher {
    pub fn new(
        portfolio: SharedPortfolio,
        provider: Arc<dyn AnalysisProvider>,
        market: Arc<dyn MarketStatus>,
    ) -> Self {
        Self {
            portfolio,
            status: Arc::new(RwLock::new(RefreshStatus::default())),
            provider,
            market,
            portfolio_service: Arc::new(PortfolioService::new()),
        }
    }

    #[must_use]
    pub fn status(&self) -> RefreshStatus {
        read_lock(&self.status).clone()
    }

    /// One refresh cycle: market check → ticker collection → fetch → merge.
    ///
    /// Never returns an error: failures are recorded in the status and handed
    /// back as `RefreshOutcome::Failed`. If this future is dropped while the
    /// gateway call is pending, the result is discarded and the state returns
    /// to `Idle`.
    pub async fn run_cycle(&self) -> RefreshOutcome {
        self.set_state(RefreshState::CheckingMarket);

        if !self.market.is_market_open() {
            info!("Market is closed. Skipping price refresh.");
            self.set_state(RefreshState::Idle);
            return RefreshOutcome::MarketClosed;
        }

        let tickers = {
            let portfolio = read_lock(&self.portfolio);
            self.portfolio_service.list_distinct_tickers(&portfolio)
        };
        if tickers.is_empty() {
            debug!("No holdings to price, refresh skipped");
            self.set_state(RefreshState::Idle);
            return RefreshOutcome::NoTickers;
        }

        {
            let mut status = write_lock(&self.status);
            status.state = RefreshState::Fetching;
            status.last_error = None;
        }
        debug!(
            "Fetching prices for {} tickers from {}",
            tickers.len(),
            self.provider.name()
        );

        let mut in_flight = InFlight::new(&self.status);
        let result = self.provider.fetch_prices(&tickers).await;
        in_flight.finish();

        let prices = result.and_then(|raw| {
            let prices = normalize_price_map(raw);
            if prices.is_empty() {
                Err(CoreError::EmptyResult(EMPTY_PRICES_MESSAGE.into()))
            } else {
                Ok(prices)
            }
        });

        match prices {
            Ok(prices) => {
                let holdings_updated = {
                    let mut portfolio = write_lock(&self.portfolio);
                    self.portfolio_service
                        .apply_price_updates(&mut portfolio, &prices)
                };
                let mut status = write_lock(&self.status);
                status.state = RefreshState::Idle;
                status.last_updated = Some(Utc::now());
                status.last_error = None;
                info!(
                    "Refreshed {} prices, {holdings_updated} holdings updated",
                    prices.len()
                );
                RefreshOutcome::Updated { holdings_updated }
            }
            Err(e) => {
                if matches!(e, CoreError::EmptyResult(_)) {
                    warn!("Price refresh returned no data");
                } else {
                    error!("Failed to fetch prices: {e}");
                }
                let message = e.to_string();
                let mut status = write_lock(&self.status);
                status.state = RefreshState::Error(message.clone());
                status.last_error = Some(message);
                RefreshOutcome::Failed(e)
            }
        }
    }

    fn set_state(&self, state: RefreshState) {
        write_lock(&self.status).state = state;
    }
}

/// Puts the status back to `Idle` if a fetch is abandoned mid-flight
/// (the cycle future was dropped, e.g. the scheduler was deactivated).
struct InFlight<'a> {
    status: &'a RwLock<RefreshStatus>,
    done: bool,
}

impl<'a> InFlight<'a> {
    fn new(status: &'a RwLock<RefreshStatus>) -> Self {
        Self {
            status,
            done: false,
        }
    }

    fn finish(&mut self) {
        self.done = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let mut status = write_lock(self.status);
        if status.state == RefreshState::Fetching {
            debug!("Price fetch abandoned, result will be discarded");
            status.state = RefreshState::Idle;
        }
    }
}

/// Owns the periodic refresh task of the portfolio view.
///
/// `activate` runs one cycle immediately and then one per `period`;
/// `deactivate` (or dropping the scheduler) aborts the task, discarding any
/// in-flight fetch. Ticks run their cycles one after another; a tick that
/// falls due while a cycle is still running is skipped.
pub struct RefreshScheduler {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(period: Duration) -> Self {
        Self { period, task: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start the timer. No-op if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn activate(&mut self, refresher: PriceRefresher) -> Result<(), CoreError> {
        if self.is_active() {
            return Ok(());
        }
        if self.period.is_zero() {
            return Err(CoreError::Config("refresh period must be greater than zero".into()));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CoreError::NoRuntime)?;

        let period = self.period;
        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                // First tick completes immediately.
                ticker.tick().await;
                refresher.run_cycle().await;
            }
        });

        debug!("Price refresh timer started ({}s period)", period.as_secs_f64());
        self.task = Some(task);
        Ok(())
    }

    /// Stop the timer. Safe to call when not running.
    pub fn deactivate(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Price refresh timer stopped");
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Read a lock, recovering the data if a writer panicked. The guarded values are
/// plain data that stay consistent between statements.
pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
