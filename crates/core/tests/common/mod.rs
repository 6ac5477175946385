// ═══════════════════════════════════════════════════════════════════
// Shared test helpers — scripted AI gateway and pinned market status
// ═══════════════════════════════════════════════════════════════════

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use poonji_mitra_core::errors::CoreError;
use poonji_mitra_core::models::analysis::{
    Analysis, AnalysisResponse, GroundingSource, ProbabilityRating,
};
use poonji_mitra_core::models::price::PriceMap;
use poonji_mitra_core::providers::traits::AnalysisProvider;
use poonji_mitra_core::services::market_clock::MarketStatus;

/// Gateway fake: replays scripted price results in order, then keeps
/// returning `fallback`. Counts every call.
pub struct ScriptedProvider {
    price_script: Mutex<VecDeque<Result<PriceMap, CoreError>>>,
    fallback: Mutex<Result<PriceMap, CoreError>>,
    analysis: Mutex<Result<AnalysisResponse, CoreError>>,
    delay: Option<Duration>,
    pub price_calls: AtomicUsize,
    pub analyze_calls: AtomicUsize,
    pub last_tickers: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            price_script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Ok(PriceMap::new())),
            analysis: Mutex::new(Ok(sample_response())),
            delay: None,
            price_calls: AtomicUsize::new(0),
            analyze_calls: AtomicUsize::new(0),
            last_tickers: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `prices`.
    pub fn with_prices(prices: &[(&str, f64)]) -> Self {
        let provider = Self::new();
        *provider.fallback.lock().unwrap() = Ok(price_map(prices));
        provider
    }

    /// Always fail with `error`.
    pub fn failing(error: CoreError) -> Self {
        let provider = Self::new();
        *provider.fallback.lock().unwrap() = Err(error.clone());
        *provider.analysis.lock().unwrap() = Err(error);
        provider
    }

    /// Sleep this long inside every gateway call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue one result to be returned before the fallback.
    pub fn push_prices(&self, result: Result<PriceMap, CoreError>) {
        self.price_script.lock().unwrap().push_back(result);
    }

    /// Change what `analyze` answers from now on.
    pub fn set_analysis(&self, result: Result<AnalysisResponse, CoreError>) {
        *self.analysis.lock().unwrap() = result;
    }

    pub fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn analyze(&self, _query: &str) -> Result<AnalysisResponse, CoreError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.analysis.lock().unwrap().clone()
    }

    async fn fetch_prices(&self, tickers: &[String]) -> Result<PriceMap, CoreError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_tickers.lock().unwrap() = tickers.to_vec();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.price_script.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => self.fallback.lock().unwrap().clone(),
        }
    }
}

/// Market status that can be flipped during a test.
pub struct FixedMarket {
    open: AtomicBool,
}

impl FixedMarket {
    pub fn open() -> Self {
        Self {
            open: AtomicBool::new(true),
        }
    }

    pub fn closed() -> Self {
        Self {
            open: AtomicBool::new(false),
        }
    }

    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }
}

impl MarketStatus for FixedMarket {
    fn is_market_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

pub fn price_map(prices: &[(&str, f64)]) -> PriceMap {
    prices
        .iter()
        .map(|(ticker, price)| (ticker.to_string(), *price))
        .collect()
}

pub fn sample_response() -> AnalysisResponse {
    AnalysisResponse {
        analysis: Analysis {
            stock: "TCS (NSE)".into(),
            news_summary: "Large deal win in BFSI vertical.".into(),
            technical_signals: "RSI 62, MACD bullish crossover.".into(),
            probability: ProbabilityRating::Medium,
            trader_note: "Wait and Watch above ₹3,600.".into(),
        },
        sources: vec![GroundingSource {
            uri: "https://example.com/tcs".into(),
            title: "TCS news".into(),
        }],
    }
}
