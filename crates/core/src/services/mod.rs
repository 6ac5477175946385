pub mod analysis_service;
pub mod analytics_service;
pub mod market_clock;
pub mod portfolio_service;
pub mod refresh_service;
