pub mod analysis;
pub mod analytics;
pub mod client;
pub mod portfolio;
pub mod price;
pub mod seed;
pub mod settings;
pub mod view;
