use super::client::{Client, Holding};

/// Starting book loaded when the dashboard is created without saved data.
///
/// Identifiers are freshly generated on every call; prices start unknown.
pub fn initial_clients() -> Vec<Client> {
    vec![
        Client::new("Aarav Mehta")
            .with_holding(Holding::new("RELIANCE", 50.0, 2450.0))
            .with_holding(Holding::new("TCS", 20.0, 3400.0))
            .with_holding(Holding::new("HDFCBANK", 75.0, 1520.0)),
        Client::new("Priya Sharma")
            .with_holding(Holding::new("INFY", 120.0, 1410.0))
            .with_holding(Holding::new("ICICIBANK", 90.0, 960.0))
            .with_holding(Holding::new("TATAMOTORS", 200.0, 640.0)),
        Client::new("Rohan Iyer")
            .with_holding(Holding::new("SBIN", 300.0, 590.0))
            .with_holding(Holding::new("BHARTIARTL", 60.0, 1180.0))
            .with_holding(Holding::new("TCS", 10.0, 3650.0)),
    ]
}
