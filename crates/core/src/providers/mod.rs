pub mod traits;

// AI gateway implementations
pub mod gemini;
