// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Routes: /, /health, /api/analytics/track
// Middleware: None

pub mod analytics;
pub mod root;

pub use analytics::track as analytics_track;
pub use root::{health, root};
