// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (provider bearer token) → Family (bearer + X-Family-Token)
//
pub mod public;    // Tier 1: No authentication required
pub mod protected; // Tier 2: Provider token required (/api/projects, /api/family/members, ...)
pub mod family;    // Tier 3: Provider token + family session (/api/family/:member/*)

pub mod utils;
