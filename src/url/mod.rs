//! URL handling module for Sumi-Harvest
//!
//! This module resolves raw `href`/`src` references into dedup keys and
//! decides which resolved links stay inside the crawl's domain.

mod domain;
mod resolve;

// Re-export main functions
pub use domain::{authority, is_same_domain};
pub use resolve::{normalize_seed, resolve_reference};
