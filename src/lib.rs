//! Resource Navigator - matches residents with local social-service resources
//!
//! This library provides the matching core used by the navigator service:
//! a resource normalizer that turns heterogeneous catalog records into one
//! canonical shape, and a staged pipeline that filters, ranks and trims
//! those resources against a user's criteria.

pub mod catalog;
pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use catalog::{normalize, CatalogStore, CatalogSnapshot, CATALOG_TTL};
pub use crate::core::{Matcher, MatchOutcome, distance::zip_distance};
pub use models::{UserCriteria, Resource, MatchResult, NeedCategory, IncomeBracket, MatchRequest, MatchResponse};
