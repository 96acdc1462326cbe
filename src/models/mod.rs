// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{UserCriteria, Resource, MatchResult, NeedCategory, IncomeBracket, DEFAULT_LANGUAGE, SENIOR_AGE_RANGE};
pub use requests::{MatchRequest, CatalogQuery, CriteriaError};
pub use responses::{MatchResponse, RefreshResponse, CatalogResponse, CacheFreshness, HealthResponse, ErrorResponse};
