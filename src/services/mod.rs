// Service exports
pub mod action_plan;
pub mod cache;
pub mod postgres;
pub mod remote;
pub mod source;

pub use action_plan::{ActionPlanGenerator, ActionPlanService, ActionPlanError, LlmPlanGenerator, TemplatePlanGenerator};
pub use cache::{CacheManager, CacheKey, CacheStats};
pub use postgres::PostgresCatalog;
pub use remote::RemoteCatalogClient;
pub use source::{CatalogSource, SourceError, SourceKind, StaticFileSource, UnavailableSource, extract_records};
