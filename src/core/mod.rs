// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;

pub use distance::{zip_distance, shares_prefix};
pub use filters::{matches_category, derive_user_tags, is_eligible, supports_language, prefer_language};
pub use matcher::{Matcher, MatchOutcome, MAX_RESULTS};
