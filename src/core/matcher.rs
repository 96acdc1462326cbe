use rand::Rng;

use crate::models::{MatchResult, Resource, UserCriteria};
use crate::core::{
    distance::zip_distance,
    filters::{derive_user_tags, is_eligible, matches_category, prefer_language},
};

/// Maximum number of resources returned per request
pub const MAX_RESULTS: usize = 5;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchOutcome {
    pub matches: Vec<MatchResult>,
    pub total_resources: usize,
    pub category_matches: usize,
    pub eligible: usize,
    pub language_narrowed: bool,
}

/// Main matching orchestrator - implements the resource pipeline
///
/// # Pipeline Stages
/// 1. Category filter
/// 2. Eligibility filter
/// 3. Language preference (soft)
/// 4. Distance annotation
/// 5. Sort and truncate
#[derive(Debug, Clone)]
pub struct Matcher {
    max_results: usize,
}

impl Matcher {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    /// Find matches using the thread-local random source for distances
    pub fn find_matches(&self, resources: &[Resource], criteria: &UserCriteria) -> MatchOutcome {
        self.find_matches_with_rng(resources, criteria, &mut rand::thread_rng())
    }

    /// Find matches for a user's criteria
    ///
    /// # Arguments
    /// * `resources` - The canonical catalog, borrowed read-only
    /// * `criteria` - The user's matching inputs
    /// * `rng` - Random source for the proximity heuristic
    ///
    /// # Returns
    /// MatchOutcome with at most `max_results` ranked matches
    pub fn find_matches_with_rng<R: Rng>(
        &self,
        resources: &[Resource],
        criteria: &UserCriteria,
        rng: &mut R,
    ) -> MatchOutcome {
        let total_resources = resources.len();

        // Stage 1: Category
        let in_category: Vec<&Resource> = resources
            .iter()
            .filter(|r| matches_category(r, criteria))
            .collect();
        let category_matches = in_category.len();

        // Stage 2: Eligibility
        let user_tags = derive_user_tags(criteria);
        let eligible: Vec<&Resource> = in_category
            .into_iter()
            .filter(|r| is_eligible(r, &user_tags))
            .collect();
        let eligible_count = eligible.len();

        // Stage 3: Language preference
        let (working, language_narrowed) = prefer_language(eligible, criteria.language());

        // Stage 4: Distance
        let mut matches: Vec<MatchResult> = working
            .into_iter()
            .map(|r| {
                let distance = zip_distance(&criteria.zip, &r.zip, rng);
                MatchResult::new(r.clone(), distance)
            })
            .collect();

        // Stage 5: Rank
        matches.sort_by(|a, b| {
            a.distance
                .cmp(&b.distance)
                .then_with(|| a.resource.name.cmp(&b.resource.name))
        });
        matches.truncate(self.max_results);

        MatchOutcome {
            matches,
            total_resources,
            category_matches,
            eligible: eligible_count,
            language_narrowed,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MAX_RESULTS)
    }
}
