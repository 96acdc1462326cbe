use std::collections::HashSet;

use crate::models::{Resource, UserCriteria, SENIOR_AGE_RANGE};

pub const TAG_LOW_INCOME: &str = "low_income";
pub const TAG_SENIOR: &str = "senior";
pub const TAG_PARENT: &str = "parent";

/// Check if a resource serves the requested category
///
/// Stage 1 of the pipeline. Exact match against the canonical category.
#[inline]
pub fn matches_category(resource: &Resource, criteria: &UserCriteria) -> bool {
    resource.category == criteria.primary_need.as_str()
}

/// Derive the eligibility tags a user qualifies for
///
/// `parent` is a proxy for "may have dependents" and fires for any
/// household larger than one.
pub fn derive_user_tags(criteria: &UserCriteria) -> HashSet<&'static str> {
    let mut tags = HashSet::new();

    if criteria.income_bracket.is_some_and(|b| b.is_low_income()) {
        tags.insert(TAG_LOW_INCOME);
    }
    if criteria.age_range == SENIOR_AGE_RANGE {
        tags.insert(TAG_SENIOR);
    }
    if criteria.household_size > 1 {
        tags.insert(TAG_PARENT);
    }

    tags
}

/// Check if a user is eligible for a resource
///
/// Stage 2 of the pipeline. Only excludes when both tag sets are
/// non-empty and disjoint.
#[inline]
pub fn is_eligible(resource: &Resource, user_tags: &HashSet<&'static str>) -> bool {
    if resource.eligibility_tags.is_empty() || user_tags.is_empty() {
        return true;
    }

    resource
        .eligibility_tags
        .iter()
        .any(|tag| user_tags.contains(tag.as_str()))
}

/// Check if a resource offers service in the given language
///
/// A resource with no listed languages is treated as supporting all of them.
#[inline]
pub fn supports_language(resource: &Resource, language: &str) -> bool {
    if resource.languages.is_empty() {
        return true;
    }

    let wanted = language.trim().to_lowercase();
    resource
        .languages
        .iter()
        .any(|l| l.trim().to_lowercase() == wanted)
}

/// Apply the soft language preference
///
/// Stage 3 of the pipeline. Narrows to resources supporting `language`
/// unless that would leave nothing, in which case the input is kept.
/// Returns whether the set was narrowed.
pub fn prefer_language<'a>(candidates: Vec<&'a Resource>, language: &str) -> (Vec<&'a Resource>, bool) {
    let preferred: Vec<&Resource> = candidates
        .iter()
        .copied()
        .filter(|r| supports_language(r, language))
        .collect();

    if preferred.is_empty() {
        (candidates, false)
    } else {
        let narrowed = preferred.len() < candidates.len();
        (preferred, narrowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncomeBracket, NeedCategory};

    fn create_test_resource(category: &str, tags: &[&str], languages: &[&str]) -> Resource {
        Resource {
            id: "test_resource".to_string(),
            name: "Test Resource".to_string(),
            category: category.to_string(),
            address: "1 Main St, Oakland, CA 94601".to_string(),
            zip: "94601".to_string(),
            hours: "Mon-Fri 9-5".to_string(),
            phone: "510-555-0100".to_string(),
            website: String::new(),
            eligibility_notes: String::new(),
            eligibility_tags: tags.iter().map(|t| t.to_string()).collect(),
            languages: languages.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn create_test_criteria() -> UserCriteria {
        UserCriteria {
            zip: "94601".to_string(),
            age_range: "30-40".to_string(),
            income_bracket: Some(IncomeBracket::Moderate),
            household_size: 1,
            primary_need: NeedCategory::Food,
            preferred_language: None,
        }
    }

    #[test]
    fn test_category_exact_match() {
        let criteria = create_test_criteria();
        assert!(matches_category(&create_test_resource("food", &[], &[]), &criteria));
        assert!(!matches_category(&create_test_resource("Food", &[], &[]), &criteria));
        assert!(!matches_category(&create_test_resource("housing", &[], &[]), &criteria));
    }

    #[test]
    fn test_derive_user_tags() {
        let mut criteria = create_test_criteria();
        assert!(derive_user_tags(&criteria).is_empty());

        criteria.income_bracket = Some(IncomeBracket::VeryLow);
        criteria.age_range = "65+".to_string();
        criteria.household_size = 3;

        let tags = derive_user_tags(&criteria);
        assert_eq!(tags.len(), 3);
        assert!(tags.contains(TAG_LOW_INCOME));
        assert!(tags.contains(TAG_SENIOR));
        assert!(tags.contains(TAG_PARENT));
    }

    #[test]
    fn test_open_resource_always_eligible() {
        let resource = create_test_resource("food", &[], &[]);
        let tags: HashSet<&'static str> = [TAG_LOW_INCOME].into_iter().collect();
        assert!(is_eligible(&resource, &tags));
    }

    #[test]
    fn test_untagged_user_is_eligible_everywhere() {
        let resource = create_test_resource("food", &["senior"], &[]);
        assert!(is_eligible(&resource, &HashSet::new()));
    }

    #[test]
    fn test_disjoint_tags_excluded() {
        let resource = create_test_resource("food", &["senior"], &[]);
        let tags: HashSet<&'static str> = [TAG_LOW_INCOME].into_iter().collect();
        assert!(!is_eligible(&resource, &tags));
    }

    #[test]
    fn test_overlapping_tags_included() {
        let resource = create_test_resource("food", &["senior", "low_income"], &[]);
        let tags: HashSet<&'static str> = [TAG_LOW_INCOME].into_iter().collect();
        assert!(is_eligible(&resource, &tags));
    }

    #[test]
    fn test_language_support_case_insensitive() {
        let resource = create_test_resource("food", &[], &["English", "Spanish"]);
        assert!(supports_language(&resource, "spanish"));
        assert!(!supports_language(&resource, "Tagalog"));
        assert!(supports_language(&create_test_resource("food", &[], &[]), "Tagalog"));
    }

    #[test]
    fn test_language_preference_never_empties() {
        let english = create_test_resource("food", &[], &["English"]);
        let (kept, narrowed) = prefer_language(vec![&english], "Vietnamese");
        assert_eq!(kept.len(), 1);
        assert!(!narrowed);
    }

    #[test]
    fn test_language_preference_narrows() {
        let english = create_test_resource("food", &[], &["English"]);
        let spanish = create_test_resource("food", &[], &["Spanish"]);
        let (kept, narrowed) = prefer_language(vec![&english, &spanish], "Spanish");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].languages, vec!["Spanish"]);
        assert!(narrowed);
    }
}
