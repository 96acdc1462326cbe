use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language assumed when a request does not state one
pub const DEFAULT_LANGUAGE: &str = "English";

/// Age bracket that derives the `senior` eligibility tag
pub const SENIOR_AGE_RANGE: &str = "65+";

/// Category of need a user can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedCategory {
    Food,
    Housing,
    MentalHealth,
    Legal,
    Jobs,
}

impl NeedCategory {
    pub const ALL: [NeedCategory; 5] = [
        NeedCategory::Food,
        NeedCategory::Housing,
        NeedCategory::MentalHealth,
        NeedCategory::Legal,
        NeedCategory::Jobs,
    ];

    /// Canonical category string as stored on a [`Resource`]
    pub fn as_str(&self) -> &'static str {
        match self {
            NeedCategory::Food => "food",
            NeedCategory::Housing => "housing",
            NeedCategory::MentalHealth => "mental_health",
            NeedCategory::Legal => "legal",
            NeedCategory::Jobs => "jobs",
        }
    }
}

impl fmt::Display for NeedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NeedCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NeedCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Household income bracket relative to area median
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeBracket {
    VeryLow,
    Low,
    Moderate,
    AboveModerate,
}

impl IncomeBracket {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeBracket::VeryLow => "very_low",
            IncomeBracket::Low => "low",
            IncomeBracket::Moderate => "moderate",
            IncomeBracket::AboveModerate => "above_moderate",
        }
    }

    /// Whether this bracket qualifies for `low_income` resources
    pub fn is_low_income(&self) -> bool {
        matches!(self, IncomeBracket::VeryLow | IncomeBracket::Low)
    }
}

impl FromStr for IncomeBracket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "very_low" => Ok(IncomeBracket::VeryLow),
            "low" => Ok(IncomeBracket::Low),
            "moderate" => Ok(IncomeBracket::Moderate),
            "above_moderate" => Ok(IncomeBracket::AboveModerate),
            other => Err(other.to_string()),
        }
    }
}

/// A user's matching inputs for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCriteria {
    pub zip: String,
    #[serde(rename = "ageRange", default)]
    pub age_range: String,
    #[serde(rename = "incomeBracket", default)]
    pub income_bracket: Option<IncomeBracket>,
    #[serde(rename = "householdSize", default = "default_household_size")]
    pub household_size: u32,
    #[serde(rename = "primaryNeed")]
    pub primary_need: NeedCategory,
    #[serde(rename = "preferredLanguage", default)]
    pub preferred_language: Option<String>,
}

impl UserCriteria {
    /// Preferred language, falling back to English when absent or blank
    pub fn language(&self) -> &str {
        self.preferred_language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }
}

fn default_household_size() -> u32 { 1 }

/// A social-service resource in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(rename = "eligibility", default)]
    pub eligibility_notes: String,
    #[serde(rename = "eligibilityTags", default)]
    pub eligibility_tags: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// A matched resource annotated with its proximity and, later, an action plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub resource: Resource,
    pub distance: u32,
    #[serde(rename = "actionPlan", default, skip_serializing_if = "Option::is_none")]
    pub action_plan: Option<Vec<String>>,
}

impl MatchResult {
    pub fn new(resource: Resource, distance: u32) -> Self {
        Self {
            resource,
            distance,
            action_plan: None,
        }
    }
}
