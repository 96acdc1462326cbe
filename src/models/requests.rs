use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::models::domain::{IncomeBracket, NeedCategory, UserCriteria};

/// Errors raised while turning a request body into [`UserCriteria`]
#[derive(Debug, Error, PartialEq)]
pub enum CriteriaError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown need category: {0}")]
    UnknownNeed(String),

    #[error("Unknown income bracket: {0}")]
    UnknownIncomeBracket(String),
}

/// Request to match resources against a user's criteria
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[validate(length(min = 1))]
    #[serde(default)]
    pub zip: String,
    #[serde(alias = "age_range", rename = "ageRange", default)]
    pub age_range: String,
    #[serde(alias = "income_bracket", rename = "incomeBracket", default)]
    pub income_bracket: Option<String>,
    #[validate(range(min = 1))]
    #[serde(alias = "household_size", rename = "householdSize", default = "default_household_size")]
    pub household_size: u32,
    #[validate(length(min = 1))]
    #[serde(alias = "primary_need", rename = "primaryNeed", default)]
    pub primary_need: String,
    #[serde(alias = "preferred_language", rename = "preferredLanguage", default)]
    pub preferred_language: Option<String>,
}

fn default_household_size() -> u32 {
    1
}

impl MatchRequest {
    /// Convert a validated request into matching criteria
    pub fn into_criteria(self) -> Result<UserCriteria, CriteriaError> {
        let zip = self.zip.trim().to_string();
        if zip.is_empty() {
            return Err(CriteriaError::MissingField("zip"));
        }

        let need = self.primary_need.trim().to_lowercase();
        if need.is_empty() {
            return Err(CriteriaError::MissingField("primaryNeed"));
        }
        let primary_need = need
            .parse::<NeedCategory>()
            .map_err(CriteriaError::UnknownNeed)?;

        let income_bracket = match self.income_bracket.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.to_lowercase()
                    .parse::<IncomeBracket>()
                    .map_err(CriteriaError::UnknownIncomeBracket)?,
            ),
        };

        Ok(UserCriteria {
            zip,
            age_range: self.age_range.trim().to_string(),
            income_bracket,
            household_size: self.household_size,
            primary_need,
            preferred_language: self.preferred_language,
        })
    }
}

/// Query parameters for listing the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(zip: &str, need: &str) -> MatchRequest {
        MatchRequest {
            zip: zip.to_string(),
            age_range: "30-40".to_string(),
            income_bracket: Some("low".to_string()),
            household_size: 1,
            primary_need: need.to_string(),
            preferred_language: None,
        }
    }

    #[test]
    fn test_missing_fields_fail_validation() {
        assert!(request("", "food").validate().is_err());
        assert!(request("94601", "").validate().is_err());
        assert!(request("94601", "food").validate().is_ok());
    }

    #[test]
    fn test_blank_zip_rejected_on_conversion() {
        let err = request("   ", "food").into_criteria().unwrap_err();
        assert_eq!(err, CriteriaError::MissingField("zip"));
    }

    #[test]
    fn test_into_criteria_parses_enums() {
        let criteria = request(" 94601 ", "Food").into_criteria().unwrap();
        assert_eq!(criteria.zip, "94601");
        assert_eq!(criteria.primary_need, NeedCategory::Food);
        assert_eq!(criteria.income_bracket, Some(IncomeBracket::Low));
    }

    #[test]
    fn test_unknown_need_rejected() {
        let err = request("94601", "transport").into_criteria().unwrap_err();
        assert_eq!(err, CriteriaError::UnknownNeed("transport".to_string()));
    }

    #[test]
    fn test_empty_income_bracket_is_absent() {
        let mut req = request("94601", "housing");
        req.income_bracket = Some(String::new());
        assert_eq!(req.into_criteria().unwrap().income_bracket, None);
    }

    #[test]
    fn test_deserializes_camel_and_snake_case() {
        let camel: MatchRequest = serde_json::from_str(
            r#"{"zip":"94601","primaryNeed":"food","householdSize":3}"#,
        )
        .unwrap();
        let snake: MatchRequest = serde_json::from_str(
            r#"{"zip":"94601","primary_need":"food","household_size":3}"#,
        )
        .unwrap();

        assert_eq!(camel.primary_need, snake.primary_need);
        assert_eq!(camel.household_size, 3);
        assert_eq!(snake.household_size, 3);
    }
}
