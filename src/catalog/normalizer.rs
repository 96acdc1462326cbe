use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::models::Resource;

pub const UNKNOWN_NAME: &str = "Unknown Resource";
pub const DEFAULT_CATEGORY: &str = "other";
pub const DEFAULT_HOURS: &str = "Contact for hours";

const ID_FIELDS: &[&str] = &["id", "_id", "resource_id", "uuid"];
const NAME_FIELDS: &[&str] = &["name", "organization_name", "title"];
const CATEGORY_FIELDS: &[&str] = &["category", "service_type", "type"];
const ADDRESS_FIELDS: &[&str] = &["address", "street_address", "full_address", "location"];
const ZIP_FIELDS: &[&str] = &["zip", "zip_code", "zipcode", "postal_code", "postalCode"];
const HOURS_FIELDS: &[&str] = &["hours", "hours_of_operation", "schedule", "opening_hours"];
const PHONE_FIELDS: &[&str] = &["phone", "phone_number", "telephone", "contact_phone"];
const WEBSITE_FIELDS: &[&str] = &["website", "url", "web", "homepage"];
const NOTES_FIELDS: &[&str] = &["eligibility", "eligibility_notes", "requirements", "who_qualifies"];
const TAG_FIELDS: &[&str] = &["eligibilityTags", "eligibility_tags", "tags", "target_population"];
const LANGUAGE_FIELDS: &[&str] = &["languages", "supported_languages", "languages_supported", "language"];

/// Address object parts, in the order they are joined
const ADDRESS_PARTS: &[&str] = &["street", "line1", "address1", "line2", "address2", "city", "state", "zip", "postal_code"];

/// Free-text source categories and the canonical need they map to
const CATEGORY_SYNONYMS: &[(&str, &str)] = &[
    ("food", "food"),
    ("food bank", "food"),
    ("food pantry", "food"),
    ("pantry", "food"),
    ("meal", "food"),
    ("meals", "food"),
    ("nutrition", "food"),
    ("groceries", "food"),
    ("soup kitchen", "food"),
    ("snap", "food"),
    ("wic", "food"),
    ("housing", "housing"),
    ("shelter", "housing"),
    ("emergency shelter", "housing"),
    ("rental assistance", "housing"),
    ("rent assistance", "housing"),
    ("homeless services", "housing"),
    ("transitional housing", "housing"),
    ("housing assistance", "housing"),
    ("mental_health", "mental_health"),
    ("mental health", "mental_health"),
    ("counseling", "mental_health"),
    ("therapy", "mental_health"),
    ("behavioral health", "mental_health"),
    ("crisis support", "mental_health"),
    ("substance use", "mental_health"),
    ("legal", "legal"),
    ("legal aid", "legal"),
    ("legal services", "legal"),
    ("legal assistance", "legal"),
    ("immigration", "legal"),
    ("tenant rights", "legal"),
    ("jobs", "jobs"),
    ("employment", "jobs"),
    ("employment services", "jobs"),
    ("job training", "jobs"),
    ("job placement", "jobs"),
    ("workforce", "jobs"),
    ("career services", "jobs"),
];

/// 5-digit ZIP, optionally followed by a +4 suffix
static ZIP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5})(?:-\d{4})?\b").expect("ZIP pattern is valid"));

/// Normalize a raw source record into a canonical [`Resource`]
///
/// Records that already carry `id`, `name` and `category` and deserialize
/// cleanly are returned as-is. Everything else is resolved field by field
/// from the alternate names a source may use, with fixed defaults for
/// anything missing. Never fails.
pub fn normalize(record: &Value) -> Resource {
    let empty = Map::new();
    let map = record.as_object().unwrap_or(&empty);

    if is_canonical(map) {
        if let Ok(resource) = serde_json::from_value::<Resource>(record.clone()) {
            return resource;
        }
    }

    let id = first_text(map, ID_FIELDS).unwrap_or_else(|| {
        let generated = format!("res_{}", Uuid::new_v4().simple());
        tracing::debug!("Record without identifier, assigned {}", generated);
        generated
    });

    let category = first_text(map, CATEGORY_FIELDS)
        .or_else(|| map.get("categories").and_then(|v| list_values(v).into_iter().next()))
        .map(|raw| normalize_category(&raw))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let address = ADDRESS_FIELDS
        .iter()
        .filter_map(|f| map.get(*f))
        .find_map(address_text)
        .unwrap_or_default();

    let zip = first_text(map, ZIP_FIELDS)
        .and_then(|z| extract_zip(&z))
        .or_else(|| extract_zip(&address))
        .unwrap_or_default();

    let eligibility_tags = first_list(map, TAG_FIELDS)
        .or_else(|| match map.get("eligibility") {
            Some(v @ Value::Array(_)) => Some(list_values(v)),
            _ => None,
        })
        .unwrap_or_default()
        .iter()
        .map(|t| normalize_tag(t))
        .filter(|t| !t.is_empty())
        .collect();

    Resource {
        id,
        name: first_text(map, NAME_FIELDS).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        category,
        address,
        zip,
        hours: first_text(map, HOURS_FIELDS).unwrap_or_else(|| DEFAULT_HOURS.to_string()),
        phone: first_text(map, PHONE_FIELDS).unwrap_or_default(),
        website: first_text(map, WEBSITE_FIELDS).unwrap_or_default(),
        eligibility_notes: first_text(map, NOTES_FIELDS).unwrap_or_default(),
        eligibility_tags,
        languages: first_list(map, LANGUAGE_FIELDS).unwrap_or_default(),
    }
}

/// Normalize a batch of raw records
pub fn normalize_all(records: &[Value]) -> Vec<Resource> {
    let resources: Vec<Resource> = records.iter().map(normalize).collect();

    let mut seen = HashSet::new();
    for resource in &resources {
        if !seen.insert(resource.id.as_str()) {
            tracing::warn!("Duplicate resource id in catalog: {}", resource.id);
        }
    }

    tracing::debug!("Normalized {} records", resources.len());
    resources
}

/// Map a free-text category onto a canonical need
///
/// Unmapped values are lower-cased and kept.
pub fn normalize_category(raw: &str) -> String {
    let key = raw.trim().to_lowercase();

    CATEGORY_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(key)
}

/// Pull a 5-digit ZIP out of free text
///
/// ZIP+4 values are truncated to five digits. When several candidates
/// appear the last one wins, since street numbers come first in an address.
pub fn extract_zip(text: &str) -> Option<String> {
    ZIP_PATTERN
        .captures_iter(text)
        .last()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn is_canonical(map: &Map<String, Value>) -> bool {
    ["id", "name"].iter().all(|k| map.contains_key(*k))
        && matches!(
            map.get("category"),
            Some(Value::String(c)) if !c.is_empty() && normalize_category(c) == *c
        )
}

fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(map: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields.iter().filter_map(|f| map.get(*f)).find_map(scalar_text)
}

fn list_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        Value::String(s) => s
            .split([',', ';'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn first_list(map: &Map<String, Value>, fields: &[&str]) -> Option<Vec<String>> {
    fields
        .iter()
        .filter_map(|f| map.get(*f))
        .map(list_values)
        .find(|values| !values.is_empty())
}

fn address_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(parts) => {
            let joined = ADDRESS_PARTS
                .iter()
                .filter_map(|p| parts.get(*p))
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        other => scalar_text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_record_unchanged() {
        let record = json!({
            "id": "oak-001",
            "name": "Alameda County Community Food Bank",
            "category": "food",
            "address": "7900 Edgewater Dr, Oakland, CA 94621",
            "zip": "94621",
            "hours": "Mon-Fri 9am-5pm",
            "phone": "510-635-3663",
            "website": "https://www.accfb.org",
            "eligibility": "Open to all Alameda County residents",
            "eligibilityTags": [],
            "languages": ["English", "Spanish"]
        });

        let resource = normalize(&record);

        assert_eq!(serde_json::to_value(&resource).unwrap(), record);
        assert_eq!(normalize(&serde_json::to_value(&resource).unwrap()), resource);
    }

    #[test]
    fn test_canonical_shape_with_raw_category_is_normalized() {
        let blank = normalize(&json!({ "id": "1", "name": "A", "category": "" }));
        assert_eq!(blank.id, "1");
        assert_eq!(blank.category, DEFAULT_CATEGORY);

        let padded = normalize(&json!({ "id": "2", "name": "B", "category": "  Food Bank " }));
        assert_eq!(padded.id, "2");
        assert_eq!(padded.name, "B");
        assert_eq!(padded.category, "food");

        assert_eq!(normalize(&serde_json::to_value(&padded).unwrap()), padded);
    }

    #[test]
    fn test_food_bank_maps_to_food() {
        let record = json!({ "organization_name": "Pantry", "category": "Food Bank" });
        assert_eq!(normalize(&record).category, "food");
    }

    #[test]
    fn test_category_synonyms() {
        assert_eq!(normalize_category("  Rental Assistance "), "housing");
        assert_eq!(normalize_category("Counseling"), "mental_health");
        assert_eq!(normalize_category("Legal Aid"), "legal");
        assert_eq!(normalize_category("Job Training"), "jobs");
        assert_eq!(normalize_category("Transportation"), "transportation");
    }

    #[test]
    fn test_alternate_field_names() {
        let record = json!({
            "resource_id": 42,
            "title": "Eastside Shelter",
            "service_type": "shelter",
            "street_address": "12 Foothill Blvd, Oakland, CA 94606",
            "hours_of_operation": "24/7",
            "phone_number": "510-555-0199",
            "url": "https://example.org",
            "requirements": "Adults 18+",
            "tags": "Low Income, Senior",
            "supported_languages": "English; Cantonese"
        });

        let resource = normalize(&record);

        assert_eq!(resource.id, "42");
        assert_eq!(resource.name, "Eastside Shelter");
        assert_eq!(resource.category, "housing");
        assert_eq!(resource.zip, "94606");
        assert_eq!(resource.hours, "24/7");
        assert_eq!(resource.phone, "510-555-0199");
        assert_eq!(resource.website, "https://example.org");
        assert_eq!(resource.eligibility_notes, "Adults 18+");
        assert_eq!(resource.eligibility_tags, vec!["low_income", "senior"]);
        assert_eq!(resource.languages, vec!["English", "Cantonese"]);
    }

    #[test]
    fn test_defaults_for_empty_record() {
        let resource = normalize(&json!({}));

        assert!(resource.id.starts_with("res_"));
        assert_eq!(resource.name, UNKNOWN_NAME);
        assert_eq!(resource.category, DEFAULT_CATEGORY);
        assert_eq!(resource.hours, DEFAULT_HOURS);
        assert_eq!(resource.zip, "");
        assert!(resource.eligibility_tags.is_empty());
        assert!(resource.languages.is_empty());
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = normalize(&json!({ "name": "A" }));
        let b = normalize(&json!({ "name": "A" }));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_non_object_record() {
        let resource = normalize(&json!("not a record"));
        assert_eq!(resource.name, UNKNOWN_NAME);
    }

    #[test]
    fn test_zip_extraction() {
        assert_eq!(extract_zip("1 Main St, Oakland, CA 94601"), Some("94601".to_string()));
        assert_eq!(extract_zip("Oakland, CA 94601-1234"), Some("94601".to_string()));
        assert_eq!(extract_zip("12345 Main St, Oakland, CA 94601"), Some("94601".to_string()));
        assert_eq!(extract_zip("No postal code here"), None);
        assert_eq!(extract_zip("Suite 123456"), None);
    }

    #[test]
    fn test_explicit_zip_plus_four_truncated() {
        let resource = normalize(&json!({ "name": "X", "postal_code": "94612-3301" }));
        assert_eq!(resource.zip, "94612");
    }

    #[test]
    fn test_address_object_joined() {
        let resource = normalize(&json!({
            "name": "Clinic",
            "address": { "street": "500 Broadway", "city": "Oakland", "state": "CA", "zip": "94607" }
        }));

        assert_eq!(resource.address, "500 Broadway, Oakland, CA, 94607");
        assert_eq!(resource.zip, "94607");
    }

    #[test]
    fn test_eligibility_array_becomes_tags() {
        let resource = normalize(&json!({ "name": "X", "eligibility": ["Senior", "low-income"] }));

        assert_eq!(resource.eligibility_tags, vec!["senior", "low_income"]);
        assert_eq!(resource.eligibility_notes, "");
    }

    #[test]
    fn test_categories_array_uses_first() {
        let resource = normalize(&json!({ "name": "X", "categories": ["Meals", "Housing"] }));
        assert_eq!(resource.category, "food");
    }
}
