//! Structured analysis results
//!
//! `AnalysisResult` mirrors the JSON object returned by the model; every
//! field is optional and wrong-typed values degrade to "absent" instead of
//! failing the whole parse. `PlantReport` is the default-filled form the
//! formatter consumes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Plant name used when the model did not provide one.
pub const DEFAULT_PLANT_NAME: &str = "Unknown plant";
/// Description used when the model did not provide one.
pub const DEFAULT_DESCRIPTION: &str = "Information unavailable";

/// How hard the plant is to care for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difficulty {
    /// Easy to care for
    Easy,
    /// Moderate care
    Medium,
    /// Demanding care
    Hard,
    /// Any value the model returned outside the known set, kept verbatim
    Other(String),
}

impl Difficulty {
    /// Parse a difficulty string, case-insensitively.
    ///
    /// Returns `None` for blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.to_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Other(trimmed.to_string()),
        })
    }
}

/// Plant analysis as returned by the model
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AnalysisResult {
    /// Common name
    #[serde(default, deserialize_with = "lenient_string")]
    pub plant_name: Option<String>,
    /// Latin name
    #[serde(default, deserialize_with = "lenient_string")]
    pub scientific_name: Option<String>,
    /// Botanical family
    #[serde(default, deserialize_with = "lenient_string")]
    pub family: Option<String>,
    /// Free-form description
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    /// Care advice
    #[serde(default, deserialize_with = "lenient_string")]
    pub care_tips: Option<String>,
    /// Interesting facts
    #[serde(default, deserialize_with = "lenient_string")]
    pub fun_facts: Option<String>,
    /// Toxicity to people or pets
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_toxic: Option<bool>,
    /// Care difficulty
    #[serde(default, deserialize_with = "lenient_difficulty")]
    pub difficulty: Option<Difficulty>,
    /// The model could not answer confidently from the given input
    #[serde(default, deserialize_with = "lenient_flag")]
    pub low_quality: bool,
}

impl AnalysisResult {
    /// Result returned when neither an image nor a text was supplied.
    #[must_use]
    pub fn no_input_fallback() -> Self {
        Self {
            plant_name: Some("Unknown plant".to_string()),
            description: Some("Could not identify the plant".to_string()),
            low_quality: true,
            ..Self::default()
        }
    }

    /// Result returned when the model reply was not a JSON object.
    #[must_use]
    pub fn malformed_response_fallback() -> Self {
        Self {
            plant_name: Some("Plant".to_string()),
            description: Some("Could not retrieve detailed information".to_string()),
            low_quality: false,
            ..Self::default()
        }
    }

    /// Fill the two display-required fields with their defaults.
    #[must_use]
    pub fn with_defaults(self) -> PlantReport {
        PlantReport {
            plant_name: self
                .plant_name
                .unwrap_or_else(|| DEFAULT_PLANT_NAME.to_string()),
            scientific_name: self.scientific_name,
            family: self.family,
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            care_tips: self.care_tips,
            fun_facts: self.fun_facts,
            is_toxic: self.is_toxic,
            difficulty: self.difficulty,
            low_quality: self.low_quality,
        }
    }
}

/// Analysis result with display defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantReport {
    /// Common name, never empty
    pub plant_name: String,
    /// Latin name
    pub scientific_name: Option<String>,
    /// Botanical family
    pub family: Option<String>,
    /// Description, never empty
    pub description: String,
    /// Care advice
    pub care_tips: Option<String>,
    /// Interesting facts
    pub fun_facts: Option<String>,
    /// Toxicity to people or pets
    pub is_toxic: Option<bool>,
    /// Care difficulty
    pub difficulty: Option<Difficulty>,
    /// Render as a low-quality apology instead of a report
    pub low_quality: bool,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_bool(deserializer)?.unwrap_or(false))
}

fn lenient_difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.and_then(|s| Difficulty::parse(&s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_null_are_both_absent() {
        let missing: AnalysisResult =
            serde_json::from_value(json!({"plant_name": "Rose"})).expect("valid object");
        let nulls: AnalysisResult = serde_json::from_value(json!({
            "plant_name": "Rose",
            "family": null,
            "is_toxic": null,
            "difficulty": null,
            "low_quality": null
        }))
        .expect("valid object");
        assert_eq!(missing, nulls);
        assert_eq!(missing.family, None);
        assert!(!missing.low_quality);
    }

    #[test]
    fn test_wrong_types_degrade_to_absent() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "plant_name": ["not", "a", "string"],
            "description": 42,
            "is_toxic": "TRUE",
            "difficulty": {"level": 1},
            "low_quality": "maybe"
        }))
        .expect("lenient parsing never fails on field types");
        assert_eq!(result.plant_name, None);
        assert_eq!(result.description.as_deref(), Some("42"));
        assert_eq!(result.is_toxic, Some(true));
        assert_eq!(result.difficulty, None);
        assert!(!result.low_quality);
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let result: AnalysisResult =
            serde_json::from_value(json!({"plant_name": "  ", "care_tips": ""}))
                .expect("valid object");
        assert_eq!(result.plant_name, None);
        assert_eq!(result.care_tips, None);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::parse("MEDIUM"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::parse(" easy "), Some(Difficulty::Easy));
        assert_eq!(
            Difficulty::parse("very hard"),
            Some(Difficulty::Other("very hard".to_string()))
        );
        assert_eq!(Difficulty::parse(""), None);
    }

    #[test]
    fn test_with_defaults_fills_required_fields() {
        let report = AnalysisResult::default().with_defaults();
        assert_eq!(report.plant_name, DEFAULT_PLANT_NAME);
        assert_eq!(report.description, DEFAULT_DESCRIPTION);
        assert_eq!(report.scientific_name, None);
    }

    #[test]
    fn test_fallbacks() {
        let none = AnalysisResult::no_input_fallback();
        assert!(none.low_quality);
        assert_eq!(none.plant_name.as_deref(), Some("Unknown plant"));
        assert_eq!(none.is_toxic, None);

        let malformed = AnalysisResult::malformed_response_fallback();
        assert!(!malformed.low_quality);
        assert_eq!(malformed.plant_name.as_deref(), Some("Plant"));
        assert_eq!(
            malformed.description.as_deref(),
            Some("Could not retrieve detailed information")
        );
    }
}
