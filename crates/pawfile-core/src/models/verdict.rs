//! Validation verdict models.

use serde::{Deserialize, Serialize};

use super::attributes::ExtractedAttributes;
use super::pet::RegisteredPet;

/// Outcome of comparing one extracted field against the pet record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMatchResult {
    /// Whether the field is considered a match
    pub matches: bool,
    /// Similarity ratio (0.0 - 1.0); only fuzzy-compared fields carry one
    pub similarity: Option<f64>,
    /// Nickname/abbreviation heuristic fired
    pub likely_variation: bool,
}

impl FieldMatchResult {
    /// Result for an exact-match field (microchip, gender, age).
    pub fn exact(matches: bool) -> Self {
        Self {
            matches,
            similarity: None,
            likely_variation: false,
        }
    }

    /// Result for a fuzzy-compared field (name, breed).
    pub fn fuzzy(matches: bool, similarity: f64) -> Self {
        Self {
            matches,
            similarity: Some(similarity),
            likely_variation: false,
        }
    }

    /// Fuzzy result accepted through a nickname/abbreviation heuristic.
    pub fn variation(similarity: f64) -> Self {
        Self {
            matches: true,
            similarity: Some(similarity),
            likely_variation: true,
        }
    }
}

/// Per-field match results for one validation call.
///
/// A `None` field means the evidence was absent (or unparseable) and was
/// excluded from scoring entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MatchDetails {
    pub microchip: Option<FieldMatchResult>,
    pub name: Option<FieldMatchResult>,
    pub breed: Option<FieldMatchResult>,
    pub age: Option<FieldMatchResult>,
    pub gender: Option<FieldMatchResult>,
}

impl MatchDetails {
    /// Computed fields paired with their names, in weight order.
    pub fn fields(&self) -> Vec<(&'static str, &FieldMatchResult)> {
        [
            ("microchip", &self.microchip),
            ("name", &self.name),
            ("breed", &self.breed),
            ("age", &self.age),
            ("gender", &self.gender),
        ]
        .into_iter()
        .filter_map(|(name, result)| result.as_ref().map(|r| (name, r)))
        .collect()
    }

    /// Number of fields that had usable evidence.
    pub fn available_count(&self) -> usize {
        self.fields().len()
    }

    /// Number of fields that matched.
    pub fn match_count(&self) -> usize {
        self.fields().iter().filter(|(_, r)| r.matches).count()
    }
}

/// How the verdict was reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMethod {
    /// Exact microchip comparison decided the outcome
    Microchip,
    /// Multi-attribute fallback decided the outcome
    Attributes,
    /// No identifying information was available
    None,
}

impl std::fmt::Display for ValidationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValidationMethod::Microchip => "microchip",
            ValidationMethod::Attributes => "attributes",
            ValidationMethod::None => "none",
        };
        f.write_str(s)
    }
}

/// Why a document was not auto-filed against the pet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Extraction yielded nothing usable; route to manual review
    NoPetInfo,
    /// Microchip numbers disagree; never overridden by other fields
    MicrochipMismatch,
    /// Attribute evidence did not clear the acceptance conditions
    AttributesMismatch,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::NoPetInfo => "no_pet_info",
            SkipReason::MicrochipMismatch => "microchip_mismatch",
            SkipReason::AttributesMismatch => "attributes_mismatch",
        };
        f.write_str(s)
    }
}

/// Qualitative banding of the aggregated confidence score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceBand {
    /// Band for a 0-100 confidence score.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            ConfidenceBand::High
        } else if score >= 70.0 {
            ConfidenceBand::Medium
        } else if score >= 50.0 {
            ConfidenceBand::Low
        } else {
            ConfidenceBand::VeryLow
        }
    }

    /// Advisory label shown in logs and review screens.
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBand::High => "High confidence",
            ConfidenceBand::Medium => "Medium confidence",
            ConfidenceBand::Low => "Low confidence - manual review needed",
            ConfidenceBand::VeryLow => "Very low confidence",
        }
    }
}

/// Aggregated confidence over the computed field results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceReport {
    /// Weighted score as a percentage of available weight (0-100)
    pub score: f64,
    /// Qualitative band for the score
    pub band: ConfidenceBand,
}

/// Final output of one validation call.
///
/// Created once, never mutated afterward - this is the permanent record handed
/// to the diagnostics formatter and to the caller's routing decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationVerdict {
    /// Whether the document may be auto-filed against the pet
    pub is_valid: bool,
    /// How the verdict was reached
    pub method: ValidationMethod,
    /// The raw extracted attributes, as received
    pub attributes: ExtractedAttributes,
    /// Snapshot of the pet record the document was checked against
    pub pet: RegisteredPet,
    /// Per-field match results
    pub details: MatchDetails,
    /// Aggregated confidence, when the matchers ran
    pub confidence: Option<ConfidenceReport>,
    /// Present iff `is_valid` is false
    pub skip_reason: Option<SkipReason>,
}

impl ValidationVerdict {
    /// Serialize for the audit trail.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_details_counts() {
        let details = MatchDetails {
            name: Some(FieldMatchResult::fuzzy(true, 0.92)),
            breed: Some(FieldMatchResult::fuzzy(false, 0.3)),
            gender: Some(FieldMatchResult::exact(true)),
            ..Default::default()
        };
        assert_eq!(details.available_count(), 3);
        assert_eq!(details.match_count(), 2);
    }

    #[test]
    fn test_empty_details() {
        let details = MatchDetails::default();
        assert_eq!(details.available_count(), 0);
        assert_eq!(details.match_count(), 0);
        assert!(details.fields().is_empty());
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(ConfidenceBand::from_score(95.0), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_score(90.0), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_score(75.0), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_score(60.0), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::from_score(12.0), ConfidenceBand::VeryLow);
    }

    #[test]
    fn test_method_and_skip_reason_render_as_wire_names() {
        assert_eq!(ValidationMethod::Microchip.to_string(), "microchip");
        assert_eq!(SkipReason::NoPetInfo.to_string(), "no_pet_info");
        assert_eq!(SkipReason::AttributesMismatch.to_string(), "attributes_mismatch");
    }

    #[test]
    fn test_variation_result_matches() {
        let r = FieldMatchResult::variation(0.65);
        assert!(r.matches);
        assert!(r.likely_variation);
        assert_eq!(r.similarity, Some(0.65));
    }
}
