//! Document-to-pet identity validator.
//!
//! Pipeline: OCR/LLM Extraction -> Field Matching -> Confidence Aggregation -> Verdict
//!
//! The validator is a pure computation: no I/O, no shared state, no error
//! channel. Every outcome - including "nothing usable was extracted" - is a
//! [`ValidationVerdict`] value for the caller's routing decision.

mod confidence;
mod diagnostics;
mod matchers;
mod similarity;

pub use confidence::*;
pub use diagnostics::*;
pub use matchers::*;
pub use similarity::*;

use chrono::NaiveDate;
use tracing::info;

use crate::models::{
    ExtractedAttributes, MatchDetails, RegisteredPet, SkipReason, ValidationMethod,
    ValidationVerdict,
};

/// Validates that an uploaded document belongs to a registered pet.
///
/// Priority order: a microchip, when extracted, is the sole arbiter. Only
/// when no microchip was extracted does the multi-attribute fallback run.
pub struct DocumentValidator {
    matchers: FieldMatchers,
}

impl Default for DocumentValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentValidator {
    /// Create a validator with default thresholds and nickname pairs.
    pub fn new() -> Self {
        Self {
            matchers: FieldMatchers::new(),
        }
    }

    /// Create a validator with custom matcher configuration.
    pub fn with_config(thresholds: MatchThresholds, nicknames: NicknameTable) -> Self {
        Self {
            matchers: FieldMatchers::with_config(thresholds, nicknames),
        }
    }

    /// Get the matchers for direct access.
    pub fn matchers(&self) -> &FieldMatchers {
        &self.matchers
    }

    /// Validate a document's extracted attributes against one pet record,
    /// with pet age computed as of today.
    pub fn validate(
        &self,
        attributes: &ExtractedAttributes,
        pet: &RegisteredPet,
    ) -> ValidationVerdict {
        self.validate_at(attributes, pet, chrono::Utc::now().date_naive())
    }

    /// Validate with an explicit "today", so replays and tests are
    /// deterministic.
    pub fn validate_at(
        &self,
        attributes: &ExtractedAttributes,
        pet: &RegisteredPet,
        today: NaiveDate,
    ) -> ValidationVerdict {
        if !attributes.has_identifiable_info() {
            info!(pet_id = %pet.local_id, "validation_no_pet_info");
            return ValidationVerdict {
                is_valid: false,
                method: ValidationMethod::None,
                attributes: attributes.clone(),
                pet: pet.clone(),
                details: MatchDetails::default(),
                confidence: None,
                skip_reason: Some(SkipReason::NoPetInfo),
            };
        }

        if let Some(chip) = attributes.microchip.as_deref() {
            return self.validate_by_microchip(attributes, pet, chip);
        }

        self.validate_by_attributes(attributes, pet, today)
    }

    /// Priority 1: the microchip decides alone. A match overrides any other
    /// disagreement; a mismatch is never overridden by attribute agreement.
    fn validate_by_microchip(
        &self,
        attributes: &ExtractedAttributes,
        pet: &RegisteredPet,
        chip: &str,
    ) -> ValidationVerdict {
        let result = self
            .matchers
            .match_microchip(chip, pet.microchip_number.as_deref());
        let is_valid = result.matches;
        let details = MatchDetails {
            microchip: Some(result),
            ..Default::default()
        };
        let confidence = aggregate_confidence(&details);
        info!(
            pet_id = %pet.local_id,
            is_valid,
            confidence = confidence.score,
            "microchip_validation"
        );
        ValidationVerdict {
            is_valid,
            method: ValidationMethod::Microchip,
            attributes: attributes.clone(),
            pet: pet.clone(),
            details,
            confidence: Some(confidence),
            skip_reason: (!is_valid).then_some(SkipReason::MicrochipMismatch),
        }
    }

    /// Priority 2: multi-attribute fallback. Accepts on any of:
    /// matched-field count reaching 70% of available fields, aggregated
    /// confidence at the floor, strong name+breed similarity, or a strong
    /// name match corroborated by age.
    fn validate_by_attributes(
        &self,
        attributes: &ExtractedAttributes,
        pet: &RegisteredPet,
        today: NaiveDate,
    ) -> ValidationVerdict {
        let thresholds = self.matchers.thresholds();
        let mut details = MatchDetails::default();

        if let Some(name) = attributes.name.as_deref() {
            details.name = Some(self.matchers.match_name(name, &pet.name));
        }
        if let Some(breed) = attributes.breed.as_deref() {
            details.breed = Some(self.matchers.match_breed(breed, &pet.breed));
        }
        if let Some(gender) = attributes.gender.as_deref() {
            details.gender = Some(self.matchers.match_gender(gender, &pet.sex));
        }

        let name_similarity = details
            .name
            .as_ref()
            .and_then(|r| r.similarity)
            .unwrap_or(0.0);
        let breed_similarity = details
            .breed
            .as_ref()
            .and_then(|r| r.similarity)
            .unwrap_or(0.0);
        let has_strong_matches = name_similarity >= thresholds.strong_similarity
            && breed_similarity >= thresholds.strong_similarity;

        // Age runs last: strong name+breed agreement widens its tolerance
        if let Some(age) = attributes.age.as_deref() {
            details.age = self.matchers.match_age(age, pet, today, has_strong_matches);
        }

        let available = details.available_count();
        let matched = details.match_count();
        let confidence = aggregate_confidence(&details);

        let name_matched = details.name.as_ref().map_or(false, |r| r.matches);
        let age_matched = details.age.as_ref().map_or(false, |r| r.matches);

        let required = available as f64 * thresholds.required_match_ratio;
        let is_valid = available > 0
            && (matched as f64 >= required
                || confidence.score >= thresholds.confidence_floor
                || has_strong_matches
                || (name_matched && name_similarity >= thresholds.strong_similarity && age_matched));

        info!(
            pet_id = %pet.local_id,
            matched,
            available,
            confidence = confidence.score,
            has_strong_matches,
            is_valid,
            "attribute_validation"
        );
        ValidationVerdict {
            is_valid,
            method: ValidationMethod::Attributes,
            attributes: attributes.clone(),
            pet: pet.clone(),
            details,
            confidence: Some(confidence),
            skip_reason: (!is_valid).then_some(SkipReason::AttributesMismatch),
        }
    }

    /// Validate one document against every candidate pet (e.g. all pets in
    /// a household inbox).
    pub fn validate_all(
        &self,
        attributes: &ExtractedAttributes,
        pets: &[RegisteredPet],
    ) -> Vec<ValidationVerdict> {
        pets.iter()
            .map(|pet| self.validate(attributes, pet))
            .collect()
    }

    /// The valid verdict with the highest confidence, if any pet matched.
    pub fn best_match(
        &self,
        attributes: &ExtractedAttributes,
        pets: &[RegisteredPet],
    ) -> Option<ValidationVerdict> {
        self.validate_all(attributes, pets)
            .into_iter()
            .filter(|v| v.is_valid)
            .max_by(|a, b| {
                let score = |v: &ValidationVerdict| v.confidence.as_ref().map_or(0.0, |c| c.score);
                score(a)
                    .partial_cmp(&score(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}
