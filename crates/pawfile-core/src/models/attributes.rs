//! Extracted document attributes.

use serde::{Deserialize, Serialize};

/// Pet attributes extracted from a veterinary document by the OCR/LLM step.
///
/// Every field is independently optional. Extraction returns best-effort nulls,
/// and an absent field is "unavailable evidence" - it is excluded from match
/// scoring, never counted as a mismatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedAttributes {
    /// Microchip number as printed on the document
    pub microchip: Option<String>,
    /// Pet name
    pub name: Option<String>,
    /// Free-text age phrase (e.g. "3 years", "6 months", "2 years 4 months")
    pub age: Option<String>,
    /// Breed
    pub breed: Option<String>,
    /// Free-text sex marker (e.g. "Male", "F", "Neutered Male")
    pub gender: Option<String>,
    /// Extractor's self-reported confidence (0-100). Advisory only; the
    /// validator scores matches from the field values, not from this number.
    pub extraction_confidence: Option<f64>,
}

impl ExtractedAttributes {
    /// Names of the identifying fields the extractor is asked to produce.
    pub const FIELD_NAMES: [&'static str; 5] = ["microchip", "name", "age", "breed", "gender"];

    /// Check whether the extraction produced any identifying field at all.
    pub fn has_identifiable_info(&self) -> bool {
        self.microchip.is_some()
            || self.name.is_some()
            || self.age.is_some()
            || self.breed.is_some()
            || self.gender.is_some()
    }

    /// Names of identifying fields the extraction did not produce.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            self.microchip.is_some(),
            self.name.is_some(),
            self.age.is_some(),
            self.breed.is_some(),
            self.gender.is_some(),
        ];
        Self::FIELD_NAMES
            .iter()
            .zip(present)
            .filter(|(_, p)| !p)
            .map(|(name, _)| *name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_attributes_have_no_info() {
        let attrs = ExtractedAttributes::default();
        assert!(!attrs.has_identifiable_info());
        assert_eq!(attrs.missing_fields().len(), 5);
    }

    #[test]
    fn test_single_field_is_identifiable() {
        let attrs = ExtractedAttributes {
            name: Some("Max".into()),
            ..Default::default()
        };
        assert!(attrs.has_identifiable_info());
        assert_eq!(attrs.missing_fields(), vec!["microchip", "age", "breed", "gender"]);
    }

    #[test]
    fn test_extraction_confidence_is_not_identifying() {
        let attrs = ExtractedAttributes {
            extraction_confidence: Some(95.0),
            ..Default::default()
        };
        assert!(!attrs.has_identifiable_info());
    }
}
