//! Attribute extraction from LLM output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("LLM inference error: {0}")]
    Inference(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Raw extraction output from the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub attributes: RawAttributes,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Attribute values exactly as read off the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAttributes {
    pub microchip: Option<String>,
    pub name: Option<String>,
    pub age: Option<String>,
    pub breed: Option<String>,
    pub gender: Option<String>,
}

/// Parse LLM output JSON into a structured extraction.
pub fn parse_extraction_output(json: &str) -> ExtractionResult<ExtractionOutput> {
    // Try to find JSON in the response (in case the LLM adds extra text)
    let json_start = json.find('{').ok_or_else(|| {
        ExtractionError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = json.rfind('}').ok_or_else(|| {
        ExtractionError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(ExtractionError::InvalidFormat(
            "Braces out of order in response".into(),
        ));
    }

    let json_slice = &json[json_start..=json_end];
    let output: ExtractionOutput = serde_json::from_str(json_slice)?;

    Ok(output)
}

/// Convert an extraction to the format expected by the validator.
pub fn to_extracted_attributes(output: &ExtractionOutput) -> ExtractedAttributes {
    ExtractedAttributes {
        microchip: output.attributes.microchip.clone(),
        name: output.attributes.name.clone(),
        age: output.attributes.age.clone(),
        breed: output.attributes.breed.clone(),
        gender: output.attributes.gender.clone(),
        extraction_confidence: output.confidence,
    }
}

/// Pet attributes in validator-compatible format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedAttributes {
    pub microchip: Option<String>,
    pub name: Option<String>,
    pub age: Option<String>,
    pub breed: Option<String>,
    pub gender: Option<String>,
    pub extraction_confidence: Option<f64>,
}

static MICROCHIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:microchip|chip)\s*(?:no\.?|number|#)?\s*[:#]?\s*([0-9][0-9 ]{8,20}[0-9])").unwrap());
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:patient|pet name|name)\s*[:#]\s*([A-Za-z]+)").unwrap());
static AGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?\s*(?:years?|yrs?|months?|weeks?)(?:\s+\d+\s*(?:months?|weeks?))?)")
        .unwrap()
});
static BREED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)breed\s*[:#]\s*([A-Za-z][A-Za-z ]*[A-Za-z])").unwrap());
static GENDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(neutered male|spayed female|neutered|castrated|spayed|male|female)\b")
        .unwrap()
});

/// Mock extractor for testing without actual LLM inference.
pub struct MockExtractor;

impl MockExtractor {
    /// Extract attributes using simple pattern matching (for testing).
    pub fn extract(document_text: &str) -> ExtractionOutput {
        let capture = |re: &Regex| {
            re.captures(document_text)
                .map(|caps| caps[1].trim().to_string())
        };

        let attributes = RawAttributes {
            microchip: capture(&MICROCHIP_RE),
            name: capture(&NAME_RE),
            age: capture(&AGE_RE),
            breed: capture(&BREED_RE),
            gender: capture(&GENDER_RE),
        };

        let found = [
            attributes.microchip.is_some(),
            attributes.name.is_some(),
            attributes.age.is_some(),
            attributes.breed.is_some(),
            attributes.gender.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();

        ExtractionOutput {
            attributes,
            confidence: Some(found as f64 * 20.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_extraction_output() {
        let json = r#"{"attributes":{"microchip":"985112003456789","name":"Maximus","age":"3 years","breed":"Golden Retriever","gender":"Neutered Male"},"confidence":95}"#;

        let output = parse_extraction_output(json).unwrap();
        assert_eq!(output.attributes.name.as_deref(), Some("Maximus"));
        assert_eq!(output.attributes.age.as_deref(), Some("3 years"));
        assert_eq!(output.confidence, Some(95.0));
    }

    #[test]
    fn test_parse_extraction_output_with_prefix() {
        let json = r#"Here is the extracted information:
{"attributes":{"microchip":null,"name":"Bella","age":null,"breed":null,"gender":null},"confidence":70}"#;

        let output = parse_extraction_output(json).unwrap();
        assert_eq!(output.attributes.name.as_deref(), Some("Bella"));
        assert!(output.attributes.microchip.is_none());
    }

    #[test]
    fn test_parse_extraction_output_no_json() {
        let result = parse_extraction_output("The document was unreadable.");
        assert!(matches!(result, Err(ExtractionError::InvalidFormat(_))));
    }

    #[test]
    fn test_to_extracted_attributes() {
        let output = ExtractionOutput {
            attributes: RawAttributes {
                microchip: Some("985112003456789".into()),
                name: Some("Maximus".into()),
                age: Some("3 years".into()),
                breed: None,
                gender: None,
            },
            confidence: Some(88.0),
        };

        let attrs = to_extracted_attributes(&output);
        assert_eq!(attrs.microchip.as_deref(), Some("985112003456789"));
        assert_eq!(attrs.extraction_confidence, Some(88.0));
        assert!(attrs.breed.is_none());
    }

    #[test]
    fn test_mock_extractor_certificate() {
        let text = "RABIES VACCINATION CERTIFICATE. Patient: Maximus. Breed: Golden Retriever. Sex: Neutered Male. Age: 3 years. Microchip: 985 112 003 456 789.";
        let output = MockExtractor::extract(text);

        assert_eq!(output.attributes.name.as_deref(), Some("Maximus"));
        assert_eq!(output.attributes.breed.as_deref(), Some("Golden Retriever"));
        assert_eq!(output.attributes.gender.as_deref(), Some("Neutered Male"));
        assert_eq!(output.attributes.age.as_deref(), Some("3 years"));
        assert_eq!(
            output.attributes.microchip.as_deref(),
            Some("985 112 003 456 789")
        );
        assert_eq!(output.confidence, Some(100.0));
    }

    #[test]
    fn test_mock_extractor_invoice_finds_nothing() {
        let text = "Invoice #2041. Professional services rendered. Total due: $182.50.";
        let output = MockExtractor::extract(text);

        assert!(output.attributes.microchip.is_none());
        assert!(output.attributes.name.is_none());
        assert!(output.attributes.breed.is_none());
        assert_eq!(output.confidence, Some(0.0));
    }

    #[test]
    fn test_mock_extractor_partial_document() {
        let text = "Lab results. Name: Bella. Female, 6 months.";
        let output = MockExtractor::extract(text);

        assert_eq!(output.attributes.name.as_deref(), Some("Bella"));
        assert_eq!(output.attributes.gender.as_deref(), Some("Female"));
        assert_eq!(output.attributes.age.as_deref(), Some("6 months"));
        assert!(output.attributes.breed.is_none());
    }

    proptest! {
        #[test]
        fn parse_never_panics(input in "\\PC{0,200}") {
            // Arbitrary model output must produce a value or a typed error
            let _ = parse_extraction_output(&input);
        }

        #[test]
        fn mock_extractor_never_panics(input in "\\PC{0,200}") {
            let output = MockExtractor::extract(&input);
            let found = output.confidence.unwrap_or(0.0);
            prop_assert!((0.0..=100.0).contains(&found));
        }
    }
}
