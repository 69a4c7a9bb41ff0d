//! Pawfile Core Library
//!
//! Document-to-pet identity validation for the pet health record app.
//!
//! # Architecture
//!
//! ```text
//! Email attachment → OCR/LLM Extraction → ExtractedAttributes
//!                                               │
//!                                    ┌──────────▼──────────┐
//!                                    │  DocumentValidator  │
//!                                    │  microchip first,   │
//!                                    │  attribute fallback │
//!                                    └──────────┬──────────┘
//!                                               │
//!                                       ValidationVerdict
//!                                      ┌────────┴────────┐
//!                                      ▼                 ▼
//!                                 Auto-file         Manual review
//!                               (pet history)     (diagnostics text)
//! ```
//!
//! # Core Principle
//!
//! **A microchip, when extracted, is the sole arbiter.** A matching microchip
//! overrides any other disagreement; a mismatching microchip is never
//! overridden by attribute agreement.
//!
//! # Modules
//!
//! - [`models`]: Domain types (ExtractedAttributes, RegisteredPet, ValidationVerdict)
//! - [`validator`]: Similarity metric, field matchers, confidence aggregation,
//!   decision policy, and diagnostics

pub mod models;
pub mod validator;

// Re-export commonly used types
pub use models::{
    ConfidenceBand, ConfidenceReport, ExtractedAttributes, FieldMatchResult, MatchDetails,
    RegisteredPet, SkipReason, ValidationMethod, ValidationVerdict,
};
pub use validator::{
    explain_verdict, similarity, DocumentValidator, FieldMatchers, MatchThresholds, NicknameTable,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PawfileError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PawfileError {
    fn from(e: serde_json::Error) -> Self {
        PawfileError::SerializationError(e.to_string())
    }
}

impl From<chrono::ParseError> for PawfileError {
    fn from(e: chrono::ParseError) -> Self {
        PawfileError::InvalidInput(format!("Bad date: {}", e))
    }
}

// =========================================================================
// FFI Functions
// =========================================================================

/// Validate a document's extracted attributes against one pet record.
#[uniffi::export]
pub fn validate_document(
    attributes: FfiExtractedAttributes,
    pet: FfiRegisteredPet,
) -> Result<FfiValidationVerdict, PawfileError> {
    let validator = DocumentValidator::new();
    let pet = pet.try_into_pet()?;
    let verdict = validator.validate(&attributes.into(), &pet);
    Ok(verdict.into())
}

/// Validate a document against every candidate pet, e.g. all pets registered
/// to the inbox the document arrived at.
#[uniffi::export]
pub fn validate_document_against(
    attributes: FfiExtractedAttributes,
    pets: Vec<FfiRegisteredPet>,
) -> Result<Vec<FfiValidationVerdict>, PawfileError> {
    let validator = DocumentValidator::new();
    let attributes: ExtractedAttributes = attributes.into();
    pets.into_iter()
        .map(|pet| {
            let pet = pet.try_into_pet()?;
            Ok(validator.validate(&attributes, &pet).into())
        })
        .collect()
}

/// Serialize a validation verdict for the audit trail.
#[uniffi::export]
pub fn verdict_to_json(verdict: FfiValidationVerdict) -> Result<String, PawfileError> {
    Ok(serde_json::to_string(&serde_json::json!({
        "is_valid": verdict.is_valid,
        "method": verdict.method,
        "confidence": verdict.confidence,
        "confidence_band": verdict.confidence_band,
        "skip_reason": verdict.skip_reason,
        "explanation": verdict.explanation,
    }))?)
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe extracted attributes.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExtractedAttributes {
    pub microchip: Option<String>,
    pub name: Option<String>,
    pub age: Option<String>,
    pub breed: Option<String>,
    pub gender: Option<String>,
    pub extraction_confidence: Option<f64>,
}

impl From<FfiExtractedAttributes> for ExtractedAttributes {
    fn from(attrs: FfiExtractedAttributes) -> Self {
        ExtractedAttributes {
            microchip: attrs.microchip,
            name: attrs.name,
            age: attrs.age,
            breed: attrs.breed,
            gender: attrs.gender,
            extraction_confidence: attrs.extraction_confidence,
        }
    }
}

impl From<ExtractedAttributes> for FfiExtractedAttributes {
    fn from(attrs: ExtractedAttributes) -> Self {
        FfiExtractedAttributes {
            microchip: attrs.microchip,
            name: attrs.name,
            age: attrs.age,
            breed: attrs.breed,
            gender: attrs.gender,
            extraction_confidence: attrs.extraction_confidence,
        }
    }
}

/// FFI-safe registered pet snapshot.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRegisteredPet {
    pub local_id: String,
    pub server_id: Option<String>,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub sex: String,
    /// ISO 8601 date (YYYY-MM-DD)
    pub date_of_birth: String,
    pub microchip_number: Option<String>,
}

impl FfiRegisteredPet {
    fn try_into_pet(self) -> Result<RegisteredPet, PawfileError> {
        let date_of_birth = chrono::NaiveDate::parse_from_str(&self.date_of_birth, "%Y-%m-%d")?;
        let now = chrono::Utc::now().to_rfc3339();
        Ok(RegisteredPet {
            local_id: self.local_id,
            server_id: self.server_id,
            name: self.name,
            species: self.species,
            breed: self.breed,
            sex: self.sex,
            date_of_birth,
            microchip_number: self.microchip_number,
            owner_name: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

/// FFI-safe field match result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFieldMatchResult {
    pub matches: bool,
    pub similarity: Option<f64>,
    pub likely_variation: bool,
}

impl From<FieldMatchResult> for FfiFieldMatchResult {
    fn from(result: FieldMatchResult) -> Self {
        FfiFieldMatchResult {
            matches: result.matches,
            similarity: result.similarity,
            likely_variation: result.likely_variation,
        }
    }
}

/// FFI-safe validation verdict, flattened for the app layer.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiValidationVerdict {
    pub is_valid: bool,
    pub method: String,
    pub confidence: Option<f64>,
    pub confidence_band: Option<String>,
    pub skip_reason: Option<String>,
    pub microchip: Option<FfiFieldMatchResult>,
    pub name: Option<FfiFieldMatchResult>,
    pub breed: Option<FfiFieldMatchResult>,
    pub age: Option<FfiFieldMatchResult>,
    pub gender: Option<FfiFieldMatchResult>,
    pub explanation: String,
}

impl From<ValidationVerdict> for FfiValidationVerdict {
    fn from(verdict: ValidationVerdict) -> Self {
        let explanation = explain_verdict(&verdict);
        FfiValidationVerdict {
            is_valid: verdict.is_valid,
            method: verdict.method.to_string(),
            confidence: verdict.confidence.as_ref().map(|c| c.score),
            confidence_band: verdict.confidence.as_ref().map(|c| c.band.label().to_string()),
            skip_reason: verdict.skip_reason.map(|r| r.to_string()),
            microchip: verdict.details.microchip.clone().map(|r| r.into()),
            name: verdict.details.name.clone().map(|r| r.into()),
            breed: verdict.details.breed.clone().map(|r| r.into()),
            age: verdict.details.age.clone().map(|r| r.into()),
            gender: verdict.details.gender.clone().map(|r| r.into()),
            explanation,
        }
    }
}
