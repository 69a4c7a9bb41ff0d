//! Confidence aggregation over field match results.
//!
//! Field weights:
//! - Microchip: 100
//! - Name: 40
//! - Breed: 30
//! - Age: 20
//! - Gender: 10
//!
//! Fields with absent evidence are excluded from both numerator and
//! denominator, so a document that only ever mentions two of five fields is
//! not penalized for the silence of the other three.

use tracing::debug;

use crate::models::{ConfidenceBand, ConfidenceReport, FieldMatchResult, MatchDetails};

const MICROCHIP_WEIGHT: f64 = 100.0;
const NAME_WEIGHT: f64 = 40.0;
const BREED_WEIGHT: f64 = 30.0;
const AGE_WEIGHT: f64 = 20.0;
const GENDER_WEIGHT: f64 = 10.0;

/// Score contribution of a boolean-matched field.
fn exact_score(result: &FieldMatchResult) -> f64 {
    if result.matches {
        1.0
    } else {
        0.0
    }
}

/// Score contribution of a fuzzy field: the raw similarity ratio, so a
/// 0.85-similarity name contributes 85% of its weight even though it matched
/// at a lower threshold. Partial credit cuts both ways.
fn fuzzy_score(result: &FieldMatchResult) -> f64 {
    result.similarity.unwrap_or_else(|| exact_score(result))
}

/// Aggregate computed field results into a weighted confidence score (0-100)
/// and its qualitative band.
pub fn aggregate_confidence(details: &MatchDetails) -> ConfidenceReport {
    let mut weighted = 0.0;
    let mut available = 0.0;

    let mut accumulate = |result: &Option<FieldMatchResult>, weight: f64, fuzzy: bool| {
        if let Some(r) = result {
            let score = if fuzzy { fuzzy_score(r) } else { exact_score(r) };
            weighted += weight * score;
            available += weight;
        }
    };

    accumulate(&details.microchip, MICROCHIP_WEIGHT, false);
    accumulate(&details.name, NAME_WEIGHT, true);
    accumulate(&details.breed, BREED_WEIGHT, true);
    accumulate(&details.age, AGE_WEIGHT, false);
    accumulate(&details.gender, GENDER_WEIGHT, false);

    let score = if available > 0.0 {
        weighted / available * 100.0
    } else {
        0.0
    };
    let band = ConfidenceBand::from_score(score);
    debug!(score, band = band.label(), "confidence_aggregated");

    ConfidenceReport { score, band }
}
