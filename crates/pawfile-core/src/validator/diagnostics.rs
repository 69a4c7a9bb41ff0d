//! Human-readable verdict explanations.
//!
//! Used for audit logs and for "why was this rejected" review screens. Pure
//! string formatting: no side effects, and it must not panic on any verdict
//! shape, including malformed ones.

use crate::models::{ConfidenceBand, SkipReason, ValidationMethod, ValidationVerdict};

/// Similarity at or above this on a mismatched field earns a near-miss hint.
const NEAR_MISS_FLOOR: f64 = 0.60;

/// Render a verdict as a human-readable explanation.
pub fn explain_verdict(verdict: &ValidationVerdict) -> String {
    match verdict.skip_reason {
        None => explain_valid(verdict),
        Some(SkipReason::NoPetInfo) => explain_no_pet_info(verdict),
        Some(SkipReason::MicrochipMismatch) => explain_microchip_mismatch(verdict),
        Some(SkipReason::AttributesMismatch) => explain_attributes_mismatch(verdict),
    }
}

fn explain_valid(verdict: &ValidationVerdict) -> String {
    match verdict.method {
        ValidationMethod::Microchip => {
            format!("Document matched '{}' via microchip.", verdict.pet.name)
        }
        ValidationMethod::Attributes => match &verdict.confidence {
            Some(report) => format!(
                "Document matched '{}' via attributes ({:.0}%, {}).",
                verdict.pet.name,
                report.score,
                report.band.label()
            ),
            None => format!("Document matched '{}' via attributes.", verdict.pet.name),
        },
        ValidationMethod::None => format!("Document matched '{}'.", verdict.pet.name),
    }
}

fn explain_no_pet_info(verdict: &ValidationVerdict) -> String {
    format!(
        "No identifying information found in the document. Searched for: {}.",
        verdict.attributes.missing_fields().join(", ")
    )
}

fn explain_microchip_mismatch(verdict: &ValidationVerdict) -> String {
    let extracted = verdict
        .attributes
        .microchip
        .as_deref()
        .unwrap_or("<not extracted>");
    let registered = verdict
        .pet
        .microchip_number
        .as_deref()
        .unwrap_or("none on record");
    format!(
        "Microchip on document ({}) does not match the microchip on record ({}).",
        extracted, registered
    )
}

fn explain_attributes_mismatch(verdict: &ValidationVerdict) -> String {
    let details = &verdict.details;
    let attrs = &verdict.attributes;
    let pet = &verdict.pet;

    let mut matched = Vec::new();
    let mut mismatched = Vec::new();
    let mut missing = Vec::new();

    // (field, result, extracted value, registered value, near-miss hint)
    let rows = [
        (
            "microchip",
            &details.microchip,
            attrs.microchip.as_deref(),
            pet.microchip_number.as_deref(),
            None,
        ),
        (
            "name",
            &details.name,
            attrs.name.as_deref(),
            Some(pet.name.as_str()),
            Some("may be a nickname"),
        ),
        (
            "breed",
            &details.breed,
            attrs.breed.as_deref(),
            Some(pet.breed.as_str()),
            Some("may be abbreviated"),
        ),
        ("age", &details.age, attrs.age.as_deref(), None, None),
        (
            "gender",
            &details.gender,
            attrs.gender.as_deref(),
            Some(pet.sex.as_str()),
            None,
        ),
    ];

    for (field, result, extracted, registered, hint) in rows {
        let result = match result {
            Some(r) => r,
            None => {
                missing.push(field.to_string());
                continue;
            }
        };
        if result.matches {
            match result.similarity {
                Some(sim) => matched.push(format!("{} ({:.0}%)", field, sim * 100.0)),
                None => matched.push(field.to_string()),
            }
        } else {
            let values = match (extracted, registered) {
                (Some(e), Some(r)) => format!("{} '{}' vs '{}'", field, e, r),
                (Some(e), None) => format!("{} '{}'", field, e),
                _ => field.to_string(),
            };
            match result.similarity {
                Some(sim) if sim >= NEAR_MISS_FLOOR => {
                    let hint = hint.unwrap_or("close but below threshold");
                    mismatched.push(format!("{} ({:.0}%; {})", values, sim * 100.0, hint));
                }
                Some(sim) => mismatched.push(format!("{} ({:.0}%)", values, sim * 100.0)),
                None => mismatched.push(values),
            }
        }
    }

    let mut lines = vec![format!(
        "Document attributes do not sufficiently match '{}'.",
        pet.name
    )];
    if !matched.is_empty() {
        lines.push(format!("Matched: {}", matched.join(", ")));
    }
    if !mismatched.is_empty() {
        lines.push(format!("Mismatched: {}", mismatched.join(", ")));
    }
    if !missing.is_empty() {
        lines.push(format!("Missing: {}", missing.join(", ")));
    }

    match &verdict.confidence {
        Some(report) => {
            let mut summary = format!(
                "Overall confidence: {:.0}% ({}).",
                report.score,
                report.band.label()
            );
            match report.band {
                ConfidenceBand::Low => {
                    summary.push_str(" May still be the same pet - consider manual review.");
                }
                ConfidenceBand::VeryLow => {
                    summary.push_str(" Need at least 2 matching fields to auto-file.");
                }
                _ => {}
            }
            lines.push(summary);
        }
        None => {}
    }

    lines.join("\n")
}
