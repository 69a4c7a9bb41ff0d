//! Per-field matchers for document-to-pet comparison.
//!
//! Handles:
//! - Exact microchip comparison (whitespace-insensitive)
//! - Fuzzy name matching with nickname detection
//! - Fuzzy breed matching with abbreviation detection
//! - Age phrase parsing against the recorded date of birth
//! - Sex marker normalization

use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{FieldMatchResult, RegisteredPet};

use super::similarity::similarity;

/// Matching thresholds and tolerances.
///
/// Values are tuned empirically; treat them as configuration, not validated
/// optima.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchThresholds {
    /// Name similarity at or above this is a match
    pub name_similarity: f64,
    /// Floor of the band in which the name containment heuristic applies
    pub nickname_band_floor: f64,
    /// Minimum shorter/longer length ratio for name containment
    pub name_containment_ratio: f64,
    /// Breed similarity at or above this is a match
    pub breed_similarity: f64,
    /// Minimum shorter/longer length ratio for breed containment
    pub breed_containment_ratio: f64,
    /// Similarity at or above this counts as a "strong" name/breed match
    pub strong_similarity: f64,
    /// Base age tolerance window, in years
    pub age_tolerance_years: f64,
    /// Tolerance multiplier when other fields match strongly
    pub relaxed_age_multiplier: f64,
    /// Fraction of available fields that must match for count-based acceptance
    pub required_match_ratio: f64,
    /// Aggregated confidence (0-100) at or above this is accepted outright
    pub confidence_floor: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            name_similarity: 0.70,
            nickname_band_floor: 0.60,
            name_containment_ratio: 0.60,
            breed_similarity: 0.70,
            breed_containment_ratio: 0.70,
            strong_similarity: 0.90,
            age_tolerance_years: 1.0,
            relaxed_age_multiplier: 2.0,
            required_match_ratio: 0.70,
            confidence_floor: 75.0,
        }
    }
}

/// Known name-diminutive pairs: canonical name -> diminutives.
///
/// A lookup table, not a general solution; extend per market via `add_pair`.
#[derive(Debug, Clone)]
pub struct NicknameTable {
    pairs: HashMap<String, Vec<String>>,
}

impl Default for NicknameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NicknameTable {
    /// Create a table with the default pairs.
    pub fn new() -> Self {
        Self {
            pairs: Self::default_pairs(),
        }
    }

    /// Create an empty table.
    pub fn empty() -> Self {
        Self {
            pairs: HashMap::new(),
        }
    }

    /// Add a canonical -> diminutive pair.
    pub fn add_pair(&mut self, canonical: &str, diminutive: &str) {
        self.pairs
            .entry(canonical.to_lowercase())
            .or_default()
            .push(diminutive.to_lowercase());
    }

    /// Check whether two names form a known canonical/diminutive pair,
    /// in either direction.
    pub fn is_known_pair(&self, a: &str, b: &str) -> bool {
        let a = a.to_lowercase();
        let b = b.to_lowercase();
        let hit = |canonical: &str, diminutive: &str| {
            self.pairs
                .get(canonical)
                .map(|dims| dims.iter().any(|d| d == diminutive))
                .unwrap_or(false)
        };
        hit(&a, &b) || hit(&b, &a)
    }

    fn default_pairs() -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        let mut insert = |canonical: &str, dims: &[&str]| {
            map.insert(
                canonical.into(),
                dims.iter().map(|d| (*d).into()).collect(),
            );
        };

        insert("maximus", &["max"]);
        insert("maximilian", &["max"]);
        insert("william", &["will", "bill"]);
        insert("alexander", &["alex", "lex"]);
        insert("samantha", &["sam"]);
        insert("benjamin", &["ben", "benji"]);
        insert("charlotte", &["charlie", "lottie"]);
        insert("theodore", &["theo", "teddy"]);
        insert("sebastian", &["seb"]);
        insert("oliver", &["ollie"]);
        insert("elizabeth", &["liz", "lizzie"]);
        insert("winston", &["winnie"]);
        insert("penelope", &["penny"]);

        map
    }
}

static YEARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:years?|yrs?)").unwrap());
static MONTHS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:months?|mos?\b)").unwrap());
static WEEKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:weeks?|wks?)").unwrap());

/// Parse a free-text age phrase into fractional years.
///
/// Sums years, months/12, and weeks/52 components. Returns `None` when no
/// numeric component of any unit is found.
fn parse_age_phrase(phrase: &str) -> Option<f64> {
    let mut total = 0.0;
    let mut found = false;

    let mut add = |re: &Regex, divisor: f64| {
        if let Some(caps) = re.captures(phrase) {
            if let Ok(value) = caps[1].parse::<f64>() {
                total += value / divisor;
                found = true;
            }
        }
    };

    add(&YEARS_RE, 1.0);
    add(&MONTHS_RE, 12.0);
    add(&WEEKS_RE, 52.0);

    found.then_some(total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NormalizedSex {
    Male,
    Female,
}

/// Normalize a free-text sex marker.
///
/// Checks spay/neuter wording first, then "female" before "male" so the
/// substring test cannot misread "female" as male.
fn normalize_sex(raw: &str) -> Option<NormalizedSex> {
    let lower = raw.to_lowercase();
    if lower.contains("spayed") {
        return Some(NormalizedSex::Female);
    }
    if lower.contains("neutered") || lower.contains("castrated") {
        return Some(NormalizedSex::Male);
    }
    if lower.contains("female") {
        return Some(NormalizedSex::Female);
    }
    if lower.contains("male") {
        return Some(NormalizedSex::Male);
    }
    match lower.trim() {
        "m" => Some(NormalizedSex::Male),
        "f" => Some(NormalizedSex::Female),
        _ => None,
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Stateless per-field matchers, parameterized by thresholds and the
/// nickname table.
#[derive(Debug, Clone, Default)]
pub struct FieldMatchers {
    thresholds: MatchThresholds,
    nicknames: NicknameTable,
}

impl FieldMatchers {
    /// Create matchers with default thresholds and nickname pairs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create matchers with custom configuration.
    pub fn with_config(thresholds: MatchThresholds, nicknames: NicknameTable) -> Self {
        Self {
            thresholds,
            nicknames,
        }
    }

    /// The active thresholds.
    pub fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    /// The active nickname table.
    pub fn nicknames(&self) -> &NicknameTable {
        &self.nicknames
    }

    /// Exact microchip comparison after stripping all whitespace.
    ///
    /// No fuzziness: a microchip is either identical or it is not. Absent
    /// registry value is a non-match.
    pub fn match_microchip(&self, extracted: &str, registered: Option<&str>) -> FieldMatchResult {
        let matches = registered
            .map(|reg| strip_whitespace(extracted) == strip_whitespace(reg))
            .unwrap_or(false);
        debug!(
            extracted,
            registered = registered.unwrap_or("<none>"),
            matches,
            "microchip_match"
        );
        FieldMatchResult::exact(matches)
    }

    /// Fuzzy name comparison with nickname detection.
    pub fn match_name(&self, extracted: &str, registered: &str) -> FieldMatchResult {
        let sim = similarity(extracted, registered);
        let result = if sim >= self.thresholds.name_similarity {
            FieldMatchResult::fuzzy(true, sim)
        } else if self.is_nickname_pair(extracted, registered, sim) {
            FieldMatchResult::variation(sim)
        } else {
            FieldMatchResult::fuzzy(false, sim)
        };
        debug!(
            extracted,
            registered,
            similarity = sim,
            threshold = self.thresholds.name_similarity,
            matches = result.matches,
            likely_variation = result.likely_variation,
            "name_match"
        );
        result
    }

    /// Nickname heuristic: a known diminutive pair validates at any score;
    /// containment only within the near-miss band below the main threshold.
    fn is_nickname_pair(&self, a: &str, b: &str, sim: f64) -> bool {
        if self.nicknames.is_known_pair(a, b) {
            return true;
        }
        sim >= self.thresholds.nickname_band_floor
            && contains_with_ratio(a, b, self.thresholds.name_containment_ratio)
    }

    /// Fuzzy breed comparison with abbreviation detection.
    pub fn match_breed(&self, extracted: &str, registered: &str) -> FieldMatchResult {
        let sim = similarity(extracted, registered);
        let result = if sim >= self.thresholds.breed_similarity {
            FieldMatchResult::fuzzy(true, sim)
        } else if self.is_breed_abbreviation(extracted, registered) {
            FieldMatchResult::variation(sim)
        } else {
            FieldMatchResult::fuzzy(false, sim)
        };
        debug!(
            extracted,
            registered,
            similarity = sim,
            threshold = self.thresholds.breed_similarity,
            matches = result.matches,
            likely_variation = result.likely_variation,
            "breed_match"
        );
        result
    }

    /// Abbreviation heuristic: containment with a length-ratio guard, or
    /// every token of the shorter breed contained in (or containing) some
    /// token of the longer ("Golden" vs "Golden Retriever").
    fn is_breed_abbreviation(&self, a: &str, b: &str) -> bool {
        let a = a.to_lowercase();
        let b = b.to_lowercase();
        let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        if shorter.trim().is_empty() {
            return false;
        }
        if longer.contains(&shorter)
            && shorter.len() as f64 >= longer.len() as f64 * self.thresholds.breed_containment_ratio
        {
            return true;
        }
        let longer_tokens: Vec<&str> = longer.split_whitespace().collect();
        shorter
            .split_whitespace()
            .all(|t| longer_tokens.iter().any(|lt| lt.contains(t) || t.contains(lt)))
    }

    /// Age comparison: parsed phrase against the recorded date of birth.
    ///
    /// Returns `None` when the phrase has no parseable component - the field
    /// is then excluded from scoring, not failed. `relaxed` widens the
    /// tolerance window when other fields matched strongly, so a confidently
    /// matched name+breed pair is not vetoed by a sloppy age transcription.
    pub fn match_age(
        &self,
        phrase: &str,
        pet: &RegisteredPet,
        today: NaiveDate,
        relaxed: bool,
    ) -> Option<FieldMatchResult> {
        let parsed = match parse_age_phrase(phrase) {
            Some(years) => years,
            None => {
                debug!(phrase, "age_unparseable");
                return None;
            }
        };
        let actual = pet.age_in_years(today);
        let tolerance = if relaxed {
            self.thresholds.age_tolerance_years * self.thresholds.relaxed_age_multiplier
        } else {
            self.thresholds.age_tolerance_years
        };
        let matches = (parsed - actual).abs() <= tolerance;
        debug!(
            phrase,
            parsed_years = parsed,
            actual_years = actual,
            tolerance,
            matches,
            "age_match"
        );
        Some(FieldMatchResult::exact(matches))
    }

    /// Normalized sex comparison. Unresolvable input on either side is a
    /// non-match.
    pub fn match_gender(&self, extracted: &str, registered: &str) -> FieldMatchResult {
        let doc = normalize_sex(extracted);
        let record = normalize_sex(registered);
        let matches = matches!((doc, record), (Some(a), Some(b)) if a == b);
        debug!(extracted, registered, matches, "gender_match");
        FieldMatchResult::exact(matches)
    }
}

/// One string contains the other and the shorter is at least `ratio` of the
/// longer's length.
fn contains_with_ratio(a: &str, b: &str, ratio: f64) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.is_empty() {
        return false;
    }
    longer.contains(&shorter) && shorter.len() as f64 >= longer.len() as f64 * ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet_born(y: i32, m: u32, d: u32) -> RegisteredPet {
        RegisteredPet::new(
            "Max".into(),
            "canine".into(),
            "Golden Retriever".into(),
            "Male".into(),
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    #[test]
    fn test_microchip_exact_match() {
        let matchers = FieldMatchers::new();
        let result = matchers.match_microchip("985112003456789", Some("985112003456789"));
        assert!(result.matches);
        assert!(result.similarity.is_none());
    }

    #[test]
    fn test_microchip_whitespace_insensitive() {
        let matchers = FieldMatchers::new();
        let result = matchers.match_microchip("985 112 003 456 789", Some("985112003456789"));
        assert!(result.matches);
    }

    #[test]
    fn test_microchip_mismatch() {
        let matchers = FieldMatchers::new();
        assert!(!matchers.match_microchip("999", Some("111")).matches);
    }

    #[test]
    fn test_microchip_absent_registry_value() {
        let matchers = FieldMatchers::new();
        assert!(!matchers.match_microchip("985112003456789", None).matches);
    }

    #[test]
    fn test_name_exact() {
        let matchers = FieldMatchers::new();
        let result = matchers.match_name("Bella", "bella");
        assert!(result.matches);
        assert_eq!(result.similarity, Some(1.0));
        assert!(!result.likely_variation);
    }

    #[test]
    fn test_name_typo_within_threshold() {
        let matchers = FieldMatchers::new();
        // charlie vs charly: distance 2 over 7 chars
        let result = matchers.match_name("Charlie", "Charly");
        assert!(result.matches);
        assert!(!result.likely_variation);
    }

    #[test]
    fn test_name_known_nickname_pair() {
        let matchers = FieldMatchers::new();
        let result = matchers.match_name("Max", "Maximus");
        assert!(result.matches);
        assert!(result.likely_variation);
        assert!(result.similarity.unwrap() < 0.70);
    }

    #[test]
    fn test_name_containment_in_band() {
        let matchers = FieldMatchers::new();
        // "Joe" contains "Jo" at a 2/3 length ratio; similarity ~0.67 sits
        // inside the near-miss band
        let result = matchers.match_name("Jo", "Joe");
        assert!(result.matches);
        assert!(result.likely_variation);
    }

    #[test]
    fn test_name_mismatch() {
        let matchers = FieldMatchers::new();
        let result = matchers.match_name("Bella", "Charlie");
        assert!(!result.matches);
        assert!(!result.likely_variation);
    }

    #[test]
    fn test_breed_exact() {
        let matchers = FieldMatchers::new();
        let result = matchers.match_breed("Golden Retriever", "Golden Retriever");
        assert!(result.matches);
        assert!(!result.likely_variation);
    }

    #[test]
    fn test_breed_token_abbreviation() {
        let matchers = FieldMatchers::new();
        let result = matchers.match_breed("Golden", "Golden Retriever");
        assert!(result.matches);
        assert!(result.likely_variation);
    }

    #[test]
    fn test_breed_abbreviation_reversed() {
        let matchers = FieldMatchers::new();
        let result = matchers.match_breed("Golden Retriever", "Golden");
        assert!(result.matches);
        assert!(result.likely_variation);
    }

    #[test]
    fn test_breed_mismatch() {
        let matchers = FieldMatchers::new();
        let result = matchers.match_breed("Poodle", "Labrador");
        assert!(!result.matches);
    }

    #[test]
    fn test_breed_partial_token_containment() {
        let matchers = FieldMatchers::new();
        // "Lab" is contained in the "Labrador" token
        let result = matchers.match_breed("Lab", "Labrador Retriever");
        assert!(result.matches);
        assert!(result.likely_variation);
    }

    #[test]
    fn test_age_parse_years() {
        assert_eq!(parse_age_phrase("3 years"), Some(3.0));
        assert_eq!(parse_age_phrase("3 yrs"), Some(3.0));
        assert_eq!(parse_age_phrase("1 year"), Some(1.0));
    }

    #[test]
    fn test_age_parse_months_and_weeks() {
        assert_eq!(parse_age_phrase("6 months"), Some(0.5));
        assert_eq!(parse_age_phrase("26 weeks"), Some(0.5));
        let combined = parse_age_phrase("2 years 6 months").unwrap();
        assert!((combined - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_age_parse_unparseable() {
        assert_eq!(parse_age_phrase("adult"), None);
        assert_eq!(parse_age_phrase(""), None);
        assert_eq!(parse_age_phrase("3"), None);
    }

    #[test]
    fn test_age_within_tolerance() {
        let matchers = FieldMatchers::new();
        let pet = pet_born(2023, 8, 6); // exactly 3 years old
        let result = matchers.match_age("3 years", &pet, today(), false).unwrap();
        assert!(result.matches);
        let result = matchers.match_age("4 years", &pet, today(), false).unwrap();
        assert!(result.matches); // 1.0 year off, at the base tolerance edge
        let result = matchers.match_age("5 years", &pet, today(), false).unwrap();
        assert!(!result.matches);
    }

    #[test]
    fn test_age_relaxed_tolerance() {
        let matchers = FieldMatchers::new();
        let pet = pet_born(2023, 8, 6);
        // 2 years off: fails at base tolerance, passes when relaxed
        assert!(!matchers.match_age("5 years", &pet, today(), false).unwrap().matches);
        assert!(matchers.match_age("5 years", &pet, today(), true).unwrap().matches);
    }

    #[test]
    fn test_age_unparseable_is_excluded() {
        let matchers = FieldMatchers::new();
        let pet = pet_born(2023, 8, 6);
        assert!(matchers.match_age("young adult", &pet, today(), false).is_none());
    }

    #[test]
    fn test_gender_basic() {
        let matchers = FieldMatchers::new();
        assert!(matchers.match_gender("Male", "male").matches);
        assert!(matchers.match_gender("F", "Female").matches);
        assert!(!matchers.match_gender("Male", "Female").matches);
    }

    #[test]
    fn test_gender_neutered_and_spayed() {
        let matchers = FieldMatchers::new();
        assert!(matchers.match_gender("Neutered Male", "M").matches);
        assert!(matchers.match_gender("neutered", "Male").matches);
        assert!(matchers.match_gender("Spayed Female", "F").matches);
        assert!(matchers.match_gender("spayed", "female").matches);
        assert!(matchers.match_gender("castrated", "male").matches);
    }

    #[test]
    fn test_gender_female_not_misread_as_male() {
        assert_eq!(normalize_sex("Female"), Some(NormalizedSex::Female));
        assert_eq!(normalize_sex("female"), Some(NormalizedSex::Female));
    }

    #[test]
    fn test_gender_unresolvable() {
        let matchers = FieldMatchers::new();
        assert!(!matchers.match_gender("unknown", "Male").matches);
        assert!(!matchers.match_gender("Male", "?").matches);
    }

    #[test]
    fn test_custom_nickname_pair() {
        let mut table = NicknameTable::new();
        table.add_pair("guinevere", "gwen");
        let matchers = FieldMatchers::with_config(MatchThresholds::default(), table);
        let result = matchers.match_name("Gwen", "Guinevere");
        assert!(result.matches);
        assert!(result.likely_variation);
    }

    #[test]
    fn test_nickname_pair_both_directions() {
        let table = NicknameTable::new();
        assert!(table.is_known_pair("max", "maximus"));
        assert!(table.is_known_pair("Maximus", "MAX"));
        assert!(!table.is_known_pair("max", "bella"));
    }
}
