//! Registered pet models.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A registered pet record with dual-ID support for offline-first sync.
///
/// The registry owns this record; the validator treats it as an immutable
/// read-only snapshot for the duration of one validation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisteredPet {
    /// Local UUID - always present, generated locally
    pub local_id: String,
    /// Registry server ID - null until first sync
    pub server_id: Option<String>,
    /// Pet name
    pub name: String,
    /// Species (e.g., "canine", "feline")
    pub species: String,
    /// Breed
    pub breed: String,
    /// Sex as recorded at registration (e.g., "Male", "Spayed Female")
    pub sex: String,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// Implanted microchip number, if registered
    pub microchip_number: Option<String>,
    /// Owner/client name
    pub owner_name: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl RegisteredPet {
    /// Create a new pet record with required fields.
    pub fn new(
        name: String,
        species: String,
        breed: String,
        sex: String,
        date_of_birth: NaiveDate,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            server_id: None,
            name,
            species,
            breed,
            sex,
            date_of_birth,
            microchip_number: None,
            owner_name: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Check if this pet has been synced to the registry server.
    pub fn is_synced(&self) -> bool {
        self.server_id.is_some()
    }

    /// Age in fractional years as of `on`: completed years (calendar
    /// month/day comparison) plus completed months divided by 12.
    pub fn age_in_years(&self, on: NaiveDate) -> f64 {
        let dob = self.date_of_birth;
        let mut years = on.year() - dob.year();
        if (on.month(), on.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        if years < 0 {
            // Birth date in the future - bad registry data, clamp to zero
            return 0.0;
        }
        let mut months = on.month() as i32 - dob.month() as i32;
        if on.day() < dob.day() {
            months -= 1;
        }
        let months = months.rem_euclid(12);
        years as f64 + months as f64 / 12.0
    }
}
