//! User profile records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Demographic and fitness attributes, as returned by `GET /profile/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_pref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resting_hr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injuries: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Weekdays the user can train, 0 = Sunday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_days: Option<Vec<u8>>,
}

/// Body of `POST /profile`.
///
/// Unset fields are left out of the JSON so the backend's partial update
/// keeps whatever it already stores for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpsert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_pref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resting_hr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injuries: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_days: Option<Vec<u8>>,
}

impl Profile {
    /// Apply an upsert on top of this profile, the way the backend merges a
    /// partial update: set fields overwrite, unset fields are kept.
    pub fn merged_with(mut self, upsert: &ProfileUpsert) -> Self {
        let u = upsert.clone();
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $( if u.$field.is_some() { self.$field = u.$field; } )*
            };
        }
        merge!(
            sex,
            dob,
            height_cm,
            weight_kg,
            unit_pref,
            activity_level,
            fitness_level,
            resting_hr,
            max_hr,
            body_fat_pct,
            medical_conditions,
            injuries,
            timezone,
            locale,
            availability_days,
        );
        self
    }

    /// An empty profile for `id`, as the backend creates on first upsert.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            sex: None,
            dob: None,
            height_cm: None,
            weight_kg: None,
            unit_pref: None,
            activity_level: None,
            fitness_level: None,
            resting_hr: None,
            max_hr: None,
            body_fat_pct: None,
            medical_conditions: None,
            injuries: None,
            timezone: None,
            locale: None,
            availability_days: None,
        }
    }

    /// The profile's fields expressed as an upsert payload.
    pub fn to_upsert(&self) -> ProfileUpsert {
        ProfileUpsert {
            sex: self.sex.clone(),
            dob: self.dob,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            unit_pref: self.unit_pref.clone(),
            activity_level: self.activity_level.clone(),
            fitness_level: self.fitness_level.clone(),
            resting_hr: self.resting_hr,
            max_hr: self.max_hr,
            body_fat_pct: self.body_fat_pct,
            medical_conditions: self.medical_conditions.clone(),
            injuries: self.injuries.clone(),
            timezone: self.timezone.clone(),
            locale: self.locale.clone(),
            availability_days: self.availability_days.clone(),
        }
    }
}
