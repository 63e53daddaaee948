//! Onboarding draft: the values collected by the wizard before they are saved.

use chrono::{Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::OnboardingStep;
use crate::error::InputError;
use crate::models::ProfileUpsert;

const CM_PER_INCH: f64 = 2.54;
const KG_PER_POUND: f64 = 0.453_592_37;

/// Declares a fixed option set with its wire strings.
macro_rules! choice {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            /// The accepted inputs, for prompts and error messages.
            pub fn choices() -> String {
                Self::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>().join("|")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InputError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|c| c.as_str() == wanted)
                    .ok_or_else(|| InputError::InvalidChoice {
                        field: $field,
                        value: s.trim().to_string(),
                        choices: Self::choices(),
                    })
            }
        }
    };
}

choice!(Sex, "sex" { Male => "male", Female => "female", Other => "other" });

choice!(
    /// Which units body stats are entered in. The backend always stores metric.
    UnitPref, "units" { Metric => "metric", Imperial => "imperial" }
);

choice!(FitnessLevel, "fitness level" {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

choice!(ActivityLevel, "activity level" {
    Sedentary => "sedentary",
    Light => "light",
    Moderate => "moderate",
    Active => "active",
    VeryActive => "very_active",
});

/// Values the wizard has collected so far.
///
/// `height` and `weight` are in the units selected by `unit_pref`: cm/kg for
/// metric, inches/pounds for imperial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingDraft {
    pub sex: Option<Sex>,
    pub dob: NaiveDate,
    pub unit_pref: UnitPref,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub fitness_level: FitnessLevel,
    pub activity_level: ActivityLevel,
    pub timezone: String,
    pub locale: Option<String>,
}

impl Default for OnboardingDraft {
    fn default() -> Self {
        Self::new(
            Utc::now().date_naive(),
            std::env::var("TZ").ok(),
            std::env::var("LANG").ok(),
        )
    }
}

impl OnboardingDraft {
    /// A fresh draft as of `today`. A blank timezone falls back to UTC.
    pub fn new(today: NaiveDate, timezone: Option<String>, locale: Option<String>) -> Self {
        Self {
            sex: None,
            dob: today.checked_sub_months(Months::new(25 * 12)).unwrap_or(today),
            unit_pref: UnitPref::Metric,
            height: None,
            weight: None,
            fitness_level: FitnessLevel::Beginner,
            activity_level: ActivityLevel::Moderate,
            timezone: timezone
                .filter(|tz| !tz.trim().is_empty())
                .unwrap_or_else(|| "UTC".to_string()),
            locale: locale.and_then(|l| normalize_locale(&l)),
        }
    }

    pub fn height_cm(&self) -> Option<f64> {
        self.height.map(|h| match self.unit_pref {
            UnitPref::Metric => h,
            UnitPref::Imperial => h * CM_PER_INCH,
        })
    }

    pub fn weight_kg(&self) -> Option<f64> {
        self.weight.map(|w| match self.unit_pref {
            UnitPref::Metric => w,
            UnitPref::Imperial => w * KG_PER_POUND,
        })
    }

    /// Labels for the body-stat inputs in the selected units.
    pub fn body_stat_labels(&self) -> (&'static str, &'static str) {
        match self.unit_pref {
            UnitPref::Metric => ("Height (cm)", "Weight (kg)"),
            UnitPref::Imperial => ("Height (in)", "Weight (lb)"),
        }
    }

    /// Record the answer typed for `step`. Blank input keeps the current value.
    ///
    /// Body stats take `<height> <weight>`; either may be `-` to leave it unset.
    pub fn apply_input(&mut self, step: OnboardingStep, input: &str) -> Result<(), InputError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        match step {
            OnboardingStep::Sex => self.sex = Some(input.parse()?),
            OnboardingStep::DateOfBirth => {
                self.dob = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
                    InputError::InvalidDate {
                        field: "date of birth",
                        value: input.to_string(),
                    }
                })?;
            }
            OnboardingStep::Units => self.unit_pref = input.parse()?,
            OnboardingStep::BodyStats => {
                let mut parts = input.split_whitespace();
                let height = parse_stat("height", parts.next())?;
                let weight = parse_stat("weight", parts.next())?;
                self.height = height;
                self.weight = weight;
            }
            OnboardingStep::FitnessLevel => self.fitness_level = input.parse()?,
            OnboardingStep::ActivityLevel => self.activity_level = input.parse()?,
            OnboardingStep::Timezone => self.timezone = input.to_string(),
            OnboardingStep::Review => {}
        }
        Ok(())
    }

    /// The profile payload. Body stats are always sent in metric.
    pub fn to_upsert(&self) -> ProfileUpsert {
        ProfileUpsert {
            sex: self.sex.map(|s| s.as_str().to_string()),
            dob: Some(self.dob),
            height_cm: self.height_cm(),
            weight_kg: self.weight_kg(),
            unit_pref: Some(self.unit_pref.as_str().to_string()),
            activity_level: Some(self.activity_level.as_str().to_string()),
            fitness_level: Some(self.fitness_level.as_str().to_string()),
            timezone: Some(self.timezone.clone()),
            locale: self.locale.clone(),
            ..ProfileUpsert::default()
        }
    }

    /// Label/value pairs for the review screen, as entered.
    pub fn review_rows(&self) -> Vec<(&'static str, String)> {
        let stat = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        vec![
            ("Sex", self.sex.map(|s| s.to_string()).unwrap_or_default()),
            ("DOB", self.dob.format("%Y-%m-%d").to_string()),
            ("Units", self.unit_pref.to_string()),
            ("Height", stat(self.height)),
            ("Weight", stat(self.weight)),
            ("Fitness", self.fitness_level.to_string()),
            ("Activity", self.activity_level.to_string()),
            ("Timezone", self.timezone.clone()),
        ]
    }
}

fn parse_stat(field: &'static str, raw: Option<&str>) -> Result<Option<f64>, InputError> {
    match raw {
        None | Some("-") => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| InputError::InvalidNumber {
                field,
                value: raw.to_string(),
            }),
    }
}

/// `en_US.UTF-8` -> `en_US`. `C` and `POSIX` carry no locale.
fn normalize_locale(raw: &str) -> Option<String> {
    let base = raw.split(['.', '@']).next().unwrap_or_default().trim();
    match base {
        "" | "C" | "POSIX" => None,
        other => Some(other.to_string()),
    }
}
