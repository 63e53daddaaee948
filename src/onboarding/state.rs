//! Onboarding step machine: which screen of the wizard the user is on.

use serde::{Deserialize, Serialize};

/// The wizard's screens.
///
/// Progresses linearly: Sex → DateOfBirth → Units → BodyStats →
/// FitnessLevel → ActivityLevel → Timezone → Review, and back the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Sex,
    DateOfBirth,
    Units,
    BodyStats,
    FitnessLevel,
    ActivityLevel,
    Timezone,
    Review,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 8] = [
        Self::Sex,
        Self::DateOfBirth,
        Self::Units,
        Self::BodyStats,
        Self::FitnessLevel,
        Self::ActivityLevel,
        Self::Timezone,
        Self::Review,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The following step, `None` on `Review`.
    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The preceding step, `None` on `Sex`.
    pub fn prev(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn is_first(&self) -> bool {
        self.index() == 0
    }

    pub fn is_last(&self) -> bool {
        matches!(self, Self::Review)
    }

    /// Fraction of the wizard reached, counting this step.
    pub fn progress(&self) -> f64 {
        (self.index() + 1) as f64 / Self::COUNT as f64
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Sex => "Who are you?",
            Self::DateOfBirth => "Your birthday",
            Self::Units => "Preferred units",
            Self::BodyStats => "Your body stats",
            Self::FitnessLevel => "Fitness level",
            Self::ActivityLevel => "Activity level",
            Self::Timezone => "Your timezone",
            Self::Review => "Review & confirm",
        }
    }

    /// The question shown under the title.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Sex => "How do you identify?",
            Self::DateOfBirth => "Select your date of birth",
            Self::Units => "Choose your units",
            Self::BodyStats => "Enter your body stats",
            Self::FitnessLevel => "What is your fitness level?",
            Self::ActivityLevel => "Typical daily activity",
            Self::Timezone => "Confirm your timezone",
            Self::Review => "Review your info",
        }
    }
}

impl Default for OnboardingStep {
    fn default() -> Self {
        Self::Sex
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Sex => "sex",
            Self::DateOfBirth => "date_of_birth",
            Self::Units => "units",
            Self::BodyStats => "body_stats",
            Self::FitnessLevel => "fitness_level",
            Self::ActivityLevel => "activity_level",
            Self::Timezone => "timezone",
            Self::Review => "review",
        };
        write!(f, "{s}")
    }
}
