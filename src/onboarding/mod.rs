//! First-launch onboarding: an eight-step wizard that collects the user's
//! profile and saves it with a single upsert on Finish.

pub mod model;
pub mod state;
pub mod wizard;

pub use model::{ActivityLevel, FitnessLevel, OnboardingDraft, Sex, UnitPref};
pub use state::OnboardingStep;
pub use wizard::{OnboardingWizard, WizardOutcome};
