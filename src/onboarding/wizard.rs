//! The onboarding wizard: step navigation plus the single save at the end.

use tracing::{info, warn};

use super::{OnboardingDraft, OnboardingStep};
use crate::api::FitnessBackend;
use crate::models::Profile;

/// What a press of Next/Finish did.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardOutcome {
    /// Moved on to this step.
    Advanced(OnboardingStep),
    /// The profile was saved; onboarding is over.
    Completed(Profile),
    /// The save failed. The wizard stays on `Review` so it can be retried.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct OnboardingWizard {
    step: OnboardingStep,
    draft: OnboardingDraft,
    saving: bool,
    error: Option<String>,
}

impl Default for OnboardingWizard {
    fn default() -> Self {
        Self::new(OnboardingDraft::default())
    }
}

impl OnboardingWizard {
    pub fn new(draft: OnboardingDraft) -> Self {
        Self {
            step: OnboardingStep::default(),
            draft,
            saving: false,
            error: None,
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn draft(&self) -> &OnboardingDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut OnboardingDraft {
        &mut self.draft
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Error text from the last failed save.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn progress(&self) -> f64 {
        self.step.progress()
    }

    /// "Step n of 8".
    pub fn position(&self) -> String {
        format!("Step {} of {}", self.step.index() + 1, OnboardingStep::COUNT)
    }

    pub fn action_label(&self) -> &'static str {
        if self.step.is_last() { "Finish" } else { "Next" }
    }

    pub fn review_rows(&self) -> Vec<(&'static str, String)> {
        self.draft.review_rows()
    }

    /// Go back one step. A no-op on the first step and while saving.
    pub fn back(&mut self) {
        if self.saving {
            return;
        }
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
    }

    /// Advance, or on the last step save the draft with one upsert.
    pub async fn next(&mut self, backend: &dyn FitnessBackend) -> WizardOutcome {
        if let Some(next) = self.step.next() {
            self.step = next;
            return WizardOutcome::Advanced(next);
        }

        self.error = None;
        self.saving = true;
        let result = backend.upsert_profile(&self.draft.to_upsert()).await;
        self.saving = false;

        match result {
            Ok(profile) => {
                info!(profile_id = %profile.id, "Onboarding complete");
                WizardOutcome::Completed(profile)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Saving onboarding profile failed");
                self.error = Some(message.clone());
                WizardOutcome::Failed(message)
            }
        }
    }
}
